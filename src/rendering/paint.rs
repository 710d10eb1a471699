//! Display list produced from an inlined frame.
//!
//! Every backend that draws pixels or vectors (raster, SVG) walks the same
//! command list, so they cannot drift apart.

use crate::model::ImageSource;
use crate::qr::QUIET_ZONE;
use crate::rendering::layout::{NodeKind, GLYPH};
use crate::rendering::style::InlinedFrame;

pub type Rgba = (u8, u8, u8, u8);

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    StrokeRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        thickness: u32,
        rgba: Rgba,
    },
    Circle {
        cx: i32,
        cy: i32,
        radius: u32,
        rgba: Rgba,
    },
    /// A single line of text, top-left anchored, drawn with 8x8 glyphs
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: Rgba,
    },
    Image {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        source: ImageSource,
        opacity: f32,
    },
}

fn rgba(c: rgb::RGB8) -> Rgba {
    (c.r, c.g, c.b, 255)
}

/// Lower an inlined frame to a flat list of drawing commands.
pub fn paint(frame: &InlinedFrame, line_spacing: u32) -> Vec<PaintCommand> {
    let mut out = Vec::new();
    for node in &frame.nodes {
        let r = &node.rect;
        let st = &node.style;
        match &node.kind {
            NodeKind::Block => {
                if let Some(bg) = st.background {
                    out.push(PaintCommand::SolidRect { x: r.x, y: r.y, width: r.width, height: r.height, rgba: rgba(bg) });
                }
                if let Some((c, thickness)) = st.border {
                    out.push(PaintCommand::StrokeRect {
                        x: r.x,
                        y: r.y,
                        width: r.width,
                        height: r.height,
                        thickness,
                        rgba: rgba(c),
                    });
                }
            }
            NodeKind::Text { text, scale } => {
                let step = (GLYPH * scale + line_spacing) as i32;
                for (i, line) in text.lines().enumerate() {
                    out.push(PaintCommand::Text {
                        x: r.x,
                        y: r.y + i as i32 * step,
                        text: line.to_string(),
                        scale: *scale,
                        rgba: rgba(st.color),
                    });
                }
            }
            NodeKind::Image { source, opacity } => out.push(PaintCommand::Image {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
                source: source.clone(),
                opacity: *opacity,
            }),
            NodeKind::Icon { icon } => {
                let radius = r.width.min(r.height) / 2;
                let (cx, cy) = (r.x + radius as i32, r.y + radius as i32);
                let fill = st.background.unwrap_or(st.color);
                out.push(PaintCommand::Circle { cx, cy, radius, rgba: rgba(fill) });
                let glyph = icon.glyph();
                let scale = (radius / GLYPH).max(1);
                let tw = glyph.chars().count() as u32 * GLYPH * scale;
                let th = GLYPH * scale;
                out.push(PaintCommand::Text {
                    x: cx - tw as i32 / 2,
                    y: cy - th as i32 / 2,
                    text: glyph.to_string(),
                    scale,
                    rgba: rgba(st.color),
                });
            }
            NodeKind::Qr(matrix) => {
                let quiet = QUIET_ZONE;
                let cells = matrix.span();
                let side = r.width.min(r.height);
                let module = (side / cells).max(1);
                let bg = st.background.unwrap_or(crate::color::WHITE);
                out.push(PaintCommand::SolidRect { x: r.x, y: r.y, width: r.width, height: r.height, rgba: rgba(bg) });
                let offset = (side.saturating_sub(module * cells) / 2) as i32;
                for y in 0..matrix.width {
                    for x in 0..matrix.width {
                        if matrix.is_dark(x, y) {
                            out.push(PaintCommand::SolidRect {
                                x: r.x + offset + ((x + quiet) as u32 * module) as i32,
                                y: r.y + offset + ((y + quiet) as u32 * module) as i32,
                                width: module,
                                height: module,
                                rgba: rgba(st.color),
                            });
                        }
                    }
                }
            }
        }
    }
    out
}
