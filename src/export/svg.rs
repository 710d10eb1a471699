//! SVG output
//!
//! Walks the same display list as the rasterizer. Text stays text (monospace,
//! sized like the bitmap glyphs) and images keep their data URLs.

use simple_xml_builder::XMLElement;

use super::{ExportBackend, ExportFormat, ExportJob};
use crate::rendering::layout::GLYPH;
use crate::rendering::paint::{PaintCommand, Rgba};
use crate::Result;

fn fill(rgba: Rgba) -> String {
    format!("#{:02x}{:02x}{:02x}", rgba.0, rgba.1, rgba.2)
}

fn set(el: &mut XMLElement, name: &str, value: impl ToString) {
    el.add_attribute(name, &value.to_string());
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> XMLElement {
    let mut el = XMLElement::new("rect");
    set(&mut el, "x", x);
    set(&mut el, "y", y);
    set(&mut el, "width", w);
    set(&mut el, "height", h);
    el
}

/// Serialize a display list as an SVG document of `width` x `height` user
/// units, scaled by `scale` for its intrinsic size.
pub fn render_svg(commands: &[PaintCommand], width: u32, height: u32, scale: f32) -> String {
    let mut root = XMLElement::new("svg");
    set(&mut root, "xmlns", "http://www.w3.org/2000/svg");
    set(&mut root, "width", (width as f32 * scale).round());
    set(&mut root, "height", (height as f32 * scale).round());
    set(&mut root, "viewBox", format!("0 0 {} {}", width, height));

    let mut page = rect(0.0, 0.0, width as f32, height as f32);
    set(&mut page, "fill", "#ffffff");
    root.add_child(page);

    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                let mut el = rect(*x as f32, *y as f32, *width as f32, *height as f32);
                set(&mut el, "fill", fill(*rgba));
                root.add_child(el);
            }
            PaintCommand::StrokeRect { x, y, width, height, thickness, rgba } => {
                // SVG strokes are centred on the path; inset by half so the
                // border stays inside the box like the raster version
                let half = *thickness as f32 / 2.0;
                let mut el = rect(
                    *x as f32 + half,
                    *y as f32 + half,
                    (*width as f32 - *thickness as f32).max(0.0),
                    (*height as f32 - *thickness as f32).max(0.0),
                );
                set(&mut el, "fill", "none");
                set(&mut el, "stroke", fill(*rgba));
                set(&mut el, "stroke-width", thickness);
                root.add_child(el);
            }
            PaintCommand::Circle { cx, cy, radius, rgba } => {
                let mut el = XMLElement::new("circle");
                set(&mut el, "cx", cx);
                set(&mut el, "cy", cy);
                set(&mut el, "r", radius);
                set(&mut el, "fill", fill(*rgba));
                root.add_child(el);
            }
            PaintCommand::Text { x, y, text, scale, rgba } => {
                let size = GLYPH * scale;
                let mut el = XMLElement::new("text");
                set(&mut el, "x", x);
                set(&mut el, "y", y);
                set(&mut el, "font-family", "monospace");
                set(&mut el, "font-size", size);
                set(&mut el, "textLength", text.chars().count() as u32 * size);
                set(&mut el, "dominant-baseline", "hanging");
                set(&mut el, "xml:space", "preserve");
                set(&mut el, "fill", fill(*rgba));
                el.add_text(text);
                root.add_child(el);
            }
            PaintCommand::Image { x, y, width, height, source, opacity } => {
                let mut el = XMLElement::new("image");
                set(&mut el, "x", x);
                set(&mut el, "y", y);
                set(&mut el, "width", width);
                set(&mut el, "height", height);
                set(&mut el, "href", source.as_str());
                set(&mut el, "preserveAspectRatio", "none");
                if *opacity < 1.0 {
                    set(&mut el, "opacity", opacity);
                }
                root.add_child(el);
            }
        }
    }

    root.to_string()
}

#[derive(Debug, Default)]
pub struct SvgBackend;

impl ExportBackend for SvgBackend {
    fn format(&self) -> ExportFormat {
        ExportFormat::Svg
    }

    fn encode(&self, job: &ExportJob<'_>) -> Result<Vec<u8>> {
        let svg = render_svg(job.commands, job.frame.width, job.frame.height, job.config.scale());
        Ok(svg.into_bytes())
    }
}
