//! HTML preview markup.
//!
//! The preview is generated from the same inlined frame the exporters use:
//! absolutely positioned elements carrying inline styles only, no classes.

use std::fmt::Write as _;

use crate::rendering::layout::{NodeKind, GLYPH};
use crate::rendering::style::{InlineStyle, InlinedFrame};
use crate::color::to_hex;

/// Element id of the sign root; the print stylesheet targets it
pub const PREVIEW_ELEMENT_ID: &str = "signage-preview";

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn box_style(style: &InlineStyle) -> String {
    let mut css = String::new();
    if let Some(bg) = style.background {
        let _ = write!(css, "background:{};", to_hex(bg));
    }
    if let Some((c, w)) = style.border {
        let _ = write!(css, "border:{}px solid {};box-sizing:border-box;", w, to_hex(c));
    }
    css
}

/// Render the preview element (a single `<div id="signage-preview">`).
pub fn render_html(frame: &InlinedFrame, line_spacing: u32) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<div id=\"{}\" style=\"position:relative;overflow:hidden;width:{}px;height:{}px;background:#ffffff;\">",
        PREVIEW_ELEMENT_ID, frame.width, frame.height
    );
    for node in &frame.nodes {
        let r = &node.rect;
        let pos = format!(
            "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;",
            r.x, r.y, r.width, r.height
        );
        match &node.kind {
            NodeKind::Block => {
                let _ = write!(out, "<div style=\"{}{}\"></div>", pos, box_style(&node.style));
            }
            NodeKind::Text { text, scale } => {
                let size = GLYPH * scale;
                let _ = write!(
                    out,
                    "<div style=\"{}color:{};font-family:monospace;font-size:{}px;line-height:{}px;white-space:pre;\">{}</div>",
                    pos,
                    to_hex(node.style.color),
                    size,
                    size + line_spacing,
                    escape_html(text)
                );
            }
            NodeKind::Image { source, opacity } => {
                let _ = write!(
                    out,
                    "<img src=\"{}\" alt=\"\" style=\"{}object-fit:contain;opacity:{};\">",
                    escape_html(source.as_str()),
                    pos,
                    opacity
                );
            }
            NodeKind::Icon { icon } => {
                let bg = node.style.background.unwrap_or(node.style.color);
                let _ = write!(
                    out,
                    "<div data-icon=\"{}\" style=\"{}border-radius:50%;background:{};color:{};display:flex;align-items:center;justify-content:center;font-family:monospace;font-weight:bold;\">{}</div>",
                    icon.id(),
                    pos,
                    to_hex(bg),
                    to_hex(node.style.color),
                    escape_html(icon.glyph())
                );
            }
            NodeKind::Qr(m) => {
                let quiet = 2;
                let size = m.width + quiet * 2;
                let _ = write!(
                    out,
                    "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {s} {s}\" shape-rendering=\"crispEdges\" style=\"{}background:{};\"><path fill=\"{}\" d=\"",
                    pos,
                    to_hex(node.style.background.unwrap_or(crate::color::WHITE)),
                    to_hex(node.style.color),
                    s = size
                );
                for y in 0..m.width {
                    for x in 0..m.width {
                        if m.is_dark(x, y) {
                            let _ = write!(out, "M{} {}h1v1h-1z", x + quiet, y + quiet);
                        }
                    }
                }
                out.push_str("\"/></svg>");
            }
        }
    }
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::layout::Rect;
    use crate::rendering::style::InlinedNode;
    use rgb::RGB8;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn preview_uses_inline_styles_only() {
        let frame = InlinedFrame {
            width: 100,
            height: 50,
            nodes: vec![
                InlinedNode {
                    rect: Rect::new(0, 0, 100, 50),
                    kind: NodeKind::Block,
                    style: InlineStyle {
                        color: RGB8::new(0, 0, 0),
                        background: Some(RGB8::new(255, 0, 0)),
                        border: None,
                    },
                },
                InlinedNode {
                    rect: Rect::new(4, 4, 90, 12),
                    kind: NodeKind::Text { text: "Keep <out>".into(), scale: 1 },
                    style: InlineStyle::default(),
                },
            ],
        };
        let html = render_html(&frame, 4);
        assert!(html.starts_with("<div id=\"signage-preview\""));
        assert!(html.contains("background:#ff0000"));
        assert!(html.contains("Keep &lt;out&gt;"));
        assert!(!html.contains("class="));
    }
}
