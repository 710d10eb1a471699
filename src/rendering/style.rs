//! Style classes and the inlining pass.
//!
//! Layout tags every node with a [`StyleClass`]. A [`Stylesheet`] maps those
//! classes to CSS color strings, which may come straight from user branding in
//! any CSS color syntax. [`inline_styles`] resolves each node's class into a
//! concrete sRGB [`InlineStyle`] and drops the class, so nothing downstream
//! (raster, PDF, SVG, HTML) ever has to interpret CSS colors.

use std::collections::HashMap;

use rgb::RGB8;

use crate::color::{self, parse_color};
use crate::model::BrandingConfig;
use crate::rendering::layout::{Frame, NodeKind, Rect};
use crate::rendering::preview::SignageTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleClass {
    Page,
    BrandHeader,
    BrandHeaderText,
    Logo,
    Banner,
    BannerIcon,
    BannerText,
    Title,
    Purpose,
    Location,
    Heading,
    Body,
    Hazard,
    PpeCell,
    PpeIcon,
    PpeImage,
    PpeLabel,
    Permit,
    PermitTitle,
    PermitText,
    Contact,
    QrCode,
    QrImage,
    Footer,
    FooterText,
}

/// Unresolved declarations for one class, as CSS color strings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Declaration {
    pub color: Option<String>,
    pub background: Option<String>,
    pub border: Option<String>,
    pub border_width: u32,
}

impl Declaration {
    fn color(c: impl Into<String>) -> Self {
        Self { color: Some(c.into()), ..Default::default() }
    }

    fn on(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    fn bordered(mut self, border: impl Into<String>, width: u32) -> Self {
        self.border = Some(border.into());
        self.border_width = width;
        self
    }
}

/// Class-to-declaration table for one sign
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: HashMap<StyleClass, Declaration>,
}

impl Stylesheet {
    pub fn set(&mut self, class: StyleClass, decl: Declaration) {
        self.rules.insert(class, decl);
    }

    pub fn get(&self, class: StyleClass) -> Option<&Declaration> {
        self.rules.get(&class)
    }

    /// The stylesheet of a sign: category colors for the body, branding
    /// colors for the header band and footer.
    pub fn for_sign(tree: &SignageTree, branding: &BrandingConfig) -> Self {
        use StyleClass::*;

        let accent = color::to_hex(tree.accent);
        let tinted = color::to_hex(color::tint(tree.accent, 0.9));
        let text = color::to_hex(tree.category_style.text);
        let mut s = Stylesheet::default();

        s.set(Page, Declaration::default().on("#ffffff").bordered(accent.clone(), 6));
        s.set(BrandHeader, Declaration::default().on(branding.header_color.clone()));
        s.set(BrandHeaderText, Declaration::color(branding.header_text_color.clone()));
        s.set(Logo, Declaration::default());
        s.set(Banner, Declaration::default().on(accent.clone()));
        s.set(BannerIcon, Declaration::color(accent.clone()).on("#ffffff"));
        s.set(BannerText, Declaration::color("#ffffff"));
        s.set(Title, Declaration::color("#111827"));
        s.set(Purpose, Declaration::color("#374151"));
        s.set(Location, Declaration::color(text.clone()));
        s.set(Heading, Declaration::color(accent.clone()));
        s.set(Body, Declaration::color("#1f2937"));
        s.set(Hazard, Declaration::color(text.clone()));
        s.set(PpeCell, Declaration::default().on(tinted).bordered(accent.clone(), 2));
        s.set(PpeIcon, Declaration::color("#ffffff").on(accent.clone()));
        s.set(PpeImage, Declaration::default());
        s.set(PpeLabel, Declaration::color("#111827"));
        s.set(Permit, Declaration::default().on("#fef3c7").bordered("#d97706", 3));
        s.set(PermitTitle, Declaration::color("#92400e"));
        s.set(PermitText, Declaration::color("#78350f"));
        s.set(Contact, Declaration::color("#111827"));
        s.set(QrCode, Declaration::color("#000000").on("#ffffff"));
        s.set(QrImage, Declaration::default());
        s.set(Footer, Declaration::default().on(branding.footer_color.clone()));
        s.set(FooterText, Declaration::color(branding.footer_text_color.clone()));
        s
    }
}

/// Concrete colors for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineStyle {
    pub color: RGB8,
    pub background: Option<RGB8>,
    pub border: Option<(RGB8, u32)>,
}

impl Default for InlineStyle {
    fn default() -> Self {
        Self { color: color::BLACK, background: None, border: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlinedNode {
    pub rect: Rect,
    pub kind: NodeKind,
    pub style: InlineStyle,
}

/// A frame whose nodes carry only concrete colors
#[derive(Debug, Clone, PartialEq)]
pub struct InlinedFrame {
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<InlinedNode>,
}

impl InlinedFrame {
    /// A copy of this frame shifted by (dx, dy)
    pub fn translated(&self, dx: i32, dy: i32) -> InlinedFrame {
        InlinedFrame {
            width: self.width,
            height: self.height,
            nodes: self
                .nodes
                .iter()
                .map(|n| InlinedNode { rect: n.rect.translate(dx, dy), kind: n.kind.clone(), style: n.style })
                .collect(),
        }
    }
}

fn resolve(value: Option<&String>, class: StyleClass, what: &str) -> Option<RGB8> {
    let v = value?;
    let c = parse_color(v);
    if c.is_none() {
        log::warn!("ignoring unparsable {} `{}` on {:?}", what, v, class);
    }
    c
}

/// Resolve every node's class into concrete colors and strip the class.
pub fn inline_styles(frame: &Frame, sheet: &Stylesheet) -> InlinedFrame {
    let nodes = frame
        .nodes
        .iter()
        .map(|n| {
            let style = match sheet.get(n.class) {
                Some(d) => InlineStyle {
                    color: resolve(d.color.as_ref(), n.class, "color").unwrap_or(color::BLACK),
                    background: resolve(d.background.as_ref(), n.class, "background"),
                    border: resolve(d.border.as_ref(), n.class, "border")
                        .filter(|_| d.border_width > 0)
                        .map(|c| (c, d.border_width)),
                },
                None => InlineStyle::default(),
            };
            InlinedNode { rect: n.rect.clone(), kind: n.kind.clone(), style }
        })
        .collect();
    InlinedFrame { width: frame.width, height: frame.height, nodes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::layout::LayoutNode;
    use crate::rendering::preview::render_tree;
    use crate::model::SignageData;

    fn frame_with(class: StyleClass) -> Frame {
        Frame {
            width: 10,
            height: 10,
            nodes: vec![LayoutNode { rect: Rect::new(0, 0, 10, 10), kind: NodeKind::Block, class }],
        }
    }

    #[test]
    fn perceptual_branding_colors_are_inlined_as_rgb() {
        let branding = BrandingConfig {
            header_color: "oklch(0 0 0)".into(),
            ..Default::default()
        };
        let tree = render_tree(&SignageData::default(), &branding);
        let sheet = Stylesheet::for_sign(&tree, &branding);
        let out = inline_styles(&frame_with(StyleClass::BrandHeader), &sheet);
        assert_eq!(out.nodes[0].style.background, Some(color::BLACK));
    }

    #[test]
    fn bad_colors_fall_back() {
        let mut sheet = Stylesheet::default();
        sheet.set(
            StyleClass::Body,
            Declaration::color("not-a-color").on("also bad").bordered("#f00", 2),
        );
        let out = inline_styles(&frame_with(StyleClass::Body), &sheet);
        let st = out.nodes[0].style;
        assert_eq!(st.color, color::BLACK);
        assert_eq!(st.background, None);
        assert_eq!(st.border, Some((RGB8::new(255, 0, 0), 2)));
    }

    #[test]
    fn banner_uses_accent_color() {
        let data = SignageData {
            category: crate::model::Category::Custom,
            custom_color: Some("rgb(1, 2, 3)".into()),
            ..Default::default()
        };
        let branding = BrandingConfig::default();
        let tree = render_tree(&data, &branding);
        let sheet = Stylesheet::for_sign(&tree, &branding);
        let out = inline_styles(&frame_with(StyleClass::Banner), &sheet);
        assert_eq!(out.nodes[0].style.background, Some(RGB8::new(1, 2, 3)));
    }
}
