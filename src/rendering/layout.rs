//! Block layout of a signage tree onto a fixed-size page.
//!
//! Coordinates are logical pixels at `RenderConfig::pixels_per_inch`. Text is
//! measured with the 8x8 bitmap font used by the rasterizer, so a glyph at
//! scale `s` is `8 * s` pixels wide and tall.

use crate::lookup::Icon;
use crate::model::{ImageSource, LogoPosition};
use crate::qr::{self, QrMatrix, QrResolution};
use crate::rendering::preview::{
    ContactsSection, FooterSection, HeaderSection, PpeItem, PpeSection, Section, SignageTree,
};
use crate::rendering::style::StyleClass;
use crate::{RenderConfig, Result, Viewport};

pub const GLYPH: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// What a node draws
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A filled and/or bordered box
    Block,
    /// One or more lines of text (`\n` separated)
    Text { text: String, scale: u32 },
    Image { source: ImageSource, opacity: f32 },
    /// A round badge with a short glyph
    Icon { icon: Icon },
    Qr(QrMatrix),
}

/// A laid-out element. The `class` is resolved to concrete colors later.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub rect: Rect,
    pub kind: NodeKind,
    pub class: StyleClass,
}

/// A full page of laid-out nodes, in paint order
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<LayoutNode>,
}

impl Frame {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| match &n.kind {
            NodeKind::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Greedy word wrap at `max_chars` per line; words longer than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut cur = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > max_chars {
                if !cur.is_empty() {
                    lines.push(std::mem::take(&mut cur));
                }
                let head = word.chars().take(max_chars).collect::<String>();
                word = word.chars().skip(max_chars).collect();
                lines.push(head);
            }
            if word.is_empty() {
                continue;
            }
            if cur.chars().count() + word.chars().count() + 1 > max_chars && !cur.is_empty() {
                lines.push(std::mem::take(&mut cur));
            }
            if !cur.is_empty() {
                cur.push(' ');
            }
            cur.push_str(&word);
        }
        if !cur.is_empty() {
            lines.push(cur);
        }
    }
    lines
}

struct Cursor<'a> {
    cfg: &'a RenderConfig,
    page: Viewport,
    y: i32,
    nodes: Vec<LayoutNode>,
}

impl<'a> Cursor<'a> {
    fn left(&self) -> i32 {
        self.cfg.padding as i32
    }

    fn content_width(&self) -> u32 {
        self.page.width.saturating_sub(self.cfg.padding * 2)
    }

    fn line_height(&self, scale: u32) -> u32 {
        GLYPH * scale + self.cfg.line_spacing
    }

    fn push(&mut self, rect: Rect, kind: NodeKind, class: StyleClass) {
        self.nodes.push(LayoutNode { rect, kind, class });
    }

    /// Place wrapped text at (x, y) within `width`; returns the height used.
    fn text_at(&mut self, x: i32, y: i32, width: u32, text: &str, scale: u32, class: StyleClass) -> u32 {
        let chars = (width / (GLYPH * scale)).max(1) as usize;
        let lines = wrap_text(text, chars);
        if lines.is_empty() {
            return 0;
        }
        let h = lines.len() as u32 * self.line_height(scale);
        self.push(
            Rect::new(x, y, width, h),
            NodeKind::Text { text: lines.join("\n"), scale },
            class,
        );
        h
    }

    /// Full-width text at the cursor, advancing it.
    fn text_block(&mut self, text: &str, scale: u32, class: StyleClass) {
        let (x, y, w) = (self.left(), self.y, self.content_width());
        let h = self.text_at(x, y, w, text, scale, class);
        self.y += h as i32;
    }

    fn gap(&mut self) {
        self.y += self.cfg.section_gap as i32;
    }

    fn heading(&mut self, text: &str) {
        let scale = self.cfg.heading_scale;
        self.text_block(text, scale, StyleClass::Heading);
        self.y += self.cfg.line_spacing as i32;
    }
}

/// Lay out a signage tree on a page.
pub fn layout_tree(tree: &SignageTree, page: Viewport, cfg: &RenderConfig) -> Result<Frame> {
    let mut c = Cursor { cfg, page, y: 0, nodes: Vec::new() };
    c.push(Rect::new(0, 0, page.width, page.height), NodeKind::Block, StyleClass::Page);
    c.y = cfg.padding as i32;

    let mut footer = None;
    for section in &tree.sections {
        match section {
            Section::Header(h) => layout_header(&mut c, h),
            Section::Location(loc) => {
                let scale = cfg.body_scale;
                c.text_block(&format!("LOCATION: {}", loc), scale, StyleClass::Location);
            }
            Section::Description(d) => c.text_block(d, cfg.body_scale, StyleClass::Body),
            Section::Hazards(hazards) => {
                c.heading("HAZARDS");
                for h in hazards {
                    c.text_block(&format!("- {}", h), cfg.body_scale, StyleClass::Hazard);
                }
            }
            Section::Ppe(p) => layout_ppe(&mut c, p),
            Section::Procedures(steps) => {
                c.heading("PROCEDURES");
                for (i, s) in steps.iter().enumerate() {
                    c.text_block(&format!("{}. {}", i + 1, s), cfg.body_scale, StyleClass::Body);
                }
            }
            Section::Permit(details) => layout_permit(&mut c, details),
            Section::ContactsQr(cq) => layout_contacts(&mut c, cq)?,
            Section::Footer(f) => {
                // The footer is pinned to the bottom edge after everything else
                footer = Some(f);
                continue;
            }
        }
        c.gap();
    }

    if let Some(f) = footer {
        layout_footer(&mut c, f);
    }

    if c.y > page.height as i32 {
        log::warn!(
            "signage content overflows the page by {}px and will be clipped",
            c.y - page.height as i32
        );
    }

    Ok(Frame { width: page.width, height: page.height, nodes: c.nodes })
}

fn layout_header(c: &mut Cursor, h: &HeaderSection) {
    let cfg = c.cfg;
    let (left, width) = (c.left(), c.content_width());

    if !h.branding_text.is_empty() {
        let band_h = c.line_height(cfg.body_scale) + 16;
        c.push(Rect::new(0, 0, c.page.width, band_h), NodeKind::Block, StyleClass::BrandHeader);
        let y = 8;
        c.text_at(left, y, width, &h.branding_text, cfg.body_scale, StyleClass::BrandHeaderText);
        c.y = c.y.max(band_h as i32 + cfg.section_gap as i32);
    }

    // Logo row: company logo plus the client/contractor pair
    let logo_size = h.logo.as_ref().map(|l| l.size).unwrap_or(0);
    let partner_size = 48u32;
    let has_partners = h.left_logo.is_some() || h.right_logo.is_some();
    if h.logo.is_some() || has_partners {
        let row_h = logo_size.max(if has_partners { partner_size } else { 0 });
        let mut left_x = left;
        let mut right_x = left + width as i32;
        if let Some(logo) = &h.logo {
            let x = match logo.position {
                LogoPosition::TopLeft => {
                    left_x += (logo.size + 8) as i32;
                    left
                }
                LogoPosition::TopCenter => left + (width as i32 - logo.size as i32) / 2,
                _ => {
                    right_x -= (logo.size + 8) as i32;
                    left + width as i32 - logo.size as i32
                }
            };
            c.push(
                Rect::new(x, c.y, logo.size, logo.size),
                NodeKind::Image { source: logo.source.clone(), opacity: logo.opacity },
                StyleClass::Logo,
            );
        }
        if let Some(src) = &h.left_logo {
            c.push(
                Rect::new(left_x, c.y, partner_size, partner_size),
                NodeKind::Image { source: src.clone(), opacity: 1.0 },
                StyleClass::Logo,
            );
        }
        if let Some(src) = &h.right_logo {
            c.push(
                Rect::new(right_x - partner_size as i32, c.y, partner_size, partner_size),
                NodeKind::Image { source: src.clone(), opacity: 1.0 },
                StyleClass::Logo,
            );
        }
        c.y += row_h as i32 + cfg.section_gap as i32;
    }

    // Category banner
    let banner_text_h = GLYPH * cfg.title_scale;
    let banner_h = banner_text_h + 24;
    c.push(Rect::new(left, c.y, width, banner_h), NodeKind::Block, StyleClass::Banner);
    let badge = banner_h - 12;
    c.push(
        Rect::new(left + 6, c.y + 6, badge, badge),
        NodeKind::Icon { icon: h.icon },
        StyleClass::BannerIcon,
    );
    let text_x = left + badge as i32 + 18;
    c.push(
        Rect::new(text_x, c.y + 12, width.saturating_sub(badge + 24), banner_text_h),
        NodeKind::Text { text: h.banner.to_string(), scale: cfg.title_scale },
        StyleClass::BannerText,
    );
    c.y += banner_h as i32 + cfg.section_gap as i32;

    if !h.title.is_empty() {
        c.text_block(&h.title.to_uppercase(), cfg.title_scale.saturating_sub(1).max(1), StyleClass::Title);
        c.y += cfg.line_spacing as i32;
    }
    if !h.purpose.is_empty() {
        c.text_block(&h.purpose, cfg.body_scale, StyleClass::Purpose);
    }
}

fn layout_ppe(c: &mut Cursor, p: &PpeSection) {
    c.heading("REQUIRED PPE");
    let cols = p.columns.max(1) as u32;
    let gap = 8u32;
    let width = c.content_width();
    let cell_w = width.saturating_sub(gap * (cols - 1)) / cols;
    let badge = cell_w.saturating_sub(24).min(72).max(16);
    let label_chars = (cell_w.saturating_sub(8) / GLYPH).max(1) as usize;

    // All cells in a row share the height of the tallest label
    for row in p.items.chunks(cols as usize) {
        let label_lines = row
            .iter()
            .map(|it| wrap_text(it.label(), label_chars).len().max(1))
            .max()
            .unwrap_or(1) as u32;
        let cell_h = 8 + badge + 8 + label_lines * c.line_height(1) + 8;
        for (i, item) in row.iter().enumerate() {
            let x = c.left() + (i as u32 * (cell_w + gap)) as i32;
            c.push(Rect::new(x, c.y, cell_w, cell_h), NodeKind::Block, StyleClass::PpeCell);
            let bx = x + (cell_w as i32 - badge as i32) / 2;
            let brect = Rect::new(bx, c.y + 8, badge, badge);
            match item {
                PpeItem::Standard { icon, .. } => {
                    c.push(brect, NodeKind::Icon { icon: *icon }, StyleClass::PpeIcon)
                }
                PpeItem::Custom { image, .. } => c.push(
                    brect,
                    NodeKind::Image { source: image.clone(), opacity: 1.0 },
                    StyleClass::PpeImage,
                ),
            }
            let ly = c.y + (8 + badge + 8) as i32;
            c.text_at(x + 4, ly, cell_w.saturating_sub(8), item.label(), 1, StyleClass::PpeLabel);
        }
        c.y += (cell_h + gap) as i32;
    }
}

fn layout_permit(c: &mut Cursor, details: &str) {
    let cfg = c.cfg;
    let (left, width) = (c.left(), c.content_width());
    let inner_w = width.saturating_sub(24);
    let title_h = c.line_height(cfg.heading_scale);
    let detail_lines = wrap_text(details, (inner_w / (GLYPH * cfg.body_scale)).max(1) as usize).len() as u32;
    let box_h = 12 + title_h + detail_lines * c.line_height(cfg.body_scale) + 12;

    let top = c.y;
    c.push(Rect::new(left, top, width, box_h), NodeKind::Block, StyleClass::Permit);
    c.text_at(left + 12, top + 12, inner_w, "PERMIT REQUIRED", cfg.heading_scale, StyleClass::PermitTitle);
    if !details.is_empty() {
        c.text_at(left + 12, top + 12 + title_h as i32, inner_w, details, cfg.body_scale, StyleClass::PermitText);
    }
    c.y = top + box_h as i32;
}

fn layout_contacts(c: &mut Cursor, cq: &ContactsSection) -> Result<()> {
    let cfg = c.cfg;
    let (left, width) = (c.left(), c.content_width());
    let matrix = match &cq.qr {
        Some(QrResolution::Payload { text, .. }) => Some(qr::encode_qr(text)?),
        _ => None,
    };
    let qr_size = match (&cq.qr, &matrix) {
        (None, _) => 0,
        // at least one pixel per module, even when that outgrows `qr_size`
        (Some(_), Some(m)) => cfg.qr_size.min(width / 2).max(m.span()).min(width),
        (Some(_), None) => cfg.qr_size.min(width / 2),
    };
    let text_w = width.saturating_sub(if qr_size > 0 { qr_size + 16 } else { 0 });
    let top = c.y;

    let mut y = top;
    if !cq.contacts.is_empty() {
        y += c.text_at(left, y, text_w, "EMERGENCY CONTACTS", cfg.heading_scale, StyleClass::Heading) as i32;
        y += cfg.line_spacing as i32;
        for contact in &cq.contacts {
            let line = format!("{}: {}", contact.label.trim(), contact.number.trim());
            y += c.text_at(left, y, text_w, &line, cfg.body_scale, StyleClass::Contact) as i32;
        }
    }

    if let Some(resolution) = &cq.qr {
        let rect = Rect::new(left + width as i32 - qr_size as i32, top, qr_size, qr_size);
        match (matrix, resolution) {
            (Some(matrix), _) => c.push(rect, NodeKind::Qr(matrix), StyleClass::QrCode),
            (None, QrResolution::Image(source)) => c.push(
                rect,
                NodeKind::Image { source: source.clone(), opacity: 1.0 },
                StyleClass::QrImage,
            ),
            (None, QrResolution::Payload { .. }) => {}
        }
    }

    c.y = y.max(top + qr_size as i32);
    Ok(())
}

fn layout_footer(c: &mut Cursor, f: &FooterSection) {
    let cfg = c.cfg;
    let (left, width) = (c.left(), c.content_width());
    let logo_size = f.logo.as_ref().map(|l| l.size).unwrap_or(0);
    let text_w = width.saturating_sub(if logo_size > 0 { logo_size + 8 } else { 0 });
    let chars = (text_w / (GLYPH * cfg.footer_scale)).max(1) as usize;
    let lines = [&f.text, &f.branding_text]
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| wrap_text(t, chars).len() as u32)
        .sum::<u32>();
    let text_h = lines * c.line_height(cfg.footer_scale);
    let footer_h = text_h.max(logo_size) + 24;
    let top = c.page.height as i32 - footer_h as i32;

    c.push(Rect::new(0, top, c.page.width, footer_h), NodeKind::Block, StyleClass::Footer);
    let text_x = match f.logo.as_ref().map(|l| l.position) {
        Some(LogoPosition::BottomLeft) => left + logo_size as i32 + 8,
        _ => left,
    };
    let mut y = top + 12;
    for t in [&f.text, &f.branding_text] {
        if !t.is_empty() {
            y += c.text_at(text_x, y, text_w, t, cfg.footer_scale, StyleClass::FooterText) as i32;
        }
    }
    if let Some(logo) = &f.logo {
        let x = match logo.position {
            LogoPosition::BottomLeft => left,
            _ => left + width as i32 - logo.size as i32,
        };
        c.push(
            Rect::new(x, top + 12, logo.size, logo.size),
            NodeKind::Image { source: logo.source.clone(), opacity: logo.opacity },
            StyleClass::Logo,
        );
    }
}
