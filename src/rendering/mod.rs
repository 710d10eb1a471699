//! Rendering pipeline
//!
//! `SignageData` → [`preview::SignageTree`] → [`layout::Frame`] →
//! [`style::InlinedFrame`] → display list → pixels / markup.
//!
//! The inlined frame is the single intermediate representation: the HTML
//! preview, the rasterizer and the SVG writer all consume it.

pub mod html;
pub mod layout;
pub mod paint;
pub mod preview;
pub mod raster;
pub mod style;

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use sha2::{Digest, Sha256};

use crate::model::{BrandingConfig, SignageData};
use crate::{RenderConfig, Result, Viewport};

use self::paint::PaintCommand;
use self::preview::SignageTree;
use self::style::{InlinedFrame, Stylesheet};

/// A rasterized sign
#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub pixels: RgbaImage,
}

impl Canvas {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { width: pixels.width(), height: pixels.height(), pixels }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    /// Encode into any raster format the `image` crate can write
    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.pixels.write_to(&mut Cursor::new(&mut out), format)?;
        Ok(out)
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        self.encode(ImageFormat::Png)
    }

    /// SHA-256 over the dimensions and raw pixels, hex encoded.
    /// Stable across encoders, used by golden tests.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update(self.pixels.as_raw());
        hex::encode(hasher.finalize())
    }
}

/// A sign taken through layout and style inlining
#[derive(Debug, Clone)]
pub struct RenderedSign {
    pub tree: SignageTree,
    pub frame: InlinedFrame,
}

impl RenderedSign {
    pub fn display_list(&self, cfg: &RenderConfig) -> Vec<PaintCommand> {
        paint::paint(&self.frame, cfg.line_spacing)
    }

    /// The on-screen preview element
    pub fn to_html(&self, cfg: &RenderConfig) -> String {
        html::render_html(&self.frame, cfg.line_spacing)
    }
}

/// Run the pure part of the pipeline: tree, layout and inlined styles.
pub fn render_sign(
    data: &SignageData,
    branding: &BrandingConfig,
    page: Viewport,
    cfg: &RenderConfig,
) -> Result<RenderedSign> {
    let tree = preview::render_tree(data, branding);
    let frame = layout::layout_tree(&tree, page, cfg)?;
    let sheet = Stylesheet::for_sign(&tree, branding);
    let frame = style::inline_styles(&frame, &sheet);
    Ok(RenderedSign { tree, frame })
}
