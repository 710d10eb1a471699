//! SignKit
//!
//! Safety signage generator: a typed data model for a sign, a pure rendering
//! pipeline that turns it into a preview, and exporters that write the preview
//! out as PNG, WebP, PDF, SVG or a print document.
//!
//! # Example
//!
//! ```no_run
//! use signkit::export::{ExportFormat, Exporter};
//! use signkit::model::{BrandingConfig, Category, SignageData};
//! use signkit::notify::LogNotifier;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = SignageData {
//!     title: "Hot work area".to_string(),
//!     category: Category::Fire,
//!     ..Default::default()
//! };
//!
//! let exporter = Exporter::new(Default::default(), std::sync::Arc::new(LogNotifier));
//! let artifact = exporter.export_blocking(&data, &BrandingConfig::default(), ExportFormat::Png)?;
//! std::fs::write(&artifact.file_name, &artifact.bytes)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod color;
pub mod config;
pub mod lookup;
pub mod model;
pub mod qr;

// Tree → layout → inlined styles → display list → pixels / markup
pub mod rendering;

pub mod export;
pub mod notify;
pub mod storage;

pub use config::{AppConfig, ExportConfig, RenderConfig};

use model::{Orientation, PaperSize};

/// Page dimensions in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Page size for a paper format at `ppi` logical pixels per inch.
    ///
    /// ```
    /// use signkit::model::{Orientation, PaperSize};
    /// let page = signkit::Viewport::for_paper(PaperSize::A4, Orientation::Portrait, 96.0);
    /// assert_eq!((page.width, page.height), (794, 1123));
    /// ```
    pub fn for_paper(paper: PaperSize, orientation: Orientation, ppi: f32) -> Self {
        let (w_mm, h_mm) = paper.dimensions_mm();
        let (w_mm, h_mm) = match orientation {
            Orientation::Portrait => (w_mm, h_mm),
            Orientation::Landscape => (h_mm, w_mm),
        };
        let px = |mm: f32| ((mm / 25.4 * ppi).round() as u32).max(1);
        Self { width: px(w_mm), height: px(h_mm) }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::for_paper(PaperSize::A4, Orientation::Portrait, config::CSS_PPI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport_is_a4_portrait() {
        let viewport = Viewport::default();
        assert_eq!(viewport.width, 794);
        assert_eq!(viewport.height, 1123);
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let p = Viewport::for_paper(PaperSize::Letter, Orientation::Portrait, 96.0);
        let l = Viewport::for_paper(PaperSize::Letter, Orientation::Landscape, 96.0);
        assert_eq!((p.width, p.height), (l.height, l.width));
        assert_eq!(p.width, 816);
    }
}
