//! Export of a rendered sign into a downloadable artifact
//!
//! Raster formats, PDF and SVG go through an off-screen clone of the preview
//! (see [`stage`]); print hands the on-screen preview to a [`PrintSpooler`].
//! Each format is produced by an [`ExportBackend`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ExportConfig;
use crate::rendering::paint::PaintCommand;
use crate::rendering::style::InlinedFrame;
use crate::Result;

mod exporter;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod print;
pub mod raster;
pub mod stage;
pub mod svg;

pub use exporter::Exporter;
pub use print::{LogSpooler, PrintDocument, PrintSpooler};
pub use stage::{OffscreenClone, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    WebP,
    Pdf,
    Svg,
    Print,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Png,
        ExportFormat::WebP,
        ExportFormat::Pdf,
        ExportFormat::Svg,
        ExportFormat::Print,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::WebP => "webp",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Svg => "svg",
            ExportFormat::Print => "html",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::WebP => "image/webp",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Print => "text/html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Png => "png",
            ExportFormat::WebP => "webp",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Svg => "svg",
            ExportFormat::Print => "print",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown export format `{}`", s))
    }
}

/// A finished export, ready to be written or downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Everything a backend needs to produce one artifact
#[derive(Debug, Clone, Copy)]
pub struct ExportJob<'a> {
    /// The off-screen clone, moved back to the origin
    pub frame: &'a InlinedFrame,
    pub commands: &'a [PaintCommand],
    pub config: &'a ExportConfig,
}

/// Core trait for export format implementations
pub trait ExportBackend: Send + Sync {
    fn format(&self) -> ExportFormat;

    /// Encode a job into the artifact bytes
    fn encode(&self, job: &ExportJob<'_>) -> Result<Vec<u8>>;
}

/// Create the backend for a clone-based format.
///
/// Print does not go through a clone and has no backend; the [`Exporter`]
/// spools it directly.
pub fn new_backend(format: ExportFormat) -> Result<Box<dyn ExportBackend>> {
    match format {
        ExportFormat::Png | ExportFormat::WebP => Ok(Box::new(raster::RasterBackend::new(format)?)),
        #[cfg(feature = "pdf")]
        ExportFormat::Pdf => Ok(Box::new(pdf::PdfBackend)),
        #[cfg(not(feature = "pdf"))]
        ExportFormat::Pdf => Err(crate::Error::ExportError(
            "PDF support was not compiled in (enable the `pdf` feature)".into(),
        )),
        ExportFormat::Svg => Ok(Box::new(svg::SvgBackend)),
        ExportFormat::Print => Err(crate::Error::ExportError(
            "print output is spooled from the on-screen preview".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("webp".parse::<ExportFormat>().unwrap(), ExportFormat::WebP);
        assert_eq!("print".parse::<ExportFormat>().unwrap(), ExportFormat::Print);
        assert!("tiff".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn backends_report_their_format() {
        for format in [ExportFormat::Png, ExportFormat::WebP, ExportFormat::Svg] {
            assert_eq!(new_backend(format).unwrap().format(), format);
        }
        assert!(new_backend(ExportFormat::Print).is_err());
    }

    #[test]
    fn serde_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&ExportFormat::WebP).unwrap(), "\"webp\"");
    }
}
