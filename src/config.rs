//! Render, export and application configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::export::ExportFormat;
use crate::model::{Orientation, PaperSize, SignageData};
use crate::{Error, Result};

/// Logical pixels per inch used by layout (the CSS reference pixel)
pub const CSS_PPI: f32 = 96.0;

pub const MIN_EXPORT_SCALE: f32 = 0.5;
pub const MAX_EXPORT_SCALE: f32 = 4.0;

/// Raster scale factor for an export DPI: `dpi / 96`, clamped to [0.5, 4.0].
pub fn scale_for_dpi(dpi: u32) -> f32 {
    (dpi as f32 / CSS_PPI).clamp(MIN_EXPORT_SCALE, MAX_EXPORT_SCALE)
}

/// Layout metrics
///
/// Glyph scales multiply the 8x8 bitmap font, so `title_scale: 4` gives 32px
/// capitals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub pixels_per_inch: f32,
    /// Page margin in logical pixels
    pub padding: u32,
    pub section_gap: u32,
    /// Extra space between text lines
    pub line_spacing: u32,
    pub title_scale: u32,
    pub heading_scale: u32,
    pub body_scale: u32,
    pub footer_scale: u32,
    /// Edge length of a generated QR code
    pub qr_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixels_per_inch: CSS_PPI,
            padding: 32,
            section_gap: 16,
            line_spacing: 4,
            title_scale: 4,
            heading_scale: 2,
            body_scale: 2,
            footer_scale: 1,
            qr_size: 160,
        }
    }
}

/// Export options
///
/// `paper` and `orientation` decide the page the sign is laid out on and,
/// for PDF and print, the physical page size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub dpi: u32,
    pub paper: PaperSize,
    pub orientation: Orientation,
    /// Quality (1-100) of the JPEG page image embedded in PDFs
    pub jpeg_quality: u8,
    /// Base name of the downloaded file, without extension
    pub file_stem: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            dpi: 300,
            paper: PaperSize::A4,
            orientation: Orientation::Portrait,
            jpeg_quality: 92,
            file_stem: "safety-sign".to_string(),
        }
    }
}

impl ExportConfig {
    /// Paper, orientation and resolution as chosen on the sign itself
    pub fn for_sign(data: &SignageData) -> Self {
        Self {
            dpi: data.resolution,
            paper: data.size,
            orientation: data.orientation,
            ..Default::default()
        }
    }

    pub fn scale(&self) -> f32 {
        scale_for_dpi(self.dpi)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(Error::ConfigError("dpi must be positive".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::ConfigError(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.file_stem.trim().is_empty() || self.file_stem.contains(['/', '\\']) {
            return Err(Error::ConfigError(format!("invalid file stem `{}`", self.file_stem)));
        }
        Ok(())
    }
}

/// Top-level configuration file for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub render: RenderConfig,
    pub export: ExportConfig,
    /// Directory backing the file store
    pub storage_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            export: ExportConfig::default(),
            storage_dir: PathBuf::from(".signkit"),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: AppConfig =
            serde_json::from_str(json).map_err(|e| Error::ConfigError(e.to_string()))?;
        cfg.export.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("loaded config from {}", path.display());
        Self::from_json(&text)
    }
}
