//! PNG and WebP output

use image::ImageFormat;

use super::{ExportBackend, ExportFormat, ExportJob};
use crate::rendering::raster::rasterize;
use crate::rendering::Canvas;
use crate::{Error, Result};

/// Rasterize a job at the DPI-derived scale
pub fn render_canvas(job: &ExportJob<'_>) -> Result<Canvas> {
    let scale = job.config.scale();
    log::debug!("export at {} dpi -> scale {:.3}", job.config.dpi, scale);
    rasterize(job.commands, job.frame.width, job.frame.height, scale)
}

#[derive(Debug)]
pub struct RasterBackend {
    format: ExportFormat,
    encoding: ImageFormat,
}

impl RasterBackend {
    pub fn new(format: ExportFormat) -> Result<Self> {
        let encoding = match format {
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::WebP => ImageFormat::WebP,
            other => {
                return Err(Error::ExportError(format!("{} is not a raster format", other)))
            }
        };
        Ok(Self { format, encoding })
    }
}

impl ExportBackend for RasterBackend {
    fn format(&self) -> ExportFormat {
        self.format
    }

    fn encode(&self, job: &ExportJob<'_>) -> Result<Vec<u8>> {
        let canvas = render_canvas(job)?;
        let bytes = canvas.encode(self.encoding)?;
        if bytes.is_empty() {
            return Err(Error::ExportError(format!("{} encoder produced no data", self.format)));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::rendering::paint::PaintCommand;
    use crate::rendering::style::InlinedFrame;

    fn job_parts() -> (InlinedFrame, Vec<PaintCommand>) {
        let frame = InlinedFrame { width: 40, height: 20, nodes: Vec::new() };
        let cmds = vec![PaintCommand::SolidRect { x: 0, y: 0, width: 10, height: 10, rgba: (0, 0, 0, 255) }];
        (frame, cmds)
    }

    #[test]
    fn png_is_scaled_by_dpi() {
        let (frame, cmds) = job_parts();
        let config = ExportConfig { dpi: 192, ..Default::default() };
        let job = ExportJob { frame: &frame, commands: &cmds, config: &config };
        let bytes = RasterBackend::new(ExportFormat::Png).unwrap().encode(&job).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (80, 40));
    }

    #[test]
    fn webp_encodes() {
        let (frame, cmds) = job_parts();
        let config = ExportConfig::default();
        let job = ExportJob { frame: &frame, commands: &cmds, config: &config };
        let bytes = RasterBackend::new(ExportFormat::WebP).unwrap().encode(&job).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn non_raster_format_is_rejected() {
        assert!(RasterBackend::new(ExportFormat::Svg).is_err());
    }
}
