use std::sync::Arc;

use super::print::{print_document, LogSpooler, PrintSpooler};
use super::stage::Stage;
use super::{new_backend, Artifact, ExportFormat, ExportJob};
use crate::config::ExportConfig;
use crate::model::{BrandingConfig, SignageData};
use crate::notify::{Notifier, Toast};
use crate::rendering::{paint, render_sign, RenderedSign};
use crate::{Error, RenderConfig, Result, Viewport};

/// Drives an export from sign data to artifact.
///
/// The sign data is only ever borrowed. A failed export is logged and
/// reported through the [`Notifier`] as a dismissible toast; nothing is
/// retried.
#[derive(Clone)]
pub struct Exporter {
    config: ExportConfig,
    render: RenderConfig,
    stage: Arc<Stage>,
    notifier: Arc<dyn Notifier>,
    spooler: Arc<dyn PrintSpooler>,
}

impl Exporter {
    pub fn new(config: ExportConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            render: RenderConfig::default(),
            stage: Stage::new(),
            notifier,
            spooler: Arc::new(LogSpooler),
        }
    }

    pub fn with_render_config(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn with_spooler(mut self, spooler: Arc<dyn PrintSpooler>) -> Self {
        self.spooler = spooler;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// The document holding the preview and any in-flight clones
    pub fn stage(&self) -> &Arc<Stage> {
        &self.stage
    }

    /// Page the sign is laid out on
    pub fn page(&self) -> Viewport {
        Viewport::for_paper(self.config.paper, self.config.orientation, self.render.pixels_per_inch)
    }

    /// Render the on-screen preview and return its markup
    pub fn preview_html(&self, data: &SignageData, branding: &BrandingConfig) -> Result<String> {
        let sign = render_sign(data, branding, self.page(), &self.render)?;
        let html = sign.to_html(&self.render);
        self.stage.show(sign);
        Ok(html)
    }

    pub fn export_blocking(
        &self,
        data: &SignageData,
        branding: &BrandingConfig,
        format: ExportFormat,
    ) -> Result<Artifact> {
        let result = self.run(data, branding, format);
        match &result {
            Ok(artifact) => log::info!("exported {} ({} bytes)", artifact.file_name, artifact.bytes.len()),
            Err(err) => self.report(format, err),
        }
        result
    }

    /// Run an export on the blocking pool. Overlapping calls are safe: each
    /// one mounts and removes its own clone.
    pub async fn export(
        &self,
        data: &SignageData,
        branding: &BrandingConfig,
        format: ExportFormat,
    ) -> Result<Artifact> {
        let this = self.clone();
        let data = data.clone();
        let branding = branding.clone();
        match tokio::task::spawn_blocking(move || this.export_blocking(&data, &branding, format)).await {
            Ok(result) => result,
            Err(join) => {
                let err = Error::ExportError(format!("export task failed: {}", join));
                self.report(format, &err);
                Err(err)
            }
        }
    }

    fn report(&self, format: ExportFormat, err: &Error) {
        log::error!("{} export failed: {}", format, err);
        self.notifier.notify(Toast::error(format!("Export failed: {}", err)));
    }

    fn run(&self, data: &SignageData, branding: &BrandingConfig, format: ExportFormat) -> Result<Artifact> {
        self.config.validate()?;
        let sign = render_sign(data, branding, self.page(), &self.render)?;
        self.stage.show(sign.clone());

        if format == ExportFormat::Print {
            return self.print(&sign);
        }

        let backend = new_backend(format)?;
        let clone = self.stage.mount_offscreen_from(&sign)?;
        let frame = clone.frame()?;
        let commands = paint::paint(&frame, self.render.line_spacing);
        let job = ExportJob {
            frame: &frame,
            commands: &commands,
            config: &self.config,
        };
        let bytes = backend.encode(&job)?;
        drop(clone);

        Ok(self.artifact(format, bytes))
    }

    /// Send the page, with `sign` as its preview, to the print pipeline
    fn print(&self, sign: &RenderedSign) -> Result<Artifact> {
        let body = self.stage.page_body_for(sign, self.render.line_spacing);
        let document = print_document(&body, self.config.paper, self.config.orientation);
        self.spooler.spool(&document)?;
        Ok(self.artifact(ExportFormat::Print, document.html.into_bytes()))
    }

    fn artifact(&self, format: ExportFormat, bytes: Vec<u8>) -> Artifact {
        Artifact {
            file_name: format!("{}.{}", self.config.file_stem, format.extension()),
            mime: format.mime(),
            bytes,
        }
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("config", &self.config)
            .field("render", &self.render)
            .field("mounted_clones", &self.stage.mounted_clones())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomPpeImage, ImageSource};
    use crate::notify::{MemoryNotifier, ToastLevel};

    fn exporter(notifier: Arc<MemoryNotifier>) -> Exporter {
        let config = ExportConfig { dpi: 96, ..Default::default() };
        Exporter::new(config, notifier)
    }

    #[test]
    fn png_export_names_the_file_and_cleans_up() {
        let notifier = Arc::new(MemoryNotifier::new());
        let ex = exporter(notifier.clone());
        let data = SignageData { title: "Forklift route".into(), ..Default::default() };
        let artifact = ex.export_blocking(&data, &BrandingConfig::default(), ExportFormat::Png).unwrap();
        assert_eq!(artifact.file_name, "safety-sign.png");
        assert_eq!(artifact.mime, "image/png");
        assert!(!artifact.is_empty());
        assert_eq!(ex.stage().mounted_clones(), 0);
        assert!(notifier.toasts().is_empty());
    }

    #[test]
    fn broken_image_fails_with_toast_and_no_leftover_clone() {
        let notifier = Arc::new(MemoryNotifier::new());
        let ex = exporter(notifier.clone());
        let mut data = SignageData::default();
        data.custom_ppe_images.push(CustomPpeImage {
            image: ImageSource::from_bytes("image/png", b"garbage"),
            label: "Chem suit".into(),
        });
        let before = data.clone();
        let err = ex.export_blocking(&data, &BrandingConfig::default(), ExportFormat::Png);
        assert!(err.is_err());
        assert_eq!(ex.stage().mounted_clones(), 0);
        let toasts = notifier.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, ToastLevel::Error);
        assert!(toasts[0].dismissible);
        assert_eq!(data, before);
    }

    #[test]
    fn invalid_config_is_reported() {
        let notifier = Arc::new(MemoryNotifier::new());
        let ex = Exporter::new(ExportConfig { dpi: 0, ..Default::default() }, notifier.clone());
        assert!(ex.export_blocking(&SignageData::default(), &BrandingConfig::default(), ExportFormat::Svg).is_err());
        assert_eq!(notifier.toasts().len(), 1);
    }
}
