use std::sync::{Arc, Mutex};

use signkit::export::{ExportFormat, Exporter, PrintDocument, PrintSpooler};
use signkit::model::{
    BrandingConfig, Category, CustomPpeImage, EmergencyContact, ImageSource, Orientation, PaperSize, Ppe,
    QrContentBox, SignageData,
};
use signkit::notify::{MemoryNotifier, ToastLevel};
use signkit::ExportConfig;

fn confined_space() -> SignageData {
    SignageData {
        title: "Confined space".into(),
        category: Category::Danger,
        ppe: vec![Ppe::Hardhat, Ppe::Gloves],
        procedures: vec!["Test gas before entry".into(), "Wear harness".into()],
        emergency_contacts: vec![EmergencyContact::new("Emergency", "911")],
        ..Default::default()
    }
}

fn exporter(config: ExportConfig) -> (Exporter, Arc<MemoryNotifier>) {
    let notifier = Arc::new(MemoryNotifier::new());
    (Exporter::new(config, notifier.clone()), notifier)
}

#[test]
fn png_at_300_dpi_is_a_non_empty_image() {
    let (ex, notifier) = exporter(ExportConfig { dpi: 300, ..Default::default() });
    let data = confined_space();
    let artifact = ex
        .export_blocking(&data, &BrandingConfig::default(), ExportFormat::Png)
        .expect("export should succeed");

    assert!(!artifact.bytes.is_empty());
    let img = image::load_from_memory(&artifact.bytes).unwrap();
    // A4 at 96 ppi is 794x1123 logical pixels, scaled by 300/96
    assert_eq!(img.width(), (794.0f32 * 3.125).round() as u32);
    assert_eq!(img.height(), (1123.0f32 * 3.125).round() as u32);
    assert!(notifier.toasts().is_empty());
    assert_eq!(ex.stage().mounted_clones(), 0);
}

#[test]
fn higher_dpi_gives_a_larger_raster() {
    let data = confined_space();
    let size = |dpi| {
        let (ex, _) = exporter(ExportConfig { dpi, ..Default::default() });
        let a = ex.export_blocking(&data, &BrandingConfig::default(), ExportFormat::Png).unwrap();
        image::load_from_memory(&a.bytes).unwrap().width()
    };
    assert!(size(300) > size(72));
}

#[cfg(feature = "pdf")]
#[test]
fn pdf_is_a_single_page_sized_to_the_paper() {
    let config = ExportConfig {
        dpi: 72,
        paper: PaperSize::Letter,
        orientation: Orientation::Landscape,
        ..Default::default()
    };
    let (ex, _) = exporter(config);
    let artifact = ex
        .export_blocking(&confined_space(), &BrandingConfig::default(), ExportFormat::Pdf)
        .unwrap();
    assert_eq!(artifact.mime, "application/pdf");
    assert!(artifact.bytes.starts_with(b"%PDF-"));

    let doc = lopdf::Document::load_mem(&artifact.bytes).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let page_id = *pages.values().next().unwrap();
    let page = doc.get_dictionary(page_id).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let width = media_box[2].as_float().unwrap();
    let height = media_box[3].as_float().unwrap();
    // landscape letter: 11 x 8.5 in
    assert!((width - 792.0).abs() < 0.5, "width {}", width);
    assert!((height - 612.0).abs() < 0.5, "height {}", height);
}

#[test]
fn webp_and_svg_exports() {
    let (ex, _) = exporter(ExportConfig { dpi: 96, ..Default::default() });
    let data = confined_space();

    let webp = ex.export_blocking(&data, &BrandingConfig::default(), ExportFormat::WebP).unwrap();
    assert_eq!(webp.file_name, "safety-sign.webp");
    assert_eq!(&webp.bytes[8..12], b"WEBP");

    let svg = ex.export_blocking(&data, &BrandingConfig::default(), ExportFormat::Svg).unwrap();
    let text = String::from_utf8(svg.bytes).unwrap();
    assert!(text.contains("<svg"));
    assert!(text.contains("CONFINED SPACE") || text.contains("Confined space"));
}

#[derive(Default)]
struct RecordingSpooler {
    jobs: Mutex<Vec<PrintDocument>>,
}

impl PrintSpooler for RecordingSpooler {
    fn spool(&self, document: &PrintDocument) -> signkit::Result<()> {
        self.jobs.lock().unwrap().push(document.clone());
        Ok(())
    }
}

#[test]
fn print_spools_the_preview_with_print_css() {
    let spooler = Arc::new(RecordingSpooler::default());
    let config = ExportConfig { paper: PaperSize::A5, ..Default::default() };
    let (ex, _) = exporter(config);
    let ex = ex.with_spooler(spooler.clone());

    let artifact = ex
        .export_blocking(&confined_space(), &BrandingConfig::default(), ExportFormat::Print)
        .unwrap();
    assert_eq!(artifact.mime, "text/html");

    let jobs = spooler.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    let html = &jobs[0].html;
    assert!(html.contains("@page { size: A5 portrait;"));
    assert!(html.contains("@media print"));
    assert!(html.contains("id=\"signage-preview\""));
    // printing does not go through an off-screen clone
    assert_eq!(ex.stage().mounted_clones(), 0);
}

#[test]
fn failed_export_toasts_cleans_up_and_keeps_data() {
    let (ex, notifier) = exporter(ExportConfig { dpi: 96, ..Default::default() });
    let mut data = confined_space();
    data.custom_ppe_images.push(CustomPpeImage {
        image: ImageSource::from_bytes("image/jpeg", b"\xFF\xD8 truncated"),
        label: "Visor".into(),
    });
    let snapshot = data.clone();

    for format in [ExportFormat::Png, ExportFormat::Pdf] {
        assert!(ex.export_blocking(&data, &BrandingConfig::default(), format).is_err());
    }

    assert_eq!(ex.stage().mounted_clones(), 0);
    let toasts = notifier.toasts();
    assert_eq!(toasts.len(), 2);
    assert!(toasts.iter().all(|t| t.level == ToastLevel::Error && t.dismissible));
    assert_eq!(data, snapshot);
}

#[tokio::test]
async fn overlapping_async_exports_each_succeed() {
    let (ex, notifier) = exporter(ExportConfig { dpi: 96, ..Default::default() });
    let data = confined_space();
    let branding = BrandingConfig::default();

    let (a, b, c) = tokio::join!(
        ex.export(&data, &branding, ExportFormat::Png),
        ex.export(&data, &branding, ExportFormat::Svg),
        ex.export(&data, &branding, ExportFormat::Png),
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert_eq!(a.bytes, c.bytes);
    assert!(!b.bytes.is_empty());
    assert_eq!(ex.stage().mounted_clones(), 0);
    assert!(notifier.toasts().is_empty());
}

#[test]
fn concurrent_exports_of_different_signs_keep_their_own_content() {
    let (ex, notifier) = exporter(ExportConfig { dpi: 96, ..Default::default() });
    let branding = BrandingConfig::default();

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let ex = ex.clone();
            let branding = &branding;
            scope.spawn(move || {
                for round in 0..25 {
                    let title = format!("ZONE{}W{}", round, worker);
                    let data = SignageData { title: title.clone(), ..Default::default() };
                    let format = if round % 5 == 0 { ExportFormat::Print } else { ExportFormat::Svg };
                    let artifact = ex.export_blocking(&data, branding, format).unwrap();
                    let text = String::from_utf8(artifact.bytes).unwrap();
                    assert!(text.contains(&title), "{} export lost {}", format, title);
                }
            });
        }
    });

    assert_eq!(ex.stage().mounted_clones(), 0);
    assert!(notifier.toasts().is_empty());
}

#[test]
fn long_generated_qr_payload_exports() {
    let (ex, notifier) = exporter(ExportConfig { dpi: 96, ..Default::default() });
    let mut data = confined_space();
    data.qr_code_config.content_boxes = (0..52)
        .map(|i| QrContentBox {
            title: format!("Procedure {}", i),
            url: format!("https://docs.example.com/procedures/{:03}", i),
        })
        .collect();

    let artifact = ex
        .export_blocking(&data, &BrandingConfig::default(), ExportFormat::Png)
        .expect("a long payload still fits the page");
    let img = image::load_from_memory(&artifact.bytes).unwrap();
    assert_eq!((img.width(), img.height()), (794, 1123));
    assert!(notifier.toasts().is_empty());
}
