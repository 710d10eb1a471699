//! Single-page PDF output
//!
//! The rasterized sign is embedded as one JPEG (`DCTDecode`) image XObject
//! stretched over the whole page, so the PDF looks exactly like the PNG.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::raster::render_canvas;
use super::{ExportBackend, ExportFormat, ExportJob};
use crate::model::{Orientation, PaperSize};
use crate::rendering::Canvas;
use crate::Result;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Page size in PDF points for a paper format
pub fn page_size_pt(paper: PaperSize, orientation: Orientation) -> (f32, f32) {
    let (w, h) = paper.dimensions_mm();
    let (w, h) = match orientation {
        Orientation::Portrait => (w, h),
        Orientation::Landscape => (h, w),
    };
    (w * POINTS_PER_MM, h * POINTS_PER_MM)
}

fn encode_jpeg(canvas: &Canvas, quality: u8) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(canvas.pixels.clone()).to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode_image(&rgb)?;
    Ok(out)
}

/// Build a one-page document with `jpeg` drawn full-bleed.
pub fn build_document(
    jpeg: Vec<u8>,
    pixel_width: u32,
    pixel_height: u32,
    page: (f32, f32),
) -> Result<Vec<u8>> {
    let (page_w, page_h) = page;
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => pixel_width as i64,
            "Height" => pixel_height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "DCTDecode",
        },
        jpeg,
    );
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(page_w),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page_h),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page_w),
            Object::Real(page_h),
        ],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1_i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

#[derive(Debug, Default)]
pub struct PdfBackend;

impl ExportBackend for PdfBackend {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn encode(&self, job: &ExportJob<'_>) -> Result<Vec<u8>> {
        let canvas = render_canvas(job)?;
        let jpeg = encode_jpeg(&canvas, job.config.jpeg_quality)?;
        let page = page_size_pt(job.config.paper, job.config.orientation);
        log::debug!(
            "pdf page {:.1}x{:.1}pt from {}x{} image",
            page.0,
            page.1,
            canvas.width,
            canvas.height
        );
        build_document(jpeg, canvas.width, canvas.height, page)
    }
}
