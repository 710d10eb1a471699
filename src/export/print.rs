//! Print output
//!
//! Printing skips the clone pipeline: the on-screen preview element is handed
//! to the platform print pipeline together with a print-only stylesheet that
//! hides everything else on the page and pins `@page size` to the configured
//! paper.

use crate::model::{Orientation, PaperSize};
use crate::rendering::html::PREVIEW_ELEMENT_ID;
use crate::Result;

/// A complete HTML document ready for the print dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDocument {
    pub html: String,
    pub paper: PaperSize,
    pub orientation: Orientation,
}

/// Print-only CSS for a paper format
pub fn print_stylesheet(paper: PaperSize, orientation: Orientation) -> String {
    let orientation = match orientation {
        Orientation::Portrait => "portrait",
        Orientation::Landscape => "landscape",
    };
    format!(
        "@page {{ size: {paper} {orientation}; margin: 0; }}\n\
         @media print {{\n\
         \x20 body * {{ visibility: hidden; }}\n\
         \x20 #{id}, #{id} * {{ visibility: visible; }}\n\
         \x20 #{id} {{ position: fixed !important; left: 0 !important; top: 0 !important; \
         width: 100% !important; height: 100% !important; margin: 0; }}\n\
         \x20 html, body {{ margin: 0; padding: 0; -webkit-print-color-adjust: exact; print-color-adjust: exact; }}\n\
         }}\n",
        paper = paper.css_name(),
        orientation = orientation,
        id = PREVIEW_ELEMENT_ID,
    )
}

/// Wrap a page body (which must contain the preview element) in a printable
/// document.
pub fn print_document(page_body: &str, paper: PaperSize, orientation: Orientation) -> PrintDocument {
    let html = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Safety sign</title>\n\
         <style media=\"print\">\n{}</style></head>\n<body>{}</body></html>\n",
        print_stylesheet(paper, orientation),
        page_body
    );
    PrintDocument { html, paper, orientation }
}

/// Hands a document to the platform print pipeline
pub trait PrintSpooler: Send + Sync {
    fn spool(&self, document: &PrintDocument) -> Result<()>;
}

/// Spooler that only logs; the document itself is returned as the artifact
#[derive(Debug, Default)]
pub struct LogSpooler;

impl PrintSpooler for LogSpooler {
    fn spool(&self, document: &PrintDocument) -> Result<()> {
        log::info!(
            "print job queued: {} {:?}, {} bytes",
            document.paper.css_name(),
            document.orientation,
            document.html.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_pins_page_size_and_hides_other_content() {
        let css = print_stylesheet(PaperSize::Letter, Orientation::Landscape);
        assert!(css.contains("@page { size: letter landscape;"));
        assert!(css.contains("@media print"));
        assert!(css.contains("body * { visibility: hidden; }"));
        assert!(css.contains("#signage-preview, #signage-preview * { visibility: visible; }"));
    }

    #[test]
    fn document_embeds_body() {
        let doc = print_document("<div id=\"signage-preview\"></div>", PaperSize::A3, Orientation::Portrait);
        assert!(doc.html.starts_with("<!DOCTYPE html>"));
        assert!(doc.html.contains("size: A3 portrait"));
        assert!(doc.html.contains("<body><div id=\"signage-preview\"></div></body>"));
    }
}
