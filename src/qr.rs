//! QR code resolution and encoding.

use qrcode::{Color, QrCode};

use crate::model::{ImageSource, QrCodeConfig, QrKind};
use crate::{Error, Result};

/// Which field of the QR configuration produced the resolved value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrOrigin {
    ExistingImage,
    LegacyUrl,
    ContentBoxes,
    AuthorizedPerson,
    OrganizationChart,
    SafetyCommittee,
}

/// A QR configuration resolved into something drawable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrResolution {
    /// Draw the uploaded image as-is
    Image(ImageSource),
    /// Generate a code for this payload
    Payload { origin: QrOrigin, text: String },
}

impl QrResolution {
    pub fn origin(&self) -> QrOrigin {
        match self {
            QrResolution::Image(_) => QrOrigin::ExistingImage,
            QrResolution::Payload { origin, .. } => *origin,
        }
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Resolve a QR configuration. Sources are tried in a fixed order and the
/// first populated one wins:
///
/// 1. an uploaded image (only when the type is `existing`)
/// 2. the legacy single URL
/// 3. the content-box URLs, newline-joined
/// 4. an authorized person reference
/// 5. an organization chart reference
/// 6. a safety committee reference
///
/// Returns `None` when nothing is populated, in which case no QR is drawn.
pub fn resolve_qr(config: &QrCodeConfig) -> Option<QrResolution> {
    if config.kind == QrKind::Existing {
        if let Some(img) = config.existing_qr_code_image.as_ref().filter(|i| !i.is_empty()) {
            return Some(QrResolution::Image(img.clone()));
        }
    }

    if let Some(url) = non_empty(&config.url) {
        return Some(payload(QrOrigin::LegacyUrl, url.to_string()));
    }

    let urls = config
        .content_boxes
        .iter()
        .map(|b| b.url.trim())
        .filter(|u| !u.is_empty())
        .collect::<Vec<_>>();
    if !urls.is_empty() {
        return Some(payload(QrOrigin::ContentBoxes, urls.join("\n")));
    }

    let sources = &config.sources;
    if let Some(id) = non_empty(&sources.authorized_person) {
        return Some(payload(QrOrigin::AuthorizedPerson, format!("authorized-person:{}", id)));
    }
    if let Some(id) = non_empty(&sources.organization_chart) {
        return Some(payload(QrOrigin::OrganizationChart, format!("organization-chart:{}", id)));
    }
    if let Some(id) = non_empty(&sources.safety_committee) {
        return Some(payload(QrOrigin::SafetyCommittee, format!("safety-committee:{}", id)));
    }

    None
}

fn payload(origin: QrOrigin, text: String) -> QrResolution {
    QrResolution::Payload { origin, text }
}

/// A square grid of QR modules, `true` meaning dark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    pub width: usize,
    pub modules: Vec<bool>,
}

/// Light modules kept around the code on each side
pub const QUIET_ZONE: usize = 2;

impl QrMatrix {
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }

    /// Side length in modules, quiet zone included
    pub fn span(&self) -> u32 {
        (self.width + QUIET_ZONE * 2) as u32
    }
}

/// Encode a payload into a QR module grid
pub fn encode_qr(text: &str) -> Result<QrMatrix> {
    let code = QrCode::new(text.as_bytes())
        .map_err(|e| Error::RenderError(format!("QR encoding failed: {}", e)))?;
    let width = code.width();
    let modules = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
    Ok(QrMatrix { width, modules })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QrContentBox, QrSourceSelection};

    fn image() -> ImageSource {
        ImageSource::from_bytes("image/png", b"qr")
    }

    fn everything() -> QrCodeConfig {
        QrCodeConfig {
            kind: QrKind::Existing,
            existing_qr_code_image: Some(image()),
            sources: QrSourceSelection {
                authorized_person: Some("p-1".into()),
                organization_chart: Some("org-1".into()),
                safety_committee: Some("sc-1".into()),
            },
            content_boxes: vec![QrContentBox { title: "Docs".into(), url: "https://a".into() }],
            url: Some("https://legacy".into()),
        }
    }

    #[test]
    fn existing_image_beats_every_other_source() {
        assert_eq!(resolve_qr(&everything()), Some(QrResolution::Image(image())));
    }

    #[test]
    fn image_is_ignored_when_type_is_generated() {
        let cfg = QrCodeConfig { kind: QrKind::Generated, ..everything() };
        assert_eq!(resolve_qr(&cfg).unwrap().origin(), QrOrigin::LegacyUrl);
    }

    #[test]
    fn precedence_walks_down_the_list() {
        let mut cfg = everything();
        cfg.existing_qr_code_image = None;
        assert_eq!(resolve_qr(&cfg).unwrap().origin(), QrOrigin::LegacyUrl);

        cfg.url = Some("   ".into());
        cfg.content_boxes.push(QrContentBox { title: "".into(), url: "".into() });
        cfg.content_boxes.push(QrContentBox { title: "More".into(), url: " https://b ".into() });
        assert_eq!(
            resolve_qr(&cfg),
            Some(QrResolution::Payload {
                origin: QrOrigin::ContentBoxes,
                text: "https://a\nhttps://b".into()
            })
        );

        cfg.content_boxes.clear();
        assert_eq!(
            resolve_qr(&cfg),
            Some(QrResolution::Payload {
                origin: QrOrigin::AuthorizedPerson,
                text: "authorized-person:p-1".into()
            })
        );

        cfg.sources.authorized_person = None;
        assert_eq!(resolve_qr(&cfg).unwrap().origin(), QrOrigin::OrganizationChart);
        cfg.sources.organization_chart = None;
        assert_eq!(resolve_qr(&cfg).unwrap().origin(), QrOrigin::SafetyCommittee);
        cfg.sources.safety_committee = None;
        assert_eq!(resolve_qr(&cfg), None);
    }

    #[test]
    fn encodes_square_matrix() {
        let m = encode_qr("https://example.com").unwrap();
        assert!(m.width >= 21);
        assert_eq!(m.modules.len(), m.width * m.width);
        // Top-left finder pattern corner is always dark
        assert!(m.is_dark(0, 0));
    }
}
