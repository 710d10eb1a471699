//! Signage data model.
//!
//! `SignageData` is the single record the user edits field by field. The
//! rendering and export stages only ever borrow it. Field names serialize in
//! camelCase so persisted drafts keep the same JSON layout the editor uses.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rgb::RGB8;
use serde::{Deserialize, Serialize};

use crate::color;
use crate::lookup;
use crate::{Error, Result};

/// Maximum number of user-supplied PPE images on a single sign
pub const MAX_CUSTOM_PPE_IMAGES: usize = 7;

/// Maximum size of an uploaded image, in bytes
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Safety class of a sign. Drives the default accent color and icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Danger,
    Warning,
    Caution,
    Notice,
    Mandatory,
    Prohibition,
    Emergency,
    Fire,
    Custom,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Danger,
        Category::Warning,
        Category::Caution,
        Category::Notice,
        Category::Mandatory,
        Category::Prohibition,
        Category::Emergency,
        Category::Fire,
        Category::Custom,
    ];
}

/// Personal protective equipment tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ppe {
    Hardhat,
    Gloves,
    SafetyGlasses,
    EarProtection,
    Respirator,
    SafetyBoots,
    HiVisVest,
    Harness,
    FaceShield,
    ProtectiveClothing,
}

impl Ppe {
    pub const ALL: [Ppe; 10] = [
        Ppe::Hardhat,
        Ppe::Gloves,
        Ppe::SafetyGlasses,
        Ppe::EarProtection,
        Ppe::Respirator,
        Ppe::SafetyBoots,
        Ppe::HiVisVest,
        Ppe::Harness,
        Ppe::FaceShield,
        Ppe::ProtectiveClothing,
    ];
}

/// An image carried inline as a `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSource(pub String);

impl ImageSource {
    /// Build a data URL from raw bytes
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        ImageSource(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// MIME type of the embedded payload, if this is a data URL
    pub fn mime(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let (meta, _) = rest.split_once(',')?;
        Some(meta.split(';').next().unwrap_or(""))
    }

    /// Decode the base64 payload of the data URL
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        let rest = self
            .0
            .strip_prefix("data:")
            .ok_or_else(|| Error::ImageError("image is not a data URL".into()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::ImageError("malformed data URL".into()))?;
        if !meta.ends_with(";base64") {
            return Err(Error::ImageError("only base64 data URLs are supported".into()));
        }
        STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::ImageError(format!("invalid base64 payload: {}", e)))
    }

    /// Decode the embedded image into an RGBA buffer
    pub fn decode_image(&self) -> Result<image::RgbaImage> {
        let bytes = self.decode_bytes()?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}

/// A validated file upload, ready to be stored on the model.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub source: ImageSource,
}

impl ImageUpload {
    /// Only raster formats the exporters can decode
    const ACCEPTED: [&'static str; 4] = ["image/png", "image/jpeg", "image/webp", "image/gif"];

    /// Validate an upload. Oversized files and non-image MIME types are
    /// rejected before anything is stored.
    pub fn new(file_name: &str, mime: &str, bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(Error::ValidationError(format!(
                "{} is {} bytes; the limit is 5MB",
                file_name,
                bytes.len()
            )));
        }
        if !Self::ACCEPTED.contains(&mime) {
            return Err(Error::ValidationError(format!(
                "{} has unsupported type {}",
                file_name, mime
            )));
        }
        Ok(Self {
            file_name: file_name.to_string(),
            source: ImageSource::from_bytes(mime, bytes),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPpeImage {
    pub image: ImageSource,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub label: String,
    pub number: String,
}

impl EmergencyContact {
    pub fn new(label: &str, number: &str) -> Self {
        Self { label: label.to_string(), number: number.to_string() }
    }
}

/// Whether the QR code is generated from content or uploaded as an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QrKind {
    #[default]
    Generated,
    Existing,
}

/// A titled URL the user adds to the QR payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QrContentBox {
    pub title: String,
    pub url: String,
}

/// References to directory records that can back a generated QR code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct QrSourceSelection {
    pub authorized_person: Option<String>,
    pub organization_chart: Option<String>,
    pub safety_committee: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct QrCodeConfig {
    #[serde(rename = "type")]
    pub kind: QrKind,
    #[serde(rename = "existingQRCodeImage")]
    pub existing_qr_code_image: Option<ImageSource>,
    pub sources: QrSourceSelection,
    pub content_boxes: Vec<QrContentBox>,
    /// Legacy single-URL field kept for older drafts
    pub url: Option<String>,
}

/// Paper formats supported for print and PDF output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    A5,
    A3,
    Letter,
    Legal,
}

impl PaperSize {
    /// Portrait dimensions in millimetres
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
        }
    }

    /// Name used by CSS `@page size`
    pub fn css_name(self) -> &'static str {
        match self {
            PaperSize::A4 => "A4",
            PaperSize::A5 => "A5",
            PaperSize::A3 => "A3",
            PaperSize::Letter => "letter",
            PaperSize::Legal => "legal",
        }
    }
}

impl std::str::FromStr for PaperSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(PaperSize::A4),
            "a5" => Ok(PaperSize::A5),
            "a3" => Ok(PaperSize::A3),
            "letter" => Ok(PaperSize::Letter),
            "legal" => Ok(PaperSize::Legal),
            other => Err(format!("unknown paper size `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl std::str::FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            other => Err(format!("unknown orientation `{}`", other)),
        }
    }
}

/// Everything the user enters for one sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignageData {
    pub title: String,
    pub purpose: String,
    pub description: String,
    pub category: Category,
    pub custom_color: Option<String>,
    pub location: String,
    pub hazards: Vec<String>,
    pub ppe: Vec<Ppe>,
    #[serde(rename = "customPPEImages")]
    pub custom_ppe_images: Vec<CustomPpeImage>,
    pub procedures: Vec<String>,
    pub permit_required: bool,
    pub permit_details: String,
    pub emergency_contacts: Vec<EmergencyContact>,
    pub qr_code_config: QrCodeConfig,
    pub size: PaperSize,
    pub orientation: Orientation,
    /// Preferred export resolution in DPI
    pub resolution: u32,
    pub footer_text: String,
}

impl Default for SignageData {
    fn default() -> Self {
        Self {
            title: String::new(),
            purpose: String::new(),
            description: String::new(),
            category: Category::default(),
            custom_color: None,
            location: String::new(),
            hazards: Vec::new(),
            ppe: Vec::new(),
            custom_ppe_images: Vec::new(),
            procedures: Vec::new(),
            permit_required: false,
            permit_details: String::new(),
            emergency_contacts: Vec::new(),
            qr_code_config: QrCodeConfig::default(),
            size: PaperSize::default(),
            orientation: Orientation::default(),
            resolution: 300,
            footer_text: String::new(),
        }
    }
}

impl SignageData {
    /// Add a PPE tag, keeping the list free of duplicates.
    /// Returns `false` if the tag was already present.
    pub fn add_ppe(&mut self, ppe: Ppe) -> bool {
        if self.ppe.contains(&ppe) {
            return false;
        }
        self.ppe.push(ppe);
        true
    }

    pub fn remove_ppe(&mut self, ppe: Ppe) {
        self.ppe.retain(|p| *p != ppe);
    }

    /// Attach a validated custom PPE image. Rejected once the sign already
    /// carries `MAX_CUSTOM_PPE_IMAGES`.
    pub fn add_custom_ppe_image(&mut self, upload: ImageUpload, label: &str) -> Result<()> {
        if self.custom_ppe_images.len() >= MAX_CUSTOM_PPE_IMAGES {
            return Err(Error::ValidationError(format!(
                "at most {} custom PPE images are allowed",
                MAX_CUSTOM_PPE_IMAGES
            )));
        }
        self.custom_ppe_images.push(CustomPpeImage {
            image: upload.source,
            label: label.to_string(),
        });
        Ok(())
    }

    /// Switch category. A custom color is only kept for `Category::Custom`.
    pub fn set_category(&mut self, category: Category, custom_color: Option<&str>) -> Result<()> {
        if category == Category::Custom {
            if let Some(c) = custom_color {
                if color::parse_color(c).is_none() {
                    return Err(Error::ValidationError(format!("`{}` is not a valid color", c)));
                }
                self.custom_color = Some(c.to_string());
            }
        }
        self.category = category;
        Ok(())
    }

    /// The accent color of the sign: the category default, or the user's
    /// custom color when the category is `Custom`.
    pub fn accent_color(&self) -> RGB8 {
        let style = lookup::category_style(self.category);
        if self.category == Category::Custom {
            if let Some(c) = self.custom_color.as_deref().and_then(color::parse_color) {
                return c;
            }
        }
        style.border
    }

    /// Number of items shown in the PPE grid
    pub fn ppe_item_count(&self) -> usize {
        self.ppe.len() + self.custom_ppe_images.len()
    }
}

/// Where the company logo is placed on the sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogoPosition {
    TopLeft,
    TopCenter,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Company branding applied on top of every sign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandingConfig {
    pub logo: Option<ImageSource>,
    pub logo_position: LogoPosition,
    /// Logo edge length in layout pixels
    pub logo_size: u32,
    pub logo_opacity: f32,
    pub header_text: String,
    pub header_color: String,
    pub header_text_color: String,
    pub footer_text: String,
    pub footer_color: String,
    pub footer_text_color: String,
    pub client_logo: Option<ImageSource>,
    pub contractor_logo: Option<ImageSource>,
    /// When set, the contractor logo sits on the left and the client logo on the right
    pub swap_logo_positions: bool,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            logo: None,
            logo_position: LogoPosition::default(),
            logo_size: 64,
            logo_opacity: 1.0,
            header_text: String::new(),
            header_color: "#1f2937".to_string(),
            header_text_color: "#ffffff".to_string(),
            footer_text: String::new(),
            footer_color: "#f3f4f6".to_string(),
            footer_text_color: "#374151".to_string(),
            client_logo: None,
            contractor_logo: None,
            swap_logo_positions: false,
        }
    }
}

impl BrandingConfig {
    /// Client/contractor logos in (left, right) order
    pub fn partner_logos(&self) -> (Option<&ImageSource>, Option<&ImageSource>) {
        if self.swap_logo_positions {
            (self.contractor_logo.as_ref(), self.client_logo.as_ref())
        } else {
            (self.client_logo.as_ref(), self.contractor_logo.as_ref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> ImageUpload {
        ImageUpload::new("icon.png", "image/png", &[1, 2, 3]).unwrap()
    }

    #[test]
    fn custom_ppe_images_are_capped_at_seven() {
        let mut data = SignageData::default();
        for i in 0..MAX_CUSTOM_PPE_IMAGES {
            data.add_custom_ppe_image(upload(), &format!("item {}", i)).unwrap();
        }
        let err = data.add_custom_ppe_image(upload(), "one too many").unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
        assert_eq!(data.custom_ppe_images.len(), MAX_CUSTOM_PPE_IMAGES);
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let big = vec![0u8; MAX_UPLOAD_BYTES + 1];
        assert!(matches!(
            ImageUpload::new("huge.png", "image/png", &big),
            Err(Error::ValidationError(_))
        ));
        assert!(ImageUpload::new("ok.png", "image/png", &big[..MAX_UPLOAD_BYTES]).is_ok());
        assert!(ImageUpload::new("doc.pdf", "application/pdf", &[0]).is_err());
    }

    #[test]
    fn only_decodable_image_types_are_accepted() {
        for mime in ["image/png", "image/jpeg", "image/webp", "image/gif"] {
            assert!(ImageUpload::new("icon", mime, &[1]).is_ok(), "{}", mime);
        }
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>";
        assert!(matches!(
            ImageUpload::new("logo.svg", "image/svg+xml", svg),
            Err(Error::ValidationError(_))
        ));

        // nothing is stored when the upload is refused
        let mut data = SignageData::default();
        if let Ok(upload) = ImageUpload::new("logo.svg", "image/svg+xml", svg) {
            data.add_custom_ppe_image(upload, "Visor").unwrap();
        }
        assert!(data.custom_ppe_images.is_empty());
    }

    #[test]
    fn ppe_behaves_like_a_set() {
        let mut data = SignageData::default();
        assert!(data.add_ppe(Ppe::Gloves));
        assert!(data.add_ppe(Ppe::Hardhat));
        assert!(!data.add_ppe(Ppe::Gloves));
        assert_eq!(data.ppe, vec![Ppe::Gloves, Ppe::Hardhat]);
        data.remove_ppe(Ppe::Gloves);
        assert_eq!(data.ppe, vec![Ppe::Hardhat]);
    }

    #[test]
    fn accent_color_follows_category_unless_custom() {
        let mut data = SignageData {
            custom_color: Some("#123456".into()),
            ..Default::default()
        };
        assert_eq!(data.accent_color(), lookup::category_style(Category::Danger).border);
        data.set_category(Category::Custom, None).unwrap();
        assert_eq!(data.accent_color(), RGB8::new(0x12, 0x34, 0x56));
        assert!(data.set_category(Category::Custom, Some("not-a-color")).is_err());
        assert_eq!(data.custom_color.as_deref(), Some("#123456"));
    }

    #[test]
    fn data_url_round_trip() {
        let src = ImageSource::from_bytes("image/png", b"abc");
        assert_eq!(src.mime(), Some("image/png"));
        assert_eq!(src.decode_bytes().unwrap(), b"abc");
        assert!(ImageSource("https://example.com/a.png".into()).decode_bytes().is_err());
    }

    #[test]
    fn serializes_with_editor_field_names() {
        let data = SignageData {
            ppe: vec![Ppe::Hardhat, Ppe::HiVisVest],
            qr_code_config: QrCodeConfig {
                kind: QrKind::Existing,
                url: Some("https://example.com".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let v = serde_json::to_value(&data).unwrap();
        assert_eq!(v["ppe"], serde_json::json!(["hardhat", "hi-vis-vest"]));
        assert_eq!(v["qrCodeConfig"]["type"], "existing");
        assert!(v.get("customPPEImages").is_some());
        assert!(v.get("emergencyContacts").is_some());
    }

    #[test]
    fn partner_logo_toggle_swaps_sides() {
        let mut b = BrandingConfig {
            client_logo: Some(ImageSource("data:image/png;base64,AA==".into())),
            ..Default::default()
        };
        assert!(b.partner_logos().0.is_some());
        b.swap_logo_positions = true;
        assert!(b.partner_logos().0.is_none());
        assert!(b.partner_logos().1.is_some());
    }
}
