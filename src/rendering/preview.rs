//! Projection of a `SignageData` into the fixed section structure of a sign.
//!
//! This is a pure function of its inputs: the same data and branding always
//! produce the same tree, and nothing here writes back into the data.

use rgb::RGB8;

use crate::lookup::{self, CategoryStyle, Icon};
use crate::model::{
    BrandingConfig, Category, EmergencyContact, ImageSource, LogoPosition, Ppe, SignageData,
};
use crate::qr::{self, QrResolution};

/// Only the first procedures are shown so the sign fits on one page
pub const MAX_PROCEDURES: usize = 4;

/// Number of PPE grid columns for a given item count
pub fn ppe_columns(count: usize) -> usize {
    match count {
        0..=12 => 4,
        13..=20 => 5,
        _ => 6,
    }
}

/// Discriminant of a [`Section`], in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    Header,
    Location,
    Description,
    Hazards,
    Ppe,
    Procedures,
    Permit,
    ContactsQr,
    Footer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderSection {
    pub banner: &'static str,
    pub icon: Icon,
    pub title: String,
    pub purpose: String,
    pub branding_text: String,
    pub logo: Option<PlacedLogo>,
    pub left_logo: Option<ImageSource>,
    pub right_logo: Option<ImageSource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLogo {
    pub source: ImageSource,
    pub position: LogoPosition,
    pub size: u32,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PpeItem {
    Standard { ppe: Ppe, icon: Icon, label: &'static str },
    Custom { image: ImageSource, label: String },
}

impl PpeItem {
    pub fn label(&self) -> &str {
        match self {
            PpeItem::Standard { label, .. } => label,
            PpeItem::Custom { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PpeSection {
    pub columns: usize,
    pub items: Vec<PpeItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactsSection {
    pub contacts: Vec<EmergencyContact>,
    pub qr: Option<QrResolution>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FooterSection {
    pub text: String,
    pub branding_text: String,
    pub logo: Option<PlacedLogo>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Header(HeaderSection),
    Location(String),
    Description(String),
    Hazards(Vec<String>),
    Ppe(PpeSection),
    Procedures(Vec<String>),
    Permit(String),
    ContactsQr(ContactsSection),
    Footer(FooterSection),
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::Header(_) => SectionKind::Header,
            Section::Location(_) => SectionKind::Location,
            Section::Description(_) => SectionKind::Description,
            Section::Hazards(_) => SectionKind::Hazards,
            Section::Ppe(_) => SectionKind::Ppe,
            Section::Procedures(_) => SectionKind::Procedures,
            Section::Permit(_) => SectionKind::Permit,
            Section::ContactsQr(_) => SectionKind::ContactsQr,
            Section::Footer(_) => SectionKind::Footer,
        }
    }
}

/// The sign as an ordered list of non-empty sections
#[derive(Debug, Clone, PartialEq)]
pub struct SignageTree {
    pub category: Category,
    pub category_style: CategoryStyle,
    pub accent: RGB8,
    pub sections: Vec<Section>,
}

impl SignageTree {
    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(Section::kind).collect()
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind() == kind)
    }
}

fn trimmed(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn non_blank(items: &[String]) -> Vec<String> {
    items.iter().filter_map(|s| trimmed(s)).collect()
}

/// Build the section tree for a sign.
pub fn render_tree(data: &SignageData, branding: &BrandingConfig) -> SignageTree {
    let category_style = lookup::category_style(data.category);
    let mut sections = Vec::new();

    let logo = branding.logo.as_ref().filter(|l| !l.is_empty()).map(|source| PlacedLogo {
        source: source.clone(),
        position: branding.logo_position,
        size: branding.logo_size,
        opacity: branding.logo_opacity.clamp(0.0, 1.0),
    });
    let (header_logo, footer_logo) = match &logo {
        Some(l) if matches!(l.position, LogoPosition::BottomLeft | LogoPosition::BottomRight) => {
            (None, logo.clone())
        }
        _ => (logo.clone(), None),
    };
    let (left, right) = branding.partner_logos();

    sections.push(Section::Header(HeaderSection {
        banner: category_style.name,
        icon: category_style.icon,
        title: data.title.trim().to_string(),
        purpose: data.purpose.trim().to_string(),
        branding_text: branding.header_text.trim().to_string(),
        logo: header_logo,
        left_logo: left.filter(|l| !l.is_empty()).cloned(),
        right_logo: right.filter(|l| !l.is_empty()).cloned(),
    }));

    if let Some(location) = trimmed(&data.location) {
        sections.push(Section::Location(location));
    }
    if let Some(description) = trimmed(&data.description) {
        sections.push(Section::Description(description));
    }

    let hazards = non_blank(&data.hazards);
    if !hazards.is_empty() {
        sections.push(Section::Hazards(hazards));
    }

    let mut items = data
        .ppe
        .iter()
        .map(|&ppe| {
            let info = lookup::ppe_info(ppe);
            PpeItem::Standard { ppe, icon: info.icon, label: info.label }
        })
        .collect::<Vec<_>>();
    items.extend(data.custom_ppe_images.iter().map(|c| PpeItem::Custom {
        image: c.image.clone(),
        label: c.label.trim().to_uppercase(),
    }));
    if !items.is_empty() {
        sections.push(Section::Ppe(PpeSection { columns: ppe_columns(items.len()), items }));
    }

    let procedures = non_blank(&data.procedures)
        .into_iter()
        .take(MAX_PROCEDURES)
        .collect::<Vec<_>>();
    if !procedures.is_empty() {
        sections.push(Section::Procedures(procedures));
    }

    if data.permit_required {
        sections.push(Section::Permit(data.permit_details.trim().to_string()));
    }

    let contacts = data
        .emergency_contacts
        .iter()
        .filter(|c| !c.label.trim().is_empty() || !c.number.trim().is_empty())
        .cloned()
        .collect::<Vec<_>>();
    let qr = qr::resolve_qr(&data.qr_code_config);
    if !contacts.is_empty() || qr.is_some() {
        sections.push(Section::ContactsQr(ContactsSection { contacts, qr }));
    }

    let footer_text = data.footer_text.trim().to_string();
    let footer_branding = branding.footer_text.trim().to_string();
    if !footer_text.is_empty() || !footer_branding.is_empty() || footer_logo.is_some() {
        sections.push(Section::Footer(FooterSection {
            text: footer_text,
            branding_text: footer_branding,
            logo: footer_logo,
        }));
    }

    SignageTree {
        category: data.category,
        category_style,
        accent: data.accent_color(),
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomPpeImage, QrKind};

    fn custom(n: usize) -> Vec<CustomPpeImage> {
        (0..n)
            .map(|i| CustomPpeImage {
                image: ImageSource::from_bytes("image/png", &[i as u8]),
                label: format!("item {}", i),
            })
            .collect()
    }

    #[test]
    fn column_step_function() {
        let cols = [3, 6, 10, 15, 25].map(ppe_columns);
        assert_eq!(cols, [4, 4, 4, 5, 6]);
        assert_eq!(ppe_columns(0), 4);
        assert_eq!(ppe_columns(12), 4);
        assert_eq!(ppe_columns(13), 5);
        assert_eq!(ppe_columns(20), 5);
        assert_eq!(ppe_columns(21), 6);
    }

    #[test]
    fn empty_sign_only_has_a_header() {
        let tree = render_tree(&SignageData::default(), &BrandingConfig::default());
        assert_eq!(tree.kinds(), vec![SectionKind::Header]);
    }

    #[test]
    fn sections_follow_fixed_order() {
        let data = SignageData {
            title: "Confined Space".into(),
            location: "Tank 3".into(),
            description: "Entry by permit only".into(),
            hazards: vec!["Toxic gas".into()],
            ppe: vec![Ppe::Respirator],
            procedures: vec!["Test gas".into()],
            permit_required: true,
            emergency_contacts: vec![EmergencyContact::new("Emergency", "911")],
            footer_text: "Site safety office".into(),
            ..Default::default()
        };
        let tree = render_tree(&data, &BrandingConfig::default());
        let kinds = tree.kinds();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
        assert_eq!(kinds.len(), 9);
    }

    #[test]
    fn ppe_section_counts_custom_images() {
        let data = SignageData {
            ppe: vec![Ppe::Hardhat, Ppe::Gloves, Ppe::Harness, Ppe::HiVisVest, Ppe::Respirator, Ppe::SafetyBoots, Ppe::FaceShield, Ppe::EarProtection],
            custom_ppe_images: custom(7),
            ..Default::default()
        };
        let tree = render_tree(&data, &BrandingConfig::default());
        match tree.section(SectionKind::Ppe) {
            Some(Section::Ppe(p)) => {
                assert_eq!(p.items.len(), 15);
                assert_eq!(p.columns, 5);
                assert_eq!(p.items[8].label(), "ITEM 0");
            }
            other => panic!("unexpected {:?}", other),
        }

        let only_custom = SignageData { custom_ppe_images: custom(1), ..Default::default() };
        assert!(render_tree(&only_custom, &BrandingConfig::default())
            .section(SectionKind::Ppe)
            .is_some());
    }

    #[test]
    fn procedures_are_truncated_without_touching_data() {
        let data = SignageData {
            procedures: (1..=6).map(|i| format!("step {}", i)).collect(),
            ..Default::default()
        };
        let tree = render_tree(&data, &BrandingConfig::default());
        assert_eq!(
            tree.section(SectionKind::Procedures),
            Some(&Section::Procedures(vec![
                "step 1".into(),
                "step 2".into(),
                "step 3".into(),
                "step 4".into()
            ]))
        );
        assert_eq!(data.procedures.len(), 6);
    }

    #[test]
    fn blank_procedures_are_skipped_before_the_cap() {
        let data = SignageData {
            procedures: vec!["".into(), "  ".into()],
            ..Default::default()
        };
        let tree = render_tree(&data, &BrandingConfig::default());
        assert!(tree.section(SectionKind::Procedures).is_none());

        let data = SignageData {
            procedures: ["a", " ", "b", "", "c", "d", "e"].map(String::from).to_vec(),
            ..Default::default()
        };
        let tree = render_tree(&data, &BrandingConfig::default());
        assert_eq!(
            tree.section(SectionKind::Procedures),
            Some(&Section::Procedures(["a", "b", "c", "d"].map(String::from).to_vec()))
        );
    }

    #[test]
    fn qr_alone_produces_contacts_section() {
        let mut data = SignageData::default();
        data.qr_code_config.kind = QrKind::Generated;
        data.qr_code_config.url = Some("https://example.com".into());
        let tree = render_tree(&data, &BrandingConfig::default());
        match tree.section(SectionKind::ContactsQr) {
            Some(Section::ContactsQr(c)) => {
                assert!(c.contacts.is_empty());
                assert!(c.qr.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bottom_logo_moves_to_footer() {
        let branding = BrandingConfig {
            logo: Some(ImageSource::from_bytes("image/png", &[0])),
            logo_position: LogoPosition::BottomLeft,
            ..Default::default()
        };
        let tree = render_tree(&SignageData::default(), &branding);
        assert_eq!(tree.kinds(), vec![SectionKind::Header, SectionKind::Footer]);
        match tree.section(SectionKind::Header) {
            Some(Section::Header(h)) => assert!(h.logo.is_none()),
            other => panic!("unexpected {:?}", other),
        }
    }
}
