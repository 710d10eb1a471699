//! Category and PPE lookup tables, plus the free-text PPE matcher.

use rgb::RGB8;

use crate::model::{Category, Ppe};

/// Identifier of a pictogram drawn on the sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Skull,
    Exclamation,
    Triangle,
    Info,
    Circle,
    NoEntry,
    FirstAid,
    Flame,
    Star,
    HardHat,
    Glove,
    Glasses,
    EarMuffs,
    Mask,
    Boot,
    Vest,
    Harness,
    Shield,
    Coverall,
}

impl Icon {
    /// Stable identifier, used as a CSS class and SVG id
    pub fn id(self) -> &'static str {
        match self {
            Icon::Skull => "skull",
            Icon::Exclamation => "exclamation",
            Icon::Triangle => "triangle",
            Icon::Info => "info",
            Icon::Circle => "circle",
            Icon::NoEntry => "no-entry",
            Icon::FirstAid => "first-aid",
            Icon::Flame => "flame",
            Icon::Star => "star",
            Icon::HardHat => "hard-hat",
            Icon::Glove => "glove",
            Icon::Glasses => "glasses",
            Icon::EarMuffs => "ear-muffs",
            Icon::Mask => "mask",
            Icon::Boot => "boot",
            Icon::Vest => "vest",
            Icon::Harness => "harness",
            Icon::Shield => "shield",
            Icon::Coverall => "coverall",
        }
    }

    /// Short glyph drawn inside the icon badge by the raster backends
    pub fn glyph(self) -> &'static str {
        match self {
            Icon::Skull => "X",
            Icon::Exclamation | Icon::Triangle => "!",
            Icon::Info => "i",
            Icon::Circle => "O",
            Icon::NoEntry => "-",
            Icon::FirstAid => "+",
            Icon::Flame => "F",
            Icon::Star => "*",
            Icon::HardHat => "HH",
            Icon::Glove => "GL",
            Icon::Glasses => "EY",
            Icon::EarMuffs => "EA",
            Icon::Mask => "RS",
            Icon::Boot => "BT",
            Icon::Vest => "HV",
            Icon::Harness => "FH",
            Icon::Shield => "FS",
            Icon::Coverall => "PC",
        }
    }
}

/// Display attributes of a sign category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStyle {
    pub name: &'static str,
    pub border: RGB8,
    pub background: RGB8,
    pub text: RGB8,
    pub icon: Icon,
}

pub fn category_style(category: Category) -> CategoryStyle {
    let (name, border, background, text, icon) = match category {
        Category::Danger => ("DANGER", (0xdc, 0x26, 0x26), (0xfe, 0xf2, 0xf2), (0x7f, 0x1d, 0x1d), Icon::Skull),
        Category::Warning => ("WARNING", (0xea, 0x58, 0x0c), (0xff, 0xf7, 0xed), (0x7c, 0x2d, 0x12), Icon::Triangle),
        Category::Caution => ("CAUTION", (0xca, 0x8a, 0x04), (0xfe, 0xfc, 0xe8), (0x71, 0x3f, 0x12), Icon::Exclamation),
        Category::Notice => ("NOTICE", (0x25, 0x63, 0xeb), (0xef, 0xf6, 0xff), (0x1e, 0x3a, 0x8a), Icon::Info),
        Category::Mandatory => ("MANDATORY", (0x1d, 0x4e, 0xd8), (0xef, 0xf6, 0xff), (0x1e, 0x3a, 0x8a), Icon::Circle),
        Category::Prohibition => ("PROHIBITED", (0xb9, 0x1c, 0x1c), (0xff, 0xff, 0xff), (0x7f, 0x1d, 0x1d), Icon::NoEntry),
        Category::Emergency => ("EMERGENCY", (0x16, 0xa3, 0x4a), (0xf0, 0xfd, 0xf4), (0x14, 0x53, 0x2d), Icon::FirstAid),
        Category::Fire => ("FIRE SAFETY", (0xe1, 0x1d, 0x48), (0xff, 0xf1, 0xf2), (0x88, 0x13, 0x37), Icon::Flame),
        Category::Custom => ("CUSTOM", (0x4b, 0x55, 0x63), (0xf9, 0xfa, 0xfb), (0x11, 0x18, 0x27), Icon::Star),
    };
    let rgb = |(r, g, b): (u8, u8, u8)| RGB8::new(r, g, b);
    CategoryStyle {
        name,
        border: rgb(border),
        background: rgb(background),
        text: rgb(text),
        icon,
    }
}

/// Display attributes of a PPE tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpeInfo {
    pub icon: Icon,
    pub label: &'static str,
}

pub fn ppe_info(ppe: Ppe) -> PpeInfo {
    let (icon, label) = match ppe {
        Ppe::Hardhat => (Icon::HardHat, "HARD HAT"),
        Ppe::Gloves => (Icon::Glove, "GLOVES"),
        Ppe::SafetyGlasses => (Icon::Glasses, "SAFETY GLASSES"),
        Ppe::EarProtection => (Icon::EarMuffs, "EAR PROTECTION"),
        Ppe::Respirator => (Icon::Mask, "RESPIRATOR"),
        Ppe::SafetyBoots => (Icon::Boot, "SAFETY BOOTS"),
        Ppe::HiVisVest => (Icon::Vest, "HI-VIS VEST"),
        Ppe::Harness => (Icon::Harness, "SAFETY HARNESS"),
        Ppe::FaceShield => (Icon::Shield, "FACE SHIELD"),
        Ppe::ProtectiveClothing => (Icon::Coverall, "PROTECTIVE CLOTHING"),
    };
    PpeInfo { icon, label }
}

/// One rule of the free-text PPE matcher
pub struct PpeRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub ppe: Ppe,
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn is_head(t: &str) -> bool {
    contains_any(t, &["hard hat", "hardhat", "helmet", "head protection"])
}

fn is_face(t: &str) -> bool {
    contains_any(t, &["face shield", "faceshield", "visor", "face protection"])
}

fn is_eyes(t: &str) -> bool {
    contains_any(t, &["glasses", "goggles", "eye protection", "spectacles"])
}

fn is_hearing(t: &str) -> bool {
    contains_any(t, &["ear protection", "earplug", "ear plug", "ear muff", "earmuff", "hearing"])
}

fn is_breathing(t: &str) -> bool {
    contains_any(t, &["respirator", "mask", "breathing", "dust"])
}

fn is_hands(t: &str) -> bool {
    contains_any(t, &["glove", "hand protection"])
}

fn is_feet(t: &str) -> bool {
    contains_any(t, &["boot", "shoe", "footwear", "foot protection"])
}

fn is_visibility(t: &str) -> bool {
    contains_any(t, &["hi-vis", "hi vis", "high vis", "high-vis", "vest", "reflective"])
}

fn is_fall_arrest(t: &str) -> bool {
    contains_any(t, &["harness", "fall arrest", "lanyard"])
}

fn is_body(t: &str) -> bool {
    contains_any(t, &["coverall", "clothing", "apron", "suit"])
}

/// Ordered matcher rules; the first rule whose predicate holds wins.
/// Inputs are lower-cased before they reach a predicate.
pub const PPE_RULES: &[PpeRule] = &[
    PpeRule {
        name: "head",
        matches: is_head,
        ppe: Ppe::Hardhat,
    },
    PpeRule {
        name: "face",
        matches: is_face,
        ppe: Ppe::FaceShield,
    },
    PpeRule {
        name: "eyes",
        matches: is_eyes,
        ppe: Ppe::SafetyGlasses,
    },
    PpeRule {
        name: "hearing",
        matches: is_hearing,
        ppe: Ppe::EarProtection,
    },
    PpeRule {
        name: "breathing",
        matches: is_breathing,
        ppe: Ppe::Respirator,
    },
    PpeRule {
        name: "hands",
        matches: is_hands,
        ppe: Ppe::Gloves,
    },
    PpeRule {
        name: "feet",
        matches: is_feet,
        ppe: Ppe::SafetyBoots,
    },
    PpeRule {
        name: "visibility",
        matches: is_visibility,
        ppe: Ppe::HiVisVest,
    },
    PpeRule {
        name: "fall-arrest",
        matches: is_fall_arrest,
        ppe: Ppe::Harness,
    },
    PpeRule {
        name: "body",
        matches: is_body,
        ppe: Ppe::ProtectiveClothing,
    },
];

/// Map a free-text PPE description to the closest tag, if any rule matches.
pub fn match_ppe(text: &str) -> Option<Ppe> {
    let lowered = text.to_lowercase();
    PPE_RULES
        .iter()
        .find(|rule| (rule.matches)(&lowered))
        .map(|rule| rule.ppe)
}

/// Map a list of descriptions, dropping unmatched entries and duplicates.
pub fn match_ppe_list<'a, I>(texts: I) -> Vec<Ppe>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Vec::new();
    for t in texts {
        match match_ppe(t) {
            Some(p) if !out.contains(&p) => out.push(p),
            Some(_) => {}
            None => log::debug!("no PPE rule matched {:?}", t),
        }
    }
    out
}
