//! CSS color resolution.
//!
//! Branding and custom category colors arrive as arbitrary CSS color strings,
//! including perceptual color functions (`oklch()`, `oklab()`) that no raster
//! backend understands. Everything is resolved here to plain sRGB before it
//! reaches the paint stage. Translucent colors are flattened onto white.

use rgb::RGB8;

pub const WHITE: RGB8 = RGB8::new(255, 255, 255);
pub const BLACK: RGB8 = RGB8::new(0, 0, 0);

/// Parse a CSS color string into an opaque sRGB value.
///
/// Returns `None` for anything that is not a recognised color.
pub fn parse_color(input: &str) -> Option<RGB8> {
    let s = input.trim().to_ascii_lowercase();
    if s.is_empty() {
        return None;
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(open) = s.find('(') {
        let name = s[..open].trim();
        let body = s[open + 1..].strip_suffix(')')?;
        let (args, alpha) = split_args(body)?;
        let (rgb, fn_alpha) = match name {
            "rgb" | "rgba" => (parse_rgb_fn(&args)?, alpha),
            "hsl" | "hsla" => (parse_hsl_fn(&args)?, alpha),
            "oklch" => (parse_oklch_fn(&args)?, alpha),
            "oklab" => (parse_oklab_fn(&args)?, alpha),
            _ => return None,
        };
        // Legacy comma syntax passes alpha as a fourth argument
        let legacy_alpha = if args.len() == 4 { Some(parse_alpha(&args[3])?) } else { None };
        let a = fn_alpha.or(legacy_alpha).unwrap_or(1.0);
        return Some(flatten(rgb, a));
    }
    named(&s)
}

/// Format a color as `#rrggbb`.
pub fn to_hex(c: RGB8) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

/// Scale a color towards white by `amount` (0 = unchanged, 1 = white).
pub fn tint(c: RGB8, amount: f32) -> RGB8 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |v: u8| (v as f32 + (255.0 - v as f32) * amount).round() as u8;
    RGB8::new(mix(c.r), mix(c.g), mix(c.b))
}

fn flatten(c: RGB8, alpha: f32) -> RGB8 {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |v: u8| (v as f32 * a + 255.0 * (1.0 - a)).round() as u8;
    RGB8::new(mix(c.r), mix(c.g), mix(c.b))
}

fn parse_hex(hex: &str) -> Option<RGB8> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(RGB8::new(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(flatten(
            RGB8::new(nibble(0)?, nibble(1)?, nibble(2)?),
            nibble(3)? as f32 / 255.0,
        )),
        6 => Some(RGB8::new(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(flatten(RGB8::new(byte(0)?, byte(2)?, byte(4)?), byte(6)? as f32 / 255.0)),
        _ => None,
    }
}

/// Split function arguments on commas/whitespace, pulling out a `/ alpha` suffix.
fn split_args(body: &str) -> Option<(Vec<String>, Option<f32>)> {
    let (main, alpha) = match body.split_once('/') {
        Some((m, a)) => (m, Some(parse_alpha(a.trim())?)),
        None => (body, None),
    };
    let args = main
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect::<Vec<_>>();
    Some((args, alpha))
}

fn parse_alpha(s: &str) -> Option<f32> {
    let s = s.trim();
    if let Some(p) = s.strip_suffix('%') {
        return p.parse::<f32>().ok().map(|v| v / 100.0);
    }
    s.parse::<f32>().ok()
}

/// Parse a number or percentage; percentages are mapped onto `full`.
fn number(s: &str, full: f32) -> Option<f32> {
    if s == "none" {
        return Some(0.0);
    }
    if let Some(p) = s.strip_suffix('%') {
        return p.parse::<f32>().ok().map(|v| v / 100.0 * full);
    }
    s.parse::<f32>().ok()
}

fn hue(s: &str) -> Option<f32> {
    let s = s.trim_end_matches("deg");
    if let Some(t) = s.strip_suffix("turn") {
        return t.parse::<f32>().ok().map(|v| v * 360.0);
    }
    if let Some(r) = s.strip_suffix("rad") {
        return r.parse::<f32>().ok().map(f32::to_degrees);
    }
    number(s, 360.0)
}

fn channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn parse_rgb_fn(args: &[String]) -> Option<RGB8> {
    if args.len() < 3 {
        return None;
    }
    Some(RGB8::new(
        channel(number(&args[0], 255.0)?),
        channel(number(&args[1], 255.0)?),
        channel(number(&args[2], 255.0)?),
    ))
}

fn parse_hsl_fn(args: &[String]) -> Option<RGB8> {
    if args.len() < 3 {
        return None;
    }
    let h = hue(&args[0])?.rem_euclid(360.0);
    let s = number(&args[1], 1.0)?.clamp(0.0, 1.0);
    let l = number(&args[2], 1.0)?.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Some(RGB8::new(
        channel((r + m) * 255.0),
        channel((g + m) * 255.0),
        channel((b + m) * 255.0),
    ))
}

fn parse_oklch_fn(args: &[String]) -> Option<RGB8> {
    if args.len() < 3 {
        return None;
    }
    let l = number(&args[0], 1.0)?;
    let c = number(&args[1], 0.4)?;
    let h = hue(&args[2])?.to_radians();
    Some(oklab_to_srgb(l, c * h.cos(), c * h.sin()))
}

fn parse_oklab_fn(args: &[String]) -> Option<RGB8> {
    if args.len() < 3 {
        return None;
    }
    let l = number(&args[0], 1.0)?;
    let a = number(&args[1], 0.4)?;
    let b = number(&args[2], 0.4)?;
    Some(oklab_to_srgb(l, a, b))
}

fn oklab_to_srgb(l: f32, a: f32, b: f32) -> RGB8 {
    let l_ = l + 0.396_337_78 * a + 0.215_803_76 * b;
    let m_ = l - 0.105_561_35 * a - 0.063_854_17 * b;
    let s_ = l - 0.089_484_18 * a - 1.291_485_5 * b;

    let (l3, m3, s3) = (l_.powi(3), m_.powi(3), s_.powi(3));

    let r = 4.076_741_7 * l3 - 3.307_711_6 * m3 + 0.230_969_94 * s3;
    let g = -1.268_438 * l3 + 2.609_757_4 * m3 - 0.341_319_38 * s3;
    let bl = -0.004_196_086_3 * l3 - 0.703_418_6 * m3 + 1.707_614_7 * s3;

    let encode = |x: f32| {
        let x = x.clamp(0.0, 1.0);
        let v = if x <= 0.003_130_8 { 12.92 * x } else { 1.055 * x.powf(1.0 / 2.4) - 0.055 };
        channel(v * 255.0)
    };
    RGB8::new(encode(r), encode(g), encode(bl))
}

fn named(name: &str) -> Option<RGB8> {
    let c = match name {
        "black" => BLACK,
        "white" => WHITE,
        "red" => RGB8::new(255, 0, 0),
        "green" => RGB8::new(0, 128, 0),
        "blue" => RGB8::new(0, 0, 255),
        "yellow" => RGB8::new(255, 255, 0),
        "orange" => RGB8::new(255, 165, 0),
        "gray" | "grey" => RGB8::new(128, 128, 128),
        "navy" => RGB8::new(0, 0, 128),
        "transparent" => WHITE,
        _ => return None,
    };
    Some(c)
}
