//! CPU rasterizer for display lists.
//!
//! Draws a `PaintCommand` list into an RGBA canvas at an arbitrary scale
//! factor. Text uses the 8x8 `font8x8` bitmaps, scaled per glyph pixel.

use std::collections::HashMap;

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{imageops, Rgba, RgbaImage};

use crate::rendering::layout::GLYPH;
use crate::rendering::paint::PaintCommand;
use crate::rendering::Canvas;
use crate::{Error, Result};

/// Upper bound on canvas size (about 16k x 8k) to keep a bad DPI from eating memory
pub const MAX_CANVAS_PIXELS: u64 = 128 * 1024 * 1024;

struct Painter {
    img: RgbaImage,
    scale: f32,
}

impl Painter {
    fn px(&self, v: f32) -> i64 {
        (v * self.scale).round() as i64
    }

    /// Fill a rect given in logical coordinates
    fn fill(&mut self, x: f32, y: f32, w: f32, h: f32, c: (u8, u8, u8, u8)) {
        let (x0, y0) = (self.px(x), self.px(y));
        let (x1, y1) = (self.px(x + w), self.px(y + h));
        self.fill_device(x0, y0, x1, y1, c);
    }

    fn fill_device(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, c: (u8, u8, u8, u8)) {
        let (w, h) = (self.img.width() as i64, self.img.height() as i64);
        let (x0, x1) = (x0.clamp(0, w), x1.clamp(0, w));
        let (y0, y1) = (y0.clamp(0, h), y1.clamp(0, h));
        for y in y0..y1 {
            for x in x0..x1 {
                blend(self.img.get_pixel_mut(x as u32, y as u32), c, 1.0);
            }
        }
    }

    fn stroke(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: u32, c: (u8, u8, u8, u8)) {
        let t = thickness as f32;
        self.fill(x, y, w, t, c);
        self.fill(x, y + h - t, w, t, c);
        self.fill(x, y + t, t, h - 2.0 * t, c);
        self.fill(x + w - t, y + t, t, h - 2.0 * t, c);
    }

    fn circle(&mut self, cx: f32, cy: f32, radius: f32, c: (u8, u8, u8, u8)) {
        let (dcx, dcy) = (cx * self.scale, cy * self.scale);
        let r = radius * self.scale;
        let (w, h) = (self.img.width() as i64, self.img.height() as i64);
        let x0 = ((dcx - r).floor() as i64).clamp(0, w);
        let x1 = ((dcx + r).ceil() as i64).clamp(0, w);
        let y0 = ((dcy - r).floor() as i64).clamp(0, h);
        let y1 = ((dcy + r).ceil() as i64).clamp(0, h);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - dcx;
                let dy = y as f32 + 0.5 - dcy;
                if dx * dx + dy * dy <= r * r {
                    blend(self.img.get_pixel_mut(x as u32, y as u32), c, 1.0);
                }
            }
        }
    }

    fn text(&mut self, x: f32, y: f32, text: &str, scale: u32, c: (u8, u8, u8, u8)) {
        let s = scale as f32;
        for (i, ch) in text.chars().enumerate() {
            let glyph = BASIC_FONTS
                .get(ch)
                .or_else(|| LATIN_FONTS.get(ch))
                .or_else(|| BASIC_FONTS.get('?'))
                .unwrap_or([0; 8]);
            let gx = x + (i as u32 * GLYPH) as f32 * s;
            for (row, bits) in glyph.iter().copied().enumerate() {
                for col in 0..8u32 {
                    if (bits >> col) & 1 == 1 {
                        self.fill(gx + col as f32 * s, y + row as f32 * s, s, s, c);
                    }
                }
            }
        }
    }

    fn image(&mut self, x: f32, y: f32, w: f32, h: f32, src: &RgbaImage, opacity: f32) {
        let (x0, y0) = (self.px(x), self.px(y));
        let dw = (self.px(x + w) - x0).max(1) as u32;
        let dh = (self.px(y + h) - y0).max(1) as u32;
        let scaled = imageops::resize(src, dw, dh, imageops::FilterType::Triangle);
        let (cw, ch) = (self.img.width() as i64, self.img.height() as i64);
        for (sx, sy, p) in scaled.enumerate_pixels() {
            let (tx, ty) = (x0 + sx as i64, y0 + sy as i64);
            if tx < 0 || ty < 0 || tx >= cw || ty >= ch {
                continue;
            }
            let Rgba([r, g, b, a]) = *p;
            blend(self.img.get_pixel_mut(tx as u32, ty as u32), (r, g, b, a), opacity);
        }
    }
}

/// Source-over blend onto an opaque destination
fn blend(dst: &mut Rgba<u8>, c: (u8, u8, u8, u8), opacity: f32) {
    let a = (c.3 as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    if a >= 1.0 {
        *dst = Rgba([c.0, c.1, c.2, 255]);
        return;
    }
    if a <= 0.0 {
        return;
    }
    let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u8;
    let Rgba([dr, dg, db, _]) = *dst;
    *dst = Rgba([mix(c.0, dr), mix(c.1, dg), mix(c.2, db), 255]);
}

/// Rasterize a display list laid out at `width` x `height` logical pixels.
/// The canvas is `scale` times larger in each dimension.
pub fn rasterize(commands: &[PaintCommand], width: u32, height: u32, scale: f32) -> Result<Canvas> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::RenderError(format!("invalid raster scale {}", scale)));
    }
    let w = ((width as f32 * scale).round() as u32).max(1);
    let h = ((height as f32 * scale).round() as u32).max(1);
    if w as u64 * h as u64 > MAX_CANVAS_PIXELS {
        return Err(Error::RenderError(format!("canvas {}x{} exceeds the pixel budget", w, h)));
    }
    log::debug!("rasterizing {} commands onto {}x{} (scale {:.3})", commands.len(), w, h, scale);

    let mut painter = Painter { img: RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])), scale };
    let mut decoded: HashMap<&str, RgbaImage> = HashMap::new();

    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                painter.fill(*x as f32, *y as f32, *width as f32, *height as f32, *rgba)
            }
            PaintCommand::StrokeRect { x, y, width, height, thickness, rgba } => {
                painter.stroke(*x as f32, *y as f32, *width as f32, *height as f32, *thickness, *rgba)
            }
            PaintCommand::Circle { cx, cy, radius, rgba } => {
                painter.circle(*cx as f32, *cy as f32, *radius as f32, *rgba)
            }
            PaintCommand::Text { x, y, text, scale, rgba } => {
                painter.text(*x as f32, *y as f32, text, *scale, *rgba)
            }
            PaintCommand::Image { x, y, width, height, source, opacity } => {
                if !decoded.contains_key(source.as_str()) {
                    let img = source.decode_image()?;
                    decoded.insert(source.as_str(), img);
                }
                if let Some(img) = decoded.get(source.as_str()) {
                    painter.image(*x as f32, *y as f32, *width as f32, *height as f32, img, *opacity);
                }
            }
        }
    }

    Ok(Canvas::new(painter.img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageSource;

    #[test]
    fn rasterize_returns_canvas_of_scaled_size() {
        let c = rasterize(&[], 128, 64, 2.0).unwrap();
        assert_eq!(c.width, 256);
        assert_eq!(c.height, 128);
        assert_eq!(c.pixel(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn solid_rect_is_scaled() {
        let cmds = [PaintCommand::SolidRect { x: 1, y: 1, width: 2, height: 2, rgba: (255, 0, 0, 255) }];
        let c = rasterize(&cmds, 8, 8, 2.0).unwrap();
        assert_eq!(c.pixel(1, 1), [255, 255, 255, 255]);
        assert_eq!(c.pixel(2, 2), [255, 0, 0, 255]);
        assert_eq!(c.pixel(5, 5), [255, 0, 0, 255]);
        assert_eq!(c.pixel(6, 6), [255, 255, 255, 255]);
    }

    #[test]
    fn text_draws_dark_pixels() {
        let cmds = [PaintCommand::Text { x: 0, y: 0, text: "H".into(), scale: 1, rgba: (0, 0, 0, 255) }];
        let c = rasterize(&cmds, 8, 8, 1.0).unwrap();
        let dark = c.pixels.pixels().filter(|p| p.0 == [0, 0, 0, 255]).count();
        assert!(dark > 10);
    }

    #[test]
    fn images_are_decoded_from_data_urls() {
        let mut png = Vec::new();
        let src = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        src.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png).unwrap();
        let cmds = [PaintCommand::Image {
            x: 0,
            y: 0,
            width: 4,
            height: 4,
            source: ImageSource::from_bytes("image/png", &png),
            opacity: 1.0,
        }];
        let c = rasterize(&cmds, 4, 4, 1.0).unwrap();
        assert_eq!(c.pixel(1, 1), [0, 0, 255, 255]);
    }

    #[test]
    fn broken_image_is_an_error() {
        let cmds = [PaintCommand::Image {
            x: 0,
            y: 0,
            width: 4,
            height: 4,
            source: ImageSource::from_bytes("image/png", b"not a png"),
            opacity: 1.0,
        }];
        assert!(rasterize(&cmds, 4, 4, 1.0).is_err());
    }

    #[test]
    fn rejects_bad_scale_and_huge_canvas() {
        assert!(rasterize(&[], 10, 10, 0.0).is_err());
        assert!(rasterize(&[], 10, 10, f32::NAN).is_err());
        assert!(rasterize(&[], 100_000, 100_000, 1.0).is_err());
    }
}
