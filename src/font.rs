//! Bitmap text for raster images.
//!
//! Uses the Spleen bitmap font family, scaled by integer factors so strokes
//! stay crisp when the raster is placed in a PDF.

use image::{GrayImage, Luma};
use spleen_font::{FONT_12X24, PSF2Font};

/// Spleen 12×24 cell size in pixels.
pub const GLYPH_WIDTH: u32 = 12;
pub const GLYPH_HEIGHT: u32 = 24;

/// Width in pixels of `text` at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_WIDTH * scale.max(1)
}

/// Height in pixels of one line at `scale`.
pub fn text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT * scale.max(1)
}

/// Draw black text with its top-left corner at (`x`, `y`).
///
/// Pixels falling outside the image are clipped. Characters missing from
/// the font are drawn as an outlined box.
pub fn draw_text(img: &mut GrayImage, text: &str, x: u32, y: u32, scale: u32) {
    let scale = scale.max(1);
    let Ok(mut font) = PSF2Font::new(FONT_12X24) else {
        tracing::warn!("spleen font failed to load, raster text skipped");
        return;
    };

    let char_w = GLYPH_WIDTH * scale;
    let mut cursor_x = x;
    for ch in text.chars() {
        let utf8 = ch.to_string();
        match font.glyph_for_utf8(utf8.as_bytes()) {
            Some(glyph) => {
                for (row_y, row) in glyph.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        if on {
                            fill_block(
                                img,
                                cursor_x + col_x as u32 * scale,
                                y + row_y as u32 * scale,
                                scale,
                            );
                        }
                    }
                }
            }
            None => draw_box(img, cursor_x, y, char_w, GLYPH_HEIGHT * scale),
        }
        cursor_x += char_w;
    }
}

/// Draw a one-pixel black outline.
pub fn draw_box(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
    draw_frame(img, x, y, w, h, 1);
}

/// Draw a `thickness`-pixel black outline.
pub fn draw_frame(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, thickness: u32) {
    if w == 0 || h == 0 {
        return;
    }
    let t = thickness.max(1);
    for dx in 0..w {
        for k in 0..t.min(h) {
            put_black(img, x + dx, y + k);
            put_black(img, x + dx, y + h - 1 - k);
        }
    }
    for dy in 0..h {
        for k in 0..t.min(w) {
            put_black(img, x + k, y + dy);
            put_black(img, x + w - 1 - k, y + dy);
        }
    }
}

fn fill_block(img: &mut GrayImage, x: u32, y: u32, size: u32) {
    for dy in 0..size {
        for dx in 0..size {
            put_black(img, x + dx, y + dy);
        }
    }
}

fn put_black(img: &mut GrayImage, x: u32, y: u32) {
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, Luma([0]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(w: u32, h: u32) -> GrayImage {
        GrayImage::from_pixel(w, h, Luma([255]))
    }

    fn black_pixels(img: &GrayImage) -> usize {
        img.pixels().filter(|p| p.0[0] == 0).count()
    }

    #[test]
    fn test_text_metrics() {
        assert_eq!(text_width("08001", 1), 60);
        assert_eq!(text_width("08001", 2), 120);
        assert_eq!(text_height(2), 48);
    }

    #[test]
    fn test_draw_text_marks_pixels_inside_bounds() {
        let mut img = blank(100, 30);
        draw_text(&mut img, "CR_1", 2, 2, 1);
        assert!(black_pixels(&img) > 0);
    }

    #[test]
    fn test_draw_text_clips() {
        let mut img = blank(10, 10);
        draw_text(&mut img, "WWWWWW", 0, 0, 3);
        assert_eq!(img.dimensions(), (10, 10));
    }

    #[test]
    fn test_frame() {
        let mut img = blank(10, 10);
        draw_frame(&mut img, 0, 0, 10, 10, 1);
        assert_eq!(black_pixels(&img), 36);
    }
}
