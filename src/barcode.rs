//! # Barcode Rasterisation
//!
//! Renders a Code128 barcode with its human-readable value underneath into a
//! grayscale image that the PDF backend places inside a 100 mm × 20 mm band.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ ▌▌ ▌▌▌ ▌ ▌▌ ▌▌▌  ▌ ▌▌ ▌ ▌▌▌  │  bars (module_width × bar_height)
//! │          CR_08001-25         │  Spleen 12×24 text
//! └──────────────────────────────┘
//! ```
//!
//! Rendering never fails. When the value cannot be encoded the result is a
//! bordered box with the literal text centred and `fallback` set, so one bad
//! code degrades a single cell instead of aborting the whole document.

use barcoders::sym::code128::Code128;
use image::{GrayImage, Luma};
use thiserror::Error;

use crate::font;

/// Longest value the encoder accepts. Anything longer could never fit the
/// band, and the checksum arithmetic inside `barcoders` overflows on very
/// long inputs.
pub const MAX_VALUE_LEN: usize = 80;

/// Why a value could not be encoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BarcodeError {
    #[error("value is empty")]
    Empty,

    #[error("value is {0} characters long, the limit is {max}", max = MAX_VALUE_LEN)]
    TooLong(usize),

    #[error("value contains characters outside Code128 set B: {0:?}")]
    Charset(String),

    #[error("encoder rejected value: {0}")]
    Encode(String),
}

/// Turns a value into bar modules (1 = bar, 0 = space).
pub trait BarcodeEncoder: Send + Sync {
    fn encode(&self, value: &str) -> Result<Vec<u8>, BarcodeError>;
}

/// Code128 via the `barcoders` crate, always in character set B.
#[derive(Debug, Clone, Copy, Default)]
pub struct Code128Encoder;

impl BarcodeEncoder for Code128Encoder {
    fn encode(&self, value: &str) -> Result<Vec<u8>, BarcodeError> {
        if value.is_empty() {
            return Err(BarcodeError::Empty);
        }
        let len = value.chars().count();
        if len > MAX_VALUE_LEN {
            return Err(BarcodeError::TooLong(len));
        }
        if !value.chars().all(|c| (' '..='~').contains(&c)) {
            return Err(BarcodeError::Charset(value.to_string()));
        }

        // Set B (Ɓ) covers every printable ASCII character.
        let prefixed = format!("\u{0181}{}", value);
        let barcode =
            Code128::new(&prefixed).map_err(|e| BarcodeError::Encode(e.to_string()))?;
        Ok(barcode.encode())
    }
}

/// Pixel geometry of a rendered barcode.
///
/// The defaults print legibly in a 100 × 20 mm band at 300 DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarcodeStyle {
    /// Pixels per module.
    pub module_width: u32,
    /// Bar height in pixels.
    pub bar_height: u32,
    /// Quiet zone on each side, in modules.
    pub quiet_zone: u32,
    /// Integer scale applied to the 12×24 text font.
    pub text_scale: u32,
    /// Gap between bars and text, and padding around the whole image.
    pub padding: u32,
}

impl Default for BarcodeStyle {
    fn default() -> Self {
        Self {
            module_width: 3,
            bar_height: 150,
            quiet_zone: 10,
            text_scale: 2,
            padding: 8,
        }
    }
}

/// A rendered barcode (or its text fallback).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub image: GrayImage,
    /// The value this image represents.
    pub value: String,
    /// True when the encoder failed and the image is boxed text.
    pub fallback: bool,
}

impl RasterImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encode as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        use image::ImageEncoder;

        let mut png_bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder.write_image(
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            image::ExtendedColorType::L8,
        )?;
        Ok(png_bytes)
    }
}

/// Render `value` as Code128 with default geometry.
pub fn render_barcode(value: &str) -> RasterImage {
    render_barcode_with(value, &BarcodeStyle::default(), &Code128Encoder)
}

/// Render `value` with an explicit style and encoder.
pub fn render_barcode_with(
    value: &str,
    style: &BarcodeStyle,
    encoder: &dyn BarcodeEncoder,
) -> RasterImage {
    match encoder.encode(value) {
        Ok(modules) if !modules.is_empty() => draw_bars(value, &modules, style),
        Ok(_) => {
            tracing::warn!(
                value = %shorten(value),
                "encoder produced no modules, using text fallback"
            );
            draw_fallback(value, style)
        }
        Err(e) => {
            tracing::warn!(
                value = %shorten(value),
                error = %e,
                "barcode encode failed, using text fallback"
            );
            draw_fallback(value, style)
        }
    }
}

fn draw_bars(value: &str, modules: &[u8], style: &BarcodeStyle) -> RasterImage {
    let mw = style.module_width.max(1);
    let quiet = style.quiet_zone * mw;
    let bars_width = modules.len() as u32 * mw;
    let text_w = font::text_width(value, style.text_scale);
    let text_h = font::text_height(style.text_scale);

    let width = (bars_width + 2 * quiet).max(text_w + 2 * style.padding);
    let height = style.padding * 3 + style.bar_height + text_h;
    let mut img = GrayImage::from_pixel(width, height, Luma([255]));

    let start_x = (width - bars_width) / 2;
    for (i, &module) in modules.iter().enumerate() {
        if module == 1 {
            let x0 = start_x + i as u32 * mw;
            for x in x0..x0 + mw {
                for y in style.padding..style.padding + style.bar_height {
                    img.put_pixel(x, y, Luma([0]));
                }
            }
        }
    }

    let text_x = (width - text_w) / 2;
    let text_y = style.padding * 2 + style.bar_height;
    font::draw_text(&mut img, value, text_x, text_y, style.text_scale);

    RasterImage {
        image: img,
        value: value.to_string(),
        fallback: false,
    }
}

/// `value` cut to [`MAX_VALUE_LEN`] characters, with `...` when anything was
/// dropped.
pub fn shorten(value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_LEN {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(MAX_VALUE_LEN - 3).collect();
    cut.push_str("...");
    cut
}

fn draw_fallback(value: &str, style: &BarcodeStyle) -> RasterImage {
    // Non-printable characters have no glyph; show them as '?'.
    let printable: String = shorten(value)
        .chars()
        .map(|c| if c.is_control() { '?' } else { c })
        .collect();

    let text_w = font::text_width(&printable, style.text_scale);
    let text_h = font::text_height(style.text_scale);
    let width = (text_w + 8 * style.padding).max(200);
    let height = style.padding * 3 + style.bar_height + text_h;
    let mut img = GrayImage::from_pixel(width, height, Luma([255]));

    font::draw_frame(&mut img, 0, 0, width, height, 3);
    font::draw_text(
        &mut img,
        &printable,
        (width - text_w) / 2,
        (height - text_h) / 2,
        style.text_scale,
    );

    RasterImage {
        image: img,
        value: value.to_string(),
        fallback: true,
    }
}
