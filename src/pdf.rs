//! PDF backend: replays a [`Layout`] onto printpdf pages.
//!
//! Layout coordinates are top-left millimetres; PDF user space grows up from
//! the bottom-left, so every y is flipped against the page height here and
//! nowhere else.

use std::borrow::Cow;
use std::io::BufWriter;

use image::{DynamicImage, Rgba, RgbImage};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Px, Rect, Rgb,
};

use crate::error::ReelprintError;
use crate::layout::{DrawCommand, Layout, Paint, Weight};

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, weight: Weight) -> &IndirectFontRef {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }
}

/// Render every page of `layout` and return the PDF bytes.
pub fn render_pdf(layout: &Layout) -> Result<Vec<u8>, ReelprintError> {
    let w = layout.size.width_mm;
    let h = layout.size.height_mm;
    let (doc, first_page, first_layer) =
        PdfDocument::new(layout.title.as_str(), Mm(w), Mm(h), "Layer 1");

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReelprintError::Generation(format!("font: {}", e)))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReelprintError::Generation(format!("font: {}", e)))?,
    };

    for (i, page) in layout.pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(Mm(w), Mm(h), "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };
        for command in &page.commands {
            draw(&layer, &fonts, command, h);
        }
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| ReelprintError::Generation(format!("PDF save failed: {}", e)))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ReelprintError::Generation(format!("PDF flush failed: {}", e)))?;

    tracing::debug!(
        title = %layout.title,
        pages = layout.page_count(),
        bytes = bytes.len(),
        "PDF rendered"
    );
    Ok(bytes)
}

fn gray(level: f32) -> Color {
    Color::Rgb(Rgb::new(level, level, level, None))
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, command: &DrawCommand, page_h: f32) {
    match command {
        DrawCommand::Rect { x, y, w, h, paint } => {
            let rect = Rect::new(Mm(*x), Mm(page_h - y - h), Mm(x + w), Mm(page_h - y));
            match paint {
                Paint::Fill(level) => {
                    layer.set_fill_color(gray(*level));
                    layer.add_rect(rect.with_mode(PaintMode::Fill));
                }
                Paint::Stroke(width) => {
                    layer.set_outline_color(gray(0.0));
                    layer.set_outline_thickness(*width);
                    layer.add_rect(rect.with_mode(PaintMode::Stroke));
                }
            }
        }
        DrawCommand::Line { x1, y1, x2, y2, width_pt } => {
            layer.set_outline_color(gray(0.0));
            layer.set_outline_thickness(*width_pt);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), Mm(page_h - y1)), false),
                    (Point::new(Mm(*x2), Mm(page_h - y2)), false),
                ],
                is_closed: false,
            });
        }
        DrawCommand::Text { x, baseline, text, size_pt, weight } => {
            layer.set_fill_color(gray(0.0));
            let text = winansi_text(text);
            let font = fonts.get(*weight);
            layer.use_text(text.as_ref(), *size_pt, Mm(*x), Mm(page_h - baseline), font);
        }
        DrawCommand::Image { x, y, w, h, image } => {
            if *w <= 0.0 || *h <= 0.0 {
                return;
            }
            let rgb = flatten_on_white(image);
            let (px_w, px_h) = rgb.dimensions();
            let xobject = Image::from(ImageXObject {
                width: Px(px_w as usize),
                height: Px(px_h as usize),
                color_space: ColorSpace::Rgb,
                bits_per_component: ColorBits::Bit8,
                // Bars must stay crisp.
                interpolate: false,
                image_data: rgb.into_raw(),
                image_filter: None,
                clipping_bbox: None,
                smask: None,
            });
            let dpi = px_w as f32 / (w / 25.4);
            xobject.add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(*x)),
                    translate_y: Some(Mm(page_h - y - h)),
                    dpi: Some(dpi),
                    ..Default::default()
                },
            );
        }
    }
}

/// Characters the builtin Helvetica faces can show: WinAnsiEncoding, i.e.
/// printable ASCII, Latin-1 and the Windows-1252 extras.
fn is_winansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}')
        || matches!(
            c,
            '€' | '‚' | 'ƒ' | '„' | '…' | '†' | '‡' | 'ˆ' | '‰' | 'Š' | '‹' | 'Œ' | 'Ž'
                | '‘' | '’' | '“' | '”' | '•' | '–' | '—' | '˜' | '™' | 'š' | '›' | 'œ'
                | 'ž' | 'Ÿ'
        )
}

/// `text` with every character Helvetica cannot encode replaced by `?`.
fn winansi_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_winansi) {
        return Cow::Borrowed(text);
    }
    let replaced: String = text
        .chars()
        .map(|c| if is_winansi(c) { c } else { '?' })
        .collect();
    tracing::warn!(
        original = text,
        printed = %replaced,
        "text has characters outside WinAnsi, replaced with '?'"
    );
    Cow::Owned(replaced)
}

/// Composite any transparency against white; PDF gets plain RGB.
fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let Rgba([r, g, b, a]) = *pixel;
        let alpha = a as f32 / 255.0;
        let mix = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        out.put_pixel(x, y, image::Rgb([mix(r), mix(g), mix(b)]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Align, PageSize};
    use std::sync::Arc;

    fn sample_layout() -> Layout {
        let mut layout = Layout::new("test", PageSize::LABEL);
        let page = layout.current();
        page.text(10.0, 20.0, "REEL 08001", 12.0, Weight::Bold, Align::Left);
        page.fill(5.0, 5.0, 20.0, 10.0, 0.9);
        page.stroke(5.0, 5.0, 20.0, 10.0, 0.5);
        page.hline(5.0, 100.0, 30.0, 0.8);
        let img = image::GrayImage::from_pixel(40, 10, image::Luma([0]));
        page.image_fit(Arc::new(DynamicImage::ImageLuma8(img)), 10.0, 40.0, 80.0, 20.0);
        layout
    }

    #[test]
    fn test_renders_pdf_header() {
        let bytes = render_pdf(&sample_layout()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_renders_every_page() {
        let mut layout = sample_layout();
        let page = layout.new_page();
        page.text(10.0, 10.0, "second", 10.0, Weight::Regular, Align::Left);
        layout.new_page();
        let bytes = render_pdf(&layout).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > render_pdf(&sample_layout()).unwrap().len());
    }

    #[test]
    fn test_winansi_text() {
        assert!(matches!(winansi_text("CR_08001-25"), Cow::Borrowed(_)));
        assert_eq!(winansi_text("Crème 12½ – “Golden” €"), "Crème 12½ – “Golden” €");
        assert_eq!(winansi_text("Reel №5 ✓"), "Reel ?5 ?");
        assert_eq!(winansi_text("कागज़"), "?????");
    }

    #[test]
    fn test_renders_text_outside_winansi() {
        let mut layout = Layout::new("test", PageSize::LABEL);
        let page = layout.current();
        page.text(10.0, 20.0, "Shade: 緑", 12.0, Weight::Regular, Align::Left);
        let bytes = render_pdf(&layout).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_flatten_transparent_is_white() {
        let img = image::RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let out = flatten_on_white(&DynamicImage::ImageRgba8(img));
        assert_eq!(out.get_pixel(0, 0), &image::Rgb([255, 255, 255]));
    }
}
