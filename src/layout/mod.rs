//! # Declarative Page Layout
//!
//! Generators never touch a PDF library. They produce a [`Layout`]: a fixed
//! page size and, per page, a list of [`DrawCommand`]s at explicit
//! coordinates. The [`pdf`](crate::pdf) backend turns that into bytes.
//!
//! ```text
//! ScanResult / Shipment → layout::{label, packing_slip} → Layout → pdf → bytes
//!                                    ↓
//!                       pagination, column math, subtotals
//!                       (inspectable, tested without a PDF)
//! ```
//!
//! ## Coordinates
//!
//! Millimetres, origin at the top-left corner of the page, y growing
//! downwards. Text is positioned by its baseline. Alignment is resolved
//! here, so every [`DrawCommand::Text`] carries a left edge.

pub mod label;
pub mod packing_slip;

use std::sync::Arc;

use chrono::NaiveDate;
use image::DynamicImage;

use crate::assets::Assets;
use crate::barcode::{BarcodeEncoder, BarcodeStyle, Code128Encoder, render_barcode_with, shorten};

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Physical page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    /// A4 portrait, used for packing slips.
    pub const A4_PORTRAIT: Self = Self {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    /// Roll label, 15.00 cm × 10.13 cm landscape.
    pub const LABEL: Self = Self {
        width_mm: 150.0,
        height_mm: 101.3,
    };
}

/// Font weight. Both map to built-in Helvetica faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weight {
    #[default]
    Regular,
    Bold,
}

/// Horizontal text alignment, resolved when a command is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// How a rectangle is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    /// Fill with a gray level (0 = black, 1 = white).
    Fill(f32),
    /// Black outline of the given width in points.
    Stroke(f32),
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        paint: Paint,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width_pt: f32,
    },
    Text {
        x: f32,
        baseline: f32,
        text: String,
        size_pt: f32,
        weight: Weight,
    },
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        image: Arc<DynamicImage>,
    },
}

/// Commands for one page, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub commands: Vec<DrawCommand>,
}

impl Page {
    /// All text on the page, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Text whose left edge, centre or right edge sits at `x`.
    pub fn text(
        &mut self,
        x: f32,
        baseline: f32,
        text: impl Into<String>,
        size_pt: f32,
        weight: Weight,
        align: Align,
    ) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        let width = text_width_mm(&text, size_pt, weight);
        let left = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        self.push(DrawCommand::Text {
            x: left,
            baseline,
            text,
            size_pt,
            weight,
        });
    }

    /// Text vertically and horizontally centred in a box.
    pub fn text_in_box(
        &mut self,
        rect: (f32, f32, f32, f32),
        text: impl Into<String>,
        size_pt: f32,
        weight: Weight,
        align: Align,
    ) {
        let (x, y, w, h) = rect;
        let pad = 1.2;
        let baseline = y + h / 2.0 + cap_height_mm(size_pt) / 2.0;
        let anchor = match align {
            Align::Left => x + pad,
            Align::Center => x + w / 2.0,
            Align::Right => x + w - pad,
        };
        self.text(anchor, baseline, text, size_pt, weight, align);
    }

    pub fn fill(&mut self, x: f32, y: f32, w: f32, h: f32, gray: f32) {
        self.push(DrawCommand::Rect {
            x,
            y,
            w,
            h,
            paint: Paint::Fill(gray),
        });
    }

    pub fn stroke(&mut self, x: f32, y: f32, w: f32, h: f32, width_pt: f32) {
        self.push(DrawCommand::Rect {
            x,
            y,
            w,
            h,
            paint: Paint::Stroke(width_pt),
        });
    }

    pub fn hline(&mut self, x1: f32, x2: f32, y: f32, width_pt: f32) {
        self.push(DrawCommand::Line {
            x1,
            y1: y,
            x2,
            y2: y,
            width_pt,
        });
    }

    /// Place an image inside a box, preserving aspect ratio, centred.
    pub fn image_fit(&mut self, image: Arc<DynamicImage>, x: f32, y: f32, w: f32, h: f32) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let (fw, fh) = fit(image.width(), image.height(), w, h);
        self.push(DrawCommand::Image {
            x: x + (w - fw) / 2.0,
            y: y + (h - fh) / 2.0,
            w: fw,
            h: fh,
            image,
        });
    }
}

/// A complete document: constant page geometry, one or more pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub title: String,
    pub size: PageSize,
    pub pages: Vec<Page>,
}

impl Layout {
    pub fn new(title: impl Into<String>, size: PageSize) -> Self {
        Self {
            title: title.into(),
            size,
            pages: vec![Page::default()],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Start a new page and return it.
    pub fn new_page(&mut self) -> &mut Page {
        self.pages.push(Page::default());
        self.current()
    }

    pub fn current(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages.iter().any(|p| p.contains_text(needle))
    }
}

/// Inputs shared by the generators for one invocation.
///
/// Built fresh per document; nothing in it outlives the call.
pub struct LayoutContext<'a> {
    pub assets: &'a Assets,
    pub encoder: &'a dyn BarcodeEncoder,
    pub barcode_style: BarcodeStyle,
    /// Printed when a record carries no date of its own.
    pub today: NaiveDate,
}

impl<'a> LayoutContext<'a> {
    pub fn new(assets: &'a Assets, today: NaiveDate) -> Self {
        Self {
            assets,
            encoder: &Code128Encoder,
            barcode_style: BarcodeStyle::default(),
            today,
        }
    }

    pub fn with_encoder(mut self, encoder: &'a dyn BarcodeEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_barcode_style(mut self, style: BarcodeStyle) -> Self {
        self.barcode_style = style;
        self
    }

    /// Draw a barcode band: bordered box with the barcode centred inside.
    ///
    /// An unencodable value becomes its literal text in the box.
    pub fn barcode_band(&self, page: &mut Page, value: &str, x: f32, y: f32, w: f32, h: f32) {
        page.stroke(x, y, w, h, 0.8);
        let raster = render_barcode_with(value, &self.barcode_style, self.encoder);
        if raster.fallback {
            let text = shorten(value);
            page.text_in_box((x, y, w, h), &text, 14.0, Weight::Bold, Align::Center);
            return;
        }
        let pad = 1.0;
        page.image_fit(
            Arc::new(DynamicImage::ImageLuma8(raster.image)),
            x + pad,
            y + pad,
            w - 2.0 * pad,
            h - 2.0 * pad,
        );
    }
}

/// Largest (w, h) with the image's aspect ratio inside (max_w, max_h).
pub fn fit(px_w: u32, px_h: u32, max_w: f32, max_h: f32) -> (f32, f32) {
    let aspect = px_w as f32 / px_h as f32;
    if max_w / max_h > aspect {
        (max_h * aspect, max_h)
    } else {
        (max_w, max_w / aspect)
    }
}

/// Approximate cap height of Helvetica in millimetres.
pub fn cap_height_mm(size_pt: f32) -> f32 {
    size_pt * 0.718 / PT_PER_MM
}

/// Width of `text` set in built-in Helvetica, in millimetres.
///
/// Uses the regular face's AFM advance widths; bold is approximated by a
/// fixed widening. Characters outside ASCII use the average glyph width.
pub fn text_width_mm(text: &str, size_pt: f32, weight: Weight) -> f32 {
    let units: u32 = text.chars().map(helvetica_advance).sum();
    let factor = match weight {
        Weight::Regular => 1.0,
        Weight::Bold => 1.06,
    };
    units as f32 / 1000.0 * size_pt * factor / PT_PER_MM
}

fn helvetica_advance(c: char) -> u32 {
    match c {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'I' | 'f' | 't' => 278,
        'i' | 'j' | 'l' => 222,
        '\'' => 191,
        '|' => 260,
        '"' => 355,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '{' | '}' => 334,
        '*' => 389,
        '^' => 469,
        '0'..='9' | '#' | '$' | '?' | '_' => 556,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 556,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' => 500,
        '+' | '<' | '=' | '>' | '~' => 584,
        'F' | 'T' | 'Z' => 611,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' | '&' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'G' | 'O' | 'Q' => 778,
        'M' | 'm' => 833,
        '%' => 889,
        'W' => 944,
        '@' => 1015,
        _ => 556,
    }
}
