//! # Roll Label
//!
//! One 150 × 101.3 mm landscape page per roll.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ [logo]        MILL NAME                       │ header band
//! │               plant address                   │
//! ├──────────────────────────────────────────────┤
//! │ SHADE : Golden            DATE    : 14-03-2025│
//! │ SIZE  : 42"               REEL NO : 08001-25  │ spec block
//! │ GSM   : 80                WEIGHT  : 512 kg    │
//! │ BF    : 18                                    │
//! │ BATCH : B-114                                 │
//! │      ┌────────────────────────────────┐       │
//! │      │ ▌▌ ▌▌▌ ▌ ▌▌ ▌▌▌  ▌ ▌▌ ▌ ▌▌▌     │       │ barcode band 100×20
//! │      └────────────────────────────────┘       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Missing fields print blank. The barcode always encodes the roll's own
//! canonical code, never a parent's.

use crate::identity::extract_reel_number;
use crate::model::{ScanResult, format_number};

use super::{Align, Layout, LayoutContext, PageSize, Weight};

const MARGIN: f32 = 4.0;
const HEADER_BOTTOM: f32 = 24.0;
const LOGO_SIZE: f32 = 18.0;
const SPEC_TOP: f32 = 33.0;
const SPEC_LINE: f32 = 7.5;
const LEFT_COL: f32 = 8.0;
const RIGHT_COL: f32 = 82.0;
const VALUE_OFFSET: f32 = 22.0;
const BAND_W: f32 = 100.0;
const BAND_H: f32 = 20.0;
const BAND_TOP: f32 = 74.0;
const LABEL_PT: f32 = 10.0;
const VALUE_PT: f32 = 11.0;

/// Lay out the label for one roll.
pub fn layout_label(
    roll: &ScanResult,
    mill_name: &str,
    plant_address: &str,
    ctx: &LayoutContext,
) -> Layout {
    let size = PageSize::LABEL;
    let mut layout = Layout::new(format!("Label {}", roll.display_id()), size);
    let page = layout.current();

    // Header band
    if let Some(logo) = &ctx.assets.logo {
        page.image_fit(logo.clone(), MARGIN + 1.0, MARGIN, LOGO_SIZE, LOGO_SIZE);
    }
    let center = size.width_mm / 2.0;
    page.text(center, MARGIN + 9.0, mill_name, 16.0, Weight::Bold, Align::Center);
    page.text(center, MARGIN + 15.5, plant_address, 8.0, Weight::Regular, Align::Center);
    page.hline(MARGIN, size.width_mm - MARGIN, HEADER_BOTTOM, 0.8);

    // Spec block
    let specs = &roll.paper_specifications;
    let details = &roll.roll_details;
    let size_text = if details.width_inches > 0.0 {
        format!("{}\"", format_number(details.width_inches))
    } else {
        String::new()
    };
    let left = [
        ("SHADE", specs.shade.to_string()),
        ("SIZE", size_text),
        ("GSM", specs.gsm.to_string()),
        ("BF", specs.bf.to_string()),
        ("BATCH", roll.batch.clone().unwrap_or_default()),
    ];

    let date = roll.production_date.unwrap_or(ctx.today);
    // An unweighed roll reads 0 kg upstream; print it blank.
    let weight = if details.weight_kg > 0.0 {
        format!("{} kg", details.weight_kg.round() as i64)
    } else {
        String::new()
    };
    let right = [
        ("DATE", date.format("%d-%m-%Y").to_string()),
        ("REEL NO", extract_reel_number(roll.display_id())),
        ("WEIGHT", weight),
    ];

    for (column_x, rows) in [(LEFT_COL, &left[..]), (RIGHT_COL, &right[..])] {
        for (i, (name, value)) in rows.iter().enumerate() {
            let baseline = SPEC_TOP + i as f32 * SPEC_LINE;
            let colon_x = column_x + VALUE_OFFSET - 3.0;
            let value_x = column_x + VALUE_OFFSET;
            page.text(column_x, baseline, *name, LABEL_PT, Weight::Bold, Align::Left);
            page.text(colon_x, baseline, ":", LABEL_PT, Weight::Bold, Align::Left);
            page.text(value_x, baseline, value.as_str(), VALUE_PT, Weight::Regular, Align::Left);
        }
    }

    // Barcode band
    let band_x = (size.width_mm - BAND_W) / 2.0;
    ctx.barcode_band(page, &roll.code, band_x, BAND_TOP, BAND_W, BAND_H);

    tracing::debug!(code = %roll.code, "label laid out");
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Assets;
    use crate::barcode::{BarcodeEncoder, BarcodeError};
    use crate::layout::DrawCommand;
    use chrono::NaiveDate;

    struct FailingEncoder;

    impl BarcodeEncoder for FailingEncoder {
        fn encode(&self, _value: &str) -> Result<Vec<u8>, BarcodeError> {
            Err(BarcodeError::Encode("forced".into()))
        }
    }

    fn roll(json: &str) -> ScanResult {
        serde_json::from_str(json).unwrap()
    }

    fn sample() -> ScanResult {
        roll(
            r#"{
                "code": "CR_08001-25",
                "roll_details": { "width_inches": 42, "weight_kg": 512.4, "status": "available" },
                "parent_rolls": { "parent_set_barcode": "SET_01733-25" },
                "paper_specifications": { "gsm": 80, "bf": 18, "shade": "Golden" },
                "batch": "B-114"
            }"#,
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn images(layout: &Layout) -> usize {
        layout.pages[0]
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { .. }))
            .count()
    }

    #[test]
    fn test_label_fields() {
        let assets = Assets::none();
        let ctx = LayoutContext::new(&assets, today());
        let layout = layout_label(&sample(), "SHREE MILLS", "Plot 7, GIDC", &ctx);

        assert_eq!(layout.size, PageSize::LABEL);
        assert_eq!(layout.page_count(), 1);
        let expected = [
            "SHREE MILLS",
            "Golden",
            "42\"",
            "80",
            "18",
            "B-114",
            "14-03-2025",
            "08001-25",
            "512 kg",
        ];
        for text in expected {
            assert!(layout.contains_text(text), "missing {:?}", text);
        }
        // barcode image, no logo
        assert_eq!(images(&layout), 1);
    }

    #[test]
    fn test_missing_fields_render_blank() {
        let assets = Assets::none();
        let ctx = LayoutContext::new(&assets, today());
        let sparse = roll(
            r#"{
                "code": "CR_09000",
                "roll_details": { "width_inches": 30 },
                "paper_specifications": {}
            }"#,
        );
        let layout = layout_label(&sparse, "MILL", "", &ctx);
        let texts: Vec<&str> = layout.pages[0].texts().collect();
        assert!(!texts.iter().any(|t| t.contains("undefined") || t.contains("null")));
        assert!(!texts.iter().any(|t| t.ends_with("kg")));
        assert!(layout.contains_text("09000"));
    }

    #[test]
    fn test_barcode_uses_own_code_not_parent() {
        let assets = Assets::none();
        let ctx = LayoutContext::new(&assets, today()).with_encoder(&FailingEncoder);
        let layout = layout_label(&sample(), "MILL", "", &ctx);
        assert!(layout.contains_text("CR_08001-25"));
        assert!(!layout.contains_text("SET_01733-25"));
    }

    #[test]
    fn test_encoder_failure_degrades_to_text() {
        let assets = Assets::none();
        let ctx = LayoutContext::new(&assets, today()).with_encoder(&FailingEncoder);
        let layout = layout_label(&sample(), "MILL", "", &ctx);
        assert_eq!(images(&layout), 0);
        assert!(layout.contains_text("CR_08001-25"));
    }

    #[test]
    fn test_logo_is_drawn_when_loaded() {
        let logo = image::DynamicImage::ImageLuma8(image::GrayImage::new(10, 10));
        let assets = Assets {
            logo: Some(std::sync::Arc::new(logo)),
            header: None,
        };
        let ctx = LayoutContext::new(&assets, today());
        let layout = layout_label(&sample(), "MILL", "", &ctx);
        assert_eq!(images(&layout), 2);
    }
}
