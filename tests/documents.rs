//! # End-to-End Document Tests
//!
//! Drive the public API from raw JSON records to PDF bytes, checking the
//! figures a dispatcher reads off the page.
//!
//! ## Test Coverage
//!
//! - **Labels**: complete and sparse roll records, encoder failure
//! - **Packing slips**: footer totals, subtotals, pagination, QC appendix
//! - **Scanning**: the decode rules a scanner front end relies on

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use reelprint::assets::Assets;
use reelprint::barcode::{BarcodeEncoder, BarcodeError};
use reelprint::config::{ReelprintConfig, SlipConfig};
use reelprint::document::{render_label, render_packing_slip};
use reelprint::layout::LayoutContext;
use reelprint::layout::label::layout_label;
use reelprint::layout::packing_slip::{layout_packing_slip, subtotals};
use reelprint::model::{DispatchItem, ScanResult, Shipment};
use reelprint::{extract_reel_number, parse_qr_code_data};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn five_item_shipment() -> Shipment {
    serde_json::from_str(
        r#"{
            "dispatch_number": "DN-2025-0107",
            "dispatch_date": "2025-03-12",
            "client_name": "Kaveri Packaging",
            "vehicle_number": "GJ-05-AB-1234",
            "driver_name": "R. Patel",
            "items": [
                { "gsm": 80, "bf": 18, "shade": "White", "size": 42,
                  "reel": "CR_08004-25", "weight": 50.4 },
                { "gsm": "80", "bf": "18", "shade": "White", "size": 36,
                  "reel": "CR_08001-25", "weight": 70.3 },
                { "gsm": 100, "bf": 20, "shade": "Golden", "size": 36,
                  "reel": "CR_08010-25", "weight": 512 },
                { "gsm": 100, "bf": 20, "shade": "Golden", "size": 30,
                  "reel": "CR_08002-25", "weight": 498.6 },
                { "gsm": 120, "bf": 22, "shade": "Natural", "size": 48,
                  "reel": "CR_08003-25", "weight": 610 }
            ]
        }"#,
    )
    .unwrap()
}

struct RejectingEncoder;

impl BarcodeEncoder for RejectingEncoder {
    fn encode(&self, _value: &str) -> Result<Vec<u8>, BarcodeError> {
        Err(BarcodeError::Encode("rejected".into()))
    }
}

// ============================================================================
// PACKING SLIPS
// ============================================================================

#[test]
fn test_five_item_slip_footer() {
    let shipment = five_item_shipment();
    let assets = Assets::none();
    let ctx = LayoutContext::new(&assets, today());
    let slip = layout_packing_slip(&shipment, &SlipConfig::default(), &ctx);

    assert_eq!(slip.summary.total_items, 5);
    // 50.4 + 70.3 + 512 + 498.6 + 610 = 1741.3
    assert_eq!(slip.summary.total_weight_kg, 1741);
    assert!(slip.layout.contains_text("1741 kg"));
    assert!(slip.layout.contains_text("Kaveri Packaging"));
    assert!(slip.layout.contains_text("12-03-2025"));
    assert_eq!(slip.plan.rows, 23);
    assert_eq!(slip.layout.page_count(), 1);
}

#[test]
fn test_five_item_slip_subtotals() {
    let shipment = five_item_shipment();
    let groups = subtotals(&shipment.items);
    let labels: Vec<String> = groups.iter().map(|g| g.label()).collect();
    assert_eq!(
        labels,
        vec![
            "80 gsm, 18 bf, White : 2 | 121 kg",
            "100 gsm, 20 bf, Golden : 2 | 1011 kg",
            "120 gsm, 22 bf, Natural : 1 | 610 kg",
        ]
    );
}

#[test]
fn test_slip_pdf_and_filename() {
    let doc = render_packing_slip(
        &five_item_shipment(),
        &Assets::none(),
        &ReelprintConfig::default(),
        today(),
    )
    .unwrap();
    assert!(doc.bytes.starts_with(b"%PDF"));
    assert_eq!(doc.filename, "packing_slip_DN-2025-0107_2025-03-12.pdf");
}

#[test]
fn test_large_slip_paginates() {
    let mut shipment = five_item_shipment();
    shipment.items = (0..200)
        .map(|i| DispatchItem {
            gsm: 80u32.into(),
            bf: 18u32.into(),
            shade: "Golden".into(),
            size: 42u32.into(),
            reel: format!("CR_{:05}-25", i),
            weight: 500.0,
        })
        .collect();
    let doc =
        render_packing_slip(&shipment, &Assets::none(), &ReelprintConfig::default(), today())
            .unwrap();
    // 100 rows per table: 34 on page 1, 43 on page 2, 23 on page 3
    assert_eq!(doc.page_count, 3);

    let assets = Assets::none();
    let ctx = LayoutContext::new(&assets, today());
    let slip = layout_packing_slip(&shipment, &SlipConfig::default(), &ctx);
    assert_eq!(slip.summary.total_weight_kg, 100_000);
    assert!(slip.layout.pages[2].contains_text("200"));
}

#[test]
fn test_small_min_rows_config() {
    let config = ReelprintConfig::from_json(r#"{"slip": {"min_rows": 2}}"#).unwrap();
    let assets = Assets::none();
    let ctx = LayoutContext::new(&assets, today());
    let slip = layout_packing_slip(&five_item_shipment(), &config.slip, &ctx);
    assert_eq!(slip.plan.rows, 3);
}

// ============================================================================
// LABELS
// ============================================================================

#[test]
fn test_label_degrades_to_text_on_encode_failure() {
    let roll: ScanResult = serde_json::from_str(
        r#"{
            "code": "CR_08001-25",
            "roll_details": { "width_inches": 42 },
            "paper_specifications": { "gsm": 80, "bf": 18, "shade": "Golden" }
        }"#,
    )
    .unwrap();
    let assets = Assets::none();
    let ctx = LayoutContext::new(&assets, today()).with_encoder(&RejectingEncoder);
    let layout = layout_label(&roll, "SHREE MILLS", "", &ctx);

    assert!(layout.contains_text("CR_08001-25"));
    assert!(reelprint::pdf::render_pdf(&layout).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_label_pdf() {
    let roll: ScanResult = serde_json::from_str(
        r#"{
            "code": "CR_08001-25",
            "roll_details": { "width_inches": "42", "weight_kg": "512.4" },
            "paper_specifications": { "gsm": "80", "bf": 18, "shade": "Golden" }
        }"#,
    )
    .unwrap();
    let doc = render_label(&roll, &Assets::none(), &ReelprintConfig::default(), today()).unwrap();
    assert!(doc.bytes.starts_with(b"%PDF"));
    assert_eq!(doc.filename, "label_08001-25.pdf");
    assert_eq!(doc.page_count, 1);
}

// ============================================================================
// SCANNING
// ============================================================================

#[test]
fn test_scan_rules() {
    assert_eq!(extract_reel_number("CR_08001-25"), "08001-25");
    assert_eq!(extract_reel_number("3387"), "3387");
    assert_eq!(extract_reel_number(""), "");

    assert!(!parse_qr_code_data("CR_").is_valid);
    let scan = parse_qr_code_data("CR_08001");
    assert!(scan.is_valid);
    assert_eq!(scan.code, "CR_08001");
}
