//! Finished documents: layout + PDF + a filename, ready to print or download.
//!
//! The synchronous `render_*` functions do all the CPU work and never touch
//! the network. The async `generate_*` wrappers load the mill's images first
//! and then hand off to them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assets::{AssetLoader, Assets, load_assets};
use crate::config::ReelprintConfig;
use crate::error::ReelprintError;
use crate::identity::extract_reel_number;
use crate::layout::LayoutContext;
use crate::layout::label::layout_label;
use crate::layout::packing_slip::layout_packing_slip;
use crate::model::{ScanResult, Shipment};
use crate::pdf::render_pdf;

/// What the caller does with the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Save to disk under [`Document::filename`].
    #[default]
    Download,
    /// Open in a viewer for printing.
    Print,
}

/// A rendered PDF.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl Document {
    /// `Content-Disposition` for serving this document in `mode`.
    pub fn content_disposition(&self, mode: OutputMode) -> String {
        let kind = match mode {
            OutputMode::Print => "inline",
            OutputMode::Download => "attachment",
        };
        format!("{}; filename=\"{}\"", kind, self.filename)
    }
}

/// Keep filenames to characters every filesystem accepts.
fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "unnamed".to_string() } else { cleaned }
}

pub fn label_filename(roll: &ScanResult) -> String {
    format!("label_{}.pdf", sanitize(&extract_reel_number(roll.display_id())))
}

pub fn packing_slip_filename(shipment: &Shipment, today: NaiveDate) -> String {
    let date = shipment.header.dispatch_date.unwrap_or(today);
    format!(
        "packing_slip_{}_{}.pdf",
        sanitize(&shipment.header.dispatch_number),
        date.format("%Y-%m-%d")
    )
}

/// Render a roll label.
pub fn render_label(
    roll: &ScanResult,
    assets: &Assets,
    config: &ReelprintConfig,
    today: NaiveDate,
) -> Result<Document, ReelprintError> {
    if roll.code.trim().is_empty() {
        return Err(ReelprintError::InvalidInput("roll has no code".into()));
    }
    let ctx = LayoutContext::new(assets, today).with_barcode_style(config.label.barcode_style());
    let layout = layout_label(roll, &config.mill.name, &config.mill.plant_address, &ctx);
    let bytes = render_pdf(&layout)?;
    let document = Document {
        filename: label_filename(roll),
        bytes,
        page_count: layout.page_count(),
    };
    tracing::info!(code = %roll.code, filename = %document.filename, "label generated");
    Ok(document)
}

/// Render a packing slip.
pub fn render_packing_slip(
    shipment: &Shipment,
    assets: &Assets,
    config: &ReelprintConfig,
    today: NaiveDate,
) -> Result<Document, ReelprintError> {
    if shipment.items.is_empty() {
        tracing::debug!(
            dispatch = %shipment.header.dispatch_number,
            "shipment has no items, rendering blank rows"
        );
    }
    let ctx = LayoutContext::new(assets, today);
    let slip = layout_packing_slip(shipment, &config.slip, &ctx);
    let bytes = render_pdf(&slip.layout)?;
    let document = Document {
        filename: packing_slip_filename(shipment, today),
        bytes,
        page_count: slip.layout.page_count(),
    };
    tracing::info!(
        dispatch = %shipment.header.dispatch_number,
        items = slip.summary.total_items,
        total_kg = slip.summary.total_weight_kg,
        pages = document.page_count,
        "packing slip generated"
    );
    Ok(document)
}

/// Load assets, then render a label.
pub async fn generate_label(
    loader: &dyn AssetLoader,
    roll: &ScanResult,
    config: &ReelprintConfig,
    today: NaiveDate,
) -> Result<Document, ReelprintError> {
    let assets = load_assets(loader, &config.mill).await;
    render_label(roll, &assets, config, today)
}

/// Load assets, then render a packing slip.
pub async fn generate_packing_slip(
    loader: &dyn AssetLoader,
    shipment: &Shipment,
    config: &ReelprintConfig,
    today: NaiveDate,
) -> Result<Document, ReelprintError> {
    let assets = load_assets(loader, &config.mill).await;
    render_packing_slip(shipment, &assets, config, today)
}
