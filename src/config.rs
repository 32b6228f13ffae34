//! # Configuration
//!
//! Everything a mill tunes without touching code: the letterhead, asset
//! locations, table geometry and the print-service address.
//!
//! Loaded from a JSON file; every field has a default, so `{}` is a valid
//! configuration.
//!
//! ```json
//! {
//!   "mill": { "name": "Shree Paper Mills", "logo": "https://assets.example/logo.png" },
//!   "slip": { "min_rows": 23 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::barcode::BarcodeStyle;
use crate::error::ReelprintError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelprintConfig {
    pub mill: MillProfile,
    pub label: LabelConfig,
    pub slip: SlipConfig,
    pub server: ServerConfig,
}

impl ReelprintConfig {
    /// Read a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ReelprintError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ReelprintError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
            .map_err(|e| ReelprintError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(text: &str) -> Result<Self, ReelprintError> {
        let config: Self = serde_json::from_str(text)?;
        config.slip.validate()?;
        Ok(config)
    }
}

/// Letterhead printed on labels and slips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MillProfile {
    pub name: String,
    pub plant_address: String,
    /// URL or file path of the square logo used on labels.
    pub logo: Option<String>,
    /// URL or file path of the wide banner used on packing slips.
    pub header_image: Option<String>,
}

impl Default for MillProfile {
    fn default() -> Self {
        Self {
            name: "PAPER MILL".to_string(),
            plant_address: String::new(),
            logo: None,
            header_image: None,
        }
    }
}

/// Label barcode geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub module_width: u32,
    pub bar_height: u32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        let style = BarcodeStyle::default();
        Self {
            module_width: style.module_width,
            bar_height: style.bar_height,
        }
    }
}

impl LabelConfig {
    pub fn barcode_style(&self) -> BarcodeStyle {
        BarcodeStyle {
            module_width: self.module_width.max(1),
            bar_height: self.bar_height.max(20),
            ..BarcodeStyle::default()
        }
    }
}

/// Packing-slip geometry. Lengths are millimetres.
///
/// ## Vertical layout (A4, defaults)
///
/// ```text
///          page 1                     continuation pages
/// 10   margin                    10   margin
/// 62   header zone               10   continuation strip
///  7   table header row           7   table header row
/// 6×34 data rows                 6×43 data rows
/// 10   margin                    10   margin
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlipConfig {
    /// Minimum rows per table, even for short shipments.
    ///
    /// Matches the pre-printed stationery the slips were designed for.
    pub min_rows: usize,
    pub margin_mm: f32,
    pub header_zone_mm: f32,
    /// Top strip of continuation pages.
    pub continuation_zone_mm: f32,
    pub table_header_mm: f32,
    pub row_height_mm: f32,
    /// Gap between the left and right tables.
    pub column_gap_mm: f32,
    pub subtotal_row_mm: f32,
    pub footer_mm: f32,
    /// Header zone of QC appendix pages.
    pub qc_header_zone_mm: f32,
    pub qc_row_height_mm: f32,
}

impl Default for SlipConfig {
    fn default() -> Self {
        Self {
            min_rows: 23,
            margin_mm: 10.0,
            header_zone_mm: 62.0,
            continuation_zone_mm: 10.0,
            table_header_mm: 7.0,
            row_height_mm: 6.0,
            column_gap_mm: 4.0,
            subtotal_row_mm: 6.0,
            footer_mm: 16.0,
            qc_header_zone_mm: 20.0,
            qc_row_height_mm: 6.0,
        }
    }
}

impl SlipConfig {
    fn validate(&self) -> Result<(), ReelprintError> {
        let positive = [
            ("row_height_mm", self.row_height_mm),
            ("qc_row_height_mm", self.qc_row_height_mm),
            ("subtotal_row_mm", self.subtotal_row_mm),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ReelprintError::Config(format!("slip.{} must be positive", name)));
            }
        }
        Ok(())
    }
}

/// Print-service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}
