//! # Reelprint - Paper Roll Labels and Packing Slips
//!
//! Reelprint turns the records of a paper mill's roll inventory into print
//! artefacts. It provides:
//!
//! - **Identity**: prefix/suffix rules for jumbo, set and reel barcodes
//! - **Scanning**: normalisation and validation of scanned codes
//! - **Labels**: one 150 × 101.3 mm PDF label per roll, with a Code128 band
//! - **Packing slips**: multi-page A4 dispatch documents with subtotals
//! - **Print service**: an HTTP adapter returning PDFs
//!
//! ## Quick Start
//!
//! ```no_run
//! use reelprint::{
//!     assets::Assets,
//!     config::ReelprintConfig,
//!     document::render_label,
//!     model::ScanResult,
//! };
//!
//! let roll: ScanResult = serde_json::from_str(
//!     r#"{"code": "CR_08001-25", "roll_details": {"width_inches": 42, "weight_kg": 512}}"#,
//! )?;
//! let today = chrono::Local::now().date_naive();
//!
//! let doc = render_label(&roll, &Assets::none(), &ReelprintConfig::default(), today)?;
//! std::fs::write(&doc.filename, &doc.bytes)?;
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`identity`] | Barcode display rules and roll lineage |
//! | [`scan`] | Scanned-code decoding and scan history |
//! | [`model`] | Roll, dispatch and QC records |
//! | [`barcode`] | Code128 raster rendering |
//! | [`layout`] | Label and packing-slip page layout |
//! | [`pdf`] | PDF backend |
//! | [`document`] | Filenames, output modes, generation entry points |
//! | [`server`] | HTTP print service |
//! | [`error`] | Error types |

pub mod assets;
pub mod barcode;
pub mod config;
pub mod document;
pub mod error;
pub mod font;
pub mod identity;
pub mod layout;
pub mod logging;
pub mod model;
pub mod pdf;
pub mod scan;
pub mod server;

// Re-exports for convenience
pub use config::ReelprintConfig;
pub use document::{Document, OutputMode};
pub use error::ReelprintError;
pub use identity::{extract_reel_number, transform_jumbo_barcode, transform_set_barcode};
pub use scan::parse_qr_code_data;
