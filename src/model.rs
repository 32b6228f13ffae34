//! Data model for scanned rolls, dispatch items and quality checks.
//!
//! All types derive `Serialize + Deserialize` so the same structs are built
//! from the lookup service's JSON payloads, the CLI's input files and the
//! print service's request bodies.
//!
//! The upstream service is loose about types: `gsm` arrives as `80` on one
//! record and `"80"` on the next. Such fields are [`SpecValue`]s, which accept
//! either and compare by number when they can.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ReelprintError;

// ============================================================================
// SPEC VALUES
// ============================================================================

/// A field that may arrive as a number, a string, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum SpecValue {
    Number(f64),
    Text(String),
    #[default]
    Blank,
}

impl SpecValue {
    /// Numeric value, parsing text when it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SpecValue::Number(n) if n.is_finite() => Some(*n),
            SpecValue::Number(_) => None,
            SpecValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            SpecValue::Blank => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            SpecValue::Blank => true,
            SpecValue::Text(s) => s.trim().is_empty(),
            SpecValue::Number(_) => false,
        }
    }

    /// Numbers first (by value), then text (lexicographic), blanks last.
    pub fn cmp_numeric(&self, other: &SpecValue) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (self.is_blank(), other.is_blank()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.to_string().cmp(&other.to_string()),
            },
        }
    }
}

impl fmt::Display for SpecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecValue::Number(n) => write!(f, "{}", format_number(*n)),
            SpecValue::Text(s) => write!(f, "{}", s.trim()),
            SpecValue::Blank => Ok(()),
        }
    }
}

impl From<f64> for SpecValue {
    fn from(n: f64) -> Self {
        SpecValue::Number(n)
    }
}

impl From<u32> for SpecValue {
    fn from(n: u32) -> Self {
        SpecValue::Number(n as f64)
    }
}

impl From<&str> for SpecValue {
    fn from(s: &str) -> Self {
        SpecValue::Text(s.to_string())
    }
}

impl From<String> for SpecValue {
    fn from(s: String) -> Self {
        SpecValue::Text(s)
    }
}

/// Print a number without a trailing `.0` when it is integral.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let s = format!("{:.2}", n);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Accept `70`, `70.5`, `"70"`, or null (as 0) for a numeric field.
fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = SpecValue::deserialize(deserializer)?;
    match value {
        SpecValue::Blank => Ok(0.0),
        other => other
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {:?}", other))),
    }
}

/// Accept a string or a number for a display identifier.
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(SpecValue::deserialize(deserializer)?.to_string())
}

// ============================================================================
// SCAN RESULT
// ============================================================================

/// Production status of a roll.
///
/// Statuses this crate does not act on are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RollStatus {
    #[default]
    InProduction,
    Available,
    Dispatched,
    Other(String),
}

impl From<String> for RollStatus {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_production" | "in production" => RollStatus::InProduction,
            "available" => RollStatus::Available,
            "dispatched" => RollStatus::Dispatched,
            _ => RollStatus::Other(s),
        }
    }
}

impl From<RollStatus> for String {
    fn from(status: RollStatus) -> Self {
        match status {
            RollStatus::InProduction => "in_production".to_string(),
            RollStatus::Available => "available".to_string(),
            RollStatus::Dispatched => "dispatched".to_string(),
            RollStatus::Other(s) => s,
        }
    }
}

/// Physical properties of a roll.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RollDetails {
    #[serde(deserialize_with = "deserialize_lenient_f64")]
    pub width_inches: f64,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub weight_kg: f64,
    #[serde(default)]
    pub status: RollStatus,
    #[serde(default)]
    pub roll_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Backward references to the rolls this one was cut from.
///
/// Identity only: a roll never owns its parents.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParentRolls {
    #[serde(default)]
    pub parent_set_barcode: Option<String>,
    #[serde(default)]
    pub parent_jumbo_barcode: Option<String>,
}

/// Paper grade, fixed at production.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaperSpecifications {
    #[serde(default)]
    pub gsm: SpecValue,
    #[serde(default)]
    pub bf: SpecValue,
    #[serde(default)]
    pub shade: SpecValue,
}

/// Client a roll was allocated to at dispatch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientInfo {
    pub company_name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
}

/// The resolved record for one physical roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Canonical barcode, unique per physical roll.
    pub code: String,
    #[serde(default)]
    pub barcode_id: Option<String>,
    pub roll_details: RollDetails,
    #[serde(default)]
    pub parent_rolls: ParentRolls,
    pub paper_specifications: PaperSpecifications,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
    #[serde(default)]
    pub production_date: Option<NaiveDate>,
    #[serde(default)]
    pub batch: Option<String>,
}

impl ScanResult {
    /// The human-facing label: `barcode_id` when present, else `code`.
    pub fn display_id(&self) -> &str {
        match self.barcode_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.trim(),
            _ => &self.code,
        }
    }

    /// Record a weighed roll. Weighing always makes the roll available.
    pub fn update_weight(&mut self, weight_kg: f64) -> Result<(), ReelprintError> {
        if !weight_kg.is_finite() || weight_kg < 0.0 {
            return Err(ReelprintError::InvalidInput(format!(
                "weight must be a non-negative number, got {}",
                weight_kg
            )));
        }
        self.roll_details.weight_kg = weight_kg;
        self.roll_details.status = RollStatus::Available;
        Ok(())
    }

    /// Build a QC record for this roll from measured values.
    pub fn record_quality_check(
        &self,
        gsm: impl Into<SpecValue>,
        bf: impl Into<SpecValue>,
        cobb: impl Into<SpecValue>,
    ) -> QualityCheckRecord {
        QualityCheckRecord {
            barcode_id: self.display_id().to_string(),
            gsm: gsm.into(),
            bf: bf.into(),
            cobb: cobb.into(),
        }
    }

    /// The packing-slip row for this roll.
    pub fn to_dispatch_item(&self) -> DispatchItem {
        DispatchItem {
            gsm: self.paper_specifications.gsm.clone(),
            bf: self.paper_specifications.bf.clone(),
            shade: self.paper_specifications.shade.clone(),
            size: SpecValue::Number(self.roll_details.width_inches),
            reel: self.display_id().to_string(),
            weight: self.roll_details.weight_kg,
        }
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// One row of a shipment.
///
/// The serial number is positional and assigned at render time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DispatchItem {
    #[serde(default)]
    pub gsm: SpecValue,
    #[serde(default)]
    pub bf: SpecValue,
    #[serde(default)]
    pub shade: SpecValue,
    /// Width in inches.
    #[serde(default, alias = "width_inches", alias = "width")]
    pub size: SpecValue,
    #[serde(
        default,
        alias = "barcode_id",
        alias = "reel_no",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub reel: String,
    /// Kilograms.
    #[serde(default, alias = "weight_kg", deserialize_with = "deserialize_lenient_f64")]
    pub weight: f64,
}

impl DispatchItem {
    /// Weight as printed on the slip.
    pub fn display_weight(&self) -> i64 {
        self.weight.round() as i64
    }
}

/// A post-production measurement for one reel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityCheckRecord {
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub barcode_id: String,
    #[serde(default)]
    pub gsm: SpecValue,
    #[serde(default)]
    pub bf: SpecValue,
    #[serde(default)]
    pub cobb: SpecValue,
}

/// Header fields printed at the top of a packing slip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DispatchHeader {
    #[serde(deserialize_with = "deserialize_lenient_string")]
    pub dispatch_number: String,
    #[serde(default)]
    pub dispatch_date: Option<NaiveDate>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_mobile: Option<String>,
    #[serde(default)]
    pub order_number: Option<String>,
}

/// A dispatch record: header, items, optional QC list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shipment {
    #[serde(flatten)]
    pub header: DispatchHeader,
    #[serde(default)]
    pub items: Vec<DispatchItem>,
    #[serde(default)]
    pub qc: Vec<QualityCheckRecord>,
}
