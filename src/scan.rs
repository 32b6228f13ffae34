//! # Scan Decoding
//!
//! Turns whatever a handheld scanner, camera decoder, or keyboard produced
//! into a canonical code, or reports it as invalid. Invalid input must stop
//! the caller before any lookup; it is never an error value.
//!
//! ## Accepted shapes
//!
//! ```text
//! CR_08001            bare code
//! CR_08001-25         code with year suffix
//!   cr_08001\n        whitespace / control chars / lowercase prefix
//! {"barcode_id":..}   JSON QR payload (also "qr_code", "code")
//! https://../CR_08001 URL payload, last path segment
//! ```
//!
//! The decoder never invents a year. The UI appends the operator's selected
//! year with [`with_year_suffix`] before lookup.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::identity::{extract_reel_number, split_year_suffix};

/// Longest code accepted from a scanner.
pub const MAX_CODE_LEN: usize = 64;

/// Entries kept by [`ScanHistory`].
pub const HISTORY_CAPACITY: usize = 50;

/// JSON keys that may carry the code inside a QR payload, in priority order.
const PAYLOAD_KEYS: &[&str] = &["barcode_id", "qr_code", "code"];

/// Outcome of decoding one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCode {
    pub code: String,
    pub is_valid: bool,
}

impl ScanCode {
    fn invalid(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            is_valid: false,
        }
    }
}

/// Validate and normalise raw scanner input.
pub fn parse_qr_code_data(input: &str) -> ScanCode {
    let candidate = unwrap_payload(input.trim());
    let code = normalise(&candidate);

    if code.is_empty() || code.len() > MAX_CODE_LEN {
        return ScanCode::invalid(code);
    }
    if !code.bytes().all(|b| b.is_ascii_graphic()) {
        return ScanCode::invalid(code);
    }

    // A bare prefix like "CR_" or "CR_-25" is what the form pre-fills.
    let (core, _) = split_year_suffix(&code);
    let bare = extract_reel_number(core);
    if !bare.bytes().any(|b| b.is_ascii_alphanumeric()) {
        return ScanCode::invalid(code);
    }

    ScanCode {
        code,
        is_valid: true,
    }
}

/// Append `-YY` unless the code already carries a year.
pub fn with_year_suffix(code: &str, year: &str) -> String {
    let code = code.trim();
    let year = year.trim();
    match split_year_suffix(code) {
        (_, Some(_)) => code.to_string(),
        _ if year.len() == 2 && year.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{}-{}", code, year)
        }
        _ => code.to_string(),
    }
}

/// Pull the code out of a JSON or URL payload; pass anything else through.
fn unwrap_payload(input: &str) -> String {
    if input.starts_with('{') {
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(input)
        {
            for key in PAYLOAD_KEYS {
                match map.get(*key) {
                    Some(serde_json::Value::String(s)) => return s.clone(),
                    Some(serde_json::Value::Number(n)) => return n.to_string(),
                    _ => {}
                }
            }
        }
        return String::new();
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        let path = input.split(['?', '#']).next().unwrap_or_default();
        return path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
    }

    input.to_string()
}

/// Drop whitespace and control characters, uppercase the letter prefix.
fn normalise(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    match cleaned.split_once('_') {
        Some((prefix, rest))
            if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            format!("{}_{}", prefix.to_ascii_uppercase(), rest)
        }
        _ => cleaned,
    }
}

/// Recent scans, newest first, bounded to [`HISTORY_CAPACITY`].
///
/// Owned by the caller and passed in explicitly; re-scanning a code moves it
/// to the front instead of duplicating it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanHistory {
    entries: VecDeque<String>,
}

impl ScanHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a valid scan. Invalid scans are ignored.
    pub fn record(&mut self, scan: &ScanCode) {
        if !scan.is_valid {
            return;
        }
        self.entries.retain(|c| c != &scan.code);
        self.entries.push_front(scan.code.clone());
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
