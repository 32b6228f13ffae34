//! # Barcode Identity
//!
//! Stored barcodes carry a type prefix and, for most rolls, a two-digit year
//! suffix:
//!
//! | Kind | Stored | Displayed |
//! |------|--------|-----------|
//! | Jumbo roll | `JR_00412-25` | `00412-25` |
//! | Set | `SET_01733-25` | `01733-25` |
//! | Reel (cut roll) | `CR_08001-25` | `08001-25` |
//!
//! All prefix rules live in [`RULES`]; the named helpers are thin wrappers
//! around [`display_id`]. Unknown formats pass through unchanged, since
//! operators still key in legacy codes.

use crate::model::ScanResult;

/// Which kind of roll a barcode identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeKind {
    Jumbo,
    Set,
    Reel,
}

/// How a kind's prefix is recognised.
#[derive(Debug, Clone, Copy)]
enum PrefixRule {
    /// Exactly this literal.
    Literal(&'static str),
    /// One or more ASCII uppercase letters followed by `_`.
    AnyUppercase,
}

const RULES: &[(BarcodeKind, PrefixRule)] = &[
    (BarcodeKind::Jumbo, PrefixRule::Literal("JR_")),
    (BarcodeKind::Set, PrefixRule::Literal("SET_")),
    (BarcodeKind::Reel, PrefixRule::AnyUppercase),
];

impl PrefixRule {
    /// Byte length of the prefix at the start of `raw`, if it matches.
    fn match_len(self, raw: &str) -> Option<usize> {
        match self {
            PrefixRule::Literal(prefix) => raw.starts_with(prefix).then_some(prefix.len()),
            PrefixRule::AnyUppercase => {
                let letters = raw.bytes().take_while(u8::is_ascii_uppercase).count();
                (letters > 0 && raw.as_bytes().get(letters) == Some(&b'_')).then_some(letters + 1)
            }
        }
    }
}

/// Display form of a stored barcode of the given kind.
///
/// Strips the kind's prefix and keeps everything after it, including any
/// `-YY` suffix. Returns the trimmed input when no rule matches.
pub fn display_id(kind: BarcodeKind, raw: &str) -> String {
    let raw = raw.trim();
    RULES
        .iter()
        .filter(|(k, _)| *k == kind)
        .find_map(|(_, rule)| rule.match_len(raw))
        .map(|len| raw[len..].to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Strip the set prefix for lineage display.
pub fn transform_set_barcode(raw: &str) -> String {
    display_id(BarcodeKind::Set, raw)
}

/// Strip the jumbo prefix for lineage display.
pub fn transform_jumbo_barcode(raw: &str) -> String {
    display_id(BarcodeKind::Jumbo, raw)
}

/// Bare reel number printed on labels and packing slips.
///
/// ```
/// use reelprint::identity::extract_reel_number;
///
/// assert_eq!(extract_reel_number("CR_08001-25"), "08001-25");
/// assert_eq!(extract_reel_number("3387"), "3387");
/// assert_eq!(extract_reel_number(""), "");
/// ```
pub fn extract_reel_number(raw: &str) -> String {
    display_id(BarcodeKind::Reel, raw)
}

/// Split a trailing `-YY` year suffix off a code.
///
/// Only exactly two digits after the last `-` count as a year.
pub fn split_year_suffix(raw: &str) -> (&str, Option<&str>) {
    match raw.rsplit_once('-') {
        Some((core, yy))
            if !core.is_empty() && yy.len() == 2 && yy.bytes().all(|b| b.is_ascii_digit()) =>
        {
            (core, Some(yy))
        }
        _ => (raw, None),
    }
}

/// Display strings for a roll and the rolls it was cut from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollLineage {
    pub jumbo: Option<String>,
    pub set: Option<String>,
    pub reel: String,
}

impl RollLineage {
    pub fn from_scan(scan: &ScanResult) -> Self {
        let parent = |code: &Option<String>, kind| {
            code.as_deref()
                .filter(|c| !c.trim().is_empty())
                .map(|c| display_id(kind, c))
        };
        Self {
            jumbo: parent(&scan.parent_rolls.parent_jumbo_barcode, BarcodeKind::Jumbo),
            set: parent(&scan.parent_rolls.parent_set_barcode, BarcodeKind::Set),
            reel: extract_reel_number(scan.display_id()),
        }
    }

    /// `jumbo → set → reel`, skipping unknown parents.
    pub fn path(&self) -> String {
        [self.jumbo.as_deref(), self.set.as_deref(), Some(self.reel.as_str())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" → ")
    }
}
