//! Substitutes used whenever the catalog or assumptions are degenerate.

use super::types::{InputRange, InputRanges, PropertyListing};

pub const FALLBACK_RANGES: InputRanges = InputRanges {
    rent: InputRange {
        min: 1_000.0,
        max: 50_000.0,
        step: 1_000.0,
        default: 10_000.0,
    },
    deposit: InputRange {
        min: 50_000.0,
        max: 2_000_000.0,
        step: 50_000.0,
        default: 200_000.0,
    },
};

/// Used by range derivation when the configured rate is zero.
pub const FALLBACK_INTEREST_RATE: f64 = 0.05;
/// Used by range derivation when the configured term is zero.
pub const FALLBACK_MORTGAGE_TERM_YEARS: u32 = 25;
/// Monthly cost estimate for a listing the deposit already covers.
pub const OWNED_OUTRIGHT_ESTIMATE: f64 = 1_000.0;

pub fn fallback_property() -> PropertyListing {
    PropertyListing {
        id: "Property".to_string(),
        price: 500_000.0,
        beds: 1,
        image: String::new(),
        monthly_charge: 500.0,
        location: "N/A".to_string(),
    }
}

/// The listing shown before any tier is matched: first catalog entry, else
/// the fallback.
pub fn default_property(catalog: &[PropertyListing]) -> PropertyListing {
    catalog.first().cloned().unwrap_or_else(fallback_property)
}
