use tracing::debug;

use super::engine::monthly_mortgage_payment;
use super::fallback::{
    FALLBACK_INTEREST_RATE, FALLBACK_MORTGAGE_TERM_YEARS, FALLBACK_RANGES,
    OWNED_OUTRIGHT_ESTIMATE,
};
use super::types::{EconomicAssumptions, InputRange, InputRanges, PropertyListing};

const RANGE_STEPS: f64 = 20.0;

const DEPOSIT_MIN_SHARE: f64 = 0.2;
const DEPOSIT_MAX_SHARE: f64 = 0.8;
const DEPOSIT_WIDEN: f64 = 100_000.0;
const DEPOSIT_MIN_STEP: f64 = 1_000.0;

const CHEAPEST_DEPOSIT_SHARE: f64 = 0.5;
const DEAREST_DEPOSIT_SHARE: f64 = 0.3;
const RENT_MIN_FACTOR: f64 = 0.5;
const RENT_MAX_FACTOR: f64 = 2.0;
const RENT_WIDEN: f64 = 10_000.0;
const RENT_MIN_STEP: f64 = 100.0;

/// Slider bounds for rent and deposit, scaled to the catalog's price spread.
/// Never fails: degenerate catalogs get [`FALLBACK_RANGES`].
pub fn derive_ranges(catalog: &[PropertyListing], assumptions: &EconomicAssumptions) -> InputRanges {
    let mut prices: Vec<f64> = catalog
        .iter()
        .map(|listing| listing.price)
        .filter(|price| *price > 0.0)
        .collect();
    if prices.is_empty() {
        debug!(listings = catalog.len(), "no positive prices, using fallback ranges");
        return FALLBACK_RANGES;
    }
    prices.sort_by(f64::total_cmp);

    let min_price = prices[0];
    let max_price = prices[prices.len() - 1];

    let ranges = InputRanges {
        rent: rent_range(catalog, assumptions, min_price, max_price),
        deposit: deposit_range(min_price, max_price),
    };
    debug!(
        min_price,
        max_price,
        rent_min = ranges.rent.min,
        rent_max = ranges.rent.max,
        deposit_min = ranges.deposit.min,
        deposit_max = ranges.deposit.max,
        "derived input ranges"
    );
    ranges
}

fn deposit_range(min_price: f64, max_price: f64) -> InputRange {
    let min = (min_price * DEPOSIT_MIN_SHARE).round();
    let mut max = (max_price * DEPOSIT_MAX_SHARE).round();
    if min >= max {
        max = min + DEPOSIT_WIDEN;
    }
    let step = ((max - min) / RANGE_STEPS).round().max(DEPOSIT_MIN_STEP);
    let default = (min + (max - min) / 4.0).round();
    InputRange {
        min,
        max,
        step,
        default,
    }
}

fn rent_range(
    catalog: &[PropertyListing],
    assumptions: &EconomicAssumptions,
    min_price: f64,
    max_price: f64,
) -> InputRange {
    let estimator = CostEstimator::new(catalog, assumptions);
    let min_estimate = estimator.monthly_cost(min_price, min_price * CHEAPEST_DEPOSIT_SHARE);
    let max_estimate = estimator.monthly_cost(max_price, max_price * DEAREST_DEPOSIT_SHARE);

    let min = (min_estimate * RENT_MIN_FACTOR).round();
    let mut max = (max_estimate * RENT_MAX_FACTOR).round();
    if min >= max {
        max = min + RENT_WIDEN;
    }
    let step = ((max - min) / RANGE_STEPS).round().max(RENT_MIN_STEP);
    let default = (min + (max - min) / 3.0).round();
    InputRange {
        min,
        max,
        step,
        default,
    }
}

struct CostEstimator {
    interest_rate: f64,
    term_years: u32,
    average_monthly_charge: f64,
}

impl CostEstimator {
    fn new(catalog: &[PropertyListing], assumptions: &EconomicAssumptions) -> Self {
        let interest_rate = if assumptions.interest_rate == 0.0 {
            FALLBACK_INTEREST_RATE
        } else {
            assumptions.interest_rate
        };
        let term_years = if assumptions.mortgage_term_years == 0 {
            FALLBACK_MORTGAGE_TERM_YEARS
        } else {
            assumptions.mortgage_term_years
        };
        let average_monthly_charge = if catalog.is_empty() {
            0.0
        } else {
            catalog
                .iter()
                .map(|listing| listing.monthly_charge)
                .sum::<f64>()
                / catalog.len() as f64
        };
        Self {
            interest_rate,
            term_years,
            average_monthly_charge,
        }
    }

    fn monthly_cost(&self, price: f64, deposit: f64) -> f64 {
        let loan = price - deposit;
        if loan <= 0.0 {
            return OWNED_OUTRIGHT_ESTIMATE;
        }
        monthly_mortgage_payment(loan, self.interest_rate, self.term_years)
            + self.average_monthly_charge
    }
}
