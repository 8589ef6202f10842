use super::fallback::default_property;
use super::types::{
    CalculatorInputs, EconomicAssumptions, InputRange, InputRanges, ProjectionResult,
    PropertyListing,
};

const RENT_WEIGHT: f64 = 0.4;
const DEPOSIT_WEIGHT: f64 = 0.6;
const MONTHS_PER_YEAR: u32 = 12;

pub fn project(
    inputs: &CalculatorInputs,
    catalog: &[PropertyListing],
    assumptions: &EconomicAssumptions,
    ranges: &InputRanges,
) -> ProjectionResult {
    let total_rent_paid = accumulate_rent(inputs.rent, inputs.years, assumptions.rent_inflation);
    let purchasing_power = purchasing_power(inputs.rent, inputs.deposit, ranges);
    let (tier_index, matched_property) = select_tier(catalog, purchasing_power);

    let loan_amount = matched_property.price - inputs.deposit;
    let monthly_mortgage_payment = monthly_mortgage_payment(
        loan_amount,
        assumptions.interest_rate,
        assumptions.mortgage_term_years,
    );
    let future_property_value = matched_property.price
        * (1.0 + assumptions.property_appreciation).powi(inputs.years as i32);
    let remaining_balance = remaining_balance(
        loan_amount,
        assumptions.interest_rate,
        assumptions.mortgage_term_years,
        inputs.years.saturating_mul(MONTHS_PER_YEAR),
    );

    let equity_gain = future_property_value - remaining_balance;
    // Future equity plus undiscounted historical rent; the two are summed as-is.
    let wealth_gap = equity_gain + total_rent_paid;
    let monthly_ownership_cost = monthly_mortgage_payment + matched_property.monthly_charge;

    ProjectionResult {
        total_rent_paid,
        equity_gain,
        wealth_gap,
        matched_property,
        monthly_ownership_cost,
        monthly_mortgage_payment,
        loan_amount,
        future_property_value,
        remaining_balance,
        purchasing_power,
        tier_index,
    }
}

/// Total rent over `years`, with inflation applied after each year is paid.
fn accumulate_rent(monthly_rent: f64, years: u32, rent_inflation: f64) -> f64 {
    let mut total = 0.0;
    let mut current = monthly_rent;
    for _ in 0..years {
        total += current * MONTHS_PER_YEAR as f64;
        current *= 1.0 + rent_inflation;
    }
    total
}

fn normalize(value: f64, range: &InputRange) -> f64 {
    let width = range.width();
    if width > 0.0 {
        ((value - range.min) / width).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

fn purchasing_power(rent: f64, deposit: f64, ranges: &InputRanges) -> f64 {
    let rent_normalized = normalize(rent, &ranges.rent);
    let deposit_normalized = normalize(deposit, &ranges.deposit);
    rent_normalized * RENT_WEIGHT + deposit_normalized * DEPOSIT_WEIGHT
}

fn select_tier(catalog: &[PropertyListing], score: f64) -> (usize, PropertyListing) {
    if catalog.is_empty() {
        return (0, default_property(catalog));
    }

    let mut sorted: Vec<&PropertyListing> = catalog.iter().collect();
    sorted.sort_by(|a, b| a.price.total_cmp(&b.price));

    let count = sorted.len();
    let raw = (score * count as f64).floor();
    let index = if raw.is_nan() || raw < 0.0 {
        0
    } else {
        (raw as usize).min(count - 1)
    };
    (index, sorted[index].clone())
}

fn annuity_factor(monthly_rate: f64, payments: u32) -> f64 {
    (1.0 + monthly_rate).powi(payments as i32)
}

/// Fixed-rate annuity payment. A non-positive loan is an all-cash purchase.
pub(crate) fn monthly_mortgage_payment(loan: f64, annual_rate: f64, term_years: u32) -> f64 {
    if loan <= 0.0 {
        return 0.0;
    }
    let n = term_years.saturating_mul(MONTHS_PER_YEAR);
    if n == 0 {
        return loan;
    }
    let r = annual_rate / MONTHS_PER_YEAR as f64;
    if r == 0.0 {
        return loan / n as f64;
    }
    let growth = annuity_factor(r, n);
    loan * r * growth / (growth - 1.0)
}

/// Outstanding principal after `payments_made` monthly payments. A negative
/// loan (deposit above price) yields a negative balance, which counts toward
/// equity.
pub(crate) fn remaining_balance(
    loan: f64,
    annual_rate: f64,
    term_years: u32,
    payments_made: u32,
) -> f64 {
    let n = term_years.saturating_mul(MONTHS_PER_YEAR);
    let p = payments_made.min(n);
    if n == 0 {
        return 0.0;
    }
    let r = annual_rate / MONTHS_PER_YEAR as f64;
    if r == 0.0 {
        return loan * (n - p) as f64 / n as f64;
    }
    let growth_n = annuity_factor(r, n);
    let growth_p = annuity_factor(r, p);
    loan * (growth_n - growth_p) / (growth_n - 1.0)
}
