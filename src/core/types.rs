use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListing {
    pub id: String,
    pub price: f64,
    pub beds: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub monthly_charge: f64,
    #[serde(default)]
    pub location: String,
}

/// Fixed economic parameters for one deployment. Rates are plain fractions
/// (0.045, not 4.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicAssumptions {
    pub interest_rate: f64,
    pub mortgage_term_years: u32,
    pub rent_inflation: f64,
    pub property_appreciation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl InputRange {
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputRanges {
    pub rent: InputRange,
    pub deposit: InputRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculatorInputs {
    pub rent: f64,
    pub deposit: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub total_rent_paid: f64,
    pub equity_gain: f64,
    pub wealth_gap: f64,
    pub matched_property: PropertyListing,
    pub monthly_ownership_cost: f64,
    pub monthly_mortgage_payment: f64,
    pub loan_amount: f64,
    pub future_property_value: f64,
    pub remaining_balance: f64,
    pub purchasing_power: f64,
    pub tier_index: usize,
}

impl ProjectionResult {
    /// Signed monthly cost of owning relative to renting: positive means
    /// ownership costs extra each month, negative means it costs less.
    pub fn monthly_difference(&self, rent: f64) -> f64 {
        self.monthly_ownership_cost - rent
    }
}
