use std::sync::OnceLock;

use super::engine::project;
use super::ranges::derive_ranges;
use super::types::{
    CalculatorInputs, EconomicAssumptions, InputRanges, ProjectionResult, PropertyListing,
};

/// One catalog and assumption set, plus the range cache derived from them.
///
/// Ranges are derived lazily on first access and then reused for every
/// projection until [`CalculatorSession::clear_ranges`] is called.
#[derive(Debug)]
pub struct CalculatorSession {
    catalog: Vec<PropertyListing>,
    assumptions: EconomicAssumptions,
    ranges: OnceLock<InputRanges>,
}

impl CalculatorSession {
    pub fn new(catalog: Vec<PropertyListing>, assumptions: EconomicAssumptions) -> Self {
        Self {
            catalog,
            assumptions,
            ranges: OnceLock::new(),
        }
    }

    pub fn catalog(&self) -> &[PropertyListing] {
        &self.catalog
    }

    pub fn assumptions(&self) -> &EconomicAssumptions {
        &self.assumptions
    }

    pub fn ranges(&self) -> &InputRanges {
        self.ranges
            .get_or_init(|| derive_ranges(&self.catalog, &self.assumptions))
    }

    pub fn clear_ranges(&mut self) {
        self.ranges.take();
    }

    /// Inputs a fresh visitor starts from: the range defaults over `years`.
    pub fn default_inputs(&self, years: u32) -> CalculatorInputs {
        let ranges = self.ranges();
        CalculatorInputs {
            rent: ranges.rent.default,
            deposit: ranges.deposit.default,
            years,
        }
    }

    pub fn project(&self, inputs: &CalculatorInputs) -> ProjectionResult {
        project(inputs, &self.catalog, &self.assumptions, self.ranges())
    }
}
