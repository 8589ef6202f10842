mod engine;
mod fallback;
mod ranges;
mod session;
mod types;

pub use engine::project;
pub use fallback::{FALLBACK_RANGES, default_property, fallback_property};
pub use ranges::derive_ranges;
pub use session::CalculatorSession;
pub use types::{
    CalculatorInputs, EconomicAssumptions, InputRange, InputRanges, ProjectionResult,
    PropertyListing,
};
