//! Lead capture: contact details plus a snapshot of the latest projection.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::core::{CalculatorInputs, ProjectionResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeadError {
    #[error("name is required")]
    MissingName,
    #[error("a valid email address is required")]
    InvalidEmail,
    #[error("yearsSelected must be > 0")]
    InvalidYears,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A finished lead, copied out of a projection at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub property_id: String,
    pub property_price: i64,
    pub current_rent: i64,
    pub deposit_amount: i64,
    pub years_selected: u32,
    pub wealth_gap: i64,
}

impl LeadRecord {
    pub fn build(
        contact: ContactDetails,
        inputs: &CalculatorInputs,
        projection: &ProjectionResult,
    ) -> Result<Self, LeadError> {
        let name = contact.name.trim();
        if name.is_empty() {
            return Err(LeadError::MissingName);
        }
        let email = contact.email.trim();
        if !is_plausible_email(email) {
            return Err(LeadError::InvalidEmail);
        }
        if inputs.years == 0 {
            return Err(LeadError::InvalidYears);
        }
        let phone = contact
            .phone
            .map(|phone| phone.trim().to_string())
            .filter(|phone| !phone.is_empty());

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            phone,
            property_id: projection.matched_property.id.clone(),
            property_price: round_to_i64(projection.matched_property.price),
            current_rent: round_to_i64(inputs.rent),
            deposit_amount: round_to_i64(inputs.deposit),
            years_selected: inputs.years,
            wealth_gap: round_to_i64(projection.wealth_gap),
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

// `as` saturates out-of-range floats and maps NaN to 0.
fn round_to_i64(value: f64) -> i64 {
    value.round() as i64
}

/// Receives captured leads. Persistence and notification live behind this.
pub trait LeadSink: Send + Sync {
    fn accept(&self, lead: &LeadRecord);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingLeadSink;

impl LeadSink for LoggingLeadSink {
    fn accept(&self, lead: &LeadRecord) {
        info!(
            name = %lead.name,
            email = %lead.email,
            phone = lead.phone.as_deref().unwrap_or("not provided"),
            property_id = %lead.property_id,
            property_price = lead.property_price,
            current_rent = lead.current_rent,
            deposit_amount = lead.deposit_amount,
            years_selected = lead.years_selected,
            wealth_gap = lead.wealth_gap,
            "new lead captured"
        );
    }
}
