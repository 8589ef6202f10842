use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{CalculatorSession, EconomicAssumptions, PropertyListing};

pub const CONFIG_ENV_VAR: &str = "RENTVSBUY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read deployment config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid deployment config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid deployment config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Localization {
    pub currency: String,
    pub locale: String,
}

/// Everything one development's calculator is configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub developer_name: String,
    pub localization: Localization,
    pub assumptions: EconomicAssumptions,
    #[serde(default = "default_allowed_years")]
    pub allowed_years: Vec<u32>,
    #[serde(default = "default_years")]
    pub default_years: u32,
    #[serde(alias = "data")]
    pub catalog: Vec<PropertyListing>,
}

fn default_allowed_years() -> Vec<u32> {
    vec![5, 10]
}

fn default_years() -> u32 {
    10
}

impl DeploymentConfig {
    /// Loads from `path` if given, else from [`CONFIG_ENV_VAR`], else the
    /// built-in deployment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let assumptions = &self.assumptions;
        if assumptions.mortgage_term_years == 0 {
            return Err(ConfigError::Invalid(
                "mortgageTermYears must be > 0".to_string(),
            ));
        }
        for (name, rate) in [
            ("interestRate", assumptions.interest_rate),
            ("rentInflation", assumptions.rent_inflation),
            ("propertyAppreciation", assumptions.property_appreciation),
        ] {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a finite fraction > -1"
                )));
            }
        }

        if self.allowed_years.is_empty() || self.allowed_years.contains(&0) {
            return Err(ConfigError::Invalid(
                "allowedYears must list at least one positive horizon".to_string(),
            ));
        }
        if !self.allowed_years.contains(&self.default_years) {
            return Err(ConfigError::Invalid(
                "defaultYears must be one of allowedYears".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for listing in &self.catalog {
            if !seen.insert(listing.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate listing id `{}`",
                    listing.id
                )));
            }
            if !listing.price.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "listing `{}` has a non-finite price",
                    listing.id
                )));
            }
            if !listing.monthly_charge.is_finite() || listing.monthly_charge < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "listing `{}` monthlyCharge must be >= 0",
                    listing.id
                )));
            }
        }
        Ok(())
    }

    pub fn session(&self) -> CalculatorSession {
        CalculatorSession::new(self.catalog.clone(), self.assumptions)
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        let unit = |id: &str, price: f64, beds: u32, photo: u32, monthly_charge: f64| {
            PropertyListing {
                id: id.to_string(),
                price,
                beds,
                image: format!("photo-{photo}.webp"),
                monthly_charge,
                location: "Avarra by Palace".to_string(),
            }
        };
        Self {
            developer_name: "Emaar Properties".to_string(),
            localization: Localization {
                currency: "AED".to_string(),
                locale: "en-AE".to_string(),
            },
            assumptions: EconomicAssumptions {
                interest_rate: 0.045,
                mortgage_term_years: 25,
                rent_inflation: 0.04,
                property_appreciation: 0.04,
            },
            allowed_years: default_allowed_years(),
            default_years: default_years(),
            catalog: vec![
                unit("1BR-Apartment", 2_839_888.0, 1, 1, 1_011.0),
                unit("2BR-Apartment", 4_650_602.0, 2, 2, 1_655.0),
                unit("3BR-Apartment", 6_125_868.0, 3, 3, 2_180.0),
                unit("4BR-Apartment", 15_841_552.0, 4, 4, 5_638.0),
                unit("6BR-Apartment", 52_199_846.0, 6, 5, 18_576.0),
            ],
        }
    }
}
