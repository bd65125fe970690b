//! Individual contributions and their normalization into minor units.
use std::collections::HashSet;

use thiserror::Error;

use crate::split::{SplitConfig, Units};

/// Largest integer an `f64` holds exactly (2^53 - 1). Amounts above it are rejected
/// rather than silently rounded.
const MAX_EXACT_UNITS: f64 = 9_007_199_254_740_991.0;

/// One participant in a shared expense pool, as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    /// Label used in settlement output.
    name: String,

    /// Contribution already expressed in minor units.
    amount_units: Option<f64>,

    /// Contribution expressed in major units, scaled on normalization.
    amount_spent: Option<f64>,
}

impl Individual {
    /// Creates an individual. Exactly one amount is expected, which `normalize` enforces.
    pub fn new(name: String, amount_units: Option<f64>, amount_spent: Option<f64>) -> Self {
        Individual {
            name,
            amount_units,
            amount_spent,
        }
    }

    /// Gets the name of the individual.
    #[cfg(test)]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub fn with_units(name: &str, units: f64) -> Self {
        Individual::new(name.to_string(), Some(units), None)
    }

    #[cfg(test)]
    pub fn with_spent(name: &str, spent: f64) -> Self {
        Individual::new(name.to_string(), None, Some(spent))
    }
}

/// A validated contribution in integer minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    name: String,
    units: Units,
}

impl Contribution {
    /// Creates a contribution of `units` minor units.
    pub fn new(name: String, units: Units) -> Self {
        Contribution { name, units }
    }

    /// Gets the contributor's name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Gets the contributed amount in minor units.
    pub fn get_units(&self) -> Units {
        self.units
    }
}

/// Converts every individual's contribution into minor units, preserving input order.
///
/// Decimal amounts are scaled by `10^decimal_places` and rounded half away
/// from zero. The whole list is rejected on the first invalid individual.
pub fn normalize(
    config: &SplitConfig,
    individuals: &[Individual],
) -> Result<Vec<Contribution>, ValidationError> {
    let scale = config.scale() as f64;
    let mut seen = HashSet::with_capacity(individuals.len());
    let mut contributions = Vec::with_capacity(individuals.len());

    for (index, individual) in individuals.iter().enumerate() {
        let name = individual.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName { index });
        }
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateName {
                index,
                name: name.to_string(),
            });
        }

        let units = match (individual.amount_units, individual.amount_spent) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::AmbiguousContribution {
                    name: name.to_string(),
                });
            }
            (None, None) => {
                return Err(ValidationError::MissingContribution {
                    name: name.to_string(),
                });
            }
            (Some(value), None) => {
                if !value.is_finite()
                    || value < 0.0
                    || value.fract() != 0.0
                    || value > MAX_EXACT_UNITS
                {
                    return Err(ValidationError::MalformedUnits {
                        name: name.to_string(),
                        value,
                    });
                }
                value as Units
            }
            (None, Some(value)) => {
                let scaled = (value * scale).round();
                if !value.is_finite() || value < 0.0 || scaled > MAX_EXACT_UNITS {
                    return Err(ValidationError::MalformedSpent {
                        name: name.to_string(),
                        value,
                    });
                }
                scaled as Units
            }
        };

        contributions.push(Contribution::new(name.to_string(), units));
    }

    Ok(contributions)
}

/// Errors raised while validating the input of a settlement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Individual #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("Individual #{index} reuses the name {name:?}")]
    DuplicateName { index: usize, name: String },
    #[error("{name:?} supplies both amount_units and amount_spent")]
    AmbiguousContribution { name: String },
    #[error("{name:?} supplies neither amount_units nor amount_spent")]
    MissingContribution { name: String },
    #[error("{name:?} has amount_units {value}, expected a non-negative integer")]
    MalformedUnits { name: String, value: f64 },
    #[error("{name:?} has amount_spent {value}, expected a non-negative finite number")]
    MalformedSpent { name: String, value: f64 },
    #[error("Total contribution exceeds the representable range")]
    TotalOverflow,
}
