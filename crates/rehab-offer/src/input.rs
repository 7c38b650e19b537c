//! Parsing of user-entered amounts (ARV, quantities, percentages).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is empty")]
    Empty { field: &'static str },
    #[error("{field} must be a number, got '{raw}'")]
    NotNumeric { field: &'static str, raw: String },
    #[error("{field} must not be negative ({value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be between {min} and {max} ({value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Amount as it arrives from a form or JSON payload: either a number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn is_blank(&self) -> bool {
        matches!(self, AmountInput::Text(raw) if raw.trim().is_empty())
    }

    pub fn resolve(&self, field: &'static str) -> Result<f64, ValidationError> {
        match self {
            AmountInput::Number(value) => check_amount(field, *value),
            AmountInput::Text(raw) => parse_amount(field, raw),
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

/// Accepts `675000`, `675,000`, `$675,000.00`; rejects negatives and non-numbers.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | '_' | ' '))
        .collect();
    if cleaned.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    let value = cleaned
        .parse::<f64>()
        .map_err(|_| ValidationError::NotNumeric {
            field,
            raw: raw.to_string(),
        })?;
    check_amount(field, value)
}

pub fn parse_percentage(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(value)
}

fn check_amount(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotNumeric {
            field,
            raw: value.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}
