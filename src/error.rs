//! Error types shared by the amortization engine and the projector

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Degenerate projection: {0}")]
    DegenerateProjection(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CalcError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type CalcResult<T> = Result<T, CalcError>;

/// Reject NaN/infinite values and anything at or below zero
pub fn ensure_positive(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid(field, "must be a finite number"));
    }
    if value <= 0.0 {
        return Err(CalcError::invalid(field, format!("must be positive, got {}", value)));
    }
    Ok(())
}

/// Reject NaN/infinite values and negatives (zero is allowed)
pub fn ensure_non_negative(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(CalcError::invalid(field, format!("must not be negative, got {}", value)));
    }
    Ok(())
}
