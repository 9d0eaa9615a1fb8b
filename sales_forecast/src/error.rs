//! Error types for the sales_forecast crate

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use sales_math::MathError;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum SalesError {
    /// Malformed or missing input; `line` is 1-based and counts the header
    #[error("Load error at line {line}: {message}")]
    Load { line: u64, message: String },

    /// Duplicate (store, date) keys that would break lag computation
    #[error("Data order error: duplicate record for store {store} on {date}")]
    DataOrder { store: u32, date: NaiveDate },

    /// Too few rows for a model or metric
    #[error("Insufficient data for {context}: need at least {required}, have {available}")]
    InsufficientData {
        context: String,
        required: usize,
        available: usize,
    },

    /// A feature required at predict time was missing
    #[error("Prediction error in {model}: feature '{feature}' is missing for {key}")]
    Prediction {
        model: String,
        key: String,
        feature: &'static str,
    },

    /// Actual and predicted sequences differ in length
    #[error("Length mismatch: {actual} actual values vs {predicted} predicted values")]
    LengthMismatch { actual: usize, predicted: usize },

    /// MAPE is undefined because an actual value is zero
    #[error("Division by zero: actual value at index {index} is zero")]
    DivideByZero { index: usize },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from numeric routines
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),

    /// Error from the XGBoost backend or its parameter builders
    #[error("Boosting error: {0}")]
    Boosting(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, SalesError>;

impl From<PolarsError> for SalesError {
    fn from(err: PolarsError) -> Self {
        SalesError::Polars(err.to_string())
    }
}

impl From<xgboost::XGBError> for SalesError {
    fn from(err: xgboost::XGBError) -> Self {
        SalesError::Boosting(err.to_string())
    }
}

impl SalesError {
    /// Shorthand for a load failure at a given line
    pub fn load(line: u64, message: impl Into<String>) -> Self {
        SalesError::Load {
            line,
            message: message.into(),
        }
    }

    /// Shorthand for an insufficient-data failure
    pub fn insufficient(context: impl Into<String>, required: usize, available: usize) -> Self {
        SalesError::InsufficientData {
            context: context.into(),
            required,
            available,
        }
    }
}
