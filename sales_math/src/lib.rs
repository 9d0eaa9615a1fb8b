//! # Sales Math
//!
//! Numeric building blocks for retail sales modelling.
//! This crate provides the window, regression and series helpers the
//! forecasting pipeline is assembled from:
//!
//! - trailing windows and lags over a sales series
//! - least-squares fitting
//! - differencing, lag polynomials and MA(∞) weights for ARIMA-type models
//! - small descriptive statistics and normal quantiles

use thiserror::Error;

pub mod moving_averages;
pub mod regression;
pub mod series;
pub mod stats;

/// Errors that can occur in sales-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for sales math operations
pub type Result<T> = std::result::Result<T, MathError>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
