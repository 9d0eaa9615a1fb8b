//! # Sales Forecast
//!
//! Weekly retail sales analysis: load a store/week sales table, derive
//! calendar, lag and rolling features per store, fit four model families and
//! compare their accuracy on held-out data.
//!
//! ## Features
//!
//! - Validated CSV loading with line-numbered errors
//! - Per-store feature engineering (year, month, week, `lag_1`, `lag_2`,
//!   `rolling_mean_4`, holiday indicator) with polars export
//! - Linear regression and CART regression tree on economic indicators
//! - Seasonal ARIMA with automatic order selection and forecast intervals
//! - Gradient-boosted trees with cross-validated round selection
//! - RMSE / MAE / MAPE comparison table
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sales_forecast::config::ReportConfig;
//! use sales_forecast::pipeline::ReportPipeline;
//!
//! # fn main() -> sales_forecast::error::Result<()> {
//! let pipeline = ReportPipeline::new(ReportConfig::default());
//! let report = pipeline.run_csv("Walmart_Store_sales.csv")?;
//! println!("{}", report.comparison);
//! # Ok(())
//! # }
//! ```
//!
//! Models can also be used on their own:
//!
//! ```rust
//! use sales_forecast::models::arima::AutoArima;
//! use sales_forecast::models::{ForecastModel, TrainedForecastModel};
//! use sales_forecast::utils::synthetic_sales;
//!
//! let series = synthetic_sales(104, 1);
//! let model = AutoArima::default().train(&series).unwrap();
//! let forecast = model.forecast(52).unwrap();
//! assert_eq!(forecast.values().len(), 52);
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use crate::config::ReportConfig;
pub use crate::data::{DataLoader, RecordKey, SalesRecord};
pub use crate::error::{Result, SalesError};
pub use crate::features::{EnrichedRecord, FeatureBuilder, FeatureTable, WeekConvention};
pub use crate::metrics::{evaluate, ComparisonTable, MapePolicy, Metrics};
pub use crate::models::{FittedRegressor, ForecastModel, ForecastResult, Regressor, TrainedForecastModel};
pub use crate::pipeline::{Report, ReportPipeline};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
