//! Model adapters for weekly sales
//!
//! Cross-sectional adapters (linear, tree, boosted ensemble) implement
//! [`Regressor`] and consume enriched rows; the time-series adapter implements
//! [`ForecastModel`] and consumes one store's chronological sales series.
//! Fitting never mutates the adapter: it returns a separate, immutable fitted
//! model that can be reused for any number of predictions.

use crate::error::{Result, SalesError};
use crate::features::EnrichedRecord;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod arima;
pub mod boosting;
pub mod linear;
pub mod tree;

/// Typed model input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    FuelPrice,
    Cpi,
    Unemployment,
    HolidayFlag,
    Temperature,
    Month,
    Lag1,
    Lag2,
    RollingMean4,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::FuelPrice => "fuel_price",
            Feature::Cpi => "cpi",
            Feature::Unemployment => "unemployment",
            Feature::HolidayFlag => "holiday_flag",
            Feature::Temperature => "temperature",
            Feature::Month => "month",
            Feature::Lag1 => "lag_1",
            Feature::Lag2 => "lag_2",
            Feature::RollingMean4 => "rolling_mean_4",
        }
    }

    /// Value of this feature for a row, `None` when the row has no history for it
    pub fn value(&self, row: &EnrichedRecord) -> Option<f64> {
        let record = &row.record;
        match self {
            Feature::FuelPrice => Some(record.fuel_price),
            Feature::Cpi => Some(record.cpi),
            Feature::Unemployment => Some(record.unemployment),
            Feature::HolidayFlag => Some(if record.holiday_flag { 1.0 } else { 0.0 }),
            Feature::Temperature => Some(record.temperature),
            Feature::Month => Some(row.month as f64),
            Feature::Lag1 => row.lag_1,
            Feature::Lag2 => row.lag_2,
            Feature::RollingMean4 => row.rolling_mean_4,
        }
    }
}

/// Inputs of the linear and tree adapters
pub const BASE_FEATURES: [Feature; 4] = [
    Feature::FuelPrice,
    Feature::Cpi,
    Feature::Unemployment,
    Feature::HolidayFlag,
];

/// Inputs of the boosted ensemble
pub const EXTENDED_FEATURES: [Feature; 9] = [
    Feature::FuelPrice,
    Feature::Cpi,
    Feature::Unemployment,
    Feature::HolidayFlag,
    Feature::Temperature,
    Feature::Month,
    Feature::Lag1,
    Feature::Lag2,
    Feature::RollingMean4,
];

/// Row-major feature matrix; a missing value fails with [`SalesError::Prediction`].
pub(crate) fn feature_matrix(
    model: &str,
    rows: &[EnrichedRecord],
    features: &[Feature],
) -> Result<Vec<Vec<f64>>> {
    rows.iter()
        .map(|row| {
            features
                .iter()
                .map(|feature| {
                    feature.value(row).ok_or_else(|| SalesError::Prediction {
                        model: model.to_string(),
                        key: row.key().to_string(),
                        feature: feature.name(),
                    })
                })
                .collect()
        })
        .collect()
}

/// Weekly sales of each row
pub(crate) fn targets(rows: &[EnrichedRecord]) -> Vec<f64> {
    rows.iter().map(|r| r.record.weekly_sales).collect()
}

/// Adapter that can be fitted on enriched rows
pub trait Regressor: Debug {
    /// The immutable model produced by fitting
    type Fitted: FittedRegressor;

    /// Name used in reports
    fn name(&self) -> &str;

    /// Fit on training rows
    fn fit(&self, rows: &[EnrichedRecord]) -> Result<Self::Fitted>;
}

/// Fitted cross-sectional model
pub trait FittedRegressor: Debug {
    /// Name used in reports
    fn name(&self) -> &str;

    /// Columns the model reads
    fn features(&self) -> &[Feature];

    /// One prediction per row, in row order
    fn predict(&self, rows: &[EnrichedRecord]) -> Result<Vec<f64>>;
}

/// Forecast result containing predicted values
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// Number of periods forecasted
    horizons: usize,
    /// Forecast-error variance per step
    variances: Vec<f64>,
    /// Confidence intervals per step
    intervals: Vec<(f64, f64)>,
    /// Confidence level of the intervals
    confidence_level: f64,
}

impl ForecastResult {
    /// Create a new forecast result with variances and confidence intervals
    pub fn new(
        values: Vec<f64>,
        horizons: usize,
        variances: Vec<f64>,
        intervals: Vec<(f64, f64)>,
        confidence_level: f64,
    ) -> Result<Self> {
        if values.len() != horizons {
            return Err(SalesError::InvalidParameter(format!(
                "Values length ({}) doesn't match horizons ({})",
                values.len(),
                horizons
            )));
        }

        if values.len() != variances.len() || values.len() != intervals.len() {
            return Err(SalesError::InvalidParameter(format!(
                "Values length ({}) doesn't match variances ({}) or intervals ({})",
                values.len(),
                variances.len(),
                intervals.len()
            )));
        }

        Ok(Self {
            values,
            horizons,
            variances,
            intervals,
            confidence_level,
        })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// Forecast-error variance per step
    pub fn variances(&self) -> &[f64] {
        &self.variances
    }

    /// Lower and upper interval bound per step
    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }
}

/// Forecast model that can be trained on a chronological series
pub trait ForecastModel: Debug {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a series
    fn train(&self, series: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for future periods
    fn forecast(&self, horizon: usize) -> Result<ForecastResult>;

    /// One-step-ahead in-sample predictions, aligned with the training series
    fn fitted_values(&self) -> &[f64];

    /// Training series minus fitted values
    fn residuals(&self) -> &[f64];

    /// Name of the model
    fn name(&self) -> &str;
}
