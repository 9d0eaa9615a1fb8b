//! Ordinary least squares on the economic indicators

use crate::error::{Result, SalesError};
use crate::features::EnrichedRecord;
use crate::models::{feature_matrix, targets, Feature, FittedRegressor, Regressor, BASE_FEATURES};
use sales_math::regression::least_squares;
use tracing::debug;

/// Linear regression adapter (intercept plus one coefficient per feature, no interactions)
#[derive(Debug, Clone)]
pub struct LinearModel {
    name: String,
    features: Vec<Feature>,
}

/// Fitted linear regression
#[derive(Debug, Clone)]
pub struct FittedLinearModel {
    name: String,
    features: Vec<Feature>,
    intercept: f64,
    coefficients: Vec<f64>,
    r_squared: Option<f64>,
}

impl Default for LinearModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearModel {
    /// Linear model over fuel price, CPI, unemployment and the holiday flag
    pub fn new() -> Self {
        Self::with_features(&BASE_FEATURES)
    }

    pub fn with_features(features: &[Feature]) -> Self {
        Self {
            name: "Linear Regression".to_string(),
            features: features.to_vec(),
        }
    }
}

impl Regressor for LinearModel {
    type Fitted = FittedLinearModel;

    fn name(&self) -> &str {
        &self.name
    }

    fn fit(&self, rows: &[EnrichedRecord]) -> Result<FittedLinearModel> {
        let required = self.features.len() + 1;
        if rows.len() < required {
            return Err(SalesError::insufficient(&self.name, required, rows.len()));
        }

        let x = feature_matrix(&self.name, rows, &self.features)?;
        let y = targets(rows);
        let fit = least_squares(&x, &y, true)?;
        let r_squared = fit.r_squared(&y);

        debug!(
            intercept = fit.intercept,
            coefficients = ?fit.coefficients,
            r_squared = ?r_squared,
            rank = fit.rank,
            "fitted linear model"
        );

        Ok(FittedLinearModel {
            name: self.name.clone(),
            features: self.features.clone(),
            intercept: fit.intercept,
            coefficients: fit.coefficients,
            r_squared,
        })
    }
}

impl FittedLinearModel {
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficients in the order of [`FittedRegressor::features`]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// In-sample R², `None` when the training target was constant
    pub fn r_squared(&self) -> Option<f64> {
        self.r_squared
    }
}

impl FittedRegressor for FittedLinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn features(&self) -> &[Feature] {
        &self.features
    }

    fn predict(&self, rows: &[EnrichedRecord]) -> Result<Vec<f64>> {
        let x = feature_matrix(&self.name, rows, &self.features)?;
        Ok(x.iter()
            .map(|row| {
                self.intercept
                    + self
                        .coefficients
                        .iter()
                        .zip(row)
                        .map(|(beta, value)| beta * value)
                        .sum::<f64>()
            })
            .collect())
    }
}
