//! Report configuration

use crate::error::{Result, SalesError};
use crate::features::WeekConvention;
use crate::metrics::MapePolicy;
use crate::models::arima::ArimaSearch;
use crate::models::boosting::BoostingParams;
use crate::models::tree::TreeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings of one comparison run; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Fraction of rows held out for the cross-sectional models
    pub test_ratio: f64,
    /// Seed of the train/test shuffle
    pub seed: u64,
    /// Store whose series the ARIMA adapter models
    pub arima_store: u32,
    /// Trailing weeks held out from the ARIMA training series
    pub arima_holdout: usize,
    pub week_convention: WeekConvention,
    pub mape_policy: MapePolicy,
    pub tree: TreeConfig,
    pub boosting: BoostingParams,
    pub arima: ArimaSearch,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
            arima_store: 1,
            arima_holdout: 20,
            week_convention: WeekConvention::default(),
            mape_policy: MapePolicy::default(),
            tree: TreeConfig::default(),
            boosting: BoostingParams::default(),
            arima: ArimaSearch::default(),
        }
    }
}

impl ReportConfig {
    /// Read a JSON config; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: ReportConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(SalesError::InvalidParameter(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if self.arima_holdout == 0 {
            return Err(SalesError::InvalidParameter(
                "arima_holdout must be positive".to_string(),
            ));
        }
        if self.tree.complexity < 0.0 {
            return Err(SalesError::InvalidParameter(format!(
                "tree complexity must be non-negative, got {}",
                self.tree.complexity
            )));
        }
        self.boosting.validate()?;
        self.arima.validate()
    }
}
