//! End-to-end comparison run
//!
//! One seeded split of the feature table feeds the linear, tree and boosted
//! models; the ARIMA model forecasts the held-out tail of one store's series.
//! Any model failure aborts the run.

use crate::config::ReportConfig;
use crate::data::{DataLoader, SalesRecord};
use crate::error::{Result, SalesError};
use crate::features::{EnrichedRecord, FeatureBuilder, FeatureTable};
use crate::metrics::{ComparisonTable, PredictionResult};
use crate::models::arima::{ArimaOrder, AutoArima, InformationCriterion, MIN_OBSERVATIONS};
use crate::models::boosting::GradientBoostingModel;
use crate::models::linear::LinearModel;
use crate::models::tree::TreeModel;
use crate::models::{
    FittedRegressor, ForecastModel, ForecastResult, Regressor, TrainedForecastModel,
};
use crate::utils::{chronological_split, train_test_split};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Selected ARIMA model and its holdout forecast
#[derive(Debug, Clone, Serialize)]
pub struct ArimaSummary {
    pub store: u32,
    pub order: ArimaOrder,
    pub criterion: InformationCriterion,
    pub criterion_value: f64,
    pub sigma2: f64,
    pub constant: f64,
    pub forecast: ForecastResult,
}

/// Round selection of the boosted ensemble
#[derive(Debug, Clone, Serialize)]
pub struct BoostingSummary {
    pub rounds: usize,
    pub cv_rmse: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Everything a comparison run produces
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub train_rows: usize,
    pub test_rows: usize,
    pub comparison: ComparisonTable,
    pub predictions: Vec<PredictionResult>,
    pub arima: ArimaSummary,
    pub boosting: BoostingSummary,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Cross-sectional split: {} train rows, {} test rows",
            self.train_rows, self.test_rows
        )?;
        writeln!(
            f,
            "Gradient boosting: {} rounds (CV RMSE {:.2}), {} complete train rows, {} complete test rows",
            self.boosting.rounds,
            self.boosting.cv_rmse,
            self.boosting.train_rows,
            self.boosting.test_rows
        )?;
        writeln!(
            f,
            "Store {} ARIMA: {} ({:?} {:.2}, sigma^2 {:.2}), {} week holdout",
            self.arima.store,
            self.arima.order,
            self.arima.criterion,
            self.arima.criterion_value,
            self.arima.sigma2,
            self.arima.forecast.horizons()
        )?;
        writeln!(f)?;
        write!(f, "{}", self.comparison)
    }
}

/// Runs every model against one feature table
#[derive(Debug, Clone, Default)]
pub struct ReportPipeline {
    config: ReportConfig,
}

impl ReportPipeline {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Enrich raw records using the configured week convention
    pub fn build_features(&self, records: &[SalesRecord]) -> Result<FeatureTable> {
        FeatureBuilder::new()
            .with_week_convention(self.config.week_convention)
            .build(records)
    }

    /// Load a CSV file, build its features and run the comparison
    pub fn run_csv<P: AsRef<Path>>(&self, path: P) -> Result<Report> {
        let records = DataLoader::from_csv(path)?;
        let table = self.build_features(&records)?;
        self.run(&table)
    }

    pub fn run(&self, table: &FeatureTable) -> Result<Report> {
        self.config.validate()?;
        let (train, test) = train_test_split(table.rows(), self.config.test_ratio, self.config.seed)?;
        info!(train = train.len(), test = test.len(), "split feature table");

        let mut predictions = Vec::with_capacity(4);

        let linear = LinearModel::new().fit(&train)?;
        predictions.push(predict(&linear, &test)?);

        let tree = TreeModel::new(self.config.tree.clone()).fit(&train)?;
        predictions.push(predict(&tree, &test)?);

        let boosting = GradientBoostingModel::new(self.config.boosting.clone()).fit(&train)?;
        let complete_test: Vec<EnrichedRecord> =
            test.iter().filter(|r| r.is_complete()).cloned().collect();
        if complete_test.len() < test.len() {
            info!(
                dropped = test.len() - complete_test.len(),
                "dropped test rows with incomplete features for gradient boosting"
            );
        }
        predictions.push(predict(&boosting, &complete_test)?);
        let boosting_summary = BoostingSummary {
            rounds: boosting.rounds(),
            cv_rmse: boosting.cv_curve()[boosting.rounds() - 1],
            train_rows: train.iter().filter(|r| r.is_complete()).count(),
            test_rows: complete_test.len(),
        };

        let (arima_prediction, arima_summary) = self.forecast_store(table)?;
        predictions.push(arima_prediction);

        let comparison = ComparisonTable::from_predictions(&predictions, self.config.mape_policy)?;
        if let Some(best) = comparison.best() {
            info!(model = %best.model, rmse = best.rmse, "comparison finished");
        }

        Ok(Report {
            train_rows: train.len(),
            test_rows: test.len(),
            comparison,
            predictions,
            arima: arima_summary,
            boosting: boosting_summary,
        })
    }

    /// Fit ARIMA on the configured store and forecast its held-out tail
    fn forecast_store(&self, table: &FeatureTable) -> Result<(PredictionResult, ArimaSummary)> {
        let store = self.config.arima_store;
        let holdout = self.config.arima_holdout;
        let rows = table.store_rows(store);
        if rows.is_empty() {
            return Err(SalesError::insufficient(
                format!("store {} series", store),
                holdout + MIN_OBSERVATIONS,
                0,
            ));
        }

        let series = table.store_series(store);
        let (history, tail) = chronological_split(&series, holdout)?;
        let model = AutoArima::new(self.config.arima.clone());
        let trained = model.train(&history)?;
        let forecast = trained.forecast(holdout)?;

        let keys = rows[history.len()..].iter().map(EnrichedRecord::key).collect();
        let prediction = PredictionResult::new(model.name(), keys, &tail, forecast.values())?;
        let summary = ArimaSummary {
            store,
            order: trained.order(),
            criterion: trained.criterion(),
            criterion_value: trained.criterion_value(),
            sigma2: trained.sigma2(),
            constant: trained.constant(),
            forecast,
        };
        Ok((prediction, summary))
    }
}

fn predict<M: FittedRegressor>(model: &M, rows: &[EnrichedRecord]) -> Result<PredictionResult> {
    let predicted = model.predict(rows)?;
    let actual: Vec<f64> = rows.iter().map(|r| r.record.weekly_sales).collect();
    let keys = rows.iter().map(EnrichedRecord::key).collect();
    PredictionResult::new(model.name(), keys, &actual, &predicted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::boosting::BoostingParams;
    use crate::utils::synthetic_records;

    fn quick_config() -> ReportConfig {
        ReportConfig {
            boosting: BoostingParams {
                max_rounds: 20,
                max_depth: 3,
                ..BoostingParams::default()
            },
            ..ReportConfig::default()
        }
    }

    #[test]
    fn report_covers_all_models() {
        let pipeline = ReportPipeline::new(quick_config());
        let table = pipeline
            .build_features(&synthetic_records(&[1, 2], 110, 9).unwrap())
            .unwrap();
        let report = pipeline.run(&table).unwrap();

        assert_eq!(report.predictions.len(), 4);
        assert_eq!(report.comparison.rows().len(), 4);
        assert_eq!(report.train_rows + report.test_rows, 220);
        assert_eq!(report.arima.forecast.values().len(), 20);
        assert_eq!(report.predictions[3].len(), 20);
        assert!(report.predictions[2].len() <= report.test_rows);
        assert!(report
            .comparison
            .rows()
            .windows(2)
            .all(|w| w[0].rmse <= w[1].rmse));
    }

    #[test]
    fn unknown_arima_store_fails() {
        let config = ReportConfig {
            arima_store: 99,
            ..quick_config()
        };
        let pipeline = ReportPipeline::new(config);
        let table = pipeline
            .build_features(&synthetic_records(&[1], 60, 2).unwrap())
            .unwrap();
        assert!(matches!(
            pipeline.run(&table),
            Err(SalesError::InsufficientData { available: 0, .. })
        ));
    }
}
