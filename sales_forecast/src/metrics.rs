//! Accuracy metrics and the model comparison table

use crate::data::RecordKey;
use crate::error::{Result, SalesError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Treatment of zero actual values in MAPE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapePolicy {
    /// Fail with [`SalesError::DivideByZero`] at the first zero actual
    #[default]
    Fail,
    /// Leave zero actuals out of MAPE (RMSE and MAE still use them)
    SkipZeros,
}

/// Accuracy of one prediction sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub rmse: f64,
    pub mae: f64,
    /// Mean absolute percentage error, in percent
    pub mape: f64,
}

/// Compute RMSE, MAE and MAPE of `predicted` against `actual`.
pub fn evaluate(actual: &[f64], predicted: &[f64], policy: MapePolicy) -> Result<Metrics> {
    if actual.len() != predicted.len() {
        return Err(SalesError::LengthMismatch {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(SalesError::insufficient("evaluation", 1, 0));
    }

    let n = actual.len() as f64;
    let mut squared = 0.0;
    let mut absolute = 0.0;
    for (a, p) in actual.iter().zip(predicted) {
        let error = a - p;
        squared += error * error;
        absolute += error.abs();
    }

    Ok(Metrics {
        rmse: (squared / n).sqrt(),
        mae: absolute / n,
        mape: mape(actual, predicted, policy)?,
    })
}

fn mape(actual: &[f64], predicted: &[f64], policy: MapePolicy) -> Result<f64> {
    let mut total = 0.0;
    let mut counted = 0usize;
    let mut first_zero = None;

    for (index, (a, p)) in actual.iter().zip(predicted).enumerate() {
        if *a == 0.0 {
            if policy == MapePolicy::Fail {
                return Err(SalesError::DivideByZero { index });
            }
            first_zero.get_or_insert(index);
            continue;
        }
        total += ((a - p) / a).abs();
        counted += 1;
    }

    match (counted, first_zero) {
        (0, Some(index)) => Err(SalesError::DivideByZero { index }),
        _ => Ok(100.0 * total / counted as f64),
    }
}

/// One evaluated prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionPoint {
    pub key: RecordKey,
    pub actual: f64,
    pub predicted: f64,
}

/// A model's predictions over its evaluation rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub model: String,
    pub points: Vec<PredictionPoint>,
}

impl PredictionResult {
    /// Pair keys, actuals and predictions; all three must have the same length
    pub fn new(
        model: impl Into<String>,
        keys: Vec<RecordKey>,
        actual: &[f64],
        predicted: &[f64],
    ) -> Result<Self> {
        if actual.len() != predicted.len() || keys.len() != actual.len() {
            return Err(SalesError::LengthMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }
        let points = keys
            .into_iter()
            .zip(actual.iter().zip(predicted))
            .map(|(key, (&actual, &predicted))| PredictionPoint {
                key,
                actual,
                predicted,
            })
            .collect();
        Ok(Self {
            model: model.into(),
            points,
        })
    }

    pub fn actual(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.actual).collect()
    }

    pub fn predicted(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One line of the comparison table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    pub model: String,
    pub rmse: f64,
    pub mae: f64,
    pub mape: f64,
}

impl MetricsRow {
    pub fn from_predictions(result: &PredictionResult, policy: MapePolicy) -> Result<Self> {
        let metrics = evaluate(&result.actual(), &result.predicted(), policy)?;
        Ok(Self {
            model: result.model.clone(),
            rmse: metrics.rmse,
            mae: metrics.mae,
            mape: metrics.mape,
        })
    }
}

/// Metrics of every model, best RMSE first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonTable {
    rows: Vec<MetricsRow>,
}

impl ComparisonTable {
    /// Sort by ascending RMSE; models with equal RMSE keep their input order.
    pub fn sorted_by_rmse(mut rows: Vec<MetricsRow>) -> Self {
        rows.sort_by(|a, b| a.rmse.total_cmp(&b.rmse));
        Self { rows }
    }

    pub fn from_predictions(results: &[PredictionResult], policy: MapePolicy) -> Result<Self> {
        let rows = results
            .iter()
            .map(|r| MetricsRow::from_predictions(r, policy))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::sorted_by_rmse(rows))
    }

    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    /// Row with the lowest RMSE
    pub fn best(&self) -> Option<&MetricsRow> {
        self.rows.first()
    }
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.model.len())
            .max()
            .unwrap_or(0)
            .max("Model".len());

        writeln!(
            f,
            "{:<width$}  {:>14}  {:>14}  {:>9}",
            "Model",
            "RMSE",
            "MAE",
            "MAPE (%)",
            width = width
        )?;
        writeln!(f, "{}", "-".repeat(width + 43))?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<width$}  {:>14.2}  {:>14.2}  {:>9.2}",
                row.model,
                row.rmse,
                row.mae,
                row.mape,
                width = width
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identical_inputs_score_zero() {
        let values = [3.0, 5.0, 8.0];
        let metrics = evaluate(&values, &values, MapePolicy::Fail).unwrap();
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.mape, 0.0);
    }

    #[test]
    fn known_errors() {
        let metrics = evaluate(&[100.0, 200.0], &[110.0, 170.0], MapePolicy::Fail).unwrap();
        assert_abs_diff_eq!(metrics.rmse, (500.0f64).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.mae, 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.mape, 12.5, epsilon = 1e-12);
    }

    #[test]
    fn mape_policies() {
        let err = evaluate(&[1.0, 0.0], &[1.0, 1.0], MapePolicy::Fail).unwrap_err();
        assert!(matches!(err, SalesError::DivideByZero { index: 1 }));

        let metrics = evaluate(&[2.0, 0.0], &[1.0, 1.0], MapePolicy::SkipZeros).unwrap();
        assert_abs_diff_eq!(metrics.mape, 50.0);
        assert_abs_diff_eq!(metrics.mae, 1.0);

        let err = evaluate(&[0.0, 0.0], &[1.0, 1.0], MapePolicy::SkipZeros).unwrap_err();
        assert!(matches!(err, SalesError::DivideByZero { index: 0 }));
    }

    #[test]
    fn table_sort_is_stable() {
        let row = |model: &str, rmse: f64| MetricsRow {
            model: model.to_string(),
            rmse,
            mae: 0.0,
            mape: 0.0,
        };
        let table = ComparisonTable::sorted_by_rmse(vec![
            row("b", 2.0),
            row("a", 1.0),
            row("c", 2.0),
        ]);
        let order: Vec<&str> = table.rows().iter().map(|r| r.model.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(table.best().map(|r| r.model.as_str()), Some("a"));

        let text = table.to_string();
        assert!(text.starts_with("Model"));
        assert_eq!(text.lines().count(), 5);
    }
}
