//! Gradient-boosted regression trees
//!
//! Backed by XGBoost with the squared-error objective. Targets are centred
//! on the training mean, which acts as the base score, so the trees only
//! model deviations from it. The number of rounds is chosen by k-fold
//! cross-validation, updating one booster per fold a round at a time, before
//! the final refit.

use crate::error::{Result, SalesError};
use crate::features::EnrichedRecord;
use crate::models::{feature_matrix, targets, Feature, FittedRegressor, Regressor, EXTENDED_FEATURES};
use crate::utils::kfold_indices;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};
use xgboost::parameters::learning::{LearningTaskParametersBuilder, Objective};
use xgboost::parameters::tree::TreeBoosterParametersBuilder;
use xgboost::parameters::{BoosterParameters, BoosterParametersBuilder, BoosterType};
use xgboost::{Booster, DMatrix};

/// Boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    /// Upper bound of the round search
    pub max_rounds: usize,
    /// Shrinkage applied to every tree (`eta`)
    pub learning_rate: f64,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples in each leaf (`min_child_weight` under squared error)
    pub min_samples_leaf: usize,
    /// L2 regularisation of leaf weights (`lambda`)
    pub leaf_l2: f64,
    /// Cross-validation folds
    pub folds: usize,
    /// Seed of the fold shuffle
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            max_rounds: 100,
            learning_rate: 0.1,
            max_depth: 6,
            min_samples_leaf: 1,
            leaf_l2: 1.0,
            folds: 5,
            seed: 42,
        }
    }
}

impl BoostingParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            return Err(SalesError::InvalidParameter(
                "boosting needs at least one round".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(SalesError::InvalidParameter(format!(
                "learning rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(SalesError::InvalidParameter(
                "boosted trees need a depth of at least 1".to_string(),
            ));
        }
        if self.leaf_l2 < 0.0 {
            return Err(SalesError::InvalidParameter(format!(
                "leaf L2 penalty must be non-negative, got {}",
                self.leaf_l2
            )));
        }
        if self.folds < 2 {
            return Err(SalesError::InvalidParameter(format!(
                "cross-validation needs at least 2 folds, got {}",
                self.folds
            )));
        }
        Ok(())
    }

    /// Single-threaded tree booster with a zero base margin
    fn booster_params(&self) -> Result<BoosterParameters> {
        let tree = TreeBoosterParametersBuilder::default()
            .eta(self.learning_rate as f32)
            .max_depth(self.max_depth as u32)
            .min_child_weight(self.min_samples_leaf.max(1) as f32)
            .lambda(self.leaf_l2 as f32)
            .build()
            .map_err(SalesError::Boosting)?;
        let learning = LearningTaskParametersBuilder::default()
            .objective(Objective::RegLinear)
            .base_score(0.0)
            .build()
            .map_err(SalesError::Boosting)?;

        BoosterParametersBuilder::default()
            .booster_type(BoosterType::Tree(tree))
            .learning_params(learning)
            .threads(Some(1))
            .verbose(false)
            .build()
            .map_err(SalesError::Boosting)
    }
}

/// Row-major `f32` matrix of the listed rows of `x`
fn to_dmatrix(x: &[Vec<f64>], rows: &[usize]) -> Result<DMatrix> {
    let data: Vec<f32> = rows
        .iter()
        .flat_map(|&i| x[i].iter().map(|&v| v as f32))
        .collect();
    Ok(DMatrix::from_dense(&data, rows.len())?)
}

/// Boost `rounds` rounds on the rows listed in `train`.
///
/// Returns the base score (mean target of `train`) and the booster;
/// `after_round` sees both once per round.
fn boost<F>(
    x: &[Vec<f64>],
    y: &[f64],
    train: &[usize],
    params: &BoosterParameters,
    rounds: usize,
    mut after_round: F,
) -> Result<(f64, Booster)>
where
    F: FnMut(&Booster, f64) -> Result<()>,
{
    let base_score = train.iter().map(|&i| y[i]).sum::<f64>() / train.len() as f64;
    let labels: Vec<f32> = train.iter().map(|&i| (y[i] - base_score) as f32).collect();
    let mut dtrain = to_dmatrix(x, train)?;
    dtrain.set_labels(&labels)?;

    let mut booster = Booster::new_with_cached_dmats(params, &[&dtrain])?;
    for round in 0..rounds {
        booster.update(&dtrain, round as i32)?;
        after_round(&booster, base_score)?;
    }

    Ok((base_score, booster))
}

fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    let sse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    (sse / actual.len() as f64).sqrt()
}

/// Boosted ensemble adapter
#[derive(Debug, Clone)]
pub struct GradientBoostingModel {
    name: String,
    features: Vec<Feature>,
    params: BoostingParams,
}

/// Fitted boosted ensemble
pub struct FittedBoostingModel {
    name: String,
    features: Vec<Feature>,
    base_score: f64,
    rounds: usize,
    booster: Booster,
    cv_rmse: Vec<f64>,
}

impl Default for GradientBoostingModel {
    fn default() -> Self {
        Self::new(BoostingParams::default())
    }
}

impl GradientBoostingModel {
    /// Ensemble over the extended feature set
    pub fn new(params: BoostingParams) -> Self {
        Self {
            name: "Gradient Boosting".to_string(),
            features: EXTENDED_FEATURES.to_vec(),
            params,
        }
    }

    /// Mean held-out RMSE after each round, averaged over the folds
    fn cross_validate(
        &self,
        x: &[Vec<f64>],
        y: &[f64],
        booster_params: &BoosterParameters,
    ) -> Result<Vec<f64>> {
        let folds = kfold_indices(y.len(), self.params.folds, self.params.seed)?;
        let mut curve = vec![0.0; self.params.max_rounds];

        for held_out in &folds {
            let mut in_fold = vec![false; y.len()];
            for &i in held_out {
                in_fold[i] = true;
            }
            let train: Vec<usize> = (0..y.len()).filter(|&i| !in_fold[i]).collect();
            let dheld = to_dmatrix(x, held_out)?;
            let actual: Vec<f64> = held_out.iter().map(|&i| y[i]).collect();

            let mut round = 0;
            boost(x, y, &train, booster_params, self.params.max_rounds, |booster, base_score| {
                let predicted: Vec<f64> = booster
                    .predict(&dheld)?
                    .into_iter()
                    .map(|p| base_score + f64::from(p))
                    .collect();
                curve[round] += rmse(&actual, &predicted);
                round += 1;
                Ok(())
            })?;
        }

        let n_folds = folds.len() as f64;
        Ok(curve.into_iter().map(|total| total / n_folds).collect())
    }
}

impl Regressor for GradientBoostingModel {
    type Fitted = FittedBoostingModel;

    fn name(&self) -> &str {
        &self.name
    }

    fn fit(&self, rows: &[EnrichedRecord]) -> Result<FittedBoostingModel> {
        self.params.validate()?;

        let complete: Vec<EnrichedRecord> = rows
            .iter()
            .filter(|row| self.features.iter().all(|f| f.value(row).is_some()))
            .cloned()
            .collect();
        if complete.len() < rows.len() {
            info!(
                dropped = rows.len() - complete.len(),
                kept = complete.len(),
                "dropped training rows with incomplete features"
            );
        }
        if complete.len() < self.params.folds {
            return Err(SalesError::insufficient(
                &self.name,
                self.params.folds,
                complete.len(),
            ));
        }

        let x = feature_matrix(&self.name, &complete, &self.features)?;
        let y = targets(&complete);
        let booster_params = self.params.booster_params()?;

        let cv_rmse = self.cross_validate(&x, &y, &booster_params)?;
        let mut best_round = 0;
        for (round, score) in cv_rmse.iter().enumerate() {
            if *score < cv_rmse[best_round] {
                best_round = round;
            }
        }
        let rounds = best_round + 1;
        debug!(rounds, cv_rmse = cv_rmse[best_round], "selected boosting rounds");

        let all: Vec<usize> = (0..y.len()).collect();
        let (base_score, booster) = boost(&x, &y, &all, &booster_params, rounds, |_, _| Ok(()))?;

        info!(
            rounds,
            rows = complete.len(),
            base_score,
            "fitted gradient boosting ensemble"
        );

        Ok(FittedBoostingModel {
            name: self.name.clone(),
            features: self.features.clone(),
            base_score,
            rounds,
            booster,
            cv_rmse,
        })
    }
}

impl FittedBoostingModel {
    /// Number of boosting rounds in the final ensemble
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Cross-validated RMSE per round count, index 0 being one round
    pub fn cv_curve(&self) -> &[f64] {
        &self.cv_rmse
    }

    /// Training mean the trees are added to
    pub fn base_score(&self) -> f64 {
        self.base_score
    }
}

impl fmt::Debug for FittedBoostingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FittedBoostingModel")
            .field("name", &self.name)
            .field("features", &self.features)
            .field("base_score", &self.base_score)
            .field("rounds", &self.rounds)
            .finish_non_exhaustive()
    }
}

impl FittedRegressor for FittedBoostingModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn features(&self) -> &[Feature] {
        &self.features
    }

    fn predict(&self, rows: &[EnrichedRecord]) -> Result<Vec<f64>> {
        let x = feature_matrix(&self.name, rows, &self.features)?;
        if x.is_empty() {
            return Ok(Vec::new());
        }
        let all: Vec<usize> = (0..x.len()).collect();
        let raw = self.booster.predict(&to_dmatrix(&x, &all)?)?;
        Ok(raw
            .into_iter()
            .map(|p| self.base_score + f64::from(p))
            .collect())
    }
}
