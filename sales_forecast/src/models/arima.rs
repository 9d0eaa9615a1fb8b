//! Seasonal ARIMA for one store's weekly sales
//!
//! Models `φ(B) (1 - B)^d (1 - B^s)^D y_t = c + θ(B) ε_t` where the AR and
//! MA polynomials hold non-seasonal lags `1..=p` / `1..=q` plus seasonal lags
//! `s, 2s, ...` (additive seasonal terms, no multiplicative cross lags).
//! Coefficients come from conditional least squares on the differenced series;
//! when MA terms are present the lagged innovations are first estimated with a
//! long autoregression (Hannan–Rissanen).

use crate::error::{Result, SalesError};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use sales_math::regression::least_squares;
use sales_math::series::{
    cumulative_variance, difference, difference_orders, differencing_polynomial, is_causal,
    lag_polynomial, poly_mul, psi_weights,
};
use sales_math::stats::{normal_critical_value, sample_variance};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use tracing::{debug, info};

/// Weeks in one seasonal cycle
pub const WEEKLY_PERIOD: usize = 52;

/// Shortest series either adapter will train on
pub const MIN_OBSERVATIONS: usize = 16;

/// Residual degrees of freedom a candidate must keep
const MIN_RESIDUAL_DOF: usize = 3;

/// Model orders `(p,d,q)(P,D,Q)[period]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl ArimaOrder {
    /// Non-seasonal order with the weekly period and no seasonal terms
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p: 0,
            seasonal_d: 0,
            seasonal_q: 0,
            period: WEEKLY_PERIOD,
        }
    }

    pub fn with_seasonal(mut self, seasonal_p: usize, seasonal_d: usize, seasonal_q: usize) -> Self {
        self.seasonal_p = seasonal_p;
        self.seasonal_d = seasonal_d;
        self.seasonal_q = seasonal_q;
        self
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    fn ar_lags(&self) -> Vec<usize> {
        (1..=self.p)
            .chain((1..=self.seasonal_p).map(|k| k * self.period))
            .collect()
    }

    /// Longest AR lag; the conditional residuals start after it
    fn max_ar_lag(&self) -> usize {
        self.p.max(self.seasonal_p * self.period)
    }

    fn ma_lags(&self) -> Vec<usize> {
        (1..=self.q)
            .chain((1..=self.seasonal_q).map(|k| k * self.period))
            .collect()
    }

    /// Observations consumed by differencing
    fn integration(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }

    /// A constant (mean or drift) is only estimated for at most one difference
    fn allows_constant(&self) -> bool {
        self.d + self.seasonal_d <= 1
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ARIMA({},{},{})({},{},{})[{}]",
            self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
        )
    }
}

/// Criterion minimised by the order search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    Aic,
    #[default]
    Aicc,
    Bic,
}

/// Information criteria of one fitted candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InformationCriteria {
    pub aic: f64,
    pub aicc: f64,
    pub bic: f64,
}

impl InformationCriteria {
    /// Gaussian criteria over a stretch of residuals
    fn from_residuals(residuals: &[f64], n_params: usize) -> Self {
        let sse: f64 = residuals.iter().map(|r| r * r).sum();
        Self::from_sse(sse, residuals.len(), n_params)
    }

    fn from_sse(sse: f64, n_eff: usize, n_params: usize) -> Self {
        let n = n_eff as f64;
        let k = n_params as f64;
        let sigma2_ml = (sse / n).max(f64::MIN_POSITIVE);
        let log_likelihood = -0.5 * n * ((2.0 * PI * sigma2_ml).ln() + 1.0);
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let aicc = if n - k - 1.0 > 0.0 {
            aic + 2.0 * k * (k + 1.0) / (n - k - 1.0)
        } else {
            f64::INFINITY
        };
        let bic = -2.0 * log_likelihood + k * n.ln();
        Self { aic, aicc, bic }
    }

    pub fn get(&self, criterion: InformationCriterion) -> f64 {
        match criterion {
            InformationCriterion::Aic => self.aic,
            InformationCriterion::Aicc => self.aicc,
            InformationCriterion::Bic => self.bic,
        }
    }
}

/// Bounds and settings of the automatic order search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaSearch {
    pub max_p: usize,
    pub max_q: usize,
    pub max_seasonal_p: usize,
    pub max_seasonal_q: usize,
    pub max_d: usize,
    pub max_seasonal_d: usize,
    pub period: usize,
    pub criterion: InformationCriterion,
    /// Confidence level of the forecast intervals
    pub confidence_level: f64,
}

impl Default for ArimaSearch {
    fn default() -> Self {
        Self {
            max_p: 2,
            max_q: 2,
            max_seasonal_p: 1,
            max_seasonal_q: 1,
            max_d: 1,
            max_seasonal_d: 1,
            period: WEEKLY_PERIOD,
            criterion: InformationCriterion::default(),
            confidence_level: 0.95,
        }
    }
}

impl ArimaSearch {
    pub fn validate(&self) -> Result<()> {
        if self.period < 2 || self.period <= self.max_p.max(self.max_q) {
            return Err(SalesError::InvalidParameter(format!(
                "seasonal period {} must exceed 1 and the non-seasonal orders",
                self.period
            )));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(SalesError::InvalidParameter(format!(
                "confidence level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }

    /// Differencing orders by the variance-reduction rule
    ///
    /// Seasonal differences are taken first, then regular ones; each is kept
    /// only while it lowers the sample variance and leaves at least
    /// [`MIN_OBSERVATIONS`] values.
    pub fn differencing(&self, series: &[f64]) -> (usize, usize) {
        let mut current = series.to_vec();
        let mut seasonal_d = 0;
        for _ in 0..self.max_seasonal_d {
            let candidate = difference(&current, self.period);
            if !reduces_variance(&current, &candidate) {
                break;
            }
            current = candidate;
            seasonal_d += 1;
        }

        let mut d = 0;
        for _ in 0..self.max_d {
            let candidate = difference(&current, 1);
            if !reduces_variance(&current, &candidate) {
                break;
            }
            current = candidate;
            d += 1;
        }
        (d, seasonal_d)
    }

    /// All `(p,q,P,Q)` combinations within the bounds, for fixed differencing
    fn candidates(&self, d: usize, seasonal_d: usize) -> Vec<ArimaOrder> {
        let mut orders = Vec::new();
        for p in 0..=self.max_p {
            for q in 0..=self.max_q {
                for seasonal_p in 0..=self.max_seasonal_p {
                    for seasonal_q in 0..=self.max_seasonal_q {
                        orders.push(
                            ArimaOrder::new(p, d, q)
                                .with_seasonal(seasonal_p, seasonal_d, seasonal_q)
                                .with_period(self.period),
                        );
                    }
                }
            }
        }
        orders
    }
}

fn reduces_variance(before: &[f64], after: &[f64]) -> bool {
    if after.len() < MIN_OBSERVATIONS {
        return false;
    }
    match (sample_variance(before), sample_variance(after)) {
        (Some(b), Some(a)) => a < b,
        _ => false,
    }
}

/// Seasonal ARIMA with automatic order selection
#[derive(Debug, Clone)]
pub struct AutoArima {
    name: String,
    search: ArimaSearch,
}

impl Default for AutoArima {
    fn default() -> Self {
        Self::new(ArimaSearch::default())
    }
}

impl AutoArima {
    pub fn new(search: ArimaSearch) -> Self {
        Self {
            name: "Seasonal ARIMA".to_string(),
            search,
        }
    }
}

impl ForecastModel for AutoArima {
    type Trained = TrainedArima;

    fn train(&self, series: &[f64]) -> Result<TrainedArima> {
        self.search.validate()?;
        check_series(series)?;

        let (d, seasonal_d) = self.search.differencing(series);
        debug!(d, seasonal_d, observations = series.len(), "chose differencing orders");

        let fits: Vec<TrainedArima> = self
            .search
            .candidates(d, seasonal_d)
            .into_iter()
            .filter_map(
                |order| match estimate(&self.name, series, order, self.search.confidence_level) {
                    Ok(model) => Some(model),
                    Err(e) => {
                        debug!(%order, error = %e, "skipping candidate");
                        None
                    }
                },
            )
            .collect();

        // Criteria are only comparable over one residual sample: score every
        // candidate after the longest AR burn-in among them.
        let scored_from = fits.iter().map(|m| m.order.max_ar_lag()).max().unwrap_or(0);
        let criterion = self.search.criterion;

        let mut model = fits
            .into_iter()
            .map(|mut model| {
                model.rescore_from(scored_from);
                debug!(
                    order = %model.order,
                    score = model.criteria.get(criterion),
                    "scored candidate"
                );
                model
            })
            .reduce(|best, candidate| {
                if candidate.criteria.get(criterion) < best.criteria.get(criterion) {
                    candidate
                } else {
                    best
                }
            })
            .ok_or_else(|| {
                SalesError::insufficient("seasonal ARIMA order search", MIN_OBSERVATIONS, series.len())
            })?;
        model.criterion = criterion;

        info!(
            order = %model.order,
            criterion = ?model.criterion,
            score = model.criterion_value(),
            sigma2 = model.sigma2,
            "selected ARIMA order"
        );
        Ok(model)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// ARIMA with a fixed order
#[derive(Debug, Clone)]
pub struct ArimaModel {
    name: String,
    order: ArimaOrder,
    confidence_level: f64,
}

impl ArimaModel {
    pub fn new(order: ArimaOrder) -> Self {
        Self {
            name: order.to_string(),
            order,
            confidence_level: 0.95,
        }
    }

    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArima;

    fn train(&self, series: &[f64]) -> Result<TrainedArima> {
        check_series(series)?;
        estimate(&self.name, series, self.order, self.confidence_level)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn check_series(series: &[f64]) -> Result<()> {
    if series.len() < MIN_OBSERVATIONS {
        return Err(SalesError::insufficient(
            "ARIMA training series",
            MIN_OBSERVATIONS,
            series.len(),
        ));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(SalesError::InvalidParameter(
            "ARIMA training series must be finite".to_string(),
        ));
    }
    Ok(())
}

/// Fitted ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArima {
    name: String,
    order: ArimaOrder,
    constant: f64,
    ar: Vec<(usize, f64)>,
    ma: Vec<(usize, f64)>,
    sigma2: f64,
    n_params: usize,
    criteria: InformationCriteria,
    criterion: InformationCriterion,
    confidence_level: f64,
    history: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

/// Innovations of a long autoregression, zero over its burn-in
fn long_ar_innovations(w: &[f64], m: usize) -> Result<Vec<f64>> {
    if w.len() < 2 * m + MIN_RESIDUAL_DOF + 1 {
        return Err(SalesError::insufficient(
            "long autoregression",
            2 * m + MIN_RESIDUAL_DOF + 1,
            w.len(),
        ));
    }
    let x: Vec<Vec<f64>> = (m..w.len())
        .map(|t| (1..=m).map(|l| w[t - l]).collect())
        .collect();
    let fit = least_squares(&x, &w[m..], true)?;
    let mut innovations = vec![0.0; m];
    innovations.extend(fit.residuals);
    Ok(innovations)
}

fn estimate(name: &str, series: &[f64], order: ArimaOrder, confidence_level: f64) -> Result<TrainedArima> {
    let w = difference_orders(series, order.d, order.seasonal_d, order.period);
    let ar_lags = order.ar_lags();
    let ma_lags = order.ma_lags();
    let max_ar = order.max_ar_lag();
    let max_ma = ma_lags.iter().copied().max().unwrap_or(0);
    let include_constant = order.allows_constant();
    let n_coefficients = ar_lags.len() + ma_lags.len() + usize::from(include_constant);

    let (innovations, start) = if ma_lags.is_empty() {
        (Vec::new(), max_ar)
    } else {
        let m = ((w.len() as f64).ln().round() as usize).max(order.p.max(order.q) + 1);
        (long_ar_innovations(&w, m)?, max_ar.max(m + max_ma))
    };

    let required = start + n_coefficients + MIN_RESIDUAL_DOF;
    if w.len() < required {
        return Err(SalesError::insufficient(&order.to_string(), required, w.len()));
    }

    let (constant, ar, ma) = if n_coefficients == 0 {
        (0.0, Vec::new(), Vec::new())
    } else {
        let x: Vec<Vec<f64>> = (start..w.len())
            .map(|t| {
                ar_lags
                    .iter()
                    .map(|&l| w[t - l])
                    .chain(ma_lags.iter().map(|&l| innovations[t - l]))
                    .collect()
            })
            .collect();
        let fit = least_squares(&x, &w[start..], include_constant)?;
        let (ar_coef, ma_coef) = fit.coefficients.split_at(ar_lags.len());
        (
            fit.intercept,
            ar_lags.iter().copied().zip(ar_coef.iter().copied()).collect::<Vec<_>>(),
            ma_lags.iter().copied().zip(ma_coef.iter().copied()).collect::<Vec<_>>(),
        )
    };

    if !is_causal(&lag_polynomial(&ar, -1.0)) {
        return Err(SalesError::InvalidParameter(format!(
            "{} has a non-stationary AR polynomial",
            order
        )));
    }

    // Conditional residuals of the differenced series
    let mut e = vec![0.0; w.len()];
    for t in max_ar..w.len() {
        let ar_part: f64 = ar.iter().map(|&(l, phi)| phi * w[t - l]).sum();
        let ma_part: f64 = ma
            .iter()
            .filter(|&&(l, _)| l <= t)
            .map(|&(l, theta)| theta * e[t - l])
            .sum();
        e[t] = w[t] - constant - ar_part - ma_part;
    }

    let n_eff = w.len() - max_ar;
    let n_params = n_coefficients + 1;
    let sse: f64 = e[max_ar..].iter().map(|r| r * r).sum();
    if !sse.is_finite() {
        return Err(SalesError::InvalidParameter(format!(
            "{} produced non-finite residuals",
            order
        )));
    }
    let sigma2 = sse / (n_eff - n_coefficients) as f64;
    let criteria = InformationCriteria::from_sse(sse, n_eff, n_params);

    let offset = order.integration();
    let mut residuals = vec![0.0; offset];
    residuals.extend_from_slice(&e);
    let fitted = series
        .iter()
        .zip(&residuals)
        .map(|(actual, residual)| actual - residual)
        .collect();

    Ok(TrainedArima {
        name: name.to_string(),
        order,
        constant,
        ar,
        ma,
        sigma2,
        n_params,
        criteria,
        criterion: InformationCriterion::default(),
        confidence_level,
        history: series.to_vec(),
        fitted,
        residuals,
    })
}

impl TrainedArima {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Mean of the differenced series (drift when differenced once)
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// `(lag, φ)` pairs, non-seasonal lags first
    pub fn ar_coefficients(&self) -> &[(usize, f64)] {
        &self.ar
    }

    /// `(lag, θ)` pairs, non-seasonal lags first
    pub fn ma_coefficients(&self) -> &[(usize, f64)] {
        &self.ma
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn criteria(&self) -> InformationCriteria {
        self.criteria
    }

    pub fn criterion(&self) -> InformationCriterion {
        self.criterion
    }

    /// Value of the criterion the model was selected by
    pub fn criterion_value(&self) -> f64 {
        self.criteria.get(self.criterion)
    }

    /// Recompute the criteria over the differenced-series residuals from
    /// position `from` on
    fn rescore_from(&mut self, from: usize) {
        let start = (self.order.integration() + from).min(self.residuals.len());
        self.criteria = InformationCriteria::from_residuals(&self.residuals[start..], self.n_params);
    }

    /// Full AR polynomial in `y`, differencing included
    fn integrated_ar(&self) -> Vec<f64> {
        poly_mul(
            &lag_polynomial(&self.ar, -1.0),
            &differencing_polynomial(self.order.d, self.order.seasonal_d, self.order.period),
        )
    }
}

impl TrainedForecastModel for TrainedArima {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(SalesError::InvalidParameter(
                "forecast horizon must be positive".to_string(),
            ));
        }

        let a = self.integrated_ar();
        let theta = lag_polynomial(&self.ma, 1.0);

        let mut y = self.history.clone();
        let mut e = self.residuals.clone();
        for _ in 0..horizon {
            let t = y.len();
            let ar_part: f64 = (1..a.len()).map(|j| a[j] * y[t - j]).sum();
            let ma_part: f64 = self.ma.iter().map(|&(l, th)| th * e[t - l]).sum();
            y.push(self.constant - ar_part + ma_part);
            e.push(0.0);
        }
        let values = y.split_off(self.history.len());

        let psi = psi_weights(&a, &theta, horizon);
        let variances = cumulative_variance(&psi, self.sigma2);
        let z = normal_critical_value(self.confidence_level)?;
        let intervals = values
            .iter()
            .zip(&variances)
            .map(|(v, var)| {
                let half = z * var.sqrt();
                (v - half, v + half)
            })
            .collect();

        ForecastResult::new(values, horizon, variances, intervals, self.confidence_level)
    }

    fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::synthetic_sales;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    #[test]
    fn two_years_forecast_one_year() {
        let series = synthetic_sales(104, 11);
        let model = AutoArima::default().train(&series).unwrap();
        let forecast = model.forecast(52).unwrap();

        assert_eq!(forecast.values().len(), 52);
        assert_eq!(forecast.horizons(), 52);
        assert!(forecast.variances().iter().all(|v| *v >= 0.0));
        assert!(forecast.variances().windows(2).all(|w| w[1] >= w[0]));

        let widths: Vec<f64> = forecast.intervals().iter().map(|(lo, hi)| hi - lo).collect();
        assert!(widths.windows(2).all(|w| w[1] >= w[0] - 1e-9));
        for (value, (lo, hi)) in forecast.values().iter().zip(forecast.intervals()) {
            assert!(lo <= value && value <= hi);
        }
    }

    #[test]
    fn strong_yearly_pattern_is_seasonally_differenced() {
        let series = synthetic_sales(104, 11);
        let (_, seasonal_d) = ArimaSearch::default().differencing(&series);
        assert_eq!(seasonal_d, 1);
    }

    #[test]
    fn burn_in_keeps_actuals() {
        let series = synthetic_sales(104, 3);
        let model = AutoArima::default().train(&series).unwrap();
        let order = model.order();
        let burn_in = order.integration() + order.max_ar_lag();

        assert_eq!(model.fitted_values().len(), series.len());
        for i in 0..burn_in {
            assert_eq!(model.fitted_values()[i], series[i]);
            assert_eq!(model.residuals()[i], 0.0);
        }
        for ((f, r), y) in model.fitted_values().iter().zip(model.residuals()).zip(&series) {
            assert_abs_diff_eq!(f + r, *y, epsilon = 1e-6);
        }
    }

    #[test]
    fn recovers_ar1_coefficient() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut series = vec![0.0];
        for _ in 1..400 {
            let noise: f64 = rng.sample(StandardNormal);
            let last = series[series.len() - 1];
            series.push(0.6 * last + noise);
        }

        let model = ArimaModel::new(ArimaOrder::new(1, 0, 0)).train(&series).unwrap();
        assert_eq!(model.ar_coefficients()[0].0, 1);
        assert_abs_diff_eq!(model.ar_coefficients()[0].1, 0.6, epsilon = 0.1);
        assert_abs_diff_eq!(model.sigma2(), 1.0, epsilon = 0.2);
    }

    fn white_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| 1000.0 + 10.0 * rng.sample::<f64, _>(StandardNormal))
            .collect()
    }

    fn undifferenced() -> ArimaSearch {
        ArimaSearch {
            max_d: 0,
            max_seasonal_d: 0,
            ..ArimaSearch::default()
        }
    }

    #[test]
    fn white_noise_selects_the_empty_model() {
        let series = white_noise(120, 7);
        let model = AutoArima::new(undifferenced()).train(&series).unwrap();
        assert_eq!(model.order(), ArimaOrder::new(0, 0, 0));
        assert!(model.ar_coefficients().is_empty());
        assert!(model.ma_coefficients().is_empty());
        assert_abs_diff_eq!(model.constant(), 1000.0, epsilon = 5.0);
    }

    #[test]
    fn candidates_are_scored_on_a_common_sample() {
        let series = white_noise(120, 7);
        let selected = AutoArima::new(undifferenced()).train(&series).unwrap();

        // seasonal AR candidates fit on 120 weeks, so scoring starts at lag 52
        let mut refit = ArimaModel::new(selected.order()).train(&series).unwrap();
        refit.rescore_from(WEEKLY_PERIOD);
        assert_eq!(selected.criteria(), refit.criteria());

        let mut short = ArimaModel::new(ArimaOrder::new(1, 0, 0)).train(&series).unwrap();
        let own_sample = short.criteria();
        short.rescore_from(WEEKLY_PERIOD);
        assert!(short.criteria().aic < own_sample.aic);
    }

    #[test]
    fn drift_model_extends_a_line() {
        let series: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let model = ArimaModel::new(ArimaOrder::new(0, 1, 0)).train(&series).unwrap();
        assert_abs_diff_eq!(model.constant(), 1.0, epsilon = 1e-9);

        let forecast = model.forecast(3).unwrap();
        assert_abs_diff_eq!(forecast.values()[0], 31.0, epsilon = 1e-9);
        assert_abs_diff_eq!(forecast.values()[2], 33.0, epsilon = 1e-9);
    }

    #[test]
    fn short_series_is_rejected() {
        let err = AutoArima::default().train(&[1.0; 10]).unwrap_err();
        assert!(matches!(err, SalesError::InsufficientData { available: 10, .. }));
        assert!(AutoArima::default().train(&synthetic_sales(104, 1)).unwrap().forecast(0).is_err());
    }

    #[test]
    fn order_formatting() {
        let order = ArimaOrder::new(1, 0, 2).with_seasonal(1, 1, 0);
        assert_eq!(order.to_string(), "ARIMA(1,0,2)(1,1,0)[52]");
        assert_eq!(order.ar_lags(), vec![1, 52]);
        assert_eq!(order.ma_lags(), vec![1, 2]);
    }

    #[test]
    fn search_settings_are_validated() {
        let mut search = ArimaSearch::default();
        assert!(search.validate().is_ok());
        search.period = 2;
        assert!(search.validate().is_err());
        search = ArimaSearch {
            confidence_level: 1.5,
            ..ArimaSearch::default()
        };
        assert!(search.validate().is_err());
    }
}
