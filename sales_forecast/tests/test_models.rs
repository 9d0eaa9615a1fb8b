use approx::assert_abs_diff_eq;
use sales_forecast::error::SalesError;
use sales_forecast::features::EnrichedRecord;
use sales_forecast::models::arima::{ArimaModel, ArimaOrder, ArimaSearch, AutoArima, InformationCriterion};
use sales_forecast::models::boosting::{BoostingParams, GradientBoostingModel};
use sales_forecast::models::linear::LinearModel;
use sales_forecast::models::tree::{TreeConfig, TreeModel};
use sales_forecast::models::{
    Feature, FittedRegressor, ForecastModel, Regressor, TrainedForecastModel, BASE_FEATURES,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rstest::rstest;
use sales_forecast::utils::{synthetic_rows, synthetic_sales};

fn complete(rows: &[EnrichedRecord]) -> Vec<EnrichedRecord> {
    rows.iter().filter(|r| r.is_complete()).cloned().collect()
}

#[test]
fn test_linear_model_predicts_every_row() {
    let rows = synthetic_rows(60).unwrap();
    let fitted = LinearModel::new().fit(&rows).unwrap();

    assert_eq!(fitted.features(), &BASE_FEATURES);
    assert_eq!(fitted.coefficients().len(), 4);
    assert_eq!(fitted.predict(&rows).unwrap().len(), 60);
    assert_eq!(fitted.name(), "Linear Regression");
}

#[test]
fn test_prediction_error_on_missing_feature() {
    let rows = synthetic_rows(30).unwrap();
    let model = LinearModel::with_features(&[Feature::Cpi, Feature::Lag1]);
    let fitted = model.fit(&complete(&rows)).unwrap();

    let err = fitted.predict(&rows[..2]).unwrap_err();
    match err {
        SalesError::Prediction { model, key, feature } => {
            assert_eq!(model, "Linear Regression");
            assert_eq!(feature, "lag_1");
            assert_eq!(key, rows[0].key().to_string());
        }
        other => panic!("expected prediction error, got {other:?}"),
    }
}

#[test]
fn test_linear_fit_rejects_incomplete_rows() {
    let rows = synthetic_rows(30).unwrap();
    let model = LinearModel::with_features(&[Feature::RollingMean4]);
    assert!(matches!(
        model.fit(&rows),
        Err(SalesError::Prediction { feature: "rolling_mean_4", .. })
    ));
}

#[test]
fn test_tree_model_is_deterministic() {
    let rows = synthetic_rows(80).unwrap();
    let model = TreeModel::new(TreeConfig {
        min_samples_split: 10,
        min_samples_leaf: 3,
        ..TreeConfig::default()
    });
    let first = model.fit(&rows).unwrap();
    let second = model.fit(&rows).unwrap();

    assert_eq!(first.root(), second.root());
    assert_eq!(first.predict(&rows).unwrap(), second.predict(&rows).unwrap());
    assert!(first.root().n_leaves() >= 1);
    assert!(first.root().depth() <= 30);
}

#[test]
fn test_tree_leaf_predictions_are_training_means() {
    let rows = synthetic_rows(15).unwrap();
    let fitted = TreeModel::default().fit(&rows).unwrap();

    // fewer rows than min_samples_split: a single leaf
    assert!(fitted.root().is_leaf());
    let mean = rows.iter().map(|r| r.record.weekly_sales).sum::<f64>() / 15.0;
    for prediction in fitted.predict(&rows).unwrap() {
        assert_abs_diff_eq!(prediction, mean, epsilon = 1e-6);
    }
}

#[test]
fn test_boosting_same_seed_same_model() {
    let rows = synthetic_rows(90).unwrap();
    let params = BoostingParams {
        max_rounds: 25,
        max_depth: 3,
        seed: 3,
        ..BoostingParams::default()
    };
    let first = GradientBoostingModel::new(params.clone()).fit(&rows).unwrap();
    let second = GradientBoostingModel::new(params).fit(&rows).unwrap();
    let test = complete(&rows);

    assert_eq!(first.rounds(), second.rounds());
    assert_eq!(first.predict(&test).unwrap(), second.predict(&test).unwrap());
}

#[test]
fn test_arima_two_years_forecast_one_year() {
    let series = synthetic_sales(104, 21);
    let model = AutoArima::default().train(&series).unwrap();
    let forecast = model.forecast(52).unwrap();

    assert_eq!(forecast.values().len(), 52);
    assert_eq!(forecast.variances().len(), 52);
    assert!(forecast.variances().iter().all(|v| *v >= 0.0));
    assert!(forecast.variances().windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(forecast.confidence_level(), 0.95);
    assert_eq!(model.fitted_values().len(), 104);
    assert_eq!(model.residuals().len(), 104);
}

#[test]
fn test_arima_criterion_and_level_are_configurable() {
    let series = synthetic_sales(120, 4);
    let search = ArimaSearch {
        criterion: InformationCriterion::Bic,
        confidence_level: 0.8,
        ..ArimaSearch::default()
    };
    let model = AutoArima::new(search).train(&series).unwrap();
    assert_eq!(model.criterion(), InformationCriterion::Bic);
    assert_eq!(model.criterion_value(), model.criteria().bic);

    let narrow = model.forecast(4).unwrap();
    let wide = ArimaModel::new(model.order())
        .with_confidence_level(0.99)
        .train(&series)
        .unwrap()
        .forecast(4)
        .unwrap();
    let width = |(lo, hi): (f64, f64)| hi - lo;
    assert!(width(wide.intervals()[0]) > width(narrow.intervals()[0]));
}

#[test]
fn test_arima_fixed_seasonal_order() {
    let series = synthetic_sales(156, 8);
    let order = ArimaOrder::new(1, 0, 0).with_seasonal(0, 1, 0);
    let model = ArimaModel::new(order).train(&series).unwrap();

    assert_eq!(model.order(), order);
    assert_eq!(model.ar_coefficients().len(), 1);
    let forecast = model.forecast(10).unwrap();
    for (value, (lo, hi)) in forecast.values().iter().zip(forecast.intervals()) {
        assert!(value.is_finite());
        assert!(lo < value && value < hi);
    }
}

fn undifferenced(criterion: InformationCriterion) -> ArimaSearch {
    ArimaSearch {
        max_d: 0,
        max_seasonal_d: 0,
        criterion,
        ..ArimaSearch::default()
    }
}

#[rstest]
#[case(InformationCriterion::Aicc)]
#[case(InformationCriterion::Bic)]
fn test_arima_search_recovers_ar1(#[case] criterion: InformationCriterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut series = vec![0.0];
    for _ in 1..200 {
        let noise: f64 = rng.sample(StandardNormal);
        let last = series[series.len() - 1];
        series.push(0.6 * last + noise);
    }

    let model = AutoArima::new(undifferenced(criterion)).train(&series).unwrap();

    assert_eq!(model.order(), ArimaOrder::new(1, 0, 0));
    assert_abs_diff_eq!(model.ar_coefficients()[0].1, 0.6, epsilon = 0.1);
}

#[rstest]
#[case(InformationCriterion::Aicc)]
#[case(InformationCriterion::Bic)]
fn test_arima_search_keeps_white_noise_empty(#[case] criterion: InformationCriterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let series: Vec<f64> = (0..120)
        .map(|_| 1000.0 + 10.0 * rng.sample::<f64, _>(StandardNormal))
        .collect();

    let model = AutoArima::new(undifferenced(criterion)).train(&series).unwrap();

    assert_eq!(model.order(), ArimaOrder::new(0, 0, 0));
    assert_eq!(model.criterion(), criterion);
}
