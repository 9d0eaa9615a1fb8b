//! Utility functions for the sales_forecast crate

use crate::data::SalesRecord;
use crate::error::{Result, SalesError};
use crate::features::{EnrichedRecord, FeatureBuilder};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::f64::consts::PI;

/// Seeded random partition into (train, test), each keeping the input order.
pub fn train_test_split<T: Clone>(rows: &[T], test_ratio: f64, seed: u64) -> Result<(Vec<T>, Vec<T>)> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(SalesError::InvalidParameter(format!(
            "test ratio must be in (0, 1), got {}",
            test_ratio
        )));
    }

    let test_size = (rows.len() as f64 * test_ratio).round() as usize;
    if test_size == 0 || test_size >= rows.len() {
        return Err(SalesError::insufficient("train/test split", 2, rows.len()));
    }

    let mut indices: Vec<usize> = (0..rows.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut test_indices = indices[..test_size].to_vec();
    let mut train_indices = indices[test_size..].to_vec();
    test_indices.sort_unstable();
    train_indices.sort_unstable();

    let pick = |idx: &[usize]| idx.iter().map(|&i| rows[i].clone()).collect::<Vec<T>>();
    Ok((pick(&train_indices), pick(&test_indices)))
}

/// Split a chronological series into (history, last `holdout` values)
pub fn chronological_split(series: &[f64], holdout: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    if holdout == 0 || holdout >= series.len() {
        return Err(SalesError::insufficient(
            "chronological holdout",
            holdout + 1,
            series.len(),
        ));
    }
    let cut = series.len() - holdout;
    Ok((series[..cut].to_vec(), series[cut..].to_vec()))
}

/// Held-out index sets of a seeded k-fold partition of `0..n`
pub fn kfold_indices(n: usize, folds: usize, seed: u64) -> Result<Vec<Vec<usize>>> {
    if folds < 2 {
        return Err(SalesError::InvalidParameter(format!(
            "cross-validation needs at least 2 folds, got {}",
            folds
        )));
    }
    if n < folds {
        return Err(SalesError::insufficient("cross-validation", folds, n));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut assignment = vec![Vec::with_capacity(n / folds + 1); folds];
    for (position, index) in indices.into_iter().enumerate() {
        assignment[position % folds].push(index);
    }
    for fold in &mut assignment {
        fold.sort_unstable();
    }
    Ok(assignment)
}

/// Weekly sales-like series: yearly seasonality, slow growth and Gaussian noise
///
/// Deterministic for a seed; used by tests and demos.
#[doc(hidden)]
pub fn synthetic_sales(weeks: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..weeks)
        .map(|i| {
            let t = i as f64;
            let noise: f64 = rng.sample(StandardNormal);
            let seasonal = 0.15 * (2.0 * PI * t / 52.0).sin();
            let holiday = if i % 52 == 46 { 0.25 } else { 0.0 };
            1_000_000.0 * (1.0 + seasonal + holiday + 0.002 * t) + 20_000.0 * noise
        })
        .collect()
}

/// Synthetic weekly records for the given stores, starting on 5 February 2010
#[doc(hidden)]
pub fn synthetic_records(stores: &[u32], weeks: usize, seed: u64) -> Result<Vec<SalesRecord>> {
    let start = NaiveDate::from_ymd_opt(2010, 2, 5)
        .ok_or_else(|| SalesError::InvalidParameter("invalid synthetic start date".to_string()))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(stores.len() * weeks);

    for &store in stores {
        let scale = 1.0 + store as f64 / 10.0;
        let sales = synthetic_sales(weeks, seed.wrapping_add(store as u64));
        for (i, weekly) in sales.into_iter().enumerate() {
            let t = i as f64;
            let mut noise = || rng.sample::<f64, _>(StandardNormal);
            records.push(SalesRecord {
                store,
                date: start + Duration::weeks(i as i64),
                weekly_sales: weekly * scale,
                holiday_flag: matches!(i % 52, 1 | 31 | 42 | 47),
                temperature: 60.0 + 20.0 * (2.0 * PI * (t - 10.0) / 52.0).sin() + 3.0 * noise(),
                fuel_price: 2.6 + 0.008 * t + 0.05 * noise(),
                cpi: 211.0 + 0.05 * t + 0.3 * noise(),
                unemployment: 8.0 + 0.5 * (0.7 * t + store as f64).sin() + 0.05 * noise(),
            });
        }
    }

    Ok(records)
}

/// Enriched rows of one synthetic store
#[doc(hidden)]
pub fn synthetic_rows(weeks: usize) -> Result<Vec<EnrichedRecord>> {
    let table = FeatureBuilder::new().build(&synthetic_records(&[1], weeks, 7)?)?;
    Ok(table.rows().to_vec())
}
