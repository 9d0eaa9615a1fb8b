//! Trailing window calculations over a chronological series
//!
//! - Simple Moving Average (SMA) accumulator
//! - Trailing means and lags that never look past the current position

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) over the last `period` values
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push the next value of the series into the window
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if !self.is_ready() {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    /// Whether a full window has accumulated
    pub fn is_ready(&self) -> bool {
        self.values.len() >= self.period
    }
}

/// Mean of the trailing `window` values, inclusive of the current position.
///
/// Positions with fewer than `window` values so far are `None`.
pub fn trailing_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(window)?;

    Ok(values
        .iter()
        .map(|&value| {
            sma.update(value);
            sma.value().ok()
        })
        .collect())
}

/// Value `k` positions earlier in the series; `None` for the first `k` positions.
pub fn lagged(values: &[f64], k: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| i.checked_sub(k).map(|j| values[j]))
        .collect()
}
