//! # Sales Owl
//!
//! Workspace facade for weekly retail sales modelling. The work happens in
//! two member crates:
//!
//! - [`sales_math`]: moving averages, least squares, differencing and
//!   lag-polynomial helpers
//! - [`sales_forecast`]: loading, feature engineering, the four model
//!   adapters, metrics and the comparison pipeline
//!
//! ## Example
//!
//! ```
//! use sales_owl_workspace::forecast::metrics::{evaluate, MapePolicy};
//!
//! let metrics = evaluate(&[100.0, 200.0], &[110.0, 190.0], MapePolicy::Fail).unwrap();
//! assert_eq!(metrics.mae, 10.0);
//! ```

pub use sales_forecast as forecast;
pub use sales_math as math;

/// Versions of the member crates
pub fn versions() -> [(&'static str, &'static str); 2] {
    [
        (sales_forecast::NAME, sales_forecast::VERSION),
        ("sales_math", math::VERSION),
    ]
}
