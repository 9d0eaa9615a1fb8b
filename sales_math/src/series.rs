//! Differencing and lag-polynomial helpers for ARIMA-type models
//!
//! Polynomials in the backshift operator `B` are stored densely: index `j`
//! holds the coefficient of `B^j`, and index 0 is always 1 for the
//! AR and MA polynomials used here.

/// `w_t = y_t - y_{t-lag}`; empty when the series is not longer than `lag`.
pub fn difference(data: &[f64], lag: usize) -> Vec<f64> {
    if lag == 0 {
        return data.to_vec();
    }
    if data.len() <= lag {
        return Vec::new();
    }
    data[lag..]
        .iter()
        .zip(data)
        .map(|(current, earlier)| current - earlier)
        .collect()
}

/// Apply `d` regular differences, then `seasonal_d` differences at `period`.
pub fn difference_orders(data: &[f64], d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..d {
        result = difference(&result, 1);
    }
    for _ in 0..seasonal_d {
        result = difference(&result, period);
    }
    result
}

/// Product of two dense polynomials
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }
    product
}

/// Dense polynomial `1 + sign * Σ c_l B^l` from sparse `(lag, coefficient)` terms.
///
/// AR polynomials use `sign = -1.0` (`1 - φ_1 B - ...`), MA polynomials use
/// `sign = 1.0` (`1 + θ_1 B + ...`).
pub fn lag_polynomial(terms: &[(usize, f64)], sign: f64) -> Vec<f64> {
    let degree = terms.iter().map(|(lag, _)| *lag).max().unwrap_or(0);
    let mut poly = vec![0.0; degree + 1];
    poly[0] = 1.0;
    for &(lag, coefficient) in terms {
        if lag > 0 {
            poly[lag] += sign * coefficient;
        }
    }
    poly
}

/// `(1 - B)^d (1 - B^period)^seasonal_d`
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = poly_mul(&poly, &seasonal);
        }
    }
    poly
}

/// Weights of the MA(∞) representation `ψ(B) = θ(B) / φ(B)`, first `n` terms.
///
/// `ar` and `ma` are dense polynomials with a leading 1.
pub fn psi_weights(ar: &[f64], ma: &[f64], n: usize) -> Vec<f64> {
    let mut psi = Vec::with_capacity(n);
    for j in 0..n {
        let theta_j = if j == 0 {
            1.0
        } else {
            ma.get(j).copied().unwrap_or(0.0)
        };
        let feedback: f64 = (1..=j.min(ar.len().saturating_sub(1)))
            .map(|i| ar[i] * psi[j - i])
            .sum();
        psi.push(theta_j - feedback);
    }
    psi
}

/// Cumulative forecast-error variance `σ² Σ_{j<h} ψ_j²` for h = 1..=psi.len()
pub fn cumulative_variance(psi: &[f64], sigma2: f64) -> Vec<f64> {
    psi.iter()
        .scan(0.0, |acc, weight| {
            *acc += weight * weight;
            Some(sigma2 * *acc)
        })
        .collect()
}

/// Whether the AR polynomial `1 + a_1 B + ... + a_p B^p` describes a causal
/// (stationary) process, i.e. all its roots lie outside the unit circle.
///
/// Runs the Levinson–Durbin recursion backwards: the polynomial is causal
/// exactly when every partial autocorrelation it steps down through has
/// modulus below one.
pub fn is_causal(ar: &[f64]) -> bool {
    if ar.iter().any(|c| !c.is_finite()) {
        return false;
    }
    // φ_i of x_t = Σ φ_i x_{t-i}
    let mut phi: Vec<f64> = ar.iter().skip(1).map(|a| -a).collect();
    while let Some(&reflection) = phi.last() {
        let scale = 1.0 - reflection * reflection;
        if reflection.abs() >= 1.0 || scale <= f64::EPSILON {
            return false;
        }
        let order = phi.len();
        phi = (0..order - 1)
            .map(|i| (phi[i] + reflection * phi[order - 2 - i]) / scale)
            .collect();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn differences_regular_and_seasonal() {
        let data = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&data, 1), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(difference_orders(&data, 2, 0, 0), vec![1.0, 1.0, 1.0]);
        assert_eq!(difference(&data, 2), vec![5.0, 7.0, 9.0]);
        assert!(difference(&data, 5).is_empty());
    }

    #[test]
    fn differencing_polynomial_matches_manual_product() {
        // (1 - B)(1 - B^2) = 1 - B - B^2 + B^3
        assert_eq!(
            differencing_polynomial(1, 1, 2),
            vec![1.0, -1.0, -1.0, 1.0]
        );
        assert_eq!(differencing_polynomial(0, 0, 52), vec![1.0]);
    }

    #[test]
    fn lag_polynomial_places_sparse_terms() {
        let poly = lag_polynomial(&[(1, 0.5), (3, 0.25)], -1.0);
        assert_eq!(poly, vec![1.0, -0.5, 0.0, -0.25]);
    }

    #[test]
    fn random_walk_psi_weights_are_all_one() {
        let psi = psi_weights(&differencing_polynomial(1, 0, 0), &[1.0], 5);
        assert_eq!(psi, vec![1.0; 5]);
        let var = cumulative_variance(&psi, 2.0);
        assert_eq!(var, vec![2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn ar1_psi_weights_decay_geometrically() {
        let psi = psi_weights(&[1.0, -0.5], &[1.0], 4);
        assert_relative_eq!(psi[3], 0.125);
    }

    #[test]
    fn causality_rejects_unit_roots() {
        assert!(is_causal(&[1.0, -0.5]));
        assert!(is_causal(&lag_polynomial(&[(52, 0.6)], -1.0)));
        assert!(!is_causal(&[1.0, -1.0]));
        assert!(!is_causal(&[1.0, -1.2]));
        assert!(is_causal(&[1.0]));
        // (1 - 0.5B)(1 - B): unit root hidden in a degree-2 polynomial
        assert!(!is_causal(&[1.0, -1.5, 0.5]));
    }

    #[test]
    fn causality_of_strong_seasonal_terms() {
        for phi in [0.86, 0.9, 0.95, 0.99] {
            assert!(is_causal(&lag_polynomial(&[(52, phi)], -1.0)), "Φ = {phi}");
        }
        assert!(!is_causal(&lag_polynomial(&[(52, 1.0)], -1.0)));
        assert!(!is_causal(&lag_polynomial(&[(52, -1.05)], -1.0)));
        // (1 - 0.8B)(1 - 0.9B^52)
        let product = poly_mul(&[1.0, -0.8], &lag_polynomial(&[(52, 0.9)], -1.0));
        assert!(is_causal(&product));
        // additive terms summing past one put a root inside the unit circle
        assert!(!is_causal(&lag_polynomial(&[(1, 0.8), (52, 0.9)], -1.0)));
        // roots 0.8 and 0.4
        assert!(is_causal(&[1.0, -1.2, 0.32]));
    }
}
