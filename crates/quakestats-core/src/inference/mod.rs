// =============================================================================
// Inference: standard errors, Wald tests, confidence intervals
// =============================================================================
//
// Everything here is Wald-style large-sample inference. A fitted GLM gives
// us beta_hat and Var(beta_hat) = phi * (X'WX)^-1; from those:
//
//     se_j   = sqrt(Var(beta_hat)_jj)
//     z_j    = beta_hat_j / se_j          ~ N(0, 1) under H0: beta_j = 0
//     p_j    = 2 * P(Z > |z_j|)
//     CI_j   = beta_hat_j +/- z_crit * se_j
//
// The dispersion phi is fixed at 1 for the Binomial and Poisson families,
// so the unscaled covariance from the solver is already the right one.
//
// =============================================================================

use ndarray::{Array1, Array2};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{Result, StatsError};

/// Standard errors from a scaled covariance matrix: sqrt of the diagonal
/// of `dispersion * covariance_unscaled`.
pub fn standard_errors(covariance_unscaled: &Array2<f64>, dispersion: f64) -> Result<Array1<f64>> {
    if covariance_unscaled.nrows() != covariance_unscaled.ncols() {
        return Err(StatsError::DimensionMismatch(format!(
            "covariance matrix is {}x{}, expected square",
            covariance_unscaled.nrows(),
            covariance_unscaled.ncols()
        )));
    }
    if dispersion <= 0.0 {
        return Err(StatsError::InvalidValue(format!(
            "dispersion must be positive, got {}",
            dispersion
        )));
    }
    Ok(covariance_unscaled
        .diag()
        .mapv(|v| (dispersion * v).max(0.0).sqrt()))
}

/// Two-tailed p-value for a standard-normal test statistic.
pub fn pvalue_z(z: f64) -> f64 {
    if !z.is_finite() {
        return f64::NAN;
    }
    // Unwrap is fine: N(0, 1) parameters are always valid.
    let standard_normal = Normal::new(0.0, 1.0).unwrap();
    2.0 * (1.0 - standard_normal.cdf(z.abs()))
}

/// Normal-approximation confidence interval at the given level
/// (e.g. 0.95 for 95%).
pub fn confidence_interval_z(estimate: f64, se: f64, level: f64) -> Result<(f64, f64)> {
    if !(0.0..1.0).contains(&level) || level <= 0.0 {
        return Err(StatsError::InvalidValue(format!(
            "confidence level must be in (0, 1), got {}",
            level
        )));
    }
    let standard_normal = Normal::new(0.0, 1.0).unwrap();
    let z_crit = standard_normal.inverse_cdf(1.0 - (1.0 - level) / 2.0);
    Ok((estimate - z_crit * se, estimate + z_crit * se))
}

/// R-style significance codes for a p-value.
///
/// `***` below 0.001, `**` below 0.01, `*` below 0.05, `.` below 0.1,
/// blank otherwise.
pub fn significance_stars(pvalue: f64) -> &'static str {
    if !pvalue.is_finite() {
        ""
    } else if pvalue < 0.001 {
        "***"
    } else if pvalue < 0.01 {
        "**"
    } else if pvalue < 0.05 {
        "*"
    } else if pvalue < 0.1 {
        "."
    } else {
        ""
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn standard_errors_are_sqrt_of_scaled_diagonal() {
        let cov = array![[4.0, 0.5], [0.5, 9.0]];
        let se = standard_errors(&cov, 1.0).unwrap();
        assert_abs_diff_eq!(se[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(se[1], 3.0, epsilon = 1e-12);

        let se_scaled = standard_errors(&cov, 2.0).unwrap();
        assert_abs_diff_eq!(se_scaled[0], 8.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn standard_errors_reject_bad_inputs() {
        let cov = array![[4.0, 0.5], [0.5, 9.0]];
        assert!(standard_errors(&cov, 0.0).is_err());
        assert!(standard_errors(&cov, -1.0).is_err());

        let rect = Array2::<f64>::zeros((2, 3));
        assert!(standard_errors(&rect, 1.0).is_err());
    }

    #[test]
    fn pvalue_z_known_values() {
        // z = 1.96 is the classic two-tailed 5% boundary.
        assert_abs_diff_eq!(pvalue_z(1.96), 0.05, epsilon = 1e-3);
        assert_abs_diff_eq!(pvalue_z(-1.96), 0.05, epsilon = 1e-3);
        assert_abs_diff_eq!(pvalue_z(0.0), 1.0, epsilon = 1e-12);
        assert!(pvalue_z(10.0) < 1e-15);
        assert!(pvalue_z(f64::NAN).is_nan());
    }

    #[test]
    fn confidence_interval_covers_the_estimate() {
        let (lo, hi) = confidence_interval_z(1.5, 0.5, 0.95).unwrap();
        assert_abs_diff_eq!(lo, 1.5 - 1.959964 * 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(hi, 1.5 + 1.959964 * 0.5, epsilon = 1e-4);
        assert!(lo < 1.5 && 1.5 < hi);

        assert!(confidence_interval_z(1.5, 0.5, 0.0).is_err());
        assert!(confidence_interval_z(1.5, 0.5, 1.0).is_err());
    }

    #[test]
    fn significance_stars_follow_r_conventions() {
        assert_eq!(significance_stars(0.0001), "***");
        assert_eq!(significance_stars(0.005), "**");
        assert_eq!(significance_stars(0.03), "*");
        assert_eq!(significance_stars(0.07), ".");
        assert_eq!(significance_stars(0.5), "");
        assert_eq!(significance_stars(f64::NAN), "");
    }
}
