// =============================================================================
// Residuals
// =============================================================================
//
// Raw residuals (y - mu) are hard to read for non-Gaussian models because
// the variance changes with the mean. The two standardizations here fix
// that in different ways:
//
//   Pearson:  r_i = (y_i - mu_i) / sqrt(V(mu_i))
//   Deviance: r_i = sign(y_i - mu_i) * sqrt(d_i)
//
// where d_i is the unit deviance contribution of observation i. For a
// well-specified model both hover around zero with roughly constant
// spread when plotted against the fitted values.
//
// =============================================================================

use ndarray::Array1;

use crate::error::{Result, StatsError};
use crate::families::Family;

fn check_lengths(y: &Array1<f64>, mu: &Array1<f64>) -> Result<()> {
    if y.len() != mu.len() {
        return Err(StatsError::DimensionMismatch(format!(
            "y has {} elements but mu has {}",
            y.len(),
            mu.len()
        )));
    }
    if y.is_empty() {
        return Err(StatsError::EmptyInput("y is empty".to_string()));
    }
    Ok(())
}

/// Pearson residuals: (y - mu) / sqrt(V(mu)).
pub fn resid_pearson(y: &Array1<f64>, mu: &Array1<f64>, family: &dyn Family) -> Result<Array1<f64>> {
    check_lengths(y, mu)?;
    let variance = family.variance(mu);
    Ok(y.iter()
        .zip(mu.iter())
        .zip(variance.iter())
        .map(|((&yi, &mui), &v)| (yi - mui) / v.max(1e-10).sqrt())
        .collect())
}

/// Deviance residuals: sign(y - mu) * sqrt(unit deviance).
///
/// Their squares sum to the model deviance, so they attribute lack of
/// fit to individual observations.
pub fn resid_deviance(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    family: &dyn Family,
) -> Result<Array1<f64>> {
    check_lengths(y, mu)?;
    let unit = family.unit_deviance(y, mu);
    Ok(y.iter()
        .zip(mu.iter())
        .zip(unit.iter())
        .map(|((&yi, &mui), &d)| (yi - mui).signum() * d.max(0.0).sqrt())
        .collect())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::families::{GaussianFamily, PoissonFamily};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn gaussian_pearson_residuals_are_raw_residuals() {
        // V(mu) = 1 for the Gaussian family.
        let y = array![1.0, 2.0, 3.0];
        let mu = array![1.5, 2.0, 2.5];
        let r = resid_pearson(&y, &mu, &GaussianFamily).unwrap();
        assert_abs_diff_eq!(r[0], -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(r[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn poisson_pearson_residuals_scale_by_sqrt_mu() {
        let y = array![4.0];
        let mu = array![1.0];
        let r = resid_pearson(&y, &mu, &PoissonFamily).unwrap();
        assert_abs_diff_eq!(r[0], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn deviance_residual_squares_sum_to_deviance() {
        let y = array![0.0, 2.0, 5.0, 1.0];
        let mu = array![0.5, 1.5, 4.0, 2.0];
        let r = resid_deviance(&y, &mu, &PoissonFamily).unwrap();
        let sum_sq: f64 = r.iter().map(|v| v * v).sum();
        assert_abs_diff_eq!(sum_sq, PoissonFamily.deviance(&y, &mu), epsilon = 1e-10);
    }

    #[test]
    fn deviance_residuals_carry_the_sign_of_the_raw_residual() {
        let y = array![0.0, 5.0];
        let mu = array![1.0, 2.0];
        let r = resid_deviance(&y, &mu, &PoissonFamily).unwrap();
        assert!(r[0] < 0.0);
        assert!(r[1] > 0.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let y = array![1.0, 2.0];
        let mu = array![1.0];
        assert!(resid_pearson(&y, &mu, &GaussianFamily).is_err());
        assert!(resid_deviance(&y, &mu, &GaussianFamily).is_err());
    }
}
