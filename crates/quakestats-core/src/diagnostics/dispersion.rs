// =============================================================================
// Dispersion Estimation
// =============================================================================
//
// The GLM variance assumption is Var(y_i) = phi * V(mu_i). The Binomial
// and Poisson families fix phi = 1 in theory, but real data rarely
// cooperates: death counts in particular cluster far more than a Poisson
// law allows. The Pearson estimate
//
//     phi_hat = chi2_pearson / (n - p)
//
// measures how far the data strays. A value well above 1 means the
// model's standard errors are too optimistic and should be read with
// suspicion (overdispersion); well below 1 is underdispersion.
//
// =============================================================================

use ndarray::Array1;

use crate::error::{Result, StatsError};
use crate::families::Family;

use super::residuals::resid_pearson;

/// Pearson chi-square statistic: the sum of squared Pearson residuals.
pub fn pearson_chi2(y: &Array1<f64>, mu: &Array1<f64>, family: &dyn Family) -> Result<f64> {
    let r = resid_pearson(y, mu, family)?;
    Ok(r.iter().map(|v| v * v).sum())
}

/// Pearson estimate of the dispersion: chi2 / (n - p), where p counts
/// the fitted parameters.
pub fn estimate_dispersion_pearson(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    family: &dyn Family,
    n_params: usize,
) -> Result<f64> {
    let n = y.len();
    if n <= n_params {
        return Err(StatsError::InvalidValue(format!(
            "cannot estimate dispersion with {} observations and {} parameters",
            n, n_params
        )));
    }
    let chi2 = pearson_chi2(y, mu, family)?;
    Ok(chi2 / (n - n_params) as f64)
}

// =============================================================================
// Tests
// =============================================================================
