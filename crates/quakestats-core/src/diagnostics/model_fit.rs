// =============================================================================
// Model Fit Measures
// =============================================================================
//
// Log-likelihoods and the information criteria built from them:
//
//     AIC = -2*ll + 2k
//     BIC = -2*ll + k*ln(n)
//
// Lower is better for both; BIC penalizes extra parameters harder as the
// sample grows. The null deviance (intercept-only model) is the yardstick
// the fitted deviance is compared against: the gap between the two is the
// variation the predictor actually explains.
//
// =============================================================================

use ndarray::Array1;
use statrs::function::gamma::ln_gamma;

use crate::constants::{MU_MAX_PROBABILITY, MU_MIN_POSITIVE, MU_MIN_PROBABILITY};
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

/// Poisson log-likelihood: sum of y*ln(mu) - mu - ln(y!).
pub fn log_likelihood_poisson(y: &Array1<f64>, mu: &Array1<f64>) -> Result<f64> {
    check_lengths(y, mu)?;
    Ok(y.iter()
        .zip(mu.iter())
        .map(|(&yi, &mui)| {
            let m = mui.max(MU_MIN_POSITIVE);
            let ylogmu = if yi > 0.0 { yi * m.ln() } else { 0.0 };
            ylogmu - m - ln_gamma(yi + 1.0)
        })
        .sum())
}

/// Bernoulli log-likelihood for a binary response:
/// sum of y*ln(mu) + (1-y)*ln(1-mu).
pub fn log_likelihood_binomial(y: &Array1<f64>, mu: &Array1<f64>) -> Result<f64> {
    check_lengths(y, mu)?;
    Ok(y.iter()
        .zip(mu.iter())
        .map(|(&yi, &mui)| {
            let m = mui.clamp(MU_MIN_PROBABILITY, MU_MAX_PROBABILITY);
            yi * m.ln() + (1.0 - yi) * (1.0 - m).ln()
        })
        .sum())
}

/// Akaike information criterion.
pub fn aic(log_likelihood: f64, n_params: usize) -> f64 {
    -2.0 * log_likelihood + 2.0 * n_params as f64
}

/// Bayesian information criterion.
pub fn bic(log_likelihood: f64, n_params: usize, n_obs: usize) -> f64 {
    -2.0 * log_likelihood + n_params as f64 * (n_obs as f64).ln()
}

/// Deviance of the intercept-only model: every fitted value is the
/// response mean. The family clamps the mean into its valid range.
pub fn null_deviance(y: &Array1<f64>, family: &dyn Family) -> Result<f64> {
    if y.is_empty() {
        return Err(StatsError::EmptyInput("y is empty".to_string()));
    }
    let mean = y.sum() / y.len() as f64;
    let mu = family.clamp_mu(&Array1::from_elem(y.len(), mean));
    Ok(family.deviance(y, &mu))
}

// =============================================================================
// Tests
// =============================================================================
