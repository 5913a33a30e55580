// =============================================================================
// IRLS: Iteratively Reweighted Least Squares
// =============================================================================
//
// The fitting loop, once per iteration:
//
//     1. Compute fitted means mu from the current coefficients
//     2. Compute working weights  w = 1 / (V(mu) * g'(mu)^2)
//     3. Compute working response z = eta + (y - mu) * g'(mu)
//     4. Solve the weighted least squares system (X'WX) beta = X'Wz
//     5. Stop when the deviance stops moving
//
// The weights change every iteration because the variance depends on mu
// and so does the link derivative; observations the model currently
// considers noisy get less say in the next update. The working response
// is the first-order linearization of g(y) around mu, which is what turns
// a non-linear likelihood problem into repeated linear regression.
//
// CONVERGENCE
// -----------
// We stop when the relative change in deviance drops below the tolerance.
// Failure to converge usually means complete separation (a predictor that
// splits a binary response perfectly) or severe data problems; the result
// is still returned, flagged with `converged = false`, so the caller can
// report it instead of crashing a whole analysis.
//
// =============================================================================

use ndarray::{Array1, Array2};

use crate::constants::WEIGHT_CLIP_MAX;
use crate::convert::{solve_and_invert, to_dmatrix, to_dvector};
use crate::error::{Result, StatsError};
use crate::families::Family;
use crate::links::Link;

// =============================================================================
// Configuration
// =============================================================================

/// Options controlling the IRLS iteration.
///
/// The defaults are sensible for well-behaved problems; loosen the
/// tolerance or raise the iteration cap for difficult ones.
#[derive(Debug, Clone)]
pub struct IrlsConfig {
    /// Maximum number of iterations before giving up.
    pub max_iterations: usize,

    /// Convergence tolerance on the relative change in deviance.
    pub tolerance: f64,

    /// Floor for working weights, to keep the normal equations finite.
    pub min_weight: f64,

    /// Print per-iteration deviance to stderr.
    pub verbose: bool,
}

impl Default for IrlsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-8,
            min_weight: 1e-10,
            verbose: false,
        }
    }
}

// =============================================================================
// Result Structure
// =============================================================================

/// Everything a fitted GLM needs to support inference and diagnostics.
#[derive(Debug, Clone)]
pub struct GlmFit {
    /// Estimated coefficients beta, in design-matrix column order.
    pub coefficients: Array1<f64>,

    /// Fitted means mu = g^-1(X beta).
    pub fitted_values: Array1<f64>,

    /// Linear predictor eta = X beta.
    pub linear_predictor: Array1<f64>,

    /// Final deviance.
    pub deviance: f64,

    /// Iterations actually performed.
    pub iterations: usize,

    /// Whether the deviance criterion was met within the iteration cap.
    pub converged: bool,

    /// (X'WX)^-1 at the final weights. Var(beta) = phi * (X'WX)^-1,
    /// and phi = 1 for the Binomial and Poisson families.
    pub covariance_unscaled: Array2<f64>,
}

// =============================================================================
// Fitting
// =============================================================================

/// Fit a GLM by IRLS.
///
/// # Arguments
/// * `y` - response vector (length n)
/// * `x` - design matrix (n rows, p columns; include an intercept column
///   if the model should have one)
/// * `family` - distribution family
/// * `link` - link function
/// * `config` - iteration controls
///
/// # Errors
/// Dimension disagreements and empty inputs are rejected up front; a
/// singular weighted least squares system surfaces as
/// [`StatsError::LinearAlgebra`]. Hitting the iteration cap is NOT an
/// error - the fit is returned with `converged = false`.
pub fn fit_glm(
    y: &Array1<f64>,
    x: &Array2<f64>,
    family: &dyn Family,
    link: &dyn Link,
    config: &IrlsConfig,
) -> Result<GlmFit> {
    let n = y.len();
    let p = x.ncols();

    if x.nrows() != n {
        return Err(StatsError::DimensionMismatch(format!(
            "X has {} rows but y has {} elements",
            x.nrows(),
            n
        )));
    }
    if n == 0 {
        return Err(StatsError::EmptyInput("y is empty".to_string()));
    }
    if p == 0 {
        return Err(StatsError::EmptyInput("X has no columns".to_string()));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::InvalidValue(
            "y contains non-finite values".to_string(),
        ));
    }

    // Starting point: means from the family, linear predictor through the link.
    let mut mu = family.initialize_mu(y);
    let mut eta = link.link(&mu);
    let mut deviance = family.deviance(y, &mu);

    let mut coefficients = Array1::zeros(p);
    let mut covariance_unscaled = Array2::zeros((p, p));
    let mut converged = false;
    let mut iteration = 0;

    while iteration < config.max_iterations {
        iteration += 1;

        // Working weights: w_i = 1 / (V(mu_i) * g'(mu_i)^2), clipped so a
        // degenerate observation can neither vanish nor dominate.
        let variance = family.variance(&mu);
        let link_deriv = link.derivative(&mu);
        let weights: Array1<f64> = variance
            .iter()
            .zip(link_deriv.iter())
            .map(|(&v, &d)| (1.0 / (v * d * d)).clamp(config.min_weight, WEIGHT_CLIP_MAX))
            .collect();

        // Working response: z_i = eta_i + (y_i - mu_i) * g'(mu_i)
        let working_response: Array1<f64> = eta
            .iter()
            .zip(y.iter())
            .zip(mu.iter())
            .zip(link_deriv.iter())
            .map(|(((&e, &yi), &mui), &d)| e + (yi - mui) * d)
            .collect();

        // Solve (X'WX) beta = X'Wz.
        let (new_coefficients, xtwx_inv) =
            solve_weighted_least_squares(x, &working_response, &weights)?;
        coefficients = new_coefficients;
        covariance_unscaled = xtwx_inv;

        // Update eta and mu, keeping mu inside the family's valid range.
        eta = x.dot(&coefficients);
        mu = family.clamp_mu(&link.inverse(&eta));

        // Convergence: relative change in deviance.
        let deviance_old = deviance;
        deviance = family.deviance(y, &mu);
        let rel_change = if deviance_old.abs() > 1e-10 {
            (deviance_old - deviance).abs() / deviance_old.abs()
        } else {
            (deviance_old - deviance).abs()
        };

        if config.verbose {
            eprintln!(
                "IRLS iteration {}: deviance = {:.6}, rel_change = {:.2e}",
                iteration, deviance, rel_change
            );
        }

        if rel_change < config.tolerance {
            converged = true;
            break;
        }
    }

    Ok(GlmFit {
        coefficients,
        fitted_values: mu,
        linear_predictor: eta,
        deviance,
        iterations: iteration,
        converged,
        covariance_unscaled,
    })
}

/// Solve the weighted least squares problem: minimize
/// sum_i w_i (z_i - x_i' beta)^2.
///
/// Returns (beta, (X'WX)^-1). Scaling each row of X and z by sqrt(w_i)
/// turns the problem into plain least squares without ever materializing
/// the diagonal weight matrix.
fn solve_weighted_least_squares(
    x: &Array2<f64>,
    z: &Array1<f64>,
    w: &Array1<f64>,
) -> Result<(Array1<f64>, Array2<f64>)> {
    let sqrt_w = w.mapv(f64::sqrt);

    let mut x_weighted = x.clone();
    for (mut row, &sw) in x_weighted.rows_mut().into_iter().zip(sqrt_w.iter()) {
        row.mapv_inplace(|v| v * sw);
    }
    let z_weighted: Array1<f64> = z
        .iter()
        .zip(sqrt_w.iter())
        .map(|(&zi, &sw)| zi * sw)
        .collect();

    let xw = to_dmatrix(&x_weighted);
    let zw = to_dvector(&z_weighted);

    // X'WX and X'Wz via the sqrt-weighted copies
    let xtx = xw.transpose() * &xw;
    let xtz = xw.transpose() * zw;

    solve_and_invert(&xtx, &xtz)
}

// =============================================================================
// Tests
// =============================================================================
