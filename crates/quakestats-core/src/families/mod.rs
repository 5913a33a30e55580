// =============================================================================
// Distribution Families
// =============================================================================
//
// A family describes how the response varies around its mean. The GLM
// machinery needs surprisingly little from it:
//
//   - variance(mu):  V(mu), the variance function. Var(Y) = phi * V(mu).
//   - unit_deviance: the per-observation contribution to the deviance,
//                    i.e. 2 * (loglik of the saturated model - loglik at mu).
//   - initialize_mu: a safe starting point for IRLS.
//   - clamp_mu:      keep fitted means inside the family's valid range.
//
// The deviance is the GLM generalization of the residual sum of squares:
// for the Gaussian family it IS the RSS, for Poisson and Binomial it is
// the likelihood-ratio statistic against a model that fits every point
// exactly. Lower deviance = closer fit.
//
// =============================================================================

mod binomial;
mod gaussian;
mod poisson;

pub use binomial::BinomialFamily;
pub use gaussian::GaussianFamily;
pub use poisson::PoissonFamily;

use ndarray::Array1;

use crate::links::Link;

/// A GLM distribution family.
pub trait Family {
    /// Short name, e.g. "poisson".
    fn name(&self) -> &'static str;

    /// Variance function V(mu).
    fn variance(&self, mu: &Array1<f64>) -> Array1<f64>;

    /// Per-observation deviance contribution d(y_i, mu_i).
    fn unit_deviance(&self, y: &Array1<f64>, mu: &Array1<f64>) -> Array1<f64>;

    /// Total deviance: sum of the unit deviances.
    fn deviance(&self, y: &Array1<f64>, mu: &Array1<f64>) -> f64 {
        self.unit_deviance(y, mu).sum()
    }

    /// Starting values for the fitted means. Shrinking each observation
    /// halfway toward the sample mean keeps the start strictly inside the
    /// valid range even for all-zero responses.
    fn initialize_mu(&self, y: &Array1<f64>) -> Array1<f64> {
        let y_mean = y.mean().unwrap_or(0.0);
        let raw = y.mapv(|yi| (yi + y_mean) / 2.0);
        self.clamp_mu(&raw)
    }

    /// Clamp fitted means to the family's valid range.
    fn clamp_mu(&self, mu: &Array1<f64>) -> Array1<f64>;

    /// The canonical link this family is normally paired with.
    fn default_link(&self) -> Box<dyn Link>;
}

/// y * ln(y / mu) with the count convention 0 * ln(0) = 0.
///
/// Shared by the Poisson and Binomial unit deviances, both of which would
/// otherwise produce NaN for observed zeros.
pub(crate) fn ylogy(y: f64, mu: f64) -> f64 {
    if y <= 0.0 {
        0.0
    } else {
        y * (y / mu).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn ylogy_zero_convention() {
        assert_eq!(ylogy(0.0, 0.5), 0.0);
        assert_abs_diff_eq!(ylogy(2.0, 1.0), 2.0 * 2.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn deviance_is_zero_at_perfect_fit() {
        let y = array![1.0, 4.0, 2.0];
        for family in [
            &PoissonFamily as &dyn Family,
            &GaussianFamily as &dyn Family,
        ] {
            let d = family.deviance(&y, &y);
            assert_abs_diff_eq!(d, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn initialize_mu_handles_all_zero_counts() {
        let y = Array1::zeros(5);
        let mu = PoissonFamily.initialize_mu(&y);
        assert!(mu.iter().all(|&m| m > 0.0));
    }

    #[test]
    fn initialize_mu_stays_inside_unit_interval() {
        let y = array![0.0, 0.0, 1.0, 1.0, 1.0];
        let mu = BinomialFamily.initialize_mu(&y);
        assert!(mu.iter().all(|&m| m > 0.0 && m < 1.0));
    }
}
