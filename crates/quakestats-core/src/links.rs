// =============================================================================
// Link Functions
// =============================================================================
//
// The link function g connects the mean of the response to the linear
// predictor:
//
//     g(mu) = eta = X * beta
//
// Each link must provide three operations:
//
//   - link(mu):       eta = g(mu)
//   - inverse(eta):   mu = g^-1(eta)
//   - derivative(mu): d eta / d mu, used for IRLS weights and the
//                     working response
//
// WHICH LINK FOR WHICH MODEL?
// ---------------------------
//   - Identity: Gaussian linear regression. No transformation.
//   - Logit:    Binary outcomes. Maps probabilities (0,1) onto the whole
//               real line, so the linear predictor can never produce an
//               impossible probability.
//   - Log:      Counts. Guarantees positive means and makes coefficients
//               act multiplicatively: exp(beta) is a rate ratio.
//
// =============================================================================

use ndarray::Array1;

use crate::constants::{MAX_EXP_ARG, MU_MAX_PROBABILITY, MU_MIN_PROBABILITY, MU_MIN_POSITIVE};

/// A link function g relating the mean mu to the linear predictor eta.
pub trait Link {
    /// Short name, e.g. "logit".
    fn name(&self) -> &'static str;

    /// Apply the link: eta = g(mu).
    fn link(&self, mu: &Array1<f64>) -> Array1<f64>;

    /// Apply the inverse link: mu = g^-1(eta).
    fn inverse(&self, eta: &Array1<f64>) -> Array1<f64>;

    /// Derivative d eta / d mu evaluated at mu.
    fn derivative(&self, mu: &Array1<f64>) -> Array1<f64>;
}

// =============================================================================
// Identity: eta = mu
// =============================================================================

/// Identity link: no transformation at all. Default for Gaussian models.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLink;

impl Link for IdentityLink {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn link(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.clone()
    }

    fn inverse(&self, eta: &Array1<f64>) -> Array1<f64> {
        eta.clone()
    }

    fn derivative(&self, mu: &Array1<f64>) -> Array1<f64> {
        Array1::ones(mu.len())
    }
}

// =============================================================================
// Log: eta = ln(mu)
// =============================================================================

/// Log link: eta = ln(mu). Default for Poisson count models.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLink;

impl Link for LogLink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn link(&self, mu: &Array1<f64>) -> Array1<f64> {
        // mu must be positive; clamp so ln() never sees zero
        mu.mapv(|m| m.max(MU_MIN_POSITIVE).ln())
    }

    fn inverse(&self, eta: &Array1<f64>) -> Array1<f64> {
        // Cap the exponent so a wild intermediate eta cannot overflow to
        // infinity and poison the working weights.
        eta.mapv(|e| e.min(MAX_EXP_ARG).exp())
    }

    fn derivative(&self, mu: &Array1<f64>) -> Array1<f64> {
        // d/dmu ln(mu) = 1/mu
        mu.mapv(|m| 1.0 / m.max(MU_MIN_POSITIVE))
    }
}

// =============================================================================
// Logit: eta = ln(mu / (1 - mu))
// =============================================================================

/// Logit link: eta is the log-odds of mu. Default for Binomial models.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogitLink;

impl Link for LogitLink {
    fn name(&self) -> &'static str {
        "logit"
    }

    fn link(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| {
            let m = m.clamp(MU_MIN_PROBABILITY, MU_MAX_PROBABILITY);
            (m / (1.0 - m)).ln()
        })
    }

    fn inverse(&self, eta: &Array1<f64>) -> Array1<f64> {
        // Numerically stable sigmoid: never exponentiates a large
        // positive number.
        eta.mapv(|e| {
            if e >= 0.0 {
                1.0 / (1.0 + (-e).exp())
            } else {
                let ex = e.exp();
                ex / (1.0 + ex)
            }
        })
    }

    fn derivative(&self, mu: &Array1<f64>) -> Array1<f64> {
        // d/dmu ln(mu/(1-mu)) = 1 / (mu (1 - mu))
        mu.mapv(|m| {
            let m = m.clamp(MU_MIN_PROBABILITY, MU_MAX_PROBABILITY);
            1.0 / (m * (1.0 - m))
        })
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
    fn identity_roundtrip() {
        let mu = array![-2.0, 0.0, 3.5];
        let link = IdentityLink;
        let back = link.inverse(&link.link(&mu));
        for (a, b) in mu.iter().zip(back.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn log_roundtrip() {
        let mu = array![0.1, 1.0, 250.0];
        let link = LogLink;
        let back = link.inverse(&link.link(&mu));
        for (a, b) in mu.iter().zip(back.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn logit_roundtrip() {
        let mu = array![0.01, 0.5, 0.99];
        let link = LogitLink;
        let back = link.inverse(&link.link(&mu));
        for (a, b) in mu.iter().zip(back.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn logit_of_half_is_zero() {
        let eta = LogitLink.link(&array![0.5]);
        assert_abs_diff_eq!(eta[0], 0.0, epsilon = 1e-12);
        let mu = LogitLink.inverse(&array![0.0]);
        assert_abs_diff_eq!(mu[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn logit_inverse_is_stable_for_extreme_eta() {
        let mu = LogitLink.inverse(&array![-800.0, 800.0]);
        assert!(mu[0] >= 0.0 && mu[0] < 1e-12);
        assert!(mu[1] <= 1.0 && mu[1] > 1.0 - 1e-12);
        assert!(mu.iter().all(|m| m.is_finite()));
    }

    #[test]
    fn log_inverse_never_overflows() {
        let mu = LogLink.inverse(&array![1e6]);
        assert!(mu[0].is_finite());
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let h = 1e-6;
        let points = array![0.2, 0.4, 0.7];
        for link in [&LogLink as &dyn Link, &LogitLink as &dyn Link] {
            let d = link.derivative(&points);
            let up = link.link(&points.mapv(|m| m + h));
            let down = link.link(&points.mapv(|m| m - h));
            for i in 0..points.len() {
                let numeric = (up[i] - down[i]) / (2.0 * h);
                assert_abs_diff_eq!(d[i], numeric, epsilon = 1e-4);
            }
        }
    }
}
