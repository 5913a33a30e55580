use ndarray::Array1;

use crate::families::Family;
use crate::links::{IdentityLink, Link};

/// Gaussian (normal) family: constant variance, identity link.
///
/// With the identity link this is ordinary least squares, which makes it
/// the reference case for the solver: IRLS must reproduce OLS exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianFamily;

impl Family for GaussianFamily {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn variance(&self, mu: &Array1<f64>) -> Array1<f64> {
        Array1::ones(mu.len())
    }

    fn unit_deviance(&self, y: &Array1<f64>, mu: &Array1<f64>) -> Array1<f64> {
        // (y - mu)^2: the deviance is the residual sum of squares
        y.iter()
            .zip(mu.iter())
            .map(|(&yi, &mui)| (yi - mui) * (yi - mui))
            .collect()
    }

    fn clamp_mu(&self, mu: &Array1<f64>) -> Array1<f64> {
        // Any real mean is valid
        mu.clone()
    }

    fn default_link(&self) -> Box<dyn Link> {
        Box::new(IdentityLink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn deviance_is_residual_sum_of_squares() {
        let y = array![1.0, 2.0, 3.0];
        let mu = array![1.5, 2.0, 2.0];
        let d = GaussianFamily.deviance(&y, &mu);
        assert_abs_diff_eq!(d, 0.25 + 0.0 + 1.0, epsilon = 1e-12);
    }

    #[test]
    fn variance_is_constant() {
        let v = GaussianFamily.variance(&array![-5.0, 0.0, 5.0]);
        assert!(v.iter().all(|&x| x == 1.0));
    }
}
