use ndarray::Array1;

use crate::constants::MU_MIN_POSITIVE;
use crate::families::{ylogy, Family};
use crate::links::{Link, LogLink};

/// Poisson family for count responses, normally paired with the log link.
///
/// V(mu) = mu: the variance of a count grows with its mean. Real-world
/// counts (death tolls very much included) are usually MORE dispersed
/// than that; the fit is still consistent, but the reported standard
/// errors assume Var(Y) = mu. Check the Pearson dispersion in
/// `diagnostics` before taking the p-values at face value.
///
/// The unit deviance is
///
/// ```text
/// d(y, mu) = 2 * [ y ln(y/mu) - (y - mu) ]
/// ```
///
/// with the y = 0 term defined by continuity as 2 * mu.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoissonFamily;

impl Family for PoissonFamily {
    fn name(&self) -> &'static str {
        "poisson"
    }

    fn variance(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| m.max(MU_MIN_POSITIVE))
    }

    fn unit_deviance(&self, y: &Array1<f64>, mu: &Array1<f64>) -> Array1<f64> {
        y.iter()
            .zip(mu.iter())
            .map(|(&yi, &mui)| {
                let mui = mui.max(MU_MIN_POSITIVE);
                2.0 * (ylogy(yi, mui) - (yi - mui))
            })
            .collect()
    }

    fn clamp_mu(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| m.max(MU_MIN_POSITIVE))
    }

    fn default_link(&self) -> Box<dyn Link> {
        Box::new(LogLink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn variance_equals_mean() {
        let mu = array![0.5, 2.0, 10.0];
        let v = PoissonFamily.variance(&mu);
        for (a, b) in v.iter().zip(mu.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn unit_deviance_at_zero_count_is_twice_mu() {
        let d = PoissonFamily.unit_deviance(&array![0.0], &array![3.0]);
        assert_abs_diff_eq!(d[0], 6.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_deviance_known_value() {
        // y = 2, mu = 1: 2 * (2 ln 2 - 1)
        let d = PoissonFamily.unit_deviance(&array![2.0], &array![1.0]);
        assert_abs_diff_eq!(d[0], 2.0 * (2.0 * 2.0_f64.ln() - 1.0), epsilon = 1e-12);
    }

    #[test]
    fn deviance_positive_away_from_fit() {
        let y = array![1.0, 5.0, 0.0];
        let mu = array![2.0, 2.0, 2.0];
        assert!(PoissonFamily.deviance(&y, &mu) > 0.0);
    }
}
