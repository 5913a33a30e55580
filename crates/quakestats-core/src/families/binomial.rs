use ndarray::Array1;

use crate::constants::{MU_MAX_PROBABILITY, MU_MIN_PROBABILITY};
use crate::families::{ylogy, Family};
use crate::links::{Link, LogitLink};

/// Binomial family for a binary (0/1) response, paired with the logit link.
///
/// V(mu) = mu (1 - mu). The unit deviance for binary data is
///
/// ```text
/// d(y, mu) = 2 * [ y ln(y/mu) + (1 - y) ln((1-y)/(1-mu)) ]
/// ```
///
/// which collapses to -2 ln(mu) when y = 1 and -2 ln(1 - mu) when y = 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinomialFamily;

impl Family for BinomialFamily {
    fn name(&self) -> &'static str {
        "binomial"
    }

    fn variance(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| {
            let m = m.clamp(MU_MIN_PROBABILITY, MU_MAX_PROBABILITY);
            m * (1.0 - m)
        })
    }

    fn unit_deviance(&self, y: &Array1<f64>, mu: &Array1<f64>) -> Array1<f64> {
        y.iter()
            .zip(mu.iter())
            .map(|(&yi, &mui)| {
                let mui = mui.clamp(MU_MIN_PROBABILITY, MU_MAX_PROBABILITY);
                2.0 * (ylogy(yi, mui) + ylogy(1.0 - yi, 1.0 - mui))
            })
            .collect()
    }

    fn clamp_mu(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| m.clamp(MU_MIN_PROBABILITY, MU_MAX_PROBABILITY))
    }

    fn default_link(&self) -> Box<dyn Link> {
        Box::new(LogitLink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn variance_peaks_at_half() {
        let v = BinomialFamily.variance(&array![0.1, 0.5, 0.9]);
        assert!(v[1] > v[0]);
        assert!(v[1] > v[2]);
        assert_abs_diff_eq!(v[1], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn unit_deviance_matches_closed_forms() {
        // y = 1: -2 ln(mu); y = 0: -2 ln(1 - mu)
        let d = BinomialFamily.unit_deviance(&array![1.0, 0.0], &array![0.8, 0.8]);
        assert_abs_diff_eq!(d[0], -2.0 * 0.8_f64.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(d[1], -2.0 * 0.2_f64.ln(), epsilon = 1e-10);
    }

    #[test]
    fn deviance_finite_even_for_certain_predictions() {
        // mu pinned at the clamp boundary must not produce NaN or infinity
        let y = array![1.0, 0.0];
        let mu = array![1.0, 0.0];
        let d = BinomialFamily.deviance(&y, &BinomialFamily.clamp_mu(&mu));
        assert!(d.is_finite());
    }
}
