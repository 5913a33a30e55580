// =============================================================================
// Model Diagnostics
// =============================================================================
//
// Tools for assessing GLM fit quality:
//
// - RESIDUALS: Pearson and deviance residuals for spotting misfit
// - DISPERSION: the Pearson chi-square estimate of the scale parameter,
//   which is how overdispersion shows up for count models
// - MODEL FIT: log-likelihood, AIC, BIC, and the null deviance
//
// STATSMODELS COMPATIBILITY:
// --------------------------
// Names and calculations follow statsmodels conventions:
// - resid_pearson: residuals standardized by the variance function
// - resid_deviance: signed square roots of the deviance contributions
//
// =============================================================================

mod dispersion;
mod model_fit;
mod residuals;

pub use dispersion::{estimate_dispersion_pearson, pearson_chi2};

pub use model_fit::{aic, bic, log_likelihood_binomial, log_likelihood_poisson, null_deviance};

pub use residuals::{resid_deviance, resid_pearson};
