// =============================================================================
// The Six Report Models
// =============================================================================
//
// Two families times three predictors:
//
//     logit:    fatal  ~ magnitude | focal_depth | houses_destroyed
//     poisson:  deaths ~ magnitude | focal_depth | houses_destroyed
//
// The logit models ask whether a predictor moves the odds that anyone
// died; the Poisson models ask whether it moves the size of the toll.
// All fitting is delegated to `quakestats-core` - this module only parses
// formulas, assembles design matrices, and packages the results for the
// console and the report.
//
// =============================================================================

use anyhow::{anyhow, Context, Result};
use ndarray::{Array1, Array2};
use tracing::{info, warn};

use quakestats_core::diagnostics::{
    aic, estimate_dispersion_pearson, log_likelihood_binomial, log_likelihood_poisson,
    null_deviance,
};
use quakestats_core::{
    confidence_interval_z, fit_glm, parse_formula, pvalue_z, significance_stars, standard_errors,
    BinomialFamily, Family, GlmFit, IrlsConfig, Link, LogLink, LogitLink, PoissonFamily,
};

use crate::data::Catalog;

/// Confidence level for every interval in the report.
const CONFIDENCE_LEVEL: f64 = 0.95;

// =============================================================================
// Model specifications
// =============================================================================

/// The two regression families the report fits (see the glossary in the
/// report's closing notes): logit = binomial family + logit link on the
/// fatality flag, poisson = Poisson family + log link on the death count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Logit,
    Poisson,
}

impl ModelFamily {
    pub fn family(&self) -> Box<dyn Family> {
        match self {
            ModelFamily::Logit => Box::new(BinomialFamily),
            ModelFamily::Poisson => Box::new(PoissonFamily),
        }
    }

    pub fn link(&self) -> Box<dyn Link> {
        match self {
            ModelFamily::Logit => Box::new(LogitLink),
            ModelFamily::Poisson => Box::new(LogLink),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelFamily::Logit => "binomial",
            ModelFamily::Poisson => "poisson",
        }
    }

    pub fn link_label(&self) -> &'static str {
        match self {
            ModelFamily::Logit => "logit",
            ModelFamily::Poisson => "log",
        }
    }

    fn log_likelihood(&self, y: &Array1<f64>, mu: &Array1<f64>) -> quakestats_core::Result<f64> {
        match self {
            ModelFamily::Logit => log_likelihood_binomial(y, mu),
            ModelFamily::Poisson => log_likelihood_poisson(y, mu),
        }
    }
}

/// One model the report fits: a formula, a family, and how to talk about
/// the predictor in prose.
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    /// Stable identifier used in logs and section anchors.
    pub key: &'static str,
    /// R-style formula over catalog column names.
    pub formula: &'static str,
    pub family: ModelFamily,
    /// Unit phrase for interpretation text: "each additional <this> ...".
    pub predictor_unit: &'static str,
}

/// The six models of the report, in presentation order: the three logit
/// fits, then the three Poisson fits.
pub fn report_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec {
            key: "logit_magnitude",
            formula: "fatal ~ magnitude",
            family: ModelFamily::Logit,
            predictor_unit: "unit of magnitude",
        },
        ModelSpec {
            key: "logit_focal_depth",
            formula: "fatal ~ focal_depth",
            family: ModelFamily::Logit,
            predictor_unit: "kilometre of focal depth",
        },
        ModelSpec {
            key: "logit_houses_destroyed",
            formula: "fatal ~ houses_destroyed",
            family: ModelFamily::Logit,
            predictor_unit: "destroyed house",
        },
        ModelSpec {
            key: "poisson_magnitude",
            formula: "deaths ~ magnitude",
            family: ModelFamily::Poisson,
            predictor_unit: "unit of magnitude",
        },
        ModelSpec {
            key: "poisson_focal_depth",
            formula: "deaths ~ focal_depth",
            family: ModelFamily::Poisson,
            predictor_unit: "kilometre of focal depth",
        },
        ModelSpec {
            key: "poisson_houses_destroyed",
            formula: "deaths ~ houses_destroyed",
            family: ModelFamily::Poisson,
            predictor_unit: "destroyed house",
        },
    ]
}

// =============================================================================
// Fitted-model summaries
// =============================================================================

/// One line of the coefficient table.
#[derive(Debug, Clone)]
pub struct CoefficientRow {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub z_value: f64,
    pub p_value: f64,
    pub stars: &'static str,
    pub conf_low: f64,
    pub conf_high: f64,
}

/// Everything the console summary, the tables, and the prose need about
/// one fitted model.
#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub key: &'static str,
    pub formula: &'static str,
    pub family: ModelFamily,
    pub response: String,
    pub predictor: String,
    pub predictor_unit: &'static str,
    pub n: usize,
    pub coefficients: Vec<CoefficientRow>,
    pub deviance: f64,
    pub null_deviance: f64,
    pub df_residual: usize,
    pub df_null: usize,
    pub log_likelihood: f64,
    pub aic: f64,
    /// Pearson dispersion estimate; both report families assume 1.
    pub dispersion: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl ModelSummary {
    /// The predictor's coefficient row (the last non-intercept term).
    pub fn slope(&self) -> &CoefficientRow {
        self.coefficients
            .iter()
            .rev()
            .find(|row| row.term != "(Intercept)")
            .unwrap_or(&self.coefficients[0])
    }

    /// Share of the null deviance the model removes, in [0, 1] for any
    /// fit that beats the intercept-only model.
    pub fn deviance_explained(&self) -> f64 {
        if self.null_deviance > 0.0 {
            1.0 - self.deviance / self.null_deviance
        } else {
            0.0
        }
    }
}

/// A fitted model: the summary plus the pieces the plots need (response,
/// predictor, and the raw fit with its fitted values).
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub summary: ModelSummary,
    pub response: Array1<f64>,
    pub predictor: Array1<f64>,
    pub fit: GlmFit,
}

// =============================================================================
// Fitting
// =============================================================================

/// Fit one model specification against the catalog.
///
/// Parses the formula, assembles the design matrix from catalog columns,
/// runs IRLS through the core crate, and derives the Wald inference and
/// fit measures the report presents. A fit that hits the iteration cap is
/// returned with `converged = false` and a warning in the log, not an
/// error.
pub fn fit_model(catalog: &Catalog, spec: &ModelSpec) -> Result<FittedModel> {
    let parsed = parse_formula(spec.formula)
        .with_context(|| format!("parsing formula for {}", spec.key))?;

    let y = catalog
        .column(&parsed.response)
        .ok_or_else(|| anyhow!("unknown response column '{}' in {}", parsed.response, spec.formula))?;

    let mut effect_columns = Vec::with_capacity(parsed.main_effects.len());
    for name in &parsed.main_effects {
        let column = catalog
            .column(name)
            .ok_or_else(|| anyhow!("unknown predictor column '{}' in {}", name, spec.formula))?;
        effect_columns.push(column);
    }

    let n = catalog.len();
    let p = effect_columns.len() + usize::from(parsed.has_intercept);
    let mut x = Array2::zeros((n, p));
    let mut terms = Vec::with_capacity(p);
    let mut next = 0;
    if parsed.has_intercept {
        x.column_mut(0).fill(1.0);
        terms.push("(Intercept)".to_string());
        next = 1;
    }
    for (name, column) in parsed.main_effects.iter().zip(effect_columns) {
        x.column_mut(next).assign(&column);
        terms.push(name.clone());
        next += 1;
    }

    let family = spec.family.family();
    let link = spec.family.link();
    let fit = fit_glm(&y, &x, family.as_ref(), link.as_ref(), &IrlsConfig::default())
        .with_context(|| format!("fitting {}", spec.key))?;

    if fit.converged {
        info!(model = spec.key, iterations = fit.iterations, "model fitted");
    } else {
        warn!(
            model = spec.key,
            iterations = fit.iterations,
            "IRLS hit the iteration cap without converging"
        );
    }

    // Both report families fix the dispersion at 1, so Wald inference
    // uses the unscaled covariance directly. The Pearson estimate is
    // carried as a diagnostic, not folded into the standard errors.
    let se = standard_errors(&fit.covariance_unscaled, 1.0)?;
    let mut coefficients = Vec::with_capacity(p);
    for (j, term) in terms.into_iter().enumerate() {
        let estimate = fit.coefficients[j];
        let std_error = se[j];
        let z_value = if std_error > 0.0 { estimate / std_error } else { f64::NAN };
        let p_value = pvalue_z(z_value);
        let (conf_low, conf_high) = confidence_interval_z(estimate, std_error, CONFIDENCE_LEVEL)?;
        coefficients.push(CoefficientRow {
            term,
            estimate,
            std_error,
            z_value,
            p_value,
            stars: significance_stars(p_value),
            conf_low,
            conf_high,
        });
    }

    let log_likelihood = spec.family.log_likelihood(&y, &fit.fitted_values)?;
    let summary = ModelSummary {
        key: spec.key,
        formula: spec.formula,
        family: spec.family,
        response: parsed.response.clone(),
        predictor: parsed.main_effects.first().cloned().unwrap_or_default(),
        predictor_unit: spec.predictor_unit,
        n,
        coefficients,
        deviance: fit.deviance,
        null_deviance: null_deviance(&y, family.as_ref())?,
        df_residual: n - p,
        df_null: n - 1,
        log_likelihood,
        aic: aic(log_likelihood, p),
        dispersion: estimate_dispersion_pearson(&y, &fit.fitted_values, family.as_ref(), p)?,
        iterations: fit.iterations,
        converged: fit.converged,
    };

    let predictor = catalog
        .column(&summary.predictor)
        .unwrap_or_else(|| Array1::zeros(n));

    Ok(FittedModel {
        summary,
        response: y,
        predictor,
        fit,
    })
}

/// Fit all six report models, in presentation order.
pub fn fit_report_models(catalog: &Catalog) -> Result<Vec<FittedModel>> {
    report_models()
        .iter()
        .map(|spec| fit_model(catalog, spec))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
