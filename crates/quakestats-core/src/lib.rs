// =============================================================================
// QuakeStats Core Library
// =============================================================================
//
// This is the statistics library behind the earthquake report. All of the
// regression mathematics lives here; the report crate only chooses responses
// and predictors and calls into this crate.
//
// STRUCTURE:
// ----------
// The library is organized into modules, each handling a specific concern:
//
//   - families:    Distribution families (Gaussian, Binomial, Poisson)
//   - links:       Link functions (Identity, Logit, Log)
//   - solvers:     Fitting via IRLS (Iteratively Reweighted Least Squares)
//   - inference:   Standard-normal p-values, confidence intervals, stars
//   - diagnostics: Residuals, dispersion, and model-fit measures
//   - formula:     "response ~ predictor" model notation
//   - error:       Error types used throughout the library
//
// FOR MAINTAINERS:
// ----------------
// When adding new functionality:
//   1. Add it to the appropriate module (or create a new one)
//   2. Write tests in that module (see existing tests for examples)
//   3. Re-export public items here so users can access them easily
//
// =============================================================================

pub mod constants;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod families;
pub mod formula;
pub mod inference;
pub mod links;
pub mod solvers;

// Re-export commonly used items at the top level for convenience.
// Users can write `use quakestats_core::PoissonFamily` instead of
// `use quakestats_core::families::poisson::PoissonFamily`.
pub use error::{Result, StatsError};
pub use families::{BinomialFamily, Family, GaussianFamily, PoissonFamily};
pub use formula::{parse_formula, ParsedFormula};
pub use inference::{confidence_interval_z, pvalue_z, significance_stars, standard_errors};
pub use links::{IdentityLink, Link, LogLink, LogitLink};
pub use solvers::{fit_glm, GlmFit, IrlsConfig};
