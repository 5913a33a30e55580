// =============================================================================
// GLM Solvers
// =============================================================================
//
// We want coefficients beta that best explain the relationship
//
//     g(E[Y]) = X * beta
//
// where g is the link function and E[Y] = mu. Unlike ordinary least
// squares this has no closed form, because the link makes the problem
// non-linear and the variance depends on mu. IRLS solves it by repeatedly
// linearizing around the current estimate and solving a weighted least
// squares problem, which converges to the maximum-likelihood fit.
//
// =============================================================================

mod irls;

pub use irls::{fit_glm, GlmFit, IrlsConfig};
