//! Numerical guard rails shared across families, links, and the solver.

/// Smallest fitted mean allowed for strictly-positive families (Poisson).
pub const MU_MIN_POSITIVE: f64 = 1e-10;

/// Lower clamp for fitted probabilities (Binomial).
pub const MU_MIN_PROBABILITY: f64 = 1e-10;

/// Upper clamp for fitted probabilities (Binomial).
pub const MU_MAX_PROBABILITY: f64 = 1.0 - 1e-10;

/// Largest argument passed to `exp` when inverting a log link.
/// Beyond this the result overflows f64; the fit is hopeless anyway.
pub const MAX_EXP_ARG: f64 = 700.0;

/// Upper clip for IRLS working weights. Near-degenerate observations
/// otherwise dominate the normal equations.
pub const WEIGHT_CLIP_MAX: f64 = 1e10;
