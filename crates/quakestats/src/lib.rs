// =============================================================================
// QuakeStats: the earthquake fatality report
// =============================================================================
//
// This crate is the report itself. It reads a significant-earthquake
// catalog, derives a binary fatality flag, fits six generalized linear
// models through `quakestats-core`, prints R-style summaries to the
// console, and renders a standalone HTML document with coefficient
// tables, plots, and interpretation prose.
//
// The flow is one straight line, executed once per run:
//
//     load -> clean -> derive fatality flag -> fit six models
//          -> print summaries -> render report
//
// STRUCTURE:
// ----------
//   - data:      catalog ingestion, cleaning rules, descriptive statistics
//   - models:    the six model specifications and their fitting glue
//   - summary:   R-flavored console output for each fitted model
//   - plots:     plotly figures (histograms, fitted curves, residuals)
//   - interpret: deterministic interpretation prose
//   - render:    the HTML document (maud sections, embedded plots)
//
// No regression arithmetic happens in this crate; every coefficient,
// p-value, and residual comes out of `quakestats-core`.
//
// =============================================================================

pub mod data;
pub mod interpret;
pub mod models;
pub mod plots;
pub mod render;
pub mod summary;

pub use data::{load_catalog, read_catalog, Catalog, CatalogDescription, CleaningSummary};
pub use models::{
    fit_model, fit_report_models, report_models, CoefficientRow, FittedModel, ModelFamily,
    ModelSpec, ModelSummary,
};
pub use render::{build_report, Report, ReportSection};
