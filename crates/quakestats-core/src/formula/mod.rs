//! Formula parsing for R-style model specifications.
//!
//! This module parses formulas like "fatal ~ magnitude" into structured
//! components for design matrix construction. The grammar is deliberately
//! small: a response, `+`-separated numeric main effects, and intercept
//! removal via `0 +` or `- 1`. Interactions, categorical markers, and
//! function calls are rejected rather than silently misread.

use crate::error::{Result, StatsError};

/// Result of parsing a formula
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormula {
    pub response: String,
    pub main_effects: Vec<String>,
    pub has_intercept: bool,
}

/// Split the formula RHS on '+', dropping empty pieces.
fn split_terms(rhs: &str) -> Vec<String> {
    rhs.split('+')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parse a formula string into structured components.
///
/// Handles:
/// - Main effects: `y ~ x1 + x2`
/// - Intercept removal: `y ~ 0 + x` or `y ~ x - 1`
/// - Explicit intercept: `y ~ 1`
///
/// # Arguments
/// * `formula` - R-style formula like "deaths ~ magnitude"
///
/// # Errors
/// Returns [`StatsError::Formula`] for a missing or repeated `~`, an empty
/// response or right-hand side, and any term syntax outside the grammar
/// above (interactions, function calls).
pub fn parse_formula(formula: &str) -> Result<ParsedFormula> {
    let parts: Vec<&str> = formula.split('~').collect();
    if parts.len() != 2 {
        return Err(StatsError::Formula(format!(
            "formula must contain exactly one '~': {}",
            formula
        )));
    }

    let response = parts[0].trim().to_string();
    if response.is_empty() {
        return Err(StatsError::Formula(format!(
            "formula has an empty response: {}",
            formula
        )));
    }

    let mut rhs = parts[1].trim().to_string();
    let mut has_intercept = true;

    // Handle "0 +" or "0+"
    if rhs.starts_with("0 +") || rhs.starts_with("0+") {
        has_intercept = false;
        rhs = rhs[if rhs.starts_with("0 +") { 3 } else { 2 }..]
            .trim()
            .to_string();
    }

    // Handle "- 1" or "-1" at end
    if rhs.ends_with("- 1") || rhs.ends_with("-1") {
        has_intercept = false;
        let len = rhs.len();
        rhs = rhs[..len - if rhs.ends_with("- 1") { 3 } else { 2 }]
            .trim()
            .to_string();
        if rhs.ends_with('+') {
            rhs = rhs[..rhs.len() - 1].trim().to_string();
        }
    }

    let mut main_effects = Vec::new();
    for term in split_terms(&rhs) {
        if term == "1" {
            // Explicit intercept; nothing to add.
            continue;
        }
        if term.contains('*') || term.contains(':') {
            return Err(StatsError::Formula(format!(
                "interaction terms are not supported: {}",
                term
            )));
        }
        if term.contains('(') || term.contains(')') {
            return Err(StatsError::Formula(format!(
                "function calls in terms are not supported: {}",
                term
            )));
        }
        if term.contains('-') {
            return Err(StatsError::Formula(format!(
                "unsupported term syntax: {}",
                term
            )));
        }
        if !main_effects.contains(&term) {
            main_effects.push(term);
        }
    }

    if main_effects.is_empty() && !has_intercept {
        return Err(StatsError::Formula(format!(
            "formula has no terms: {}",
            formula
        )));
    }

    Ok(ParsedFormula {
        response,
        main_effects,
        has_intercept,
    })
}
