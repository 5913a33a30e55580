// =============================================================================
// Interpretation Prose
// =============================================================================
//
// The narrative half of the report: short deterministic paragraphs built
// from the fitted summaries. Every number in the text comes straight out
// of a ModelSummary; this module only chooses words around them.
//
// Logit slopes are phrased as odds ratios (exp of the coefficient),
// Poisson slopes as rate ratios on the expected death toll. Fit quality
// is narrated from the deviance reduction against the null model and the
// Pearson dispersion - the latter is where the overdispersion of real
// death counts shows up.
//
// =============================================================================

use crate::models::{ModelFamily, ModelSummary};

/// Pearson dispersion above this is called out as overdispersion.
const OVERDISPERSION_FLAG: f64 = 2.0;

fn predictor_name(summary: &ModelSummary) -> String {
    summary.predictor.replace('_', " ")
}

fn format_ratio(r: f64) -> String {
    if !r.is_finite() {
        "NA".to_string()
    } else if (r - 1.0).abs() < 0.005 {
        // Tiny per-unit effects (a single destroyed house) need the
        // extra decimals to show anything at all.
        format!("{:.4}", r)
    } else if r >= 100.0 {
        format!("{:.0}", r)
    } else {
        format!("{:.2}", r)
    }
}

fn significance_phrase(p: f64) -> String {
    if !p.is_finite() {
        "of undetermined significance".to_string()
    } else if p < 0.001 {
        "strongly significant (p < 0.001)".to_string()
    } else if p < 0.05 {
        format!("significant at the 5% level (p = {:.3})", p)
    } else {
        format!("not significant at the 5% level (p = {:.2})", p)
    }
}

/// One paragraph interpreting the slope of a fitted model.
pub fn model_paragraph(summary: &ModelSummary) -> String {
    let slope = summary.slope();
    let ratio = format_ratio(slope.estimate.exp());
    let lo = format_ratio(slope.conf_low.exp());
    let hi = format_ratio(slope.conf_high.exp());
    let significance = significance_phrase(slope.p_value);

    let mut text = match summary.family {
        ModelFamily::Logit => format!(
            "Each additional {} multiplies the odds that an earthquake kills at \
             least one person by {} (95% CI {} to {}); the association is {}.",
            summary.predictor_unit, ratio, lo, hi, significance
        ),
        ModelFamily::Poisson => format!(
            "Each additional {} multiplies the expected death toll by {} \
             (95% CI {} to {}); the association is {}.",
            summary.predictor_unit, ratio, lo, hi, significance
        ),
    };

    if !summary.converged {
        text.push_str(
            " This fit did not converge within the iteration cap, so the \
             estimates should be read with caution.",
        );
    }
    text
}

/// One paragraph on fit quality across a family's three models: deviance
/// removed against the null model, then what the dispersion says about
/// the variance assumption.
pub fn fit_quality_paragraph(family: ModelFamily, summaries: &[&ModelSummary]) -> String {
    let reductions: Vec<String> = summaries
        .iter()
        .map(|s| {
            format!(
                "{} removes {:.0}% of the null deviance",
                predictor_name(s),
                100.0 * s.deviance_explained()
            )
        })
        .collect();

    let max_dispersion = summaries
        .iter()
        .map(|s| s.dispersion)
        .fold(f64::NEG_INFINITY, f64::max);

    let dispersion_sentence = if max_dispersion > OVERDISPERSION_FLAG {
        match family {
            ModelFamily::Poisson => format!(
                "Pearson dispersion estimates run as high as {:.0}, far above the \
                 value of 1 the Poisson family assumes: the death counts are heavily \
                 overdispersed, and the standard errors above overstate the real \
                 precision of these slopes.",
                max_dispersion
            ),
            ModelFamily::Logit => format!(
                "Pearson dispersion reaches {:.1}, above the value of 1 the binomial \
                 family assumes, so the reported standard errors are optimistic.",
                max_dispersion
            ),
        }
    } else {
        format!(
            "Pearson dispersion stays near 1 for all three fits (largest {:.2}), \
             consistent with the {} variance assumption.",
            max_dispersion,
            family.label()
        )
    };

    format!(
        "Against the intercept-only baseline, {}. {}",
        reductions.join(", "),
        dispersion_sentence
    )
}

/// Closing comparison of the three predictors within one family, ordered
/// by AIC.
pub fn predictor_comparison(family: ModelFamily, summaries: &[&ModelSummary]) -> String {
    let mut ranked: Vec<&&ModelSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| a.aic.partial_cmp(&b.aic).unwrap_or(std::cmp::Ordering::Equal));

    let lead_in = match family {
        ModelFamily::Logit => "Among the fatality-odds fits",
        ModelFamily::Poisson => "Among the death-toll fits",
    };

    let ordered: Vec<String> = ranked
        .iter()
        .map(|s| format!("{} (AIC {:.1})", predictor_name(s), s.aic))
        .collect();

    match ordered.as_slice() {
        [] => String::new(),
        [only] => format!("{}, only {} was fitted.", lead_in, only),
        [best, rest @ ..] => format!(
            "{}, {} fits best by AIC, ahead of {}.",
            lead_in,
            best,
            rest.join(" and ")
        ),
    }
}

// =============================================================================
// Tests
// =============================================================================
