// =============================================================================
// Console Summaries
// =============================================================================
//
// One R-flavored text block per fitted model, printed to stdout. This is
// product output, not logging: the tracing stream carries progress events,
// stdout carries the tables an analyst actually reads.
//
// =============================================================================

use std::fmt::Write;

use crate::models::ModelSummary;

/// Render the console block for one fitted model.
pub fn render_text(summary: &ModelSummary) -> String {
    let mut out = String::new();

    // write! into a String cannot fail; the Results are dropped.
    let _ = writeln!(
        out,
        "Call: glm({}, family = {}(link = \"{}\"))",
        summary.formula,
        summary.family.label(),
        summary.family.link_label()
    );
    let _ = writeln!(out, "Observations: {}", summary.n);
    let _ = writeln!(out);

    let term_width = summary
        .coefficients
        .iter()
        .map(|row| row.term.len())
        .max()
        .unwrap_or(0)
        .max("(Intercept)".len());

    let _ = writeln!(out, "Coefficients:");
    let _ = writeln!(
        out,
        "{:term_width$}  {:>12}  {:>12}  {:>8}  {:>9}",
        "", "Estimate", "Std. Error", "z value", "Pr(>|z|)"
    );
    for row in &summary.coefficients {
        let _ = writeln!(
            out,
            "{:<term_width$}  {:>12.5}  {:>12.5}  {:>8.3}  {:>9}  {}",
            row.term,
            row.estimate,
            row.std_error,
            row.z_value,
            format_pvalue(row.p_value),
            row.stars
        );
    }
    let _ = writeln!(out, "---");
    let _ = writeln!(
        out,
        "Signif. codes: 0 '***' 0.001 '**' 0.01 '*' 0.05 '.' 0.1 ' ' 1"
    );
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "    Null deviance: {:>10.3}  on {} degrees of freedom",
        summary.null_deviance, summary.df_null
    );
    let _ = writeln!(
        out,
        "Residual deviance: {:>10.3}  on {} degrees of freedom",
        summary.deviance, summary.df_residual
    );
    let _ = writeln!(
        out,
        "AIC: {:.2}    Pearson dispersion: {:.3}",
        summary.aic, summary.dispersion
    );

    if summary.converged {
        let _ = writeln!(out, "Converged after {} IRLS iterations", summary.iterations);
    } else {
        let _ = writeln!(
            out,
            "WARNING: IRLS did not converge within {} iterations",
            summary.iterations
        );
    }

    out
}

/// R-style p-value formatting: tiny values collapse to "<2e-16", small
/// ones use scientific notation, the rest four decimals.
pub(crate) fn format_pvalue(p: f64) -> String {
    if !p.is_finite() {
        "NA".to_string()
    } else if p < 2e-16 {
        "<2e-16".to_string()
    } else if p < 1e-4 {
        format!("{:.2e}", p)
    } else {
        format!("{:.4}", p)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoefficientRow, ModelFamily, ModelSummary};

    fn sample_summary() -> ModelSummary {
        ModelSummary {
            key: "logit_magnitude",
            formula: "fatal ~ magnitude",
            family: ModelFamily::Logit,
            response: "fatal".to_string(),
            predictor: "magnitude".to_string(),
            predictor_unit: "unit of magnitude",
            n: 96,
            coefficients: vec![
                CoefficientRow {
                    term: "(Intercept)".to_string(),
                    estimate: -11.2034,
                    std_error: 2.1441,
                    z_value: -5.225,
                    p_value: 1.7e-7,
                    stars: "***",
                    conf_low: -15.4058,
                    conf_high: -7.0010,
                },
                CoefficientRow {
                    term: "magnitude".to_string(),
                    estimate: 1.6821,
                    std_error: 0.3102,
                    z_value: 5.423,
                    p_value: 5.9e-8,
                    stars: "***",
                    conf_low: 1.0741,
                    conf_high: 2.2901,
                },
            ],
            deviance: 86.46,
            null_deviance: 132.83,
            df_residual: 94,
            df_null: 95,
            log_likelihood: -43.23,
            aic: 90.46,
            dispersion: 1.034,
            iterations: 6,
            converged: true,
        }
    }

    #[test]
    fn block_carries_call_table_and_footer() {
        let text = render_text(&sample_summary());

        assert!(text.contains("glm(fatal ~ magnitude, family = binomial(link = \"logit\"))"));
        assert!(text.contains("Observations: 96"));
        assert!(text.contains("(Intercept)"));
        assert!(text.contains("magnitude"));
        assert!(text.contains("Pr(>|z|)"));
        assert!(text.contains("***"));
        assert!(text.contains("Signif. codes"));
        assert!(text.contains("Null deviance"));
        assert!(text.contains("Residual deviance"));
        assert!(text.contains("AIC: 90.46"));
        assert!(text.contains("Converged after 6 IRLS iterations"));
    }

    #[test]
    fn non_convergence_is_announced() {
        let mut summary = sample_summary();
        summary.converged = false;
        summary.iterations = 25;
        let text = render_text(&summary);
        assert!(text.contains("did not converge within 25 iterations"));
    }

    #[test]
    fn pvalue_formatting_bands() {
        assert_eq!(format_pvalue(1e-20), "<2e-16");
        assert_eq!(format_pvalue(3.4e-7), "3.40e-7");
        assert_eq!(format_pvalue(0.0312), "0.0312");
        assert_eq!(format_pvalue(0.5), "0.5000");
        assert_eq!(format_pvalue(f64::NAN), "NA");
    }
}
