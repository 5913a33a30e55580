// =============================================================================
// HTML Report Rendering
// =============================================================================
//
// The report document: a banner, then four linear sections.
//
//   1. Data          - cleaning summary, descriptive table, data plots
//   2. Logit models  - coefficient tables, fitted curves, residuals, prose
//   3. Poisson models- same shape as the logit section
//   4. Notes         - definitions, cleaning rules, reading guidance
//
// `Report` and `ReportSection` are plain containers: a section collects
// markup blocks and plots in order, the report renders its sections in
// order. Plots are embedded inline and need the plotly runtime, which the
// document head pulls from the CDN.
//
// =============================================================================

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

use crate::data::{Catalog, CatalogDescription, CleaningSummary};
use crate::interpret;
use crate::models::{FittedModel, ModelFamily, ModelSummary};
use crate::plots;
use crate::summary::format_pvalue;

const STYLE: &str = "
    body {
        font-family: Arial, sans-serif;
        margin: 0;
        background: #fafafa;
        color: #222;
    }
    main {
        max-width: 960px;
        margin: 0 auto;
        padding: 0 20px 60px 20px;
    }
    .banner {
        padding: 24px 20px;
        background: linear-gradient(135deg, #4a90e2, #145da0);
        color: white;
        margin-bottom: 24px;
    }
    .banner h1 {
        margin: 0;
        font-size: 34px;
    }
    .banner p {
        margin: 4px 0 0 0;
        opacity: 0.85;
    }
    h2 {
        border-bottom: 2px solid #145da0;
        padding-bottom: 4px;
        margin-top: 40px;
    }
    h3 {
        margin-top: 28px;
    }
    table {
        border-collapse: collapse;
        margin: 12px 0;
    }
    th, td {
        padding: 5px 12px;
        text-align: right;
    }
    th {
        border-bottom: 2px solid #888;
    }
    th:first-child, td:first-child {
        text-align: left;
    }
    tbody tr:nth-child(even) {
        background: #f0f4f8;
    }
    .note {
        color: #555;
        font-size: 0.9em;
    }
    code {
        background: #eef2f6;
        padding: 1px 4px;
    }
";

// =============================================================================
// Containers
// =============================================================================

/// One titled section of the report, holding markup blocks and plots in
/// insertion order.
pub struct ReportSection {
    title: String,
    content_blocks: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            content_blocks: Vec::new(),
        }
    }

    /// Add a block of content (text, a table, any markup).
    pub fn add_content(&mut self, content: Markup) {
        self.content_blocks.push(content);
    }

    /// Add a plot, embedded inline.
    pub fn add_plot(&mut self, plot: Plot) {
        self.content_blocks.push(html! {
            div style="width: 860px; height: 480px;" {
                (PreEscaped(plot.to_inline_html(None)))
            }
        });
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content_blocks {
                    (block)
                }
            }
        }
    }
}

/// The whole document: banner metadata plus sections.
pub struct Report {
    software_name: String,
    version: String,
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(software_name: &str, version: &str, title: &str) -> Self {
        Report {
            software_name: software_name.to_string(),
            version: version.to_string(),
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    fn render(&self) -> Markup {
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src="https://cdn.plot.ly/plotly-latest.min.js" {}
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    div class="banner" {
                        h1 { (self.title) }
                        p { (self.software_name) " v" (self.version) }
                        p { "Generated on " (generated) }
                    }
                    main {
                        @for section in &self.sections {
                            (section.render())
                        }
                    }
                }
            }
        }
    }

    /// Write the standalone HTML document.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(self.render().into_string().as_bytes())?;
        Ok(())
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Adaptive numeric formatting for table cells.
fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        "NA".to_string()
    } else if v == 0.0 {
        "0".to_string()
    } else if v.abs() >= 1000.0 {
        format!("{:.0}", v)
    } else if v.abs() >= 1.0 {
        format!("{:.3}", v)
    } else {
        format!("{:.4}", v)
    }
}

fn coefficient_table(summary: &ModelSummary) -> Markup {
    html! {
        table {
            thead {
                tr {
                    th { "Term" }
                    th { "Estimate" }
                    th { "Std. error" }
                    th { "z" }
                    th { "Pr(>|z|)" }
                    th {}
                    th { "95% CI" }
                }
            }
            tbody {
                @for row in &summary.coefficients {
                    tr {
                        td { (row.term) }
                        td { (fmt_num(row.estimate)) }
                        td { (fmt_num(row.std_error)) }
                        td { (fmt_num(row.z_value)) }
                        td { (format_pvalue(row.p_value)) }
                        td { (row.stars) }
                        td { (fmt_num(row.conf_low)) " to " (fmt_num(row.conf_high)) }
                    }
                }
            }
        }
        p class="note" {
            "n = " (summary.n)
            ", residual deviance " (fmt_num(summary.deviance))
            " on " (summary.df_residual) " df (null " (fmt_num(summary.null_deviance))
            " on " (summary.df_null) " df), AIC " (fmt_num(summary.aic))
            ", Pearson dispersion " (fmt_num(summary.dispersion)) "."
            @if !summary.converged {
                " IRLS did not converge within " (summary.iterations) " iterations."
            }
        }
    }
}

fn descriptive_table(description: &CatalogDescription) -> Markup {
    html! {
        table {
            thead {
                tr {
                    th { "Field" }
                    th { "Min" }
                    th { "Mean" }
                    th { "Max" }
                }
            }
            tbody {
                @for field in &description.fields {
                    tr {
                        td { (field.label) }
                        td { (fmt_num(field.min)) }
                        td { (fmt_num(field.mean)) }
                        td { (fmt_num(field.max)) }
                    }
                }
            }
        }
    }
}

fn cleaning_block(cleaning: &CleaningSummary) -> Markup {
    html! {
        ul {
            li { "Records read: " (cleaning.rows_read) ", kept after cleaning: " (cleaning.rows_kept) "." }
            li { "Missing death counts treated as zero: " (cleaning.deaths_imputed) "." }
            li {
                "Records dropped for a missing value: magnitude " (cleaning.dropped_missing_magnitude)
                ", focal depth " (cleaning.dropped_missing_focal_depth)
                ", houses destroyed " (cleaning.dropped_missing_houses) "."
            }
        }
    }
}

// =============================================================================
// Assembly
// =============================================================================

fn data_section(catalog: &Catalog, cleaning: &CleaningSummary) -> ReportSection {
    let description = catalog.describe();
    let mut section = ReportSection::new("Data");

    let span = match description.year_span {
        Some((lo, hi)) => format!(" spanning {} to {}", lo, hi),
        None => String::new(),
    };
    section.add_content(html! {
        p {
            "The cleaned catalog holds " (description.n) " earthquakes" (span) ". "
            (description.fatal_count) " of them ("
            (format!("{:.0}%", 100.0 * description.fatal_share))
            ") killed at least one person."
        }
    });
    section.add_content(cleaning_block(cleaning));
    section.add_content(descriptive_table(&description));
    section.add_plot(plots::magnitude_histogram(catalog));
    section.add_plot(plots::deaths_scatter(catalog));
    section.add_content(html! {
        p class="note" {
            "The scatter shows fatal events only; zero-death records cannot \
             sit on the log axis."
        }
    });
    section
}

fn family_section(
    title: &str,
    intro: &str,
    family: ModelFamily,
    models: &[&FittedModel],
) -> Result<ReportSection> {
    let mut section = ReportSection::new(title);
    section.add_content(html! { p { (intro) } });

    for model in models {
        let s = &model.summary;
        section.add_content(html! { h3 { code { (s.formula) } } });
        section.add_content(coefficient_table(s));
        section.add_content(html! { p { (interpret::model_paragraph(s)) } });
        section.add_plot(plots::fitted_curve(model));
    }

    section.add_plot(plots::residual_plot(models)?);

    let summaries: Vec<&ModelSummary> = models.iter().map(|m| &m.summary).collect();
    section.add_content(html! { p { (interpret::fit_quality_paragraph(family, &summaries)) } });
    section.add_content(html! { p { (interpret::predictor_comparison(family, &summaries)) } });
    Ok(section)
}

fn notes_section() -> ReportSection {
    let mut section = ReportSection::new("Notes");
    section.add_content(html! {
        ul {
            li {
                "Fatality flag: true when an earthquake's recorded death count \
                 is at least one."
            }
            li {
                "Cleaning: a missing death count is treated as zero; a record \
                 missing magnitude, focal depth, or houses destroyed is dropped."
            }
            li {
                "Inference is Wald-z with the dispersion fixed at 1, as the \
                 binomial and Poisson families assume; the Pearson dispersion \
                 is reported per model so that assumption can be checked."
            }
            li {
                "Significance codes: 0 '***' 0.001 '**' 0.01 '*' 0.05 '.' 0.1 ' ' 1."
            }
            li {
                "These are observational associations over a historical \
                 catalog, not causal estimates; reporting of deaths and damage \
                 varies strongly by era and region."
            }
        }
    });
    section
}

/// Assemble the whole document from the cleaned catalog and the six
/// fitted models.
pub fn build_report(
    catalog: &Catalog,
    cleaning: &CleaningSummary,
    models: &[FittedModel],
) -> Result<Report> {
    let mut report = Report::new(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        "Earthquake fatality report",
    );

    report.add_section(data_section(catalog, cleaning));

    let logit: Vec<&FittedModel> = models
        .iter()
        .filter(|m| m.summary.family == ModelFamily::Logit)
        .collect();
    let poisson: Vec<&FittedModel> = models
        .iter()
        .filter(|m| m.summary.family == ModelFamily::Poisson)
        .collect();

    report.add_section(family_section(
        "Fatality odds (logit models)",
        "Binary-outcome models of the fatality flag: each fits the log-odds \
         that an earthquake killed at least one person as a linear function \
         of a single predictor.",
        ModelFamily::Logit,
        &logit,
    )?);
    report.add_section(family_section(
        "Death tolls (Poisson models)",
        "Count models of the recorded death toll: each fits the log of the \
         expected toll as a linear function of a single predictor.",
        ModelFamily::Poisson,
        &poisson,
    )?);
    report.add_section(notes_section());

    Ok(report)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fit_report_models;
    use ndarray::array;

    fn test_catalog() -> Catalog {
        let deaths = array![0.0, 0.0, 0.0, 2.0, 0.0, 8.0, 30.0, 90.0, 200.0, 600.0];
        let fatal = deaths.iter().map(|&d| d >= 1.0).collect();
        Catalog {
            magnitude: array![5.0, 5.5, 6.0, 6.2, 6.5, 7.0, 7.4, 7.8, 8.2, 8.6],
            focal_depth: array![12.0, 140.0, 33.0, 20.0, 90.0, 25.0, 15.0, 40.0, 22.0, 30.0],
            houses_destroyed: array![0.0, 0.0, 3.0, 12.0, 1.0, 80.0, 250.0, 700.0, 1500.0, 4000.0],
            deaths,
            fatal,
            years: vec![Some(1900), Some(1950), None, Some(1960), None, Some(1970), Some(1980), Some(1990), Some(2000), Some(2010)],
        }
    }

    #[test]
    fn coefficient_table_lists_every_term() {
        let catalog = test_catalog();
        let models = fit_report_models(&catalog).unwrap();
        let table = coefficient_table(&models[0].summary).into_string();
        assert!(table.contains("(Intercept)"));
        assert!(table.contains("magnitude"));
        assert!(table.contains("95% CI"));
        assert!(table.contains("Pearson dispersion"));
    }

    #[test]
    fn report_document_holds_all_sections_and_models() {
        let catalog = test_catalog();
        let cleaning = CleaningSummary {
            rows_read: 12,
            rows_kept: 10,
            deaths_imputed: 4,
            dropped_missing_magnitude: 1,
            dropped_missing_focal_depth: 1,
            dropped_missing_houses: 0,
        };
        let models = fit_report_models(&catalog).unwrap();
        let report = build_report(&catalog, &cleaning, &models).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");
        report.save_to_file(&path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Earthquake fatality report"));
        assert!(html.contains("Fatality odds (logit models)"));
        assert!(html.contains("Death tolls (Poisson models)"));
        assert!(html.contains("fatal ~ magnitude"));
        assert!(html.contains("deaths ~ houses_destroyed"));
        assert!(html.contains("cdn.plot.ly"));
        assert!(html.contains("spanning 1900 to 2010"));
        // Two data figures, six fitted curves, and two residual figures
        // each get one fixed-size wrapper div.
        assert_eq!(html.matches("width: 860px; height: 480px;").count(), 10);
    }

    #[test]
    fn sections_render_in_insertion_order() {
        let mut report = Report::new("quakestats", "0.1.0", "Order check");
        report.add_section(ReportSection::new("First"));
        report.add_section(ReportSection::new("Second"));

        let html = report.render().into_string();
        let first = html.find("First").unwrap();
        let second = html.find("Second").unwrap();
        assert!(first < second);
    }
}
