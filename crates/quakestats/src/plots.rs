// =============================================================================
// Diagnostic Plots
// =============================================================================
//
// All figures are plotly objects embedded inline in the HTML report; the
// document pulls the plotly runtime from its CDN, so nothing is written
// to disk besides the report itself.
//
// Four figure kinds:
//
//   - magnitude histograms split by the fatality flag (data section)
//   - death toll against magnitude on a log count axis (data section)
//   - one fitted-curve figure per model: binned observed outcomes plus
//     the curve implied by the coefficients
//   - deviance residuals against fitted values, one figure per family
//     with a trace per predictor
//
// =============================================================================

use anyhow::Result;
use ndarray::Array1;
use plotly::common::{Marker, Mode, Title};
use plotly::layout::{Axis, AxisType, BarMode, Layout};
use plotly::{Histogram, Plot, Scatter};

use quakestats_core::diagnostics::resid_deviance;

use crate::data::Catalog;
use crate::models::{FittedModel, ModelFamily};

/// Bins used for the observed-proportion overlay on logit curve plots.
const PROPORTION_BINS: usize = 10;

/// Grid resolution of every fitted curve.
const CURVE_POINTS: usize = 100;

// =============================================================================
// Data-section figures
// =============================================================================

/// Overlaid magnitude histograms, fatal versus non-fatal events.
pub fn magnitude_histogram(catalog: &Catalog) -> Plot {
    let split = |want: bool| -> Vec<f64> {
        catalog
            .magnitude
            .iter()
            .zip(catalog.fatal.iter())
            .filter(|(_, &fatal)| fatal == want)
            .map(|(&m, _)| m)
            .collect()
    };

    let mut plot = Plot::new();
    plot.add_trace(
        Histogram::new(split(false))
            .name("no recorded deaths")
            .opacity(0.6),
    );
    plot.add_trace(Histogram::new(split(true)).name("fatal").opacity(0.6));
    plot.set_layout(
        Layout::new()
            .title(Title::with_text("Magnitude distribution by outcome"))
            .bar_mode(BarMode::Overlay)
            .x_axis(Axis::new().title(Title::with_text("magnitude")))
            .y_axis(Axis::new().title(Title::with_text("events"))),
    );
    plot
}

/// Death toll against magnitude for fatal events, log count axis.
///
/// Zero-death records cannot sit on a log axis and are omitted; the data
/// section says so next to the figure.
pub fn deaths_scatter(catalog: &Catalog) -> Plot {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (i, &d) in catalog.deaths.iter().enumerate() {
        if d > 0.0 {
            xs.push(catalog.magnitude[i]);
            ys.push(d);
        }
    }

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(xs, ys)
            .mode(Mode::Markers)
            .marker(Marker::new().size(7))
            .name("fatal events"),
    );
    plot.set_layout(
        Layout::new()
            .title(Title::with_text("Death toll against magnitude"))
            .x_axis(Axis::new().title(Title::with_text("magnitude")))
            .y_axis(
                Axis::new()
                    .title(Title::with_text("deaths (log scale)"))
                    .type_(AxisType::Log),
            ),
    );
    plot
}

// =============================================================================
// Model figures
// =============================================================================

/// The response-scale curve implied by a fitted intercept + slope model,
/// evaluated over a grid spanning the observed predictor range.
fn curve(model: &FittedModel, grid: &Array1<f64>) -> Array1<f64> {
    let s = &model.summary;
    let intercept = s
        .coefficients
        .iter()
        .find(|r| r.term == "(Intercept)")
        .map_or(0.0, |r| r.estimate);
    let slope = s.slope().estimate;
    let eta = grid.mapv(|x| intercept + slope * x);
    s.family.link().inverse(&eta)
}

fn predictor_grid(model: &FittedModel) -> Array1<f64> {
    let lo = model.predictor.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = model
        .predictor
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    Array1::linspace(lo, hi, CURVE_POINTS)
}

/// Mean of `y` inside equal-width bins of `x`; empty bins are skipped.
fn binned_means(x: &Array1<f64>, y: &Array1<f64>, bins: usize) -> (Vec<f64>, Vec<f64>) {
    let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return (Vec::new(), Vec::new());
    }

    let width = (hi - lo) / bins as f64;
    let mut sums = vec![0.0; bins];
    let mut counts = vec![0usize; bins];
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let b = (((xi - lo) / width) as usize).min(bins - 1);
        sums[b] += yi;
        counts[b] += 1;
    }

    let mut centers = Vec::new();
    let mut means = Vec::new();
    for b in 0..bins {
        if counts[b] > 0 {
            centers.push(lo + (b as f64 + 0.5) * width);
            means.push(sums[b] / counts[b] as f64);
        }
    }
    (centers, means)
}

/// Observed outcomes and the fitted curve for one model.
///
/// Logit models show binned observed fatality proportions against the
/// fitted probability curve; Poisson models show the raw counts against
/// the fitted mean curve on a log axis.
pub fn fitted_curve(model: &FittedModel) -> Plot {
    let s = &model.summary;
    let grid = predictor_grid(model);
    let fitted = curve(model, &grid);

    let mut plot = Plot::new();
    match s.family {
        ModelFamily::Logit => {
            let (centers, shares) =
                binned_means(&model.predictor, &model.response, PROPORTION_BINS);
            plot.add_trace(
                Scatter::new(centers, shares)
                    .mode(Mode::Markers)
                    .marker(Marker::new().size(9))
                    .name("observed share (binned)"),
            );
            plot.add_trace(
                Scatter::new(grid.to_vec(), fitted.to_vec())
                    .mode(Mode::Lines)
                    .name("fitted probability"),
            );
            plot.set_layout(
                Layout::new()
                    .title(Title::with_text(format!("P(fatal) by {}", s.predictor)))
                    .x_axis(Axis::new().title(Title::with_text(s.predictor.clone())))
                    .y_axis(Axis::new().title(Title::with_text("probability of a fatal outcome"))),
            );
        }
        ModelFamily::Poisson => {
            plot.add_trace(
                Scatter::new(model.predictor.to_vec(), model.response.to_vec())
                    .mode(Mode::Markers)
                    .marker(Marker::new().size(6))
                    .name("observed deaths"),
            );
            plot.add_trace(
                Scatter::new(grid.to_vec(), fitted.to_vec())
                    .mode(Mode::Lines)
                    .name("fitted mean"),
            );
            plot.set_layout(
                Layout::new()
                    .title(Title::with_text(format!("Expected deaths by {}", s.predictor)))
                    .x_axis(Axis::new().title(Title::with_text(s.predictor.clone())))
                    .y_axis(
                        Axis::new()
                            .title(Title::with_text("deaths (log scale)"))
                            .type_(AxisType::Log),
                    ),
            );
        }
    }
    plot
}

/// Deviance residuals against fitted values for every model of one
/// family, one trace per predictor.
pub fn residual_plot(models: &[&FittedModel]) -> Result<Plot> {
    let mut plot = Plot::new();
    let mut family = None;

    for model in models {
        let s = &model.summary;
        family = Some(s.family);
        let residuals = resid_deviance(
            &model.response,
            &model.fit.fitted_values,
            s.family.family().as_ref(),
        )?;
        plot.add_trace(
            Scatter::new(model.fit.fitted_values.to_vec(), residuals.to_vec())
                .mode(Mode::Markers)
                .marker(Marker::new().size(6))
                .name(&s.predictor),
        );
    }

    // Poisson fitted means span orders of magnitude; a log axis keeps the
    // small fits readable.
    let x_axis = match family {
        Some(ModelFamily::Poisson) => Axis::new()
            .title(Title::with_text("fitted value (log scale)"))
            .type_(AxisType::Log),
        _ => Axis::new().title(Title::with_text("fitted value")),
    };

    plot.set_layout(
        Layout::new()
            .title(Title::with_text("Deviance residuals against fitted values"))
            .x_axis(x_axis)
            .y_axis(Axis::new().title(Title::with_text("deviance residual"))),
    );
    Ok(plot)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fit_model, report_models};
    use approx::assert_abs_diff_eq;
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
            years: vec![None; 10],
        }
    }

    #[test]
    fn binned_means_recover_per_bin_averages() {
        let x = array![0.0, 0.1, 0.9, 1.0];
        let y = array![0.0, 1.0, 1.0, 1.0];
        // Two bins over [0, 1]: first holds {0, 0.1}, second {0.9, 1.0}.
        let (centers, means) = binned_means(&x, &y, 2);
        assert_eq!(centers.len(), 2);
        assert_abs_diff_eq!(means[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(means[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn binned_means_on_constant_x_is_empty() {
        let x = array![2.0, 2.0, 2.0];
        let y = array![1.0, 0.0, 1.0];
        let (centers, means) = binned_means(&x, &y, 5);
        assert!(centers.is_empty());
        assert!(means.is_empty());
    }

    #[test]
    fn histogram_figure_holds_both_outcome_groups() {
        let html = magnitude_histogram(&test_catalog()).to_inline_html(None);
        assert!(html.contains("histogram"));
        assert!(html.contains("fatal"));
        assert!(html.contains("no recorded deaths"));
    }

    #[test]
    fn scatter_figure_omits_zero_death_records() {
        let html = deaths_scatter(&test_catalog()).to_inline_html(None);
        assert!(html.contains("scatter"));
        // The largest toll survives the positive-deaths filter.
        assert!(html.contains("600"));
    }

    #[test]
    fn logit_curve_stays_inside_the_unit_interval() {
        let catalog = test_catalog();
        let model = fit_model(&catalog, &report_models()[0]).unwrap();
        let grid = predictor_grid(&model);
        let values = curve(&model, &grid);
        assert!(values.iter().all(|&v| (0.0..=1.0).contains(&v)));

        let html = fitted_curve(&model).to_inline_html(None);
        assert!(html.contains("fitted probability"));
    }

    #[test]
    fn poisson_curve_figure_renders_with_both_traces() {
        let catalog = test_catalog();
        let spec = report_models()
            .into_iter()
            .find(|s| s.key == "poisson_magnitude")
            .unwrap();
        let model = fit_model(&catalog, &spec).unwrap();
        let html = fitted_curve(&model).to_inline_html(None);
        assert!(html.contains("observed deaths"));
        assert!(html.contains("fitted mean"));
    }

    #[test]
    fn residual_figure_carries_one_trace_per_predictor() {
        let catalog = test_catalog();
        let models: Vec<_> = report_models()
            .iter()
            .filter(|s| s.family == ModelFamily::Logit)
            .map(|s| fit_model(&catalog, s).unwrap())
            .collect();
        let refs: Vec<&FittedModel> = models.iter().collect();

        let html = residual_plot(&refs).unwrap().to_inline_html(None);
        assert!(html.contains("magnitude"));
        assert!(html.contains("focal_depth"));
        assert!(html.contains("houses_destroyed"));
    }
}
