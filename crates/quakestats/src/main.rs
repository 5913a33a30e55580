use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use quakestats::{build_report, fit_report_models, load_catalog, summary};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Fit fatality and death-toll regressions over an earthquake catalog and render an HTML report"
)]
struct Args {
    /// Catalog CSV in the NOAA significant-earthquake column naming.
    #[arg(default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/data/earthquakes.csv"))]
    catalog: PathBuf,

    /// Where to write the HTML report.
    #[arg(long, default_value = "earthquake_report.html")]
    out: PathBuf,

    /// Skip the per-model console summaries.
    #[arg(long)]
    no_summaries: bool,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();

    let (catalog, cleaning) = load_catalog(&args.catalog)?;
    println!(
        "Loaded {} of {} catalog records ({} dropped for missing values, {} missing death counts treated as zero).\n",
        cleaning.rows_kept,
        cleaning.rows_read,
        cleaning.rows_dropped(),
        cleaning.deaths_imputed,
    );

    let models = fit_report_models(&catalog)?;

    if !args.no_summaries {
        for model in &models {
            println!("{}", summary::render_text(&model.summary));
        }
    }

    let report = build_report(&catalog, &cleaning, &models)?;
    report
        .save_to_file(&args.out)
        .with_context(|| format!("writing report to {}", args.out.display()))?;
    info!(path = %args.out.display(), "report written");
    println!("Report written to {}", args.out.display());

    Ok(())
}
