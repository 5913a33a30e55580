// =============================================================================
// Catalog Ingestion and Cleaning
// =============================================================================
//
// The report reads a single CSV: a significant-earthquake catalog in the
// NOAA column naming (EQ_PRIMARY is the primary magnitude, FOCAL_DEPTH is
// in kilometres, DEATHS and HOUSES_DESTROYED are event totals). Every
// other column in the file is discarded.
//
// CLEANING RULES
// --------------
// Applied once, in row order, to form a single complete-case table:
//
//   - a missing DEATHS value is treated as zero (catalogs leave the field
//     blank when no deaths were reported)
//   - a missing or non-finite magnitude, focal depth, or houses-destroyed
//     value drops the whole record
//
// The fatality flag is derived afterwards: fatal = (deaths >= 1).
// The resulting catalog is built once and never mutated again; all six
// models read from the same table.
//
// =============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use ndarray::Array1;
use serde::Deserialize;
use tracing::info;

/// Columns the analysis needs. The loader refuses to run without them; a
/// catalog export that renamed one of these would otherwise decode every
/// row to "missing" and silently drop the lot.
const REQUIRED_COLUMNS: [&str; 4] = ["EQ_PRIMARY", "FOCAL_DEPTH", "DEATHS", "HOUSES_DESTROYED"];

/// One raw catalog row, straight out of the CSV.
///
/// Every field is optional because the catalog is sparse: historical
/// records often lack a depth or a damage count. The cleaning pass decides
/// what each missing value means.
#[derive(Debug, Deserialize)]
pub struct CatalogRow {
    #[serde(rename = "YEAR", default)]
    pub year: Option<i32>,
    #[serde(rename = "LOCATION_NAME", default)]
    pub location_name: Option<String>,
    #[serde(rename = "EQ_PRIMARY", default)]
    pub eq_primary: Option<f64>,
    #[serde(rename = "FOCAL_DEPTH", default)]
    pub focal_depth: Option<f64>,
    #[serde(rename = "DEATHS", default)]
    pub deaths: Option<f64>,
    #[serde(rename = "HOUSES_DESTROYED", default)]
    pub houses_destroyed: Option<f64>,
}

/// The cleaned, complete-case analysis table.
///
/// All vectors share one length; `fatal` is derived from `deaths` and is
/// the response of the logit models.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub magnitude: Array1<f64>,
    pub focal_depth: Array1<f64>,
    pub houses_destroyed: Array1<f64>,
    pub deaths: Array1<f64>,
    pub fatal: Vec<bool>,
    /// Event years where the catalog records them; kept only for the
    /// report's data section.
    pub years: Vec<Option<i32>>,
}

/// What the cleaning pass did, for the report's data section.
#[derive(Debug, Clone, Default)]
pub struct CleaningSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Records whose missing death count was treated as zero.
    pub deaths_imputed: usize,
    pub dropped_missing_magnitude: usize,
    pub dropped_missing_focal_depth: usize,
    pub dropped_missing_houses: usize,
}

impl CleaningSummary {
    pub fn rows_dropped(&self) -> usize {
        self.dropped_missing_magnitude + self.dropped_missing_focal_depth + self.dropped_missing_houses
    }
}

/// Per-field descriptive statistics for the data section.
#[derive(Debug, Clone)]
pub struct FieldSummary {
    pub label: &'static str,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

/// Descriptive overview of the cleaned catalog.
#[derive(Debug, Clone)]
pub struct CatalogDescription {
    pub n: usize,
    pub fatal_count: usize,
    pub fatal_share: f64,
    pub year_span: Option<(i32, i32)>,
    pub fields: Vec<FieldSummary>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.deaths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deaths.is_empty()
    }

    /// The fatality flag as a 0/1 response vector.
    pub fn fatal_as_f64(&self) -> Array1<f64> {
        self.fatal.iter().map(|&f| if f { 1.0 } else { 0.0 }).collect()
    }

    /// Look up an analysis column by the name it carries in model
    /// formulas. Returns `None` for anything the catalog does not have.
    pub fn column(&self, name: &str) -> Option<Array1<f64>> {
        match name {
            "magnitude" => Some(self.magnitude.clone()),
            "focal_depth" => Some(self.focal_depth.clone()),
            "houses_destroyed" => Some(self.houses_destroyed.clone()),
            "deaths" => Some(self.deaths.clone()),
            "fatal" => Some(self.fatal_as_f64()),
            _ => None,
        }
    }

    /// Min/mean/max per field plus the fatal share, for the report's
    /// data section.
    pub fn describe(&self) -> CatalogDescription {
        let fatal_count = self.fatal.iter().filter(|&&f| f).count();
        let n = self.len();
        let year_span = self
            .years
            .iter()
            .flatten()
            .fold(None, |span: Option<(i32, i32)>, &y| match span {
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
                None => Some((y, y)),
            });

        CatalogDescription {
            n,
            fatal_count,
            fatal_share: if n == 0 { 0.0 } else { fatal_count as f64 / n as f64 },
            year_span,
            fields: vec![
                field_summary("magnitude", &self.magnitude),
                field_summary("focal depth (km)", &self.focal_depth),
                field_summary("deaths", &self.deaths),
                field_summary("houses destroyed", &self.houses_destroyed),
            ],
        }
    }
}

fn field_summary(label: &'static str, values: &Array1<f64>) -> FieldSummary {
    FieldSummary {
        label,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        mean: values.mean().unwrap_or(f64::NAN),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// A present, finite value - anything else counts as missing.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Read and clean a catalog from an open reader.
///
/// The header must contain all four analysis columns; unknown columns are
/// ignored. Rows are then cleaned per the rules at the top of this file.
pub fn read_catalog<R: Read>(reader: R) -> Result<(Catalog, CleaningSummary)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("reading catalog header")?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .collect();
    if !missing.is_empty() {
        bail!("catalog is missing required columns: {}", missing.join(", "));
    }

    let mut summary = CleaningSummary::default();
    let mut magnitude = Vec::new();
    let mut focal_depth = Vec::new();
    let mut houses_destroyed = Vec::new();
    let mut deaths = Vec::new();
    let mut fatal = Vec::new();
    let mut years = Vec::new();

    for (i, result) in rdr.deserialize::<CatalogRow>().enumerate() {
        // i + 2: one for the header line, one for 1-based numbering.
        let row = result.with_context(|| format!("decoding catalog row at line {}", i + 2))?;
        summary.rows_read += 1;

        // A record missing several predictors is counted once, against
        // the first missing column in this order.
        let Some(mag) = finite(row.eq_primary) else {
            summary.dropped_missing_magnitude += 1;
            continue;
        };
        let Some(depth) = finite(row.focal_depth) else {
            summary.dropped_missing_focal_depth += 1;
            continue;
        };
        let Some(houses) = finite(row.houses_destroyed) else {
            summary.dropped_missing_houses += 1;
            continue;
        };

        let toll = match finite(row.deaths) {
            Some(d) => d,
            None => {
                summary.deaths_imputed += 1;
                0.0
            }
        };

        magnitude.push(mag);
        focal_depth.push(depth);
        houses_destroyed.push(houses);
        deaths.push(toll);
        fatal.push(toll >= 1.0);
        years.push(row.year);
        summary.rows_kept += 1;
    }

    ensure!(
        summary.rows_kept > 0,
        "no usable records: all {} rows were dropped during cleaning",
        summary.rows_read
    );

    Ok((
        Catalog {
            magnitude: Array1::from_vec(magnitude),
            focal_depth: Array1::from_vec(focal_depth),
            houses_destroyed: Array1::from_vec(houses_destroyed),
            deaths: Array1::from_vec(deaths),
            fatal,
            years,
        },
        summary,
    ))
}

/// Open and read a catalog file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<(Catalog, CleaningSummary)> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("opening catalog {}", path.display()))?;
    let (catalog, summary) = read_catalog(file)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    info!(
        rows_read = summary.rows_read,
        rows_kept = summary.rows_kept,
        deaths_imputed = summary.deaths_imputed,
        "catalog cleaned"
    );
    Ok((catalog, summary))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const HEADER: &str = "YEAR,COUNTRY,LOCATION_NAME,EQ_PRIMARY,FOCAL_DEPTH,DEATHS,HOUSES_DESTROYED";

    fn catalog_from(rows: &[&str]) -> Result<(Catalog, CleaningSummary)> {
        let text = format!("{}\n{}\n", HEADER, rows.join("\n"));
        read_catalog(text.as_bytes())
    }

    #[test]
    fn missing_deaths_become_zero_and_are_counted() {
        let (catalog, summary) = catalog_from(&[
            "1906,USA,SAN FRANCISCO,7.9,10,3000,28000",
            "1950,CHILE,COASTAL,6.1,35,,0",
        ])
        .unwrap();

        assert_eq!(summary.rows_read, 2);
        assert_eq!(summary.rows_kept, 2);
        assert_eq!(summary.deaths_imputed, 1);
        assert_abs_diff_eq!(catalog.deaths[1], 0.0);
        assert_eq!(catalog.fatal, vec![true, false]);
    }

    #[test]
    fn missing_predictors_drop_the_record() {
        let (catalog, summary) = catalog_from(&[
            "1906,USA,SAN FRANCISCO,7.9,10,3000,28000",
            "1911,XX,NO MAGNITUDE,,25,12,40",
            "1912,XX,NO DEPTH,6.5,,12,40",
            "1913,XX,NO HOUSES,6.5,25,12,",
        ])
        .unwrap();

        assert_eq!(summary.rows_read, 4);
        assert_eq!(summary.rows_kept, 1);
        assert_eq!(summary.dropped_missing_magnitude, 1);
        assert_eq!(summary.dropped_missing_focal_depth, 1);
        assert_eq!(summary.dropped_missing_houses, 1);
        assert_eq!(summary.rows_dropped(), 3);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn row_missing_everything_counts_once_against_magnitude() {
        let (_, summary) = catalog_from(&[
            "1906,USA,SAN FRANCISCO,7.9,10,3000,28000",
            "1911,XX,EMPTY,,,,",
        ])
        .unwrap();

        assert_eq!(summary.dropped_missing_magnitude, 1);
        assert_eq!(summary.dropped_missing_focal_depth, 0);
        assert_eq!(summary.dropped_missing_houses, 0);
    }

    #[test]
    fn fatality_flag_requires_at_least_one_death() {
        let (catalog, _) = catalog_from(&[
            "2000,A,ZERO,6.0,10,0,5",
            "2001,B,ONE,6.0,10,1,5",
            "2002,C,MANY,6.0,10,250,5",
        ])
        .unwrap();
        assert_eq!(catalog.fatal, vec![false, true, true]);
    }

    #[test]
    fn missing_required_column_is_a_hard_error() {
        let text = "YEAR,EQ_PRIMARY,FOCAL_DEPTH,DEATHS\n1906,7.9,10,3000\n";
        let err = read_catalog(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("HOUSES_DESTROYED"));
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let text = "YEAR,EQ_PRIMARY,FOCAL_DEPTH,DEATHS,HOUSES_DESTROYED,FLAG_TSUNAMI,REGION_CODE\n\
                    1960,9.5,25,1655,58622,Tsu,160\n";
        let (catalog, _) = read_catalog(text.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_abs_diff_eq!(catalog.magnitude[0], 9.5);
    }

    #[test]
    fn all_rows_dropped_is_an_error() {
        let result = catalog_from(&["1911,XX,NO MAGNITUDE,,25,12,40"]);
        assert!(result.is_err());
    }

    #[test]
    fn column_lookup_covers_responses_and_predictors() {
        let (catalog, _) = catalog_from(&[
            "2000,A,ZERO,6.0,10,0,5",
            "2001,B,ONE,7.0,20,3,50",
        ])
        .unwrap();

        let fatal = catalog.column("fatal").unwrap();
        assert_abs_diff_eq!(fatal[0], 0.0);
        assert_abs_diff_eq!(fatal[1], 1.0);
        assert!(catalog.column("magnitude").is_some());
        assert!(catalog.column("focal_depth").is_some());
        assert!(catalog.column("houses_destroyed").is_some());
        assert!(catalog.column("deaths").is_some());
        assert!(catalog.column("tsunami").is_none());
    }

    #[test]
    fn describe_reports_span_and_fatal_share() {
        let (catalog, _) = catalog_from(&[
            "1900,A,FIRST,6.0,10,0,5",
            "1950,B,MIDDLE,7.0,20,3,50",
            "2000,C,LAST,8.0,30,10,500",
            ",D,NO YEAR,6.5,15,0,0",
        ])
        .unwrap();

        let d = catalog.describe();
        assert_eq!(d.n, 4);
        assert_eq!(d.fatal_count, 2);
        assert_abs_diff_eq!(d.fatal_share, 0.5);
        assert_eq!(d.year_span, Some((1900, 2000)));

        let magnitude = &d.fields[0];
        assert_abs_diff_eq!(magnitude.min, 6.0);
        assert_abs_diff_eq!(magnitude.max, 8.0);
        assert_abs_diff_eq!(magnitude.mean, 27.5 / 4.0);
    }
}
