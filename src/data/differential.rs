use super::model::{ColumnRole, MeasurementTable, SeriesPoint};
use super::stats::mean_present;

// ---------------------------------------------------------------------------
// Differential series
// ---------------------------------------------------------------------------

/// One row of a differential series. `difference` is always
/// `comparison_mean − subject`; a positive jump means the subject got
/// brighter relative to the comparison stars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialPoint {
    pub epoch: f64,
    pub subject: Option<f64>,
    pub comparison_mean: Option<f64>,
    pub difference: Option<f64>,
    /// Subject error plus the mean error of the contributing comparison stars.
    pub error: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct DifferentialSeries {
    /// Star index of the subject.
    pub subject: usize,
    /// Star indices averaged into the comparison mean.
    pub comparison: Vec<usize>,
    /// Subject identifier, for display.
    pub label: String,
    pub points: Vec<DifferentialPoint>,
}

impl DifferentialSeries {
    /// Rows with a defined difference, as plottable points.
    pub fn plot_points(&self) -> Vec<SeriesPoint> {
        self.points
            .iter()
            .filter_map(|p| {
                Some(SeriesPoint {
                    epoch: p.epoch,
                    value: p.difference?,
                    error: p.error,
                })
            })
            .collect()
    }

    /// Number of rows with a defined difference.
    pub fn defined_len(&self) -> usize {
        self.points.iter().filter(|p| p.difference.is_some()).count()
    }
}

/// Differential series of `subject` against the mean of `comparison`.
///
/// A row's difference is missing when the subject magnitude is missing or
/// none of the comparison magnitudes is present.
pub fn differential(table: &MeasurementTable, subject: usize, comparison: &[usize]) -> DifferentialSeries {
    let points = table
        .rows
        .iter()
        .map(|row| {
            let subject_mag = row.value(ColumnRole::Magnitude(subject));
            let contributing: Vec<usize> = comparison
                .iter()
                .copied()
                .filter(|&s| row.value(ColumnRole::Magnitude(s)).is_some())
                .collect();

            let comparison_mean =
                mean_present(contributing.iter().map(|&s| row.value(ColumnRole::Magnitude(s))));
            let difference = comparison_mean.zip(subject_mag).map(|(mean, mag)| mean - mag);

            let comparison_err =
                mean_present(contributing.iter().map(|&s| row.value(ColumnRole::Error(s))));
            let error = difference
                .and(row.value(ColumnRole::Error(subject)))
                .zip(comparison_err)
                .map(|(a, b)| a + b);

            DifferentialPoint {
                epoch: row.epoch,
                subject: subject_mag,
                comparison_mean,
                difference,
                error,
            }
        })
        .collect();

    DifferentialSeries {
        subject,
        comparison: comparison.to_vec(),
        label: table.schema.label(subject).to_string(),
        points,
    }
}

/// The object of interest against the mean of all reference stars.
pub fn object_vs_references(table: &MeasurementTable) -> DifferentialSeries {
    differential(table, 0, &table.schema.reference_stars())
}

/// Every reference star in turn against the mean of the other references.
pub fn references_vs_rest(table: &MeasurementTable) -> Vec<DifferentialSeries> {
    let references = table.schema.reference_stars();
    references
        .iter()
        .map(|&subject| {
            let rest: Vec<usize> = references.iter().copied().filter(|&s| s != subject).collect();
            differential(table, subject, &rest)
        })
        .collect()
}
