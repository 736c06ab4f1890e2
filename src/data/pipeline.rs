use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use log::info;

use super::aggregate::aggregate_all_days;
use super::config::PipelineConfig;
use super::differential::{object_vs_references, references_vs_rest, DifferentialSeries};
use super::error::PhotometryError;
use super::filter::partition;
use super::loader::{load_identifiers, load_measurements};
use super::model::MeasurementTable;
use super::schema::ColumnSchema;

// ---------------------------------------------------------------------------
// Stage composition
// ---------------------------------------------------------------------------

/// Everything derived for one filter band.
#[derive(Debug, Clone)]
pub struct FilterCurves {
    pub band: String,
    /// Subset the differentials were computed from (day-aggregated or raw).
    pub table: MeasurementTable,
    pub object: DifferentialSeries,
    /// One series per reference star, in identifier order.
    pub references: Vec<DifferentialSeries>,
}

#[derive(Debug, Clone)]
pub struct LightCurves {
    pub filters: Vec<FilterCurves>,
    /// Rows left out because their filter band was not recognized.
    pub dropped_rows: usize,
    pub day_aggregated: bool,
}

impl LightCurves {
    pub fn band(&self, band: &str) -> Option<&FilterCurves> {
        self.filters.iter().find(|f| f.band == band)
    }
}

/// Identifier file → schema → typed, sorted measurement table.
pub fn load_table(
    identifiers: &Path,
    measurements: &Path,
    config: &PipelineConfig,
) -> anyhow::Result<MeasurementTable> {
    let ids = load_identifiers(identifiers, config)?;
    let schema = ColumnSchema::resolve(&ids)
        .map_err(PhotometryError::from)
        .with_context(|| format!("resolving columns for identifiers in {}", identifiers.display()))?;
    load_measurements(measurements, Arc::new(schema), config)
}

/// Partition by band, optionally aggregate days, then compute the object
/// and per-reference differential series of every band.
pub fn build_light_curves(
    table: &MeasurementTable,
    config: &PipelineConfig,
) -> Result<LightCurves, PhotometryError> {
    let parts = partition(table, &config.filters, config.unrecognized_filter)?;

    let filters: Vec<FilterCurves> = parts
        .subsets
        .into_iter()
        .map(|subset| {
            let series = if config.aggregate_days {
                aggregate_all_days(&subset.table)
            } else {
                subset.table
            };
            FilterCurves {
                object: object_vs_references(&series),
                references: references_vs_rest(&series),
                band: subset.band,
                table: series,
            }
        })
        .collect();

    info!(
        "Built light curves for bands {:?} ({} rows dropped, day aggregation {})",
        filters.iter().map(|f| f.band.as_str()).collect::<Vec<_>>(),
        parts.dropped,
        if config.aggregate_days { "on" } else { "off" }
    );

    Ok(LightCurves {
        filters,
        dropped_rows: parts.dropped,
        day_aggregated: config.aggregate_days,
    })
}
