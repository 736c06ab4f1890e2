use log::{debug, warn};

use super::config::FilterPolicy;
use super::error::PhotometryError;
use super::model::MeasurementTable;

// ---------------------------------------------------------------------------
// Per-filter subsets
// ---------------------------------------------------------------------------

/// Rows of one filter band, sorted by epoch.
#[derive(Debug, Clone)]
pub struct FilterSubset {
    pub band: String,
    pub table: MeasurementTable,
}

/// Result of splitting a table by filter band.
#[derive(Debug, Clone)]
pub struct FilterPartition {
    /// Non-empty subsets in the order the bands were recognized.
    pub subsets: Vec<FilterSubset>,
    /// Rows whose label was not recognized.
    pub dropped: usize,
}

impl FilterPartition {
    pub fn get(&self, band: &str) -> Option<&MeasurementTable> {
        self.subsets
            .iter()
            .find(|s| s.band == band)
            .map(|s| &s.table)
    }

    pub fn bands(&self) -> Vec<&str> {
        self.subsets.iter().map(|s| s.band.as_str()).collect()
    }

    /// Recombine all subsets into one epoch-sorted table.
    pub fn union(&self, template: &MeasurementTable) -> MeasurementTable {
        let mut out = template.empty_like();
        for subset in &self.subsets {
            out.rows.extend(subset.table.rows.iter().cloned());
        }
        out.sorted_by_epoch()
    }
}

/// Split `table` into one subset per recognized band.
///
/// Rows with any other label are dropped under [`FilterPolicy::Drop`] and
/// abort the split under [`FilterPolicy::Fail`].
pub fn partition(
    table: &MeasurementTable,
    recognized: &[String],
    policy: FilterPolicy,
) -> Result<FilterPartition, PhotometryError> {
    let mut buckets: Vec<MeasurementTable> = recognized.iter().map(|_| table.empty_like()).collect();
    let mut dropped = 0usize;

    for (row_no, row) in table.rows.iter().enumerate() {
        match recognized.iter().position(|band| *band == row.filter) {
            Some(idx) => buckets[idx].rows.push(row.clone()),
            None => match policy {
                FilterPolicy::Drop => dropped += 1,
                FilterPolicy::Fail => {
                    return Err(PhotometryError::UnrecognizedFilter {
                        row: row_no,
                        label: row.filter.clone(),
                    });
                }
            },
        }
    }

    if dropped > 0 {
        warn!("Dropped {dropped} rows with unrecognized filter bands");
    }

    let subsets: Vec<FilterSubset> = recognized
        .iter()
        .zip(buckets)
        .filter(|(_, t)| !t.is_empty())
        .map(|(band, t)| FilterSubset {
            band: band.clone(),
            table: t.sorted_by_epoch(),
        })
        .collect();

    for s in &subsets {
        debug!("Filter {}: {} rows", s.band, s.table.len());
    }

    Ok(FilterPartition { subsets, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{IdentifierList, MeasurementRow};
    use crate::data::schema::ColumnSchema;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn recognized() -> Vec<String> {
        vec!["B".to_string(), "V".to_string(), "R".to_string()]
    }

    fn table(rows: &[(f64, &str, Option<f64>)]) -> MeasurementTable {
        let schema = Arc::new(ColumnSchema::resolve(&IdentifierList::new(["0"])).unwrap());
        let rows = rows
            .iter()
            .map(|&(epoch, filter, mag)| MeasurementRow {
                epoch,
                filter: filter.to_string(),
                magnitudes: vec![mag],
                errors: vec![None],
            })
            .collect();
        MeasurementTable::new(schema, rows).sorted_by_epoch()
    }

    #[test]
    fn splits_by_band_and_drops_unknown() {
        let t = table(&[
            (1.0, "B", Some(10.0)),
            (2.0, "V", Some(9.0)),
            (3.0, "Ha", Some(8.0)),
            (4.0, "B", Some(10.5)),
        ]);
        let parts = partition(&t, &recognized(), FilterPolicy::Drop).unwrap();
        assert_eq!(parts.bands(), vec!["B", "V"]);
        assert_eq!(parts.dropped, 1);
        assert_eq!(parts.get("B").unwrap().len(), 2);
        assert!(parts.get("R").is_none());
        assert!(parts.get("B").unwrap().rows.iter().all(|r| r.filter == "B"));
    }

    #[test]
    fn fail_policy_reports_the_row() {
        let t = table(&[(1.0, "B", None), (2.0, "Ha", None)]);
        let err = partition(&t, &recognized(), FilterPolicy::Fail).unwrap_err();
        assert!(matches!(
            err,
            PhotometryError::UnrecognizedFilter { row: 1, ref label } if label == "Ha"
        ));
    }

    proptest! {
        #[test]
        fn union_of_subsets_restores_recognized_rows(
            raw in prop::collection::vec(
                (58000.0f64..58010.0, 0usize..4, prop::option::of(8.0f64..15.0)),
                0..40,
            )
        ) {
            let labels = ["B", "V", "R", "CN"];
            let rows: Vec<(f64, &str, Option<f64>)> =
                raw.iter().map(|&(e, f, m)| (e, labels[f], m)).collect();
            let t = table(&rows);
            let parts = partition(&t, &recognized(), FilterPolicy::Drop).unwrap();
            let union = parts.union(&t);

            let key = |r: &MeasurementRow| (r.epoch.to_bits(), r.filter.clone(), r.magnitudes[0].map(f64::to_bits));
            let mut expected: Vec<_> = t.rows.iter().filter(|r| r.filter != "CN").map(key).collect();
            let mut actual: Vec<_> = union.rows.iter().map(key).collect();

            prop_assert!(union.is_epoch_sorted());
            prop_assert_eq!(parts.dropped, t.rows.len() - expected.len());
            expected.sort();
            actual.sort();
            prop_assert_eq!(actual, expected);
        }
    }
}
