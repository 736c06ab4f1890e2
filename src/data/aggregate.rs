use std::collections::BTreeMap;

use log::debug;

use super::model::{ColumnRole, MeasurementRow, MeasurementTable};
use super::stats::mean_present;

// ---------------------------------------------------------------------------
// Day aggregation
// ---------------------------------------------------------------------------

/// Integer day of an epoch (truncated toward zero).
pub fn day_of(epoch: f64) -> i64 {
    epoch.trunc() as i64
}

/// Collapse all rows sharing an integer epoch into one row.
///
/// For every column in `columns` the output holds the mean of that day's
/// present values (`None` if the day has none). Columns not listed are
/// `None`. Output epochs are the integer days, strictly increasing. The band
/// label is taken from the day's first row; callers pass a single-band
/// subset.
pub fn aggregate_days(table: &MeasurementTable, columns: &[ColumnRole]) -> MeasurementTable {
    let mut days: BTreeMap<i64, Vec<&MeasurementRow>> = BTreeMap::new();
    for row in &table.rows {
        days.entry(day_of(row.epoch)).or_default().push(row);
    }

    let star_count = table.star_count();
    let rows: Vec<MeasurementRow> = days
        .into_iter()
        .map(|(day, same_day)| {
            let mut out = MeasurementRow {
                epoch: day as f64,
                filter: same_day[0].filter.clone(),
                magnitudes: vec![None; star_count],
                errors: vec![None; star_count],
            };
            for &role in columns {
                let mean = mean_present(same_day.iter().map(|r| r.value(role)));
                if let Some(slot) = out.slot_mut(role) {
                    *slot = mean;
                }
            }
            out
        })
        .collect();

    debug!("Aggregated {} rows into {} days", table.len(), rows.len());
    MeasurementTable::new(std::sync::Arc::clone(&table.schema), rows)
}

/// [`aggregate_days`] over every magnitude and error column.
pub fn aggregate_all_days(table: &MeasurementTable) -> MeasurementTable {
    aggregate_days(table, &table.schema.value_roles())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::IdentifierList;
    use crate::data::schema::ColumnSchema;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn schema(n: usize) -> Arc<ColumnSchema> {
        let ids = IdentifierList::new((0..n).map(|i| i.to_string()));
        Arc::new(ColumnSchema::resolve(&ids).unwrap())
    }

    fn row(epoch: f64, mags: &[Option<f64>]) -> MeasurementRow {
        MeasurementRow {
            epoch,
            filter: "B".to_string(),
            magnitudes: mags.to_vec(),
            errors: mags.iter().map(|m| m.map(|_| 0.01)).collect(),
        }
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn same_day_measurements_are_averaged() {
        let table = MeasurementTable::new(
            schema(3),
            vec![
                row(58000.1, &[Some(10.0), Some(11.0), Some(12.0)]),
                row(58000.6, &[Some(10.2), Some(11.0), None]),
            ],
        );
        let days = aggregate_all_days(&table);

        assert_eq!(days.len(), 1);
        let r = &days.rows[0];
        assert_eq!(r.epoch, 58000.0);
        assert_eq!(r.filter, "B");
        assert!(close(r.magnitudes[0], 10.1));
        assert!(close(r.magnitudes[1], 11.0));
        assert!(close(r.magnitudes[2], 12.0));
        assert!(close(r.errors[2], 0.01));
    }

    #[test]
    fn all_missing_day_stays_missing() {
        let table = MeasurementTable::new(
            schema(2),
            vec![
                row(58000.2, &[Some(10.0), None]),
                row(58000.3, &[Some(10.4), None]),
                row(58001.9, &[None, Some(11.0)]),
            ],
        );
        let days = aggregate_all_days(&table);
        assert_eq!(days.len(), 2);
        assert_eq!(days.rows[0].magnitudes[1], None);
        assert_eq!(days.rows[0].errors[1], None);
        assert_eq!(days.rows[1].magnitudes[0], None);
        assert!(close(days.rows[1].magnitudes[1], 11.0));
    }

    #[test]
    fn unlisted_columns_are_left_missing() {
        let table = MeasurementTable::new(schema(2), vec![row(58000.2, &[Some(10.0), Some(11.0)])]);
        let days = aggregate_days(&table, &[ColumnRole::Magnitude(1)]);
        let r = &days.rows[0];
        assert_eq!(r.magnitudes, vec![None, Some(11.0)]);
        assert_eq!(r.errors, vec![None, None]);
    }

    #[test]
    fn day_is_truncated_not_rounded() {
        assert_eq!(day_of(58000.99), 58000);
        assert_eq!(day_of(58001.0), 58001);
    }

    fn arb_table() -> impl Strategy<Value = MeasurementTable> {
        prop::collection::vec(
            (
                58000.0f64..58020.0,
                prop::collection::vec(prop::option::of(8.0f64..16.0), 3),
            ),
            0..60,
        )
        .prop_map(|raw| {
            let rows = raw.iter().map(|(e, mags)| row(*e, mags)).collect();
            MeasurementTable::new(schema(3), rows).sorted_by_epoch()
        })
    }

    proptest! {
        #[test]
        fn output_epochs_are_strictly_increasing_integers(table in arb_table()) {
            let days = aggregate_all_days(&table);
            prop_assert!(days.rows.iter().all(|r| r.epoch.fract() == 0.0));
            prop_assert!(days.rows.windows(2).all(|w| w[0].epoch < w[1].epoch));
        }

        #[test]
        fn aggregation_is_idempotent(table in arb_table()) {
            let once = aggregate_all_days(&table);
            let twice = aggregate_all_days(&once);
            prop_assert_eq!(once.rows, twice.rows);
        }
    }
}
