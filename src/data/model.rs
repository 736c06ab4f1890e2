use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::schema::ColumnSchema;

// ---------------------------------------------------------------------------
// IdentifierList – ordered star identifiers of one field
// ---------------------------------------------------------------------------

/// Ordered star identifiers. Position 0 is the object of interest, the rest
/// are reference stars. Tokens are opaque (usually catalogue indices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierList {
    ids: Vec<String>,
}

impl IdentifierList {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifier at `star`, if any.
    pub fn get(&self, star: usize) -> Option<&str> {
        self.ids.get(star).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// ColumnRole – semantic address of a value-bearing column
// ---------------------------------------------------------------------------

/// Which value of which star a column holds. Stages address columns through
/// this role instead of through the on-disk column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnRole {
    Magnitude(usize),
    Error(usize),
}

impl ColumnRole {
    /// Star index this column belongs to.
    pub fn star(self) -> usize {
        match self {
            ColumnRole::Magnitude(s) | ColumnRole::Error(s) => s,
        }
    }
}

// ---------------------------------------------------------------------------
// MeasurementRow – one (epoch, filter) observation of the whole field
// ---------------------------------------------------------------------------

/// One row of the measurement table. `magnitudes[i]` / `errors[i]` belong to
/// identifier `i`; `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRow {
    /// Modified Julian Date.
    pub epoch: f64,
    /// Filter band label (e.g. "B", "V", "R").
    pub filter: String,
    pub magnitudes: Vec<Option<f64>>,
    pub errors: Vec<Option<f64>>,
}

impl MeasurementRow {
    /// Value addressed by `role`, `None` when missing or out of range.
    pub fn value(&self, role: ColumnRole) -> Option<f64> {
        match role {
            ColumnRole::Magnitude(s) => self.magnitudes.get(s).copied().flatten(),
            ColumnRole::Error(s) => self.errors.get(s).copied().flatten(),
        }
    }

    /// Mutable slot addressed by `role`.
    pub fn slot_mut(&mut self, role: ColumnRole) -> Option<&mut Option<f64>> {
        match role {
            ColumnRole::Magnitude(s) => self.magnitudes.get_mut(s),
            ColumnRole::Error(s) => self.errors.get_mut(s),
        }
    }
}

// ---------------------------------------------------------------------------
// SeriesPoint – a plottable (epoch, value, error) triple
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub epoch: f64,
    pub value: f64,
    pub error: Option<f64>,
}

// ---------------------------------------------------------------------------
// MeasurementTable – typed rows sharing one column schema
// ---------------------------------------------------------------------------

/// A typed table of measurements. Tables are values: every stage takes one
/// and returns a new one, the schema is shared between them.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    pub schema: Arc<ColumnSchema>,
    pub rows: Vec<MeasurementRow>,
}

impl MeasurementTable {
    pub fn new(schema: Arc<ColumnSchema>, rows: Vec<MeasurementRow>) -> Self {
        Self { schema, rows }
    }

    /// Same schema, no rows.
    pub fn empty_like(&self) -> Self {
        Self::new(Arc::clone(&self.schema), Vec::new())
    }

    /// Stable sort by ascending epoch. Rows with equal epochs keep their
    /// relative order.
    pub fn sorted_by_epoch(mut self) -> Self {
        self.rows.sort_by(|a, b| a.epoch.total_cmp(&b.epoch));
        self
    }

    pub fn is_epoch_sorted(&self) -> bool {
        self.rows.windows(2).all(|w| w[0].epoch <= w[1].epoch)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn star_count(&self) -> usize {
        self.schema.star_count()
    }

    /// Filter labels present in the table.
    pub fn filters(&self) -> BTreeSet<String> {
        self.rows.iter().map(|r| r.filter.clone()).collect()
    }

    /// Non-missing magnitudes of `star` with their errors, in row order.
    pub fn star_series(&self, star: usize) -> Vec<SeriesPoint> {
        self.rows
            .iter()
            .filter_map(|row| {
                let value = row.value(ColumnRole::Magnitude(star))?;
                Some(SeriesPoint {
                    epoch: row.epoch,
                    value,
                    error: row.value(ColumnRole::Error(star)),
                })
            })
            .collect()
    }

    /// Number of missing magnitude or error cells.
    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| {
                r.magnitudes.iter().filter(|v| v.is_none()).count()
                    + r.errors.iter().filter(|v| v.is_none()).count()
            })
            .sum()
    }
}

impl fmt::Display for MeasurementTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows × {} stars",
            self.rows.len(),
            self.schema.star_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MeasurementTable {
        let ids = IdentifierList::new(["0", "1"]);
        let schema = Arc::new(ColumnSchema::resolve(&ids).unwrap());
        let row = |epoch: f64, mag0: Option<f64>| MeasurementRow {
            epoch,
            filter: "V".to_string(),
            magnitudes: vec![mag0, Some(11.0)],
            errors: vec![Some(0.01), None],
        };
        MeasurementTable::new(
            schema,
            vec![row(3.0, Some(10.0)), row(1.0, None), row(1.0, Some(9.0))],
        )
    }

    #[test]
    fn identifier_list_keeps_input_order() {
        let ids = IdentifierList::new(["obj", "r1", "r2"]);
        assert_eq!(ids.get(0), Some("obj"));
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec!["obj", "r1", "r2"]);
        assert_eq!(ids.get(3), None);
        assert!(IdentifierList::new(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn sort_is_stable_for_equal_epochs() {
        let sorted = table().sorted_by_epoch();
        assert!(sorted.is_epoch_sorted());
        let epochs: Vec<f64> = sorted.rows.iter().map(|r| r.epoch).collect();
        assert_eq!(epochs, vec![1.0, 1.0, 3.0]);
        // the row with the missing magnitude came first in input order
        assert_eq!(sorted.rows[0].magnitudes[0], None);
        assert_eq!(sorted.rows[1].magnitudes[0], Some(9.0));
    }

    #[test]
    fn star_series_skips_missing_magnitudes() {
        let series = table().star_series(0);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, 10.0);
        assert_eq!(series[0].error, Some(0.01));
        assert!(table().star_series(1).iter().all(|p| p.error.is_none()));
    }

    #[test]
    fn counts_missing_cells() {
        // 3 missing errors for star 1, one missing magnitude for star 0
        assert_eq!(table().missing_count(), 4);
    }
}
