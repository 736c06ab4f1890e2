use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use log::{debug, info, warn};

use super::config::{PipelineConfig, RowPolicy};
use super::error::{PhotometryError, SchemaError};
use super::model::{ColumnRole, IdentifierList, MeasurementRow, MeasurementTable};
use super::schema::{ColumnSchema, EPOCH_COLUMN, FILTER_COLUMN};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the identifier table (comma-separated, identifier in
/// `config.identifier_column`).
pub fn load_identifiers(path: &Path, config: &PipelineConfig) -> anyhow::Result<IdentifierList> {
    let file = File::open(path)
        .with_context(|| format!("opening identifier file {}", path.display()))?;
    let ids = read_identifiers(file, config.identifier_column)
        .with_context(|| format!("reading identifiers from {}", path.display()))?;
    info!("Read {} identifiers from {}", ids.len(), path.display());
    Ok(ids)
}

/// Load the measurement table and return it typed and sorted by epoch.
pub fn load_measurements(
    path: &Path,
    schema: Arc<ColumnSchema>,
    config: &PipelineConfig,
) -> anyhow::Result<MeasurementTable> {
    let file = File::open(path)
        .with_context(|| format!("opening measurement file {}", path.display()))?;
    let table = read_measurements(file, schema, config)
        .with_context(|| format!("reading measurements from {}", path.display()))?;
    info!(
        "Loaded {table} from {} (filters {:?})",
        path.display(),
        table.filters()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Identifier table
// ---------------------------------------------------------------------------

/// Every non-empty row contributes the field at `column`; the other fields
/// are coordinates and are ignored.
pub fn read_identifiers<R: Read>(reader: R, column: usize) -> Result<IdentifierList, PhotometryError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b',')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut ids = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let id = record.get(column).ok_or(SchemaError::MalformedIdentifierRow {
            row: row_no,
            expected: column + 1,
            found: record.len(),
        })?;
        ids.push(id.to_string());
    }
    Ok(IdentifierList::new(ids))
}

// ---------------------------------------------------------------------------
// Measurement table
// ---------------------------------------------------------------------------

/// Raw layout: no header, `epoch, filter, MAG_<id0>, ERR_<id0>, …` in the
/// order given by `schema`.
///
/// * wrong field count → [`PhotometryError::ColumnCount`] (or skipped, per
///   `config.column_count`)
/// * unparseable epoch or non-UTF-8 filter label → [`PhotometryError::Parse`]
/// * empty, missing-token, unparseable, non-UTF-8 or non-finite
///   magnitude/error → `None`
///
/// Errors carry both the record index and the 1-based input line.
pub fn read_measurements<R: Read>(
    reader: R,
    schema: Arc<ColumnSchema>,
    config: &PipelineConfig,
) -> Result<MeasurementTable, PhotometryError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(config.delimiter_byte()?)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let width = schema.width();
    let star_count = schema.star_count();
    debug!("Expecting {width} columns: {}", schema.raw_column_names().join(", "));
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (row_no, result) in reader.byte_records().enumerate() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        if record.len() != width {
            match config.column_count {
                RowPolicy::Fail => {
                    return Err(PhotometryError::ColumnCount {
                        row: row_no,
                        line,
                        expected: width,
                        found: record.len(),
                    });
                }
                RowPolicy::Skip => {
                    warn!(
                        "Skipping measurement row {row_no} (line {line}): expected {width} fields, found {}",
                        record.len()
                    );
                    skipped += 1;
                    continue;
                }
            }
        }

        let epoch = parse_epoch(&record[0], row_no, line)?;
        let filter = match std::str::from_utf8(&record[1]) {
            Ok(label) => label.to_string(),
            Err(_) => {
                return Err(PhotometryError::Parse {
                    row: row_no,
                    line,
                    field: FILTER_COLUMN.to_string(),
                    value: String::from_utf8_lossy(&record[1]).into_owned(),
                });
            }
        };
        let field = |role: ColumnRole| {
            std::str::from_utf8(&record[schema.position(role)])
                .ok()
                .and_then(|text| coerce_value(text, config))
        };

        rows.push(MeasurementRow {
            epoch,
            filter,
            magnitudes: (0..star_count).map(|s| field(ColumnRole::Magnitude(s))).collect(),
            errors: (0..star_count).map(|s| field(ColumnRole::Error(s))).collect(),
        });
    }

    let table = MeasurementTable::new(schema, rows).sorted_by_epoch();
    debug!(
        "Parsed {table}: {} missing values, {skipped} rows skipped",
        table.missing_count()
    );
    Ok(table)
}

fn parse_epoch(field: &[u8], row: usize, line: u64) -> Result<f64, PhotometryError> {
    match std::str::from_utf8(field).ok().and_then(|text| text.parse::<f64>().ok()) {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(PhotometryError::Parse {
            row,
            line,
            field: EPOCH_COLUMN.to_string(),
            value: String::from_utf8_lossy(field).into_owned(),
        }),
    }
}

/// Magnitude/error coercion never fails: anything that is not a finite
/// number is a missing value.
fn coerce_value(field: &str, config: &PipelineConfig) -> Option<f64> {
    if field.is_empty() || config.is_missing_token(field) {
        return None;
    }
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn schema(ids: &[&str]) -> Arc<ColumnSchema> {
        Arc::new(ColumnSchema::resolve(&IdentifierList::new(ids.iter().copied())).unwrap())
    }

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn identifiers_come_from_third_field() {
        let text = "10:20:30.1, +40:50:01.2, 17\n10:21:00.0, +40:49:00.0, 3\n\n10:22:00.0, +40:48:00.0, 25\n";
        let ids = read_identifiers(text.as_bytes(), 2).unwrap();
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec!["17", "3", "25"]);
    }

    #[test]
    fn short_identifier_row_is_a_schema_error() {
        let err = read_identifiers("1,2,3\n4,5\n".as_bytes(), 2).unwrap_err();
        assert!(err.is_schema_error());
        assert!(matches!(
            err,
            PhotometryError::Schema(SchemaError::MalformedIdentifierRow { row: 1, expected: 3, found: 2 })
        ));
    }

    #[test]
    fn measurements_are_typed_and_sorted() {
        let text = "58001.2\tV\t10.1\t0.01\t11.0\t0.02\n\
                    58000.5\tB\tINDEF\tINDEF\t11.2\t0.02\n\
                    58000.7\tB\t10.3\t\t11.1\tnan\n";
        let table = read_measurements(text.as_bytes(), schema(&["0", "1"]), &PipelineConfig::default())
            .unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.is_epoch_sorted());
        let first = &table.rows[0];
        assert_eq!(first.epoch, 58000.5);
        assert_eq!(first.filter, "B");
        assert_eq!(first.magnitudes, vec![None, Some(11.2)]);
        assert_eq!(first.errors, vec![None, Some(0.02)]);

        let second = &table.rows[1];
        assert_eq!(second.magnitudes, vec![Some(10.3), Some(11.1)]);
        assert_eq!(second.errors, vec![None, None]);
    }

    #[test]
    fn garbage_magnitudes_degrade_to_missing() {
        let text = "58000.1\tR\tbad\t-\n";
        let table = read_measurements(text.as_bytes(), schema(&["x"]), &PipelineConfig::default())
            .unwrap();
        assert_eq!(table.rows[0].magnitudes, vec![None]);
        assert_eq!(table.rows[0].errors, vec![None]);
    }

    #[test]
    fn invalid_utf8_magnitude_is_missing() {
        let text: &[u8] = b"58000.1\tB\t10.0\t0.01\t\xff\xfe\t0.02\n";
        let table = read_measurements(text, schema(&["0", "1"]), &PipelineConfig::default()).unwrap();
        assert_eq!(table.rows[0].magnitudes, vec![Some(10.0), None]);
        assert_eq!(table.rows[0].errors, vec![Some(0.01), Some(0.02)]);
    }

    #[test]
    fn invalid_utf8_epoch_or_filter_is_fatal() {
        let bad_epoch: &[u8] = b"5800\xff.1\tB\t10.0\t0.01\n";
        let err = read_measurements(bad_epoch, schema(&["0"]), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PhotometryError::Parse { ref field, .. } if field == "epoch"));

        let bad_filter: &[u8] = b"58000.1\t\xffB\t10.0\t0.01\n";
        let err = read_measurements(bad_filter, schema(&["0"]), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PhotometryError::Parse { ref field, .. } if field == "filter_band"));
    }

    #[test]
    fn errors_report_input_line_past_blank_lines() {
        let text = "58000.1\tB\t10\t0.1\n\n\n58000.2\tB\t10\n";
        let err = read_measurements(text.as_bytes(), schema(&["0"]), &PipelineConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PhotometryError::ColumnCount { row: 1, line: 4, expected: 4, found: 3 }
        ));
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn wrong_field_count_fails() {
        // three stars → 8 fields
        let text = "58000.1\tB\t10\t0.1\t11\t0.1\t12\n";
        let err = read_measurements(text.as_bytes(), schema(&["0", "1", "2"]), &PipelineConfig::default())
            .unwrap_err();
        match err {
            PhotometryError::ColumnCount { row, line, expected, found } => {
                assert_eq!((row, line, expected, found), (0, 1, 8, 7));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn two_stars_expect_six_fields() {
        let text = "58000.1\tB\t10\t0.1\t11\t0.1\t12\n";
        let err = read_measurements(text.as_bytes(), schema(&["0", "1"]), &PipelineConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PhotometryError::ColumnCount { row: 0, line: 1, expected: 6, found: 7 }
        ));
    }

    #[test]
    fn skip_policy_drops_bad_rows() {
        let config = PipelineConfig {
            column_count: RowPolicy::Skip,
            ..PipelineConfig::default()
        };
        let text = "58000.1\tB\t10\t0.1\n58000.2\tB\t10\n58000.3\tB\t10.5\t0.1\n";
        let table = read_measurements(text.as_bytes(), schema(&["0"]), &config).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].epoch, 58000.3);
    }

    #[test]
    fn bad_epoch_is_fatal_with_context() {
        let text = "58000.1\tB\t10\t0.1\nINDEF\tB\t10\t0.1\n";
        let err = read_measurements(text.as_bytes(), schema(&["0"]), &PipelineConfig::default())
            .unwrap_err();
        match err {
            PhotometryError::Parse { row, line, field, value } => {
                assert_eq!(row, 1);
                assert_eq!(line, 2);
                assert_eq!(field, "epoch");
                assert_eq!(value, "INDEF");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn comma_delimiter_is_configurable() {
        let config = PipelineConfig {
            delimiter: ',',
            ..PipelineConfig::default()
        };
        let text = "58000.1,V,10.0,0.1,11.0,0.2\n";
        let table = read_measurements(text.as_bytes(), schema(&["0", "1"]), &config).unwrap();
        assert_eq!(table.rows[0].magnitudes, vec![Some(10.0), Some(11.0)]);
    }

    #[test]
    fn load_from_files_adds_path_context() {
        let config = PipelineConfig::default();
        let ids_file = temp_file("0,0,5\n0,0,9\n");
        let ids = load_identifiers(ids_file.path(), &config).unwrap();
        assert_eq!(ids.len(), 2);

        let schema = Arc::new(ColumnSchema::resolve(&ids).unwrap());
        let good = temp_file("58000.1\tV\t10\t0.1\t11\t0.1\n");
        let table = load_measurements(good.path(), Arc::clone(&schema), &config).unwrap();
        assert_eq!(table.len(), 1);

        let bad = temp_file("58000.1\tV\t10\n");
        let err = load_measurements(bad.path(), schema, &config).unwrap_err();
        assert!(format!("{err:#}").contains("reading measurements from"));
        assert!(matches!(
            err.downcast_ref::<PhotometryError>(),
            Some(PhotometryError::ColumnCount { .. })
        ));
    }
}
