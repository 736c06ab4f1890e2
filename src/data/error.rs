use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy of the photometry core
// ---------------------------------------------------------------------------

/// Problems with the identifier list that make a column schema impossible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("identifier list is empty")]
    EmptyIdentifiers,

    #[error("duplicate identifier '{id}' at positions {first} and {second}")]
    DuplicateIdentifier {
        id: String,
        first: usize,
        second: usize,
    },

    #[error("identifier row {row}: expected at least {expected} fields, found {found}")]
    MalformedIdentifierRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Every fatal condition raised while loading or transforming measurements.
///
/// Missing magnitudes and unrecognized filter labels are *not* errors under
/// the default policies; they flow through the tables as `None` / dropped rows.
#[derive(Debug, Error)]
pub enum PhotometryError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("measurement row {row} (line {line}): expected {expected} fields, found {found}")]
    ColumnCount {
        row: usize,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("measurement row {row} (line {line}): cannot parse {field} value '{value}'")]
    Parse {
        row: usize,
        line: u64,
        field: String,
        value: String,
    },

    #[error("measurement row {row}: unrecognized filter band '{label}'")]
    UnrecognizedFilter { row: usize, label: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PhotometryError {
    /// Whether this error stems from a malformed identifier list.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, PhotometryError::Schema(_))
    }
}
