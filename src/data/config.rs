use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::PhotometryError;

// ---------------------------------------------------------------------------
// Policies for recoverable input problems
// ---------------------------------------------------------------------------

/// What to do with rows whose filter label is not recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPolicy {
    /// Silently leave the row out of every subset.
    #[default]
    Drop,
    /// Abort with [`PhotometryError::UnrecognizedFilter`].
    Fail,
}

/// What to do with measurement rows whose field count is wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Abort with [`PhotometryError::ColumnCount`].
    #[default]
    Fail,
    /// Log and skip the row.
    Skip,
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Run options. Every field has a default so a partial JSON file works:
///
/// ```json
/// { "delimiter": ",", "filters": ["B", "V"], "aggregate_days": false }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Field delimiter of the measurement table.
    pub delimiter: char,
    /// Field of the identifier table holding the star identifier.
    pub identifier_column: usize,
    /// Recognized filter band labels, in display order.
    pub filters: Vec<String>,
    /// Tokens meaning "no value" in magnitude/error fields.
    pub missing_tokens: Vec<String>,
    pub unrecognized_filter: FilterPolicy,
    pub column_count: RowPolicy,
    /// Average intra-day measurements before computing differentials.
    pub aggregate_days: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            identifier_column: 2,
            filters: vec!["B".to_string(), "V".to_string(), "R".to_string()],
            missing_tokens: vec!["INDEF".to_string()],
            unrecognized_filter: FilterPolicy::Drop,
            column_count: RowPolicy::Fail,
            aggregate_days: true,
        }
    }
}

impl PipelineConfig {
    /// Load a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PhotometryError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, PhotometryError> {
        let config: PipelineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PhotometryError> {
        self.delimiter_byte()?;
        if self.filters.is_empty() {
            return Err(PhotometryError::Config(
                "at least one filter band must be recognized".to_string(),
            ));
        }
        Ok(())
    }

    /// The delimiter as the single byte the CSV reader wants.
    pub fn delimiter_byte(&self) -> Result<u8, PhotometryError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(PhotometryError::Config(format!(
                "delimiter '{}' is not an ASCII character",
                self.delimiter
            )))
        }
    }

    pub fn is_missing_token(&self, field: &str) -> bool {
        self.missing_tokens.iter().any(|t| t == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(r#"{ "delimiter": ",", "aggregate_days": false }"#)
            .unwrap();
        assert_eq!(config.delimiter_byte().unwrap(), b',');
        assert!(!config.aggregate_days);
        assert_eq!(config.filters, vec!["B", "V", "R"]);
        assert_eq!(config.unrecognized_filter, FilterPolicy::Drop);
        assert_eq!(config.column_count, RowPolicy::Fail);
        assert!(config.is_missing_token("INDEF"));
    }

    #[test]
    fn policies_use_snake_case_names() {
        let config = PipelineConfig::from_json(
            r#"{ "unrecognized_filter": "fail", "column_count": "skip" }"#,
        )
        .unwrap();
        assert_eq!(config.unrecognized_filter, FilterPolicy::Fail);
        assert_eq!(config.column_count, RowPolicy::Skip);
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let err = PipelineConfig::from_json(r#"{ "delimiter": "§" }"#).unwrap_err();
        assert!(matches!(err, PhotometryError::Config(_)));
    }

    #[test]
    fn empty_filter_set_is_rejected() {
        let err = PipelineConfig::from_json(r#"{ "filters": [] }"#).unwrap_err();
        assert!(matches!(err, PhotometryError::Config(_)));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = PipelineConfig::from_json("{ delimiter").unwrap_err();
        assert!(matches!(err, PhotometryError::Json(_)));
    }
}
