use std::collections::HashMap;

use super::error::SchemaError;
use super::model::{ColumnRole, IdentifierList};

pub const EPOCH_COLUMN: &str = "epoch";
pub const FILTER_COLUMN: &str = "filter_band";
pub const MAGNITUDE_PREFIX: &str = "MAG_";
pub const ERROR_PREFIX: &str = "ERR_";

/// Number of leading non-star columns (epoch, filter band).
const LEADING_COLUMNS: usize = 2;

// ---------------------------------------------------------------------------
// ColumnSchema – expected measurement columns for one identifier list
// ---------------------------------------------------------------------------

/// Column layout derived from an [`IdentifierList`].
///
/// On disk the star columns are interleaved (`MAG_a, ERR_a, MAG_b, ERR_b, …`);
/// semantically they are two parallel lists. The schema owns the mapping
/// between both views.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub identifiers: IdentifierList,
    pub magnitude_columns: Vec<String>,
    pub error_columns: Vec<String>,
    roles: HashMap<String, ColumnRole>,
}

impl ColumnSchema {
    /// Build the schema, rejecting empty lists and duplicate identifiers
    /// (they would produce colliding column names).
    pub fn resolve(identifiers: &IdentifierList) -> Result<Self, SchemaError> {
        if identifiers.is_empty() {
            return Err(SchemaError::EmptyIdentifiers);
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (pos, id) in identifiers.iter().enumerate() {
            if let Some(&first) = seen.get(id) {
                return Err(SchemaError::DuplicateIdentifier {
                    id: id.to_string(),
                    first,
                    second: pos,
                });
            }
            seen.insert(id, pos);
        }

        let magnitude_columns: Vec<String> = identifiers
            .iter()
            .map(|id| format!("{MAGNITUDE_PREFIX}{id}"))
            .collect();
        let error_columns: Vec<String> = identifiers
            .iter()
            .map(|id| format!("{ERROR_PREFIX}{id}"))
            .collect();

        let mut roles = HashMap::with_capacity(2 * identifiers.len());
        for (star, (mag, err)) in magnitude_columns.iter().zip(&error_columns).enumerate() {
            roles.insert(mag.clone(), ColumnRole::Magnitude(star));
            roles.insert(err.clone(), ColumnRole::Error(star));
        }

        Ok(Self {
            identifiers: identifiers.clone(),
            magnitude_columns,
            error_columns,
            roles,
        })
    }

    pub fn star_count(&self) -> usize {
        self.magnitude_columns.len()
    }

    /// Number of fields a raw measurement row must have.
    pub fn width(&self) -> usize {
        LEADING_COLUMNS + 2 * self.star_count()
    }

    /// Column names in storage order:
    /// `epoch, filter_band, MAG_<id0>, ERR_<id0>, MAG_<id1>, ERR_<id1>, …`
    pub fn raw_column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        names.push(EPOCH_COLUMN.to_string());
        names.push(FILTER_COLUMN.to_string());
        for (mag, err) in self.magnitude_columns.iter().zip(&self.error_columns) {
            names.push(mag.clone());
            names.push(err.clone());
        }
        names
    }

    /// Raw field position of a value-bearing column.
    pub fn position(&self, role: ColumnRole) -> usize {
        match role {
            ColumnRole::Magnitude(star) => LEADING_COLUMNS + 2 * star,
            ColumnRole::Error(star) => LEADING_COLUMNS + 2 * star + 1,
        }
    }

    /// Role of a raw field position; `None` for epoch, filter or out of range.
    pub fn role_at(&self, position: usize) -> Option<ColumnRole> {
        let offset = position.checked_sub(LEADING_COLUMNS)?;
        let star = offset / 2;
        if star >= self.star_count() {
            return None;
        }
        Some(if offset % 2 == 0 {
            ColumnRole::Magnitude(star)
        } else {
            ColumnRole::Error(star)
        })
    }

    /// Role of a column given its external name (`MAG_<id>` / `ERR_<id>`).
    pub fn role_of(&self, name: &str) -> Option<ColumnRole> {
        self.roles.get(name).copied()
    }

    /// External name of a value-bearing column.
    pub fn name_of(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Magnitude(s) => self.magnitude_columns.get(s),
            ColumnRole::Error(s) => self.error_columns.get(s),
        }
        .map(String::as_str)
    }

    /// Every magnitude and error column, star by star.
    pub fn value_roles(&self) -> Vec<ColumnRole> {
        (0..self.star_count())
            .flat_map(|s| [ColumnRole::Magnitude(s), ColumnRole::Error(s)])
            .collect()
    }

    /// Star indices eligible as references (everything but the object).
    pub fn reference_stars(&self) -> Vec<usize> {
        (1..self.star_count()).collect()
    }

    /// Display label of a star: its identifier.
    pub fn label(&self, star: usize) -> &str {
        self.identifiers.get(star).unwrap_or("?")
    }
}
