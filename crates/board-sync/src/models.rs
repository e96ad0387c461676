//! Board entity type definitions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the single-select field that drives date automation.
pub const STATUS_FIELD: &str = "Status";
/// Date field stamped when an item moves into progress.
pub const START_DATE_FIELD: &str = "Start date";
/// Date field stamped when an item is done.
pub const END_DATE_FIELD: &str = "End date";
/// Status option that triggers the start date.
pub const STATUS_IN_PROGRESS: &str = "In progress";
/// Status option that triggers the end date.
pub const STATUS_DONE: &str = "Done";

/// A named board field (or single-select option).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Node ID
    pub id: String,
    /// Human label
    pub name: String,
}

impl Field {
    /// Create a field from its id and name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A field whose value is one of a fixed set of named options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleSelectField {
    /// Node ID
    pub id: String,
    /// Human label
    pub name: String,
    /// Options keyed by option id
    #[serde(default)]
    pub options: HashMap<String, Field>,
}

impl SingleSelectField {
    /// Find an option by its display name.
    #[must_use]
    pub fn option_by_name(&self, name: &str) -> Option<&Field> {
        self.options.values().find(|o| o.name == name)
    }
}

/// A board field as indexed by the project schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDescriptor {
    /// Plain field (text, number, date, iteration, ...)
    Plain(Field),
    /// Single-select field with its options flattened
    SingleSelect(SingleSelectField),
}

impl FieldDescriptor {
    /// Field node ID, regardless of variant.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Plain(f) => &f.id,
            Self::SingleSelect(f) => &f.id,
        }
    }

    /// Field name, regardless of variant.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Plain(f) => &f.name,
            Self::SingleSelect(f) => &f.name,
        }
    }

    /// The single-select view of this field, if it is one.
    #[must_use]
    pub fn as_single_select(&self) -> Option<&SingleSelectField> {
        match self {
            Self::Plain(_) => None,
            Self::SingleSelect(f) => Some(f),
        }
    }
}

/// Current status and date values of one board item.
///
/// Empty strings mean the value is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Status option name
    pub status: String,
    /// Start date (`YYYY-MM-DD`)
    pub start_date: String,
    /// End date (`YYYY-MM-DD`)
    pub end_date: String,
}

/// Value written to a board item field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    /// Calendar date
    Date(NaiveDate),
    /// Free text
    Text(String),
}
