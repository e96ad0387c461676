//! In-memory snapshot of a board's field metadata.
//!
//! The schema is fetched once at startup and shared read-only across
//! deliveries. Every field is indexed twice, by node id (to resolve the
//! `field_node_id` carried by edit events) and by name (to find the date
//! fields the policy writes to).

use serde::Deserialize;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::api::BoardApi;
use crate::error::FetchError;
use crate::models::{Field, FieldDescriptor, SingleSelectField};

/// Maximum number of fields requested per schema fetch.
pub const FIELD_PAGE_SIZE: usize = 100;

/// One entry of a board's `fields` connection as returned by GraphQL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldNode {
    /// GraphQL type name (e.g. `ProjectV2SingleSelectField`)
    #[serde(rename = "__typename", default)]
    pub typename: String,
    /// Field node ID
    #[serde(default)]
    pub id: String,
    /// Field name
    #[serde(default)]
    pub name: String,
    /// Options, present only on single-select fields
    #[serde(default)]
    pub options: Option<Vec<Field>>,
}

impl FieldNode {
    fn into_descriptor(self) -> FieldDescriptor {
        let is_single_select =
            self.options.is_some() || self.typename == "ProjectV2SingleSelectField";
        if !is_single_select {
            return FieldDescriptor::Plain(Field::new(self.id, self.name));
        }

        let options = self
            .options
            .unwrap_or_default()
            .into_iter()
            .map(|option| (option.id.clone(), option))
            .collect();

        FieldDescriptor::SingleSelect(SingleSelectField {
            id: self.id,
            name: self.name,
            options,
        })
    }
}

/// Field metadata for one board.
#[derive(Debug, Clone, Default)]
pub struct ProjectSchema {
    /// Board node ID
    pub id: String,
    /// Node ID of the organization owning the board, when known
    pub organization_id: Option<String>,
    by_id: HashMap<String, FieldDescriptor>,
    by_name: HashMap<String, FieldDescriptor>,
}

impl ProjectSchema {
    /// Create an empty schema for a board.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Build a schema from the board's raw field list.
    ///
    /// `total_count` is the number of fields the board reports; when it
    /// exceeds the number of nodes received a warning is logged, since the
    /// missing fields cannot be resolved.
    #[must_use]
    pub fn from_field_nodes(
        id: impl Into<String>,
        organization_id: Option<String>,
        nodes: Vec<FieldNode>,
        total_count: Option<usize>,
    ) -> Self {
        let mut schema = Self::new(id);
        schema.organization_id = organization_id;

        let received = nodes.len();
        if let Some(total) = total_count.filter(|total| *total > received) {
            warn!(
                board_id = %schema.id,
                received = received,
                total = total,
                "Board has more fields than a single fetch returns; extra fields are not indexed"
            );
        }

        for node in nodes {
            schema.insert(node.into_descriptor());
        }
        schema
    }

    /// Fetch and build the schema of an organization's board.
    pub async fn load(
        api: &dyn BoardApi,
        organization: &str,
        board_number: u32,
    ) -> Result<Self, FetchError> {
        let schema = api.fetch_project_schema(organization, board_number).await?;
        info!(
            board_id = %schema.id,
            organization = %organization,
            board_number = board_number,
            field_count = schema.len(),
            "Loaded board schema"
        );
        Ok(schema)
    }

    /// Index a field under both its id and its name.
    ///
    /// Fields with an empty name or id are ignored. Returns whether the
    /// field was indexed.
    pub fn insert(&mut self, descriptor: FieldDescriptor) -> bool {
        if descriptor.name().is_empty() || descriptor.id().is_empty() {
            return false;
        }
        self.by_name
            .insert(descriptor.name().to_string(), descriptor.clone());
        self.by_id.insert(descriptor.id().to_string(), descriptor);
        true
    }

    /// Look up a field by node id.
    #[must_use]
    pub fn field_by_id(&self, id: &str) -> Option<&FieldDescriptor> {
        self.by_id.get(id)
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name)
    }

    /// Number of indexed fields (by id).
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether no fields are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Number of distinct names indexed.
    #[must_use]
    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }
}
