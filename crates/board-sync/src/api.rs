//! Board API abstraction.
//!
//! Sync logic talks to the board through [`BoardApi`] so it stays
//! independent of the GraphQL transport. [`crate::GitHubProjectsClient`]
//! is the production implementation.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{FetchError, MutateError};
use crate::models::{FieldValue, ItemSnapshot};
use crate::schema::ProjectSchema;

/// Read and write operations against a project board.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Fetch the field metadata of an organization's board.
    async fn fetch_project_schema(
        &self,
        organization: &str,
        board_number: u32,
    ) -> Result<ProjectSchema, FetchError>;

    /// Fetch `lowercased name -> id` for the named entities under a node.
    ///
    /// For a board node these are its fields; for an organization node,
    /// its issue types.
    async fn fetch_field_ids_by_name(
        &self,
        node_id: &str,
    ) -> Result<HashMap<String, String>, FetchError>;

    /// Fetch the current status and date values of a board item.
    async fn fetch_item_snapshot(&self, item_node_id: &str) -> Result<ItemSnapshot, FetchError>;

    /// Set one field of a board item.
    async fn mutate_field_value(
        &self,
        board_id: &str,
        item_id: &str,
        field_id: &str,
        value: FieldValue,
    ) -> Result<(), MutateError>;

    /// Add an issue or pull request to the board, returning the new item id.
    async fn add_item_to_board(
        &self,
        board_id: &str,
        content_node_id: &str,
    ) -> Result<String, MutateError>;

    /// Set the issue type of an issue.
    async fn set_issue_type(&self, issue_node_id: &str, type_id: &str)
        -> Result<(), MutateError>;
}
