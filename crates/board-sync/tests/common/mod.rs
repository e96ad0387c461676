//! Shared fixtures for board sync integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use board_sync::{
    ApiError, BoardApi, Field, FieldDescriptor, FieldValue, FetchError, ItemSnapshot,
    MutateError, ProjectSchema, SingleSelectField, SyncOrchestrator, TypeMapping,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const BOARD_ID: &str = "PVT_board";
pub const ORGANIZATION_ID: &str = "O_acme";
pub const STATUS_FIELD_ID: &str = "F_status";
pub const START_FIELD_ID: &str = "F_start";
pub const END_FIELD_ID: &str = "F_end";
pub const FEATURE_TYPE_ID: &str = "IT_feature";
pub const BUG_TYPE_ID: &str = "IT_bug";

/// A call made against the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchSnapshot {
        item_id: String,
    },
    Mutate {
        board_id: String,
        item_id: String,
        field_id: String,
        value: FieldValue,
    },
    AddItem {
        board_id: String,
        content_node_id: String,
    },
    SetIssueType {
        issue_node_id: String,
        type_id: String,
    },
}

/// In-memory board that records every call.
#[derive(Default)]
pub struct RecordingBoard {
    /// Snapshot returned for every item.
    pub snapshot: ItemSnapshot,
    /// Fail `add_item_to_board` calls.
    pub fail_add: bool,
    /// Ids returned by `fetch_field_ids_by_name`.
    pub field_ids: HashMap<String, String>,
    pub calls: RwLock<Vec<Call>>,
}

impl RecordingBoard {
    pub fn with_snapshot(status: &str, start_date: &str, end_date: &str) -> Self {
        Self {
            snapshot: ItemSnapshot {
                status: status.to_string(),
                start_date: start_date.to_string(),
                end_date: end_date.to_string(),
            },
            ..Self::default()
        }
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.read().await.clone()
    }

    pub async fn adds(&self) -> Vec<Call> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| matches!(c, Call::AddItem { .. }))
            .collect()
    }

    pub async fn type_assignments(&self) -> Vec<Call> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| matches!(c, Call::SetIssueType { .. }))
            .collect()
    }

    pub async fn mutations(&self) -> Vec<Call> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| matches!(c, Call::Mutate { .. }))
            .collect()
    }

    async fn record(&self, call: Call) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl BoardApi for RecordingBoard {
    async fn fetch_project_schema(
        &self,
        _organization: &str,
        _board_number: u32,
    ) -> Result<ProjectSchema, FetchError> {
        Ok(board_schema())
    }

    async fn fetch_field_ids_by_name(
        &self,
        _node_id: &str,
    ) -> Result<HashMap<String, String>, FetchError> {
        Ok(self.field_ids.clone())
    }

    async fn fetch_item_snapshot(&self, item_node_id: &str) -> Result<ItemSnapshot, FetchError> {
        self.record(Call::FetchSnapshot {
            item_id: item_node_id.to_string(),
        })
        .await;
        Ok(self.snapshot.clone())
    }

    async fn mutate_field_value(
        &self,
        board_id: &str,
        item_id: &str,
        field_id: &str,
        value: FieldValue,
    ) -> Result<(), MutateError> {
        self.record(Call::Mutate {
            board_id: board_id.to_string(),
            item_id: item_id.to_string(),
            field_id: field_id.to_string(),
            value,
        })
        .await;
        Ok(())
    }

    async fn add_item_to_board(
        &self,
        board_id: &str,
        content_node_id: &str,
    ) -> Result<String, MutateError> {
        self.record(Call::AddItem {
            board_id: board_id.to_string(),
            content_node_id: content_node_id.to_string(),
        })
        .await;
        if self.fail_add {
            return Err(MutateError::new(
                "add item to board",
                ApiError::GraphQl("Resource not accessible by integration".to_string()),
            ));
        }
        Ok(format!("PVTI_{content_node_id}"))
    }

    async fn set_issue_type(&self, issue_node_id: &str, type_id: &str) -> Result<(), MutateError> {
        self.record(Call::SetIssueType {
            issue_node_id: issue_node_id.to_string(),
            type_id: type_id.to_string(),
        })
        .await;
        Ok(())
    }
}

/// Board with a single-select Status field and two date fields.
pub fn board_schema() -> ProjectSchema {
    let options = ["Todo", "In progress", "Done"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let id = format!("OPT_{i}");
            (id.clone(), Field::new(id, *name))
        })
        .collect();

    let mut schema = ProjectSchema::new(BOARD_ID);
    schema.organization_id = Some(ORGANIZATION_ID.to_string());
    schema.insert(FieldDescriptor::SingleSelect(SingleSelectField {
        id: STATUS_FIELD_ID.to_string(),
        name: "Status".to_string(),
        options,
    }));
    schema.insert(FieldDescriptor::Plain(Field::new(START_FIELD_ID, "Start date")));
    schema.insert(FieldDescriptor::Plain(Field::new(END_FIELD_ID, "End date")));
    schema.insert(FieldDescriptor::Plain(Field::new("F_title", "Title")));
    schema
}

/// Type mapping with Feature and Bug ids known.
pub fn type_mapping() -> TypeMapping {
    let types = TypeMapping::new();
    types.set_type_id("Feature", FEATURE_TYPE_ID);
    types.set_type_id("Bug", BUG_TYPE_ID);
    types
}

pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

pub fn orchestrator(board: Arc<RecordingBoard>) -> SyncOrchestrator {
    SyncOrchestrator::new(board, Arc::new(board_schema()), Arc::new(type_mapping()))
        .with_today(fixed_today)
}
