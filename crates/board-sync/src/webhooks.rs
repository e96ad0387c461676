//! GitHub webhook payload types and event classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::DecodeError;

/// Action sent when a board item field changes.
pub const EDITED_ACTION: &str = "edited";
/// Action sent when an item is added to a board.
pub const CREATED_ACTION: &str = "created";
/// Pull request action that files the PR onto the board.
pub const OPENED_ACTION: &str = "opened";
/// Issue actions that file the issue onto the board and stamp its type.
pub const ISSUE_ACTIONS: &[&str] = &["edited", "reopened", "opened", "created"];

/// Key of the `changes` entry describing a field value edit.
pub const FIELD_VALUE_CHANGE: &str = "field_value";
/// `field_type` of single-select field edits.
pub const SINGLE_SELECT_FIELD_TYPE: &str = "single_select";

/// GitHub account (user or organization)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubEntity {
    /// Login name
    #[serde(default)]
    pub login: String,
}

/// Board item sub-object of `projects_v2_item` events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectItem {
    /// Numeric item ID
    #[serde(default)]
    pub id: i64,
    /// Item node ID
    #[serde(default)]
    pub node_id: String,
    /// Node ID of the board holding the item
    #[serde(default)]
    pub project_node_id: String,
    /// Node ID of the backing issue or pull request
    #[serde(default)]
    pub content_node_id: String,
    /// Backing content type (`Issue`, `PullRequest`, `DraftIssue`)
    #[serde(default)]
    pub content_type: Option<String>,
    /// User who created the item
    #[serde(default)]
    pub creator: Option<GitHubEntity>,
    /// Created timestamp
    #[serde(default)]
    pub created_at: Option<String>,
    /// Updated timestamp
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Archived timestamp
    #[serde(default)]
    pub archived_at: Option<String>,
}

impl ProjectItem {
    /// Whether the payload carried an identifiable item.
    #[must_use]
    pub fn has_id(&self) -> bool {
        self.id != 0 || !self.node_id.is_empty()
    }
}

/// Pull request sub-object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequest {
    /// Numeric ID
    #[serde(default)]
    pub id: i64,
    /// Node ID
    #[serde(default)]
    pub node_id: String,
    /// PR number
    #[serde(default)]
    pub number: i64,
    /// PR state (open, closed)
    #[serde(default)]
    pub state: String,
    /// PR title
    #[serde(default)]
    pub title: String,
}

/// Issue sub-object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issue {
    /// Numeric ID
    #[serde(default)]
    pub id: i64,
    /// Node ID
    #[serde(default)]
    pub node_id: String,
    /// Issue number
    #[serde(default)]
    pub number: i64,
    /// Issue state (open, closed)
    #[serde(default)]
    pub state: String,
    /// Issue title
    #[serde(default)]
    pub title: String,
}

/// Repository sub-object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Repository {
    /// Numeric ID
    #[serde(default)]
    pub id: i64,
    /// Repository name
    #[serde(default)]
    pub name: String,
    /// Full name (org/repo)
    #[serde(default)]
    pub full_name: String,
}

/// Inbound webhook payload.
///
/// Only the sub-objects relevant to the event are present; `changes` is
/// kept loosely typed since its shape depends on the action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Action tag (opened, edited, created, ...)
    #[serde(default)]
    pub action: String,
    /// Board item (for `projects_v2_item` events)
    #[serde(default, rename = "projects_v2_item")]
    pub project_item: Option<ProjectItem>,
    /// Pull request
    #[serde(default)]
    pub pull_request: Option<PullRequest>,
    /// Issue
    #[serde(default)]
    pub issue: Option<Issue>,
    /// Repository
    #[serde(default)]
    pub repository: Option<Repository>,
    /// Owning organization
    #[serde(default)]
    pub organization: Option<GitHubEntity>,
    /// User who triggered the event
    #[serde(default)]
    pub sender: Option<GitHubEntity>,
    /// What changed, keyed by change kind
    #[serde(default)]
    pub changes: HashMap<String, Value>,
}

/// The `field_value` entry of an item edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValueChange {
    /// Node ID of the edited field
    pub field_node_id: String,
    /// Field type (`single_select`, `date`, `text`, ...)
    pub field_type: String,
}

/// Category of a delivery, one per populated sub-object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    /// An item was added to the board
    ItemAdded,
    /// A field of a board item was edited
    ItemEdited,
    /// A pull request was opened
    PullRequestOpened,
    /// Any other pull request action
    PullRequestOther,
    /// An issue was opened, created, edited or reopened
    IssueActionable,
    /// Any other issue action
    IssueOther,
    /// Nothing this service acts on
    Unhandled,
}

impl WebhookEvent {
    /// Decode a raw webhook body.
    pub fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Repository full name, for log fields.
    #[must_use]
    pub fn repository_name(&self) -> &str {
        self.repository
            .as_ref()
            .map_or("unknown", |repo| repo.full_name.as_str())
    }

    /// The field edit described by `changes`, when there is one.
    ///
    /// Both `field_node_id` and `field_type` must be strings.
    #[must_use]
    pub fn field_value_change(&self) -> Option<FieldValueChange> {
        let change = self.changes.get(FIELD_VALUE_CHANGE)?;
        let field_node_id = change.get("field_node_id")?.as_str()?;
        let field_type = change.get("field_type")?.as_str()?;
        Some(FieldValueChange {
            field_node_id: field_node_id.to_string(),
            field_type: field_type.to_string(),
        })
    }

    /// Categorise the event.
    ///
    /// Each populated sub-object contributes its own category, in the order
    /// board item, pull request, issue. An event matching nothing yields
    /// `[EventCategory::Unhandled]`.
    #[must_use]
    pub fn classify(&self) -> Vec<EventCategory> {
        let mut categories = Vec::new();

        if self.project_item.as_ref().is_some_and(ProjectItem::has_id) {
            match self.action.as_str() {
                EDITED_ACTION => categories.push(EventCategory::ItemEdited),
                CREATED_ACTION => categories.push(EventCategory::ItemAdded),
                _ => {}
            }
        }

        if self.pull_request.is_some() {
            categories.push(if self.action == OPENED_ACTION {
                EventCategory::PullRequestOpened
            } else {
                EventCategory::PullRequestOther
            });
        }

        if self.issue.is_some() {
            categories.push(if ISSUE_ACTIONS.contains(&self.action.as_str()) {
                EventCategory::IssueActionable
            } else {
                EventCategory::IssueOther
            });
        }

        if categories.is_empty() {
            categories.push(EventCategory::Unhandled);
        }
        categories
    }
}
