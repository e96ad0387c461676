//! GitHub webhook handling.
//!
//! [`SyncOrchestrator`] turns one decoded delivery into the board
//! mutations it implies: filing issues and pull requests onto the board,
//! stamping issue types from titles, and setting date fields when an
//! item's status changes. Every action is independent; a failure is
//! logged and reported but never stops the remaining actions.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::BoardApi;
use crate::error::SyncError;
use crate::issue_types::TypeMapping;
use crate::models::FieldValue;
use crate::policy::{self, FieldDecision, SkipReason};
use crate::schema::ProjectSchema;
use crate::webhooks::{EventCategory, Issue, ProjectItem, PullRequest, WebhookEvent};

/// An action taken in response to a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Note that an item was added to the board
    AcknowledgeItemAdded,
    /// Stamp a date field after a status change
    UpdateDateField,
    /// File a pull request onto the board
    AddPullRequestToBoard,
    /// File an issue onto the board
    AddIssueToBoard,
    /// Set an issue's type from its title
    AssignIssueType,
}

/// What a successful action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Content added to the board as a new item
    AddedToBoard {
        /// Board item id
        item_id: String,
    },
    /// Issue type set
    TypeAssigned {
        /// Type label
        type_name: &'static str,
        /// Issue-type node id
        type_id: String,
    },
    /// Date field written
    DateFieldSet {
        /// Field name
        field_name: &'static str,
        /// Field node id
        field_id: String,
        /// Date written
        value: NaiveDate,
    },
    /// Nothing needed doing
    Skipped(SkipReason),
}

/// Result of one action.
#[derive(Debug)]
pub struct ActionReport {
    /// The action attempted
    pub action: SyncAction,
    /// Its outcome
    pub result: Result<ActionOutcome, SyncError>,
}

impl ActionReport {
    fn new(action: SyncAction, result: Result<ActionOutcome, SyncError>) -> Self {
        Self { action, result }
    }

    /// Whether the action completed (including deliberate skips).
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    fn log(&self) {
        match &self.result {
            Ok(ActionOutcome::Skipped(reason)) => {
                debug!(action = ?self.action, reason = ?reason, "Action skipped");
            }
            Ok(outcome) => {
                info!(action = ?self.action, outcome = ?outcome, "Action completed");
            }
            Err(SyncError::SchemaGap(gap)) => {
                warn!(action = ?self.action, gap = %gap, "Board configuration gap");
            }
            Err(e) => {
                error!(action = ?self.action, error = %e, "Action failed");
            }
        }
    }
}

/// Applies board automation to incoming deliveries.
#[derive(Clone)]
pub struct SyncOrchestrator {
    api: Arc<dyn BoardApi>,
    schema: Arc<ProjectSchema>,
    types: Arc<TypeMapping>,
    today: fn() -> NaiveDate,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

impl SyncOrchestrator {
    /// Create an orchestrator over a board's API, schema and type mapping.
    #[must_use]
    pub fn new(api: Arc<dyn BoardApi>, schema: Arc<ProjectSchema>, types: Arc<TypeMapping>) -> Self {
        Self {
            api,
            schema,
            types,
            today: utc_today,
        }
    }

    /// Replace the clock used for date fields.
    #[must_use]
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// The board schema in use.
    #[must_use]
    pub fn schema(&self) -> &ProjectSchema {
        &self.schema
    }

    /// Handle one delivery, returning a report per action taken.
    pub async fn handle(&self, event: &WebhookEvent) -> Vec<ActionReport> {
        let mut reports = Vec::new();

        for category in event.classify() {
            match category {
                EventCategory::ItemAdded => {
                    reports.push(ActionReport::new(
                        SyncAction::AcknowledgeItemAdded,
                        Ok(ActionOutcome::Skipped(SkipReason::ItemAdded)),
                    ));
                }
                EventCategory::ItemEdited => {
                    if let Some(item) = &event.project_item {
                        let result = self.handle_item_edited(event, item).await;
                        reports.push(ActionReport::new(SyncAction::UpdateDateField, result));
                    }
                }
                EventCategory::PullRequestOpened => {
                    if let Some(pr) = &event.pull_request {
                        let result = self.handle_pull_request_opened(event, pr).await;
                        reports.push(ActionReport::new(SyncAction::AddPullRequestToBoard, result));
                    }
                }
                EventCategory::IssueActionable => {
                    if let Some(issue) = &event.issue {
                        let result = self.add_issue_to_board(event, issue).await;
                        reports.push(ActionReport::new(SyncAction::AddIssueToBoard, result));

                        let result = self.assign_issue_type(issue).await;
                        reports.push(ActionReport::new(SyncAction::AssignIssueType, result));
                    }
                }
                EventCategory::PullRequestOther
                | EventCategory::IssueOther
                | EventCategory::Unhandled => {
                    debug!(
                        action = %event.action,
                        category = ?category,
                        "Event acknowledged without action"
                    );
                }
            }
        }

        for report in &reports {
            report.log();
        }
        reports
    }

    async fn handle_item_edited(
        &self,
        event: &WebhookEvent,
        item: &ProjectItem,
    ) -> Result<ActionOutcome, SyncError> {
        debug!(item_id = %item.node_id, "Project item edited");

        let change = event.field_value_change();
        let decision = policy::decide(
            change.as_ref(),
            &item.node_id,
            &self.schema,
            self.api.as_ref(),
            (self.today)(),
        )
        .await?;

        let (field_name, field_id, value) = match decision {
            FieldDecision::Update {
                field_name,
                field_id,
                value,
            } => (field_name, field_id, value),
            FieldDecision::NoOp(reason) => return Ok(ActionOutcome::Skipped(reason)),
        };

        let board_id = if item.project_node_id.is_empty() {
            self.schema.id.as_str()
        } else {
            item.project_node_id.as_str()
        };

        info!(
            item_id = %item.node_id,
            field = %field_name,
            date = %value,
            "Updating date field"
        );
        self.api
            .mutate_field_value(board_id, &item.node_id, &field_id, FieldValue::Date(value))
            .await?;

        Ok(ActionOutcome::DateFieldSet {
            field_name,
            field_id,
            value,
        })
    }

    async fn handle_pull_request_opened(
        &self,
        event: &WebhookEvent,
        pr: &PullRequest,
    ) -> Result<ActionOutcome, SyncError> {
        info!(
            repo = %event.repository_name(),
            pr_number = pr.number,
            "Adding pull request to board"
        );
        let item_id = self.api.add_item_to_board(&self.schema.id, &pr.node_id).await?;
        Ok(ActionOutcome::AddedToBoard { item_id })
    }

    async fn add_issue_to_board(
        &self,
        event: &WebhookEvent,
        issue: &Issue,
    ) -> Result<ActionOutcome, SyncError> {
        info!(
            repo = %event.repository_name(),
            issue_number = issue.number,
            action = %event.action,
            "Adding issue to board"
        );
        let item_id = self
            .api
            .add_item_to_board(&self.schema.id, &issue.node_id)
            .await?;
        Ok(ActionOutcome::AddedToBoard { item_id })
    }

    async fn assign_issue_type(&self, issue: &Issue) -> Result<ActionOutcome, SyncError> {
        let Some(type_name) = self.types.type_from_title(&issue.title) else {
            debug!(title = %issue.title, "No type prefix in issue title");
            return Ok(ActionOutcome::Skipped(SkipReason::NoTypePrefix));
        };

        let Some(type_id) = self.types.type_id(type_name) else {
            return Err(SyncError::SchemaGap(format!(
                "type '{type_name}' not found in organization issue types"
            )));
        };

        debug!(type_name = %type_name, issue_number = issue.number, "Assigning issue type");
        self.api.set_issue_type(&issue.node_id, &type_id).await?;
        Ok(ActionOutcome::TypeAssigned { type_name, type_id })
    }
}
