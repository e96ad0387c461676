//! Date-field automation for status changes.
//!
//! When an item's `Status` moves to "In progress" its "Start date" is
//! stamped, and when it moves to "Done" its "End date" is stamped. Dates
//! that are already set are never overwritten.

use chrono::NaiveDate;
use tracing::debug;

use crate::api::BoardApi;
use crate::error::SyncError;
use crate::models::{
    FieldDescriptor, ItemSnapshot, END_DATE_FIELD, START_DATE_FIELD, STATUS_DONE,
    STATUS_FIELD, STATUS_IN_PROGRESS,
};
use crate::schema::ProjectSchema;
use crate::webhooks::{FieldValueChange, SINGLE_SELECT_FIELD_TYPE};

/// Why an action chose to do nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The edit did not carry a `field_value` change
    NoFieldValueChange,
    /// The edited field is not a single-select
    NotSingleSelect,
    /// The edited field is not `Status`
    NotStatusField(String),
    /// The item payload had no node id
    MissingItemNodeId,
    /// The item's dates already reflect its status
    DatesUpToDate,
    /// The title has no recognised type prefix
    NoTypePrefix,
    /// The item was added; nothing to stamp
    ItemAdded,
}

/// Outcome of evaluating a field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDecision {
    /// Write `value` to the named date field
    Update {
        /// Target field name
        field_name: &'static str,
        /// Target field node id
        field_id: String,
        /// Date to write
        value: NaiveDate,
    },
    /// Nothing to do
    NoOp(SkipReason),
}

/// Pick the date field a snapshot needs, if any.
///
/// "Start date" is evaluated first, so a snapshot that satisfied both
/// rules would get its start date.
#[must_use]
pub fn date_field_for(snapshot: &ItemSnapshot) -> Option<&'static str> {
    if snapshot.status == STATUS_IN_PROGRESS && snapshot.start_date.is_empty() {
        return Some(START_DATE_FIELD);
    }
    if snapshot.status == STATUS_DONE && snapshot.end_date.is_empty() {
        return Some(END_DATE_FIELD);
    }
    None
}

/// Decide whether a board item edit requires a date field update.
///
/// The item's current values are fetched through `api` only once the edit
/// is known to be a `Status` change, and the returned decision carries the
/// resolved id of the field to write.
pub async fn decide(
    change: Option<&FieldValueChange>,
    item_node_id: &str,
    schema: &ProjectSchema,
    api: &dyn BoardApi,
    today: NaiveDate,
) -> Result<FieldDecision, SyncError> {
    let Some(change) = change else {
        return Ok(FieldDecision::NoOp(SkipReason::NoFieldValueChange));
    };

    if change.field_type != SINGLE_SELECT_FIELD_TYPE {
        return Ok(FieldDecision::NoOp(SkipReason::NotSingleSelect));
    }

    let Some(field) = schema.field_by_id(&change.field_node_id) else {
        return Err(SyncError::SchemaGap(format!(
            "edited field {} is not on the board schema",
            change.field_node_id
        )));
    };

    debug!(field = %field.name(), "Field updated");
    if field.name() != STATUS_FIELD {
        return Ok(FieldDecision::NoOp(SkipReason::NotStatusField(
            field.name().to_string(),
        )));
    }

    match field {
        FieldDescriptor::SingleSelect(_) => {}
        FieldDescriptor::Plain(_) => {
            return Err(SyncError::SchemaGap(format!(
                "field {STATUS_FIELD} is not a single-select field"
            )));
        }
    }

    if item_node_id.is_empty() {
        return Ok(FieldDecision::NoOp(SkipReason::MissingItemNodeId));
    }

    let snapshot = api.fetch_item_snapshot(item_node_id).await?;
    debug!(
        status = %snapshot.status,
        start_date = %snapshot.start_date,
        end_date = %snapshot.end_date,
        "Fetched item snapshot"
    );

    let Some(field_name) = date_field_for(&snapshot) else {
        return Ok(FieldDecision::NoOp(SkipReason::DatesUpToDate));
    };

    let target = schema.field_by_name(field_name).ok_or_else(|| {
        SyncError::SchemaGap(format!("board has no field named {field_name}"))
    })?;

    Ok(FieldDecision::Update {
        field_name,
        field_id: target.id().to_string(),
        value: today,
    })
}
