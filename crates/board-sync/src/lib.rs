//! GitHub project board automation service.
//!
//! This crate provides:
//! - GraphQL client for the GitHub Projects API
//! - Webhook payload parsing and event classification
//! - Board schema discovery (fields and single-select options)
//! - Issue type detection from conventional-commit style titles
//! - Date field automation driven by status changes
//! - HTTP server for webhook handling (standalone service)

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Most API methods can fail

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod issue_types;
pub mod models;
pub mod policy;
pub mod schema;
pub mod server;
pub mod webhooks;

pub use api::BoardApi;
pub use client::GitHubProjectsClient;
pub use config::Config;
pub use error::{ApiError, DecodeError, FetchError, MutateError, SyncError};
pub use handlers::{ActionOutcome, ActionReport, SyncAction, SyncOrchestrator};
pub use issue_types::{classify_title, TypeMapping};
pub use models::*;
pub use schema::ProjectSchema;
pub use webhooks::{EventCategory, WebhookEvent};
