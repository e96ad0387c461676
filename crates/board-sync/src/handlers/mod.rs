//! Webhook handlers for board synchronization.

pub mod github;

pub use github::{ActionOutcome, ActionReport, SyncAction, SyncOrchestrator};
