// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Tracking Store
//!
//! Observational bookkeeping for the admin surface: every phone number the
//! gateway has seen, and a short feed of recent activity. None of this is
//! authoritative; the ledger remains the source of truth for registration
//! status and balances, and a phone in the known set may never have
//! finished registering.
//!
//! ## Backends
//!
//! - [`InMemoryTrackingStore`] - default, emptied on restart
//! - [`RedbTrackingStore`] - embedded redb file, selected by `TRACKING_DB_PATH`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod memory;
pub mod redb_store;

pub use memory::InMemoryTrackingStore;
pub use redb_store::RedbTrackingStore;

/// Maximum number of activity records retained; older entries are dropped.
pub const MAX_ACTIVITIES: usize = 100;

/// Kinds of recorded activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    RegistrationStarted,
    PinSet,
    UserRegistered,
    Transfer,
    TransferFailed,
    FundsAdded,
    AdminLogin,
    AdminLogout,
}

/// One entry of the activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ActivityRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub description: String,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl ActivityRecord {
    pub fn new(activity_type: ActivityType, description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            activity_type,
            description: description.into(),
            details: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tracking store lock poisoned")]
    Poisoned,
}

pub type TrackingResult<T> = Result<T, TrackingError>;

/// Storage for known phones and the activity feed.
///
/// Implementations must keep `record_phone` idempotent and cap the feed at
/// [`MAX_ACTIVITIES`], newest first.
pub trait TrackingStore: Send + Sync {
    fn record_phone(&self, phone: &str) -> TrackingResult<()>;

    /// All known phones, sorted.
    fn known_phones(&self) -> TrackingResult<Vec<String>>;

    fn record_activity(&self, activity: ActivityRecord) -> TrackingResult<()>;

    /// Up to `limit` activities, newest first.
    fn recent_activities(&self, limit: usize) -> TrackingResult<Vec<ActivityRecord>>;

    fn activity_count(&self) -> TrackingResult<usize>;
}
