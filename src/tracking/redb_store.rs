// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tracking store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `known_phones`: phone → first-seen unix timestamp
//! - `activities`: monotonically increasing sequence → serialized ActivityRecord
//! - `tracking_meta`: key → u64 (next activity sequence)

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{ActivityRecord, TrackingResult, TrackingStore, MAX_ACTIVITIES};

const KNOWN_PHONES: TableDefinition<&str, i64> = TableDefinition::new("known_phones");

const ACTIVITIES: TableDefinition<u64, &[u8]> = TableDefinition::new("activities");

const TRACKING_META: TableDefinition<&str, u64> = TableDefinition::new("tracking_meta");

const NEXT_ACTIVITY_SEQ: &str = "next_activity_seq";

/// Persistent tracking store.
pub struct RedbTrackingStore {
    db: Database,
}

impl RedbTrackingStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> TrackingResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KNOWN_PHONES)?;
            let _ = write_txn.open_table(ACTIVITIES)?;
            let _ = write_txn.open_table(TRACKING_META)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl TrackingStore for RedbTrackingStore {
    fn record_phone(&self, phone: &str) -> TrackingResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KNOWN_PHONES)?;
            let seen = table.get(phone)?.is_some();
            if !seen {
                table.insert(phone, Utc::now().timestamp())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn known_phones(&self) -> TrackingResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KNOWN_PHONES)?;
        let mut phones = Vec::new();
        for entry in table.iter()? {
            let (phone, _) = entry?;
            phones.push(phone.value().to_string());
        }
        Ok(phones)
    }

    fn record_activity(&self, activity: ActivityRecord) -> TrackingResult<()> {
        let json = serde_json::to_vec(&activity)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut meta = write_txn.open_table(TRACKING_META)?;
            let seq = match meta.get(NEXT_ACTIVITY_SEQ)? {
                Some(value) => value.value(),
                None => 0,
            };
            meta.insert(NEXT_ACTIVITY_SEQ, seq + 1)?;

            let mut table = write_txn.open_table(ACTIVITIES)?;
            table.insert(seq, json.as_slice())?;

            // Drop the oldest entries beyond capacity
            let keys = table
                .iter()?
                .map(|entry| entry.map(|(key, _)| key.value()))
                .collect::<Result<Vec<u64>, _>>()?;
            if keys.len() > MAX_ACTIVITIES {
                for key in &keys[..keys.len() - MAX_ACTIVITIES] {
                    table.remove(key)?;
                }
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn recent_activities(&self, limit: usize) -> TrackingResult<Vec<ActivityRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVITIES)?;
        let mut activities = Vec::with_capacity(limit.min(MAX_ACTIVITIES));
        for entry in table.iter()?.rev().take(limit) {
            let (_, value) = entry?;
            activities.push(serde_json::from_slice(value.value())?);
        }
        Ok(activities)
    }

    fn activity_count(&self) -> TrackingResult<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVITIES)?;
        Ok(table.iter()?.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{ActivityType, TrackingError};
    use serde_json::json;

    fn temp_store() -> (RedbTrackingStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbTrackingStore::open(&dir.path().join("tracking.redb")).unwrap();
        (store, dir)
    }

    #[test]
    fn open_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("tracking.redb");
        let store = RedbTrackingStore::open(&path).unwrap();
        store.record_phone("254700000001").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn open_reports_unusable_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let result = RedbTrackingStore::open(&blocker.join("tracking.redb"));
        assert!(matches!(result, Err(TrackingError::Io(_))));
    }

    #[test]
    fn phones_are_deduplicated_and_sorted() {
        let (store, _dir) = temp_store();
        store.record_phone("254700000009").unwrap();
        store.record_phone("254700000001").unwrap();
        store.record_phone("254700000009").unwrap();

        assert_eq!(
            store.known_phones().unwrap(),
            vec!["254700000001".to_string(), "254700000009".to_string()]
        );
    }

    #[test]
    fn activities_are_capped_newest_first() {
        let (store, _dir) = temp_store();
        for i in 0..(MAX_ACTIVITIES + 15) {
            store
                .record_activity(
                    ActivityRecord::new(ActivityType::FundsAdded, format!("activity {i}"))
                        .with_details(json!({ "n": i })),
                )
                .unwrap();
        }

        assert_eq!(store.activity_count().unwrap(), MAX_ACTIVITIES);
        let recent = store.recent_activities(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].description, format!("activity {}", MAX_ACTIVITIES + 14));
        assert_eq!(recent[0].details["n"], MAX_ACTIVITIES + 14);
        assert_eq!(recent[2].description, format!("activity {}", MAX_ACTIVITIES + 12));
    }

    #[test]
    fn contents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracking.redb");
        {
            let store = RedbTrackingStore::open(&path).unwrap();
            store.record_phone("254700000001").unwrap();
            store
                .record_activity(ActivityRecord::new(ActivityType::UserRegistered, "registered"))
                .unwrap();
        }

        let reopened = RedbTrackingStore::open(&path).unwrap();
        assert_eq!(reopened.known_phones().unwrap(), vec!["254700000001".to_string()]);
        let recent = reopened.recent_activities(10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].activity_type, ActivityType::UserRegistered);

        // Sequence numbers continue after reopen
        reopened
            .record_activity(ActivityRecord::new(ActivityType::Transfer, "after reopen"))
            .unwrap();
        assert_eq!(reopened.recent_activities(1).unwrap()[0].description, "after reopen");
    }
}
