// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local tracking store.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex;

use super::{ActivityRecord, TrackingError, TrackingResult, TrackingStore, MAX_ACTIVITIES};

#[derive(Default)]
struct Inner {
    phones: BTreeSet<String>,
    /// Newest at the front.
    activities: VecDeque<ActivityRecord>,
}

/// In-memory tracking store; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryTrackingStore {
    inner: Mutex<Inner>,
}

impl InMemoryTrackingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackingStore for InMemoryTrackingStore {
    fn record_phone(&self, phone: &str) -> TrackingResult<()> {
        let mut inner = self.inner.lock().map_err(|_| TrackingError::Poisoned)?;
        if !inner.phones.contains(phone) {
            inner.phones.insert(phone.to_string());
        }
        Ok(())
    }

    fn known_phones(&self) -> TrackingResult<Vec<String>> {
        let inner = self.inner.lock().map_err(|_| TrackingError::Poisoned)?;
        Ok(inner.phones.iter().cloned().collect())
    }

    fn record_activity(&self, activity: ActivityRecord) -> TrackingResult<()> {
        let mut inner = self.inner.lock().map_err(|_| TrackingError::Poisoned)?;
        inner.activities.push_front(activity);
        inner.activities.truncate(MAX_ACTIVITIES);
        Ok(())
    }

    fn recent_activities(&self, limit: usize) -> TrackingResult<Vec<ActivityRecord>> {
        let inner = self.inner.lock().map_err(|_| TrackingError::Poisoned)?;
        Ok(inner.activities.iter().take(limit).cloned().collect())
    }

    fn activity_count(&self) -> TrackingResult<usize> {
        let inner = self.inner.lock().map_err(|_| TrackingError::Poisoned)?;
        Ok(inner.activities.len())
    }
}
