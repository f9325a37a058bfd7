// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{sync::Arc, time::Instant};

use crate::{auth::AdminSessions, ledger::LedgerClient, tracking::TrackingStore};

/// Shared handler state. Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerClient>,
    pub tracking: Arc<dyn TrackingStore>,
    pub sessions: Arc<AdminSessions>,
    pub canister_id: Arc<str>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        tracking: Arc<dyn TrackingStore>,
        sessions: Arc<AdminSessions>,
        canister_id: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            ledger,
            tracking,
            sessions,
            canister_id: canister_id.into(),
            started_at: Instant::now(),
        }
    }
}
