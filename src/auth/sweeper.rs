// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Sweeper
//!
//! Background task that purges expired admin tokens. Expiry is already
//! enforced on every lookup; the sweep only reclaims tokens that are never
//! presented again.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` and exits as soon as the
//! server's shutdown signal fires.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::AdminSessions;

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

pub struct SessionSweeper {
    sessions: Arc<AdminSessions>,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(sessions: Arc<AdminSessions>) -> Self {
        Self {
            sessions,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Admin session sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.sessions.purge_expired();
                },
                _ = shutdown.cancelled() => {
                    info!("Admin session sweeper shutting down");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{clock::ManualClock, AdminCredentials, DEFAULT_SESSION_TTL};
    use chrono::Utc;

    #[tokio::test]
    async fn sweeps_expired_tokens_and_stops_on_cancel() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let sessions = Arc::new(
            AdminSessions::new(
                Some(AdminCredentials::new("admin", "pw")),
                DEFAULT_SESSION_TTL,
            )
            .with_clock(clock.clone()),
        );
        sessions.login("admin", "pw").unwrap();
        clock.advance(DEFAULT_SESSION_TTL);

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(
            SessionSweeper::new(sessions.clone())
                .with_interval(Duration::from_millis(10))
                .run(shutdown.clone()),
        );

        for _ in 0..100 {
            if sessions.active_sessions() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(sessions.active_sessions(), 0);

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
