// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin bearer-token cache.
//!
//! Tokens are random, opaque and live only in memory. Expiry is evaluated
//! lazily against the injected [`Clock`] whenever a token is presented;
//! [`AdminSessions::purge_expired`] reclaims tokens nobody presents again.

use std::{collections::HashMap, sync::Arc, sync::Mutex};

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::{
    clock::{Clock, SystemClock},
    AuthError,
};

/// Default admin token lifetime (24 hours).
pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(24);

const TOKEN_BYTES: usize = 32;

/// The single configured admin credential pair.
pub struct AdminCredentials {
    username: String,
    password_digest: [u8; 32],
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password_digest: Sha256::digest(password.as_bytes()).into(),
        }
    }

    /// Exact match on both fields.
    fn matches(&self, username: &str, password: &str) -> bool {
        let digest: [u8; 32] = Sha256::digest(password.as_bytes()).into();
        self.username == username && self.password_digest == digest
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// A freshly issued admin session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Process-wide set of live admin tokens.
pub struct AdminSessions {
    credentials: Option<AdminCredentials>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    rng: SystemRandom,
    /// token → issue time
    tokens: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl AdminSessions {
    /// `credentials` of `None` disables admin login entirely.
    pub fn new(credentials: Option<AdminCredentials>, ttl: Duration) -> Self {
        Self {
            credentials,
            ttl,
            clock: Arc::new(SystemClock),
            rng: SystemRandom::new(),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn login(&self, username: &str, password: &str) -> Result<IssuedSession, AuthError> {
        let accepted = self
            .credentials
            .as_ref()
            .is_some_and(|c| c.matches(username, password));
        if !accepted {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.generate_token()?;
        let issued_at = self.clock.now();
        self.tokens
            .lock()
            .map_err(|_| AuthError::Internal("session cache poisoned".to_string()))?
            .insert(token.clone(), issued_at);

        info!(username = %username, "Admin session issued");
        Ok(IssuedSession {
            token,
            expires_at: issued_at + self.ttl,
        })
    }

    /// Remove a token immediately. Returns whether it was live.
    pub fn logout(&self, token: &str) -> bool {
        match self.tokens.lock() {
            Ok(mut tokens) => tokens.remove(token).is_some(),
            Err(_) => false,
        }
    }

    /// Check a presented token, returning its issue time.
    pub fn authenticate(&self, token: &str) -> Result<DateTime<Utc>, AuthError> {
        let mut tokens = self
            .tokens
            .lock()
            .map_err(|_| AuthError::Internal("session cache poisoned".to_string()))?;

        let issued_at = *tokens.get(token).ok_or(AuthError::UnknownToken)?;
        if self.is_expired(issued_at) {
            tokens.remove(token);
            return Err(AuthError::TokenExpired);
        }
        Ok(issued_at)
    }

    /// Drop every expired token. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let Ok(mut tokens) = self.tokens.lock() else {
            return 0;
        };
        let before = tokens.len();
        let now = self.clock.now();
        tokens.retain(|_, issued_at| now - *issued_at < self.ttl);
        let removed = before - tokens.len();
        if removed > 0 {
            debug!(removed, "Purged expired admin sessions");
        }
        removed
    }

    pub fn active_sessions(&self) -> usize {
        self.tokens.lock().map(|t| t.len()).unwrap_or(0)
    }

    fn is_expired(&self, issued_at: DateTime<Utc>) -> bool {
        self.clock.now() - issued_at >= self.ttl
    }

    fn generate_token(&self) -> Result<String, AuthError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AuthError::Internal("random generator unavailable".to_string()))?;
        Ok(Base64UrlUnpadded::encode_string(&bytes))
    }
}
