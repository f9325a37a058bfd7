// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Admin Authentication
//!
//! A single operator account guards the `/admin/*` routes.
//!
//! ## Flow
//!
//! 1. `POST /admin/login` with the configured username and password
//! 2. The gateway issues a random opaque token, valid for the session TTL
//!    (24 hours by default)
//! 3. Admin requests send `Authorization: Bearer <token>`
//! 4. `POST /admin/logout` revokes the token immediately
//!
//! ## Security
//!
//! - Tokens live only in process memory; a restart logs every admin out
//! - Expiry is checked on every lookup, and a background sweep reclaims
//!   tokens that are never presented again
//! - All token failures produce the same 401 body
//! - Login is disabled when no admin password is configured

pub mod clock;
pub mod error;
pub mod extractor;
pub mod sessions;
pub mod sweeper;

pub use clock::{Clock, SystemClock};
pub use error::AuthError;
pub use extractor::AdminSession;
pub use sessions::{AdminCredentials, AdminSessions, IssuedSession, DEFAULT_SESSION_TTL};
pub use sweeper::SessionSweeper;
