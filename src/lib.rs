// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! USSD Ledger Gateway - USSD aggregator front for a remote ledger canister
//!
//! This crate translates USSD aggregator callbacks (validate, register,
//! transfer) into calls against a remote ledger canister and answers with
//! the aggregator's response envelope. All balances, PINs and registration
//! state live in the ledger; the gateway keeps only observational tracking
//! data and admin sessions.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Admin bearer sessions
//! - `ledger` - Remote ledger client (JSON-RPC bridge)
//! - `tracking` - Known phones and activity feed (memory or redb)
//! - `ussd` - Stage router, envelope and ledger reply classification

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod state;
pub mod telemetry;
pub mod tracking;
pub mod ussd;
