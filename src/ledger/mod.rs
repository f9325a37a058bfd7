// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote ledger canister integration.
//!
//! The ledger owns every piece of business state: balances, PINs, the
//! registration state machine and the transaction history. The gateway only
//! shapes requests for it, so this module is a typed stub of the canister's
//! interface plus one transport.
//!
//! - [`LedgerClient`] - async trait describing the canister methods the
//!   gateway depends on
//! - [`JsonRpcLedgerClient`] - JSON-RPC 2.0 over HTTP transport
//! - [`types`] - ledger-native value types (`LedgerInt`, `LedgerUser`, ...)

use async_trait::async_trait;

pub mod rpc;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use rpc::JsonRpcLedgerClient;
pub use types::{LedgerInt, LedgerLogEntry, LedgerUser};

/// Canister method names, exactly as exported by the ledger.
pub mod methods {
    pub const IS_USER_REGISTERED: &str = "isUserRegistered";
    pub const SET_REGISTRATION_PHONE: &str = "setRegistrationPhone";
    pub const SET_REGISTRATION_PIN: &str = "setRegistrationPin";
    pub const CONFIRM_REGISTRATION_PIN: &str = "confirmRegistrationPin";
    pub const TRANSFER: &str = "transfer";
    pub const GET_BALANCE: &str = "getBalance";
    pub const GET_USER_BY_PHONE: &str = "getUserByPhone";
    pub const ADD_FUNDS: &str = "addFunds";
    pub const LOG_EVENT: &str = "logEvent";
    pub const GET_LOGS: &str = "getLogs";
    pub const GET_LOGS_BY_ENDPOINT: &str = "getLogsByEndpoint";
    pub const GET_COUNT: &str = "getCount";
    pub const CLEAR_LOGS: &str = "clearLogs";
}

/// Operations the gateway requires from the remote ledger.
///
/// Text-returning methods reply with free-form prose; the gateway classifies
/// it in [`crate::ussd::normalize`]. Implementations must not retry.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn is_user_registered(&self, phone: &str) -> Result<bool, LedgerError>;

    /// First registration step. The canister takes the session phone and the
    /// phone being registered separately; the gateway passes the same value.
    async fn set_registration_phone(
        &self,
        phone: &str,
        registration_phone: &str,
    ) -> Result<String, LedgerError>;

    async fn set_registration_pin(&self, phone: &str, pin: &str) -> Result<String, LedgerError>;

    async fn confirm_registration_pin(
        &self,
        phone: &str,
        pin: &str,
    ) -> Result<String, LedgerError>;

    async fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        pin: &str,
    ) -> Result<String, LedgerError>;

    async fn get_balance(&self, phone: &str) -> Result<LedgerInt, LedgerError>;

    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<LedgerUser>, LedgerError>;

    async fn add_funds(&self, phone: &str, amount: u64) -> Result<String, LedgerError>;

    /// Append a raw payload to the canister's own audit log. Returns the log id.
    async fn log_event(&self, endpoint: &str, data: &str) -> Result<LedgerInt, LedgerError>;

    async fn get_logs(&self) -> Result<Vec<LedgerLogEntry>, LedgerError>;

    async fn get_logs_by_endpoint(&self, endpoint: &str)
        -> Result<Vec<LedgerLogEntry>, LedgerError>;

    async fn get_count(&self) -> Result<LedgerInt, LedgerError>;

    async fn clear_logs(&self) -> Result<(), LedgerError>;
}

/// Errors that can occur while talking to the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid ledger RPC URL: {0}")]
    InvalidUrl(String),

    #[error("Ledger transport error: {0}")]
    Transport(String),

    #[error("Ledger RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid ledger response: {0}")]
    InvalidResponse(String),
}
