// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC 2.0 transport to the ledger canister.
//!
//! Each canister method maps to one JSON-RPC call: `method` is the canister
//! method name and `params` the positional Candid arguments. The canister
//! identifier travels in the `x-canister-id` header so a single bridge can
//! front several canisters.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::{methods, LedgerClient, LedgerError, LedgerInt, LedgerLogEntry, LedgerUser};

const CANISTER_ID_HEADER: &str = "x-canister-id";

/// Ledger client speaking JSON-RPC over HTTP.
#[derive(Debug)]
pub struct JsonRpcLedgerClient {
    endpoint: Url,
    canister_id: String,
    http: Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Candid `opt T` as emitted by common bridges: `null`, `[]`, `[value]` or a
/// bare value.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CandidOpt<T> {
    Wrapped(Vec<T>),
    Bare(Option<T>),
}

impl<T> CandidOpt<T> {
    fn into_option(self) -> Option<T> {
        match self {
            CandidOpt::Wrapped(values) => values.into_iter().next(),
            CandidOpt::Bare(value) => value,
        }
    }
}

impl JsonRpcLedgerClient {
    /// Create a client for the given RPC endpoint and canister.
    ///
    /// `timeout` of `None` leaves ledger calls unbounded.
    pub fn new(
        endpoint: &str,
        canister_id: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, LedgerError> {
        let endpoint: Url = endpoint
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidUrl(e.to_string()))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| LedgerError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            canister_id: canister_id.into(),
            http,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = build_request(id, method, params);

        debug!(method, id, canister_id = %self.canister_id, "ledger call");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CANISTER_ID_HEADER, &self.canister_id)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Transport(format!(
                "{method} returned HTTP {status}: {body}"
            )));
        }

        let reply: RpcResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(format!("{method}: {e}")))?;

        decode_reply(method, reply)
    }
}

fn build_request(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

fn decode_reply<T: DeserializeOwned>(method: &str, reply: RpcResponse) -> Result<T, LedgerError> {
    if let Some(error) = reply.error {
        return Err(LedgerError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    let result = reply.result.unwrap_or(Value::Null);
    serde_json::from_value(result)
        .map_err(|e| LedgerError::InvalidResponse(format!("{method}: {e}")))
}

#[async_trait]
impl LedgerClient for JsonRpcLedgerClient {
    async fn is_user_registered(&self, phone: &str) -> Result<bool, LedgerError> {
        self.call(methods::IS_USER_REGISTERED, json!([phone])).await
    }

    async fn set_registration_phone(
        &self,
        phone: &str,
        registration_phone: &str,
    ) -> Result<String, LedgerError> {
        self.call(
            methods::SET_REGISTRATION_PHONE,
            json!([phone, registration_phone]),
        )
        .await
    }

    async fn set_registration_pin(&self, phone: &str, pin: &str) -> Result<String, LedgerError> {
        self.call(methods::SET_REGISTRATION_PIN, json!([phone, pin]))
            .await
    }

    async fn confirm_registration_pin(
        &self,
        phone: &str,
        pin: &str,
    ) -> Result<String, LedgerError> {
        self.call(methods::CONFIRM_REGISTRATION_PIN, json!([phone, pin]))
            .await
    }

    async fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        pin: &str,
    ) -> Result<String, LedgerError> {
        self.call(methods::TRANSFER, json!([from, to, amount, pin]))
            .await
    }

    async fn get_balance(&self, phone: &str) -> Result<LedgerInt, LedgerError> {
        self.call(methods::GET_BALANCE, json!([phone])).await
    }

    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<LedgerUser>, LedgerError> {
        let user: CandidOpt<LedgerUser> =
            self.call(methods::GET_USER_BY_PHONE, json!([phone])).await?;
        Ok(user.into_option())
    }

    async fn add_funds(&self, phone: &str, amount: u64) -> Result<String, LedgerError> {
        self.call(methods::ADD_FUNDS, json!([phone, amount])).await
    }

    async fn log_event(&self, endpoint: &str, data: &str) -> Result<LedgerInt, LedgerError> {
        self.call(methods::LOG_EVENT, json!([endpoint, data])).await
    }

    async fn get_logs(&self) -> Result<Vec<LedgerLogEntry>, LedgerError> {
        self.call(methods::GET_LOGS, json!([])).await
    }

    async fn get_logs_by_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<Vec<LedgerLogEntry>, LedgerError> {
        self.call(methods::GET_LOGS_BY_ENDPOINT, json!([endpoint]))
            .await
    }

    async fn get_count(&self) -> Result<LedgerInt, LedgerError> {
        self.call(methods::GET_COUNT, json!([])).await
    }

    async fn clear_logs(&self) -> Result<(), LedgerError> {
        let _: Value = self.call(methods::CLEAR_LOGS, json!([])).await?;
        Ok(())
    }
}
