// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test helpers for seeding and reading balances. Unauthenticated.

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    ledger::LedgerInt,
    state::AppState,
    tracking::{ActivityRecord, ActivityType},
};

/// Request to credit a phone's ledger balance.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddFundsRequest {
    pub phone: Option<String>,
    /// Integer amount in the ledger's unit; numbers or decimal strings.
    #[schema(value_type = Option<u64>)]
    pub amount: Option<LedgerInt>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddFundsResponse {
    /// Ledger reply, verbatim.
    pub message: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BalanceRequest {
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(value_type = i64)]
    pub balance: serde_json::Number,
}

/// Lenient body parse: anything unreadable is an empty request.
fn parse_body<T: for<'de> Deserialize<'de> + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Credit funds to a phone on the ledger.
#[utoipa::path(
    post,
    path = "/addfunds",
    tag = "Funds",
    request_body = AddFundsRequest,
    responses(
        (status = 200, description = "Ledger reply", body = AddFundsResponse),
        (status = 400, description = "Missing or invalid phone/amount"),
        (status = 500, description = "Ledger call failed")
    )
)]
pub async fn add_funds(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AddFundsResponse>, ApiError> {
    let request: AddFundsRequest = parse_body(&body);
    let (Some(phone), Some(amount)) = (non_empty(request.phone), request.amount) else {
        return Err(ApiError::bad_request("Phone number and amount are required"));
    };
    let amount = u64::try_from(amount)
        .map_err(|_| ApiError::bad_request("Amount must be a non-negative integer"))?;

    if let Err(e) = state.tracking.record_phone(&phone) {
        warn!(phone = %phone, error = %e, "Failed to track phone");
    }

    let message = state
        .ledger
        .add_funds(&phone, amount)
        .await
        .map_err(|e| ApiError::ledger("Failed to add funds", &e))?;

    info!(phone = %phone, amount, reply = %message, "Funds added");
    let activity = ActivityRecord::new(ActivityType::FundsAdded, "Funds added")
        .with_details(json!({ "phone": phone, "amount": amount }));
    if let Err(e) = state.tracking.record_activity(activity) {
        warn!(error = %e, "Failed to record activity");
    }

    Ok(Json(AddFundsResponse { message }))
}

/// Read a phone's ledger balance.
#[utoipa::path(
    post,
    path = "/balance",
    tag = "Funds",
    request_body = BalanceRequest,
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 400, description = "Missing phone"),
        (status = 500, description = "Ledger call failed")
    )
)]
pub async fn balance(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BalanceResponse>, ApiError> {
    let request: BalanceRequest = parse_body(&body);
    let phone =
        non_empty(request.phone).ok_or_else(|| ApiError::bad_request("Phone number is required"))?;

    if let Err(e) = state.tracking.record_phone(&phone) {
        warn!(phone = %phone, error = %e, "Failed to track phone");
    }

    let balance = state
        .ledger
        .get_balance(&phone)
        .await
        .map_err(|e| ApiError::ledger("Failed to get balance", &e))?;

    Ok(Json(BalanceResponse {
        balance: balance.to_json_number(),
    }))
}
