// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Passthrough to the ledger canister's own request audit log.
//!
//! Endpoint names are stored with a leading slash (`/validate`), so
//! `GET /logs/validate` queries entries for `/validate`.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{error::ApiError, ledger::LedgerLogEntry, state::AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearLogsResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    #[schema(value_type = i64)]
    pub count: serde_json::Number,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEventResponse {
    #[schema(value_type = i64)]
    pub log_id: serde_json::Number,
    /// Gateway time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

fn endpoint_key(endpoint: &str) -> String {
    format!("/{}", endpoint.trim_start_matches('/'))
}

/// All audit log entries.
#[utoipa::path(
    get,
    path = "/logs",
    tag = "Logs",
    responses(
        (status = 200, description = "Audit log", body = Vec<LedgerLogEntry>),
        (status = 500, description = "Ledger call failed")
    )
)]
pub async fn list_logs(State(state): State<AppState>) -> Result<Json<Vec<LedgerLogEntry>>, ApiError> {
    let logs = state
        .ledger
        .get_logs()
        .await
        .map_err(|e| ApiError::ledger("Failed to fetch logs", &e))?;
    Ok(Json(logs))
}

/// Audit log entries for one endpoint.
#[utoipa::path(
    get,
    path = "/logs/{endpoint}",
    tag = "Logs",
    params(("endpoint" = String, Path, description = "Endpoint name without the leading slash")),
    responses(
        (status = 200, description = "Matching entries", body = Vec<LedgerLogEntry>),
        (status = 500, description = "Ledger call failed")
    )
)]
pub async fn list_logs_by_endpoint(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
) -> Result<Json<Vec<LedgerLogEntry>>, ApiError> {
    let logs = state
        .ledger
        .get_logs_by_endpoint(&endpoint_key(&endpoint))
        .await
        .map_err(|e| ApiError::ledger("Failed to fetch logs by endpoint", &e))?;
    Ok(Json(logs))
}

/// Append the raw request body to the audit log under `/{endpoint}`.
#[utoipa::path(
    post,
    path = "/logs/{endpoint}",
    tag = "Logs",
    params(("endpoint" = String, Path, description = "Endpoint name without the leading slash")),
    request_body(content = Object, description = "Any JSON payload, stored verbatim"),
    responses(
        (status = 200, description = "Entry recorded", body = LogEventResponse),
        (status = 500, description = "Ledger call failed")
    )
)]
pub async fn record_log(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    body: Bytes,
) -> Result<Json<LogEventResponse>, ApiError> {
    let endpoint = endpoint_key(&endpoint);
    let data = String::from_utf8_lossy(&body);
    let data = if data.trim().is_empty() { "{}" } else { data.as_ref() };

    let log_id = state
        .ledger
        .log_event(&endpoint, data)
        .await
        .map_err(|e| ApiError::ledger("Failed to record log", &e))?;

    info!(endpoint = %endpoint, log_id = %log_id, "Audit log entry recorded");
    Ok(Json(LogEventResponse {
        log_id: log_id.to_json_number(),
        timestamp: Utc::now().timestamp_millis(),
    }))
}

/// Number of audit log entries.
#[utoipa::path(
    get,
    path = "/count",
    tag = "Logs",
    responses(
        (status = 200, description = "Entry count", body = CountResponse),
        (status = 500, description = "Ledger call failed")
    )
)]
pub async fn count(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let count = state
        .ledger
        .get_count()
        .await
        .map_err(|e| ApiError::ledger("Failed to fetch count", &e))?;
    Ok(Json(CountResponse {
        count: count.to_json_number(),
    }))
}

/// Remove every audit log entry.
#[utoipa::path(
    delete,
    path = "/logs",
    tag = "Logs",
    responses(
        (status = 200, description = "Log cleared", body = ClearLogsResponse),
        (status = 500, description = "Ledger call failed")
    )
)]
pub async fn clear_logs(State(state): State<AppState>) -> Result<Json<ClearLogsResponse>, ApiError> {
    state
        .ledger
        .clear_logs()
        .await
        .map_err(|e| ApiError::ledger("Failed to clear logs", &e))?;
    info!("Audit log cleared");
    Ok(Json(ClearLogsResponse {
        message: "All logs cleared successfully".to_string(),
    }))
}
