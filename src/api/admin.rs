// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only API endpoints.
//!
//! Everything except login requires a live admin bearer token and provides:
//! - Aggregate statistics over the phones the gateway has seen
//! - Per-user ledger view
//! - The recent activity feed
//!
//! Stats and user listing issue one ledger lookup per known phone,
//! sequentially. A phone whose lookup fails is logged and skipped.

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::{AdminSession, AuthError},
    error::ApiError,
    ledger::{LedgerInt, LedgerUser},
    state::AppState,
    tracking::{ActivityRecord, ActivityType, MAX_ACTIVITIES},
};

/// Default page size for `/admin/activities`.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 50;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent admin requests.
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}

/// Aggregate statistics.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatsResponse {
    /// Phones seen by any USSD or funds handler.
    pub total_users: usize,
    /// Known phones the ledger reports as registered.
    pub registered_users: usize,
    /// Sum of ledger balances over known phones.
    #[schema(value_type = i64)]
    pub total_balance: serde_json::Number,
    /// Sum of ledger history entries over known phones.
    pub total_transactions: usize,
    /// Entries currently in the activity feed.
    pub total_activities: usize,
    pub active_sessions: usize,
    /// Server uptime information.
    pub uptime_seconds: u64,
    /// Current timestamp.
    pub timestamp: String,
}

/// Admin view of one known phone.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserSummary {
    pub phone: String,
    #[schema(value_type = i64)]
    pub balance: serde_json::Number,
    pub is_registered: bool,
    pub transaction_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserListResponse {
    pub users: Vec<AdminUserSummary>,
    pub total: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityQueryParams {
    /// Maximum number of results (default 50, capped at 100).
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityListResponse {
    /// Newest first.
    pub activities: Vec<ActivityRecord>,
    /// Entries retained in the feed.
    pub total: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Exchange the admin credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "Admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LoginResponse>, AuthError> {
    let request: LoginRequest = serde_json::from_slice(&body).unwrap_or_default();
    let issued = state.sessions.login(&request.username, &request.password)?;

    note_activity(
        &state,
        ActivityRecord::new(ActivityType::AdminLogin, "Admin logged in")
            .with_details(json!({ "username": request.username })),
    );

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

/// Revoke the presented token.
#[utoipa::path(
    post,
    path = "/admin/logout",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session revoked", body = LogoutResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    AdminSession(token): AdminSession,
    State(state): State<AppState>,
) -> Json<LogoutResponse> {
    state.sessions.logout(&token);
    info!("Admin session revoked");
    note_activity(
        &state,
        ActivityRecord::new(ActivityType::AdminLogout, "Admin logged out"),
    );
    Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    })
}

/// Get system statistics.
///
/// Aggregates ledger state over every known phone. The figures are
/// eventually consistent: the ledger may change between lookups.
#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "System statistics", body = SystemStatsResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_system_stats(
    AdminSession(_session): AdminSession,
    State(state): State<AppState>,
) -> Result<Json<SystemStatsResponse>, ApiError> {
    let phones = known_phones(&state)?;
    let total_users = phones.len();

    let mut registered_users = 0;
    let mut total_balance = LedgerInt::ZERO;
    let mut total_transactions = 0;
    for (_, user) in lookup_users(&state, phones).await {
        let Some(user) = user else { continue };
        if user.is_registered {
            registered_users += 1;
        }
        total_balance = total_balance
            .checked_add(user.balance)
            .ok_or_else(|| ApiError::internal("Balance total overflowed"))?;
        total_transactions += user.history.len();
    }

    let total_activities = state.tracking.activity_count().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to count activities");
        0
    });

    Ok(Json(SystemStatsResponse {
        total_users,
        registered_users,
        total_balance: total_balance.to_json_number(),
        total_transactions,
        total_activities,
        active_sessions: state.sessions.active_sessions(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// List every known phone with its ledger view.
///
/// Phones the ledger has no record of are listed as unregistered with a zero
/// balance.
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User summaries", body = AdminUserListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_users(
    AdminSession(_session): AdminSession,
    State(state): State<AppState>,
) -> Result<Json<AdminUserListResponse>, ApiError> {
    let phones = known_phones(&state)?;
    let users: Vec<AdminUserSummary> = lookup_users(&state, phones)
        .await
        .into_iter()
        .map(|(phone, user)| match user {
            Some(user) => AdminUserSummary {
                phone,
                balance: user.balance.to_json_number(),
                is_registered: user.is_registered,
                transaction_count: user.history.len(),
            },
            None => AdminUserSummary {
                phone,
                balance: LedgerInt::ZERO.to_json_number(),
                is_registered: false,
                transaction_count: 0,
            },
        })
        .collect();

    let total = users.len();
    Ok(Json(AdminUserListResponse { users, total }))
}

/// Recent activity, newest first.
#[utoipa::path(
    get,
    path = "/admin/activities",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(ActivityQueryParams),
    responses(
        (status = 200, description = "Recent activity", body = ActivityListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_activities(
    AdminSession(_session): AdminSession,
    State(state): State<AppState>,
    Query(params): Query<ActivityQueryParams>,
) -> Result<Json<ActivityListResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .min(MAX_ACTIVITIES);

    let activities = state.tracking.recent_activities(limit).map_err(|e| {
        warn!(error = %e, "Failed to read activities");
        ApiError::internal("Failed to read activities")
    })?;
    let total = state.tracking.activity_count().unwrap_or(activities.len());

    Ok(Json(ActivityListResponse { activities, total }))
}

// ============================================================================
// Helpers
// ============================================================================

fn known_phones(state: &AppState) -> Result<Vec<String>, ApiError> {
    state.tracking.known_phones().map_err(|e| {
        warn!(error = %e, "Failed to read known phones");
        ApiError::internal("Failed to read known phones")
    })
}

/// One ledger lookup per phone, in order. Failed lookups are dropped.
async fn lookup_users(
    state: &AppState,
    phones: Vec<String>,
) -> Vec<(String, Option<LedgerUser>)> {
    let mut users = Vec::with_capacity(phones.len());
    for phone in phones {
        match state.ledger.get_user_by_phone(&phone).await {
            Ok(user) => users.push((phone, user)),
            Err(e) => warn!(phone = %phone, error = %e, "Skipping phone: ledger lookup failed"),
        }
    }
    users
}

fn note_activity(state: &AppState, activity: ActivityRecord) {
    if let Err(e) = state.tracking.record_activity(activity) {
        warn!(error = %e, "Failed to record activity");
    }
}
