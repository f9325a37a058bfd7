// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    ledger::LedgerLogEntry,
    state::AppState,
    tracking::{ActivityRecord, ActivityType},
    ussd::{UssdAction, UssdRequest, UssdResponse},
};

pub mod admin;
pub mod exchange_log;
pub mod funds;
pub mod health;
pub mod logs;
pub mod ussd;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/validate", post(ussd::validate))
        .route("/registerstg1", post(ussd::register_phone))
        .route("/registerstg2", post(ussd::register_pin))
        .route("/registerstg3", post(ussd::confirm_pin))
        .route("/transfer", post(ussd::transfer))
        .route("/addfunds", post(funds::add_funds))
        .route("/balance", post(funds::balance))
        .route("/health", get(health::health))
        .route("/admin/login", post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .route("/admin/stats", get(admin::get_system_stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/activities", get(admin::list_activities))
        .route("/logs", get(logs::list_logs).delete(logs::clear_logs))
        .route(
            "/logs/{endpoint}",
            get(logs::list_logs_by_endpoint).post(logs::record_log),
        )
        .route("/count", get(logs::count))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(exchange_log::log_exchange))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        ussd::validate,
        ussd::register_phone,
        ussd::register_pin,
        ussd::confirm_pin,
        ussd::transfer,
        funds::add_funds,
        funds::balance,
        health::health,
        admin::login,
        admin::logout,
        admin::get_system_stats,
        admin::list_users,
        admin::list_activities,
        logs::list_logs,
        logs::list_logs_by_endpoint,
        logs::record_log,
        logs::count,
        logs::clear_logs
    ),
    components(
        schemas(
            UssdRequest,
            UssdResponse,
            UssdAction,
            ActivityRecord,
            ActivityType,
            LedgerLogEntry,
            funds::AddFundsRequest,
            funds::AddFundsResponse,
            funds::BalanceRequest,
            funds::BalanceResponse,
            health::HealthResponse,
            admin::LoginRequest,
            admin::LoginResponse,
            admin::LogoutResponse,
            admin::SystemStatsResponse,
            admin::AdminUserSummary,
            admin::AdminUserListResponse,
            admin::ActivityListResponse,
            logs::ClearLogsResponse,
            logs::CountResponse,
            logs::LogEventResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "USSD", description = "USSD aggregator stage callbacks"),
        (name = "Funds", description = "Balance test helpers"),
        (name = "Health", description = "Liveness"),
        (name = "Admin", description = "Operator reporting"),
        (name = "Logs", description = "Ledger audit log passthrough")
    )
)]
struct ApiDoc;
