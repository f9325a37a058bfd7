// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use ussd_ledger_gateway::{
    api::router,
    auth::{AdminCredentials, AdminSessions, SessionSweeper},
    config::{GatewayConfig, LogFormat},
    ledger::JsonRpcLedgerClient,
    state::AppState,
    telemetry::init_tracing,
    tracking::{InMemoryTrackingStore, RedbTrackingStore, TrackingStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing(LogFormat::from_env());

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = GatewayConfig::from_env()?;
    info!(?config, "Configuration loaded");

    let ledger = JsonRpcLedgerClient::new(
        &config.ledger_rpc_url,
        config.ledger_canister_id.clone(),
        config.ledger_timeout,
    )?;
    info!(
        rpc_url = %config.ledger_rpc_url,
        canister_id = %config.ledger_canister_id,
        "Ledger client ready"
    );

    let tracking: Arc<dyn TrackingStore> = match &config.tracking_db_path {
        Some(path) => {
            info!(path = %path.display(), "Using redb tracking store");
            Arc::new(RedbTrackingStore::open(path)?)
        }
        None => {
            info!("Using in-memory tracking store");
            Arc::new(InMemoryTrackingStore::new())
        }
    };

    let credentials = match &config.admin_password {
        Some(password) => Some(AdminCredentials::new(config.admin_username.clone(), password)),
        None => {
            warn!("ADMIN_PASSWORD not set; admin login disabled");
            None
        }
    };
    let ttl = chrono::Duration::from_std(config.admin_session_ttl)?;
    let sessions = Arc::new(AdminSessions::new(credentials, ttl));

    let shutdown = CancellationToken::new();
    let sweeper = tokio::spawn(SessionSweeper::new(sessions.clone()).run(shutdown.clone()));

    let state = AppState::new(
        Arc::new(ledger),
        tracking,
        sessions,
        config.ledger_canister_id.clone(),
    );
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "USSD gateway listening (docs at /docs)");

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        warn!(error = %e, "Session sweeper task failed");
    }
    info!("Gateway stopped");
    Ok(())
}
