// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! USSD stage endpoints.
//!
//! The aggregator posts the raw session payload; bodies are read as bytes so
//! malformed JSON still gets an envelope rather than an extractor rejection.

use axum::{body::Bytes, extract::State};

use crate::{
    state::AppState,
    ussd::{SessionFields, StageRouter, UssdRequest, UssdResponse, UssdStage},
};

async fn run_stage(state: &AppState, stage: UssdStage, body: &[u8]) -> UssdResponse {
    let fields = SessionFields::from_body(body);
    StageRouter::new(state.ledger.as_ref(), state.tracking.as_ref())
        .dispatch(stage, fields)
        .await
}

/// Check whether the caller is registered.
#[utoipa::path(
    post,
    path = "/validate",
    tag = "USSD",
    request_body = UssdRequest,
    responses(
        (status = 200, description = "USSD envelope; `code` carries the outcome", body = UssdResponse)
    )
)]
pub async fn validate(State(state): State<AppState>, body: Bytes) -> UssdResponse {
    run_stage(&state, UssdStage::Validate, &body).await
}

/// Registration step 1: save the caller's phone number.
#[utoipa::path(
    post,
    path = "/registerstg1",
    tag = "USSD",
    request_body = UssdRequest,
    responses(
        (status = 200, description = "USSD envelope", body = UssdResponse)
    )
)]
pub async fn register_phone(State(state): State<AppState>, body: Bytes) -> UssdResponse {
    run_stage(&state, UssdStage::RegisterPhone, &body).await
}

/// Registration step 2: set the PIN from `input.value` / `input.key`.
#[utoipa::path(
    post,
    path = "/registerstg2",
    tag = "USSD",
    request_body = UssdRequest,
    responses(
        (status = 200, description = "USSD envelope", body = UssdResponse)
    )
)]
pub async fn register_pin(State(state): State<AppState>, body: Bytes) -> UssdResponse {
    run_stage(&state, UssdStage::RegisterPin, &body).await
}

/// Registration step 3: confirm the PIN.
#[utoipa::path(
    post,
    path = "/registerstg3",
    tag = "USSD",
    request_body = UssdRequest,
    responses(
        (status = 200, description = "USSD envelope", body = UssdResponse)
    )
)]
pub async fn confirm_pin(State(state): State<AppState>, body: Bytes) -> UssdResponse {
    run_stage(&state, UssdStage::ConfirmPin, &body).await
}

/// Send funds. Input format: `recipient|amount|pin`.
#[utoipa::path(
    post,
    path = "/transfer",
    tag = "USSD",
    request_body = UssdRequest,
    responses(
        (status = 200, description = "USSD envelope", body = UssdResponse)
    )
)]
pub async fn transfer(State(state): State<AppState>, body: Bytes) -> UssdResponse {
    run_stage(&state, UssdStage::Transfer, &body).await
}
