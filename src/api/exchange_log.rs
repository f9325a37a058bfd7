// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request/response logging middleware.
//!
//! Every exchange is logged once at `info` with method, path, status and
//! latency. With `debug` enabled the request and response bodies are logged
//! as well. Only bodies of known size up to [`MAX_LOGGED_BODY`] are
//! buffered; others, and anything under `/admin/login`, pass through
//! unlogged.
//!
//! The registration and transfer stages carry PINs in `input.value` (or
//! `input.key`). Those fields are replaced with [`REDACTED`] before the
//! request body is logged, and a body that is not JSON is not logged at all.

use std::time::Instant;

use axum::{
    body::{to_bytes, Body, HttpBody},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, info, warn, Level};

/// Upper bound on a body buffered for debug logging.
pub const MAX_LOGGED_BODY: usize = 64 * 1024;

/// Placeholder logged instead of a PIN-bearing input.
pub const REDACTED: &str = "[redacted]";

const UNLOGGED_PATHS: &[&str] = &["/admin/login"];

const PIN_INPUT_PATHS: &[&str] = &["/registerstg2", "/registerstg3", "/transfer"];

/// Loggable rendering of a request body, or `None` when it cannot be shown.
fn request_body_for_log(path: &str, bytes: &[u8]) -> Option<String> {
    if !PIN_INPUT_PATHS.contains(&path) {
        return Some(String::from_utf8_lossy(bytes).into_owned());
    }

    let mut body: Value = serde_json::from_slice(bytes).ok()?;
    if let Some(input) = body.get_mut("input").and_then(Value::as_object_mut) {
        for field in ["value", "key"] {
            if let Some(slot) = input.get_mut(field) {
                *slot = Value::String(REDACTED.to_string());
            }
        }
    }
    Some(body.to_string())
}

fn loggable(body: &Body) -> bool {
    body.size_hint()
        .exact()
        .is_some_and(|len| len <= MAX_LOGGED_BODY as u64)
}

pub async fn log_exchange(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let capture = tracing::enabled!(Level::DEBUG) && !UNLOGGED_PATHS.contains(&path.as_str());

    let request = if capture && loggable(request.body()) {
        let (parts, body) = request.into_parts();
        let bytes = match to_bytes(body, MAX_LOGGED_BODY).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(method = %method, path = %path, error = %e, "Request body unreadable");
                return StatusCode::BAD_REQUEST.into_response();
            }
        };
        match request_body_for_log(&path, &bytes) {
            Some(body) => debug!(method = %method, path = %path, body = %body, "Request body"),
            None => debug!(method = %method, path = %path, "Request body withheld"),
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;
    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;

    info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        latency_ms,
        "Request handled"
    );

    if !capture || !loggable(response.body()) {
        return response;
    }

    let (parts, body) = response.into_parts();
    match to_bytes(body, MAX_LOGGED_BODY).await {
        Ok(bytes) => {
            debug!(path = %path, body = %String::from_utf8_lossy(&bytes), "Response body");
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            warn!(path = %path, error = %e, "Response body unreadable");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
