// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! USSD response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How the aggregator should move the session along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UssdAction {
    /// Proceed to the next stage.
    Next,
    /// Abort / return to the previous menu.
    Back,
    /// Re-prompt the current stage.
    Retry,
}

/// Envelope returned for every USSD stage callback.
///
/// `code` and `action` are omitted from the JSON when absent. A response
/// without `action` lets the aggregator continue with its default flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UssdResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<UssdAction>,
}

impl UssdResponse {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.to_string()),
            message: message.into(),
            action: None,
        }
    }

    /// Envelope carrying only a message (no code).
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            action: None,
        }
    }

    pub fn with_action(mut self, action: UssdAction) -> Self {
        self.action = Some(action);
        self
    }
}

impl IntoResponse for UssdResponse {
    /// Always HTTP 200; the aggregator reads the outcome from `code`.
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
