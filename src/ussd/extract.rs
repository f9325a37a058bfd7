// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session field extraction from aggregator request bodies.
//!
//! Aggregator payloads are loosely shaped, so extraction works on raw JSON
//! pointers instead of a strict schema. A body that is not JSON at all is
//! treated like an empty one.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

const MSISDN_POINTER: &str = "/props/session/msisdn";
const INPUT_VALUE_POINTER: &str = "/input/value";
const INPUT_KEY_POINTER: &str = "/input/key";

/// Documented shape of an aggregator callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UssdRequest {
    #[serde(default)]
    pub props: Option<UssdProps>,
    #[serde(default)]
    pub input: Option<UssdInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UssdProps {
    #[serde(default)]
    pub session: Option<UssdSession>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UssdSession {
    /// Subscriber phone number.
    #[serde(default)]
    pub msisdn: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UssdInput {
    /// Menu key pressed; used when `value` is empty.
    #[serde(default)]
    pub key: Option<String>,
    /// Free-text input for the current stage.
    #[serde(default)]
    pub value: Option<String>,
}

/// Caller identity and staged input of one callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFields {
    pub session_id: Option<String>,
    pub staged_input: Option<String>,
}

impl SessionFields {
    /// Extract from a raw request body.
    pub fn from_body(body: &[u8]) -> Self {
        let value = serde_json::from_slice::<Value>(body).unwrap_or(Value::Null);
        Self::from_value(&value)
    }

    pub fn from_value(body: &Value) -> Self {
        let session_id = body.pointer(MSISDN_POINTER).and_then(scalar_text);
        let staged_input = body
            .pointer(INPUT_VALUE_POINTER)
            .and_then(scalar_text)
            .or_else(|| body.pointer(INPUT_KEY_POINTER).and_then(scalar_text));

        Self {
            session_id,
            staged_input,
        }
    }
}

/// Non-empty text of a JSON scalar. Numbers are accepted since some
/// aggregators send keypad input and MSISDNs as numbers.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
