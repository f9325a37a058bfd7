// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger-native value types.

use std::fmt;

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
use utoipa::ToSchema;

/// Arbitrary-precision ledger integer (Candid `Nat` / `Int`).
///
/// The canister bridge may encode these as JSON numbers or as decimal
/// strings when they exceed what a JSON number can carry; both are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerInt(pub i128);

impl LedgerInt {
    pub const ZERO: LedgerInt = LedgerInt(0);

    /// Plain JSON number for API responses.
    ///
    /// Exact for everything that fits in `i64` or `u64`; larger magnitudes
    /// fall back to the nearest `f64`.
    pub fn to_json_number(self) -> serde_json::Number {
        if let Ok(v) = i64::try_from(self.0) {
            return serde_json::Number::from(v);
        }
        if let Ok(v) = u64::try_from(self.0) {
            return serde_json::Number::from(v);
        }
        serde_json::Number::from_f64(self.0 as f64).unwrap_or_else(|| serde_json::Number::from(0))
    }

    pub fn checked_add(self, other: LedgerInt) -> Option<LedgerInt> {
        self.0.checked_add(other.0).map(LedgerInt)
    }
}

impl From<i64> for LedgerInt {
    fn from(value: i64) -> Self {
        LedgerInt(value as i128)
    }
}

impl From<u64> for LedgerInt {
    fn from(value: u64) -> Self {
        LedgerInt(value as i128)
    }
}

impl TryFrom<LedgerInt> for u64 {
    type Error = std::num::TryFromIntError;

    fn try_from(value: LedgerInt) -> Result<Self, Self::Error> {
        u64::try_from(value.0)
    }
}

impl fmt::Display for LedgerInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for LedgerInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match i64::try_from(self.0) {
            Ok(v) => serializer.serialize_i64(v),
            Err(_) => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for LedgerInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LedgerIntVisitor)
    }
}

struct LedgerIntVisitor;

impl<'de> Visitor<'de> for LedgerIntVisitor {
    type Value = LedgerInt;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a decimal integer string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LedgerInt, E> {
        Ok(LedgerInt(v as i128))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LedgerInt, E> {
        Ok(LedgerInt(v as i128))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<LedgerInt, E> {
        Ok(LedgerInt(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<LedgerInt, E> {
        i128::try_from(v)
            .map(LedgerInt)
            .map_err(|_| E::custom("integer out of range"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<LedgerInt, E> {
        if v.fract() == 0.0 && v.is_finite() {
            Ok(LedgerInt(v as i128))
        } else {
            Err(E::custom(format!("expected an integer, got {v}")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LedgerInt, E> {
        v.trim()
            .parse::<i128>()
            .map(LedgerInt)
            .map_err(|_| E::custom(format!("invalid integer string: {v:?}")))
    }
}

/// User record as held by the ledger.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerUser {
    pub phone: String,
    pub balance: LedgerInt,
    pub is_registered: bool,
    /// Opaque transaction history entries; only their count is reported.
    #[serde(default)]
    pub history: Vec<serde_json::Value>,
    #[serde(default)]
    pub pin: Option<String>,
}

impl fmt::Debug for LedgerUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerUser")
            .field("phone", &self.phone)
            .field("balance", &self.balance)
            .field("is_registered", &self.is_registered)
            .field("history", &self.history.len())
            .field("pin", &self.pin.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Entry in the canister's own request audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LedgerLogEntry {
    #[schema(value_type = i64)]
    pub id: LedgerInt,
    pub endpoint: String,
    pub data: String,
    /// Canister time, nanoseconds since the Unix epoch.
    #[schema(value_type = i64)]
    pub timestamp: LedgerInt,
}
