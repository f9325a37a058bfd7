// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Parser for the transfer stage input `recipient|amount|pin`.

use std::{fmt, str::FromStr};

/// A parsed transfer request. The amount is in the ledger's native unit.
#[derive(Clone, PartialEq, Eq)]
pub struct TransferInstruction {
    pub recipient: String,
    pub amount: u64,
    pub pin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferParseError {
    #[error("expected 3 '|'-separated fields, got {0}")]
    FieldCount(usize),

    #[error("{0} is empty")]
    EmptyField(&'static str),

    #[error("amount {0:?} is not a non-negative integer")]
    InvalidAmount(String),
}

impl FromStr for TransferInstruction {
    type Err = TransferParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = input.split('|').map(str::trim).collect();
        let [recipient, amount, pin] = fields[..] else {
            return Err(TransferParseError::FieldCount(fields.len()));
        };

        if recipient.is_empty() {
            return Err(TransferParseError::EmptyField("recipient"));
        }
        if pin.is_empty() {
            return Err(TransferParseError::EmptyField("pin"));
        }
        let amount = amount
            .parse::<u64>()
            .map_err(|_| TransferParseError::InvalidAmount(amount.to_string()))?;

        Ok(Self {
            recipient: recipient.to_string(),
            amount,
            pin: pin.to_string(),
        })
    }
}

impl fmt::Debug for TransferInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferInstruction")
            .field("recipient", &self.recipient)
            .field("amount", &self.amount)
            .field("pin", &"<redacted>")
            .finish()
    }
}
