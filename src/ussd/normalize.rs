// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Classification of the ledger's free-text replies.
//!
//! The canister reports outcomes as prose, so its wording is the protocol.
//! The exact fragments below are matched verbatim; any change on the ledger
//! side has to be mirrored here. Everything downstream works on
//! [`LedgerVerdict`] so a structured ledger reply can replace this module
//! without touching the stage handlers.

pub const PHONE_SAVED: &str = "Phone number saved";
pub const ALREADY_REGISTERED: &str = "already registered";
pub const PIN_SAVED: &str = "PIN saved";
pub const REGISTRATION_SUCCESSFUL: &str = "Registration successful";
pub const TRANSFER_SUCCESSFUL: &str = "Transfer successful";

/// Outcome of a text-returning ledger call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerVerdict {
    Accepted,
    /// The subject already exists (duplicate registration).
    Duplicate,
    Rejected,
}

/// `setRegistrationPhone`: substring match, success checked first.
pub fn classify_phone_registration(reply: &str) -> LedgerVerdict {
    if reply.contains(PHONE_SAVED) {
        LedgerVerdict::Accepted
    } else if reply.contains(ALREADY_REGISTERED) {
        LedgerVerdict::Duplicate
    } else {
        LedgerVerdict::Rejected
    }
}

/// `setRegistrationPin`: substring match.
pub fn classify_pin_setup(reply: &str) -> LedgerVerdict {
    if reply.contains(PIN_SAVED) {
        LedgerVerdict::Accepted
    } else {
        LedgerVerdict::Rejected
    }
}

/// `confirmRegistrationPin`: exact match.
pub fn classify_pin_confirmation(reply: &str) -> LedgerVerdict {
    if reply == REGISTRATION_SUCCESSFUL {
        LedgerVerdict::Accepted
    } else {
        LedgerVerdict::Rejected
    }
}

/// `transfer`: exact match.
pub fn classify_transfer(reply: &str) -> LedgerVerdict {
    if reply == TRANSFER_SUCCESSFUL {
        LedgerVerdict::Accepted
    } else {
        LedgerVerdict::Rejected
    }
}
