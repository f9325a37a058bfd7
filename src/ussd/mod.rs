// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # USSD Session-Stage Protocol
//!
//! The aggregator drives a USSD session through a fixed sequence of HTTP
//! callbacks, one per menu stage. Each callback carries the subscriber's
//! MSISDN and whatever they typed; the gateway answers with an envelope
//! whose `action` tells the aggregator whether to advance (`next`), abort
//! (`back`) or re-prompt the same stage (`retry`).
//!
//! ```text
//! body ──extract──▶ SessionFields ──StageRouter::dispatch──▶ ledger call
//!                                                               │
//!             UssdResponse ◀──normalize (verdict + envelope)────┘
//! ```
//!
//! - [`extract`] - pulls MSISDN and staged input out of the request body
//! - [`stages`] - stage router and per-stage handlers
//! - [`transfer`] - `recipient|amount|pin` parser
//! - [`normalize`] - ledger reply classification
//! - [`envelope`] - the response envelope

pub mod envelope;
pub mod extract;
pub mod normalize;
pub mod stages;
pub mod transfer;

pub use envelope::{UssdAction, UssdResponse};
pub use extract::{SessionFields, UssdRequest};
pub use stages::{StageRouter, UssdStage};
pub use transfer::{TransferInstruction, TransferParseError};
