// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted in-process ledger for tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;

use super::{methods, LedgerClient, LedgerError, LedgerInt, LedgerLogEntry, LedgerUser};

/// One recorded call: method name and its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCall {
    pub method: &'static str,
    pub args: Vec<String>,
}

/// Ledger double with canned replies and a call journal.
///
/// Text methods answer with the reply registered through [`with_text`],
/// or an empty string. Methods registered through [`failing`] return a
/// transport error.
///
/// [`with_text`]: ScriptedLedger::with_text
/// [`failing`]: ScriptedLedger::failing
#[derive(Default)]
pub struct ScriptedLedger {
    calls: Mutex<Vec<LedgerCall>>,
    registered: Mutex<HashSet<String>>,
    texts: Mutex<HashMap<&'static str, String>>,
    failing: Mutex<HashSet<&'static str>>,
    failing_phones: Mutex<HashSet<String>>,
    users: Mutex<HashMap<String, LedgerUser>>,
    logs: Mutex<Vec<LedgerLogEntry>>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registered(self, phone: &str) -> Self {
        self.registered.lock().unwrap().insert(phone.to_string());
        self
    }

    pub fn with_text(self, method: &'static str, reply: &str) -> Self {
        self.texts.lock().unwrap().insert(method, reply.to_string());
        self
    }

    pub fn failing(self, method: &'static str) -> Self {
        self.failing.lock().unwrap().insert(method);
        self
    }

    /// Make `getUserByPhone` fail for one phone only.
    pub fn failing_lookup(self, phone: &str) -> Self {
        self.failing_phones.lock().unwrap().insert(phone.to_string());
        self
    }

    pub fn with_user(self, phone: &str, balance: i64, is_registered: bool, tx_count: usize) -> Self {
        let user = LedgerUser {
            phone: phone.to_string(),
            balance: LedgerInt::from(balance),
            is_registered,
            history: vec![serde_json::json!({}); tx_count],
            pin: Some("0000".to_string()),
        };
        self.users.lock().unwrap().insert(phone.to_string(), user);
        self
    }

    pub fn with_log(self, id: i64, endpoint: &str, data: &str) -> Self {
        self.logs.lock().unwrap().push(LedgerLogEntry {
            id: LedgerInt::from(id),
            endpoint: endpoint.to_string(),
            data: data.to_string(),
            timestamp: LedgerInt::from(1_700_000_000_000_000_000i64),
        });
        self
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, method: &'static str, args: &[&str]) -> Result<(), LedgerError> {
        self.calls.lock().unwrap().push(LedgerCall {
            method,
            args: args.iter().map(|a| a.to_string()).collect(),
        });
        if self.failing.lock().unwrap().contains(method) {
            return Err(LedgerError::Transport(format!("{method}: connection refused")));
        }
        Ok(())
    }

    fn text(&self, method: &'static str) -> String {
        self.texts
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn is_user_registered(&self, phone: &str) -> Result<bool, LedgerError> {
        self.record(methods::IS_USER_REGISTERED, &[phone])?;
        Ok(self.registered.lock().unwrap().contains(phone))
    }

    async fn set_registration_phone(
        &self,
        phone: &str,
        registration_phone: &str,
    ) -> Result<String, LedgerError> {
        self.record(methods::SET_REGISTRATION_PHONE, &[phone, registration_phone])?;
        Ok(self.text(methods::SET_REGISTRATION_PHONE))
    }

    async fn set_registration_pin(&self, phone: &str, pin: &str) -> Result<String, LedgerError> {
        self.record(methods::SET_REGISTRATION_PIN, &[phone, pin])?;
        Ok(self.text(methods::SET_REGISTRATION_PIN))
    }

    async fn confirm_registration_pin(
        &self,
        phone: &str,
        pin: &str,
    ) -> Result<String, LedgerError> {
        self.record(methods::CONFIRM_REGISTRATION_PIN, &[phone, pin])?;
        Ok(self.text(methods::CONFIRM_REGISTRATION_PIN))
    }

    async fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        pin: &str,
    ) -> Result<String, LedgerError> {
        let amount = amount.to_string();
        self.record(methods::TRANSFER, &[from, to, &amount, pin])?;
        Ok(self.text(methods::TRANSFER))
    }

    async fn get_balance(&self, phone: &str) -> Result<LedgerInt, LedgerError> {
        self.record(methods::GET_BALANCE, &[phone])?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(phone)
            .map(|u| u.balance)
            .unwrap_or(LedgerInt::ZERO))
    }

    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<LedgerUser>, LedgerError> {
        self.record(methods::GET_USER_BY_PHONE, &[phone])?;
        if self.failing_phones.lock().unwrap().contains(phone) {
            return Err(LedgerError::InvalidResponse(format!("no reply for {phone}")));
        }
        Ok(self.users.lock().unwrap().get(phone).cloned())
    }

    async fn add_funds(&self, phone: &str, amount: u64) -> Result<String, LedgerError> {
        let amount = amount.to_string();
        self.record(methods::ADD_FUNDS, &[phone, &amount])?;
        Ok(self.text(methods::ADD_FUNDS))
    }

    async fn log_event(&self, endpoint: &str, data: &str) -> Result<LedgerInt, LedgerError> {
        self.record(methods::LOG_EVENT, &[endpoint, data])?;
        let mut logs = self.logs.lock().unwrap();
        let id = LedgerInt::from(logs.len() as u64);
        logs.push(LedgerLogEntry {
            id,
            endpoint: endpoint.to_string(),
            data: data.to_string(),
            timestamp: LedgerInt::ZERO,
        });
        Ok(id)
    }

    async fn get_logs(&self) -> Result<Vec<LedgerLogEntry>, LedgerError> {
        self.record(methods::GET_LOGS, &[])?;
        Ok(self.logs.lock().unwrap().clone())
    }

    async fn get_logs_by_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<Vec<LedgerLogEntry>, LedgerError> {
        self.record(methods::GET_LOGS_BY_ENDPOINT, &[endpoint])?;
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.endpoint == endpoint)
            .cloned()
            .collect())
    }

    async fn get_count(&self) -> Result<LedgerInt, LedgerError> {
        self.record(methods::GET_COUNT, &[])?;
        Ok(LedgerInt::from(self.logs.lock().unwrap().len() as u64))
    }

    async fn clear_logs(&self) -> Result<(), LedgerError> {
        self.record(methods::CLEAR_LOGS, &[])?;
        self.logs.lock().unwrap().clear();
        Ok(())
    }
}
