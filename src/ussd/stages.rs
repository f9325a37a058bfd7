// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stage router and per-stage handlers.
//!
//! Every stage resolves to exactly one [`UssdResponse`] and issues at most
//! one ledger call. Input problems are answered before the ledger is
//! contacted; ledger errors are answered with a `500` envelope and never
//! propagate.

use serde_json::json;
use tracing::{error, info, warn};

use super::{
    envelope::{UssdAction, UssdResponse},
    extract::SessionFields,
    normalize::{
        classify_phone_registration, classify_pin_confirmation, classify_pin_setup,
        classify_transfer, LedgerVerdict,
    },
    transfer::TransferInstruction,
};
use crate::{
    ledger::{LedgerClient, LedgerError},
    tracking::{ActivityRecord, ActivityType, TrackingStore},
};

const MSG_MISSING_PHONE: &str = "Phone number is required";
const MSG_WELCOME: &str = "Welcome to USSD-Defi";
const MSG_NOT_REGISTERED: &str = "This Number is not registered";
const MSG_ENTER_PIN: &str = "Enter your PIN";
const MSG_MISSING_PIN: &str = "PIN is required";
const MSG_CONFIRM_PIN: &str = "Confirm your PIN";
const MSG_MISSING_CONFIRMATION: &str = "PIN confirmation is required";
const MSG_REGISTERED: &str = "Registration successful";
const MSG_BAD_TRANSFER: &str = "Invalid transfer format. Use recipient|amount|pin";
const MSG_TRANSFERRED: &str = "Transfer successful";
const MSG_SERVICE_ERROR: &str = "Service error";
const MSG_TRANSFER_FAILED: &str = "Transfer failed";

/// USSD menu stages served by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UssdStage {
    /// Is the caller registered?
    Validate,
    /// Registration step 1: save the phone number.
    RegisterPhone,
    /// Registration step 2: choose a PIN.
    RegisterPin,
    /// Registration step 3: confirm the PIN.
    ConfirmPin,
    /// Send funds to another phone.
    Transfer,
}

impl UssdStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UssdStage::Validate => "validate",
            UssdStage::RegisterPhone => "register_phone",
            UssdStage::RegisterPin => "register_pin",
            UssdStage::ConfirmPin => "confirm_pin",
            UssdStage::Transfer => "transfer",
        }
    }
}

/// Routes a stage callback to its handler.
pub struct StageRouter<'a> {
    ledger: &'a dyn LedgerClient,
    tracking: &'a dyn TrackingStore,
}

impl<'a> StageRouter<'a> {
    pub fn new(ledger: &'a dyn LedgerClient, tracking: &'a dyn TrackingStore) -> Self {
        Self { ledger, tracking }
    }

    pub async fn dispatch(&self, stage: UssdStage, fields: SessionFields) -> UssdResponse {
        let Some(phone) = fields.session_id.as_deref() else {
            warn!(stage = stage.as_str(), "USSD callback without session msisdn");
            return UssdResponse::new(400, MSG_MISSING_PHONE).with_action(UssdAction::Back);
        };

        self.note_phone(phone);
        let input = fields.staged_input.as_deref();

        let response = match stage {
            UssdStage::Validate => self.validate(phone).await,
            UssdStage::RegisterPhone => self.register_phone(phone).await,
            UssdStage::RegisterPin => self.register_pin(phone, input).await,
            UssdStage::ConfirmPin => self.confirm_pin(phone, input).await,
            UssdStage::Transfer => self.transfer(phone, input).await,
        };

        info!(
            stage = stage.as_str(),
            phone = %phone,
            code = response.code.as_deref().unwrap_or("-"),
            action = ?response.action,
            "USSD stage answered"
        );
        response
    }

    async fn validate(&self, phone: &str) -> UssdResponse {
        match self.ledger.is_user_registered(phone).await {
            Ok(true) => UssdResponse::new(200, MSG_WELCOME).with_action(UssdAction::Next),
            Ok(false) => UssdResponse::new(404, MSG_NOT_REGISTERED),
            Err(e) => service_error(UssdStage::Validate, &e, MSG_SERVICE_ERROR),
        }
    }

    async fn register_phone(&self, phone: &str) -> UssdResponse {
        let reply = match self.ledger.set_registration_phone(phone, phone).await {
            Ok(reply) => reply,
            Err(e) => return service_error(UssdStage::RegisterPhone, &e, MSG_SERVICE_ERROR),
        };

        match classify_phone_registration(&reply) {
            LedgerVerdict::Accepted => {
                self.note_activity(
                    ActivityRecord::new(ActivityType::RegistrationStarted, "Registration started")
                        .with_details(json!({ "phone": phone })),
                );
                UssdResponse::new(200, MSG_ENTER_PIN)
            }
            LedgerVerdict::Duplicate => {
                UssdResponse::message_only(reply).with_action(UssdAction::Back)
            }
            LedgerVerdict::Rejected => {
                UssdResponse::new(400, reply).with_action(UssdAction::Back)
            }
        }
    }

    async fn register_pin(&self, phone: &str, pin: Option<&str>) -> UssdResponse {
        let Some(pin) = pin else {
            return UssdResponse::new(400, MSG_MISSING_PIN).with_action(UssdAction::Retry);
        };

        let reply = match self.ledger.set_registration_pin(phone, pin).await {
            Ok(reply) => reply,
            Err(e) => return service_error(UssdStage::RegisterPin, &e, MSG_SERVICE_ERROR),
        };

        match classify_pin_setup(&reply) {
            LedgerVerdict::Accepted => {
                self.note_activity(
                    ActivityRecord::new(ActivityType::PinSet, "PIN set")
                        .with_details(json!({ "phone": phone })),
                );
                UssdResponse::new(200, MSG_CONFIRM_PIN).with_action(UssdAction::Next)
            }
            _ => UssdResponse::new(400, reply).with_action(UssdAction::Retry),
        }
    }

    async fn confirm_pin(&self, phone: &str, pin: Option<&str>) -> UssdResponse {
        let Some(pin) = pin else {
            return UssdResponse::new(400, MSG_MISSING_CONFIRMATION)
                .with_action(UssdAction::Retry);
        };

        let reply = match self.ledger.confirm_registration_pin(phone, pin).await {
            Ok(reply) => reply,
            Err(e) => return service_error(UssdStage::ConfirmPin, &e, MSG_SERVICE_ERROR),
        };

        match classify_pin_confirmation(&reply) {
            LedgerVerdict::Accepted => {
                self.note_activity(
                    ActivityRecord::new(ActivityType::UserRegistered, "New user registered")
                        .with_details(json!({ "phone": phone })),
                );
                UssdResponse::new(201, MSG_REGISTERED).with_action(UssdAction::Next)
            }
            _ => UssdResponse::new(400, reply).with_action(UssdAction::Retry),
        }
    }

    async fn transfer(&self, phone: &str, input: Option<&str>) -> UssdResponse {
        let instruction = match input.unwrap_or_default().parse::<TransferInstruction>() {
            Ok(instruction) => instruction,
            Err(e) => {
                warn!(phone = %phone, error = %e, "Malformed transfer input");
                return UssdResponse::new(400, MSG_BAD_TRANSFER).with_action(UssdAction::Back);
            }
        };

        let reply = match self
            .ledger
            .transfer(phone, &instruction.recipient, instruction.amount, &instruction.pin)
            .await
        {
            Ok(reply) => reply,
            Err(e) => return service_error(UssdStage::Transfer, &e, MSG_TRANSFER_FAILED),
        };

        let details = json!({
            "from": phone,
            "to": instruction.recipient,
            "amount": instruction.amount,
        });

        match classify_transfer(&reply) {
            LedgerVerdict::Accepted => {
                self.note_activity(
                    ActivityRecord::new(ActivityType::Transfer, "Transfer completed")
                        .with_details(details),
                );
                UssdResponse::new(200, MSG_TRANSFERRED).with_action(UssdAction::Next)
            }
            _ => {
                self.note_activity(
                    ActivityRecord::new(ActivityType::TransferFailed, reply.clone())
                        .with_details(details),
                );
                UssdResponse::new(400, reply).with_action(UssdAction::Back)
            }
        }
    }

    fn note_phone(&self, phone: &str) {
        if let Err(e) = self.tracking.record_phone(phone) {
            warn!(phone = %phone, error = %e, "Failed to track phone");
        }
    }

    fn note_activity(&self, activity: ActivityRecord) {
        if let Err(e) = self.tracking.record_activity(activity) {
            warn!(error = %e, "Failed to record activity");
        }
    }
}

fn service_error(stage: UssdStage, err: &LedgerError, message: &str) -> UssdResponse {
    error!(stage = stage.as_str(), error = %err, "Ledger call failed");
    UssdResponse::new(500, message).with_action(UssdAction::Back)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{methods, testing::ScriptedLedger};
    use crate::tracking::InMemoryTrackingStore;

    const PHONE: &str = "254700000001";

    fn fields(input: Option<&str>) -> SessionFields {
        SessionFields {
            session_id: Some(PHONE.to_string()),
            staged_input: input.map(str::to_string),
        }
    }

    async fn run(
        ledger: &ScriptedLedger,
        tracking: &InMemoryTrackingStore,
        stage: UssdStage,
        fields: SessionFields,
    ) -> UssdResponse {
        StageRouter::new(ledger, tracking).dispatch(stage, fields).await
    }

    #[tokio::test]
    async fn missing_session_never_reaches_ledger() {
        let ledger = ScriptedLedger::new();
        let tracking = InMemoryTrackingStore::new();
        let stages = [
            UssdStage::Validate,
            UssdStage::RegisterPhone,
            UssdStage::RegisterPin,
            UssdStage::ConfirmPin,
            UssdStage::Transfer,
        ];

        for stage in stages {
            let response = run(
                &ledger,
                &tracking,
                stage,
                SessionFields {
                    session_id: None,
                    staged_input: Some("254700000000|100|1234".to_string()),
                },
            )
            .await;
            assert_eq!(response.code.as_deref(), Some("400"), "stage {stage:?}");
            assert_eq!(response.action, Some(UssdAction::Back));
        }

        assert_eq!(ledger.call_count(), 0);
        assert!(tracking.known_phones().unwrap().is_empty());
    }

    #[tokio::test]
    async fn validate_registered_and_unregistered() {
        let ledger = ScriptedLedger::new().with_registered(PHONE);
        let tracking = InMemoryTrackingStore::new();

        let registered = run(&ledger, &tracking, UssdStage::Validate, fields(None)).await;
        assert_eq!(
            registered,
            UssdResponse {
                code: Some("200".to_string()),
                message: "Welcome to USSD-Defi".to_string(),
                action: Some(UssdAction::Next),
            }
        );

        let other = SessionFields {
            session_id: Some("254700000002".to_string()),
            staged_input: None,
        };
        let unregistered = run(&ledger, &tracking, UssdStage::Validate, other).await;
        assert_eq!(
            unregistered,
            UssdResponse {
                code: Some("404".to_string()),
                message: "This Number is not registered".to_string(),
                action: None,
            }
        );

        assert_eq!(tracking.known_phones().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn register_phone_outcomes() {
        let tracking = InMemoryTrackingStore::new();

        let saved = ScriptedLedger::new().with_text(
            methods::SET_REGISTRATION_PHONE,
            "Phone number saved. Proceed to set PIN",
        );
        let response = run(&saved, &tracking, UssdStage::RegisterPhone, fields(None)).await;
        assert_eq!(response.code.as_deref(), Some("200"));
        assert_eq!(response.action, None);
        assert_eq!(
            saved.calls()[0].args,
            vec![PHONE.to_string(), PHONE.to_string()]
        );

        let duplicate = ScriptedLedger::new().with_text(
            methods::SET_REGISTRATION_PHONE,
            "This number is already registered",
        );
        let response = run(&duplicate, &tracking, UssdStage::RegisterPhone, fields(None)).await;
        assert_eq!(response.code, None);
        assert_eq!(response.message, "This number is already registered");
        assert_eq!(response.action, Some(UssdAction::Back));

        let rejected = ScriptedLedger::new()
            .with_text(methods::SET_REGISTRATION_PHONE, "Invalid phone number format");
        let response = run(&rejected, &tracking, UssdStage::RegisterPhone, fields(None)).await;
        assert_eq!(response.code.as_deref(), Some("400"));
        assert_eq!(response.action, Some(UssdAction::Back));
    }

    #[tokio::test]
    async fn register_pin_requires_input_and_retries_on_rejection() {
        let tracking = InMemoryTrackingStore::new();
        let ledger = ScriptedLedger::new()
            .with_text(methods::SET_REGISTRATION_PIN, "PIN must be exactly 4 digits");

        let missing = run(&ledger, &tracking, UssdStage::RegisterPin, fields(None)).await;
        assert_eq!(missing.code.as_deref(), Some("400"));
        assert_eq!(missing.action, Some(UssdAction::Retry));
        assert_eq!(ledger.call_count(), 0);

        let rejected = run(&ledger, &tracking, UssdStage::RegisterPin, fields(Some("12"))).await;
        assert_eq!(rejected.message, "PIN must be exactly 4 digits");
        assert_eq!(rejected.action, Some(UssdAction::Retry));

        let accepting =
            ScriptedLedger::new().with_text(methods::SET_REGISTRATION_PIN, "PIN saved successfully");
        let saved = run(&accepting, &tracking, UssdStage::RegisterPin, fields(Some("1234"))).await;
        assert_eq!(saved.code.as_deref(), Some("200"));
        assert_eq!(saved.action, Some(UssdAction::Next));
    }

    #[tokio::test]
    async fn confirm_pin_requires_exact_success_text() {
        let tracking = InMemoryTrackingStore::new();
        let ledger = ScriptedLedger::new()
            .with_text(methods::CONFIRM_REGISTRATION_PIN, "Registration successful");

        let done = run(&ledger, &tracking, UssdStage::ConfirmPin, fields(Some("1234"))).await;
        assert_eq!(done.code.as_deref(), Some("201"));
        assert_eq!(done.action, Some(UssdAction::Next));

        let activities = tracking.recent_activities(10).unwrap();
        assert_eq!(activities[0].activity_type, ActivityType::UserRegistered);

        let mismatch = ScriptedLedger::new()
            .with_text(methods::CONFIRM_REGISTRATION_PIN, "PINs do not match");
        let retry = run(&mismatch, &tracking, UssdStage::ConfirmPin, fields(Some("9999"))).await;
        assert_eq!(retry.code.as_deref(), Some("400"));
        assert_eq!(retry.message, "PINs do not match");
        assert_eq!(retry.action, Some(UssdAction::Retry));
    }

    #[tokio::test]
    async fn transfer_success_passes_parsed_fields() {
        let tracking = InMemoryTrackingStore::new();
        let ledger = ScriptedLedger::new().with_text(methods::TRANSFER, "Transfer successful");

        let response = run(
            &ledger,
            &tracking,
            UssdStage::Transfer,
            fields(Some("254700000000|100|1234")),
        )
        .await;
        assert_eq!(response.code.as_deref(), Some("200"));
        assert_eq!(response.action, Some(UssdAction::Next));

        let calls = ledger.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, methods::TRANSFER);
        assert_eq!(calls[0].args, vec![PHONE, "254700000000", "100", "1234"]);

        let activity = &tracking.recent_activities(1).unwrap()[0];
        assert_eq!(activity.activity_type, ActivityType::Transfer);
        assert!(activity.details.get("pin").is_none());
    }

    #[tokio::test]
    async fn malformed_transfer_makes_no_ledger_call() {
        let tracking = InMemoryTrackingStore::new();
        let ledger = ScriptedLedger::new().with_text(methods::TRANSFER, "Transfer successful");

        for input in [Some("onlytwo|fields"), Some("254700000000|abc|1234"), None] {
            let response = run(&ledger, &tracking, UssdStage::Transfer, fields(input)).await;
            assert_eq!(response.code.as_deref(), Some("400"));
            assert_eq!(response.action, Some(UssdAction::Back));
        }
        assert_eq!(ledger.call_count(), 0);
    }

    #[tokio::test]
    async fn transfer_rejection_is_passed_through() {
        let tracking = InMemoryTrackingStore::new();
        let ledger = ScriptedLedger::new().with_text(methods::TRANSFER, "Insufficient balance");

        let response = run(
            &ledger,
            &tracking,
            UssdStage::Transfer,
            fields(Some("254700000000|100|1234")),
        )
        .await;
        assert_eq!(response.code.as_deref(), Some("400"));
        assert_eq!(response.message, "Insufficient balance");
        assert_eq!(response.action, Some(UssdAction::Back));
        assert_eq!(
            tracking.recent_activities(1).unwrap()[0].activity_type,
            ActivityType::TransferFailed
        );
    }

    #[tokio::test]
    async fn ledger_failures_become_500_envelopes() {
        let tracking = InMemoryTrackingStore::new();
        let ledger = ScriptedLedger::new()
            .failing(methods::IS_USER_REGISTERED)
            .failing(methods::TRANSFER);

        let validate = run(&ledger, &tracking, UssdStage::Validate, fields(None)).await;
        assert_eq!(
            validate,
            UssdResponse::new(500, "Service error").with_action(UssdAction::Back)
        );

        let transfer = run(
            &ledger,
            &tracking,
            UssdStage::Transfer,
            fields(Some("254700000000|100|1234")),
        )
        .await;
        assert_eq!(
            transfer,
            UssdResponse::new(500, "Transfer failed").with_action(UssdAction::Back)
        );
    }
}
