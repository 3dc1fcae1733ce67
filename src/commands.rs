//! Command layer the front end drives. Each command takes a serialisable
//! payload and answers `Result<_, String>` so errors reach the user as text.

use std::sync::Arc;

use chrono::NaiveDateTime;
use log::info;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::FeedbackConfig;
use crate::form::{submit_form, FormState, SubmitOutcome};
use crate::record::{local_now, Field};
use crate::serial::{resolve_next_serial, SerialNumber};
use crate::sheets::{AppsScriptClient, SheetStore};
use crate::view::Branding;

pub use crate::form::SUBMISSION_IN_PROGRESS;

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct SubmitFeedbackPayload {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FieldUpdatePayload {
    pub field: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubmissionResponse {
    pub accepted: bool,
    pub serial_number: Option<String>,
    pub form: FormState,
}

// Shared application state
pub struct AppState<S = AppsScriptClient> {
    store: Arc<S>,
    sheet_name: String,
    branding: Branding,
    form: Mutex<FormState>,
}

impl AppState<AppsScriptClient> {
    pub fn from_config(config: &FeedbackConfig) -> Result<Self, String> {
        let client = AppsScriptClient::from_config(config)
            .map_err(|e| format!("Failed to create sheet client: {}", e))?;
        Ok(Self::new(
            client,
            config.sheet_name.clone(),
            Branding {
                name: config.brand_name.clone(),
                tagline: config.brand_tagline.clone(),
            },
        ))
    }
}

impl<S: SheetStore> AppState<S> {
    pub fn new(store: S, sheet_name: String, branding: Branding) -> Self {
        Self {
            store: Arc::new(store),
            sheet_name,
            branding,
            form: Mutex::new(FormState::new()),
        }
    }

    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn snapshot(&self) -> FormState {
        self.form.lock().clone()
    }
}

pub fn get_form_snapshot<S: SheetStore>(state: &AppState<S>) -> FormState {
    state.snapshot()
}

pub fn update_field<S: SheetStore>(payload: FieldUpdatePayload, state: &AppState<S>) -> Result<FormState, String> {
    let field: Field = payload.field.parse()?;
    let mut form = state.form.lock();
    form.set_field(field, payload.value);
    Ok(form.clone())
}

pub fn cancel_form<S: SheetStore>(state: &AppState<S>) -> FormState {
    info!("Cancelling form");
    let mut form = state.form.lock();
    form.cancel();
    form.clone()
}

pub fn submit_another<S: SheetStore>(state: &AppState<S>) -> FormState {
    let mut form = state.form.lock();
    form.back_to_form();
    form.clone()
}

pub async fn next_serial<S: SheetStore>(state: &AppState<S>) -> SerialNumber {
    resolve_next_serial(state.store.as_ref(), &state.sheet_name).await
}

pub async fn submit_feedback<S: SheetStore>(
    payload: SubmitFeedbackPayload,
    state: &AppState<S>,
) -> Result<SubmissionResponse, String> {
    submit_feedback_at(payload, state, local_now()).await
}

/// Applies any fields in the payload, then runs one submission stamped `now`.
/// A submit while another is in flight is refused.
pub async fn submit_feedback_at<S: SheetStore>(
    payload: SubmitFeedbackPayload,
    state: &AppState<S>,
    now: NaiveDateTime,
) -> Result<SubmissionResponse, String> {
    let updates = [
        (Field::Name, payload.name),
        (Field::Mobile, payload.mobile),
        (Field::City, payload.city),
        (Field::Company, payload.company),
    ];

    let outcome = submit_form(&state.form, state.store.as_ref(), &state.sheet_name, now, |form| {
        for (field, value) in updates {
            if let Some(value) = value {
                form.set_field(field, value);
            }
        }
    })
    .await
    .map_err(|e| e.to_string())?;

    let serial_number = match &outcome {
        SubmitOutcome::Accepted { serial_number } => Some(serial_number.to_string()),
        _ => None,
    };

    Ok(SubmissionResponse {
        accepted: outcome.is_accepted(),
        serial_number,
        form: state.snapshot(),
    })
}
