use chrono::NaiveDateTime;
use log::{error, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{FeedbackRecord, Field, FormFields};
use crate::serial::{resolve_next_serial, SerialNumber};
use crate::sheets::{InsertRequest, SheetStore};
use crate::validation::{validate, ValidationError};

pub const REJECTED_FALLBACK: &str = "Failed to submit feedback. Please try again.";
pub const CONNECTIVITY_ERROR: &str =
    "Error submitting feedback. Please check your internet connection and try again.";
pub const SUBMISSION_IN_PROGRESS: &str = "A submission is already in progress";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("{}", SUBMISSION_IN_PROGRESS)]
    InProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Form,
    Success,
}

/// How a finished submission attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Invalid(ValidationError),
    Accepted { serial_number: SerialNumber },
    Rejected { message: String },
    Failed { reason: String },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

/// Everything the form shows. Each user event is a method; none of them
/// touch the network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub fields: FormFields,
    pub is_submitting: bool,
    pub message: String,
    pub view: View,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    /// Cancel: fields and message reset, view unchanged.
    pub fn cancel(&mut self) {
        self.fields.clear();
        self.message.clear();
    }

    /// "Submit another response" on the success screen.
    pub fn back_to_form(&mut self) {
        self.view = View::Form;
        self.message.clear();
    }

    /// Runs validation. On success the form enters the submitting state and
    /// a snapshot of the fields is returned for the request. A failure leaves
    /// the state untouched; `finish_submit` reports it.
    pub fn begin_submit(&mut self) -> Result<FormFields, ValidationError> {
        validate(&self.fields)?;

        self.is_submitting = true;
        self.message.clear();
        Ok(self.fields.clone())
    }

    /// Applies the result of a submission and always leaves the submitting state.
    pub fn finish_submit(&mut self, outcome: &SubmitOutcome) {
        self.is_submitting = false;

        match outcome {
            SubmitOutcome::Accepted { .. } => {
                self.view = View::Success;
                self.fields.clear();
                self.message.clear();
            }
            SubmitOutcome::Rejected { message } => {
                self.message = format!("Error: {}", message);
            }
            SubmitOutcome::Failed { .. } => {
                self.message = CONNECTIVITY_ERROR.to_string();
            }
            SubmitOutcome::Invalid(e) => {
                self.message = e.to_string();
            }
        }
    }
}

/// Keeps the form in the submitting state for as long as it lives. Dropping
/// it clears the flag on every exit path, including an abandoned or
/// panicking submission.
struct SubmittingGuard<'a> {
    form: &'a Mutex<FormState>,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.form.lock().is_submitting = false;
    }
}

/// One submission: apply `edit`, validate, resolve the serial, append,
/// interpret. The lock is released while the request is in flight; a second
/// call during that window is refused.
pub async fn submit_form<S, F>(
    form: &Mutex<FormState>,
    store: &S,
    sheet_name: &str,
    now: NaiveDateTime,
    edit: F,
) -> Result<SubmitOutcome, SubmitError>
where
    S: SheetStore + ?Sized,
    F: FnOnce(&mut FormState),
{
    let fields = {
        let mut state = form.lock();
        if state.is_submitting {
            warn!("Submit ignored: {}", SUBMISSION_IN_PROGRESS);
            return Err(SubmitError::InProgress);
        }

        edit(&mut state);

        match state.begin_submit() {
            Ok(fields) => fields,
            Err(e) => {
                info!("Submission blocked: {}", e);
                let outcome = SubmitOutcome::Invalid(e);
                state.finish_submit(&outcome);
                return Ok(outcome);
            }
        }
    };

    let guard = SubmittingGuard { form };
    let outcome = deliver(store, sheet_name, &fields, now).await;
    form.lock().finish_submit(&outcome);
    drop(guard);

    Ok(outcome)
}

/// Resolves the serial, appends the enriched row and interprets the reply.
/// Never fails outright; every error is folded into the outcome.
pub async fn deliver<S: SheetStore + ?Sized>(
    store: &S,
    sheet_name: &str,
    fields: &FormFields,
    now: NaiveDateTime,
) -> SubmitOutcome {
    let serial_number = resolve_next_serial(store, sheet_name).await;
    let record = FeedbackRecord::new(fields, &now, serial_number.clone());
    let request = InsertRequest::single(sheet_name, record.into_row());

    info!("Submitting feedback {} at {}", serial_number, now);

    match store.insert(&request).await {
        Ok(response) if response.success => {
            info!("✅ Feedback {} recorded", serial_number);
            SubmitOutcome::Accepted { serial_number }
        }
        Ok(response) => {
            let message = response
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| REJECTED_FALLBACK.to_string());
            warn!("Feedback {} rejected by the sheet: {}", serial_number, message);
            SubmitOutcome::Rejected { message }
        }
        Err(e) => {
            error!("Failed to submit feedback: {}", e);
            SubmitOutcome::Failed { reason: e.to_string() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> FormState {
        let mut state = FormState::new();
        state.set_field(Field::Name, "Asha");
        state.set_field(Field::Mobile, "9876543210");
        state.set_field(Field::City, "Raipur");
        state
    }

    #[test]
    fn test_begin_submit_rejects_invalid_fields() {
        let mut state = FormState::new();
        state.set_field(Field::Name, "Asha");

        let err = state.begin_submit().unwrap_err();
        assert_eq!(err, ValidationError::MissingRequired);
        assert!(!state.is_submitting);

        state.finish_submit(&SubmitOutcome::Invalid(err));
        assert_eq!(state.message, "Please fill in all fields");
        assert_eq!(state.view, View::Form);
    }

    #[test]
    fn test_begin_submit_clears_stale_message() {
        let mut state = filled();
        state.message = "Please fill in all fields".to_string();

        let snapshot = state.begin_submit().unwrap();
        assert_eq!(snapshot, state.fields);
        assert!(state.is_submitting);
        assert!(state.message.is_empty());
    }

    #[test]
    fn test_finish_submit_accepted() {
        let mut state = filled();
        state.begin_submit().unwrap();
        state.finish_submit(&SubmitOutcome::Accepted { serial_number: SerialNumber::first() });

        assert!(!state.is_submitting);
        assert_eq!(state.view, View::Success);
        assert_eq!(state.fields, FormFields::default());
        assert!(state.message.is_empty());
    }

    #[test]
    fn test_finish_submit_failures_keep_fields() {
        let mut state = filled();
        let before = state.fields.clone();

        state.begin_submit().unwrap();
        state.finish_submit(&SubmitOutcome::Rejected { message: "Quota exceeded".to_string() });
        assert_eq!(state.message, "Error: Quota exceeded");
        assert_eq!(state.fields, before);
        assert_eq!(state.view, View::Form);
        assert!(!state.is_submitting);

        state.begin_submit().unwrap();
        state.finish_submit(&SubmitOutcome::Failed { reason: "timed out".to_string() });
        assert_eq!(state.message, CONNECTIVITY_ERROR);
        assert_eq!(state.fields, before);
        assert!(!state.is_submitting);
    }

    #[test]
    fn test_cancel_and_back_to_form() {
        let mut state = filled();
        state.message = "Please enter a valid 10-digit mobile number".to_string();
        state.cancel();
        assert_eq!(state.fields, FormFields::default());
        assert!(state.message.is_empty());
        assert_eq!(state.view, View::Form);

        state.view = View::Success;
        state.message = "leftover".to_string();
        state.back_to_form();
        assert_eq!(state.view, View::Form);
        assert!(state.message.is_empty());
    }
}
