use std::fmt::Write;

use crate::form::{FormState, View};
use crate::record::Field;

pub const SUCCESS_TITLE: &str = "Thank You!";
pub const SUCCESS_BODY: &str =
    "Your feedback has been submitted successfully. We truly appreciate your time and valuable input.";
pub const SUCCESS_NOTE: &str = "Your response has been recorded and our team will review it shortly.";
pub const SUBMIT_ANOTHER: &str = "← Submit Another Response";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTone {
    Success,
    Error,
}

impl MessageTone {
    pub fn of(message: &str) -> Self {
        if message.contains("successfully") {
            MessageTone::Success
        } else {
            MessageTone::Error
        }
    }
}

#[derive(Debug, Clone)]
pub struct Branding {
    pub name: String,
    pub tagline: String,
}

/// Plain-text rendering of the current screen.
pub fn render(state: &FormState, branding: &Branding) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", branding.name);
    let _ = writeln!(out, "{}", branding.tagline);
    let _ = writeln!(out);

    match state.view {
        View::Success => {
            let _ = writeln!(out, "{}", SUCCESS_TITLE);
            let _ = writeln!(out, "{}", SUCCESS_BODY);
            let _ = writeln!(out, "{}", SUCCESS_NOTE);
            let _ = writeln!(out);
            let _ = writeln!(out, "[{}]", SUBMIT_ANOTHER);
        }
        View::Form => {
            let _ = writeln!(out, "Your Contact");
            for field in Field::ALL {
                let value = state.fields.get(field);
                let shown = if value.is_empty() { format!("({})", field.placeholder()) } else { value.to_string() };
                let _ = writeln!(out, "  {}: {}", field_label(field), shown);
            }

            if !state.message.is_empty() {
                let prefix = match MessageTone::of(&state.message) {
                    MessageTone::Success => "✓",
                    MessageTone::Error => "!",
                };
                let _ = writeln!(out, "{} {}", prefix, state.message);
            }

            let submit = if state.is_submitting { "Submitting..." } else { "Submit Feedback" };
            let _ = writeln!(out, "[{}] [Cancel]", submit);
        }
    }

    out
}

pub fn field_label(field: Field) -> String {
    if field.is_required() {
        format!("{} *", field.label())
    } else {
        field.label().to_string()
    }
}
