use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::record::FormFields;

// ASCII digits only; `\d` would also admit other Unicode digits.
static MOBILE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{10}$").expect("mobile pattern is a valid regex")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingRequired,
    #[error("Please enter a valid 10-digit mobile number")]
    InvalidMobile,
}

pub fn is_valid_mobile(mobile: &str) -> bool {
    MOBILE_PATTERN.is_match(mobile)
}

/// Gate in front of every submission. Company is optional.
pub fn validate(fields: &FormFields) -> Result<(), ValidationError> {
    let blank = |s: &str| s.trim().is_empty();

    if blank(&fields.name) || blank(&fields.mobile) || blank(&fields.city) {
        return Err(ValidationError::MissingRequired);
    }

    if !is_valid_mobile(&fields.mobile) {
        return Err(ValidationError::InvalidMobile);
    }

    Ok(())
}
