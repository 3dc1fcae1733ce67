use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::serial::SerialNumber;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Editable inputs of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Mobile,
    City,
    Company,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Mobile, Field::City, Field::Company];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Mobile => "mobile",
            Field::City => "city",
            Field::Company => "company",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Person Name",
            Field::Mobile => "Mobile Number",
            Field::City => "City",
            Field::Company => "Company",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::Name => "Enter your full name",
            Field::Mobile => "Enter your mobile number",
            Field::City => "Enter your city",
            Field::Company => "Enter your company name",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Field::Company)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "mobile" => Ok(Field::Mobile),
            "city" => Ok(Field::City),
            "company" => Ok(Field::Company),
            other => Err(format!("Unknown form field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub name: String,
    pub mobile: String,
    pub city: String,
    pub company: String,
}

impl FormFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Mobile => &self.mobile,
            Field::City => &self.city,
            Field::Company => &self.company,
        }
    }

    /// Stores the value as entered; an over-long mobile is left for validation to reject.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Mobile => &mut self.mobile,
            Field::City => &mut self.city,
            Field::Company => &mut self.company,
        };
        *slot = value.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Submission time in the sheet's `DD/MM/YYYY HH:MM:SS` layout.
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// One enriched response, alive only for a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub timestamp: String,
    pub serial_number: SerialNumber,
    pub name: String,
    pub mobile: String,
    pub city: String,
    pub company: String,
}

impl FeedbackRecord {
    pub fn new(fields: &FormFields, at: &NaiveDateTime, serial_number: SerialNumber) -> Self {
        Self {
            timestamp: format_timestamp(at),
            serial_number,
            name: fields.name.clone(),
            mobile: fields.mobile.clone(),
            city: fields.city.clone(),
            company: fields.company.clone(),
        }
    }

    /// Column order of the response sheet.
    pub fn into_row(self) -> Vec<String> {
        vec![
            self.timestamp,
            self.serial_number.into_string(),
            self.name,
            self.mobile,
            self.city,
            self.company,
        ]
    }
}
