//! Client for the spreadsheet-backed script endpoint that stores responses.
//!
//! The endpoint speaks two operations on a single URL:
//!
//! * `GET <endpoint>?sheetName=<sheet>` returns `{ "success": bool, "values": [[cell, ...], ...] }`
//! * `POST <endpoint>` with a form body `action=insert&rows=<json>` returns
//!   `{ "success": bool, "message": "..." }`
//!
//! Status codes are not inspected; the JSON body alone decides the outcome.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::FeedbackConfig;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),
    #[error("decode: {0}")]
    Decode(String),
    #[error("encode: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Body of a sheet read. Cells keep whatever JSON type the sheet produced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadResponse {
    #[serde(default, deserialize_with = "truthy")]
    pub success: bool,
    #[serde(default)]
    pub values: Option<Vec<Vec<Value>>>,
}

/// Body of an append. Both fields accept any JSON type so an oddly typed
/// reply still reaches the user as a rejection rather than a transport error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WriteResponse {
    #[serde(default, deserialize_with = "truthy")]
    pub success: bool,
    #[serde(default, deserialize_with = "message_text")]
    pub message: Option<String>,
}

/// `null`, `false`, `0` and `""` count as false; everything else as true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}

fn message_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if !is_truthy(&value) {
        return Ok(None);
    }
    Ok(match value {
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// One entry of the `rows` form parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRow {
    pub sheet_name: String,
    pub values: Vec<String>,
}

/// Form body of an append: `action=insert` plus the JSON-encoded rows.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRequest {
    pub rows: Vec<InsertRow>,
}

impl InsertRequest {
    pub fn single(sheet_name: &str, values: Vec<String>) -> Self {
        Self {
            rows: vec![InsertRow {
                sheet_name: sheet_name.to_string(),
                values,
            }],
        }
    }

    pub fn form_params(&self) -> Result<[(&'static str, String); 2]> {
        let rows = serde_json::to_string(&self.rows).map_err(|e| SheetError::Encode(e.to_string()))?;
        Ok([("action", "insert".to_string()), ("rows", rows)])
    }
}

/// Remote row store. The production implementation is [`AppsScriptClient`];
/// tests plug in an in-memory store.
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn read_sheet(&self, sheet_name: &str) -> Result<ReadResponse>;

    async fn insert(&self, request: &InsertRequest) -> Result<WriteResponse>;
}

#[derive(Clone)]
pub struct AppsScriptClient {
    client: Client,
    endpoint: String,
}

impl AppsScriptClient {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &FeedbackConfig) -> Result<Self> {
        Self::new(config.endpoint.clone(), config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `sheetName` is percent-encoded, so spaces become `%20` rather than `+`.
    pub fn read_url(&self, sheet_name: &str) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}sheetName={}",
            self.endpoint,
            separator,
            urlencoding::encode(sheet_name)
        )
    }

    async fn decode<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            error!("Unexpected response body (HTTP {}): {}", status, truncate(&body, 200));
            SheetError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl SheetStore for AppsScriptClient {
    async fn read_sheet(&self, sheet_name: &str) -> Result<ReadResponse> {
        let url = self.read_url(sheet_name);
        debug!("Reading sheet '{}'", sheet_name);

        let response = self.client.get(&url).send().await?;
        let parsed: ReadResponse = Self::decode(response).await?;

        debug!(
            "Sheet read finished: success={}, rows={}",
            parsed.success,
            parsed.values.as_ref().map(Vec::len).unwrap_or(0)
        );
        Ok(parsed)
    }

    async fn insert(&self, request: &InsertRequest) -> Result<WriteResponse> {
        let params = request.form_params()?;
        info!("Appending {} row(s) to the response sheet", request.rows.len());

        // `.form` sets Content-Type: application/x-www-form-urlencoded
        let response = self
            .client
            .post(&self.endpoint)
            .form(&params[..])
            .send()
            .await?;

        Self::decode(response).await
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_url_encodes_sheet_name() {
        let client = AppsScriptClient::new("https://script.example.com/macros/s/abc/exec", None).unwrap();
        assert_eq!(
            client.read_url("Form Response"),
            "https://script.example.com/macros/s/abc/exec?sheetName=Form%20Response"
        );

        let client = AppsScriptClient::new("https://script.example.com/exec?key=1", None).unwrap();
        assert_eq!(
            client.read_url("Form Response"),
            "https://script.example.com/exec?key=1&sheetName=Form%20Response"
        );
    }

    #[test]
    fn test_insert_request_form_params() {
        let request = InsertRequest::single(
            "Form Response",
            vec!["03/01/2024 09:05:07".into(), "SN-001".into(), "Asha".into(), "9876543210".into(), "Raipur".into(), "".into()],
        );
        let [(action_key, action), (rows_key, rows)] = request.form_params().unwrap();
        assert_eq!(action_key, "action");
        assert_eq!(action, "insert");
        assert_eq!(rows_key, "rows");
        assert_eq!(
            rows,
            r#"[{"sheetName":"Form Response","values":["03/01/2024 09:05:07","SN-001","Asha","9876543210","Raipur",""]}]"#
        );
    }

    #[test]
    fn test_responses_tolerate_missing_fields() {
        let read: ReadResponse = serde_json::from_str("{}").unwrap();
        assert!(!read.success);
        assert!(read.values.is_none());

        let read: ReadResponse = serde_json::from_str(r#"{"success":true,"values":[["Timestamp",1,null]]}"#).unwrap();
        assert!(read.success);
        assert_eq!(read.values.unwrap()[0].len(), 3);

        let write: WriteResponse = serde_json::from_str(r#"{"success":false,"message":"Quota exceeded"}"#).unwrap();
        assert!(!write.success);
        assert_eq!(write.message.as_deref(), Some("Quota exceeded"));
    }

    #[test]
    fn test_write_response_tolerates_odd_types() {
        let write: WriteResponse = serde_json::from_str(r#"{"success":"false","message":503}"#).unwrap();
        // A non-empty string is truthy, as the script's client treats it.
        assert!(write.success);
        assert_eq!(write.message.as_deref(), Some("503"));

        let write: WriteResponse = serde_json::from_str(r#"{"success":0,"message":{"code":"QUOTA"}}"#).unwrap();
        assert!(!write.success);
        assert_eq!(write.message.as_deref(), Some(r#"{"code":"QUOTA"}"#));

        let write: WriteResponse = serde_json::from_str(r#"{"success":null,"message":""}"#).unwrap();
        assert!(!write.success);
        assert_eq!(write.message, None);

        let read: ReadResponse = serde_json::from_str(r#"{"success":1,"values":[]}"#).unwrap();
        assert!(read.success);
    }

    #[test]
    fn test_truncate_long_bodies() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
