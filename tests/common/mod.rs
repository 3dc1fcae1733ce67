#![allow(dead_code)]

use std::collections::VecDeque;

use async_trait::async_trait;
use feedback_form_lib::sheets::{InsertRequest, ReadResponse, Result, SheetError, SheetStore, WriteResponse};
use parking_lot::Mutex;

/// What the fake sheet answers to the next read or write.
pub enum Reply<T> {
    Ok(T),
    DecodeError,
}

/// In-memory sheet that records every request it sees.
#[derive(Default)]
pub struct FakeSheet {
    reads: Mutex<VecDeque<Reply<ReadResponse>>>,
    writes: Mutex<VecDeque<Reply<WriteResponse>>>,
    pub read_calls: Mutex<Vec<String>>,
    pub inserted: Mutex<Vec<InsertRequest>>,
}

impl FakeSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, rows: serde_json::Value) -> Self {
        self.reads.lock().push_back(Reply::Ok(ReadResponse {
            success: true,
            values: Some(serde_json::from_value(rows).unwrap()),
        }));
        self
    }

    pub fn read_reply(self, reply: Reply<ReadResponse>) -> Self {
        self.reads.lock().push_back(reply);
        self
    }

    pub fn write_reply(self, reply: Reply<WriteResponse>) -> Self {
        self.writes.lock().push_back(reply);
        self
    }

    pub fn accepts(self) -> Self {
        self.write_reply(Reply::Ok(WriteResponse { success: true, message: None }))
    }

    pub fn rejects(self, message: Option<&str>) -> Self {
        self.write_reply(Reply::Ok(WriteResponse {
            success: false,
            message: message.map(str::to_string),
        }))
    }

    pub fn inserted_rows(&self) -> Vec<Vec<String>> {
        self.inserted
            .lock()
            .iter()
            .flat_map(|req| req.rows.iter().map(|row| row.values.clone()))
            .collect()
    }
}

#[async_trait]
impl SheetStore for FakeSheet {
    async fn read_sheet(&self, sheet_name: &str) -> Result<ReadResponse> {
        self.read_calls.lock().push(sheet_name.to_string());
        match self.reads.lock().pop_front() {
            Some(Reply::Ok(response)) => Ok(response),
            Some(Reply::DecodeError) => Err(SheetError::Decode("expected value at line 1 column 1".to_string())),
            // Nothing queued behaves like an unreachable endpoint.
            None => Err(SheetError::Decode("no read reply queued".to_string())),
        }
    }

    async fn insert(&self, request: &InsertRequest) -> Result<WriteResponse> {
        self.inserted.lock().push(request.clone());
        match self.writes.lock().pop_front() {
            Some(Reply::Ok(response)) => Ok(response),
            Some(Reply::DecodeError) | None => Err(SheetError::Decode("expected value at line 1 column 1".to_string())),
        }
    }
}
