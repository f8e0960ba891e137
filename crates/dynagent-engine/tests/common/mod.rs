/*
[INPUT]:  Scripted transport outcomes and paused-clock helpers
[OUTPUT]: Shared test utilities and fixtures
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for dynagent-engine tests.
//!
//! The scripted transports pair each call with a delay on the Tokio test
//! clock, so the racing of synthetic and real timelines is deterministic.

// Each integration test binary compiles its own copy; not all of them use
// every helper.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dynagent_adapter::{DynagentError, QueryRequest, QueryResponse, UploadResponse};
use dynagent_engine::{EngineEvent, QueryTransport, UploadFile, UploadTransport};
use tokio::sync::mpsc::UnboundedReceiver;

/// One scripted transport call: wait `delay_ms` on the test clock, then
/// resolve. `Err` strings become transport errors.
pub struct ScriptedOutcome<T> {
    pub delay_ms: u64,
    pub result: Result<T, String>,
}

/// Query transport replaying scripted outcomes in call order.
pub struct ScriptedQueryTransport {
    outcomes: Mutex<VecDeque<ScriptedOutcome<QueryResponse>>>,
}

impl ScriptedQueryTransport {
    pub fn single(delay_ms: u64, result: Result<QueryResponse, String>) -> Self {
        Self::script(vec![ScriptedOutcome { delay_ms, result }])
    }

    pub fn script(outcomes: Vec<ScriptedOutcome<QueryResponse>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }
}

#[async_trait]
impl QueryTransport for ScriptedQueryTransport {
    async fn submit_query(&self, _request: &QueryRequest) -> Result<QueryResponse, DynagentError> {
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted query outcome available");
        tokio::time::sleep(Duration::from_millis(outcome.delay_ms)).await;
        outcome.result.map_err(DynagentError::InvalidResponse)
    }
}

/// Upload transport resolving each file by name.
pub struct ScriptedUploadTransport {
    by_name: Mutex<HashMap<String, ScriptedOutcome<UploadResponse>>>,
}

impl ScriptedUploadTransport {
    pub fn new(outcomes: Vec<(&str, ScriptedOutcome<UploadResponse>)>) -> Self {
        Self {
            by_name: Mutex::new(
                outcomes
                    .into_iter()
                    .map(|(name, outcome)| (name.to_string(), outcome))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl UploadTransport for ScriptedUploadTransport {
    async fn upload_file(&self, file: &UploadFile) -> Result<UploadResponse, DynagentError> {
        let outcome = self
            .by_name
            .lock()
            .unwrap()
            .remove(&file.name)
            .unwrap_or_else(|| panic!("scripted upload outcome for {}", file.name));
        tokio::time::sleep(Duration::from_millis(outcome.delay_ms)).await;
        outcome.result.map_err(DynagentError::InvalidResponse)
    }
}

pub fn query_response(text: &str, suggestions: &[&str]) -> QueryResponse {
    QueryResponse {
        success: true,
        response: text.to_string(),
        suggested_queries: suggestions.iter().map(|s| s.to_string()).collect(),
        documents: Vec::new(),
        math_results: serde_json::Map::new(),
        sql_results: serde_json::Map::new(),
        error: None,
        processing_time: None,
    }
}

pub fn upload_success() -> UploadResponse {
    UploadResponse {
        success: true,
        message: "uploaded".to_string(),
        file_id: Some("doc-1".to_string()),
        file_path: Some("./data/docs/doc-1".to_string()),
        error: None,
    }
}

pub fn upload_failure(reason: &str) -> UploadResponse {
    UploadResponse {
        success: false,
        message: "Failed to upload and process file".to_string(),
        file_id: None,
        file_path: None,
        error: Some(reason.to_string()),
    }
}

pub fn csv_file(name: &str, size: usize) -> UploadFile {
    UploadFile::new(name, "text/csv", vec![0u8; size])
}

/// Let every ready task run without moving the test clock.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused test clock and let woken timers run their chains.
pub async fn advance_ms(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}

/// Drain everything currently buffered on the event channel.
pub fn drain_events(rx: &mut UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Chat messages among drained events.
pub fn chat_messages(events: &[EngineEvent]) -> Vec<dynagent_engine::ChatMessage> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Chat(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}
