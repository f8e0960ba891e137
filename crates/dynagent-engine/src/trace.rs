/*
[INPUT]:  Query submissions, the synthetic step schedule, real call results.
[OUTPUT]: One live query trace, a processing flag, completion chat messages.
[POS]:    Execution layer - single active query lifecycle orchestration.
[UPDATE]: When the step schedule or the success/failure merge rules change.
*/

use std::sync::Arc;
use std::time::Duration;

use dynagent_adapter::{PersonaType, QueryRequest};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chat::ChatMessage;
use crate::event::EngineEvent;
use crate::store::{TaskStore, UpdateOutcome};
use crate::task::{QueryStatus, QueryStep, Task};
use crate::transport::QueryTransport;

/// Offsets after start at which steps 1..3 complete and the next one begins.
/// The pacing is a UX simulation, independent of actual backend progress.
pub const STEP_COMPLETION_OFFSETS_MS: [u64; 3] = [500, 1300, 2500];

/// Earliest offset after start at which the final step may complete. A fast
/// real call waits for this tick; a slow one pushes completion past it.
pub const FINAL_STEP_GATE_MS: u64 = 3500;

/// Nominal duration stamped on a step when the schedule completes it.
pub(crate) fn nominal_step_duration_ms(index: usize) -> u64 {
    match index {
        0 => STEP_COMPLETION_OFFSETS_MS[0],
        1 | 2 => STEP_COMPLETION_OFFSETS_MS[index] - STEP_COMPLETION_OFFSETS_MS[index - 1],
        _ => FINAL_STEP_GATE_MS - STEP_COMPLETION_OFFSETS_MS[2],
    }
}

/// Externally visible representation of the active query's pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTrace {
    pub task_id: String,
    pub query: String,
    pub persona_type: PersonaType,
    pub status: QueryStatus,
    pub steps: Vec<QueryStep>,
    pub total_duration_ms: Option<u64>,
}

impl QueryTrace {
    pub fn from_task(task: &Task) -> Option<Self> {
        let query = task.query()?;
        Some(Self {
            task_id: task.id.clone(),
            query: query.query.clone(),
            persona_type: query.persona_type,
            status: query.status,
            steps: query.steps.clone(),
            total_duration_ms: query.total_duration_ms,
        })
    }
}

#[derive(Debug)]
struct ActiveQuery {
    task_id: String,
    cancel: CancellationToken,
}

/// Tracks the one in-flight query as a four-step pipeline, merging the
/// synthetic schedule with the real call's outcome.
///
/// Starting a new query supersedes the previous one: its token is cancelled
/// and its timelines can no longer touch shared state.
pub struct TraceController {
    store: Arc<TaskStore>,
    transport: Arc<dyn QueryTransport>,
    active: Mutex<Option<ActiveQuery>>,
    trace_tx: watch::Sender<Option<QueryTrace>>,
    processing_tx: watch::Sender<bool>,
}

impl TraceController {
    pub fn new(store: Arc<TaskStore>, transport: Arc<dyn QueryTransport>) -> Self {
        let (trace_tx, _) = watch::channel(None);
        let (processing_tx, _) = watch::channel(false);
        Self {
            store,
            transport,
            active: Mutex::new(None),
            trace_tx,
            processing_tx,
        }
    }

    /// Subscribe to the visible trace; `None` means no trace is shown.
    pub fn subscribe_trace(&self) -> watch::Receiver<Option<QueryTrace>> {
        self.trace_tx.subscribe()
    }

    /// Subscribe to the processing flag.
    pub fn subscribe_processing(&self) -> watch::Receiver<bool> {
        self.processing_tx.subscribe()
    }

    pub fn is_processing(&self) -> bool {
        *self.processing_tx.borrow()
    }

    pub async fn active_task_id(&self) -> Option<String> {
        let active = self.active.lock().await;
        active.as_ref().map(|query| query.task_id.clone())
    }

    /// Begin tracking a query: create its task, start the synthetic schedule,
    /// and issue the real call. Returns the new task id.
    pub async fn start(&self, query: impl Into<String>, persona_type: PersonaType) -> String {
        let query = query.into();

        let mut active = self.active.lock().await;
        if let Some(prev) = active.take() {
            info!(task_id = %prev.task_id, "superseding active query");
            prev.cancel.cancel();
        }

        let task = Task::new_query(query.clone(), persona_type);
        let task_id = task.id.clone();
        let trace = QueryTrace::from_task(&task);
        let token = self.store.insert(task).await;

        *active = Some(ActiveQuery {
            task_id: task_id.clone(),
            cancel: token.clone(),
        });
        drop(active);

        self.trace_tx.send_replace(trace);
        self.processing_tx.send_replace(true);
        info!(task_id = %task_id, persona = %persona_type, "query started");

        let started = Instant::now();
        let schedule = tokio::spawn(run_schedule(
            self.store.clone(),
            self.trace_tx.clone(),
            task_id.clone(),
            token.clone(),
            started,
        ));

        let request = QueryRequest::new(query, persona_type);
        tokio::spawn(run_query(QueryRun {
            store: self.store.clone(),
            transport: self.transport.clone(),
            trace_tx: self.trace_tx.clone(),
            processing_tx: self.processing_tx.clone(),
            task_id: task_id.clone(),
            token,
            request,
            started,
            schedule,
        }));

        task_id
    }

    /// Dismiss the current trace. The task leaves the store and its token is
    /// cancelled; an in-flight real call keeps running but its result is
    /// dropped.
    pub async fn clear(&self) {
        let mut active = self.active.lock().await;
        if let Some(prev) = active.take() {
            self.store.remove(&prev.task_id).await;
        }
        drop(active);

        self.trace_tx.send_replace(None);
        self.processing_tx.send_replace(false);
    }
}

/// Drive the fixed step schedule for one query task. Exits early when the
/// task's token is cancelled or the task stops accepting updates; otherwise
/// returns once the final gate offset has passed.
async fn run_schedule(
    store: Arc<TaskStore>,
    trace_tx: watch::Sender<Option<QueryTrace>>,
    task_id: String,
    token: CancellationToken,
    started: Instant,
) {
    for (index, offset_ms) in STEP_COMPLETION_OFFSETS_MS.iter().enumerate() {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep_until(started + Duration::from_millis(*offset_ms)) => {}
        }

        let outcome = store
            .update(&task_id, &token, |task| {
                if let Some(query) = task.query_mut() {
                    query.advance_step(index, nominal_step_duration_ms(index));
                }
            })
            .await;

        match outcome {
            UpdateOutcome::Updated(task) => {
                trace_tx.send_replace(QueryTrace::from_task(&task));
            }
            other => {
                debug!(task_id = %task_id, ?other, "step schedule stopped");
                return;
            }
        }
    }

    tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep_until(started + Duration::from_millis(FINAL_STEP_GATE_MS)) => {}
    }
}

struct QueryRun {
    store: Arc<TaskStore>,
    transport: Arc<dyn QueryTransport>,
    trace_tx: watch::Sender<Option<QueryTrace>>,
    processing_tx: watch::Sender<bool>,
    task_id: String,
    token: CancellationToken,
    request: QueryRequest,
    started: Instant,
    schedule: JoinHandle<()>,
}

/// Await the real call and merge its outcome with the synthetic schedule.
async fn run_query(run: QueryRun) {
    let QueryRun {
        store,
        transport,
        trace_tx,
        processing_tx,
        task_id,
        token,
        request,
        started,
        schedule,
    } = run;

    let outcome = transport.submit_query(&request).await;

    match outcome {
        Ok(response) if response.success => {
            // Success may only land once the schedule has reached its final
            // gate; a fast backend still shows the full simulated pipeline.
            let _ = schedule.await;

            let total_ms = started.elapsed().as_millis() as u64;
            let updated = store
                .update(&task_id, &token, |task| {
                    if let Some(query) = task.query_mut() {
                        query.complete(nominal_step_duration_ms(3), total_ms, response.clone());
                    }
                })
                .await;

            match updated {
                UpdateOutcome::Updated(task) => {
                    info!(task_id = %task_id, total_ms, "query completed");
                    trace_tx.send_replace(QueryTrace::from_task(&task));
                    processing_tx.send_replace(false);
                    store.emit(EngineEvent::Chat(ChatMessage::from_response(
                        task_id.clone(),
                        &response,
                    )));
                }
                other => {
                    debug!(task_id = %task_id, ?other, "query result dropped");
                }
            }
        }
        Ok(response) => {
            let reason = response
                .error
                .unwrap_or_else(|| "backend reported failure".to_string());
            fail_query(&store, &trace_tx, &processing_tx, &task_id, &token, reason).await;
        }
        Err(err) => {
            fail_query(
                &store,
                &trace_tx,
                &processing_tx,
                &task_id,
                &token,
                err.to_string(),
            )
            .await;
        }
    }
}

/// Terminal failure path: stop relying on the schedule, clear the trace,
/// emit the fallback message.
async fn fail_query(
    store: &Arc<TaskStore>,
    trace_tx: &watch::Sender<Option<QueryTrace>>,
    processing_tx: &watch::Sender<bool>,
    task_id: &str,
    token: &CancellationToken,
    reason: String,
) {
    warn!(task_id = %task_id, %reason, "query failed");

    let updated = store
        .update(task_id, token, |task| {
            if let Some(query) = task.query_mut() {
                query.fail(reason.clone());
            }
        })
        .await;

    // Stop the synthetic schedule; for a superseded chain the token is
    // already cancelled and the update above was dropped.
    token.cancel();

    if updated.is_applied() {
        trace_tx.send_replace(None);
        processing_tx.send_replace(false);
        store.emit(EngineEvent::Chat(ChatMessage::fallback_error(task_id)));
    }
}
