/*
[INPUT]:  Task records plus mutations from timer ticks and call continuations.
[OUTPUT]: Guarded task state, per-task cancellation tokens, change events.
[POS]:    State layer - the single shared task collection.
[UPDATE]: When the mutation gate or propagation semantics change.
*/

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::event::EngineEvent;
use crate::task::Task;

#[derive(Debug)]
struct StoredTask {
    task: Task,
    cancel: CancellationToken,
}

/// Outcome of an attempted task mutation.
///
/// Only `Updated` means the closure ran; every other variant is a dropped
/// stale update.
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// Mutation applied; carries the post-mutation snapshot.
    Updated(Task),
    /// Task already reached a terminal status.
    Terminal,
    /// Task is not (or no longer) in the store.
    NotFound,
    /// The mutating chain's token was cancelled (superseded or dismissed).
    Cancelled,
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Updated(_))
    }

    pub fn updated(self) -> Option<Task> {
        match self {
            UpdateOutcome::Updated(task) => Some(task),
            _ => None,
        }
    }
}

/// In-memory task collection keyed by task id.
///
/// Every mutation goes through [`TaskStore::update`]: the calling chain's
/// cancellation token is checked first, then the task must exist and be
/// non-terminal. Timer chains and call continuations carry only an id and a
/// token, never a reference into the map.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Mutex<HashMap<String, StoredTask>>,
    events: mpsc::UnboundedSender<EngineEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<EngineEvent>>,
    shutdown: CancellationToken,
}

impl TaskStore {
    pub fn new() -> Self {
        let (events, events_rx) = mpsc::unbounded_channel();
        Self {
            tasks: Mutex::new(HashMap::new()),
            events,
            events_rx: Some(events_rx),
            shutdown: CancellationToken::new(),
        }
    }

    /// Take the event receiver. Call once, before sharing the store.
    pub fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<EngineEvent>> {
        self.events_rx.take()
    }

    /// Root token; cancelling it invalidates every task's token.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop all timelines and continuations from mutating the store.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Insert a task and hand back its cancellation token.
    pub async fn insert(&self, task: Task) -> CancellationToken {
        let cancel = self.shutdown.child_token();
        let snapshot = task.clone();
        let mut tasks = self.tasks.lock().await;
        tasks.insert(
            task.id.clone(),
            StoredTask {
                task,
                cancel: cancel.clone(),
            },
        );
        drop(tasks);

        info!(task_id = %snapshot.id, kind = ?snapshot.kind(), "task created");
        self.emit(EngineEvent::TaskUpdated(snapshot));
        cancel
    }

    /// Apply `apply` to the task iff the token is live and the task is
    /// present and non-terminal. Emits a snapshot event when applied.
    pub async fn update<F>(&self, id: &str, token: &CancellationToken, apply: F) -> UpdateOutcome
    where
        F: FnOnce(&mut Task),
    {
        if token.is_cancelled() {
            debug!(task_id = %id, "dropping update from cancelled chain");
            return UpdateOutcome::Cancelled;
        }

        let mut tasks = self.tasks.lock().await;
        let Some(stored) = tasks.get_mut(id) else {
            debug!(task_id = %id, "dropping update for unknown task");
            return UpdateOutcome::NotFound;
        };
        if stored.task.is_terminal() {
            debug!(task_id = %id, "dropping update for terminal task");
            return UpdateOutcome::Terminal;
        }

        apply(&mut stored.task);
        let snapshot = stored.task.clone();
        drop(tasks);

        self.emit(EngineEvent::TaskUpdated(snapshot.clone()));
        UpdateOutcome::Updated(snapshot)
    }

    pub async fn get(&self, id: &str) -> Option<Task> {
        let tasks = self.tasks.lock().await;
        tasks.get(id).map(|stored| stored.task.clone())
    }

    /// Remove a task, cancelling its token so late timers and continuations
    /// go inert. The underlying real operation is not aborted.
    pub async fn remove(&self, id: &str) -> Option<Task> {
        let mut tasks = self.tasks.lock().await;
        let stored = tasks.remove(id)?;
        drop(tasks);

        stored.cancel.cancel();
        info!(task_id = %id, "task removed");
        self.emit(EngineEvent::TaskRemoved(id.to_string()));
        Some(stored.task)
    }

    /// All task snapshots, oldest first.
    pub async fn list(&self) -> Vec<Task> {
        let tasks = self.tasks.lock().await;
        let mut items: Vec<Task> = tasks.values().map(|stored| stored.task.clone()).collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        items
    }

    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }

    pub(crate) fn emit(&self, event: EngineEvent) {
        // Receiver may be gone when no consumer is attached; events are
        // best-effort propagation, not state.
        let _ = self.events.send(event);
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Task, UploadStatus};
    use dynagent_adapter::PersonaType;

    #[tokio::test]
    async fn update_applies_only_while_non_terminal() {
        let store = TaskStore::new();
        let task = Task::new_upload("a.csv");
        let id = task.id.clone();
        let token = store.insert(task).await;

        let outcome = store
            .update(&id, &token, |task| {
                if let Some(upload) = task.upload_mut() {
                    upload.complete();
                }
            })
            .await;
        assert!(outcome.is_applied());

        let outcome = store
            .update(&id, &token, |task| {
                if let Some(upload) = task.upload_mut() {
                    upload.fail("late failure");
                }
            })
            .await;
        assert!(matches!(outcome, UpdateOutcome::Terminal));

        let task = store.get(&id).await.expect("task still stored");
        assert_eq!(task.upload().unwrap().status, UploadStatus::Completed);
        assert_eq!(task.upload().unwrap().error, None);
    }

    #[tokio::test]
    async fn cancelled_chain_cannot_mutate() {
        let store = TaskStore::new();
        let task = Task::new_upload("a.csv");
        let id = task.id.clone();
        let token = store.insert(task).await;

        token.cancel();
        let outcome = store
            .update(&id, &token, |task| {
                if let Some(upload) = task.upload_mut() {
                    upload.tick(10, 90);
                }
            })
            .await;

        assert!(matches!(outcome, UpdateOutcome::Cancelled));
        assert_eq!(store.get(&id).await.unwrap().upload().unwrap().progress, 0);
    }

    #[tokio::test]
    async fn remove_cancels_token_and_emits() {
        let mut store = TaskStore::new();
        let mut events = store.take_event_receiver().expect("receiver");
        let task = Task::new_upload("a.csv");
        let id = task.id.clone();
        let token = store.insert(task).await;

        assert!(store.remove(&id).await.is_some());
        assert!(token.is_cancelled());
        assert!(store.get(&id).await.is_none());

        let outcome = store.update(&id, &token, |_| {}).await;
        assert!(matches!(outcome, UpdateOutcome::Cancelled));

        let first = events.try_recv().expect("created event");
        assert!(matches!(first, EngineEvent::TaskUpdated(_)));
        let second = events.try_recv().expect("removed event");
        match second {
            EngineEvent::TaskRemoved(removed) => assert_eq!(removed, id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn shutdown_invalidates_child_tokens() {
        let store = TaskStore::new();
        let token = store.insert(Task::new_query("q", PersonaType::General)).await;

        store.shutdown();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn list_returns_tasks_oldest_first() {
        let store = TaskStore::new();
        let first = Task::new_upload("first.csv");
        let second = Task::new_upload("second.csv");
        let first_id = first.id.clone();
        store.insert(first).await;
        store.insert(second).await;

        let listed = store.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first_id);
    }
}
