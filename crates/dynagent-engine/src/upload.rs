/*
[INPUT]:  Dropped files, the per-task progress ticker, real upload results.
[OUTPUT]: Independent upload tasks with merged synthetic/real progress.
[POS]:    Execution layer - concurrent upload lifecycle orchestration.
[UPDATE]: When the ticker pacing or acceptance policy semantics change.
*/

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::UploadPolicy;
use crate::store::{TaskStore, UpdateOutcome};
use crate::task::Task;
use crate::transport::UploadTransport;

/// Ticker period for synthetic upload progress.
pub const PROGRESS_TICK_MS: u64 = 200;
/// Progress added per tick.
pub const PROGRESS_TICK_INCREMENT: u8 = 10;
/// Synthetic progress never passes this while the real call is outstanding.
pub const PROGRESS_CEILING: u8 = 90;

/// A file handed to the engine for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Why a file was rejected before any task was created for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    UnsupportedMediaType { media_type: String },
    FileTooLarge { size: u64, max: u64 },
}

impl fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadRejection::UnsupportedMediaType { media_type } => {
                write!(f, "unsupported media type: {media_type}")
            }
            UploadRejection::FileTooLarge { size, max } => {
                write!(f, "file size {size} exceeds maximum of {max} bytes")
            }
        }
    }
}

impl std::error::Error for UploadRejection {}

/// Tracks any number of concurrent uploads, each pairing a synthetic progress
/// ticker with one real upload call. Tasks are fully independent: one
/// failing never touches another.
pub struct UploadQueueManager {
    store: Arc<TaskStore>,
    transport: Arc<dyn UploadTransport>,
    policy: UploadPolicy,
}

impl UploadQueueManager {
    pub fn new(
        store: Arc<TaskStore>,
        transport: Arc<dyn UploadTransport>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            store,
            transport,
            policy,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validate and start tracking one file. On rejection no task exists;
    /// the caller surfaces the rejection pre-flight.
    pub async fn enqueue(&self, file: UploadFile) -> Result<Task, UploadRejection> {
        if let Err(rejection) = self.policy.check(&file) {
            warn!(file = %file.name, %rejection, "upload rejected");
            return Err(rejection);
        }

        let task = Task::new_upload(file.name.clone());
        let task_id = task.id.clone();
        let snapshot = task.clone();
        let token = self.store.insert(task).await;
        info!(task_id = %task_id, file = %file.name, size = file.size(), "upload started");

        tokio::spawn(run_ticker(
            self.store.clone(),
            task_id.clone(),
            token.clone(),
        ));
        tokio::spawn(run_upload(
            self.store.clone(),
            self.transport.clone(),
            task_id,
            token,
            file,
        ));

        Ok(snapshot)
    }

    /// Enqueue several files dropped together. Each outcome is independent:
    /// rejected files produce no task and do not block accepted ones.
    pub async fn enqueue_all(
        &self,
        files: Vec<UploadFile>,
    ) -> Vec<Result<Task, UploadRejection>> {
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            outcomes.push(self.enqueue(file).await);
        }
        outcomes
    }

    /// Remove an upload from the visible set. The real call is not cancelled;
    /// a result arriving later is dropped without observable effect.
    pub async fn dismiss(&self, id: &str) -> Option<Task> {
        self.store.remove(id).await
    }
}

/// Advance synthetic progress toward the ceiling until the task goes
/// terminal or its token is cancelled.
async fn run_ticker(store: Arc<TaskStore>, task_id: String, token: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_millis(PROGRESS_TICK_MS));
    // The first tick of a tokio interval fires immediately; skip it so the
    // first visible advance lands one period after enqueue.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = interval.tick() => {}
        }

        let outcome = store
            .update(&task_id, &token, |task| {
                if let Some(upload) = task.upload_mut() {
                    upload.tick(PROGRESS_TICK_INCREMENT, PROGRESS_CEILING);
                }
            })
            .await;

        if !outcome.is_applied() {
            debug!(task_id = %task_id, "progress ticker stopped");
            return;
        }
    }
}

/// Await the real upload and apply its terminal outcome, unless the task was
/// dismissed in the meantime.
async fn run_upload(
    store: Arc<TaskStore>,
    transport: Arc<dyn UploadTransport>,
    task_id: String,
    token: CancellationToken,
    file: UploadFile,
) {
    let result = transport.upload_file(&file).await;

    if token.is_cancelled() {
        debug!(task_id = %task_id, "upload result dropped after dismissal");
        return;
    }

    let outcome = match result {
        Ok(response) if response.success => {
            info!(task_id = %task_id, file = %file.name, "upload completed");
            store
                .update(&task_id, &token, |task| {
                    if let Some(upload) = task.upload_mut() {
                        upload.complete();
                    }
                })
                .await
        }
        Ok(response) => {
            let reason = response.error.unwrap_or(response.message);
            warn!(task_id = %task_id, file = %file.name, %reason, "upload failed");
            store
                .update(&task_id, &token, |task| {
                    if let Some(upload) = task.upload_mut() {
                        upload.fail(reason.clone());
                    }
                })
                .await
        }
        Err(err) => {
            let reason = err.to_string();
            warn!(task_id = %task_id, file = %file.name, %reason, "upload failed");
            store
                .update(&task_id, &token, |task| {
                    if let Some(upload) = task.upload_mut() {
                        upload.fail(reason.clone());
                    }
                })
                .await
        }
    };

    if !matches!(outcome, UpdateOutcome::Updated(_)) {
        debug!(task_id = %task_id, ?outcome, "upload outcome dropped");
    }

    // The terminal state is set; stop the ticker promptly.
    token.cancel();
}
