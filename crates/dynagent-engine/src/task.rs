/*
[INPUT]:  Task creation parameters and lifecycle mutations.
[OUTPUT]: Typed task records with monotonic, terminal-guarded state machines.
[POS]:    State layer - task data model shared by trace and upload tracking.
[UPDATE]: When task kinds, step pipelines, or status transitions change.
*/

use chrono::{DateTime, Utc};
use dynagent_adapter::{PersonaType, QueryResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Names of the four pipeline stages every query task moves through.
pub const QUERY_STEP_NAMES: [&str; 4] = [
    "Query Analysis",
    "Document Retrieval",
    "Agent Processing",
    "Response Generation",
];

/// Kind of tracked work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Query,
    Upload,
}

/// Status of one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

/// Status of a query task as a whole. Query tasks are born `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Processing,
    Completed,
    Error,
}

/// Status of an upload task. Upload tasks are born `Uploading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    Completed,
    Error,
}

/// One stage of a query pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStep {
    pub name: String,
    pub status: StepStatus,
    pub duration_ms: Option<u64>,
}

/// Kind-specific task payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TaskDetail {
    Query(QueryDetail),
    Upload(UploadDetail),
}

/// Payload of a query task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDetail {
    pub query: String,
    pub persona_type: PersonaType,
    pub status: QueryStatus,
    pub steps: Vec<QueryStep>,
    pub total_duration_ms: Option<u64>,
    pub result: Option<QueryResponse>,
    pub error: Option<String>,
}

/// Payload of an upload task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadDetail {
    pub file_name: String,
    pub status: UploadStatus,
    /// Percentage 0-100, non-decreasing until terminal.
    pub progress: u8,
    pub error: Option<String>,
}

/// A tracked unit of asynchronous work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub detail: TaskDetail,
}

impl Task {
    /// Create a query task with step 1 already processing.
    pub fn new_query(query: impl Into<String>, persona_type: PersonaType) -> Self {
        let mut steps: Vec<QueryStep> = QUERY_STEP_NAMES
            .iter()
            .map(|name| QueryStep {
                name: (*name).to_string(),
                status: StepStatus::Pending,
                duration_ms: None,
            })
            .collect();
        steps[0].status = StepStatus::Processing;

        Self {
            id: next_task_id(),
            created_at: Utc::now(),
            detail: TaskDetail::Query(QueryDetail {
                query: query.into(),
                persona_type,
                status: QueryStatus::Processing,
                steps,
                total_duration_ms: None,
                result: None,
                error: None,
            }),
        }
    }

    /// Create an upload task at zero progress.
    pub fn new_upload(file_name: impl Into<String>) -> Self {
        Self {
            id: next_task_id(),
            created_at: Utc::now(),
            detail: TaskDetail::Upload(UploadDetail {
                file_name: file_name.into(),
                status: UploadStatus::Uploading,
                progress: 0,
                error: None,
            }),
        }
    }

    pub fn kind(&self) -> TaskKind {
        match &self.detail {
            TaskDetail::Query(_) => TaskKind::Query,
            TaskDetail::Upload(_) => TaskKind::Upload,
        }
    }

    /// Returns true once the task reached `Completed` or `Error`.
    pub fn is_terminal(&self) -> bool {
        match &self.detail {
            TaskDetail::Query(query) => {
                matches!(query.status, QueryStatus::Completed | QueryStatus::Error)
            }
            TaskDetail::Upload(upload) => {
                matches!(upload.status, UploadStatus::Completed | UploadStatus::Error)
            }
        }
    }

    pub fn query(&self) -> Option<&QueryDetail> {
        match &self.detail {
            TaskDetail::Query(query) => Some(query),
            TaskDetail::Upload(_) => None,
        }
    }

    pub fn upload(&self) -> Option<&UploadDetail> {
        match &self.detail {
            TaskDetail::Upload(upload) => Some(upload),
            TaskDetail::Query(_) => None,
        }
    }

    pub(crate) fn query_mut(&mut self) -> Option<&mut QueryDetail> {
        match &mut self.detail {
            TaskDetail::Query(query) => Some(query),
            TaskDetail::Upload(_) => None,
        }
    }

    pub(crate) fn upload_mut(&mut self) -> Option<&mut UploadDetail> {
        match &mut self.detail {
            TaskDetail::Upload(upload) => Some(upload),
            TaskDetail::Query(_) => None,
        }
    }
}

impl QueryDetail {
    /// Complete step `index` with its nominal duration and start the next one.
    ///
    /// Out-of-order calls are ignored: a step completes only while processing.
    pub(crate) fn advance_step(&mut self, index: usize, duration_ms: u64) {
        let Some(step) = self.steps.get_mut(index) else {
            return;
        };
        if step.status != StepStatus::Processing {
            return;
        }
        step.status = StepStatus::Completed;
        step.duration_ms = Some(duration_ms);

        if let Some(next) = self.steps.get_mut(index + 1) {
            next.status = StepStatus::Processing;
        }
    }

    /// Terminal success: final step completed, result attached.
    pub(crate) fn complete(
        &mut self,
        final_step_duration_ms: u64,
        total_duration_ms: u64,
        result: QueryResponse,
    ) {
        if let Some(last) = self.steps.last_mut() {
            last.status = StepStatus::Completed;
            last.duration_ms = Some(final_step_duration_ms);
        }
        self.status = QueryStatus::Completed;
        self.total_duration_ms = Some(total_duration_ms);
        self.result = Some(result);
    }

    /// Terminal failure: the in-flight step is marked errored.
    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        for step in &mut self.steps {
            if step.status == StepStatus::Processing {
                step.status = StepStatus::Error;
            }
        }
        self.status = QueryStatus::Error;
        self.error = Some(message.into());
    }

    /// Index of the step currently processing, if any.
    pub fn active_step(&self) -> Option<usize> {
        self.steps
            .iter()
            .position(|step| step.status == StepStatus::Processing)
    }
}

impl UploadDetail {
    /// Advance synthetic progress by `increment`, clamped to `ceiling`.
    pub(crate) fn tick(&mut self, increment: u8, ceiling: u8) {
        if self.progress < ceiling {
            self.progress = self.progress.saturating_add(increment).min(ceiling);
        }
    }

    pub(crate) fn complete(&mut self) {
        self.status = UploadStatus::Completed;
        self.progress = 100;
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.status = UploadStatus::Error;
        self.error = Some(message.into());
    }
}

fn next_task_id() -> String {
    Uuid::new_v4().to_string()
}
