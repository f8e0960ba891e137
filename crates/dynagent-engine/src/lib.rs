/*
[INPUT]:  Public API exports for dynagent-engine crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod chat;
pub mod config;
pub mod event;
pub mod store;
pub mod task;
pub mod trace;
pub mod transport;
pub mod upload;

// Re-export main types for convenience
pub use chat::{ChatMessage, FALLBACK_ERROR_MESSAGE};
pub use config::{EngineConfig, UploadPolicy};
pub use event::EngineEvent;
pub use store::{TaskStore, UpdateOutcome};
pub use task::{
    QueryDetail, QueryStatus, QueryStep, StepStatus, Task, TaskDetail, TaskKind, UploadDetail,
    UploadStatus,
};
pub use trace::{QueryTrace, TraceController};
pub use transport::{QueryTransport, UploadTransport};
pub use upload::{UploadFile, UploadQueueManager, UploadRejection};
