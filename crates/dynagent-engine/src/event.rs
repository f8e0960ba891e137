/*
[INPUT]:  Task store mutations and query completions.
[OUTPUT]: Events for the presentation layer to render.
[POS]:    Propagation layer - the engine's outward surface.
[UPDATE]: When presentation needs new event kinds.
*/

use crate::chat::ChatMessage;
use crate::task::Task;

/// All events the engine propagates to its consumer.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A task was created or its visible state changed (full snapshot)
    TaskUpdated(Task),

    /// A task was dismissed and removed from the store (task_id)
    TaskRemoved(String),

    /// A chat message derived from a completed or failed query
    Chat(ChatMessage),
}
