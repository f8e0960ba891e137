/*
[INPUT]:  Query results or failures.
[OUTPUT]: Chat messages derived for the conversation view.
[POS]:    Propagation layer - query outcome rendering payload.
[UPDATE]: When the derived message contract changes.
*/

use dynagent_adapter::QueryResponse;
use serde::{Deserialize, Serialize};

/// Fixed text shown when a query fails, matching the backend's own wording.
pub const FALLBACK_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while processing your request.";

/// A chat message derived from a query task's terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub task_id: String,
    pub content: String,
    pub suggested_queries: Vec<String>,
    pub is_error: bool,
}

impl ChatMessage {
    /// Build the success message from the real call's response.
    pub(crate) fn from_response(task_id: impl Into<String>, response: &QueryResponse) -> Self {
        Self {
            task_id: task_id.into(),
            content: response.response.clone(),
            suggested_queries: response.suggested_queries.clone(),
            is_error: false,
        }
    }

    /// Build the generic fallback message for a failed query.
    pub(crate) fn fallback_error(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            content: FALLBACK_ERROR_MESSAGE.to_string(),
            suggested_queries: Vec::new(),
            is_error: true,
        }
    }
}
