/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::models::{Dataset, PersonaInfo};

/// Response body for `POST /query`.
///
/// `documents`, `math_results` and `sql_results` are opaque to the client;
/// their shape depends on which agents the router engaged server-side.
/// `processing_time` is a server-formatted string such as `"2.31s"` -
/// callers needing a number should measure client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    pub response: String,
    #[serde(default)]
    pub suggested_queries: Vec<String>,
    #[serde(default)]
    pub documents: Vec<serde_json::Value>,
    #[serde(default)]
    pub math_results: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub sql_results: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub processing_time: Option<String>,
}

/// Response body for `POST /upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response body for `GET /personas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonasResponse {
    pub success: bool,
    #[serde(default)]
    pub personas: Vec<PersonaInfo>,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response body for `GET /status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    #[serde(default)]
    pub services: HashMap<String, bool>,
    pub timestamp: String,
}

/// Response body for `GET /datasets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetsResponse {
    pub success: bool,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub csv_count: u32,
    #[serde(default)]
    pub pdf_count: u32,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response body for `GET /suggested-queries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedQueriesResponse {
    pub success: bool,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_response_tolerates_minimal_payload() {
        let parsed: QueryResponse = serde_json::from_str(
            r#"{"success": true, "response": "Revenue grew 12%."}"#,
        )
        .unwrap();
        assert!(parsed.success);
        assert!(parsed.suggested_queries.is_empty());
        assert_eq!(parsed.processing_time, None);
    }

    #[test]
    fn query_response_keeps_agent_payloads_opaque() {
        let parsed: QueryResponse = serde_json::from_str(
            r#"{
                "success": true,
                "response": "done",
                "suggested_queries": ["Why did it grow?"],
                "documents": [{"id": "doc-1", "score": 0.92}],
                "math_results": {"mean": 4.2},
                "sql_results": {},
                "processing_time": "2.31s"
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.suggested_queries.len(), 1);
        assert_eq!(parsed.documents[0]["id"], "doc-1");
        assert_eq!(parsed.math_results["mean"], 4.2);
    }

    #[test]
    fn upload_response_error_payload() {
        let parsed: UploadResponse = serde_json::from_str(
            r#"{"success": false, "message": "Failed to upload and process PDF", "error": "disk full"}"#,
        )
        .unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error.as_deref(), Some("disk full"));
        assert_eq!(parsed.file_id, None);
    }
}
