/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

/// One persona entry from `GET /personas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaInfo {
    #[serde(rename = "type")]
    pub persona_type: String,
    pub name: String,
    pub description: String,
}

/// One dataset entry from `GET /datasets`.
///
/// Covers both CSV datasets and uploaded PDF documents; PDFs report a single
/// row and content/pages/metadata columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: u64,
    #[serde(default)]
    pub rows: u64,
    #[serde(default)]
    pub columns: Vec<String>,
}
