/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for dynagent-adapter tests

use dynagent_adapter::{ClientConfig, DynagentClient};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Build a client pointed at the mock server
pub fn client_for(server: &MockServer) -> DynagentClient {
    DynagentClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client for mock server")
}

/// A minimal successful /query body
pub fn query_success_body() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "response": "Revenue grew 12%.",
        "suggested_queries": ["Why did it grow?"],
        "documents": [],
        "math_results": {},
        "sql_results": {},
        "processing_time": "2.31s"
    })
}
