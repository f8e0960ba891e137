/*
[INPUT]:  Query and file submissions from the lifecycle managers.
[OUTPUT]: Real backend results, behind trait seams the engine can fake.
[POS]:    Boundary layer - the engine's only view of the network.
[UPDATE]: When the consumed backend contract changes.
*/

use async_trait::async_trait;
use dynagent_adapter::{DynagentClient, DynagentError, QueryRequest, QueryResponse, UploadResponse};

use crate::upload::UploadFile;

/// The real query submission operation, opaque to the engine.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    async fn submit_query(&self, request: &QueryRequest) -> Result<QueryResponse, DynagentError>;
}

/// The real file submission operation, opaque to the engine.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload_file(&self, file: &UploadFile) -> Result<UploadResponse, DynagentError>;
}

#[async_trait]
impl QueryTransport for DynagentClient {
    async fn submit_query(&self, request: &QueryRequest) -> Result<QueryResponse, DynagentError> {
        DynagentClient::submit_query(self, request).await
    }
}

#[async_trait]
impl UploadTransport for DynagentClient {
    async fn upload_file(&self, file: &UploadFile) -> Result<UploadResponse, DynagentError> {
        DynagentClient::upload_file(self, &file.name, &file.media_type, file.bytes.clone()).await
    }
}
