/*
[INPUT]:  Query requests and catalog lookups
[OUTPUT]: Typed query, persona, status, and suggestion responses
[POS]:    HTTP layer - query and catalog endpoints
[UPDATE]: When adding new query endpoints or changing request shapes
*/

use reqwest::Method;

use crate::http::{DynagentClient, Result};
use crate::types::{
    PersonasResponse, QueryRequest, QueryResponse, SuggestedQueriesResponse, SystemStatus,
};

impl DynagentClient {
    /// Process a query through the multi-agent router
    ///
    /// POST /query
    ///
    /// The backend answers 200 even for failed queries, reporting the
    /// failure through `success: false` and `error`; transport-level
    /// failures surface as [`crate::DynagentError`].
    pub async fn submit_query(&self, req: &QueryRequest) -> Result<QueryResponse> {
        let builder = self.request(Method::POST, "/query")?.json(req);
        self.send_json(builder).await
    }

    /// Fetch the available persona catalog
    ///
    /// GET /personas
    pub async fn get_personas(&self) -> Result<PersonasResponse> {
        let builder = self.request(Method::GET, "/personas")?;
        self.send_json(builder).await
    }

    /// Fetch system status and per-service health
    ///
    /// GET /status
    pub async fn get_status(&self) -> Result<SystemStatus> {
        let builder = self.request(Method::GET, "/status")?;
        self.send_json(builder).await
    }

    /// Fetch standing suggested queries
    ///
    /// GET /suggested-queries
    pub async fn get_suggested_queries(&self) -> Result<SuggestedQueriesResponse> {
        let builder = self.request(Method::GET, "/suggested-queries")?;
        self.send_json(builder).await
    }
}
