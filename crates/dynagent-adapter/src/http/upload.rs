/*
[INPUT]:  File bytes with name and media type
[OUTPUT]: Upload confirmation and dataset listings
[POS]:    HTTP layer - document submission endpoints
[UPDATE]: When the upload form contract or dataset listing changes
*/

use reqwest::Method;
use reqwest::multipart::{Form, Part};

use crate::http::{DynagentClient, Result};
use crate::types::{DatasetsResponse, UploadResponse};

impl DynagentClient {
    /// Upload a document for processing and indexing
    ///
    /// POST /upload (multipart, field name "file")
    ///
    /// Server-side validation failures (wrong type, oversize) come back as
    /// 400/413 and surface as [`crate::DynagentError::Api`].
    pub async fn upload_file(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(media_type)?;
        let form = Form::new().part("file", part);

        let builder = self.request(Method::POST, "/upload")?.multipart(form);
        self.send_json(builder).await
    }

    /// List available CSV datasets and uploaded PDF documents
    ///
    /// GET /datasets
    pub async fn get_datasets(&self) -> Result<DatasetsResponse> {
        let builder = self.request(Method::GET, "/datasets")?;
        self.send_json(builder).await
    }
}
