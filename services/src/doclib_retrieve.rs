//! Doclib-retrieve worker: semantic search over knowledge bases.

use crate::shared::ServiceRequestOptions;
use platform_client_core::{HttpError, Method};
use platform_client_runtime::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /v1/search`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text
    pub query: String,
    /// Knowledge bases to search
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub knowledge_base_ids: Vec<String>,
    /// Maximum number of hits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Minimum relevance score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
}

/// One retrieved chunk
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Chunk text
    #[serde(default)]
    pub content: Option<String>,
    /// Relevance score
    #[serde(default)]
    pub score: Option<f64>,
    /// Source file
    #[serde(default)]
    pub file_id: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Search result
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Hits, best first
    #[serde(default)]
    pub results: Vec<SearchHit>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Retrieve worker calls
#[derive(Clone, Debug)]
pub struct DoclibRetrieveApi {
    client: HttpClient,
}

impl DoclibRetrieveApi {
    /// Wrap a pipeline
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `POST /v1/search`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn search(
        &self,
        payload: &SearchRequest,
        options: &ServiceRequestOptions,
    ) -> Result<SearchResponse, HttpError> {
        let descriptor = options.descriptor(Method::Post, "/v1/search").with_json(payload)?;
        self.client.request(descriptor).await
    }
}
