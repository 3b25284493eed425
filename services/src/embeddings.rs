//! Embeddings service: vector embeddings and reranking.

use crate::shared::{Page, ServiceRequestOptions};
use platform_client_core::{HttpError, Method};
use platform_client_runtime::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Text to embed: one string or a batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    /// Single text
    One(String),
    /// Batch of texts
    Many(Vec<String>),
}

impl From<&str> for EmbeddingInput {
    fn from(text: &str) -> Self {
        Self::One(text.to_string())
    }
}

impl From<Vec<String>> for EmbeddingInput {
    fn from(texts: Vec<String>) -> Self {
        Self::Many(texts)
    }
}

/// Body of `POST /v1/embeddings`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingsRequest {
    /// Embedding model
    pub model: String,
    /// Text(s) to embed
    pub input: EmbeddingInput,
}

/// One embedding vector
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Position in the input batch
    #[serde(default)]
    pub index: usize,
    /// The vector
    #[serde(default)]
    pub embedding: Vec<f32>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `POST /v1/embeddings`; vectors arrive under `data`
pub type EmbeddingsResponse = Page<Embedding>;

/// Body of `POST /v1/rerank`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RerankRequest {
    /// Rerank model
    pub model: String,
    /// Query to rank against
    pub query: String,
    /// Candidates
    pub documents: Vec<String>,
    /// Keep only the best `top_n`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
}

/// A ranked candidate
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    /// Index into the request's documents
    #[serde(default)]
    pub index: usize,
    /// Relevance score
    #[serde(default)]
    pub relevance_score: f64,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `POST /v1/rerank`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankResponse {
    /// Candidates, best first
    #[serde(default)]
    pub results: Vec<RerankResult>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Embeddings service calls
#[derive(Clone, Debug)]
pub struct EmbeddingsApi {
    client: HttpClient,
}

impl EmbeddingsApi {
    /// Wrap a pipeline
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `POST /v1/embeddings`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn create_embedding(
        &self,
        payload: &EmbeddingsRequest,
        options: &ServiceRequestOptions,
    ) -> Result<EmbeddingsResponse, HttpError> {
        let descriptor = options.descriptor(Method::Post, "/v1/embeddings").with_json(payload)?;
        self.client.request(descriptor).await
    }

    /// `POST /v1/rerank`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn rerank(
        &self,
        payload: &RerankRequest,
        options: &ServiceRequestOptions,
    ) -> Result<RerankResponse, HttpError> {
        let descriptor = options.descriptor(Method::Post, "/v1/rerank").with_json(payload)?;
        self.client.request(descriptor).await
    }
}
