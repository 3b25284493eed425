//! Doclib-manage service: knowledge bases and their files.

use crate::shared::{Ack, Page, ServiceRequestOptions, path, with_optional_query};
use platform_client_core::{HttpError, Method};
use platform_client_runtime::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A knowledge base
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// Knowledge base id
    #[serde(default)]
    pub id: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filters for `GET /v1/knowledge-bases`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseListQuery {
    /// Name filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 1-based page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Body of `POST /v1/knowledge-bases`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseNewRequest {
    /// Display name
    pub name: String,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `PUT /v1/knowledge-bases/{id}`; absent fields are left unchanged
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseUpdateRequest {
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A file attached to a knowledge base
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseFile {
    /// Attached file id
    #[serde(default)]
    pub file_id: Option<String>,
    /// Original file name
    #[serde(default)]
    pub file_name: Option<String>,
    /// Indexing state
    #[serde(default)]
    pub status: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filters for `GET /v1/knowledge-bases/{id}/files`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseFileListQuery {
    /// 1-based page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Body of `POST /v1/knowledge-bases/{id}/files`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseFileAddRequest {
    /// Previously uploaded file
    pub file_id: String,
}

/// Doclib-manage service calls
#[derive(Clone, Debug)]
pub struct DoclibManageApi {
    client: HttpClient,
}

impl DoclibManageApi {
    /// Wrap a pipeline
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET /v1/knowledge-bases`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the query or from the pipeline.
    pub async fn list_knowledge_bases(
        &self,
        params: Option<&KnowledgeBaseListQuery>,
        options: &ServiceRequestOptions,
    ) -> Result<Page<KnowledgeBase>, HttpError> {
        let descriptor = with_optional_query(options.descriptor(Method::Get, "/v1/knowledge-bases"), params)?;
        self.client.request(descriptor).await
    }

    /// `POST /v1/knowledge-bases`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn create_knowledge_base(
        &self,
        payload: &KnowledgeBaseNewRequest,
        options: &ServiceRequestOptions,
    ) -> Result<KnowledgeBase, HttpError> {
        let descriptor = options
            .descriptor(Method::Post, "/v1/knowledge-bases")
            .with_json(payload)?;
        self.client.request(descriptor).await
    }

    /// `GET /v1/knowledge-bases/{id}`
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn get_knowledge_base(
        &self,
        knowledge_base_id: &str,
        options: &ServiceRequestOptions,
    ) -> Result<KnowledgeBase, HttpError> {
        let url = path(&["/v1/knowledge-bases/"], &[knowledge_base_id]);
        self.client.request(options.descriptor(Method::Get, url)).await
    }

    /// `PUT /v1/knowledge-bases/{id}`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn update_knowledge_base(
        &self,
        knowledge_base_id: &str,
        payload: &KnowledgeBaseUpdateRequest,
        options: &ServiceRequestOptions,
    ) -> Result<KnowledgeBase, HttpError> {
        let url = path(&["/v1/knowledge-bases/"], &[knowledge_base_id]);
        let descriptor = options.descriptor(Method::Put, url).with_json(payload)?;
        self.client.request(descriptor).await
    }

    /// `DELETE /v1/knowledge-bases/{id}`
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn delete_knowledge_base(
        &self,
        knowledge_base_id: &str,
        options: &ServiceRequestOptions,
    ) -> Result<Ack, HttpError> {
        let url = path(&["/v1/knowledge-bases/"], &[knowledge_base_id]);
        self.client.request(options.descriptor(Method::Delete, url)).await
    }

    /// `GET /v1/knowledge-bases/{id}/files`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the query or from the pipeline.
    pub async fn list_knowledge_base_files(
        &self,
        knowledge_base_id: &str,
        params: Option<&KnowledgeBaseFileListQuery>,
        options: &ServiceRequestOptions,
    ) -> Result<Page<KnowledgeBaseFile>, HttpError> {
        let url = path(&["/v1/knowledge-bases/", "/files"], &[knowledge_base_id]);
        let descriptor = with_optional_query(options.descriptor(Method::Get, url), params)?;
        self.client.request(descriptor).await
    }

    /// `POST /v1/knowledge-bases/{id}/files`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn add_knowledge_base_file(
        &self,
        knowledge_base_id: &str,
        payload: &KnowledgeBaseFileAddRequest,
        options: &ServiceRequestOptions,
    ) -> Result<KnowledgeBaseFile, HttpError> {
        let url = path(&["/v1/knowledge-bases/", "/files"], &[knowledge_base_id]);
        let descriptor = options.descriptor(Method::Post, url).with_json(payload)?;
        self.client.request(descriptor).await
    }

    /// `DELETE /v1/knowledge-bases/{id}/files/{file_id}`
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn delete_knowledge_base_file(
        &self,
        knowledge_base_id: &str,
        file_id: &str,
        options: &ServiceRequestOptions,
    ) -> Result<Ack, HttpError> {
        let url = path(&["/v1/knowledge-bases/", "/files/"], &[knowledge_base_id, file_id]);
        self.client.request(options.descriptor(Method::Delete, url)).await
    }
}
