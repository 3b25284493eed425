//! Data-process service: asynchronous processing tasks.

use crate::shared::{Ack, Page, ServiceRequestOptions, path, with_optional_query};
use platform_client_core::{HttpError, Method};
use platform_client_runtime::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filters for `GET /v1/tasks`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListQuery {
    /// Only tasks in this state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// 1-based page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// A processing task
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task id
    #[serde(default)]
    pub id: Option<String>,
    /// Current state
    #[serde(default)]
    pub status: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /v1/tasks`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskCreateRequest {
    /// Task kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    /// Files to process
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_ids: Vec<String>,
    /// Kind-specific settings
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `POST /v1/tasks`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskCreateResponse {
    /// Id of the new task
    #[serde(default)]
    pub task_id: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query of `GET /v1/tasks/query`; ids are sent as a repeated key
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTaskGetQuery {
    /// Tasks to fetch
    pub task_ids: Vec<String>,
}

/// Data-process service calls
#[derive(Clone, Debug)]
pub struct DataProcessApi {
    client: HttpClient,
}

impl DataProcessApi {
    /// Wrap a pipeline
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET /v1/tasks`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the query or from the pipeline.
    pub async fn list_tasks(
        &self,
        params: Option<&TaskListQuery>,
        options: &ServiceRequestOptions,
    ) -> Result<Page<Task>, HttpError> {
        let descriptor = with_optional_query(options.descriptor(Method::Get, "/v1/tasks"), params)?;
        self.client.request(descriptor).await
    }

    /// `POST /v1/tasks`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn create_task(
        &self,
        payload: &TaskCreateRequest,
        options: &ServiceRequestOptions,
    ) -> Result<TaskCreateResponse, HttpError> {
        let descriptor = options.descriptor(Method::Post, "/v1/tasks").with_json(payload)?;
        self.client.request(descriptor).await
    }

    /// `GET /v1/tasks/query`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the query or from the pipeline.
    pub async fn batch_get_tasks(
        &self,
        params: Option<&BatchTaskGetQuery>,
        options: &ServiceRequestOptions,
    ) -> Result<Page<Task>, HttpError> {
        let descriptor = with_optional_query(options.descriptor(Method::Get, "/v1/tasks/query"), params)?;
        self.client.request(descriptor).await
    }

    /// `DELETE /v1/tasks/{id}`
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn delete_task(&self, task_id: &str, options: &ServiceRequestOptions) -> Result<Ack, HttpError> {
        let url = path(&["/v1/tasks/", ""], &[task_id]);
        self.client.request(options.descriptor(Method::Delete, url)).await
    }
}
