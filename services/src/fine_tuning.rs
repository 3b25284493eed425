//! Fine-tuning job service.

use crate::shared::{Ack, Page, ServiceRequestOptions, path, with_optional_query};
use platform_client_core::{HttpError, Method};
use platform_client_runtime::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Cursor paging shared by the job and event listings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListQuery {
    /// Return items after this id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Filters for `GET /v1/fine_tuning/jobs/{id}/events`
pub type JobEventListQuery = JobListQuery;

/// Body of `POST /v1/fine_tuning/jobs`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobCreateRequest {
    /// Base model
    pub model: String,
    /// Uploaded training file
    pub training_file: String,
    /// Optional validation file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_file: Option<String>,
    /// Training hyperparameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperparameters: Option<Value>,
    /// Suffix for the resulting model name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

/// A fine-tuning job
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FineTuningJob {
    /// Job id
    #[serde(default)]
    pub id: Option<String>,
    /// Base model
    #[serde(default)]
    pub model: Option<String>,
    /// Job state
    #[serde(default)]
    pub status: Option<String>,
    /// Resulting model, once finished
    #[serde(default)]
    pub fine_tuned_model: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A job progress event
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobEvent {
    /// Event id
    #[serde(default)]
    pub id: Option<String>,
    /// Severity
    #[serde(default)]
    pub level: Option<String>,
    /// Event text
    #[serde(default)]
    pub message: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fine-tuning job calls
#[derive(Clone, Debug)]
pub struct FineTuningApi {
    client: HttpClient,
}

impl FineTuningApi {
    /// Wrap a pipeline
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET /v1/fine_tuning/jobs`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the query or from the pipeline.
    pub async fn list_jobs(
        &self,
        params: Option<&JobListQuery>,
        options: &ServiceRequestOptions,
    ) -> Result<Page<FineTuningJob>, HttpError> {
        let descriptor = with_optional_query(options.descriptor(Method::Get, "/v1/fine_tuning/jobs"), params)?;
        self.client.request(descriptor).await
    }

    /// `POST /v1/fine_tuning/jobs`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn create_job(
        &self,
        payload: &JobCreateRequest,
        options: &ServiceRequestOptions,
    ) -> Result<FineTuningJob, HttpError> {
        let descriptor = options
            .descriptor(Method::Post, "/v1/fine_tuning/jobs")
            .with_json(payload)?;
        self.client.request(descriptor).await
    }

    /// `GET /v1/fine_tuning/jobs/{id}`
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn get_job(&self, job_id: &str, options: &ServiceRequestOptions) -> Result<FineTuningJob, HttpError> {
        let url = path(&["/v1/fine_tuning/jobs/"], &[job_id]);
        self.client.request(options.descriptor(Method::Get, url)).await
    }

    /// `DELETE /v1/fine_tuning/jobs/{id}`
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn delete_job(&self, job_id: &str, options: &ServiceRequestOptions) -> Result<Ack, HttpError> {
        let url = path(&["/v1/fine_tuning/jobs/"], &[job_id]);
        self.client.request(options.descriptor(Method::Delete, url)).await
    }

    /// `POST /v1/fine_tuning/jobs/{id}/cancel`, no body
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn cancel_job(&self, job_id: &str, options: &ServiceRequestOptions) -> Result<FineTuningJob, HttpError> {
        let url = path(&["/v1/fine_tuning/jobs/", "/cancel"], &[job_id]);
        self.client.request(options.descriptor(Method::Post, url)).await
    }

    /// `GET /v1/fine_tuning/jobs/{id}/events`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the query or from the pipeline.
    pub async fn list_job_events(
        &self,
        job_id: &str,
        params: Option<&JobEventListQuery>,
        options: &ServiceRequestOptions,
    ) -> Result<Page<JobEvent>, HttpError> {
        let url = path(&["/v1/fine_tuning/jobs/", "/events"], &[job_id]);
        let descriptor = with_optional_query(options.descriptor(Method::Get, url), params)?;
        self.client.request(descriptor).await
    }
}
