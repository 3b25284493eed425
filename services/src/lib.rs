//! # Platform Client Services
//!
//! Typed call tables for the platform backend services.
//!
//! Each service is a small struct wrapping an [`HttpClient`] with one method
//! per backend operation. Methods only assemble a
//! [`RequestDescriptor`](platform_client_core::RequestDescriptor) and hand it
//! to the pipeline, so identification, auth, deduplication, unwrapping and
//! lifecycle notification behave the same for every call.
//!
//! ## Example
//!
//! ```ignore
//! use platform_client_runtime::HttpClient;
//! use platform_client_services::{PlatformServices, ServiceRequestOptions};
//!
//! let services = PlatformServices::new(HttpClient::builder().base_url("https://api.example/").build());
//! let tasks = services.data_process.list_tasks(None, &ServiceRequestOptions::NONE).await?;
//! ```

use platform_client_runtime::HttpClient;

pub mod console;
pub mod data_process;
pub mod doclib_manage;
pub mod doclib_retrieve;
pub mod embeddings;
pub mod fine_tuning;
pub mod llm_apps;
pub mod shared;

pub use console::ConsoleApi;
pub use data_process::DataProcessApi;
pub use doclib_manage::DoclibManageApi;
pub use doclib_retrieve::DoclibRetrieveApi;
pub use embeddings::EmbeddingsApi;
pub use fine_tuning::FineTuningApi;
pub use llm_apps::LlmAppsApi;
pub use shared::{Ack, Page, ServiceRequestOptions};

/// Every service table over one shared pipeline
#[derive(Clone, Debug)]
pub struct PlatformServices {
    /// Auth and captcha
    pub console: ConsoleApi,
    /// Processing tasks
    pub data_process: DataProcessApi,
    /// Knowledge bases and files
    pub doclib_manage: DoclibManageApi,
    /// Search
    pub doclib_retrieve: DoclibRetrieveApi,
    /// Embeddings and rerank
    pub embeddings: EmbeddingsApi,
    /// Fine-tuning jobs
    pub fine_tuning: FineTuningApi,
    /// Chat
    pub llm_apps: LlmAppsApi,
}

impl PlatformServices {
    /// Build every table over `client`
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self {
            console: ConsoleApi::new(client.clone()),
            data_process: DataProcessApi::new(client.clone()),
            doclib_manage: DoclibManageApi::new(client.clone()),
            doclib_retrieve: DoclibRetrieveApi::new(client.clone()),
            embeddings: EmbeddingsApi::new(client.clone()),
            fine_tuning: FineTuningApi::new(client.clone()),
            llm_apps: LlmAppsApi::new(client),
        }
    }
}
