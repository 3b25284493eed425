//! Console service: login, logout, captcha.

use crate::shared::{Ack, ServiceRequestOptions};
use platform_client_core::{HttpError, Method};
use platform_client_runtime::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Credentials for `POST /v1/auth/login`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
    /// Id of the captcha being answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captcha_id: Option<String>,
    /// Captcha answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captcha_code: Option<String>,
}

/// Successful login
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for later calls
    #[serde(default)]
    pub token: Option<String>,
    /// Authenticated user
    #[serde(default)]
    pub user_id: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Optional body of `POST /v1/auth/logout`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// Token to revoke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Generated captcha challenge
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Captcha {
    /// Challenge id, echoed back on login
    #[serde(default)]
    pub captcha_id: Option<String>,
    /// Encoded challenge image
    #[serde(default)]
    pub image: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Console service calls
#[derive(Clone, Debug)]
pub struct ConsoleApi {
    client: HttpClient,
}

impl ConsoleApi {
    /// Wrap a pipeline
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `POST /v1/auth/login`
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline, e.g. 401 on bad credentials.
    pub async fn login(
        &self,
        payload: &LoginRequest,
        options: &ServiceRequestOptions,
    ) -> Result<LoginResponse, HttpError> {
        let descriptor = options
            .descriptor(Method::Post, "/v1/auth/login")
            .with_json(payload)?;
        self.client.request(descriptor).await
    }

    /// `POST /v1/auth/logout`, body only when given
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn logout(
        &self,
        payload: Option<&LogoutRequest>,
        options: &ServiceRequestOptions,
    ) -> Result<Ack, HttpError> {
        let mut descriptor = options.descriptor(Method::Post, "/v1/auth/logout");
        if let Some(payload) = payload {
            descriptor = descriptor.with_json(payload)?;
        }
        self.client.request(descriptor).await
    }

    /// `GET /v1/captchas`
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn generate_captcha(&self, options: &ServiceRequestOptions) -> Result<Captcha, HttpError> {
        self.client
            .request(options.descriptor(Method::Get, "/v1/captchas"))
            .await
    }
}
