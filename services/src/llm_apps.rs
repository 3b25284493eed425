//! LLM-apps service: completions and persisted chat sessions.
//!
//! A chat session is called a "conversation" on the wire; the
//! `conversation_title` and `session_id` field names follow the backend.

use crate::shared::{Ack, ServiceRequestOptions, path};
use platform_client_core::{HttpError, Method};
use platform_client_runtime::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Author of a chat message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions
    System,
    /// End user
    User,
    /// Model
    Assistant,
}

/// A role-tagged message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub role: Role,
    /// Text
    pub content: String,
}

impl ChatMessage {
    /// System prompt message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// End-user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of `POST /v1/llm/chat-completions`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionsRequest {
    /// Model to run
    pub model: String,
    /// Conversation so far
    pub messages: Vec<ChatMessage>,
    /// Always `false`; streaming is not supported
    #[serde(default)]
    pub stream: bool,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Knowledge bases to ground on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub know_ids: Option<Vec<String>>,
}

/// Result of `POST /v1/llm/chat-completions`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Completion id
    #[serde(default)]
    pub id: Option<String>,
    /// Generated choices
    #[serde(default)]
    pub choices: Vec<Value>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /v1/llm/chat-conversations`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConversationsRequest {
    /// Target session
    pub session_id: String,
    /// User message
    pub content: String,
    /// Always `false`; streaming is not supported
    #[serde(default)]
    pub stream: bool,
    /// Knowledge bases to ground on; omitted when empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub know_ids: Option<Vec<String>>,
}

/// Body of `POST /v1/llm/chat/sessions`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationsCreateRequest {
    /// Session title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_title: Option<String>,
    /// Leading system messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<Vec<ChatMessage>>,
}

/// Result of `POST /v1/llm/chat/sessions`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationsCreateResponse {
    /// New session id; absent when nothing was created
    #[serde(default)]
    pub session_id: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `PUT /v1/llm/chat/sessions/{id}`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationsUpdateRequest {
    /// New title
    pub conversation_title: String,
}

/// A chat session summary
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Session id
    #[serde(default)]
    pub session_id: String,
    /// Title
    #[serde(default)]
    pub conversation_title: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored message of a session
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Author role as sent by the backend
    #[serde(default)]
    pub role: Option<String>,
    /// Text
    #[serde(default)]
    pub content: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `GET /v1/llm/chat/sessions/{id}/messages`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationsMessagesResponse {
    /// Messages, oldest first
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `GET /v1/llm/chat/{user_id}/sessions`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationsResponse {
    /// Sessions of the user
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// LLM-apps service calls
#[derive(Clone, Debug)]
pub struct LlmAppsApi {
    client: HttpClient,
}

impl LlmAppsApi {
    /// Wrap a pipeline
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `POST /v1/llm/chat-completions`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn chat_completions(
        &self,
        payload: &ChatCompletionsRequest,
        options: &ServiceRequestOptions,
    ) -> Result<ChatCompletion, HttpError> {
        let descriptor = options
            .descriptor(Method::Post, "/v1/llm/chat-completions")
            .with_json(payload)?;
        self.client.request(descriptor).await
    }

    /// `POST /v1/llm/chat-conversations`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn chat_conversations(
        &self,
        payload: &ChatConversationsRequest,
        options: &ServiceRequestOptions,
    ) -> Result<Ack, HttpError> {
        let descriptor = options
            .descriptor(Method::Post, "/v1/llm/chat-conversations")
            .with_json(payload)?;
        self.client.request(descriptor).await
    }

    /// `POST /v1/llm/chat/sessions`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn create_session(
        &self,
        payload: &ConversationsCreateRequest,
        options: &ServiceRequestOptions,
    ) -> Result<ConversationsCreateResponse, HttpError> {
        let descriptor = options
            .descriptor(Method::Post, "/v1/llm/chat/sessions")
            .with_json(payload)?;
        self.client.request(descriptor).await
    }

    /// `PUT /v1/llm/chat/sessions/{id}`
    ///
    /// # Errors
    ///
    /// [`HttpError`] from encoding the body or from the pipeline.
    pub async fn update_session(
        &self,
        session_id: &str,
        payload: &ConversationsUpdateRequest,
        options: &ServiceRequestOptions,
    ) -> Result<Ack, HttpError> {
        let url = path(&["/v1/llm/chat/sessions/"], &[session_id]);
        let descriptor = options.descriptor(Method::Put, url).with_json(payload)?;
        self.client.request(descriptor).await
    }

    /// `DELETE /v1/llm/chat/sessions/{id}`
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn delete_session(&self, session_id: &str, options: &ServiceRequestOptions) -> Result<Ack, HttpError> {
        let url = path(&["/v1/llm/chat/sessions/"], &[session_id]);
        self.client.request(options.descriptor(Method::Delete, url)).await
    }

    /// `GET /v1/llm/chat/sessions/{id}/messages`
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn list_messages(
        &self,
        session_id: &str,
        options: &ServiceRequestOptions,
    ) -> Result<ConversationsMessagesResponse, HttpError> {
        let url = path(&["/v1/llm/chat/sessions/", "/messages"], &[session_id]);
        self.client.request(options.descriptor(Method::Get, url)).await
    }

    /// `GET /v1/llm/chat/{user_id}/sessions`
    ///
    /// # Errors
    ///
    /// Any [`HttpError`] from the pipeline.
    pub async fn list_sessions(
        &self,
        user_id: &str,
        options: &ServiceRequestOptions,
    ) -> Result<ConversationsResponse, HttpError> {
        let url = path(&["/v1/llm/chat/", "/sessions"], &[user_id]);
        self.client.request(options.descriptor(Method::Get, url)).await
    }
}
