//! Chat session state: session list, selection, messages, sending.

use crate::error::error_message;
use platform_client_services::ServiceRequestOptions;
use platform_client_services::llm_apps::{
    ChatConversationsRequest, ChatMessage, Conversation, ConversationMessage, ConversationsCreateRequest,
    ConversationsUpdateRequest, LlmAppsApi,
};
use std::sync::Arc;
use tokio::sync::RwLock;

const USER_ID_REQUIRED: &str = "user id is required";
const SESSION_REQUIRED: &str = "select a session first";
const CONTENT_REQUIRED: &str = "message content is empty";

/// Observable state of [`SessionsState`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sessions {
    /// Sessions of the current user, as last loaded
    pub sessions: Vec<Conversation>,
    /// A list load or session mutation is running
    pub session_loading: bool,
    /// Session creation is running
    pub creating_session: bool,
    /// Last session-list failure, empty when none
    pub session_error: String,
    /// Selected session id
    pub selected_session_id: Option<String>,
    /// Messages of the selected session
    pub messages: Vec<ConversationMessage>,
    /// Messages are loading
    pub messages_loading: bool,
    /// A chat message is being sent
    pub chat_sending: bool,
    /// Last chat failure, empty when none
    pub chat_error: String,
}

impl Sessions {
    /// The selected session, if it is still in the list
    #[must_use]
    pub fn selected_session(&self) -> Option<&Conversation> {
        let id = self.selected_session_id.as_deref()?;
        self.sessions.iter().find(|session| session.session_id == id)
    }

    fn clear_selection(&mut self) {
        self.selected_session_id = None;
        self.messages.clear();
    }
}

/// Input of [`SessionsState::create_session`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateSession {
    /// Session title
    pub title: Option<String>,
    /// System prompt to seed the session with
    pub system_prompt: Option<String>,
}

/// Input of [`SessionsState::send_message`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SendMessage {
    /// Target session
    pub session_id: String,
    /// User message
    pub content: String,
    /// Knowledge bases to ground the answer on
    pub know_ids: Vec<String>,
}

/// Drives chat session flows over [`LlmAppsApi`].
///
/// Cheap to clone; clones share state. Operations never return errors:
/// failures land in `session_error` / `chat_error` and leave lists as they
/// were.
#[derive(Clone, Debug)]
pub struct SessionsState {
    api: LlmAppsApi,
    state: Arc<RwLock<Sessions>>,
}

/// Trimmed text, `None` when blank
fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim).filter(|text| !text.is_empty()).map(str::to_string)
}

impl SessionsState {
    /// Empty state over `api`
    #[must_use]
    pub fn new(api: LlmAppsApi) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(Sessions::default())),
        }
    }

    /// Read state via a closure
    ///
    /// ```ignore
    /// let count = sessions.state(|s| s.sessions.len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&Sessions) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> Sessions {
        self.state(Clone::clone).await
    }

    async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Sessions),
    {
        let mut state = self.state.write().await;
        f(&mut state);
    }

    /// Reload the sessions of `user_id`; clears the selection if it vanished
    pub async fn load_sessions(&self, user_id: &str) {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            self.update(|s| s.session_error = USER_ID_REQUIRED.to_string()).await;
            return;
        }
        self.update(|s| {
            s.session_loading = true;
            s.session_error.clear();
        })
        .await;

        let result = self.api.list_sessions(user_id, &ServiceRequestOptions::NONE).await;

        self.update(|s| {
            match result {
                Ok(response) => {
                    s.sessions = response.conversations;
                    let selection_gone = s.selected_session_id.is_some() && s.selected_session().is_none();
                    if selection_gone {
                        s.clear_selection();
                    }
                }
                Err(error) => s.session_error = error_message(&error),
            }
            s.session_loading = false;
        })
        .await;
    }

    /// Create a session, then reload the list and select it.
    ///
    /// Nothing is reloaded when the backend returns no session id.
    pub async fn create_session(&self, user_id: &str, payload: CreateSession) {
        if user_id.trim().is_empty() {
            self.update(|s| s.session_error = USER_ID_REQUIRED.to_string()).await;
            return;
        }
        self.update(|s| {
            s.creating_session = true;
            s.session_error.clear();
        })
        .await;

        let request = ConversationsCreateRequest {
            conversation_title: non_blank(payload.title.as_deref()),
            system_prompt: non_blank(payload.system_prompt.as_deref()).map(|prompt| vec![ChatMessage::system(prompt)]),
        };
        match self.api.create_session(&request, &ServiceRequestOptions::NONE).await {
            Ok(created) => {
                if let Some(session_id) = created.session_id.filter(|id| !id.is_empty()) {
                    tracing::debug!(%session_id, "chat session created");
                    self.load_sessions(user_id).await;
                    self.update(|s| s.selected_session_id = Some(session_id.clone())).await;
                    self.load_messages(Some(&session_id)).await;
                }
            }
            Err(error) => self.update(|s| s.session_error = error_message(&error)).await,
        }

        self.update(|s| s.creating_session = false).await;
    }

    /// Delete a session; deselects it if it was selected
    pub async fn delete_session(&self, session_id: &str) {
        if session_id.is_empty() {
            return;
        }
        self.update(|s| {
            s.session_loading = true;
            s.session_error.clear();
        })
        .await;

        let result = self.api.delete_session(session_id, &ServiceRequestOptions::NONE).await;

        self.update(|s| {
            match result {
                Ok(_) => {
                    s.sessions.retain(|session| session.session_id != session_id);
                    if s.selected_session_id.as_deref() == Some(session_id) {
                        s.clear_selection();
                    }
                }
                Err(error) => s.session_error = error_message(&error),
            }
            s.session_loading = false;
        })
        .await;
    }

    /// Retitle a session; blank titles are ignored
    pub async fn rename_session(&self, session_id: &str, title: &str) {
        let title = title.trim();
        if session_id.is_empty() || title.is_empty() {
            return;
        }
        self.update(|s| {
            s.session_loading = true;
            s.session_error.clear();
        })
        .await;

        let request = ConversationsUpdateRequest {
            conversation_title: title.to_string(),
        };
        let result = self
            .api
            .update_session(session_id, &request, &ServiceRequestOptions::NONE)
            .await;

        self.update(|s| {
            match result {
                Ok(_) => {
                    for session in s.sessions.iter_mut().filter(|session| session.session_id == session_id) {
                        session.conversation_title = Some(title.to_string());
                    }
                }
                Err(error) => s.session_error = error_message(&error),
            }
            s.session_loading = false;
        })
        .await;
    }

    /// Select a session and load its messages
    pub async fn select_session(&self, session_id: &str) {
        if session_id.is_empty() {
            return;
        }
        self.update(|s| s.selected_session_id = Some(session_id.to_string())).await;
        self.load_messages(Some(session_id)).await;
    }

    /// Load messages of `session_id`, or of the selected session
    pub async fn load_messages(&self, session_id: Option<&str>) {
        let id = match session_id {
            Some(id) => Some(id.to_string()),
            None => self.state(|s| s.selected_session_id.clone()).await,
        };
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            return;
        };
        self.update(|s| {
            s.messages_loading = true;
            s.chat_error.clear();
        })
        .await;

        let result = self.api.list_messages(&id, &ServiceRequestOptions::NONE).await;

        self.update(|s| {
            match result {
                Ok(response) => s.messages = response.messages,
                Err(error) => s.chat_error = error_message(&error),
            }
            s.messages_loading = false;
        })
        .await;
    }

    /// Send a user message, then reload the session's messages
    pub async fn send_message(&self, message: SendMessage) {
        if message.session_id.is_empty() {
            self.update(|s| s.chat_error = SESSION_REQUIRED.to_string()).await;
            return;
        }
        let content = message.content.trim();
        if content.is_empty() {
            self.update(|s| s.chat_error = CONTENT_REQUIRED.to_string()).await;
            return;
        }
        self.update(|s| {
            s.chat_sending = true;
            s.chat_error.clear();
        })
        .await;

        let request = ChatConversationsRequest {
            session_id: message.session_id.clone(),
            content: content.to_string(),
            stream: false,
            know_ids: (!message.know_ids.is_empty()).then(|| message.know_ids.clone()),
        };
        match self
            .api
            .chat_conversations(&request, &ServiceRequestOptions::NONE)
            .await
        {
            Ok(_) => self.load_messages(Some(&message.session_id)).await,
            Err(error) => self.update(|s| s.chat_error = error_message(&error)).await,
        }

        self.update(|s| s.chat_sending = false).await;
    }
}
