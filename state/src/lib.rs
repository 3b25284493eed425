//! # Platform Client State
//!
//! State holders that orchestrate CRUD flows over the service call tables.
//!
//! Each holder keeps its observable state behind an `Arc<RwLock<_>>`, read
//! through a closure (`state(|s| ...)`) or copied with `snapshot()`. Flags
//! such as `loading` are visible to other tasks while a call is in flight.
//! Failures never propagate out of an operation: they are rendered with
//! [`error_message`] into the holder's error string.
//!
//! - [`SessionsState`]: chat sessions and messages
//! - [`KnowledgeBaseState`]: knowledge bases and their files
//! - [`GlobalLoading`]: lifecycle observer counting flagged in-flight calls

pub mod error;
pub mod knowledge_base;
pub mod loading;
pub mod sessions;

pub use error::error_message;
pub use knowledge_base::{KnowledgeBaseOption, KnowledgeBaseState, KnowledgeBases};
pub use loading::GlobalLoading;
pub use sessions::{CreateSession, SendMessage, Sessions, SessionsState};
