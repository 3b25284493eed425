//! Knowledge base state: list, selection, attached files.

use crate::error::error_message;
use platform_client_services::ServiceRequestOptions;
use platform_client_services::doclib_manage::{
    DoclibManageApi, KnowledgeBase, KnowledgeBaseFile, KnowledgeBaseFileAddRequest, KnowledgeBaseNewRequest,
    KnowledgeBaseUpdateRequest,
};
use std::sync::Arc;
use tokio::sync::RwLock;

const NAME_REQUIRED: &str = "knowledge base name is required";
const FILE_TARGET_REQUIRED: &str = "select a knowledge base and enter a file id";
const UNTITLED: &str = "untitled";

/// Every knowledge base call drives the global loading indicator.
const OPTIONS: &ServiceRequestOptions = &ServiceRequestOptions::LOADING;

/// Entry of a knowledge base picker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnowledgeBaseOption {
    /// Knowledge base id
    pub id: String,
    /// Display label
    pub label: String,
}

/// Observable state of [`KnowledgeBaseState`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KnowledgeBases {
    /// Knowledge bases, as last loaded
    pub knowledge_bases: Vec<KnowledgeBase>,
    /// The list is loading
    pub loading: bool,
    /// A create, update or delete is running
    pub saving: bool,
    /// Last knowledge base failure, empty when none
    pub error: String,
    /// Selected knowledge base id
    pub selected_id: Option<String>,
    /// Files of the selected knowledge base
    pub files: Vec<KnowledgeBaseFile>,
    /// A file call is running
    pub file_loading: bool,
    /// Last file failure, empty when none
    pub file_error: String,
}

impl KnowledgeBases {
    /// The selected knowledge base, if it is still in the list
    #[must_use]
    pub fn selected_knowledge_base(&self) -> Option<&KnowledgeBase> {
        let id = self.selected_id.as_deref()?;
        self.knowledge_bases.iter().find(|kb| kb.id.as_deref() == Some(id))
    }

    /// Picker entries for knowledge bases that have an id.
    ///
    /// The label is the name, else the id, else "untitled".
    #[must_use]
    pub fn options(&self) -> Vec<KnowledgeBaseOption> {
        self.knowledge_bases
            .iter()
            .filter_map(|kb| {
                let id = kb.id.as_deref().filter(|id| !id.is_empty())?;
                let label = kb
                    .name
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(id);
                Some(KnowledgeBaseOption {
                    id: id.to_string(),
                    label: if label.is_empty() { UNTITLED } else { label }.to_string(),
                })
            })
            .collect()
    }

    fn clear_selection(&mut self) {
        self.selected_id = None;
        self.files.clear();
    }
}

/// Drives knowledge base flows over [`DoclibManageApi`].
///
/// Cheap to clone; clones share state.
#[derive(Clone, Debug)]
pub struct KnowledgeBaseState {
    api: DoclibManageApi,
    state: Arc<RwLock<KnowledgeBases>>,
}

impl KnowledgeBaseState {
    /// Empty state over `api`
    #[must_use]
    pub fn new(api: DoclibManageApi) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(KnowledgeBases::default())),
        }
    }

    /// Read state via a closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&KnowledgeBases) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> KnowledgeBases {
        self.state(Clone::clone).await
    }

    async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut KnowledgeBases),
    {
        let mut state = self.state.write().await;
        f(&mut state);
    }

    /// Reload the list; clears the selection if it vanished
    pub async fn load_knowledge_bases(&self) {
        self.update(|s| {
            s.loading = true;
            s.error.clear();
        })
        .await;

        let result = self.api.list_knowledge_bases(None, OPTIONS).await;

        self.update(|s| {
            match result {
                Ok(page) => {
                    s.knowledge_bases = page.data;
                    if s.selected_id.is_some() && s.selected_knowledge_base().is_none() {
                        s.clear_selection();
                    }
                }
                Err(error) => s.error = error_message(&error),
            }
            s.loading = false;
        })
        .await;
    }

    /// Create a knowledge base and prepend it to the list
    pub async fn create_knowledge_base(&self, name: &str, description: Option<&str>) {
        let name = name.trim();
        if name.is_empty() {
            self.update(|s| s.error = NAME_REQUIRED.to_string()).await;
            return;
        }
        self.update(|s| {
            s.saving = true;
            s.error.clear();
        })
        .await;

        let request = KnowledgeBaseNewRequest {
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        };
        let result = self.api.create_knowledge_base(&request, OPTIONS).await;

        self.update(|s| {
            match result {
                Ok(created) => s.knowledge_bases.insert(0, created),
                Err(error) => s.error = error_message(&error),
            }
            s.saving = false;
        })
        .await;
    }

    /// Update a knowledge base and replace it in the list
    pub async fn update_knowledge_base(&self, id: &str, payload: &KnowledgeBaseUpdateRequest) {
        if id.is_empty() {
            return;
        }
        self.update(|s| {
            s.saving = true;
            s.error.clear();
        })
        .await;

        let result = self.api.update_knowledge_base(id, payload, OPTIONS).await;

        self.update(|s| {
            match result {
                Ok(updated) => {
                    // Match on the returned id, not the requested one.
                    if let Some(slot) = s.knowledge_bases.iter_mut().find(|kb| kb.id == updated.id) {
                        *slot = updated;
                    }
                }
                Err(error) => s.error = error_message(&error),
            }
            s.saving = false;
        })
        .await;
    }

    /// Delete a knowledge base; deselects it if it was selected
    pub async fn delete_knowledge_base(&self, id: &str) {
        if id.is_empty() {
            return;
        }
        self.update(|s| {
            s.saving = true;
            s.error.clear();
        })
        .await;

        let result = self.api.delete_knowledge_base(id, OPTIONS).await;

        self.update(|s| {
            match result {
                Ok(_) => {
                    s.knowledge_bases.retain(|kb| kb.id.as_deref() != Some(id));
                    if s.selected_id.as_deref() == Some(id) {
                        s.clear_selection();
                    }
                }
                Err(error) => s.error = error_message(&error),
            }
            s.saving = false;
        })
        .await;
    }

    /// Select a knowledge base and load its files; `None` clears the files
    pub async fn select_knowledge_base(&self, id: Option<&str>) {
        self.update(|s| s.selected_id = id.map(str::to_string)).await;
        match id {
            Some(id) => self.load_files(id).await,
            None => self.update(|s| s.files.clear()).await,
        }
    }

    /// Load the files of a knowledge base; a failure clears the file list
    pub async fn load_files(&self, knowledge_base_id: &str) {
        self.update(|s| {
            s.file_loading = true;
            s.file_error.clear();
        })
        .await;

        let result = self
            .api
            .list_knowledge_base_files(knowledge_base_id, None, OPTIONS)
            .await;

        self.update(|s| {
            match result {
                Ok(page) => s.files = page.data,
                Err(error) => {
                    s.file_error = error_message(&error);
                    s.files.clear();
                }
            }
            s.file_loading = false;
        })
        .await;
    }

    /// Attach a file; replaces an entry with the same `file_id`, else prepends
    pub async fn add_file(&self, knowledge_base_id: &str, file_id: &str) {
        let file_id = file_id.trim();
        if knowledge_base_id.is_empty() || file_id.is_empty() {
            self.update(|s| s.file_error = FILE_TARGET_REQUIRED.to_string()).await;
            return;
        }
        self.update(|s| {
            s.file_loading = true;
            s.file_error.clear();
        })
        .await;

        let request = KnowledgeBaseFileAddRequest {
            file_id: file_id.to_string(),
        };
        let result = self
            .api
            .add_knowledge_base_file(knowledge_base_id, &request, OPTIONS)
            .await;

        self.update(|s| {
            match result {
                Ok(file) => match s.files.iter_mut().find(|existing| existing.file_id == file.file_id) {
                    Some(existing) => *existing = file,
                    None => s.files.insert(0, file),
                },
                Err(error) => s.file_error = error_message(&error),
            }
            s.file_loading = false;
        })
        .await;
    }

    /// Detach a file
    pub async fn delete_file(&self, knowledge_base_id: &str, file_id: &str) {
        if knowledge_base_id.is_empty() || file_id.is_empty() {
            return;
        }
        self.update(|s| {
            s.file_loading = true;
            s.file_error.clear();
        })
        .await;

        let result = self
            .api
            .delete_knowledge_base_file(knowledge_base_id, file_id, OPTIONS)
            .await;

        self.update(|s| {
            match result {
                Ok(_) => s.files.retain(|file| file.file_id.as_deref() != Some(file_id)),
                Err(error) => s.file_error = error_message(&error),
            }
            s.file_loading = false;
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb(id: Option<&str>, name: Option<&str>) -> KnowledgeBase {
        KnowledgeBase {
            id: id.map(str::to_string),
            name: name.map(str::to_string),
            ..KnowledgeBase::default()
        }
    }

    #[test]
    fn test_options_labels() {
        let state = KnowledgeBases {
            knowledge_bases: vec![
                kb(Some("kb1"), Some("Docs")),
                kb(Some("kb2"), None),
                kb(Some("kb3"), Some("")),
                kb(None, Some("orphan")),
            ],
            ..KnowledgeBases::default()
        };

        let options = state.options();
        let labels: Vec<_> = options.iter().map(|o| (o.id.as_str(), o.label.as_str())).collect();
        assert_eq!(labels, [("kb1", "Docs"), ("kb2", "kb2"), ("kb3", "kb3")]);
    }

    #[test]
    fn test_selected_knowledge_base() {
        let state = KnowledgeBases {
            knowledge_bases: vec![kb(Some("kb1"), Some("Docs"))],
            selected_id: Some("kb1".to_string()),
            ..KnowledgeBases::default()
        };
        assert_eq!(
            state.selected_knowledge_base().and_then(|kb| kb.name.as_deref()),
            Some("Docs")
        );
    }
}
