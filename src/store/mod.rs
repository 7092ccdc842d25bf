use serde::{Deserialize, Serialize};

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::dto::Tag;

/// The note being composed, as raw input values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tag: String,
}

impl Default for NoteDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            tag: Tag::Todo.to_string(),
        }
    }
}

/// Fields to merge into the draft. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tag: Option<String>,
}

impl DraftUpdate {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("Failed to access draft file: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed draft file: {0}")]
    Format(#[from] serde_json::Error),
}

/// Shared handle to the single in-progress note draft.
///
/// Clones share the same draft. A store created with [`DraftStore::persistent`]
/// writes every change through to its file so the draft outlives the process.
#[derive(Debug, Clone, Default)]
pub struct DraftStore {
    draft: Arc<RwLock<NoteDraft>>,
    path: Option<Arc<PathBuf>>,
}

impl DraftStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store backed by `path`, starting from the saved draft if any.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let draft = match load_draft(&path) {
            Ok(Some(draft)) => {
                tracing::debug!("Restored note draft from {}", path.display());
                draft
            }
            Ok(None) => NoteDraft::default(),
            Err(e) => {
                tracing::error!("Failed to restore note draft from {}: {e}", path.display());
                NoteDraft::default()
            }
        };

        Self {
            draft: Arc::new(RwLock::new(draft)),
            path: Some(Arc::new(path)),
        }
    }

    #[must_use]
    pub fn draft(&self) -> NoteDraft {
        self.read().clone()
    }

    pub fn set_draft(&self, update: DraftUpdate) {
        {
            let mut draft = self.write();
            if let Some(title) = update.title {
                draft.title = title;
            }
            if let Some(content) = update.content {
                draft.content = content;
            }
            if let Some(tag) = update.tag {
                draft.tag = tag;
            }
        }
        self.persist();
    }

    pub fn clear_draft(&self) {
        *self.write() = NoteDraft::default();
        self.persist();
    }

    /// Writes the current draft to the backing file, if there is one.
    ///
    /// # Errors
    ///
    /// Fails when the draft cannot be serialized or written.
    pub fn save(&self) -> Result<(), DraftError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = serde_json::to_string_pretty(&self.draft())?;
        fs::write(path.as_path(), contents)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::error!("Failed to persist note draft: {e}");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, NoteDraft> {
        self.draft.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NoteDraft> {
        self.draft.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_draft(path: &Path) -> Result<Option<NoteDraft>, DraftError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
