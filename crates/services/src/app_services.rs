use std::sync::Arc;

use quiz_core::model::AccessPolicy;
use storage::repository::Storage;

use crate::access::{AccessGate, Entry};
use crate::error::{AppServicesError, SessionError};
use crate::loader::{QuestionLoader, SourceSpec};
use crate::sessions::{SessionLoopService, SessionStart};

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct QuizServices {
    access: Arc<AccessGate>,
    session_loop: Arc<SessionLoopService>,
}

impl QuizServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        sources: Vec<SourceSpec>,
        policy: AccessPolicy,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, QuestionLoader::new(sources), policy))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, loader: QuestionLoader, policy: AccessPolicy) -> Self {
        let state = storage.persisted_state();
        let access = Arc::new(AccessGate::new(policy, state.clone()));
        let session_loop = Arc::new(SessionLoopService::new(Arc::new(loader), state));
        Self {
            access,
            session_loop,
        }
    }

    #[must_use]
    pub fn access(&self) -> Arc<AccessGate> {
        Arc::clone(&self.access)
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    /// Start a session if the gate is unlocked; `Ok(None)` means an
    /// activation prompt should be shown instead.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if state cannot be read.
    pub async fn enter(&self) -> Result<Option<SessionStart>, SessionError> {
        match self.access.current().await? {
            Entry::Locked => Ok(None),
            Entry::Unlocked(scope) => self.session_loop.start_session(scope).await.map(Some),
        }
    }
}
