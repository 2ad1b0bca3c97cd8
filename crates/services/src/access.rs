use log::{debug, info};

use quiz_core::model::{AccessPolicy, ActivationCode};
use storage::repository::StorageError;
use storage::state::PersistedState;

use crate::error::AccessGateError;

/// Whether the session may be entered, and under which storage scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Session may start; state is scoped by the code when one is required.
    Unlocked(Option<ActivationCode>),
    /// An activation prompt must be shown instead of the session.
    Locked,
}

/// Optional access-control decorator in front of session entry.
#[derive(Clone)]
pub struct AccessGate {
    policy: AccessPolicy,
    state: PersistedState,
}

impl AccessGate {
    #[must_use]
    pub fn new(policy: AccessPolicy, state: PersistedState) -> Self {
        Self { policy, state }
    }

    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Check the stored code against the policy.
    ///
    /// A stored code that is no longer on the allow-list locks the gate.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored code cannot be read.
    pub async fn current(&self) -> Result<Entry, StorageError> {
        if self.policy.is_open() {
            return Ok(Entry::Unlocked(None));
        }
        match self.state.load_activation_code().await? {
            Some(code) if self.policy.permits(&code) => Ok(Entry::Unlocked(Some(code))),
            Some(code) => {
                debug!("stored activation code {code} is no longer accepted");
                Ok(Entry::Locked)
            }
            None => Ok(Entry::Locked),
        }
    }

    /// Verify `input` and remember it.
    ///
    /// # Errors
    ///
    /// Returns `AccessGateError::Access` for blank or unknown codes (the user
    /// may try again), or `AccessGateError::Storage` if saving fails.
    pub async fn activate(&self, input: &str) -> Result<ActivationCode, AccessGateError> {
        let code = self.policy.verify(input)?;
        self.state.save_activation_code(&code).await?;
        info!("activation code accepted");
        Ok(code)
    }

    /// Forget the stored code; the next `current()` is locked again.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the code cannot be removed.
    pub async fn deactivate(&self) -> Result<(), StorageError> {
        self.state.clear_activation_code().await
    }
}
