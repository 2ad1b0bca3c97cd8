//! Typed load/save of quiz state on top of a `KeyValueStore`.
//!
//! Every persisted value is read through [`PersistedState::load`], which treats
//! an unparsable value as absent and falls back to the type's default.

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use quiz_core::model::{ActivationCode, Question, ReviewSet, ScoreLedger};

use crate::repository::{KeyValueStore, StorageError};

/// Key of the score ledger (JSON object chapter → counter).
pub const SCORE_KEY: &str = "quiz-score";

/// Key of the wrong-answer review set (JSON array of questions).
pub const REVIEW_SET_KEY: &str = "quiz-wrong-store";

/// Key of the stored activation code (bare string, never scoped).
pub const ACTIVATION_CODE_KEY: &str = "quiz-activation-code";

/// Builds the storage key for `base`, suffixed with the activation code if any.
#[must_use]
pub fn scoped_key(base: &str, scope: Option<&ActivationCode>) -> String {
    match scope {
        Some(code) => format!("{base}-{code}"),
        None => base.to_owned(),
    }
}

/// Typed repository over the key-value store.
#[derive(Clone)]
pub struct PersistedState {
    store: Arc<dyn KeyValueStore>,
}

impl PersistedState {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load and decode the JSON value under `key`.
    ///
    /// Missing or unparsable values yield `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the backend itself fails.
    pub async fn load<T>(&self, key: &str) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.store.get(key).await? else {
            debug!("no stored value for {key}, using default");
            return Ok(T::default());
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("discarding unparsable value for {key}: {err}");
                Ok(T::default())
            }
        }
    }

    /// Encode `value` as JSON and store it under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails, or a backend error.
    pub async fn save<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.put(key, &raw).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn load_ledger(
        &self,
        scope: Option<&ActivationCode>,
    ) -> Result<ScoreLedger, StorageError> {
        self.load(&scoped_key(SCORE_KEY, scope)).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on encoding or backend failure.
    pub async fn save_ledger(
        &self,
        scope: Option<&ActivationCode>,
        ledger: &ScoreLedger,
    ) -> Result<(), StorageError> {
        self.save(&scoped_key(SCORE_KEY, scope), ledger).await
    }

    /// Entries that no longer decode or validate are dropped one by one; the
    /// rest of the set survives.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn load_review_set(
        &self,
        scope: Option<&ActivationCode>,
    ) -> Result<ReviewSet, StorageError> {
        let key = scoped_key(REVIEW_SET_KEY, scope);
        let items: Vec<Value> = self.load(&key).await?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<Question>(item) {
                Ok(question) => entries.push(question),
                Err(err) => warn!("dropping unreadable review entry under {key}: {err}"),
            }
        }
        Ok(ReviewSet::from_entries(entries))
    }

    /// # Errors
    ///
    /// Returns `StorageError` on encoding or backend failure.
    pub async fn save_review_set(
        &self,
        scope: Option<&ActivationCode>,
        review_set: &ReviewSet,
    ) -> Result<(), StorageError> {
        self.save(&scoped_key(REVIEW_SET_KEY, scope), review_set)
            .await
    }

    /// The stored activation code, if one is present and well-formed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn load_activation_code(&self) -> Result<Option<ActivationCode>, StorageError> {
        let raw = self.store.get(ACTIVATION_CODE_KEY).await?;
        Ok(raw.and_then(|s| ActivationCode::parse(&s).ok()))
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn save_activation_code(&self, code: &ActivationCode) -> Result<(), StorageError> {
        self.store.put(ACTIVATION_CODE_KEY, code.as_str()).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn clear_activation_code(&self) -> Result<(), StorageError> {
        self.store.remove(ACTIVATION_CODE_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    fn state() -> (InMemoryRepository, PersistedState) {
        let repo = InMemoryRepository::new();
        let state = PersistedState::new(Arc::new(repo.clone()));
        (repo, state)
    }

    #[test]
    fn keys_are_scoped_by_code() {
        let code = ActivationCode::parse("VIP").unwrap();
        assert_eq!(scoped_key(SCORE_KEY, None), "quiz-score");
        assert_eq!(scoped_key(SCORE_KEY, Some(&code)), "quiz-score-VIP");
        assert_eq!(scoped_key(REVIEW_SET_KEY, Some(&code)), "quiz-wrong-store-VIP");
    }

    #[tokio::test]
    async fn missing_state_loads_as_empty() {
        let (_repo, state) = state();
        assert!(state.load_ledger(None).await.unwrap().is_empty());
        assert!(state.load_review_set(None).await.unwrap().is_empty());
        assert!(state.load_activation_code().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_state_loads_as_empty() {
        let (repo, state) = state();
        repo.put(SCORE_KEY, "{not json").await.unwrap();
        repo.put(REVIEW_SET_KEY, r#"[{"id": "x"}]"#).await.unwrap();

        assert!(state.load_ledger(None).await.unwrap().is_empty());
        assert!(state.load_review_set(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_review_entries_are_dropped_individually() {
        let (repo, state) = state();
        let raw = r#"[
            {"id": "s-1", "chapter": "Loans", "text": "Q1", "options": ["a", "b", "c"], "answer": 0, "type": "single"},
            {"id": "s-2", "chapter": "Loans", "text": "Q2", "options": ["a"], "answer": 5},
            {"id": "m-1"},
            {"id": "j-1", "chapter": "Cards", "text": "Q3", "options": ["T", "F"], "answer": 1, "type": "judge"}
        ]"#;
        repo.put(REVIEW_SET_KEY, raw).await.unwrap();

        let review = state.load_review_set(None).await.unwrap();
        let ids: Vec<&str> = review.entries().iter().map(|q| q.id().as_str()).collect();
        assert_eq!(ids, vec!["s-1", "j-1"]);
    }

    #[tokio::test]
    async fn ledger_round_trips_per_scope() {
        let (repo, state) = state();
        let code = ActivationCode::parse("TEAM").unwrap();
        let mut ledger = ScoreLedger::new();
        ledger.record("Loans", true);

        state.save_ledger(Some(&code), &ledger).await.unwrap();

        assert_eq!(state.load_ledger(Some(&code)).await.unwrap(), ledger);
        assert!(state.load_ledger(None).await.unwrap().is_empty());
        assert!(repo.get("quiz-score-TEAM").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn activation_code_is_stored_bare() {
        let (repo, state) = state();
        let code = ActivationCode::parse("VIP").unwrap();

        state.save_activation_code(&code).await.unwrap();
        assert_eq!(repo.get(ACTIVATION_CODE_KEY).await.unwrap().as_deref(), Some("VIP"));
        assert_eq!(state.load_activation_code().await.unwrap(), Some(code));

        state.clear_activation_code().await.unwrap();
        assert!(state.load_activation_code().await.unwrap().is_none());
    }
}
