use log::{info, warn};
use std::sync::Arc;

use quiz_core::model::{ActivationCode, Question};
use storage::state::PersistedState;

use super::service::{QuizSession, SubmitOutcome};
use crate::error::SessionError;
use crate::loader::{LoadReport, QuestionLoader};

/// A freshly started session together with how its question bank was loaded.
#[derive(Debug)]
pub struct SessionStart {
    pub session: QuizSession,
    pub report: LoadReport,
}

/// Orchestrates session start and persisted answering.
///
/// Every ledger or review-set mutation made through this service is written
/// back immediately.
#[derive(Clone)]
pub struct SessionLoopService {
    loader: Arc<QuestionLoader>,
    state: PersistedState,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(loader: Arc<QuestionLoader>, state: PersistedState) -> Self {
        Self { loader, state }
    }

    /// Load questions and the persisted ledger / review set for `scope`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persisted state cannot be read. Source
    /// failures never surface here; they degrade to fewer questions.
    pub async fn start_session(
        &self,
        scope: Option<ActivationCode>,
    ) -> Result<SessionStart, SessionError> {
        let report = self.loader.load().await;
        let ledger = self.state.load_ledger(scope.as_ref()).await?;
        let review = self.state.load_review_set(scope.as_ref()).await?;
        info!(
            "session started with {} questions, {} in review",
            report.questions.len(),
            review.len()
        );

        let session = QuizSession::new(scope, report.questions.clone(), ledger, review);
        Ok(SessionStart { session, report })
    }

    /// Grade the active question and persist both the ledger and the review set.
    ///
    /// Both writes are attempted on every graded submission, so a review entry
    /// whose earlier write failed is saved by the next one.
    ///
    /// Returns `Ok(None)` when the submission was a no-op.
    ///
    /// # Errors
    ///
    /// Returns the first `SessionError::Storage` if persistence fails. The
    /// in-memory session stays revealed, so retrying cannot double count.
    pub async fn submit(
        &self,
        session: &mut QuizSession,
    ) -> Result<Option<SubmitOutcome>, SessionError> {
        let Some(outcome) = session.submit() else {
            return Ok(None);
        };

        let ledger = self
            .state
            .save_ledger(session.scope(), session.ledger())
            .await;
        let review = self
            .state
            .save_review_set(session.scope(), session.review_set())
            .await;
        if let Err(err) = &ledger {
            warn!("failed to persist score ledger: {err}");
        }
        if let Err(err) = &review {
            warn!("failed to persist review set: {err}");
        }
        ledger?;
        review?;
        Ok(Some(outcome))
    }

    /// Remove the active, correctly answered review question and persist the
    /// remaining review set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::RemovalNotAllowed` outside a correct review
    /// reveal, or `SessionError::Storage` if persistence fails.
    pub async fn remove_from_review(
        &self,
        session: &mut QuizSession,
    ) -> Result<Question, SessionError> {
        let removed = session.remove_current_from_review()?;
        self.state
            .save_review_set(session.scope(), session.review_set())
            .await?;
        Ok(removed)
    }
}
