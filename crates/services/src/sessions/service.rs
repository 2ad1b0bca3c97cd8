use log::debug;
use std::fmt;

use quiz_core::model::{
    ActivationCode, ChapterSelector, Question, QuestionCollection, QuestionId, ReviewSet,
    ScoreLedger,
};

use super::cursor::SessionCursor;
use super::filter;
use crate::error::SessionError;

//
// ─── SUBMIT OUTCOME ────────────────────────────────────────────────────────────
//

/// What a graded submission changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub question_id: QuestionId,
    pub chapter: String,
    pub correct: bool,
    /// The question was newly appended to the review set.
    pub added_to_review: bool,
}

/// Position within the active pool, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// 1-based position; 0 when the pool is empty.
    pub position: usize,
    pub pool_size: usize,
    pub revealed: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session over a loaded question bank.
///
/// Owns the ledger and review set for the duration of the session. Mutations
/// happen here synchronously; `SessionLoopService` persists them.
pub struct QuizSession {
    scope: Option<ActivationCode>,
    questions: QuestionCollection,
    ledger: ScoreLedger,
    review: ReviewSet,
    cursor: SessionCursor,
}

impl QuizSession {
    /// Create a session positioned at the first question of `All`.
    #[must_use]
    pub fn new(
        scope: Option<ActivationCode>,
        questions: QuestionCollection,
        ledger: ScoreLedger,
        review: ReviewSet,
    ) -> Self {
        Self {
            scope,
            questions,
            ledger,
            review,
            cursor: SessionCursor::new(ChapterSelector::All),
        }
    }

    /// Activation code the persisted state is scoped to.
    #[must_use]
    pub fn scope(&self) -> Option<&ActivationCode> {
        self.scope.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionCollection {
        &self.questions
    }

    #[must_use]
    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    #[must_use]
    pub fn review_set(&self) -> &ReviewSet {
        &self.review
    }

    #[must_use]
    pub fn cursor(&self) -> &SessionCursor {
        &self.cursor
    }

    #[must_use]
    pub fn chapter(&self) -> &ChapterSelector {
        self.cursor.chapter()
    }

    #[must_use]
    pub fn chapters(&self) -> Vec<ChapterSelector> {
        filter::chapter_list(&self.questions, &self.review)
    }

    #[must_use]
    pub fn pool(&self) -> Vec<&Question> {
        filter::pool(&self.questions, &self.review, self.cursor.chapter())
    }

    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.pool().len()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.pool().get(self.cursor.index()).copied()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let pool_size = self.pool_len();
        SessionProgress {
            position: if pool_size == 0 { 0 } else { self.cursor.index() + 1 },
            pool_size,
            revealed: self.cursor.is_revealed(),
        }
    }

    /// Switch to another chapter and start at its first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownChapter` if `selector` is not currently
    /// selectable (including `Review` while the review set is empty).
    pub fn select_chapter(&mut self, selector: ChapterSelector) -> Result<(), SessionError> {
        if !self.chapters().contains(&selector) {
            return Err(SessionError::UnknownChapter(selector.label().to_owned()));
        }
        debug!("switching to chapter {selector}");
        self.cursor.switch_chapter(selector);
        Ok(())
    }

    /// Toggle an option of the active question.
    ///
    /// Ignored once the answer is revealed, when there is no active question,
    /// or when `option` is out of range. Returns `true` if the picks changed.
    pub fn toggle_pick(&mut self, option: usize) -> bool {
        if self.cursor.is_revealed() {
            return false;
        }
        let Some(question) = self.current_question() else {
            return false;
        };
        if option >= question.options().len() {
            return false;
        }
        let multi = question.kind().allows_multiple_picks();
        self.cursor.toggle(option, multi);
        true
    }

    /// Grade the active question, update the ledger and reveal the answer.
    ///
    /// Missed questions outside the review pool are added to the review set.
    /// Returns `None` (no-op) if there is no active question, nothing is
    /// picked, or the answer is already revealed.
    pub fn submit(&mut self) -> Option<SubmitOutcome> {
        if self.cursor.is_revealed() || self.cursor.picks().is_empty() {
            return None;
        }
        let question = self.current_question()?.clone();
        let correct = question.is_correct(self.cursor.picks());

        self.ledger.record(question.chapter(), correct);

        let added_to_review = !correct
            && !self.cursor.chapter().is_review()
            && self.review.add(question.clone());

        self.cursor.reveal(correct);
        debug!(
            "submitted {} correct={correct} added_to_review={added_to_review}",
            question.id()
        );

        Some(SubmitOutcome {
            question_id: question.id().clone(),
            chapter: question.chapter().to_owned(),
            correct,
            added_to_review,
        })
    }

    /// Advance to the next question, wrapping from last to first.
    ///
    /// Returns `false` (no-op) on an empty pool.
    pub fn next(&mut self) -> bool {
        let len = self.pool_len();
        if len == 0 {
            return false;
        }
        self.cursor.move_to((self.cursor.index() + 1) % len);
        true
    }

    /// Go back one question, wrapping from first to last.
    ///
    /// Returns `false` (no-op) on an empty pool.
    pub fn previous(&mut self) -> bool {
        let len = self.pool_len();
        if len == 0 {
            return false;
        }
        let index = self.cursor.index().min(len - 1);
        self.cursor.move_to(if index == 0 { len - 1 } else { index - 1 });
        true
    }

    /// Whether the active question may be removed from the review set.
    #[must_use]
    pub fn can_remove_from_review(&self) -> bool {
        self.cursor.chapter().is_review()
            && self.cursor.outcome() == Some(true)
            && self.current_question().is_some()
    }

    /// Remove the active question from the review set after a correct answer.
    ///
    /// The index stays put so it addresses the following entry; removing the
    /// last entry wraps to the first. When the review set becomes empty the
    /// session falls back to `All`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::RemovalNotAllowed` unless the active pool is the
    /// review pool and the active question has been revealed as correct.
    pub fn remove_current_from_review(&mut self) -> Result<Question, SessionError> {
        if !self.can_remove_from_review() {
            return Err(SessionError::RemovalNotAllowed);
        }
        let len = self.pool_len();
        let index = self.cursor.index();
        let id = self
            .current_question()
            .map(|q| q.id().clone())
            .ok_or(SessionError::RemovalNotAllowed)?;
        let removed = self
            .review
            .remove(&id)
            .ok_or(SessionError::RemovalNotAllowed)?;

        if self.review.is_empty() {
            debug!("review set emptied, returning to all chapters");
            self.cursor.switch_chapter(ChapterSelector::All);
        } else {
            self.cursor.move_to(if index + 1 >= len { 0 } else { index });
        }
        Ok(removed)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("scope", &self.scope)
            .field("questions_len", &self.questions.len())
            .field("review_len", &self.review.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
