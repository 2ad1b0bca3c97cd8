//! Derives the active pool and the selectable chapters.

use quiz_core::model::{ChapterSelector, Question, QuestionCollection, ReviewSet};

/// Selectable chapters: `All`, each distinct chapter in first-occurrence
/// order, then `Review` only when the review set has entries.
#[must_use]
pub fn chapter_list(questions: &QuestionCollection, review: &ReviewSet) -> Vec<ChapterSelector> {
    let mut chapters = Vec::with_capacity(questions.len().min(16) + 2);
    chapters.push(ChapterSelector::All);
    chapters.extend(questions.chapters().into_iter().map(ChapterSelector::named));
    if !review.is_empty() {
        chapters.push(ChapterSelector::Review);
    }
    chapters
}

/// The ordered questions backing `selector`.
#[must_use]
pub fn pool<'a>(
    questions: &'a QuestionCollection,
    review: &'a ReviewSet,
    selector: &ChapterSelector,
) -> Vec<&'a Question> {
    match selector {
        ChapterSelector::All => questions.iter().collect(),
        ChapterSelector::Review => review.entries().iter().collect(),
        ChapterSelector::Named(name) => questions
            .iter()
            .filter(|q| q.chapter() == name.as_str())
            .collect(),
    }
}
