use quiz_core::model::{ChapterSelector, QuestionKind, ScoreCounter};

use super::service::QuizSession;

/// Presentation-agnostic chapter button.
///
/// Scores are attached to concrete chapters only; `All` is shown as the total
/// summary and `Review` carries no score of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterEntry {
    pub selector: ChapterSelector,
    pub score: Option<ScoreCounter>,
    pub active: bool,
}

/// One option row of the active question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub letter: char,
    pub text: String,
    pub picked: bool,
    /// Only set once the answer is revealed.
    pub correct: bool,
}

/// Result block shown after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealView {
    pub correct: bool,
    pub correct_letters: Vec<char>,
    pub note: Option<String>,
}

/// Everything a renderer needs to draw the active question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub position: usize,
    pub pool_size: usize,
    pub prompt: String,
    pub kind: QuestionKind,
    pub options: Vec<OptionView>,
    pub reveal: Option<RevealView>,
    pub can_submit: bool,
    pub can_remove_from_review: bool,
}

/// Option letter for a zero-based index (`0` → `A`).
#[must_use]
pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .filter(u8::is_ascii_uppercase)
        .map_or('?', char::from)
}

/// Zero-based index for an option letter, case-insensitive.
#[must_use]
pub fn option_index(letter: char) -> Option<usize> {
    let upper = letter.to_ascii_uppercase();
    upper
        .is_ascii_uppercase()
        .then(|| usize::from(upper as u8 - b'A'))
}

impl QuizSession {
    #[must_use]
    pub fn chapter_entries(&self) -> Vec<ChapterEntry> {
        self.chapters()
            .into_iter()
            .map(|selector| ChapterEntry {
                score: match &selector {
                    ChapterSelector::Named(name) => Some(self.ledger().get(name)),
                    ChapterSelector::All | ChapterSelector::Review => None,
                },
                active: &selector == self.chapter(),
                selector,
            })
            .collect()
    }

    #[must_use]
    pub fn total_score(&self) -> ScoreCounter {
        self.ledger().overall()
    }

    #[must_use]
    pub fn question_view(&self) -> Option<QuestionView> {
        let question = self.current_question()?;
        let progress = self.progress();
        let cursor = self.cursor();
        let revealed = cursor.is_revealed();
        let correct_set = question.correct_indices();

        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(i, text)| OptionView {
                letter: option_letter(i),
                text: text.clone(),
                picked: cursor.picks().contains(&i),
                correct: revealed && correct_set.contains(&i),
            })
            .collect();

        let reveal = cursor.outcome().map(|correct| RevealView {
            correct,
            correct_letters: correct_set.iter().map(|&i| option_letter(i)).collect(),
            note: question.note().map(ToOwned::to_owned),
        });

        Some(QuestionView {
            position: progress.position,
            pool_size: progress.pool_size,
            prompt: question.text().to_owned(),
            kind: question.kind(),
            options,
            reveal,
            can_submit: !revealed && !cursor.picks().is_empty(),
            can_remove_from_review: self.can_remove_from_review(),
        })
    }
}
