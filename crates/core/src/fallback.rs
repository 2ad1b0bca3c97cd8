//! Built-in question bank used when every source comes back empty.

use crate::model::{AnswerSpec, Question, QuestionCollection, QuestionRecord, RawId};

/// Identifier of the built-in demo question.
pub const FALLBACK_QUESTION_ID: &str = "demo-1";

/// Returns the fixed fallback collection.
///
/// A session never starts with zero questions; this single demo question keeps
/// the UI usable while sources are missing.
#[must_use]
pub fn fallback_collection() -> QuestionCollection {
    let records = [QuestionRecord {
        id: RawId::Text(FALLBACK_QUESTION_ID.to_owned()),
        chapter: "Sample chapter".to_owned(),
        text: "This is a fallback single-choice sample question?".to_owned(),
        options: vec!["A".to_owned(), "B".to_owned(), "C".to_owned(), "D".to_owned()],
        answer: AnswerSpec::Single(0),
        kind: None,
        note: None,
    }];

    QuestionCollection::from_questions(records.into_iter().filter_map(|r| Question::from_record(r).ok()))
}
