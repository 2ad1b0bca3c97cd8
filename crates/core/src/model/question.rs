use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::model::chapter::{ALL_CHAPTERS, REVIEW_CHAPTER};
use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question must have at least one option")]
    NoOptions,

    #[error("answer index {index} is out of range for {options} options")]
    AnswerOutOfRange { index: usize, options: usize },

    #[error("multi-answer question must list at least one correct option")]
    EmptyAnswerSet,

    #[error("true/false question must have exactly two options, found {0}")]
    TrueFalseOptionCount(usize),

    #[error("chapter name `{0}` is reserved")]
    ReservedChapter(String),
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

/// Identifier as it appears in a source file: either text or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{n}"),
            RawId::Text(s) => f.write_str(s),
        }
    }
}

/// Correct answer: one option index, or a set of option indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerSpec {
    Single(usize),
    Multi(Vec<usize>),
}

impl AnswerSpec {
    #[must_use]
    pub fn is_set(&self) -> bool {
        matches!(self, AnswerSpec::Multi(_))
    }

    /// Distinct correct indices, ordered.
    #[must_use]
    pub fn indices(&self) -> BTreeSet<usize> {
        match self {
            AnswerSpec::Single(i) => BTreeSet::from([*i]),
            AnswerSpec::Multi(v) => v.iter().copied().collect(),
        }
    }

    /// The index a single-pick question is graded against.
    #[must_use]
    pub fn primary(&self) -> Option<usize> {
        match self {
            AnswerSpec::Single(i) => Some(*i),
            AnswerSpec::Multi(v) => v.first().copied(),
        }
    }
}

/// Explicit kind tag carried in the `type` field of a question file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindTag {
    Single,
    Multi,
    Judge,
}

/// Persisted shape for a question.
///
/// This is the JSON object found in question files and in the review store.
/// It is converted into a validated `Question` before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: RawId,
    pub chapter: String,
    pub text: String,
    pub options: Vec<String>,
    pub answer: AnswerSpec,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<KindTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// How a question is answered and graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    /// Exactly one option is correct.
    Single,
    /// A set of options is correct; all and only those must be picked.
    Multi,
    /// Two options, one correct.
    TrueFalse,
}

impl QuestionKind {
    /// Derives the kind from the explicit tag and the question's shape.
    ///
    /// Multi wins over true/false: an answer set is always multi, whatever the tag.
    #[must_use]
    pub fn classify(tag: Option<KindTag>, answer: &AnswerSpec, option_count: usize) -> Self {
        if tag == Some(KindTag::Multi) || answer.is_set() {
            QuestionKind::Multi
        } else if tag == Some(KindTag::Judge) || option_count == 2 {
            QuestionKind::TrueFalse
        } else {
            QuestionKind::Single
        }
    }

    #[must_use]
    pub fn tag(self) -> KindTag {
        match self {
            QuestionKind::Single => KindTag::Single,
            QuestionKind::Multi => KindTag::Multi,
            QuestionKind::TrueFalse => KindTag::Judge,
        }
    }

    #[must_use]
    pub fn allows_multiple_picks(self) -> bool {
        matches!(self, QuestionKind::Multi)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated quiz question with its kind fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    id: QuestionId,
    chapter: String,
    text: String,
    options: Vec<String>,
    answer: AnswerSpec,
    kind: QuestionKind,
    note: Option<String>,
}

impl Question {
    /// Validate a record and classify its kind.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the id is blank, the chapter is one of the
    /// reserved selector labels, there are no options, an answer index is out
    /// of range, a multi answer is empty, or a true/false question does not
    /// have exactly two options.
    pub fn from_record(record: QuestionRecord) -> Result<Self, QuestionError> {
        let id = record.id.to_string();
        if id.trim().is_empty() {
            return Err(QuestionError::EmptyId);
        }
        if record.chapter == ALL_CHAPTERS || record.chapter == REVIEW_CHAPTER {
            return Err(QuestionError::ReservedChapter(record.chapter));
        }
        if record.options.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        let answer_indices = record.answer.indices();
        if answer_indices.is_empty() {
            return Err(QuestionError::EmptyAnswerSet);
        }
        if let Some(&index) = answer_indices.iter().find(|&&i| i >= record.options.len()) {
            return Err(QuestionError::AnswerOutOfRange {
                index,
                options: record.options.len(),
            });
        }

        let kind = QuestionKind::classify(record.kind, &record.answer, record.options.len());
        if kind == QuestionKind::TrueFalse && record.options.len() != 2 {
            return Err(QuestionError::TrueFalseOptionCount(record.options.len()));
        }

        Ok(Self {
            id: QuestionId::new(id),
            chapter: record.chapter,
            text: record.text,
            options: record.options,
            answer: record.answer,
            kind,
            note: record.note.filter(|n| !n.trim().is_empty()),
        })
    }

    /// Returns the same question with `prefix` prepended to its id.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: &str) -> Self {
        self.id = self.id.prefixed(prefix);
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> &AnswerSpec {
        &self.answer
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Indices highlighted as correct once the answer is revealed.
    #[must_use]
    pub fn correct_indices(&self) -> BTreeSet<usize> {
        self.answer.indices()
    }

    /// Grades a pick set against this question.
    ///
    /// Multi: the pick set must equal the answer set. Single and true/false:
    /// exactly one pick, equal to the answer index.
    #[must_use]
    pub fn is_correct(&self, picks: &BTreeSet<usize>) -> bool {
        match self.kind {
            QuestionKind::Multi => *picks == self.answer.indices(),
            QuestionKind::Single | QuestionKind::TrueFalse => {
                picks.len() == 1 && picks.first().copied() == self.answer.primary()
            }
        }
    }
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        Question::from_record(record)
    }
}

impl From<Question> for QuestionRecord {
    fn from(question: Question) -> Self {
        QuestionRecord {
            id: RawId::Text(question.id.as_str().to_owned()),
            chapter: question.chapter,
            text: question.text,
            options: question.options,
            answer: question.answer,
            kind: Some(question.kind.tag()),
            note: question.note,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn record(options: usize, answer: AnswerSpec, kind: Option<KindTag>) -> QuestionRecord {
        QuestionRecord {
            id: RawId::Number(1),
            chapter: "ch1".into(),
            text: "Q".into(),
            options: (0..options).map(|i| format!("opt {i}")).collect(),
            answer,
            kind,
            note: None,
        }
    }

    fn picks(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    #[test]
    fn classify_follows_tag_then_shape() {
        let set = AnswerSpec::Multi(vec![0, 1]);
        let one = AnswerSpec::Single(0);

        assert_eq!(QuestionKind::classify(None, &set, 4), QuestionKind::Multi);
        assert_eq!(QuestionKind::classify(Some(KindTag::Judge), &set, 2), QuestionKind::Multi);
        assert_eq!(QuestionKind::classify(Some(KindTag::Multi), &one, 4), QuestionKind::Multi);
        assert_eq!(QuestionKind::classify(None, &one, 2), QuestionKind::TrueFalse);
        assert_eq!(QuestionKind::classify(Some(KindTag::Judge), &one, 2), QuestionKind::TrueFalse);
        assert_eq!(QuestionKind::classify(None, &one, 4), QuestionKind::Single);
    }

    #[test]
    fn reserved_chapter_names_are_rejected() {
        for reserved in [ALL_CHAPTERS, REVIEW_CHAPTER] {
            let mut r = record(4, AnswerSpec::Single(0), None);
            r.chapter = reserved.into();
            assert_eq!(
                Question::from_record(r),
                Err(QuestionError::ReservedChapter(reserved.into()))
            );
        }

        let mut r = record(4, AnswerSpec::Single(0), None);
        r.chapter = "All".into();
        assert!(Question::from_record(r).is_ok());
    }

    #[test]
    fn multi_grading_requires_exact_set() {
        let q = Question::from_record(record(4, AnswerSpec::Multi(vec![0, 2]), None)).unwrap();

        assert!(q.is_correct(&picks(&[2, 0])));
        assert!(!q.is_correct(&picks(&[0])));
        assert!(!q.is_correct(&picks(&[0, 1, 2])));
    }

    #[test]
    fn single_grading_requires_exactly_one_pick() {
        let q = Question::from_record(record(4, AnswerSpec::Single(1), None)).unwrap();
        assert_eq!(q.kind(), QuestionKind::Single);

        assert!(q.is_correct(&picks(&[1])));
        assert!(!q.is_correct(&picks(&[0])));
        assert!(!q.is_correct(&picks(&[0, 1])));
        assert!(!q.is_correct(&picks(&[])));
    }

    #[test]
    fn true_false_grading_matches_single() {
        let q = Question::from_record(record(2, AnswerSpec::Single(1), None)).unwrap();
        assert_eq!(q.kind(), QuestionKind::TrueFalse);

        assert!(q.is_correct(&picks(&[1])));
        assert!(!q.is_correct(&picks(&[0])));
        assert!(!q.is_correct(&picks(&[0, 1])));
    }

    #[test]
    fn rejects_out_of_range_answer() {
        let err = Question::from_record(record(3, AnswerSpec::Multi(vec![0, 3]), None)).unwrap_err();
        assert_eq!(err, QuestionError::AnswerOutOfRange { index: 3, options: 3 });
    }

    #[test]
    fn rejects_judge_with_wrong_option_count() {
        let err =
            Question::from_record(record(3, AnswerSpec::Single(0), Some(KindTag::Judge))).unwrap_err();
        assert_eq!(err, QuestionError::TrueFalseOptionCount(3));
    }

    #[test]
    fn rejects_empty_options_and_answer_set() {
        let err = Question::from_record(record(0, AnswerSpec::Single(0), None)).unwrap_err();
        assert_eq!(err, QuestionError::NoOptions);

        let err = Question::from_record(record(3, AnswerSpec::Multi(vec![]), None)).unwrap_err();
        assert_eq!(err, QuestionError::EmptyAnswerSet);
    }

    #[test]
    fn parses_file_shape_with_numeric_id() {
        let json = r#"{"id": 12, "chapter": "Deposits", "text": "Pick two",
            "options": ["a", "b", "c"], "answer": [0, 2], "note": "see 3.1"}"#;
        let q: Question = serde_json::from_str(json).unwrap();

        assert_eq!(q.id().as_str(), "12");
        assert_eq!(q.kind(), QuestionKind::Multi);
        assert_eq!(q.note(), Some("see 3.1"));
        assert_eq!(q.with_id_prefix("m-").id().as_str(), "m-12");
    }

    #[test]
    fn kind_survives_persisting_with_explicit_tag() {
        let q = Question::from_record(record(4, AnswerSpec::Single(2), Some(KindTag::Multi))).unwrap();
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "multi");
        assert_eq!(json["id"], "1");

        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
        assert_eq!(back.kind(), QuestionKind::Multi);
    }
}
