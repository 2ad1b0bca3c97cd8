use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;
use crate::model::question::Question;

/// Wrong-answer collection: full question snapshots, unique by identifier.
///
/// Stored order is insertion order. Snapshots are independent of the loaded
/// bank, so entries survive even if a source later drops the question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Question>", into = "Vec<Question>")]
pub struct ReviewSet {
    entries: Vec<Question>,
}

impl ReviewSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from stored entries, dropping repeated identifiers.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = Question>) -> Self {
        let mut set = Self::new();
        for q in entries {
            set.add(q);
        }
        set
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.entries.iter().any(|q| q.id() == id)
    }

    /// Appends `question` unless its identifier is already present.
    ///
    /// Returns `true` if the set changed.
    pub fn add(&mut self, question: Question) -> bool {
        if self.contains(question.id()) {
            return false;
        }
        self.entries.push(question);
        true
    }

    /// Removes the entry with `id`, returning it if present.
    pub fn remove(&mut self, id: &QuestionId) -> Option<Question> {
        let pos = self.entries.iter().position(|q| q.id() == id)?;
        Some(self.entries.remove(pos))
    }

    #[must_use]
    pub fn entries(&self) -> &[Question] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<Question>> for ReviewSet {
    fn from(entries: Vec<Question>) -> Self {
        ReviewSet::from_entries(entries)
    }
}

impl From<ReviewSet> for Vec<Question> {
    fn from(set: ReviewSet) -> Self {
        set.entries
    }
}
