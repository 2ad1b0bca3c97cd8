use std::collections::HashSet;

use crate::model::ids::QuestionId;
use crate::model::question::Question;

/// Ordered question bank, unique by identifier.
///
/// Built once per load. The first occurrence of an identifier wins and keeps
/// its position; later duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionCollection {
    questions: Vec<Question>,
}

impl QuestionCollection {
    /// Builds a collection from questions in load order, dropping later duplicates.
    #[must_use]
    pub fn from_questions(questions: impl IntoIterator<Item = Question>) -> Self {
        let mut seen = HashSet::new();
        let questions = questions
            .into_iter()
            .filter(|q| seen.insert(q.id().clone()))
            .collect();
        Self { questions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    /// Distinct chapter names in first-occurrence order.
    #[must_use]
    pub fn chapters(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .map(Question::chapter)
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Questions belonging to `chapter`, in load order.
    pub fn in_chapter<'a>(&'a self, chapter: &'a str) -> impl Iterator<Item = &'a Question> + 'a {
        self.questions.iter().filter(move |q| q.chapter() == chapter)
    }
}

impl<'a> IntoIterator for &'a QuestionCollection {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}
