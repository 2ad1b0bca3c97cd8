use std::collections::BTreeSet;

use quiz_core::model::ChapterSelector;

/// Ephemeral position of the user within the active pool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionCursor {
    chapter: ChapterSelector,
    index: usize,
    picks: BTreeSet<usize>,
    /// `Some(correct)` once the active question has been submitted.
    outcome: Option<bool>,
}

impl SessionCursor {
    #[must_use]
    pub fn new(chapter: ChapterSelector) -> Self {
        Self {
            chapter,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn chapter(&self) -> &ChapterSelector {
        &self.chapter
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn picks(&self) -> &BTreeSet<usize> {
        &self.picks
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.outcome.is_some()
    }

    /// Correctness of the revealed answer, `None` while unanswered.
    #[must_use]
    pub fn outcome(&self) -> Option<bool> {
        self.outcome
    }

    pub(crate) fn switch_chapter(&mut self, chapter: ChapterSelector) {
        self.chapter = chapter;
        self.move_to(0);
    }

    /// Starts a fresh question instance at `index`.
    pub(crate) fn move_to(&mut self, index: usize) {
        self.index = index;
        self.picks.clear();
        self.outcome = None;
    }

    pub(crate) fn toggle(&mut self, option: usize, multi: bool) {
        if !multi {
            self.picks.clear();
            self.picks.insert(option);
        } else if !self.picks.remove(&option) {
            self.picks.insert(option);
        }
    }

    pub(crate) fn reveal(&mut self, correct: bool) {
        self.outcome = Some(correct);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_toggle_flips_membership() {
        let mut cursor = SessionCursor::default();
        cursor.toggle(0, true);
        cursor.toggle(2, true);
        cursor.toggle(0, true);
        assert_eq!(cursor.picks().iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn single_toggle_replaces_picks() {
        let mut cursor = SessionCursor::default();
        cursor.toggle(0, false);
        cursor.toggle(3, false);
        cursor.toggle(3, false);
        assert_eq!(cursor.picks().iter().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn switching_chapter_resets_instance() {
        let mut cursor = SessionCursor::default();
        cursor.move_to(4);
        cursor.toggle(1, false);
        cursor.reveal(true);

        cursor.switch_chapter(ChapterSelector::named("Loans"));
        assert_eq!(cursor.index(), 0);
        assert!(cursor.picks().is_empty());
        assert!(!cursor.is_revealed());
        assert_eq!(cursor.chapter(), &ChapterSelector::named("Loans"));
    }
}
