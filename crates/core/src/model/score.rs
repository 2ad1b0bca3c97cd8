use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::chapter::ALL_CHAPTERS;

/// Correct / total attempts for one chapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCounter {
    pub correct: u32,
    pub total: u32,
}

impl ScoreCounter {
    fn record(&mut self, correct: bool) {
        if correct {
            self.correct = self.correct.saturating_add(1);
        }
        self.total = self.total.saturating_add(1);
    }
}

impl fmt::Display for ScoreCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.correct, self.total)
    }
}

/// Per-chapter and aggregate score counters.
///
/// Persisted as a JSON object mapping chapter name to `{correct, total}`; the
/// aggregate lives under the reserved `all` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreLedger {
    chapters: BTreeMap<String, ScoreCounter>,
}

impl ScoreLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one graded attempt against `chapter` and the aggregate together.
    pub fn record(&mut self, chapter: &str, correct: bool) {
        self.chapters
            .entry(ALL_CHAPTERS.to_owned())
            .or_default()
            .record(correct);
        if chapter != ALL_CHAPTERS {
            self.chapters
                .entry(chapter.to_owned())
                .or_default()
                .record(correct);
        }
    }

    /// Counter for `chapter`; chapters never attempted read as `0/0`.
    #[must_use]
    pub fn get(&self, chapter: &str) -> ScoreCounter {
        self.chapters.get(chapter).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn overall(&self) -> ScoreCounter {
        self.get(ALL_CHAPTERS)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ScoreCounter)> {
        self.chapters.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_updates_chapter_and_all_together() {
        let mut ledger = ScoreLedger::new();
        ledger.record("X", true);
        ledger.record("X", false);
        ledger.record("Y", true);

        assert_eq!(ledger.get("X"), ScoreCounter { correct: 1, total: 2 });
        assert_eq!(ledger.get("Y"), ScoreCounter { correct: 1, total: 1 });
        assert_eq!(ledger.overall(), ScoreCounter { correct: 2, total: 3 });

        let chapter_totals: u32 = ledger
            .iter()
            .filter(|(k, _)| *k != ALL_CHAPTERS)
            .map(|(_, c)| c.total)
            .sum();
        assert_eq!(chapter_totals, ledger.overall().total);
    }

    #[test]
    fn unknown_chapter_reads_zero() {
        let ledger = ScoreLedger::new();
        assert_eq!(ledger.get("missing").to_string(), "0/0");
    }

    #[test]
    fn persists_as_plain_object() {
        let mut ledger = ScoreLedger::new();
        ledger.record("Loans", true);
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["Loans"]["correct"], 1);
        assert_eq!(json["all"]["total"], 1);

        let back: ScoreLedger = serde_json::from_value(json).unwrap();
        assert_eq!(back, ledger);
    }
}
