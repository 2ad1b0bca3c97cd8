use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved ledger key and label for the whole bank.
pub const ALL_CHAPTERS: &str = "all";

/// Reserved label for the wrong-answer pseudo-chapter.
pub const REVIEW_CHAPTER: &str = "review";

/// Which pool of questions the session is working through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ChapterSelector {
    #[default]
    All,
    Review,
    Named(String),
}

impl ChapterSelector {
    #[must_use]
    pub fn named(chapter: impl Into<String>) -> Self {
        ChapterSelector::Named(chapter.into())
    }

    /// Parses a label; the reserved labels map to `All` and `Review`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            ALL_CHAPTERS => ChapterSelector::All,
            REVIEW_CHAPTER => ChapterSelector::Review,
            other => ChapterSelector::Named(other.to_owned()),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            ChapterSelector::All => ALL_CHAPTERS,
            ChapterSelector::Review => REVIEW_CHAPTER,
            ChapterSelector::Named(name) => name,
        }
    }

    #[must_use]
    pub fn is_review(&self) -> bool {
        matches!(self, ChapterSelector::Review)
    }
}

impl fmt::Display for ChapterSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for ChapterSelector {
    fn from(value: String) -> Self {
        ChapterSelector::from_label(&value)
    }
}

impl From<ChapterSelector> for String {
    fn from(value: ChapterSelector) -> Self {
        value.label().to_owned()
    }
}
