mod access;
mod chapter;
mod collection;
mod ids;
mod question;
mod review;
mod score;

pub use access::{AccessError, AccessPolicy, ActivationCode};
pub use chapter::{ALL_CHAPTERS, ChapterSelector, REVIEW_CHAPTER};
pub use collection::QuestionCollection;
pub use ids::{ParseIdError, QuestionId};
pub use question::{AnswerSpec, KindTag, Question, QuestionError, QuestionKind, QuestionRecord, RawId};
pub use review::ReviewSet;
pub use score::{ScoreCounter, ScoreLedger};
