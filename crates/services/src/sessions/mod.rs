mod cursor;
mod filter;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use cursor::SessionCursor;
pub use filter::{chapter_list, pool};
pub use service::{QuizSession, SessionProgress, SubmitOutcome};
pub use view::{ChapterEntry, OptionView, QuestionView, RevealView, option_index, option_letter};
pub use workflow::{SessionLoopService, SessionStart};
