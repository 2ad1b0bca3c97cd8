#![forbid(unsafe_code)]

pub mod access;
pub mod app_services;
pub mod error;
pub mod loader;
pub mod sessions;

pub use sessions as session;

pub use access::{AccessGate, Entry};
pub use app_services::QuizServices;
pub use error::{AccessGateError, AppServicesError, LoadError, SessionError};
pub use loader::{
    FileSource, HttpSource, LoadReport, QuestionLoader, QuestionSource, SourceSpec, StaticSource,
};
pub use sessions::{
    ChapterEntry, QuestionView, QuizSession, SessionLoopService, SessionStart, SubmitOutcome,
};
