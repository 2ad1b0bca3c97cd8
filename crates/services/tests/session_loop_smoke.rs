use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use quiz_core::model::{AccessPolicy, ChapterSelector, ScoreCounter};
use services::{
    QuestionLoader, QuizServices, SessionError, SessionLoopService, SourceSpec, StaticSource,
};
use storage::repository::{InMemoryRepository, KeyValueStore, Storage, StorageError};
use storage::state::{REVIEW_SET_KEY, SCORE_KEY};

const SINGLE: &str = r#"[
    {"id": 1, "chapter": "Deposits", "text": "Minimum deposit?", "options": ["1", "5", "10", "50"], "answer": 1},
    {"id": 2, "chapter": "Loans", "text": "Max term?", "options": ["1y", "5y", "10y"], "answer": 2}
]"#;

const MULTI: &str = r#"[
    {"id": 1, "chapter": "Loans", "text": "Required documents?", "options": ["ID", "Payslip", "Photo"], "answer": [0, 1]}
]"#;

const JUDGE: &str = r#"[
    {"id": 1, "chapter": "Deposits", "text": "Deposits are insured.", "options": ["True", "False"], "answer": 0, "type": "judge"}
]"#;

fn loader() -> QuestionLoader {
    let source = |label: &str, json: &str, prefix: &str| {
        SourceSpec::new(Arc::new(StaticSource::from_json(label, json).unwrap()), prefix)
    };
    QuestionLoader::new(vec![
        source("single", SINGLE, "s-"),
        source("multi", MULTI, "m-"),
        source("judge", JUDGE, "j-"),
    ])
}

#[tokio::test]
async fn session_loop_persists_ledger_and_review_set() {
    let storage = Storage::in_memory();
    let loop_svc = SessionLoopService::new(Arc::new(loader()), storage.persisted_state());

    let start = loop_svc.start_session(None).await.unwrap();
    assert!(!start.report.used_fallback);
    let mut session = start.session;

    let ids: Vec<_> = session.pool().iter().map(|q| q.id().to_string()).collect();
    assert_eq!(ids, vec!["s-1", "s-2", "m-1", "j-1"]);
    assert_eq!(
        session.chapters(),
        vec![
            ChapterSelector::All,
            ChapterSelector::named("Deposits"),
            ChapterSelector::named("Loans"),
        ]
    );

    // Miss the first question.
    session.toggle_pick(0);
    let outcome = loop_svc.submit(&mut session).await.unwrap().unwrap();
    assert!(!outcome.correct);
    assert!(outcome.added_to_review);
    assert!(loop_svc.submit(&mut session).await.unwrap().is_none());

    // Get the multi-answer question right.
    session.select_chapter(ChapterSelector::named("Loans")).unwrap();
    session.next();
    session.toggle_pick(1);
    session.toggle_pick(0);
    assert!(loop_svc.submit(&mut session).await.unwrap().unwrap().correct);

    // A fresh session sees the persisted state.
    let mut session = loop_svc.start_session(None).await.unwrap().session;
    assert_eq!(session.ledger().overall(), ScoreCounter { correct: 1, total: 2 });
    assert_eq!(session.ledger().get("Deposits"), ScoreCounter { correct: 0, total: 1 });
    assert_eq!(session.chapters().last(), Some(&ChapterSelector::Review));

    // Fix it from the review pool and remove it.
    session.select_chapter(ChapterSelector::Review).unwrap();
    session.toggle_pick(1);
    assert!(loop_svc.submit(&mut session).await.unwrap().unwrap().correct);
    let removed = loop_svc.remove_from_review(&mut session).await.unwrap();
    assert_eq!(removed.id().as_str(), "s-1");
    assert_eq!(session.chapter(), &ChapterSelector::All);

    let session = loop_svc.start_session(None).await.unwrap().session;
    assert!(session.review_set().is_empty());
    assert_eq!(session.ledger().overall(), ScoreCounter { correct: 2, total: 3 });
}

#[tokio::test]
async fn corrupt_persisted_state_starts_empty() {
    let storage = Storage::in_memory();
    storage.state.put(SCORE_KEY, "[[[").await.unwrap();
    storage.state.put(REVIEW_SET_KEY, "{}").await.unwrap();

    let loop_svc = SessionLoopService::new(Arc::new(loader()), storage.persisted_state());
    let session = loop_svc.start_session(None).await.unwrap().session;

    assert!(session.ledger().is_empty());
    assert!(session.review_set().is_empty());
}

#[tokio::test]
async fn gated_services_scope_state_by_code() {
    let storage = Storage::in_memory();
    let services = QuizServices::from_storage(
        &storage,
        loader(),
        AccessPolicy::allow_list(["ALPHA", "BETA"]),
    );

    assert!(services.enter().await.unwrap().is_none());
    assert!(services.access().activate("nope").await.is_err());

    services.access().activate("ALPHA").await.unwrap();
    let mut session = services.enter().await.unwrap().unwrap().session;
    session.toggle_pick(0);
    services.session_loop().submit(&mut session).await.unwrap();

    assert!(storage.state.get("quiz-score-ALPHA").await.unwrap().is_some());
    assert!(storage.state.get("quiz-wrong-store-ALPHA").await.unwrap().is_some());

    services.access().activate("BETA").await.unwrap();
    let session = services.enter().await.unwrap().unwrap().session;
    assert!(session.ledger().is_empty());
    assert!(session.review_set().is_empty());
}

#[tokio::test]
async fn all_sources_failing_uses_fallback() {
    let storage = Storage::in_memory();
    let loader = QuestionLoader::new(vec![SourceSpec::new(
        Arc::new(services::FileSource::new("/definitely/missing.json")),
        "s-",
    )]);
    let loop_svc = SessionLoopService::new(Arc::new(loader), storage.persisted_state());

    let start = loop_svc.start_session(None).await.unwrap();
    assert!(start.report.used_fallback);
    assert_eq!(start.session.pool_len(), 1);
    assert!(start.session.current_question().is_some());
}

/// Key-value store whose next write of the score ledger fails once.
struct FailingLedgerWrite {
    inner: InMemoryRepository,
    fail_next: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FailingLedgerWrite {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == SCORE_KEY && self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Connection("disk full".into()));
        }
        self.inner.put(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}

#[tokio::test]
async fn failed_ledger_write_does_not_lose_review_entry() {
    let storage = Storage {
        state: Arc::new(FailingLedgerWrite {
            inner: InMemoryRepository::new(),
            fail_next: AtomicBool::new(true),
        }),
    };
    let loop_svc = SessionLoopService::new(Arc::new(loader()), storage.persisted_state());
    let mut session = loop_svc.start_session(None).await.unwrap().session;

    // Miss s-1 while the ledger write fails.
    session.toggle_pick(0);
    let err = loop_svc.submit(&mut session).await.unwrap_err();
    assert!(matches!(err, SessionError::Storage(_)));
    assert_eq!(session.review_set().len(), 1);

    // Answer s-2 correctly; nothing new is added to review.
    session.next();
    session.toggle_pick(2);
    let outcome = loop_svc.submit(&mut session).await.unwrap().unwrap();
    assert!(outcome.correct);
    assert!(!outcome.added_to_review);

    let session = loop_svc.start_session(None).await.unwrap().session;
    let ids: Vec<_> = session.review_set().entries().iter().map(|q| q.id().to_string()).collect();
    assert_eq!(ids, vec!["s-1"]);
    assert_eq!(session.ledger().overall(), ScoreCounter { correct: 1, total: 2 });
}

#[tokio::test]
async fn removing_one_review_entry_persists_the_rest_in_order() {
    let storage = Storage::in_memory();
    let loop_svc = SessionLoopService::new(Arc::new(loader()), storage.persisted_state());
    let mut session = loop_svc.start_session(None).await.unwrap().session;

    // Miss s-1, s-2 and m-1 in that order.
    for pick in [0, 0, 2] {
        session.toggle_pick(pick);
        assert!(loop_svc.submit(&mut session).await.unwrap().unwrap().added_to_review);
        session.next();
    }

    let mut session = loop_svc.start_session(None).await.unwrap().session;
    session.select_chapter(ChapterSelector::Review).unwrap();
    session.next();
    assert_eq!(session.current_question().unwrap().id().as_str(), "s-2");

    session.toggle_pick(2);
    assert!(loop_svc.submit(&mut session).await.unwrap().unwrap().correct);
    let removed = loop_svc.remove_from_review(&mut session).await.unwrap();
    assert_eq!(removed.id().as_str(), "s-2");
    assert_eq!(session.chapter(), &ChapterSelector::Review);
    assert_eq!(session.current_question().unwrap().id().as_str(), "m-1");

    let session = loop_svc.start_session(None).await.unwrap().session;
    let ids: Vec<_> = session.review_set().entries().iter().map(|q| q.id().to_string()).collect();
    assert_eq!(ids, vec!["s-1", "m-1"]);
}
