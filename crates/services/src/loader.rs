//! Fetches question sources and builds the deduplicated question bank.

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::fallback::fallback_collection;
use quiz_core::model::{Question, QuestionCollection, QuestionRecord};

use crate::error::LoadError;

/// A place questions can be fetched from.
///
/// Implementations return the raw array elements; per-question decoding and
/// validation happen in the loader so one bad entry does not sink a source.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable name used in logs and load reports.
    fn label(&self) -> String;

    /// Fetch the raw JSON array of questions.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the source cannot be read or is not a JSON array.
    async fn fetch(&self) -> Result<Vec<Value>, LoadError>;
}

fn into_array(value: Value) -> Result<Vec<Value>, LoadError> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(LoadError::NotAnArray),
    }
}

/// Static JSON file served over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    #[must_use]
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    fn label(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<Value>, LoadError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus(status));
        }
        into_array(response.json::<Value>().await?)
    }
}

/// JSON file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<Value>, LoadError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        into_array(serde_json::from_str(&raw)?)
    }
}

/// Questions held in memory, e.g. embedded in the binary or built in tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    label: String,
    items: Vec<Value>,
}

impl StaticSource {
    #[must_use]
    pub fn new(label: impl Into<String>, items: Vec<Value>) -> Self {
        Self {
            label: label.into(),
            items,
        }
    }

    /// Parses a JSON array literal.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if `json` is not a JSON array.
    pub fn from_json(label: impl Into<String>, json: &str) -> Result<Self, LoadError> {
        Ok(Self::new(label, into_array(serde_json::from_str(json)?)?))
    }
}

#[async_trait]
impl QuestionSource for StaticSource {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn fetch(&self) -> Result<Vec<Value>, LoadError> {
        Ok(self.items.clone())
    }
}

/// A source paired with the prefix applied to every identifier it yields.
#[derive(Clone)]
pub struct SourceSpec {
    pub source: Arc<dyn QuestionSource>,
    pub prefix: String,
}

impl SourceSpec {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>, prefix: impl Into<String>) -> Self {
        Self {
            source,
            prefix: prefix.into(),
        }
    }

    /// HTTP(S) URLs become `HttpSource`s, anything else a `FileSource`.
    #[must_use]
    pub fn from_location(client: &reqwest::Client, location: &str, prefix: &str) -> Self {
        let source: Arc<dyn QuestionSource> =
            if location.starts_with("http://") || location.starts_with("https://") {
                Arc::new(HttpSource::new(client.clone(), location))
            } else {
                Arc::new(FileSource::new(location))
            };
        Self::new(source, prefix)
    }
}

impl std::fmt::Debug for SourceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceSpec")
            .field("source", &self.source.label())
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Outcome of one load pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub questions: QuestionCollection,
    /// Labels of sources that failed and contributed nothing.
    pub failed_sources: Vec<String>,
    /// Entries dropped because they could not be decoded or validated.
    pub rejected: usize,
    pub used_fallback: bool,
}

/// Loads every source once, in declared order, and builds the question bank.
#[derive(Debug, Clone)]
pub struct QuestionLoader {
    sources: Vec<SourceSpec>,
    fallback: QuestionCollection,
}

impl QuestionLoader {
    #[must_use]
    pub fn new(sources: Vec<SourceSpec>) -> Self {
        Self {
            sources,
            fallback: fallback_collection(),
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: QuestionCollection) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn sources(&self) -> &[SourceSpec] {
        &self.sources
    }

    /// Fetch all sources concurrently and join before building the bank.
    ///
    /// Never fails: broken sources contribute nothing and an empty result is
    /// replaced by the fallback collection.
    pub async fn load(&self) -> LoadReport {
        let fetches = self
            .sources
            .iter()
            .map(|spec| async move { (spec, spec.source.fetch().await) });
        let results = join_all(fetches).await;

        let mut questions = Vec::new();
        let mut failed_sources = Vec::new();
        let mut rejected = 0;

        for (spec, result) in results {
            let items = match result {
                Ok(items) => items,
                Err(err) => {
                    warn!("question source {} failed: {err}", spec.source.label());
                    failed_sources.push(spec.source.label());
                    continue;
                }
            };

            debug!("question source {} returned {} entries", spec.source.label(), items.len());
            for item in items {
                match decode(item) {
                    Ok(q) => questions.push(q.with_id_prefix(&spec.prefix)),
                    Err(err) => {
                        warn!("skipping entry from {}: {err}", spec.source.label());
                        rejected += 1;
                    }
                }
            }
        }

        let collection = QuestionCollection::from_questions(questions);
        if collection.is_empty() {
            warn!("no questions loaded from any source, using fallback bank");
            return LoadReport {
                questions: self.fallback.clone(),
                failed_sources,
                rejected,
                used_fallback: true,
            };
        }

        info!(
            "loaded {} questions across {} chapters",
            collection.len(),
            collection.chapters().len()
        );
        LoadReport {
            questions: collection,
            failed_sources,
            rejected,
            used_fallback: false,
        }
    }
}

fn decode(item: Value) -> Result<Question, LoadError> {
    let record: QuestionRecord = serde_json::from_value(item)?;
    Ok(Question::from_record(record)?)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
