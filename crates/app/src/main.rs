mod logging;
mod terminal;

use std::fmt;

use quiz_core::model::AccessPolicy;
use services::{QuizServices, SourceSpec};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSource { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSource { raw } => {
                write!(f, "invalid --source value: {raw} (expected <path-or-url>=<prefix>)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [--db <sqlite_url>] [--source-base <dir|url>]");
    eprintln!("       [--source <path|url>=<prefix>]... [--codes <a,b,...>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --source-base {DEFAULT_SOURCE_BASE}  (single.json=s-, multi.json=m-, judge.json=j-)");
    eprintln!("  --codes \"\"  (no activation required)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_SOURCE_BASE, QUIZ_ACTIVATION_CODES, QUIZ_LOG");
}

const DEFAULT_SOURCE_BASE: &str = "data";

/// Per-kind question files looked up under the source base, with their id prefixes.
const DEFAULT_SOURCES: [(&str, &str); 3] = [
    ("single.json", "s-"),
    ("multi.json", "m-"),
    ("judge.json", "j-"),
];

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_url: String,
    source_base: String,
    /// Explicit `(location, prefix)` pairs; replaces the defaults when non-empty.
    sources: Vec<(String, String)>,
    codes: Vec<String>,
}

impl Args {
    fn from_env() -> Self {
        Self {
            db_url: std::env::var("QUIZ_DB_URL")
                .ok()
                .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url),
            source_base: std::env::var("QUIZ_SOURCE_BASE")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SOURCE_BASE.into()),
            sources: Vec::new(),
            codes: std::env::var("QUIZ_ACTIVATION_CODES")
                .map(|value| split_codes(&value))
                .unwrap_or_default(),
        }
    }

    fn apply(mut self, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    self.db_url = normalize_sqlite_url(value);
                }
                "--source-base" => {
                    self.source_base = require_value(args, "--source-base")?;
                }
                "--source" => {
                    let value = require_value(args, "--source")?;
                    let (location, prefix) = value
                        .rsplit_once('=')
                        .filter(|(location, _)| !location.trim().is_empty())
                        .ok_or_else(|| ArgsError::InvalidSource { raw: value.clone() })?;
                    self.sources
                        .push((location.trim().to_owned(), prefix.trim().to_owned()));
                }
                "--codes" => {
                    self.codes = split_codes(&require_value(args, "--codes")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(self)
    }

    fn source_locations(&self) -> Vec<(String, String)> {
        if !self.sources.is_empty() {
            return self.sources.clone();
        }
        DEFAULT_SOURCES
            .iter()
            .map(|(file, prefix)| (join_location(&self.source_base, file), (*prefix).to_owned()))
            .collect()
    }
}

fn split_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_owned)
        .collect()
}

fn join_location(base: &str, file: &str) -> String {
    let base = base.trim();
    if base.ends_with('/') {
        format!("{base}{file}")
    } else {
        format!("{base}/{file}")
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::from_env().apply(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    logging::init(logging::level_from_env())?;

    // Open + migrate SQLite before the first prompt.
    prepare_sqlite_file(&parsed.db_url)?;

    let client = reqwest::Client::new();
    let sources = parsed
        .source_locations()
        .iter()
        .map(|(location, prefix)| SourceSpec::from_location(&client, location, prefix))
        .collect();
    let policy = AccessPolicy::allow_list(parsed.codes.iter().map(String::as_str));

    let services = QuizServices::new_sqlite(&parsed.db_url, sources, policy).await?;
    terminal::Terminal::new(services).run().await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
