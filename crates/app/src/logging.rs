use log::LevelFilter;

/// Env var selecting the log level (`error`, `warn`, `info`, `debug`, `trace`, `off`).
pub const LOG_ENV: &str = "QUIZ_LOG";

/// Level from `QUIZ_LOG`, defaulting to `warn` when unset or unparsable.
pub fn level_from_env() -> LevelFilter {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(LevelFilter::Warn)
}

/// Install a stderr logger so log lines never interleave with the quiz on stdout.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                message
            ));
        })
        .level(level)
        .level_for("sqlx", level.min(LevelFilter::Warn))
        .chain(std::io::stderr())
        .apply()
}
