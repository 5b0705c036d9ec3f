//! Logging initialisation via tracing-subscriber.
//!
//! Filter precedence, highest first:
//!
//! 1. `-v` flags on the command line, counted as steps above the configured level
//! 2. `RUST_LOG`
//! 3. `LOG_LEVEL` from the config
//!
//! Call [`init`] once at startup, after the config is loaded.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;
use crate::error::AppError;

/// Verbosity ladder, quietest first.
const LADDER: [LevelFilter; 5] = [
    LevelFilter::ERROR,
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
    LevelFilter::TRACE,
];

/// `tracing` has no level above `error`, so `CRITICAL` collapses onto it.
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
        }
    }
}

/// `configured` raised by `steps` rungs, capped at `TRACE`.
pub fn raise(configured: LogLevel, steps: u8) -> LevelFilter {
    let base = LevelFilter::from(configured);
    let start = LADDER.iter().position(|l| *l == base).unwrap_or(2);
    LADDER[(start + steps as usize).min(LADDER.len() - 1)]
}

/// Install the global subscriber on stderr. Returns the active filter
/// directives for the startup log line.
pub fn init(configured: LogLevel, cli_override: Option<LevelFilter>) -> Result<String, AppError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(configured, cli_override, rust_log.as_deref())?;
    let directives = filter.to_string();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(directives)
}

fn build_filter(
    configured: LogLevel,
    cli_override: Option<LevelFilter>,
    rust_log: Option<&str>,
) -> Result<EnvFilter, AppError> {
    if let Some(level) = cli_override {
        return Ok(EnvFilter::default().add_directive(level.into()));
    }
    match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| AppError::Logger(format!("invalid RUST_LOG '{directives}': {e}"))),
        None => Ok(EnvFilter::default().add_directive(LevelFilter::from(configured).into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_step_raises_one_level() {
        assert_eq!(raise(LogLevel::Info, 0), LevelFilter::INFO);
        assert_eq!(raise(LogLevel::Info, 1), LevelFilter::DEBUG);
        assert_eq!(raise(LogLevel::Info, 2), LevelFilter::TRACE);
        assert_eq!(raise(LogLevel::Warning, 1), LevelFilter::INFO);
        assert_eq!(raise(LogLevel::Critical, 1), LevelFilter::WARN);
    }

    #[test]
    fn raise_caps_at_trace() {
        assert_eq!(raise(LogLevel::Debug, 200), LevelFilter::TRACE);
    }

    #[test]
    fn single_v_is_never_quieter_than_config() {
        for lvl in [LogLevel::Debug, LogLevel::Info, LogLevel::Warning, LogLevel::Error] {
            assert!(raise(lvl, 1) > LevelFilter::from(lvl), "{lvl}");
        }
    }

    #[test]
    fn config_level_used_without_overrides() {
        let filter = build_filter(LogLevel::Warning, None, None).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn rust_log_beats_config() {
        let filter = build_filter(LogLevel::Info, None, Some("intramind=debug")).unwrap();
        assert_eq!(filter.to_string(), "intramind=debug");

        // blank RUST_LOG falls through to the config
        let filter = build_filter(LogLevel::Error, None, Some("  ")).unwrap();
        assert_eq!(filter.to_string(), "error");
    }

    #[test]
    fn cli_beats_rust_log() {
        let filter = build_filter(LogLevel::Info, Some(LevelFilter::TRACE), Some("warn")).unwrap();
        assert_eq!(filter.to_string(), "trace");
    }

    #[test]
    fn malformed_rust_log_errors() {
        let err = build_filter(LogLevel::Info, None, Some("intramind=loud")).unwrap_err();
        assert!(err.to_string().contains("RUST_LOG"));
    }

    #[test]
    fn init_succeeds_or_already_init() {
        // May already be set by a prior test in the same process.
        match init(LogLevel::Info, None) {
            Ok(_) => {}
            Err(AppError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
