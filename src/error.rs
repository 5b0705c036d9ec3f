//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("usage error: {0}")]
    Usage(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("APP_ENV must be one of development, staging, production".into());
        assert!(e.to_string().starts_with("config error"));
        assert!(e.to_string().contains("APP_ENV"));
    }

    #[test]
    fn session_error_display() {
        let e = AppError::Session("store lock poisoned".into());
        assert!(e.to_string().contains("store lock poisoned"));
    }

    #[test]
    fn logger_error_display() {
        let e = AppError::Logger("already initialized".into());
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn usage_error_display() {
        let e = AppError::Usage("unknown argument '--nope'".into());
        assert_eq!(e.to_string(), "usage error: unknown argument '--nope'");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
