//! Configuration loading with env-var overrides.
//!
//! Settings are layered: built-in defaults, then the optional TOML file
//! (`config/default.toml` unless a path is given), then environment
//! variables. Environment keys are matched case-insensitively. Secrets are
//! only ever read from the environment.

use std::{
    collections::HashMap,
    env, fmt, fs,
    path::Path,
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;

use crate::error::AppError;

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Staging,
    Production,
}

impl AppEnv {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnv::Development => "development",
            AppEnv::Staging => "staging",
            AppEnv::Production => "production",
        }
    }
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(AppEnv::Development),
            "staging" => Ok(AppEnv::Staging),
            "production" => Ok(AppEnv::Production),
            other => Err(format!(
                "app_env must be one of [development, staging, production], got '{other}'"
            )),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured log level. Parsed case-insensitively, stored upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(format!(
                "log_level must be one of [DEBUG, INFO, WARNING, ERROR, CRITICAL], got '{s}'"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully-resolved application configuration.
#[derive(Clone)]
pub struct Config {
    pub app_name: String,
    pub app_env: AppEnv,
    pub debug: bool,
    pub log_level: LogLevel,

    pub host: String,
    pub port: u16,
    pub workers: u32,

    pub database_url: String,
    pub database_pool_size: u32,

    pub redis_url: String,
    /// Cache entry lifetime in seconds.
    pub cache_ttl: u64,

    pub ai_provider: String,
    /// From `OPENAI_API_KEY`. Never sourced from TOML.
    pub openai_api_key: Option<String>,
    pub model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,

    pub secret_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub api_key: Option<String>,

    pub rate_limit_per_minute: u32,
    pub rate_limit_per_hour: u32,

    /// Sessions idle for longer than this are swept.
    pub session_max_age_hours: u64,
    /// How often the background sweeper runs.
    pub session_sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "IntraMind".into(),
            app_env: AppEnv::Development,
            debug: false,
            log_level: LogLevel::Info,
            host: "0.0.0.0".into(),
            port: 8000,
            workers: 4,
            database_url: "postgresql://localhost:5432/intramind".into(),
            database_pool_size: 20,
            redis_url: "redis://localhost:6379/0".into(),
            cache_ttl: 3600,
            ai_provider: "openai".into(),
            openai_api_key: None,
            model_name: "gpt-4".into(),
            temperature: 0.7,
            max_tokens: 2000,
            secret_key: None,
            jwt_secret: None,
            api_key: None,
            rate_limit_per_minute: 60,
            rate_limit_per_hour: 1000,
            session_max_age_hours: 24,
            session_sweep_interval_secs: 300,
        }
    }
}

impl Config {
    /// `host:port` the server would bind to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Idle age after which a session is swept. Values too large for a
    /// `chrono::Duration` saturate at `Duration::MAX`.
    pub fn session_max_age(&self) -> chrono::Duration {
        max_age_from_hours(self.session_max_age_hours).unwrap_or(chrono::Duration::MAX)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_secs.max(1))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(v: &Option<String>) -> &'static str {
            if v.is_some() { "<redacted>" } else { "<unset>" }
        }
        f.debug_struct("Config")
            .field("app_name", &self.app_name)
            .field("app_env", &self.app_env)
            .field("debug", &self.debug)
            .field("log_level", &self.log_level)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("workers", &self.workers)
            .field("database_url", &self.database_url)
            .field("database_pool_size", &self.database_pool_size)
            .field("redis_url", &self.redis_url)
            .field("cache_ttl", &self.cache_ttl)
            .field("ai_provider", &self.ai_provider)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("model_name", &self.model_name)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("secret_key", &redact(&self.secret_key))
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("api_key", &redact(&self.api_key))
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("rate_limit_per_hour", &self.rate_limit_per_hour)
            .field("session_max_age_hours", &self.session_max_age_hours)
            .field("session_sweep_interval_secs", &self.session_sweep_interval_secs)
            .finish()
    }
}

// ── raw TOML shape ────────────────────────────────────────────────────────────

/// `serde` target for the TOML file. Every field is optional so the file
/// only needs to name what it changes.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    app: RawApp,
    server: RawServer,
    database: RawDatabase,
    redis: RawRedis,
    ai: RawAi,
    rate_limit: RawRateLimit,
    session: RawSession,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawApp {
    name: Option<String>,
    env: Option<String>,
    debug: Option<bool>,
    log_level: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    workers: Option<u32>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawDatabase {
    url: Option<String>,
    pool_size: Option<u32>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawRedis {
    url: Option<String>,
    cache_ttl: Option<u64>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawAi {
    provider: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawRateLimit {
    per_minute: Option<u32>,
    per_hour: Option<u32>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawSession {
    max_age_hours: Option<u64>,
    sweep_interval_secs: Option<u64>,
}

// ── loading ───────────────────────────────────────────────────────────────────

/// Load config from the given path (or `config/default.toml` when present),
/// then apply overrides from the process environment.
///
/// An explicit path must exist; the default path is optional.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let env_vars: HashMap<String, String> = env::vars().collect();
    match config_path {
        Some(p) => load_from(Some(Path::new(p)), &env_vars),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            load_from(default.exists().then_some(default), &env_vars)
        }
    }
}

/// Loader with an explicit file and environment map.
/// Tests pass the map directly instead of mutating env vars.
pub fn load_from(path: Option<&Path>, env_vars: &HashMap<String, String>) -> Result<Config, AppError> {
    let raw = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
            toml::from_str::<RawConfig>(&text)
                .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?
        }
        None => RawConfig::default(),
    };

    let mut cfg = Config::default();
    apply_file(&mut cfg, raw)?;
    apply_env(&mut cfg, &upper_case_keys(env_vars))?;
    validate(&cfg)?;

    Ok(cfg)
}

/// `hours` as a `chrono::Duration`, or `None` when it does not fit.
pub fn max_age_from_hours(hours: u64) -> Option<chrono::Duration> {
    i64::try_from(hours).ok().and_then(chrono::Duration::try_hours)
}

/// Fold env keys to upper case. When several spellings of one key are set,
/// the lowest in byte order wins, so `PORT` beats `Port` beats `port`.
fn upper_case_keys(env_vars: &HashMap<String, String>) -> HashMap<String, &str> {
    let mut pairs: Vec<_> = env_vars.iter().collect();
    pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut upper = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        upper.entry(key.to_ascii_uppercase()).or_insert(value.as_str());
    }
    upper
}

fn validate(cfg: &Config) -> Result<(), AppError> {
    if max_age_from_hours(cfg.session_max_age_hours).is_none() {
        return Err(AppError::Config(format!(
            "SESSION_MAX_AGE_HOURS '{}' is out of range",
            cfg.session_max_age_hours
        )));
    }
    Ok(())
}

fn apply_file(cfg: &mut Config, raw: RawConfig) -> Result<(), AppError> {
    let RawConfig { app, server, database, redis, ai, rate_limit, session } = raw;

    if let Some(v) = app.name { cfg.app_name = v; }
    if let Some(v) = app.env {
        cfg.app_env = v.parse().map_err(AppError::Config)?;
    }
    if let Some(v) = app.debug { cfg.debug = v; }
    if let Some(v) = app.log_level {
        cfg.log_level = v.parse().map_err(AppError::Config)?;
    }

    if let Some(v) = server.host { cfg.host = v; }
    if let Some(v) = server.port { cfg.port = v; }
    if let Some(v) = server.workers { cfg.workers = v; }

    if let Some(v) = database.url { cfg.database_url = v; }
    if let Some(v) = database.pool_size { cfg.database_pool_size = v; }

    if let Some(v) = redis.url { cfg.redis_url = v; }
    if let Some(v) = redis.cache_ttl { cfg.cache_ttl = v; }

    if let Some(v) = ai.provider { cfg.ai_provider = v; }
    if let Some(v) = ai.model { cfg.model_name = v; }
    if let Some(v) = ai.temperature { cfg.temperature = v; }
    if let Some(v) = ai.max_tokens { cfg.max_tokens = v; }

    if let Some(v) = rate_limit.per_minute { cfg.rate_limit_per_minute = v; }
    if let Some(v) = rate_limit.per_hour { cfg.rate_limit_per_hour = v; }

    if let Some(v) = session.max_age_hours { cfg.session_max_age_hours = v; }
    if let Some(v) = session.sweep_interval_secs { cfg.session_sweep_interval_secs = v; }

    Ok(())
}

fn apply_env(cfg: &mut Config, env: &HashMap<String, &str>) -> Result<(), AppError> {
    override_value(&mut cfg.app_name, env, "APP_NAME")?;
    override_value(&mut cfg.app_env, env, "APP_ENV")?;
    override_bool(&mut cfg.debug, env, "DEBUG")?;
    override_value(&mut cfg.log_level, env, "LOG_LEVEL")?;

    override_value(&mut cfg.host, env, "HOST")?;
    override_value(&mut cfg.port, env, "PORT")?;
    override_value(&mut cfg.workers, env, "WORKERS")?;

    override_value(&mut cfg.database_url, env, "DATABASE_URL")?;
    override_value(&mut cfg.database_pool_size, env, "DATABASE_POOL_SIZE")?;

    override_value(&mut cfg.redis_url, env, "REDIS_URL")?;
    override_value(&mut cfg.cache_ttl, env, "CACHE_TTL")?;

    override_value(&mut cfg.ai_provider, env, "AI_PROVIDER")?;
    override_secret(&mut cfg.openai_api_key, env, "OPENAI_API_KEY");
    override_value(&mut cfg.model_name, env, "OPENAI_MODEL")?;
    override_value(&mut cfg.temperature, env, "OPENAI_TEMPERATURE")?;
    override_value(&mut cfg.max_tokens, env, "OPENAI_MAX_TOKENS")?;

    override_secret(&mut cfg.secret_key, env, "SECRET_KEY");
    override_secret(&mut cfg.jwt_secret, env, "JWT_SECRET");
    override_secret(&mut cfg.api_key, env, "API_KEY");

    override_value(&mut cfg.rate_limit_per_minute, env, "RATE_LIMIT_PER_MINUTE")?;
    override_value(&mut cfg.rate_limit_per_hour, env, "RATE_LIMIT_PER_HOUR")?;

    override_value(&mut cfg.session_max_age_hours, env, "SESSION_MAX_AGE_HOURS")?;
    override_value(&mut cfg.session_sweep_interval_secs, env, "SESSION_SWEEP_INTERVAL_SECS")?;

    Ok(())
}

fn override_value<T>(slot: &mut T, env: &HashMap<String, &str>, key: &str) -> Result<(), AppError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if let Some(raw) = env.get(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("invalid {key} '{raw}': {e}")))?;
    }
    Ok(())
}

fn override_bool(slot: &mut bool, env: &HashMap<String, &str>, key: &str) -> Result<(), AppError> {
    if let Some(raw) = env.get(key) {
        *slot = parse_bool(raw)
            .ok_or_else(|| AppError::Config(format!("invalid {key} '{raw}': expected a boolean")))?;
    }
    Ok(())
}

/// Empty values leave the secret unset.
fn override_secret(slot: &mut Option<String>, env: &HashMap<String, &str>, key: &str) {
    if let Some(raw) = env.get(key) {
        let raw = raw.trim();
        *slot = (!raw.is_empty()).then(|| raw.to_string());
    }
}

/// Accepts `1/0`, `true/false`, `yes/no`, `on/off` in any case.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
