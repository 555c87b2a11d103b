//! Engine configuration, loaded from environment variables (§6,
//! §6.1).
//!
//! Following the reference crates' own `Config::from_env()` idiom:
//! `dotenvy::dotenv().ok()` first, then typed `std::env::var` parsing
//! with documented defaults, erroring out with a descriptive
//! [`ConfigError`] rather than panicking on a malformed value.

use std::env;

use chrono::Duration;

const DEFAULT_MAX_SESSIONS: usize = 4;
const DEFAULT_NUM_WORKERS: usize = 13;
const DEFAULT_COMPILE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_MEMORY_LIMIT_BYTES: u64 = 1 << 30;
const DEFAULT_SESSION_DURATION_SECS: i64 = 5 * 60 * 60;
const DEFAULT_JUDGE_DIR: &str = "/tmp/algojudge/judge";
const DEFAULT_WORK_DIR: &str = "/tmp/algojudge/work";

/// Engine-wide configuration, shared by every `Session` the demo
/// binary's registry starts.
#[derive(Debug, Clone)]
pub struct Config {
    /// §6 core: caps how many sessions `SessionRegistry` holds at once.
    pub max_sessions: usize,
    /// §6 core: per-`run_cases` worker-pool width (§5).
    pub num_workers: usize,
    /// §6 core: passed through opaquely to the `ProblemLoader`.
    pub lite_version: bool,
    /// §6.1: local-strategy staging root for judge artefacts.
    pub judge_dir: String,
    /// §6.1: local-strategy staging root for scratch work.
    pub work_dir: String,
    pub compile_timeout_secs: u64,
    pub generation_timeout_secs: u64,
    /// §6.1: global memory-limit ceiling every session clamps to.
    pub max_memory_limit_bytes: u64,
    /// §6.1: standard Docker CLI/SDK variable, read by the sandbox
    /// backend strategy.
    pub docker_host: Option<String>,
    /// Added: how long a session stays live before liveness guards
    /// reject every action but `private_eval` (§4.F "Liveness"). Not
    /// named in §6's core env var list since the original models
    /// session duration as a per-contest value passed by the caller;
    /// exposed here as an engine-wide default a deployment can tune.
    pub session_duration: Duration,
    /// Added, alongside `session_duration`: whether `public_eval`
    /// enforces the problem's submission interval (§4.F "Submission
    /// interval").
    pub use_same_time_scale: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            max_sessions: parse_env("MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?,
            num_workers: parse_env("NUM_WORKERS", DEFAULT_NUM_WORKERS)?,
            lite_version: parse_bool_env("LITE_VERSION", false)?,
            judge_dir: env::var("ENGINE_JUDGE_DIR").unwrap_or_else(|_| DEFAULT_JUDGE_DIR.to_string()),
            work_dir: env::var("ENGINE_WORK_DIR").unwrap_or_else(|_| DEFAULT_WORK_DIR.to_string()),
            compile_timeout_secs: parse_env("ENGINE_COMPILE_TIMEOUT_SECS", DEFAULT_COMPILE_TIMEOUT_SECS)?,
            generation_timeout_secs: parse_env(
                "ENGINE_GENERATION_TIMEOUT_SECS",
                DEFAULT_GENERATION_TIMEOUT_SECS,
            )?,
            max_memory_limit_bytes: parse_env(
                "ENGINE_MAX_MEMORY_LIMIT_BYTES",
                DEFAULT_MAX_MEMORY_LIMIT_BYTES,
            )?,
            docker_host: env::var("DOCKER_HOST").ok(),
            session_duration: Duration::seconds(parse_env(
                "ENGINE_SESSION_DURATION_SECS",
                DEFAULT_SESSION_DURATION_SECS,
            )?),
            use_same_time_scale: parse_bool_env("ENGINE_USE_SAME_TIME_SCALE", false)?,
        })
    }

    pub fn backend_config(&self) -> sisyphus::Config {
        sisyphus::Config {
            judge_dir: self.judge_dir.clone(),
            work_dir: self.work_dir.clone(),
            compile_timeout_secs: self.compile_timeout_secs,
            generation_timeout_secs: self.generation_timeout_secs,
            container_images: Default::default(),
            max_memory_bytes: self.max_memory_limit_bytes,
            docker_api_version: None,
            docker_host: self.docker_host.clone(),
        }
    }

    pub fn session_config(&self) -> horus::SessionConfig {
        horus::SessionConfig {
            session_duration: self.session_duration,
            use_same_time_scale: self.use_same_time_scale,
            num_workers: self.num_workers,
            max_memory_limit_bytes: self.max_memory_limit_bytes,
            compile_timeout_secs: self.compile_timeout_secs,
            generation_timeout_secs: self.generation_timeout_secs,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(default),
    }
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.as_str() {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(ConfigError::InvalidValue(key.to_string())),
        },
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors (§6 "Any value outside expected types
/// is a hard startup error").
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_falls_back_to_default_when_unset() {
        env::remove_var("ALGOJUDGE_TEST_UNSET_KEY");
        assert_eq!(parse_env::<usize>("ALGOJUDGE_TEST_UNSET_KEY", 7).unwrap(), 7);
    }

    #[test]
    fn parse_bool_env_rejects_non_01_values() {
        env::set_var("ALGOJUDGE_TEST_BOOL_KEY", "yes");
        assert!(parse_bool_env("ALGOJUDGE_TEST_BOOL_KEY", false).is_err());
        env::remove_var("ALGOJUDGE_TEST_BOOL_KEY");
    }
}
