//! Process-wide configuration passed explicitly to each component.
//!
//! A [`Config`] is loaded once at startup from an optional TOML file and
//! environment overrides, then handed to [`crate::RoutineServiceBuilder`].
//! Nothing in this crate reads credentials from global state.
//!
//! ```toml
//! database_path = "/var/lib/routine/routine.db"
//!
//! [generation]
//! api_key = "sk-..."
//! assistant_id = "asst_..."
//!
//! [mail]
//! api_key = "key-..."
//! domain = "mg.example.com"
//! sender = "Routine <coach@mg.example.com>"
//!
//! [poll]
//! interval_ms = 1000
//! timeout_secs = 120
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, RoutineError};

pub const DEFAULT_GENERATION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAIL_BASE_URL: &str = "https://api.mailgun.net/v3";

/// Environment variables that override file values.
pub const ENV_GENERATION_API_KEY: &str = "ROUTINE_OPENAI_API_KEY";
pub const ENV_ASSISTANT_ID: &str = "ROUTINE_ASSISTANT_ID";
pub const ENV_MAIL_API_KEY: &str = "ROUTINE_MAILGUN_API_KEY";
pub const ENV_MAIL_DOMAIN: &str = "ROUTINE_MAILGUN_DOMAIN";
pub const ENV_SENDER: &str = "ROUTINE_SENDER";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub mail: MailConfig,
    pub poll: PollPolicy,
    /// SQLite file for plan records; XDG data dir when absent
    pub database_path: Option<PathBuf>,
}

/// Credentials and endpoint for the remote generation service.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Fixed assistant configuration every job runs against
    pub assistant_id: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            assistant_id: None,
        }
    }
}

/// Credentials and identity for the mail service.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub domain: Option<String>,
    /// `From:` identity on every outgoing routine
    pub sender: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_MAIL_BASE_URL.to_string(),
            domain: None,
            sender: None,
        }
    }
}

/// Poll cadence and overall deadline for generation jobs.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollPolicy {
    pub interval_ms: u64,
    pub timeout_secs: u64,
}

/// Shortest wait between two status polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Longest deadline a generation job may be given.
pub const MAX_POLL_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

impl PollPolicy {
    /// Builds a policy from durations, clamping both into the accepted
    /// range. The timeout is rounded up to whole seconds.
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        let interval = interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_TIMEOUT);
        let timeout = timeout.min(MAX_POLL_TIMEOUT);
        Self {
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            timeout_secs: timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0),
        }
    }

    /// Rejects intervals below [`MIN_POLL_INTERVAL`] and timeouts above
    /// [`MAX_POLL_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns `RoutineError::Configuration` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.interval() < MIN_POLL_INTERVAL {
            return Err(RoutineError::configuration(format!(
                "poll.interval_ms must be at least {} (got {})",
                MIN_POLL_INTERVAL.as_millis(),
                self.interval_ms
            )));
        }
        if self.timeout_secs > MAX_POLL_TIMEOUT.as_secs() {
            return Err(RoutineError::configuration(format!(
                "poll.timeout_secs must be at most {} (got {})",
                MAX_POLL_TIMEOUT.as_secs(),
                self.timeout_secs
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            timeout_secs: 120,
        }
    }
}

/// Generation settings after required keys were checked.
#[derive(Debug, Clone)]
pub struct ResolvedGeneration {
    pub api_key: String,
    pub base_url: String,
    pub assistant_id: String,
}

/// Mail settings after required keys were checked.
#[derive(Debug, Clone)]
pub struct ResolvedMail {
    pub api_key: String,
    pub base_url: String,
    pub domain: String,
    pub sender: String,
}

impl Config {
    /// Loads configuration from `path`, or from the XDG config file when no
    /// path is given, then applies environment overrides.
    ///
    /// A missing XDG file is not an error; a missing explicit path is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parses a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RoutineError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| RoutineError::configuration(format!("Invalid config file: {e}")))?;
        config.poll.validate()?;
        Ok(config)
    }

    /// Overrides values with whatever `lookup` returns for the `ROUTINE_*`
    /// variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = lookup(ENV_GENERATION_API_KEY) {
            self.generation.api_key = Some(v);
        }
        if let Some(v) = lookup(ENV_ASSISTANT_ID) {
            self.generation.assistant_id = Some(v);
        }
        if let Some(v) = lookup(ENV_MAIL_API_KEY) {
            self.mail.api_key = Some(v);
        }
        if let Some(v) = lookup(ENV_MAIL_DOMAIN) {
            self.mail.domain = Some(v);
        }
        if let Some(v) = lookup(ENV_SENDER) {
            self.mail.sender = Some(v);
        }
    }

    /// Checks that everything needed to run a generation job is present.
    pub fn resolve_generation(&self) -> Result<ResolvedGeneration> {
        Ok(ResolvedGeneration {
            api_key: required(&self.generation.api_key, "generation.api_key", ENV_GENERATION_API_KEY)?,
            base_url: self.generation.base_url.trim_end_matches('/').to_string(),
            assistant_id: required(
                &self.generation.assistant_id,
                "generation.assistant_id",
                ENV_ASSISTANT_ID,
            )?,
        })
    }

    /// Checks that everything needed to send mail is present.
    pub fn resolve_mail(&self) -> Result<ResolvedMail> {
        Ok(ResolvedMail {
            api_key: required(&self.mail.api_key, "mail.api_key", ENV_MAIL_API_KEY)?,
            base_url: self.mail.base_url.trim_end_matches('/').to_string(),
            domain: required(&self.mail.domain, "mail.domain", ENV_MAIL_DOMAIN)?,
            sender: required(&self.mail.sender, "mail.sender", ENV_SENDER)?,
        })
    }

    fn default_config_path() -> Option<PathBuf> {
        xdg::BaseDirectories::with_prefix("routine").find_config_file("config.toml")
    }
}

fn required(value: &Option<String>, key: &str, env: &str) -> Result<String> {
    value
        .clone()
        .ok_or_else(|| RoutineError::configuration(format!("Missing '{key}' (or set {env})")))
}
