//! Shared configuration for the dashfeed CLI.
//!
//! TOML profiles, environment overrides, and translation to
//! `dashfeed_core::ControllerConfig`. The CLI adds `GlobalOpts`-aware
//! wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dashfeed_core::{ControllerConfig, DEFAULT_NAMESPACE, DEFAULT_TITLE, TlsVerification};

/// Prefix for environment overrides, e.g. `DASHFEED_DEFAULTS__TIMEOUT=5`.
pub const ENV_PREFIX: &str = "DASHFEED_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, falling back to the default profile.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|p| (name.to_owned(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "http://127.0.0.1:7777").
    pub api_base: String,

    /// Path opened by `watch` when none is given.
    #[serde(default = "default_start_path")]
    pub start_path: String,

    /// Namespace to activate before watching.
    pub namespace: Option<String>,

    /// Page title shown by the view.
    pub title: Option<String>,

    /// Seconds the backend waits between content polls.
    pub poll_wait_secs: Option<u64>,

    /// First feed reconnect delay, in milliseconds.
    pub reconnect_initial_ms: Option<u64>,

    /// Longest feed reconnect delay, in seconds.
    pub reconnect_max_secs: Option<u64>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            start_path: default_start_path(),
            namespace: None,
            title: None,
            poll_wait_secs: None,
            reconnect_initial_ms: None,
            reconnect_max_secs: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }

    /// Namespace to watch when nothing overrides it.
    pub fn namespace_or_default(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }
}

fn default_start_path() -> String {
    "/".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "dashfeed", "dashfeed").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("dashfeed");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment. A missing file is fine.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ControllerConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_controller_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let api_base: url::Url = profile
        .api_base
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "api_base".into(),
            reason: format!("invalid URL: {}", profile.api_base),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = ControllerConfig::new(api_base);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.title = profile
        .title
        .clone()
        .unwrap_or_else(|| DEFAULT_TITLE.into());
    if let Some(secs) = profile.poll_wait_secs {
        config.poll_wait = Duration::from_secs(secs.max(1));
    }
    if let Some(ms) = profile.reconnect_initial_ms {
        config.reconnect_initial = Duration::from_millis(ms);
    }
    if let Some(secs) = profile.reconnect_max_secs {
        config.reconnect_max = Duration::from_secs(secs);
    }

    if config.reconnect_initial.is_zero() {
        return Err(ConfigError::Validation {
            field: "reconnect_initial_ms".into(),
            reason: "must be greater than zero".into(),
        });
    }

    Ok(config)
}
