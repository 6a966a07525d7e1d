//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use dashfeed_config::ConfigError;
use dashfeed_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(dashfeed::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             URL: {url}\n\
             Try: dashfeed namespaces --api-base {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Namespaces ───────────────────────────────────────────────────
    #[error("Backend refused namespace '{namespace}'")]
    #[diagnostic(
        code(dashfeed::namespace_rejected),
        help("{reason}\nRun: dashfeed namespaces to see available namespaces")
    )]
    NamespaceRejected { namespace: String, reason: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(dashfeed::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dashfeed::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(dashfeed::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: dashfeed config init --url <URL> --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(dashfeed::no_config),
        help(
            "Create one with: dashfeed config init --url <URL>\n\
             Or pass --api-base / set DASHFEED_API_BASE.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Profile '{name}' already exists")]
    #[diagnostic(
        code(dashfeed::profile_exists),
        help("Use --force to replace it.")
    )]
    ProfileExists { name: String },

    #[error(transparent)]
    #[diagnostic(code(dashfeed::config))]
    Config(Box<ConfigError>),

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Synchronization stopped unexpectedly")]
    #[diagnostic(code(dashfeed::stopped))]
    Stopped,

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(dashfeed::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::NamespaceRejected { .. } | Self::ProfileExists { .. } => exit_code::REJECTED,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::NamespaceActivation { namespace, reason } => {
                CliError::NamespaceRejected { namespace, reason }
            }

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::ControllerStopped => CliError::Stopped,

            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}
