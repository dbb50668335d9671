//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use remixly_config::ConfigError;
use remixly_core::{BlockReason, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(dead_code, unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the backend at {url}")]
    #[diagnostic(
        code(remixly::connection_failed),
        help(
            "Check your network connection and the backend URL.\n\
             URL: {url}\n\
             Override it with --backend or `remixly config set profiles.<name>.backend <url>`"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("The backend did not wake up after {attempts} attempts")]
    #[diagnostic(
        code(remixly::service_unavailable),
        help("The service sleeps when idle and can take a minute to start. Try again shortly.")
    )]
    ServiceUnavailable { attempts: u32 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Login failed: {message}")]
    #[diagnostic(
        code(remixly::auth_failed),
        help(
            "Verify your username and password.\n\
             Store a password with: remixly config set-password --profile {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("{message}")]
    #[diagnostic(code(remixly::login_required), help("Log in with: remixly login"))]
    LoginRequired { message: String },

    #[error("The backend rejected the session: {message}")]
    #[diagnostic(
        code(remixly::session_rejected),
        help("Your login may have expired. Log in again with: remixly login")
    )]
    SessionRejected { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(remixly::no_credentials),
        help(
            "Pass --username, configure the profile with: remixly config init\n\
             Or set REMIXLY_USERNAME and REMIXLY_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Entitlement ──────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(remixly::blocked), help("{hint}"))]
    Blocked {
        reason: BlockReason,
        message: String,
        hint: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({status}): {message}")]
    #[diagnostic(code(remixly::api_error))]
    ApiError { status: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(remixly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(remixly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: remixly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(remixly::config))]
    Config(Box<figment::Error>),

    #[error("Could not save local state to {path}: {reason}")]
    #[diagnostic(
        code(remixly::persistence),
        help("Check that the data directory is writable.")
    )]
    Persistence { path: String, reason: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(remixly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out")]
    #[diagnostic(
        code(remixly::timeout),
        help("Long texts take a while to remix. Increase the limit with --timeout.")
    )]
    Timeout,

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(remixly::internal))]
    Internal(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ServiceUnavailable { .. } => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. }
            | Self::LoginRequired { .. }
            | Self::SessionRejected { .. }
            | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Blocked { .. } => exit_code::PERMISSION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
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
            CoreError::ServiceUnavailable { attempts } => CliError::ServiceUnavailable { attempts },
            CoreError::Timeout => CliError::Timeout,
            // `login` maps its own failures with the profile name attached.
            CoreError::AuthenticationFailed { message } => CliError::SessionRejected { message },
            CoreError::LoginRequired { message } => CliError::LoginRequired { message },
            CoreError::PremiumRequired { message } => CliError::Blocked {
                reason: BlockReason::PremiumRequired,
                message,
                hint: crate::commands::util::next_action_hint(
                    remixly_core::NextAction::ChooseUpgrade,
                    None,
                ),
            },
            CoreError::QuotaExceeded { message } => CliError::Blocked {
                reason: BlockReason::QuotaExceeded,
                message,
                hint: crate::commands::util::next_action_hint(
                    remixly_core::NextAction::ChooseUpgrade,
                    None,
                ),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api { message, status } => CliError::ApiError {
                status: status.map_or_else(|| "-".into(), |s| s.to_string()),
                message,
            },
            CoreError::Persistence { path, reason } => CliError::Persistence { path, reason },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::Internal(e.to_string()),
        }
    }
}
