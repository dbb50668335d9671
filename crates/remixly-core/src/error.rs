// ── Core error types ──
//
// User-facing errors from remixly-core. Consumers never match on HTTP
// details; the `From<remixly_api::Error>` impl folds transport-layer
// errors into network, auth, quota, premium and validation categories.

use thiserror::Error;

use crate::engine::NextAction;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Network ──────────────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Backend is still starting up after {attempts} attempts")]
    ServiceUnavailable { attempts: u32 },

    #[error("Request timed out")]
    Timeout,

    #[error("Backend error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Auth ─────────────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Login required: {message}")]
    LoginRequired { message: String },

    // ── Entitlement ──────────────────────────────────────────────────
    #[error("Premium required: {message}")]
    PremiumRequired { message: String },

    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    // ── Local ────────────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Cannot save local state to {path}: {reason}")]
    Persistence { path: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Follow-up the presentation layer should offer for this failure.
    pub fn next_action(&self) -> NextAction {
        match self {
            Self::PremiumRequired { .. } | Self::QuotaExceeded { .. } => NextAction::ChooseUpgrade,
            Self::LoginRequired { .. } | Self::AuthenticationFailed { .. } => NextAction::OpenLogin,
            _ => NextAction::None,
        }
    }

    /// Connection, timeout, cold-start and unclassified backend failures.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::ServiceUnavailable { .. }
                | Self::Timeout
                | Self::Api { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<remixly_api::Error> for CoreError {
    fn from(err: remixly_api::Error) -> Self {
        match err {
            remixly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            remixly_api::Error::LoginRequired { message } => CoreError::LoginRequired { message },
            remixly_api::Error::PremiumRequired { message } => {
                CoreError::PremiumRequired { message }
            }
            remixly_api::Error::QuotaExceeded { message } => CoreError::QuotaExceeded { message },
            remixly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            remixly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            remixly_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            remixly_api::Error::ServiceWaking { .. } => CoreError::ServiceUnavailable { attempts: 1 },
            remixly_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            remixly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
