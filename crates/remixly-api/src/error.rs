use thiserror::Error;

/// Top-level error type for the `remixly-api` crate.
///
/// Covers transport failures, authentication, the explicit entitlement
/// signals the backend sends on a rejected remix, and payload decoding.
/// `remixly-core` maps these into user-facing categories.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the session cookie is no longer valid.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The backend requires a logged-in account for this call.
    #[error("Login required: {message}")]
    LoginRequired { message: String },

    // ── Entitlement signals ─────────────────────────────────────────
    /// The requested feature needs a premium subscription.
    #[error("Premium required: {message}")]
    PremiumRequired { message: String },

    /// The server-side free quota is exhausted.
    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Backend is cold-starting (gateway error in front of a sleeping dyno).
    #[error("Backend is waking up (HTTP {status})")]
    ServiceWaking { status: u16 },

    // ── Backend ─────────────────────────────────────────────────────
    /// Any other non-success response, with the server's message if present.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::LoginRequired { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::ServiceWaking { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` for the explicit entitlement signals
    /// ([`PremiumRequired`](Self::PremiumRequired) and
    /// [`QuotaExceeded`](Self::QuotaExceeded)).
    pub fn is_entitlement_denial(&self) -> bool {
        matches!(
            self,
            Self::PremiumRequired { .. } | Self::QuotaExceeded { .. }
        )
    }

    /// HTTP status associated with this error, when one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::ServiceWaking { status } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify a rejected response from its `error` text and the optional
    /// `requires_premium` flag.
    ///
    /// The backend only signals some conditions through message wording, so
    /// the match is on substrings, case-insensitively.
    pub fn from_rejection(status: u16, message: Option<String>, requires_premium: bool) -> Self {
        let message = message.unwrap_or_else(|| format!("request failed (HTTP {status})"));
        let lower = message.to_lowercase();

        if requires_premium || lower.contains("premium") || lower.contains("subscription") {
            Self::PremiumRequired { message }
        } else if lower.contains("no free remixes") {
            Self::QuotaExceeded { message }
        } else if lower.contains("log in") {
            Self::LoginRequired { message }
        } else if status == 401 {
            Self::Authentication { message }
        } else {
            Self::Api { status, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flag_wins_over_wording() {
        let err = Error::from_rejection(403, Some("Something failed".into()), true);
        assert!(matches!(err, Error::PremiumRequired { .. }));
    }

    #[test]
    fn wording_classifies_signals() {
        let premium = Error::from_rejection(403, Some("Premium feature".into()), false);
        assert!(matches!(premium, Error::PremiumRequired { .. }));

        let sub = Error::from_rejection(402, Some("An active subscription is needed".into()), false);
        assert!(matches!(sub, Error::PremiumRequired { .. }));

        let quota = Error::from_rejection(429, Some("No free remixes left".into()), false);
        assert!(matches!(quota, Error::QuotaExceeded { .. }));

        let login = Error::from_rejection(403, Some("Please log in first".into()), false);
        assert!(matches!(login, Error::LoginRequired { .. }));
    }

    #[test]
    fn unclassified_rejection_keeps_status() {
        let err = Error::from_rejection(500, None, false);
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("HTTP 500"));
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn unauthorized_without_wording_is_authentication() {
        let err = Error::from_rejection(401, Some("bad cookie".into()), false);
        assert!(err.is_auth_error());
    }
}
