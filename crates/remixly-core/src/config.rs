// ── Runtime client configuration ──
//
// Describes which backend to talk to and how to gate features. Carries no
// credentials and never touches disk; the CLI builds a `ClientConfig`
// from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::model::FeaturePolicy;

/// Production backend.
pub const DEFAULT_BACKEND_URL: &str = "https://back-thbr.onrender.com";
/// Site the referral share link points at.
pub const DEFAULT_SHARE_BASE_URL: &str = "https://nextlogicai.com";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (local development backends).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for remixly_api::TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Configuration for one backend deployment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend URL (e.g., `https://back-thbr.onrender.com`).
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout. Remix calls can take close to two minutes.
    pub timeout: Duration,
    pub policy: FeaturePolicy,
    /// Pause between session checks while the backend cold-starts.
    pub wake_retry_delay: Duration,
    /// Session-check attempts before giving up on a waking backend.
    pub wake_retries: u32,
    /// Base of the referral share link.
    pub share_base_url: String,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: remixly_api::transport::DEFAULT_TIMEOUT,
            policy: FeaturePolicy::default(),
            wake_retry_delay: Duration::from_secs(3),
            wake_retries: 5,
            share_base_url: DEFAULT_SHARE_BASE_URL.into(),
        }
    }

    /// `{share_base}/register.html?ref={code}`
    pub fn share_link(&self, code: &str) -> String {
        let base = self.share_base_url.trim_end_matches('/');
        format!("{base}/register.html?ref={code}")
    }

    /// Referral code from a share link (`?ref=`) or a bare code.
    ///
    /// Returns `None` for blank input, a link without `ref`, or a code
    /// containing whitespace.
    pub fn referral_code_from(input: &str) -> Option<String> {
        let input = input.trim();
        let code = match Url::parse(input) {
            Ok(link) => link
                .query_pairs()
                .find(|(key, _)| key == "ref")
                .map(|(_, value)| value.trim().to_owned())?,
            Err(_) => input.to_owned(),
        };
        (!code.is_empty() && !code.contains(char::is_whitespace)).then_some(code)
    }

    pub(crate) fn transport(&self) -> remixly_api::TransportConfig {
        remixly_api::TransportConfig {
            tls: (&self.tls).into(),
            timeout: self.timeout,
            cookie_jar: None,
        }
        .with_cookie_jar()
    }
}
