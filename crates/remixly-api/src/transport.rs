// Shared transport configuration for building reqwest::Client instances.
//
// Every call against the backend rides the same cookie session, so the
// jar lives here and is handed to the client builder.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::error::Error;

/// Remix calls run a language model server-side and can take up to two minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const USER_AGENT: &str = concat!("remixly/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (local development backends only).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Create a config with a fresh cookie jar (for session auth).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
