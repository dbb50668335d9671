// Backend HTTP client
//
// Wraps `reqwest::Client` with URL construction, cookie-session
// persistence, and response classification. Endpoint groups (session,
// remix, history, account) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// HTTP client for the remixly backend.
///
/// All calls share one cookie jar, which carries the server-side session.
/// Because the CLI runs one process per command, the jar can be exported
/// with [`cookie_header`](Self::cookie_header) and re-seeded with
/// [`restore_cookies`](Self::restore_cookies).
pub struct RemixClient {
    http: reqwest::Client,
    base_url: Url,
    cookie_jar: Option<Arc<Jar>>,
}

impl RemixClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (session auth requires cookies).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            cookie_jar,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Cookie export/restore is unavailable on clients built this way.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            cookie_jar: None,
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Cookie session ──────────────────────────────────────────────

    /// Current `Cookie` header value for the backend (e.g. `"session=abc"`).
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let cookies = jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    /// Re-seed the jar from a previously exported `Cookie` header value.
    pub fn restore_cookies(&self, header: &str) {
        let Some(jar) = self.cookie_jar.as_ref() else {
            return;
        };
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            jar.add_cookie_str(pair, &self.base_url);
        }
        trace!("restored session cookies");
    }

    // ── URL builders ────────────────────────────────────────────────

    /// Build `{base}/{path}`, tolerating a trailing slash on the base.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Request helpers ─────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        Self::parse_response(resp).await
    }

    /// Send a POST request with a JSON body and decode the JSON response.
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        let resp = self.http.post(url).json(body).send().await?;
        Self::parse_response(resp).await
    }

    /// Decode a successful response body, or classify a failed one.
    pub(crate) async fn parse_response<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Self::rejection(status, &body));
        }

        decode(&body)
    }

    /// Turn a non-success response into the matching `Error`.
    pub(crate) fn rejection(status: StatusCode, body: &str) -> Error {
        if matches!(
            status,
            StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        ) {
            return Error::ServiceWaking {
                status: status.as_u16(),
            };
        }

        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed.error.or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.chars().take(200).collect())
        });
        Error::from_rejection(status.as_u16(), message, parsed.requires_premium)
    }
}

/// Deserialize a JSON body, keeping a preview of the payload on failure.
/// An empty body decodes as JSON `null`.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    let text = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(text).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}
