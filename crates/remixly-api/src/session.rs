// Session endpoints
//
// Cookie-based login/logout and the session check the front end runs
// on every start and after each state-changing call.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{RemixClient, decode};
use crate::error::Error;
use crate::models::{LoginBody, LoginInfo, SessionInfo};

/// Credentials for `POST /login`.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
    /// Classroom access code (educational deployments).
    pub access_code: Option<String>,
    /// hCaptcha response token, when the deployment enforces one.
    pub captcha_token: Option<String>,
}

impl RemixClient {
    /// Fetch the current session state.
    ///
    /// A cold-starting backend answers with a gateway error, surfaced as
    /// [`Error::ServiceWaking`]; the caller decides whether to wait and retry.
    pub async fn check_session(&self) -> Result<SessionInfo, Error> {
        self.get_json("check_session").await
    }

    /// Authenticate with username/password.
    ///
    /// On success the session cookie is stored in the client's jar. Any
    /// 4xx is reported as [`Error::Authentication`] carrying the server's
    /// message.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginInfo, Error> {
        let url = self.endpoint("login")?;
        debug!(username = %request.username, "logging in at {}", url);

        let body = LoginBody {
            username: &request.username,
            password: request.password.expose_secret(),
            access_code: request.access_code.as_deref(),
            captcha_token: request.captcha_token.as_deref(),
        };

        let resp = self.http().post(url).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status.is_client_error() {
            let err = Self::rejection(status, &text);
            let message = match err {
                Error::Authentication { message }
                | Error::LoginRequired { message }
                | Error::PremiumRequired { message }
                | Error::QuotaExceeded { message }
                | Error::Api { message, .. } => message,
                other => other.to_string(),
            };
            return Err(Error::Authentication { message });
        }
        if !status.is_success() {
            return Err(Self::rejection(status, &text));
        }

        debug!("login successful");
        decode(&text)
    }

    /// End the current session server-side.
    ///
    /// The response body is ignored; only transport failures and
    /// non-success statuses are reported.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.endpoint("logout")?;
        debug!("logging out at {}", url);

        let resp = self.http().post(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::rejection(status, &text));
        }

        debug!("logout complete");
        Ok(())
    }
}
