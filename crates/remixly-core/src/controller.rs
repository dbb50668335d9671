// ── Session controller ──
//
// Owns the session, the local state, and the backend client. Every
// operation is one linear async sequence; the caller gets back an explicit
// `NextAction` instead of UI callbacks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, info, warn};

use remixly_api::{ContactForm, HistoryEntry, LoginRequest, RemixClient};

use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::engine::{self, AdOutcome, Decision, NextAction, REQUIRED_ADS, UsesDisplay};
use crate::error::CoreError;
use crate::model::{
    CachedProfile, FeatureKind, FeatureRequest, FeatureTier, LocalState, Role, Session, UsesLeft,
};
use crate::store::StateStore;

// ── Outcomes ─────────────────────────────────────────────────────

/// Why a remix did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BlockReason {
    PremiumRequired,
    GuestLimitReached,
    AccountRequired,
    CourseIncomplete,
    /// The server-side free quota is exhausted.
    QuotaExceeded,
    /// The backend rejected the call until the user logs in.
    LoginRequired,
}

impl BlockReason {
    /// `None` for [`Decision::Allow`].
    pub fn from_decision(decision: Decision) -> Option<Self> {
        match decision {
            Decision::Allow => None,
            Decision::DenyPremiumRequired => Some(Self::PremiumRequired),
            Decision::DenyGuestLimitReached => Some(Self::GuestLimitReached),
            Decision::DenyAccountRequired => Some(Self::AccountRequired),
        }
    }
}

/// Result of [`Controller::remix`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemixOutcome {
    Completed {
        output: String,
        uses: UsesDisplay,
        /// `ChooseUpgrade` when this call used the last server-side remix.
        next: NextAction,
    },
    Blocked {
        reason: BlockReason,
        message: String,
        next: NextAction,
    },
}

/// Result of [`Controller::login`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub session: Session,
    /// `OpenCourse` for a student who still has to finish the course.
    pub next: NextAction,
}

/// Result of [`Controller::watch_ad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdWatchOutcome {
    /// Ad premium is already running; the ad was not counted.
    AlreadyActive { expires_at: DateTime<Utc> },
    Recorded { outcome: AdOutcome },
}

/// Referral code, share link and reward counters for the logged-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Referral {
    pub code: String,
    pub link: String,
    /// `None` when the backend's referral stats could not be fetched.
    pub referral_count: Option<u32>,
    /// Free months earned, `None` under the same condition.
    pub pending_rewards: Option<u32>,
    /// Code this install was invited with, if any.
    pub referred_by: Option<String>,
}

/// Read-only snapshot for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub logged_in: bool,
    pub role: Role,
    pub subscriber: bool,
    pub effectively_premium: bool,
    pub course_completed: bool,
    pub uses: UsesDisplay,
    pub guest_uses_remaining: u32,
    pub ads_watched_today: u32,
    pub ads_required: u32,
    pub ad_premium_expires_at: Option<DateTime<Utc>>,
    pub ad_premium_remaining: Option<String>,
    pub current_tool: Option<FeatureKind>,
    pub referral_code: Option<String>,
    pub referred_by: Option<String>,
    pub backend: String,
}

// ── Controller ───────────────────────────────────────────────────

/// Entry point for the presentation layer.
///
/// Holds the authoritative [`Session`] (rebuilt from the backend) and the
/// client-owned [`LocalState`], which is saved through the [`StateStore`]
/// after every change.
pub struct Controller {
    config: ClientConfig,
    client: RemixClient,
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    session: Session,
    state: LocalState,
}

impl Controller {
    /// Build a controller for `config`, loading local state from `store`
    /// and restoring any saved session cookie. Does not contact the
    /// backend; call [`refresh_session`](Self::refresh_session) for that.
    pub fn new(config: ClientConfig, store: Arc<dyn StateStore>) -> Result<Self, CoreError> {
        let client = RemixClient::new(config.url.clone(), &config.transport())?;
        Ok(Self::with_client(config, client, store))
    }

    /// Build a controller around an existing client.
    pub fn with_client(
        config: ClientConfig,
        client: RemixClient,
        store: Arc<dyn StateStore>,
    ) -> Self {
        let state = store.load();
        if let Some(ref cookie) = state.session_cookie {
            client.restore_cookies(cookie);
        }
        // Until the backend answers, trust the cached profile.
        let session = match state.profile.role {
            Some(role) if state.session_cookie.is_some() && role != Role::Guest => Session {
                logged_in: true,
                role,
                is_premium_subscriber: state.profile.subscriber,
                course_completed: state.profile.course_completed,
                referral_code: state.profile.referral_code.clone(),
                ..Session::default()
            },
            _ => Session::guest(),
        };

        Self {
            config,
            client,
            store,
            clock: Arc::new(SystemClock),
            session,
            state,
        }
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &LocalState {
        &self.state
    }

    pub fn client(&self) -> &RemixClient {
        &self.client
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Save local state, capturing the session cookie while logged in.
    fn persist(&mut self) -> Result<(), CoreError> {
        self.state.session_cookie = if self.session.logged_in {
            self.client.cookie_header()
        } else {
            None
        };
        self.store.save(&self.state)
    }

    fn apply_session(&mut self, session: Session) {
        if session.logged_in {
            self.state.profile.role = Some(session.role);
            self.state.profile.subscriber = session.is_premium_subscriber;
            self.state.profile.course_completed = session.course_completed;
            if session.referral_code.is_some() {
                self.state.profile.referral_code.clone_from(&session.referral_code);
            }
        } else if self.session.logged_in {
            info!("backend reports the session has ended");
            self.state.quota = engine::record_logout(&self.state.quota);
            self.clear_profile();
        }
        self.session = session;
    }

    fn clear_profile(&mut self) {
        let current_tool = self.state.profile.current_tool.take();
        self.state.profile = CachedProfile {
            current_tool,
            ..CachedProfile::default()
        };
    }

    // ── Session ──────────────────────────────────────────────────

    /// Re-read the session from the backend.
    ///
    /// A cold-starting backend is retried after `wake_retry_delay`, up to
    /// `wake_retries` attempts in total. Any other failure keeps the
    /// previous session.
    pub async fn refresh_session(&mut self) -> Result<&Session, CoreError> {
        let attempts = self.config.wake_retries.max(1);
        let mut attempt = 0;

        let info = loop {
            attempt += 1;
            match self.client.check_session().await {
                Ok(info) => break info,
                Err(remixly_api::Error::ServiceWaking { status }) if attempt < attempts => {
                    info!(
                        attempt,
                        status,
                        delay_secs = self.config.wake_retry_delay.as_secs(),
                        "backend is waking up, retrying session check"
                    );
                    tokio::time::sleep(self.config.wake_retry_delay).await;
                }
                Err(remixly_api::Error::ServiceWaking { .. }) => {
                    warn!(attempts = attempt, "backend did not wake up");
                    return Err(CoreError::ServiceUnavailable { attempts: attempt });
                }
                Err(e) => {
                    warn!(error = %e, "session check failed, keeping previous session");
                    return Err(e.into());
                }
            }
        };

        let session = Session::from_session_info(&info);
        debug!(logged_in = session.logged_in, role = %session.role, "session refreshed");
        self.apply_session(session);
        self.persist()?;
        Ok(&self.session)
    }

    /// Refresh after a successful remote action; failures are logged only.
    async fn refresh_after_action(&mut self) {
        if let Err(e) = self.refresh_session().await {
            warn!(error = %e, "session refresh after action failed");
        }
    }

    /// Log in and cache the account's role and course flag.
    pub async fn login(&mut self, request: &LoginRequest) -> Result<LoginOutcome, CoreError> {
        if request.username.trim().is_empty() || request.password.expose_secret().is_empty() {
            return Err(CoreError::validation("Username and password are required"));
        }

        let info = self.client.login(request).await?;
        let session = Session::from_login(&info);
        info!(username = %request.username, role = %session.role, "logged in");

        self.apply_session(session);
        if let Some(code) = request.access_code.as_deref().filter(|c| !c.trim().is_empty()) {
            self.state.profile.access_code = Some(code.to_owned());
        }
        self.persist()?;

        Ok(LoginOutcome {
            session: self.session.clone(),
            next: self.course_gate().unwrap_or_default(),
        })
    }

    /// Log out. Local state is cleared even when the backend call fails.
    ///
    /// Returns whether the backend confirmed the logout. Only a failure to
    /// save local state is an error.
    pub async fn logout(&mut self) -> Result<bool, CoreError> {
        let confirmed = match self.client.logout().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "backend logout failed, clearing local session anyway");
                false
            }
        };

        self.session = Session::guest();
        self.state.quota = engine::record_logout(&self.state.quota);
        self.clear_profile();
        self.persist()?;
        info!("logged out");
        Ok(confirmed)
    }

    // ── Entitlements ─────────────────────────────────────────────

    /// `OpenCourse` when the course gate applies to the current session.
    fn course_gate(&self) -> Option<NextAction> {
        let gated = self.config.policy.require_course_completion
            && self.session.logged_in
            && self.session.role == Role::Student
            && !self.session.course_completed;
        gated.then_some(NextAction::OpenCourse)
    }

    /// Access decision for `feature` right now, without side effects.
    pub fn check(&self, feature: &FeatureKind) -> Decision {
        engine::evaluate_access(
            &self.session,
            &self.state.quota,
            &FeatureRequest {
                feature: feature.clone(),
            },
            &self.config.policy,
            self.now(),
        )
    }

    pub fn tier(&self, feature: &FeatureKind) -> FeatureTier {
        self.config.policy.tier(feature)
    }

    /// Remix `content` with `feature`.
    ///
    /// Local denials and the backend's entitlement signals come back as
    /// [`RemixOutcome::Blocked`]; other failures are errors.
    pub async fn remix(
        &mut self,
        feature: &FeatureKind,
        content: &str,
    ) -> Result<RemixOutcome, CoreError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(CoreError::validation("Please enter some text to remix"));
        }
        if feature.as_str().is_empty() {
            return Err(CoreError::validation("Choose a remix style"));
        }

        if let Some(next) = self.course_gate() {
            return Ok(RemixOutcome::Blocked {
                reason: BlockReason::CourseIncomplete,
                message: "Please complete the course before using tools".into(),
                next,
            });
        }

        let decision = self.check(feature);
        if let Some(reason) = BlockReason::from_decision(decision) {
            debug!(%feature, %decision, "remix blocked locally");
            return Ok(RemixOutcome::Blocked {
                reason,
                message: decision.to_string(),
                next: decision.next_action(),
            });
        }

        let is_guest = !self.session.logged_in;
        let result = match self.client.remix(content, feature.as_str(), is_guest).await {
            Ok(result) => result,
            Err(e) => return self.server_denial(e.into()),
        };
        info!(%feature, is_guest, "remix completed");

        self.state.quota = engine::record_successful_use(&self.session, &self.state.quota);
        if self.session.logged_in {
            if result.uses_left.is_some() {
                self.session.uses_left = result.uses_left;
            }
            self.persist()?;
            self.refresh_after_action().await;
        } else {
            self.persist()?;
        }

        let now = self.now();
        let exhausted = result.uses_left.is_some_and(UsesLeft::is_exhausted)
            && self.session.logged_in
            && !engine::is_effectively_premium(&self.session, &self.state.quota, now);

        Ok(RemixOutcome::Completed {
            output: result.output,
            uses: engine::uses_display(&self.session, &self.state.quota, now),
            next: if exhausted {
                NextAction::ChooseUpgrade
            } else {
                NextAction::None
            },
        })
    }

    /// Map the backend's entitlement signals to a blocked outcome.
    fn server_denial(&self, err: CoreError) -> Result<RemixOutcome, CoreError> {
        let (reason, message) = match err {
            CoreError::PremiumRequired { message } => (BlockReason::PremiumRequired, message),
            CoreError::QuotaExceeded { message } => (BlockReason::QuotaExceeded, message),
            CoreError::LoginRequired { message } => (BlockReason::LoginRequired, message),
            other => return Err(other),
        };
        let next = match reason {
            BlockReason::QuotaExceeded if !self.session.logged_in => NextAction::ChooseSignUpOrAds,
            BlockReason::LoginRequired => NextAction::OpenLogin,
            _ => NextAction::ChooseUpgrade,
        };
        debug!(%reason, "remix rejected by backend");
        Ok(RemixOutcome::Blocked {
            reason,
            message,
            next,
        })
    }

    /// Count one completed ad. Refused while ad premium is active.
    pub fn watch_ad(&mut self) -> Result<AdWatchOutcome, CoreError> {
        let now = self.now();
        if let Some(expires_at) = self.state.quota.ad_premium_expiry.filter(|e| now < *e) {
            return Ok(AdWatchOutcome::AlreadyActive { expires_at });
        }

        let (quota, outcome) = engine::record_ad_watched(&self.state.quota, now);
        self.state.quota = quota;
        self.persist()?;

        match outcome {
            AdOutcome::PremiumGranted { expires_at } => {
                info!(%expires_at, "ad premium unlocked");
            }
            AdOutcome::AdsRemaining { remaining } => debug!(remaining, "ad recorded"),
        }
        Ok(AdWatchOutcome::Recorded { outcome })
    }

    /// Remember the selected tool and report whether it is usable now.
    pub fn select_tool(&mut self, feature: FeatureKind) -> Result<Decision, CoreError> {
        if feature.as_str().is_empty() {
            return Err(CoreError::validation("Choose a remix style"));
        }
        let decision = self.check(&feature);
        self.state.profile.current_tool = Some(feature);
        self.persist()?;
        Ok(decision)
    }

    // ── Account ──────────────────────────────────────────────────

    /// Attach a subscription, then re-read the session.
    pub async fn update_subscription(
        &mut self,
        subscription_id: &str,
    ) -> Result<&Session, CoreError> {
        let subscription_id = subscription_id.trim();
        if subscription_id.is_empty() {
            return Err(CoreError::validation("Subscription ID is required"));
        }
        self.client.update_subscription(subscription_id).await?;
        info!("subscription activated");
        self.refresh_after_action().await;
        Ok(&self.session)
    }

    pub async fn submit_contact(&self, form: &ContactForm) -> Result<(), CoreError> {
        if form.name.trim().is_empty() || form.message.trim().is_empty() {
            return Err(CoreError::validation("Name and message are required"));
        }
        if !form.email.contains('@') {
            return Err(CoreError::validation("A valid email address is required"));
        }
        self.client.submit_contact(form).await?;
        info!("contact message sent");
        Ok(())
    }

    /// Fetch the referral code and reward counters and build the share link.
    ///
    /// A failed stats call is logged and leaves the counters empty; the
    /// code from the session is enough for the link.
    pub async fn referral(&mut self) -> Result<Referral, CoreError> {
        self.refresh_session().await?;
        if !self.session.logged_in {
            return Err(CoreError::LoginRequired {
                message: "Please log in to view your referral code".into(),
            });
        }

        let data = match self.client.referral_data().await {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(error = %e, "referral stats unavailable");
                None
            }
        };

        let code = data
            .as_ref()
            .and_then(|d| d.referral_code.clone())
            .or_else(|| self.session.referral_code.clone())
            .or_else(|| self.state.profile.referral_code.clone())
            .ok_or_else(|| CoreError::Api {
                message: "No referral code on this account".into(),
                status: None,
            })?;

        if self.state.profile.referral_code.as_deref() != Some(code.as_str()) {
            self.state.profile.referral_code = Some(code.clone());
            self.persist()?;
        }

        Ok(Referral {
            link: self.config.share_link(&code),
            code,
            referral_count: data.as_ref().map(|d| d.referral_count),
            pending_rewards: data.as_ref().map(|d| d.pending_rewards),
            referred_by: self.state.incoming_referral.clone(),
        })
    }

    /// Remember the referral code this install was invited with.
    ///
    /// Accepts a share link or a bare code and returns the stored code.
    pub fn accept_referral(&mut self, code_or_link: &str) -> Result<String, CoreError> {
        let code = ClientConfig::referral_code_from(code_or_link)
            .ok_or_else(|| CoreError::validation("Not a referral code or share link"))?;
        self.state.incoming_referral = Some(code.clone());
        self.persist()?;
        info!(%code, "incoming referral stored");
        Ok(code)
    }

    // ── History ──────────────────────────────────────────────────

    /// Save a finished remix to the account's history.
    pub async fn save_remix(
        &self,
        feature: &FeatureKind,
        original: &str,
        remixed: &str,
    ) -> Result<(), CoreError> {
        if !self.session.logged_in {
            return Err(CoreError::LoginRequired {
                message: "Please log in to save remixes".into(),
            });
        }
        if original.trim().is_empty() || remixed.trim().is_empty() {
            return Err(CoreError::validation("Nothing to save"));
        }
        self.client
            .save_remix(original, remixed, feature.as_str())
            .await?;
        info!(%feature, "remix saved to history");
        Ok(())
    }

    /// Saved remixes for the logged-in account.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, CoreError> {
        if !self.session.logged_in {
            return Err(CoreError::LoginRequired {
                message: "Please log in to view your remix history".into(),
            });
        }
        Ok(self.client.history().await?)
    }

    // ── Display ──────────────────────────────────────────────────

    pub fn status(&self) -> StatusSnapshot {
        let now = self.now();
        let quota = &self.state.quota;
        let remaining = engine::ad_premium_remaining(quota, now);

        StatusSnapshot {
            logged_in: self.session.logged_in,
            role: self.session.role,
            subscriber: self.session.is_subscriber(),
            effectively_premium: engine::is_effectively_premium(&self.session, quota, now),
            course_completed: self.session.course_completed,
            uses: engine::uses_display(&self.session, quota, now),
            guest_uses_remaining: quota.guest_uses_remaining,
            ads_watched_today: engine::ads_watched_today(quota, now.date_naive()),
            ads_required: REQUIRED_ADS,
            ad_premium_expires_at: remaining.and(quota.ad_premium_expiry),
            ad_premium_remaining: remaining.map(engine::format_remaining),
            current_tool: self.state.profile.current_tool.clone(),
            referral_code: self
                .session
                .referral_code
                .clone()
                .or_else(|| self.state.profile.referral_code.clone()),
            referred_by: self.state.incoming_referral.clone(),
            backend: self.config.url.to_string(),
        }
    }
}
