// ── Locally persisted state ──
//
// One document per profile. Every field decodes leniently (see
// `lenient`), so a damaged file degrades to defaults field by field.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::feature::FeatureKind;
use super::lenient;
use super::session::Role;
use crate::engine::DEFAULT_GUEST_USES;

fn default_guest_uses() -> u32 {
    DEFAULT_GUEST_USES
}

/// Client-owned counters, mutated only by the entitlement engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalQuota {
    /// Trial remixes left while logged out. Never negative.
    #[serde(default = "default_guest_uses", deserialize_with = "lenient::guest_uses")]
    pub guest_uses_remaining: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub daily_ads_watched: u32,
    /// Calendar day (UTC) that `daily_ads_watched` belongs to.
    #[serde(default, deserialize_with = "lenient::date")]
    pub ads_reset_date: Option<NaiveDate>,
    /// Ad-granted premium lasts until this instant.
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub ad_premium_expiry: Option<DateTime<Utc>>,
}

impl Default for LocalQuota {
    fn default() -> Self {
        Self {
            guest_uses_remaining: DEFAULT_GUEST_USES,
            daily_ads_watched: 0,
            ads_reset_date: None,
            ad_premium_expiry: None,
        }
    }
}

/// Profile keys cached between runs for display and gating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedProfile {
    #[serde(default, deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub course_completed: bool,
    /// Paid subscription as last reported by the backend.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub subscriber: bool,
    #[serde(default, deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub current_tool: Option<FeatureKind>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
}

/// The full persisted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub quota: LocalQuota,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub profile: CachedProfile,
    /// `Cookie` header value for the backend session.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    /// Referral code this install was invited with. Survives logout.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub incoming_referral: Option<String>,
}

impl LocalState {
    /// Decode a state document, falling back to defaults when it is not
    /// JSON at all.
    pub fn from_json_lenient(raw: &str) -> (Self, bool) {
        match serde_json::from_str(raw) {
            Ok(state) => (state, true),
            Err(_) => (Self::default(), false),
        }
    }
}
