// Wire types for the remixly backend.
//
// Field names follow the backend's JSON exactly; the backend is loose
// about types (numbers arrive as strings, booleans go missing), so most
// fields default and `uses_left` is decoded leniently.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ── UsesLeft ────────────────────────────────────────────────────────

/// Remaining server-side remixes for a logged-in account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsesLeft {
    Count(u32),
    Unlimited,
}

impl UsesLeft {
    /// Interpret a raw JSON value: a number, a numeric string, or
    /// `"unlimited"`. Anything else yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                let n = n.as_i64()?;
                Some(Self::Count(u32::try_from(n.max(0)).unwrap_or(u32::MAX)))
            }
            Value::String(s) if s.trim().eq_ignore_ascii_case("unlimited") => {
                Some(Self::Unlimited)
            }
            Value::String(s) => s.trim().parse::<u32>().ok().map(Self::Count),
            _ => None,
        }
    }

    pub fn is_exhausted(self) -> bool {
        self == Self::Count(0)
    }
}

impl std::fmt::Display for UsesLeft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Unlimited => f.write_str("unlimited"),
        }
    }
}

impl Serialize for UsesLeft {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(n) => serializer.serialize_u32(*n),
            Self::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for UsesLeft {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid uses_left: {value}")))
    }
}

/// `deserialize_with` helper: malformed `uses_left` becomes `None`.
fn lenient_uses_left<'de, D: Deserializer<'de>>(d: D) -> Result<Option<UsesLeft>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(UsesLeft::from_json))
}

/// `deserialize_with` helper: `true`, `"true"`, or `1` count as set.
fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}

/// `deserialize_with` helper: strings and numbers become text; blanks and
/// anything else become `None`.
fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `deserialize_with` helper: a non-negative count; garbage becomes 0.
fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value.as_ref().and_then(UsesLeft::from_json) {
        Some(UsesLeft::Count(n)) => n,
        _ => 0,
    })
}

// ── Session ─────────────────────────────────────────────────────────

/// `GET /check_session`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionInfo {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub logged_in: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_premium: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_paid: bool,
    #[serde(default, deserialize_with = "lenient_uses_left")]
    pub uses_left: Option<UsesLeft>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub course_completed: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub referral_code: Option<String>,
}

// ── Login ───────────────────────────────────────────────────────────

/// `POST /login` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_code: Option<&'a str>,
    #[serde(rename = "h-captcha-response", skip_serializing_if = "Option::is_none")]
    pub captcha_token: Option<&'a str>,
}

/// Account details nested in a login response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginUser {
    #[serde(default, deserialize_with = "lenient_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub course_completed: bool,
}

/// Successful `POST /login` response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginInfo {
    #[serde(default)]
    pub user: Option<LoginUser>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_paid: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_premium: bool,
    #[serde(default, deserialize_with = "lenient_uses_left")]
    pub uses_left: Option<UsesLeft>,
}

// ── Remix ───────────────────────────────────────────────────────────

/// `POST /remix` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RemixBody<'a> {
    pub content: &'a str,
    pub style: &'a str,
    pub is_guest: bool,
}

/// Raw `POST /remix` response; either `output` or `error` is set.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RemixEnvelope {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default, deserialize_with = "lenient_uses_left")]
    pub uses_left: Option<UsesLeft>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, alias = "requiresPremium", deserialize_with = "lenient_bool")]
    pub requires_premium: bool,
}

/// A completed remix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemixOutput {
    pub output: String,
    /// Remaining server quota after this call, if the backend reported it.
    pub uses_left: Option<UsesLeft>,
}

// ── Account ─────────────────────────────────────────────────────────

/// `POST /update_subscription` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SubscriptionBody<'a> {
    #[serde(rename = "subscriptionID")]
    pub subscription_id: &'a str,
}

/// Contact form fields, sent as multipart form data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// `GET /get_referral_data`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReferralData {
    #[serde(default, deserialize_with = "lenient_text")]
    pub referral_code: Option<String>,
    /// Accounts that signed up with this user's code.
    #[serde(default, deserialize_with = "lenient_count")]
    pub referral_count: u32,
    /// Free months earned but not yet applied.
    #[serde(default, deserialize_with = "lenient_count")]
    pub pending_rewards: u32,
}

// ── History ─────────────────────────────────────────────────────────

/// `POST /save_remix` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SaveRemixBody<'a> {
    pub original_text: &'a str,
    pub remixed_text: &'a str,
    pub remix_type: &'a str,
}

/// One saved remix from `GET /get_history`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub remix_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub original_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub remixed_text: Option<String>,
    /// Timestamp as the backend formats it.
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
}

/// Raw `GET /get_history` response. A non-list `history` is empty and
/// entries that are not objects are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HistoryEnvelope {
    #[serde(default)]
    pub history: Option<Value>,
}

impl HistoryEnvelope {
    pub(crate) fn into_entries(self) -> Vec<HistoryEntry> {
        let Some(Value::Array(items)) = self.history else {
            return Vec::new();
        };
        items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect()
    }
}

/// Generic `{ "error": "..." }` body on rejected calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, alias = "requiresPremium", deserialize_with = "lenient_bool")]
    pub requires_premium: bool,
}
