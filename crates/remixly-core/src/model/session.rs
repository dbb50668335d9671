// ── Session domain type ──

use serde::{Deserialize, Serialize};

use remixly_api::{LoginInfo, SessionInfo, UsesLeft};

/// Account role as reported by the backend.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Guest,
    /// A free account. The backend calls these "student".
    Student,
    /// Treated as a premium subscriber.
    Admin,
}

impl Role {
    /// Map a backend role string for a logged-in user.
    ///
    /// Unknown or missing roles on a logged-in user fall back to
    /// [`Role::Student`], since the user is authenticated either way.
    pub fn from_server(role: Option<&str>) -> Self {
        match role.map(str::trim) {
            Some(r) if r.eq_ignore_ascii_case("admin") || r.eq_ignore_ascii_case("premium") => {
                Self::Admin
            }
            _ => Self::Student,
        }
    }
}

/// The authoritative session, rebuilt from every backend response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub logged_in: bool,
    pub role: Role,
    /// Paid subscription (`is_premium` or `is_paid` on the wire).
    pub is_premium_subscriber: bool,
    pub course_completed: bool,
    /// Server-side quota for logged-in free users.
    pub uses_left: Option<UsesLeft>,
    pub referral_code: Option<String>,
}

impl Session {
    /// A logged-out visitor.
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn from_session_info(info: &SessionInfo) -> Self {
        if !info.logged_in {
            return Self::guest();
        }
        Self {
            logged_in: true,
            role: Role::from_server(info.role.as_deref()),
            is_premium_subscriber: info.is_premium || info.is_paid,
            course_completed: info.course_completed,
            uses_left: info.uses_left,
            referral_code: info.referral_code.clone().filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn from_login(info: &LoginInfo) -> Self {
        let user = info.user.clone().unwrap_or_default();
        Self {
            logged_in: true,
            role: Role::from_server(user.role.as_deref()),
            is_premium_subscriber: info.is_premium || info.is_paid,
            course_completed: user.course_completed,
            uses_left: info.uses_left,
            referral_code: None,
        }
    }

    /// Paid subscriber or admin. Ad-granted premium is not included; see
    /// [`crate::engine::is_effectively_premium`].
    pub fn is_subscriber(&self) -> bool {
        self.logged_in && (self.is_premium_subscriber || self.role == Role::Admin)
    }
}
