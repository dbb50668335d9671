// ── Entitlement engine ──
//
// Pure functions over `Session` + `LocalQuota`. The caller supplies `now`
// so ad-premium expiry is re-evaluated on every call.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::Serialize;

use crate::model::{FeaturePolicy, FeatureRequest, LocalQuota, Session, UsesLeft};

/// Trial remixes a logged-out visitor gets.
pub const DEFAULT_GUEST_USES: u32 = 3;
/// Ads per calendar day that unlock ad-granted premium.
pub const REQUIRED_ADS: u32 = 5;
/// How long ad-granted premium lasts.
pub const AD_PREMIUM_HOURS: i64 = 24;

// ── Decisions ───────────────────────────────────────────────────────

/// Outcome of [`evaluate_access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    #[strum(to_string = "This feature requires Premium")]
    DenyPremiumRequired,
    #[strum(to_string = "Free guest remixes used up")]
    DenyGuestLimitReached,
    #[strum(to_string = "Log in to use this feature")]
    DenyAccountRequired,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }

    /// What the presentation layer should offer after this decision.
    pub fn next_action(self) -> NextAction {
        match self {
            Self::Allow => NextAction::None,
            Self::DenyPremiumRequired => NextAction::ChooseUpgrade,
            Self::DenyGuestLimitReached => NextAction::ChooseSignUpOrAds,
            Self::DenyAccountRequired => NextAction::OpenLogin,
        }
    }
}

/// Follow-up the UI should present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NextAction {
    #[default]
    None,
    OpenLogin,
    OpenCourse,
    /// Paywall or watch ads.
    ChooseUpgrade,
    ChooseSignUpOrAds,
}

/// Result of [`record_ad_watched`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdOutcome {
    /// More ads needed today.
    AdsRemaining { remaining: u32 },
    PremiumGranted { expires_at: DateTime<Utc> },
}

/// What the remaining-uses counter should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UsesDisplay {
    /// Subscriber, or the server reported unlimited.
    Unlimited,
    AdPremium { expires_at: DateTime<Utc> },
    /// Logged-in free account, as last reported by the server.
    Server { count: Option<u32> },
    Guest { count: u32 },
}

impl fmt::Display for UsesDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => f.write_str("Unlimited"),
            Self::AdPremium { .. } => f.write_str("Premium (ads)"),
            Self::Server { count: Some(n) } => write!(f, "{n} left"),
            Self::Server { count: None } => f.write_str("unknown"),
            Self::Guest { count } => write!(f, "{count} free trial left"),
        }
    }
}

// ── Access ──────────────────────────────────────────────────────────

/// Subscriber, or ad-granted premium that has not yet expired.
pub fn is_effectively_premium(session: &Session, quota: &LocalQuota, now: DateTime<Utc>) -> bool {
    session.is_subscriber() || ad_premium_active(quota, now)
}

pub fn ad_premium_active(quota: &LocalQuota, now: DateTime<Utc>) -> bool {
    quota.ad_premium_expiry.is_some_and(|expiry| now < expiry)
}

/// Decide whether `request` may run now. First matching rule wins.
pub fn evaluate_access(
    session: &Session,
    quota: &LocalQuota,
    request: &FeatureRequest,
    policy: &FeaturePolicy,
    now: DateTime<Utc>,
) -> Decision {
    if policy.is_premium_only(&request.feature) && !is_effectively_premium(session, quota, now) {
        return Decision::DenyPremiumRequired;
    }
    if !session.logged_in {
        if quota.guest_uses_remaining == 0 {
            return Decision::DenyGuestLimitReached;
        }
        if !policy.is_guest_allowed(&request.feature) {
            return Decision::DenyAccountRequired;
        }
    }
    Decision::Allow
}

// ── Counters ────────────────────────────────────────────────────────

/// Quota after a successful remix. Logged-in counts live on the server.
pub fn record_successful_use(session: &Session, quota: &LocalQuota) -> LocalQuota {
    let mut next = quota.clone();
    if !session.logged_in {
        next.guest_uses_remaining = next.guest_uses_remaining.saturating_sub(1);
    }
    next
}

/// Reset the daily ad count when `today` differs from the stored day.
pub fn roll_over(quota: &LocalQuota, today: NaiveDate) -> LocalQuota {
    let mut next = quota.clone();
    if next.ads_reset_date != Some(today) {
        next.daily_ads_watched = 0;
        next.ads_reset_date = Some(today);
    }
    next
}

/// Ads watched on `today`, with rollover applied.
pub fn ads_watched_today(quota: &LocalQuota, today: NaiveDate) -> u32 {
    if quota.ads_reset_date == Some(today) {
        quota.daily_ads_watched
    } else {
        0
    }
}

/// Count one completed ad. The fifth ad of a day grants
/// [`AD_PREMIUM_HOURS`] of premium and resets the count.
pub fn record_ad_watched(quota: &LocalQuota, now: DateTime<Utc>) -> (LocalQuota, AdOutcome) {
    let mut next = roll_over(quota, now.date_naive());
    next.daily_ads_watched = next.daily_ads_watched.saturating_add(1);

    if next.daily_ads_watched >= REQUIRED_ADS {
        let expires_at = now + TimeDelta::hours(AD_PREMIUM_HOURS);
        next.ad_premium_expiry = Some(expires_at);
        next.daily_ads_watched = 0;
        (next, AdOutcome::PremiumGranted { expires_at })
    } else {
        let remaining = REQUIRED_ADS - next.daily_ads_watched;
        (next, AdOutcome::AdsRemaining { remaining })
    }
}

/// Time left on ad-granted premium, or `None` when inactive.
pub fn ad_premium_remaining(quota: &LocalQuota, now: DateTime<Utc>) -> Option<TimeDelta> {
    quota
        .ad_premium_expiry
        .map(|expiry| expiry - now)
        .filter(|left| *left > TimeDelta::zero())
}

/// Whole hours, rounded down: `"5h remaining"`.
pub fn format_remaining(left: TimeDelta) -> String {
    format!("{}h remaining", left.num_hours())
}

/// Quota after logout: guest trial uses start over.
pub fn record_logout(quota: &LocalQuota) -> LocalQuota {
    LocalQuota {
        guest_uses_remaining: DEFAULT_GUEST_USES,
        ..quota.clone()
    }
}

pub fn uses_display(session: &Session, quota: &LocalQuota, now: DateTime<Utc>) -> UsesDisplay {
    if session.is_subscriber() {
        return UsesDisplay::Unlimited;
    }
    if let Some(expires_at) = quota.ad_premium_expiry.filter(|e| now < *e) {
        return UsesDisplay::AdPremium { expires_at };
    }
    if !session.logged_in {
        return UsesDisplay::Guest {
            count: quota.guest_uses_remaining,
        };
    }
    match session.uses_left {
        Some(UsesLeft::Unlimited) => UsesDisplay::Unlimited,
        Some(UsesLeft::Count(n)) => UsesDisplay::Server { count: Some(n) },
        None => UsesDisplay::Server { count: None },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Role;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, h, m, 0).unwrap()
    }

    fn student() -> Session {
        Session {
            logged_in: true,
            role: Role::Student,
            ..Session::default()
        }
    }

    fn subscriber() -> Session {
        Session {
            is_premium_subscriber: true,
            ..student()
        }
    }

    fn request(kind: &str) -> FeatureRequest {
        FeatureRequest::new(kind)
    }

    fn check(session: &Session, quota: &LocalQuota, kind: &str) -> Decision {
        evaluate_access(session, quota, &request(kind), &FeaturePolicy::default(), at(12, 0))
    }

    // ── evaluate_access ──

    #[test]
    fn guest_with_trials_may_use_guest_feature() {
        let quota = LocalQuota {
            guest_uses_remaining: 2,
            ..LocalQuota::default()
        };
        assert_eq!(check(&Session::guest(), &quota, "tweet"), Decision::Allow);
    }

    #[test]
    fn guest_without_trials_hits_limit() {
        let quota = LocalQuota {
            guest_uses_remaining: 0,
            ..LocalQuota::default()
        };
        let decision = check(&Session::guest(), &quota, "tweet");
        assert_eq!(decision, Decision::DenyGuestLimitReached);
        assert_eq!(decision.next_action(), NextAction::ChooseSignUpOrAds);
    }

    #[test]
    fn guest_on_free_feature_needs_account() {
        let decision = check(&Session::guest(), &LocalQuota::default(), "haiku");
        assert_eq!(decision, Decision::DenyAccountRequired);
        assert_eq!(decision.next_action(), NextAction::OpenLogin);
    }

    #[test]
    fn premium_check_runs_before_guest_checks() {
        let quota = LocalQuota {
            guest_uses_remaining: 0,
            ..LocalQuota::default()
        };
        assert_eq!(
            check(&Session::guest(), &quota, "email"),
            Decision::DenyPremiumRequired
        );
    }

    #[test]
    fn free_user_denied_premium_feature() {
        let decision = check(&student(), &LocalQuota::default(), "email");
        assert_eq!(decision, Decision::DenyPremiumRequired);
        assert_eq!(decision.next_action(), NextAction::ChooseUpgrade);
    }

    #[test]
    fn free_user_allowed_free_feature() {
        assert_eq!(check(&student(), &LocalQuota::default(), "haiku"), Decision::Allow);
    }

    #[test]
    fn subscriber_allowed_everything() {
        for kind in ["email", "tweet", "haiku"] {
            assert_eq!(check(&subscriber(), &LocalQuota::default(), kind), Decision::Allow);
        }
    }

    #[test]
    fn ad_premium_unlocks_premium_until_expiry() {
        let quota = LocalQuota {
            ad_premium_expiry: Some(at(12, 30)),
            ..LocalQuota::default()
        };
        assert_eq!(check(&student(), &quota, "email"), Decision::Allow);

        let policy = FeaturePolicy::default();
        let late = evaluate_access(&student(), &quota, &request("email"), &policy, at(13, 0));
        assert_eq!(late, Decision::DenyPremiumRequired);
    }

    #[test]
    fn ad_premium_ends_exactly_at_expiry() {
        let quota = LocalQuota {
            ad_premium_expiry: Some(at(12, 0)),
            ..LocalQuota::default()
        };
        assert!(!is_effectively_premium(&student(), &quota, at(12, 0)));
        assert!(is_effectively_premium(
            &student(),
            &quota,
            at(12, 0) - TimeDelta::seconds(1)
        ));
    }

    // ── counters ──

    #[test]
    fn guest_use_decrements_and_floors_at_zero() {
        let quota = LocalQuota {
            guest_uses_remaining: 1,
            ..LocalQuota::default()
        };
        let after = record_successful_use(&Session::guest(), &quota);
        assert_eq!(after.guest_uses_remaining, 0);
        let again = record_successful_use(&Session::guest(), &after);
        assert_eq!(again.guest_uses_remaining, 0);
    }

    #[test]
    fn logged_in_use_leaves_quota_alone() {
        let quota = LocalQuota {
            guest_uses_remaining: 2,
            ..LocalQuota::default()
        };
        assert_eq!(record_successful_use(&student(), &quota), quota);
    }

    #[test]
    fn fifth_ad_grants_a_day_of_premium() {
        let now = at(9, 0);
        let quota = LocalQuota {
            daily_ads_watched: 4,
            ads_reset_date: Some(now.date_naive()),
            ..LocalQuota::default()
        };
        let (after, outcome) = record_ad_watched(&quota, now);

        let expected = now + TimeDelta::hours(24);
        assert_eq!(outcome, AdOutcome::PremiumGranted { expires_at: expected });
        assert_eq!(after.ad_premium_expiry, Some(expected));
        assert_eq!(after.daily_ads_watched, 0);
        assert!(is_effectively_premium(&Session::guest(), &after, now));
    }

    #[test]
    fn ad_below_threshold_reports_remaining() {
        let now = at(9, 0);
        let (after, outcome) = record_ad_watched(&LocalQuota::default(), now);
        assert_eq!(outcome, AdOutcome::AdsRemaining { remaining: 4 });
        assert_eq!(after.daily_ads_watched, 1);
        assert_eq!(after.ads_reset_date, Some(now.date_naive()));
    }

    #[test]
    fn ad_count_resets_on_a_new_day() {
        let yesterday = at(23, 0) - TimeDelta::days(1);
        let quota = LocalQuota {
            daily_ads_watched: 4,
            ads_reset_date: Some(yesterday.date_naive()),
            ..LocalQuota::default()
        };
        let today = at(8, 0);
        assert_eq!(ads_watched_today(&quota, today.date_naive()), 0);

        let (after, outcome) = record_ad_watched(&quota, today);
        assert_eq!(outcome, AdOutcome::AdsRemaining { remaining: 4 });
        assert_eq!(after.daily_ads_watched, 1);
    }

    #[test]
    fn roll_over_is_idempotent_within_a_day() {
        let today = at(10, 0).date_naive();
        let quota = LocalQuota {
            daily_ads_watched: 3,
            ads_reset_date: Some(today),
            ..LocalQuota::default()
        };
        assert_eq!(roll_over(&quota, today), quota);
    }

    #[test]
    fn logout_restores_guest_trials() {
        let quota = LocalQuota {
            guest_uses_remaining: 0,
            daily_ads_watched: 2,
            ..LocalQuota::default()
        };
        let after = record_logout(&quota);
        assert_eq!(after.guest_uses_remaining, DEFAULT_GUEST_USES);
        assert_eq!(after.daily_ads_watched, 2);
    }

    // ── display helpers ──

    #[test]
    fn remaining_formats_whole_hours_rounded_down() {
        let quota = LocalQuota {
            ad_premium_expiry: Some(at(17, 59)),
            ..LocalQuota::default()
        };
        let left = ad_premium_remaining(&quota, at(12, 0)).unwrap();
        assert_eq!(format_remaining(left), "5h remaining");
        assert_eq!(ad_premium_remaining(&quota, at(18, 0)), None);
    }

    #[test]
    fn uses_display_prefers_strongest_entitlement() {
        let now = at(12, 0);
        let quota = LocalQuota {
            ad_premium_expiry: Some(at(14, 0)),
            guest_uses_remaining: 2,
            ..LocalQuota::default()
        };
        assert_eq!(uses_display(&subscriber(), &quota, now), UsesDisplay::Unlimited);
        assert_eq!(
            uses_display(&student(), &quota, now),
            UsesDisplay::AdPremium {
                expires_at: at(14, 0)
            }
        );

        let plain = LocalQuota {
            guest_uses_remaining: 2,
            ..LocalQuota::default()
        };
        assert_eq!(
            uses_display(&Session::guest(), &plain, now),
            UsesDisplay::Guest { count: 2 }
        );

        let counted = Session {
            uses_left: Some(UsesLeft::Count(7)),
            ..student()
        };
        assert_eq!(
            uses_display(&counted, &plain, now).to_string(),
            "7 left"
        );
    }
}
