// ── Feature kinds and tier policy ──

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A remix style such as `tweet` or `email`.
///
/// Stored trimmed and lowercased so policy lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureKind(String);

impl FeatureKind {
    pub fn new(kind: impl AsRef<str>) -> Self {
        Self(kind.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureKind {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One user action against a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRequest {
    pub feature: FeatureKind,
}

impl FeatureRequest {
    pub fn new(feature: impl Into<FeatureKind>) -> Self {
        Self {
            feature: feature.into(),
        }
    }
}

/// Which tier a feature belongs to under a given policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FeatureTier {
    /// Usable by guests within their trial uses.
    Guest,
    /// Needs a (free) account.
    Free,
    /// Needs a subscription or ad-granted premium.
    Premium,
}

const DEFAULT_PREMIUM: &[&str] = &[
    "email",
    "ad",
    "blog",
    "story",
    "smalltalk",
    "salespitch",
    "thanks",
    "followup",
    "apology",
    "reminder",
    "agenda",
    "interview",
];

const DEFAULT_GUEST: &[&str] = &["tweet", "linkedin", "summary"];

/// Feature partitioning and gates that differ between deployments.
///
/// A feature in neither set is a free-tier feature. A feature listed in
/// both sets is premium: the premium check runs first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturePolicy {
    pub premium_only: BTreeSet<FeatureKind>,
    pub guest_allowed: BTreeSet<FeatureKind>,
    /// Students must finish the course before any remix (educational deployments).
    #[serde(default)]
    pub require_course_completion: bool,
}

impl Default for FeaturePolicy {
    fn default() -> Self {
        Self {
            premium_only: DEFAULT_PREMIUM.iter().copied().map(FeatureKind::new).collect(),
            guest_allowed: DEFAULT_GUEST.iter().copied().map(FeatureKind::new).collect(),
            require_course_completion: false,
        }
    }
}

impl FeaturePolicy {
    pub fn is_premium_only(&self, feature: &FeatureKind) -> bool {
        self.premium_only.contains(feature)
    }

    pub fn is_guest_allowed(&self, feature: &FeatureKind) -> bool {
        self.guest_allowed.contains(feature)
    }

    pub fn tier(&self, feature: &FeatureKind) -> FeatureTier {
        if self.is_premium_only(feature) {
            FeatureTier::Premium
        } else if self.is_guest_allowed(feature) {
            FeatureTier::Guest
        } else {
            FeatureTier::Free
        }
    }

    /// Every feature the policy names, sorted by tier then name.
    pub fn known_features(&self) -> Vec<FeatureKind> {
        let mut all: Vec<FeatureKind> = self
            .premium_only
            .union(&self.guest_allowed)
            .cloned()
            .collect();
        all.sort_by(|a, b| self.tier(a).cmp(&self.tier(b)).then_with(|| a.cmp(b)));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_kind_normalizes() {
        assert_eq!(FeatureKind::new("  Tweet "), FeatureKind::from("tweet"));
    }

    #[test]
    fn tiers_follow_default_sets() {
        let policy = FeaturePolicy::default();
        assert_eq!(policy.tier(&"tweet".into()), FeatureTier::Guest);
        assert_eq!(policy.tier(&"email".into()), FeatureTier::Premium);
        assert_eq!(policy.tier(&"haiku".into()), FeatureTier::Free);
    }

    #[test]
    fn premium_wins_when_listed_twice() {
        let mut policy = FeaturePolicy::default();
        policy.guest_allowed.insert("email".into());
        assert_eq!(policy.tier(&"email".into()), FeatureTier::Premium);
    }

    #[test]
    fn known_features_sorted_by_tier() {
        let policy = FeaturePolicy::default();
        let known = policy.known_features();
        assert_eq!(known.first().map(FeatureKind::as_str), Some("linkedin"));
        assert_eq!(known.len(), DEFAULT_PREMIUM.len() + DEFAULT_GUEST.len());
        assert_eq!(policy.tier(known.last().unwrap_or(&"x".into())), FeatureTier::Premium);
    }
}
