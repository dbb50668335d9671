// ── Domain model ──
//
// Session data from the backend, the locally persisted state, and the
// feature policy the entitlement engine evaluates against.

pub mod feature;
mod lenient;
pub mod session;
pub mod state;

// ── Re-exports ──────────────────────────────────────────────────────

pub use feature::{FeatureKind, FeaturePolicy, FeatureRequest, FeatureTier};
pub use session::{Role, Session};
pub use state::{CachedProfile, LocalQuota, LocalState};

pub use remixly_api::UsesLeft;
