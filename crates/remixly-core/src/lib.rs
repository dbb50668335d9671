//! Entitlement logic and session handling between `remixly-api` and the CLI.
//!
//! - **[`engine`]**: Pure functions deciding whether a feature may run
//!   ([`evaluate_access`](engine::evaluate_access)) and how local counters
//!   change after a remix or a watched ad. Time is always an input.
//!
//! - **[`Controller`]**: Owns the [`Session`], the persisted
//!   [`LocalState`] and the backend client. Each operation is a linear
//!   async sequence that returns an explicit [`NextAction`] for the UI.
//!
//! - **[`StateStore`]**: Persistence seam. [`FileStateStore`] writes one
//!   JSON document per profile; [`MemoryStateStore`] backs tests.
//!
//! - **Domain model** ([`model`]): Session, local quota, and the
//!   [`FeaturePolicy`] that partitions features into guest, free and
//!   premium tiers.

pub mod clock;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ClientConfig, DEFAULT_BACKEND_URL, DEFAULT_SHARE_BASE_URL, TlsVerification};
pub use controller::{
    AdWatchOutcome, BlockReason, Controller, LoginOutcome, Referral, RemixOutcome, StatusSnapshot,
};
pub use engine::{AdOutcome, Decision, NextAction, UsesDisplay};
pub use error::CoreError;
pub use store::{FileStateStore, MemoryStateStore, StateStore};

pub use model::{
    CachedProfile, FeatureKind, FeaturePolicy, FeatureRequest, FeatureTier, LocalQuota,
    LocalState, Role, Session, UsesLeft,
};

// Wire types the presentation layer builds requests from.
pub use remixly_api::{ContactForm, HistoryEntry, LoginRequest};
