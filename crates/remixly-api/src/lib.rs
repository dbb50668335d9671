// remixly-api: Async Rust client for the remixly content-remixing backend

pub mod account;
pub mod client;
pub mod error;
pub mod history;
pub mod models;
pub mod remix;
pub mod session;
pub mod transport;

pub use client::RemixClient;
pub use error::Error;
pub use models::{
    ContactForm, HistoryEntry, LoginInfo, LoginUser, ReferralData, RemixOutput, SessionInfo,
    UsesLeft,
};
pub use session::LoginRequest;
pub use transport::{TlsMode, TransportConfig};
