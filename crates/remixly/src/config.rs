//! CLI configuration: thin wrapper around `remixly_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--backend, --insecure, --timeout).

use std::time::Duration;

use remixly_core::{ClientConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use remixly_config::{
    Config, Profile, config_path, load_config_or_default, save_config, state_path,
};

/// Everything a networked command needs to know about the active profile.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub name: String,
    pub profile: Profile,
    pub client: ClientConfig,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Pick the active profile and translate it, plus global flags, into a
/// `ClientConfig`.
///
/// The implicit `default` profile may be absent: the production backend
/// is used then. A profile named explicitly must exist.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<ResolvedProfile, CliError> {
    let name = active_profile_name(global, config);
    let profile = match config.profiles.get(&name) {
        Some(p) => p.clone(),
        None if name == "default" => Profile::default(),
        None => {
            let available = if config.profiles.is_empty() {
                "(none)".to_owned()
            } else {
                config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
            };
            return Err(CliError::ProfileNotFound { name, available });
        }
    };

    let policy = remixly_config::resolve_policy(config, Some(&profile));
    let mut client = remixly_config::profile_to_client_config(&profile, &config.defaults, policy)?;

    // Flag overrides
    if let Some(ref backend) = global.backend {
        client.url = remixly_config::parse_backend_url(backend)?;
    }
    if global.insecure {
        client.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        client.timeout = Duration::from_secs(secs);
    }

    Ok(ResolvedProfile {
        name,
        profile,
        client,
    })
}
