//! Shared configuration for the remixly CLI.
//!
//! TOML profiles, the per-deployment feature policy, credential
//! resolution (env + keyring + plaintext), local state paths, and
//! translation to `remixly_core::ClientConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use remixly_core::{
    ClientConfig, DEFAULT_BACKEND_URL, FeatureKind, FeaturePolicy, TlsVerification,
};

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "remixly";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Feature policy shared by all profiles unless a profile overrides it.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            policy: PolicyConfig::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    120
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL. Defaults to the production backend.
    pub backend: Option<String>,

    /// Login name.
    pub username: Option<String>,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Classroom access code sent with login.
    pub access_code: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Base URL for referral share links.
    pub share_base_url: Option<String>,

    /// Session-check attempts while the backend cold-starts.
    pub wake_retries: Option<u32>,

    /// Per-profile feature policy overrides.
    #[serde(default, skip_serializing_if = "PolicyConfig::is_empty")]
    pub policy: PolicyConfig,
}

/// Feature policy overrides. Unset fields keep the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_only: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_allowed: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_course_completion: Option<bool>,
}

impl PolicyConfig {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply these overrides on top of `base`.
    pub fn apply(&self, mut base: FeaturePolicy) -> FeaturePolicy {
        if let Some(ref list) = self.premium_only {
            base.premium_only = list.iter().map(FeatureKind::new).collect();
        }
        if let Some(ref list) = self.guest_allowed {
            base.guest_allowed = list.iter().map(FeatureKind::new).collect();
        }
        if let Some(gate) = self.require_course_completion {
            base.require_course_completion = gate;
        }
        base
    }
}

/// Effective policy for a profile: built-in defaults, then the global
/// `[policy]` section, then the profile's own overrides.
pub fn resolve_policy(config: &Config, profile: Option<&Profile>) -> FeaturePolicy {
    let policy = config.policy.apply(FeaturePolicy::default());
    match profile {
        Some(p) => p.policy.apply(policy),
        None => policy,
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "nextlogicai", "remixly")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Local state file for a profile (quota counters, cached profile keys,
/// session cookie).
pub fn state_path(profile_name: &str) -> PathBuf {
    let file = format!("{profile_name}.json");
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("state").join(&file),
        |dirs| dirs.data_dir().join("state").join(&file),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("remixly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layered over defaults and under `REMIXLY_`
/// environment variables (`__` separates nested keys).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("REMIXLY_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the login password: `REMIXLY_PASSWORD`, the profile's
/// `password_env`, the system keyring, then plaintext config.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env vars
    if let Ok(pw) = std::env::var("REMIXLY_PASSWORD") {
        return Ok(SecretString::from(pw));
    }
    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok(SecretString::from(pw));
        }
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve username + password without CLI flags.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("REMIXLY_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = resolve_password(profile, profile_name)?;
    Ok((username, password))
}

/// Store a password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })?;
    entry
        .set_password(password)
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Translation to ClientConfig ─────────────────────────────────────

/// Build a `ClientConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
    policy: FeaturePolicy,
) -> Result<ClientConfig, ConfigError> {
    let url_str = profile.backend.as_deref().unwrap_or(DEFAULT_BACKEND_URL);
    let url = parse_backend_url(url_str)?;

    let mut config = ClientConfig::new(url);
    config.tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.policy = policy;
    if let Some(ref share) = profile.share_base_url {
        config.share_base_url.clone_from(share);
    }
    if let Some(retries) = profile.wake_retries {
        config.wake_retries = retries;
    }
    Ok(config)
}

/// Parse and check a backend URL (http or https only).
pub fn parse_backend_url(url_str: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = url_str.parse().map_err(|_| ConfigError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "backend".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 120);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn config_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "school".into(),
            Profile {
                backend: Some("https://school.example.test".into()),
                username: Some("amy".into()),
                access_code: Some("CLASS-7".into()),
                policy: PolicyConfig {
                    require_course_completion: Some(true),
                    ..PolicyConfig::default()
                },
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let school = &loaded.profiles["school"];
        assert_eq!(school.username.as_deref(), Some("amy"));
        assert_eq!(school.policy.require_course_completion, Some(true));
    }

    #[test]
    fn policy_layers_global_then_profile() {
        let cfg = Config {
            policy: PolicyConfig {
                guest_allowed: Some(vec!["Tweet".into(), "haiku".into()]),
                ..PolicyConfig::default()
            },
            ..Config::default()
        };
        let profile = Profile {
            policy: PolicyConfig {
                require_course_completion: Some(true),
                ..PolicyConfig::default()
            },
            ..Profile::default()
        };

        let policy = resolve_policy(&cfg, Some(&profile));
        assert!(policy.is_guest_allowed(&FeatureKind::new("haiku")));
        assert!(policy.is_guest_allowed(&FeatureKind::new("tweet")));
        assert!(!policy.is_guest_allowed(&FeatureKind::new("linkedin")));
        assert!(policy.require_course_completion);
        assert_eq!(policy.premium_only, FeaturePolicy::default().premium_only);
    }

    #[test]
    fn profile_translates_to_client_config() {
        let profile = Profile {
            backend: Some("http://localhost:5000".into()),
            insecure: Some(true),
            timeout: Some(30),
            wake_retries: Some(2),
            share_base_url: Some("https://share.example.test".into()),
            ..Profile::default()
        };
        let config =
            profile_to_client_config(&profile, &Defaults::default(), FeaturePolicy::default())
                .unwrap();

        assert_eq!(config.url.as_str(), "http://localhost:5000/");
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.wake_retries, 2);
        assert_eq!(
            config.share_link("X"),
            "https://share.example.test/register.html?ref=X"
        );
    }

    #[test]
    fn empty_profile_uses_production_backend() {
        let config = profile_to_client_config(
            &Profile::default(),
            &Defaults::default(),
            FeaturePolicy::default(),
        )
        .unwrap();
        assert_eq!(config.url.as_str(), "https://back-thbr.onrender.com/");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn rejects_non_http_backend() {
        let err = parse_backend_url("ftp://example.test").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
        assert!(parse_backend_url("not a url").is_err());
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        let profile = Profile {
            username: Some("amy".into()),
            password: Some("pw".into()),
            password_env: Some("REMIXLY_TEST_UNSET_PASSWORD_VAR".into()),
            ..Profile::default()
        };
        // Keyring lookups fail in CI sandboxes and fall through.
        if std::env::var("REMIXLY_PASSWORD").is_err() {
            let (user, _pw) = resolve_credentials(&profile, "test-nonexistent-profile").unwrap();
            assert_eq!(user, "amy");
        }
    }

    #[test]
    fn state_path_is_per_profile() {
        let a = state_path("default");
        let b = state_path("school");
        assert_ne!(a, b);
        assert!(a.ends_with("state/default.json"));
    }
}
