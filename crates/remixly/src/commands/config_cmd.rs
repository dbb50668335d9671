//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

const SETTABLE_KEYS: &str = "backend, username, password_env, access_code, ca_cert, insecure, \
                             timeout, share_base_url, wake_retries, premium_only, guest_allowed, \
                             require_course_completion";

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    if !cfg.policy.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "[policy]");
        write_policy(&mut out, &cfg.policy);
    }

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(ref b) = p.backend {
            let _ = writeln!(out, "backend = \"{b}\"");
        }
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if p.access_code.is_some() {
            let _ = writeln!(out, "access_code = \"****\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref share) = p.share_base_url {
            let _ = writeln!(out, "share_base_url = \"{share}\"");
        }
        if let Some(retries) = p.wake_retries {
            let _ = writeln!(out, "wake_retries = {retries}");
        }
        if !p.policy.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "[profiles.{name}.policy]");
            write_policy(&mut out, &p.policy);
        }
    }

    out
}

fn write_policy(out: &mut String, policy: &remixly_config::PolicyConfig) {
    use std::fmt::Write;
    let quoted = |list: &[String]| {
        list.iter()
            .map(|s| format!("\"{s}\""))
            .collect::<Vec<_>>()
            .join(", ")
    };
    if let Some(ref list) = policy.premium_only {
        let _ = writeln!(out, "premium_only = [{}]", quoted(list));
    }
    if let Some(ref list) = policy.guest_allowed {
        let _ = writeln!(out, "guest_allowed = [{}]", quoted(list));
    }
    if let Some(gate) = policy.require_course_completion {
        let _ = writeln!(out, "require_course_completion = {gate}");
    }
}

/// Mask secrets before structured output.
fn redact(mut cfg: Config) -> Config {
    for p in cfg.profiles.values_mut() {
        if p.password.is_some() {
            p.password = Some("****".into());
        }
        if p.access_code.is_some() {
            p.access_code = Some("****".into());
        }
    }
    cfg
}

/// Delegate to the shared config crate's save function.
fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_flag<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Split `profiles.<name>.<field>` into its parts; plain keys target the
/// active profile.
fn split_key<'a>(key: &'a str, active: &str) -> Result<(String, &'a str), CliError> {
    match key.strip_prefix("profiles.") {
        Some(rest) => match rest.split_once('.') {
            Some((name, field)) if !name.is_empty() && !field.is_empty() => {
                Ok((name.to_owned(), field))
            }
            _ => Err(CliError::Validation {
                field: key.into(),
                reason: "expected profiles.<name>.<field>".into(),
            }),
        },
        None => Ok((active.to_owned(), key)),
    }
}

/// Apply one `config set` assignment to a profile.
fn set_profile_field(profile: &mut Profile, field: &str, value: String) -> Result<(), CliError> {
    match field {
        "backend" => {
            remixly_config::parse_backend_url(&value)?;
            profile.backend = Some(value);
        }
        "username" => profile.username = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "access_code" | "access-code" => profile.access_code = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => profile.insecure = Some(parse_flag(field, &value, "'true' or 'false'")?),
        "timeout" => profile.timeout = Some(parse_flag(field, &value, "a number (seconds)")?),
        "share_base_url" | "share-base-url" => {
            remixly_config::parse_backend_url(&value).map_err(|_| CliError::Validation {
                field: field.into(),
                reason: format!("invalid URL: {value}"),
            })?;
            profile.share_base_url = Some(value);
        }
        "wake_retries" | "wake-retries" => {
            profile.wake_retries = Some(parse_flag(field, &value, "a whole number")?);
        }
        "premium_only" | "premium-only" => profile.policy.premium_only = Some(parse_list(&value)),
        "guest_allowed" | "guest-allowed" => {
            profile.policy.guest_allowed = Some(parse_list(&value));
        }
        "require_course_completion" | "require-course-completion" => {
            profile.policy.require_course_completion =
                Some(parse_flag(field, &value, "'true' or 'false'")?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {SETTABLE_KEYS}"),
            });
        }
    }
    Ok(())
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let available: Vec<_> = cfg.profiles.keys().cloned().collect();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redact(config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let active = config::active_profile_name(global, &cfg);
            let (profile_name, field) = split_key(&key, &active)?;

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_field(profile, field, value)?;

            save_config(&cfg)?;
            output::print_note(&format!("✓ Set {field} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                output::print_note("No profiles configured. Run: remixly config init", global.quiet);
            } else {
                let lines: Vec<String> = cfg
                    .profiles
                    .keys()
                    .map(|name| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            output::print_note(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            remixly_config::store_password(&profile_name, &secret)?;
            output::print_note(
                &format!("✓ Password stored in system keyring for profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }
    }
}

/// Interactive wizard writing a single profile.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    if config_path.exists()
        && !util::confirm(
            &format!("Overwrite existing config at {}?", config_path.display()),
            global.yes,
        )?
    {
        return Ok(());
    }

    eprintln!("✨ remixly configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let backend: String = Input::new()
        .with_prompt("Backend URL")
        .default(remixly_core::DEFAULT_BACKEND_URL.into())
        .validate_with(|s: &String| {
            remixly_config::parse_backend_url(s)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Username (leave empty to stay a guest)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let mut password = None;
    if !username.is_empty() {
        let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
        if !secret.is_empty() {
            let choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
                "Don't store; ask at login",
            ];
            let selection = Select::new()
                .with_prompt("Where to store the password?")
                .items(choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            match selection {
                0 => {
                    remixly_config::store_password(&profile_name, &secret)?;
                    eprintln!("   ✓ Password stored in system keyring");
                }
                1 => password = Some(secret),
                _ => {}
            }
        }
    }

    let access_code: String = Input::new()
        .with_prompt("Class access code (optional)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let profile = Profile {
        backend: (backend != remixly_core::DEFAULT_BACKEND_URL).then_some(backend),
        username: (!username.is_empty()).then_some(username),
        password,
        access_code: (!access_code.is_empty()).then_some(access_code),
        ..Profile::default()
    };

    let mut cfg = Config {
        default_profile: Some(profile_name.clone()),
        ..Config::default()
    };
    cfg.profiles.insert(profile_name.clone(), profile);
    save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: remixly status");
    Ok(())
}
