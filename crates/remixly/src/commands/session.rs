//! `remixly login` / `remixly logout`.

use std::io::{self, BufRead, IsTerminal};

use dialoguer::Input;
use secrecy::SecretString;
use serde::Serialize;

use remixly_config::ConfigError;
use remixly_core::{Controller, CoreError, LoginRequest, NextAction, Role};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::ResolvedProfile;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct LoginSummary {
    username: String,
    role: Role,
    subscriber: bool,
    course_completed: bool,
    next: NextAction,
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn resolve_username(args: &LoginArgs, resolved: &ResolvedProfile) -> Result<String, CliError> {
    if let Some(name) = args.username.clone().or_else(|| resolved.profile.username.clone()) {
        return Ok(name);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NoCredentials {
            profile: resolved.name.clone(),
        });
    }
    Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(prompt_err)
}

/// `--password-stdin`, then the profile's credential chain, then a prompt.
fn resolve_password(args: &LoginArgs, resolved: &ResolvedProfile) -> Result<SecretString, CliError> {
    if args.password_stdin {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        return Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_owned()));
    }
    match remixly_config::resolve_password(&resolved.profile, &resolved.name) {
        Ok(pw) => Ok(pw),
        Err(ConfigError::NoCredentials { profile }) => {
            if !io::stdin().is_terminal() {
                return Err(CliError::NoCredentials { profile });
            }
            let pw = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            Ok(SecretString::from(pw))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    controller: &mut Controller,
    resolved: &ResolvedProfile,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let username = resolve_username(&args, resolved)?;
    let password = resolve_password(&args, resolved)?;
    let request = LoginRequest {
        username: username.clone(),
        password,
        access_code: args
            .access_code
            .clone()
            .or_else(|| resolved.profile.access_code.clone()),
        captcha_token: args.captcha_token.clone(),
    };

    let outcome = controller.login(&request).await.map_err(|e| match e {
        CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
            message,
            profile: resolved.name.clone(),
        },
        other => other.into(),
    })?;

    let summary = LoginSummary {
        username,
        role: outcome.session.role,
        subscriber: outcome.session.is_subscriber(),
        course_completed: outcome.session.course_completed,
        next: outcome.next,
    };
    let out = output::render_single(
        &global.output,
        &summary,
        |s| {
            let plan = if s.subscriber { "Premium" } else { "Free" };
            format!("✓ Logged in as {} ({}, {plan})", s.username, s.role)
        },
        |s| s.role.to_string(),
    );
    output::print_output(&out, global.quiet);
    util::print_next(controller, outcome.next, global);
    Ok(())
}

pub async fn logout(controller: &mut Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let confirmed = controller.logout().await?;
    if confirmed {
        output::print_note("✓ Logged out", global.quiet);
    } else {
        output::print_note(
            "✓ Logged out locally (the backend could not be reached to end the session)",
            global.quiet,
        );
    }
    Ok(())
}
