//! Shared helpers for command handlers.

use std::io::{self, IsTerminal, Read};

use remixly_core::{Controller, DEFAULT_SHARE_BASE_URL, NextAction};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Re-read the session when a stored login cookie exists.
///
/// Without a cookie the backend can only answer "guest", so the call is
/// skipped. Failures fall back to the cached session with a warning.
pub async fn sync_session(controller: &mut Controller) {
    if controller.state().session_cookie.is_none() {
        return;
    }
    if let Err(e) = controller.refresh_session().await {
        tracing::warn!(error = %e, "could not refresh session, showing cached state");
    }
}

/// Human-readable suggestion for a follow-up action.
pub fn next_action_hint(next: NextAction, share_base: Option<&str>) -> String {
    match next {
        NextAction::None => String::new(),
        NextAction::OpenLogin => "Log in with: remixly login".into(),
        NextAction::OpenCourse => format!(
            "Finish the course first: {}/course.html",
            share_base.unwrap_or(DEFAULT_SHARE_BASE_URL).trim_end_matches('/')
        ),
        NextAction::ChooseUpgrade => "Upgrade with: remixly subscribe <subscription-id>\n\
             Or watch ads for 24h of Premium: remixly ads watch"
            .into(),
        NextAction::ChooseSignUpOrAds => "Log in or sign up with: remixly login\n\
             Or watch ads for 24h of Premium: remixly ads watch"
            .into(),
    }
}

/// Print the hint for `next` to stderr, if there is one.
pub fn print_next(controller: &Controller, next: NextAction, global: &GlobalOpts) {
    let hint = next_action_hint(next, Some(&controller.config().share_base_url));
    if !hint.is_empty() {
        output::print_note(&hint, global.quiet);
    }
}

/// Read all of stdin, refusing to block on an interactive terminal.
pub fn read_stdin(what: &str) -> Result<String, CliError> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(CliError::Validation {
            field: what.into(),
            reason: "nothing given; pass it as an argument or pipe it on stdin".into(),
        });
    }
    let mut buf = String::new();
    stdin.read_to_string(&mut buf)?;
    Ok(buf)
}
