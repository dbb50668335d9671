//! `remixly remix`: run one remix and print the result.

use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use remixly_core::{Controller, FeatureKind, RemixOutcome};

use crate::cli::{GlobalOpts, OutputFormat, RemixArgs};
use crate::error::CliError;
use crate::output;

use super::util;

/// Text from the argument, `--file`, or stdin (`-` or nothing given).
fn read_content(args: &RemixArgs) -> Result<String, CliError> {
    if let Some(ref path) = args.file {
        return Ok(std::fs::read_to_string(path)?);
    }
    match args.text.as_deref() {
        Some("-") | None => util::read_stdin("text"),
        Some(text) => Ok(text.to_owned()),
    }
}

/// Explicit `--style`, else the selected tool.
fn resolve_style(args: &RemixArgs, controller: &Controller) -> Result<FeatureKind, CliError> {
    args.style
        .as_deref()
        .map(FeatureKind::new)
        .or_else(|| controller.state().profile.current_tool.clone())
        .ok_or_else(|| CliError::Validation {
            field: "style".into(),
            reason: "no style given; pass --style or pick one with `remixly tool <style>`".into(),
        })
}

fn spinner(global: &GlobalOpts, style: &FeatureKind) -> ProgressBar {
    if global.quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        bar.set_style(template);
    }
    bar.set_message(format!("Remixing as {style}"));
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

pub async fn handle(
    controller: &mut Controller,
    args: RemixArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let content = read_content(&args)?;
    let style = resolve_style(&args, controller)?;
    util::sync_session(controller).await;
    if args.save && !controller.session().logged_in {
        return Err(CliError::LoginRequired {
            message: "Please log in to save remixes".into(),
        });
    }

    let bar = spinner(global, &style);
    let result = controller.remix(&style, &content).await;
    bar.finish_and_clear();

    let outcome = result?;
    let (text, uses, next) = match &outcome {
        RemixOutcome::Blocked {
            reason,
            message,
            next,
        } => {
            return Err(CliError::Blocked {
                reason: *reason,
                message: message.clone(),
                hint: util::next_action_hint(*next, Some(&controller.config().share_base_url)),
            });
        }
        RemixOutcome::Completed {
            output: text,
            uses,
            next,
        } => (text, *uses, *next),
    };

    match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            output::print_output(text, global.quiet);
            output::print_note(&format!("Uses: {uses}"), global.quiet);
        }
        _ => {
            let out = output::render_single(&global.output, &outcome, |_| String::new(), |_| {
                String::new()
            });
            output::print_output(&out, global.quiet);
        }
    }
    util::print_next(controller, next, global);

    if args.save {
        controller.save_remix(&style, &content, text).await?;
        output::print_note("✓ Saved to history", global.quiet);
    }
    Ok(())
}
