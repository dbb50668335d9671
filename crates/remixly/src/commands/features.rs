//! `remixly features` and `remixly tool`.

use serde::Serialize;
use tabled::Tabled;

use remixly_core::{Controller, Decision, FeatureKind, FeatureTier};

use crate::cli::{GlobalOpts, ToolArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct FeatureEntry {
    style: FeatureKind,
    tier: FeatureTier,
    access: Decision,
    selected: bool,
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Style")]
    style: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Access")]
    access: String,
}

impl From<&FeatureEntry> for FeatureRow {
    fn from(f: &FeatureEntry) -> Self {
        let marker = if f.selected { " *" } else { "" };
        Self {
            style: format!("{}{marker}", f.style),
            tier: f.tier.to_string(),
            access: if f.access.is_allowed() {
                "available".into()
            } else {
                f.access.to_string()
            },
        }
    }
}

fn entries(controller: &Controller) -> Vec<FeatureEntry> {
    let current = controller.state().profile.current_tool.as_ref();
    controller
        .config()
        .policy
        .known_features()
        .into_iter()
        .map(|style| FeatureEntry {
            tier: controller.tier(&style),
            access: controller.check(&style),
            selected: current == Some(&style),
            style,
        })
        .collect()
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(controller: &mut Controller, global: &GlobalOpts) -> Result<(), CliError> {
    util::sync_session(controller).await;

    let all = entries(controller);
    let out = output::render_list(
        &global.output,
        &all,
        |f| FeatureRow::from(f),
        |f| f.style.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn tool(
    controller: &mut Controller,
    args: ToolArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let Some(style) = args.style else {
        let current = controller
            .state()
            .profile
            .current_tool
            .as_ref()
            .map_or_else(|| "(none)".to_owned(), ToString::to_string);
        output::print_output(&current, global.quiet);
        return Ok(());
    };

    // The cached session may be stale about the subscription.
    util::sync_session(controller).await;

    let style = FeatureKind::new(style);
    let decision = controller.select_tool(style.clone())?;
    if decision.is_allowed() {
        output::print_note(&format!("✓ Selected {style}"), global.quiet);
    } else {
        output::print_note(&format!("✓ Selected {style} ({decision})"), global.quiet);
        util::print_next(controller, decision.next_action(), global);
    }
    Ok(())
}
