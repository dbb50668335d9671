//! `remixly ads`: the watch-ads path to 24 hours of Premium.
//!
//! Ads are tracked locally; nothing here talks to the backend.

use serde::Serialize;

use remixly_core::{AdOutcome, AdWatchOutcome, Controller, StatusSnapshot};

use crate::cli::{AdsArgs, AdsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Palette};

#[derive(Serialize)]
struct AdProgress {
    watched_today: u32,
    required: u32,
    premium_active: bool,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
    remaining: Option<String>,
}

impl From<&StatusSnapshot> for AdProgress {
    fn from(s: &StatusSnapshot) -> Self {
        Self {
            watched_today: s.ads_watched_today,
            required: s.ads_required,
            premium_active: s.ad_premium_expires_at.is_some(),
            expires_at: s.ad_premium_expires_at,
            remaining: s.ad_premium_remaining.clone(),
        }
    }
}

fn describe(progress: &AdProgress, palette: Palette) -> String {
    match progress.remaining {
        Some(ref remaining) => format!("{} {remaining}", palette.accent("Premium (ads) active:")),
        None => format!(
            "Ads watched today: {}/{}",
            progress.watched_today, progress.required
        ),
    }
}

pub fn handle(controller: &mut Controller, args: AdsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let palette = Palette::new(&global.color);
    match args.command {
        AdsCommand::Watch => {
            let outcome = controller.watch_ad()?;
            let out = output::render_single(
                &global.output,
                &outcome,
                |o| match o {
                    AdWatchOutcome::AlreadyActive { .. } => {
                        let progress = AdProgress::from(&controller.status());
                        format!("Premium is already unlocked. {}", describe(&progress, palette))
                    }
                    AdWatchOutcome::Recorded {
                        outcome: AdOutcome::AdsRemaining { remaining },
                    } => {
                        let noun = if *remaining == 1 { "ad" } else { "ads" };
                        format!("✓ Ad recorded. {remaining} more {noun} to unlock 24h of Premium.")
                    }
                    AdWatchOutcome::Recorded {
                        outcome: AdOutcome::PremiumGranted { .. },
                    } => palette.good("✓ Premium unlocked for 24 hours!"),
                },
                |o| match o {
                    AdWatchOutcome::AlreadyActive { .. } => "already_active".into(),
                    AdWatchOutcome::Recorded {
                        outcome: AdOutcome::AdsRemaining { remaining },
                    } => remaining.to_string(),
                    AdWatchOutcome::Recorded {
                        outcome: AdOutcome::PremiumGranted { .. },
                    } => "premium_granted".into(),
                },
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
        AdsCommand::Status => {
            let progress = AdProgress::from(&controller.status());
            let out = output::render_single(
                &global.output,
                &progress,
                |p| describe(p, palette),
                |p| p.watched_today.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
