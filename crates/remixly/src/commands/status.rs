//! `remixly status`: session, plan and remaining uses.

use remixly_core::{Controller, StatusSnapshot};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Palette};

use super::util;

fn detail(snap: &StatusSnapshot, palette: Palette) -> String {
    let account = if snap.logged_in {
        palette.good(&format!("logged in ({})", snap.role))
    } else {
        palette.muted("guest")
    };
    let plan = if snap.subscriber {
        palette.accent("Premium")
    } else if snap.effectively_premium {
        palette.accent("Premium (ads)")
    } else {
        "Free".to_owned()
    };

    let mut pairs = vec![
        ("Account", account),
        ("Plan", plan),
        ("Uses", snap.uses.to_string()),
    ];
    if let Some(ref remaining) = snap.ad_premium_remaining {
        pairs.push(("Ad premium", remaining.clone()));
    } else if !snap.subscriber {
        pairs.push((
            "Ads today",
            format!("{}/{}", snap.ads_watched_today, snap.ads_required),
        ));
    }
    if snap.logged_in {
        let course = if snap.course_completed {
            palette.good("completed")
        } else {
            palette.bad("not completed")
        };
        pairs.push(("Course", course));
    }
    pairs.push((
        "Tool",
        snap.current_tool
            .as_ref()
            .map_or_else(|| palette.muted("(none)"), ToString::to_string),
    ));
    if let Some(ref code) = snap.referral_code {
        pairs.push(("Referral", code.clone()));
    }
    if let Some(ref by) = snap.referred_by {
        pairs.push(("Invited with", by.clone()));
    }
    pairs.push(("Backend", palette.muted(&snap.backend)));
    output::detail_block(&pairs)
}

pub async fn handle(controller: &mut Controller, global: &GlobalOpts) -> Result<(), CliError> {
    util::sync_session(controller).await;

    let snap = controller.status();
    let palette = Palette::new(&global.color);
    let out = output::render_single(
        &global.output,
        &snap,
        |s| detail(s, palette),
        |s| s.uses.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use remixly_core::{Role, UsesDisplay};

    use super::*;
    use crate::cli::ColorMode;

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot {
            logged_in: false,
            role: Role::Guest,
            subscriber: false,
            effectively_premium: false,
            course_completed: false,
            uses: UsesDisplay::Guest { count: 2 },
            guest_uses_remaining: 2,
            ads_watched_today: 1,
            ads_required: 5,
            ad_premium_expires_at: None,
            ad_premium_remaining: None,
            current_tool: None,
            referral_code: None,
            referred_by: None,
            backend: "https://back.example/".into(),
        }
    }

    #[test]
    fn guest_detail_shows_ad_progress() {
        let out = detail(&snapshot(), Palette::new(&ColorMode::Never));
        assert!(out.contains("guest"));
        assert!(out.contains("2 free trial left"));
        assert!(out.contains("1/5"));
        assert!(!out.contains("Course"));
    }

    #[test]
    fn ad_premium_replaces_progress() {
        let snap = StatusSnapshot {
            effectively_premium: true,
            ad_premium_remaining: Some("23h remaining".into()),
            ..snapshot()
        };
        let out = detail(&snap, Palette::new(&ColorMode::Never));
        assert!(out.contains("Premium (ads)"));
        assert!(out.contains("23h remaining"));
        assert!(!out.contains("Ads today"));
    }

    #[test]
    fn incoming_referral_is_shown() {
        let snap = StatusSnapshot {
            referred_by: Some("BOB7".into()),
            ..snapshot()
        };
        let out = detail(&snap, Palette::new(&ColorMode::Never));
        assert!(out.contains("Invited with"));
        assert!(out.contains("BOB7"));
    }
}
