//! Account commands: subscription, contact form, referrals.

use remixly_core::{ContactForm, Controller};

use crate::cli::{ContactArgs, GlobalOpts, SubscribeArgs};
use crate::error::CliError;
use crate::output;

pub async fn subscribe(
    controller: &mut Controller,
    args: SubscribeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = controller.update_subscription(&args.subscription_id).await?;
    let msg = if session.is_subscriber() {
        "✓ Subscription active. Enjoy Premium!"
    } else {
        "✓ Subscription recorded. It may take a moment to show up on your account."
    };
    output::print_note(msg, global.quiet);
    Ok(())
}

pub async fn contact(
    controller: &mut Controller,
    args: ContactArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let form = ContactForm {
        name: args.name,
        email: args.email,
        message: args.message,
    };
    controller.submit_contact(&form).await?;
    output::print_note("✓ Message sent. Thanks for reaching out!", global.quiet);
    Ok(())
}

pub async fn referral(controller: &mut Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let referral = controller.referral().await?;
    let out = output::render_single(
        &global.output,
        &referral,
        |r| {
            let count = |n: Option<u32>| n.map_or_else(|| "-".into(), |n| n.to_string());
            let mut pairs = vec![
                ("Code", r.code.clone()),
                ("Share link", r.link.clone()),
                ("Referrals", count(r.referral_count)),
                (
                    "Pending rewards",
                    r.pending_rewards
                        .map_or_else(|| "-".into(), |n| format!("{n} months free")),
                ),
            ];
            if let Some(ref by) = r.referred_by {
                pairs.push(("Invited with", by.clone()));
            }
            output::detail_block(&pairs)
        },
        |r| r.link.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn accept_referral(
    controller: &mut Controller,
    code: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let code = controller.accept_referral(code)?;
    output::print_note(&format!("✓ Referral code {code} saved"), global.quiet);
    Ok(())
}
