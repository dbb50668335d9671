//! Command dispatch: bridges CLI args -> core Controller -> output formatting.

pub mod account;
pub mod ads;
pub mod config_cmd;
pub mod features;
pub mod history;
pub mod remix;
pub mod session;
pub mod status;
pub mod util;

use remixly_core::Controller;

use crate::cli::{Command, GlobalOpts, HistoryCommand, ReferralCommand};
use crate::config::ResolvedProfile;
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &mut Controller,
    profile: &ResolvedProfile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(controller, global).await,
        Command::Login(args) => session::login(controller, profile, args, global).await,
        Command::Logout => session::logout(controller, global).await,
        Command::Remix(args) => remix::handle(controller, args, global).await,
        Command::Features => features::list(controller, global).await,
        Command::Tool(args) => features::tool(controller, args, global).await,
        Command::History(args) => match args.command.unwrap_or(HistoryCommand::List) {
            HistoryCommand::List => history::list(controller, global).await,
            HistoryCommand::Show { index } => history::show(controller, index, global).await,
        },
        Command::Ads(args) => ads::handle(controller, args, global),
        Command::Subscribe(args) => account::subscribe(controller, args, global).await,
        Command::Contact(args) => account::contact(controller, args, global).await,
        Command::Referral(args) => match args.command.unwrap_or(ReferralCommand::Show) {
            ReferralCommand::Show => account::referral(controller, global).await,
            ReferralCommand::Accept { code } => account::accept_referral(controller, &code, global),
        },
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
