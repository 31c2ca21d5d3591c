use super::AppContext;
use crate::libs::messages::Message;
use crate::libs::remote::{BreakSettingsUpdate, SessionStore};
use crate::libs::view::View;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Minutes of work between break suggestions (0 disables)
    #[arg(long)]
    every: Option<u32>,

    /// Default break length in minutes
    #[arg(long)]
    duration: Option<u32>,

    /// Minutes paused before the long-pause prompt (0 disables)
    #[arg(long)]
    long_pause: Option<u32>,
}

pub async fn cmd(args: SettingsArgs) -> Result<()> {
    let ctx = AppContext::load()?;
    let user_id = ctx.require_user()?;

    let update = BreakSettingsUpdate {
        break_every_mins: args.every,
        break_duration_mins: args.duration,
        long_pause_mins: args.long_pause,
    };

    let mut settings = ctx.store.fetch_break_settings(&user_id).await?.unwrap_or_default();

    if !update.is_empty() {
        settings.apply(&update);
        ctx.store.save_break_settings(&user_id, &settings)?;
        msg_success!(Message::SettingsSaved);
    }

    View::settings(&settings);
    Ok(())
}
