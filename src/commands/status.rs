use super::{print_status, AppContext};
use crate::libs::messages::Message;
use crate::{msg_info, msg_warning};
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    let ctx = AppContext::load()?;
    let mut timer = ctx.timer().await?;
    timer.tick();
    let snapshot = timer.snapshot();

    print_status(&ctx, &snapshot);
    for prompt in snapshot.prompts.visible() {
        msg_info!(Message::PromptVisible(prompt.to_string()));
    }
    if snapshot.remote_failures > 0 {
        msg_warning!(Message::RemoteFailures(snapshot.remote_failures));
    }

    Ok(())
}
