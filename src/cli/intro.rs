// src/cli/intro.rs — One-shot week introduction

use crate::content::WeekId;
use crate::session::{ConversationState, SessionController};

pub async fn run_intro(controller: &SessionController, week: WeekId) -> anyhow::Result<()> {
    let mut state = ConversationState::new();
    controller.select_week(&mut state, week).await?;

    let intro = controller.get_or_generate_week_intro(&mut state).await;
    if intro.is_empty() {
        anyhow::bail!("could not generate the introduction for week {week}");
    }

    println!("{}", serde_json::to_string_pretty(&intro)?);
    Ok(())
}
