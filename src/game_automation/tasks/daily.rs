// Claim the daily and weekly mission rewards
use super::BLANK_POINT;
use crate::game_automation::error::AutomationResult;
use crate::game_automation::match_engine::MatchEngine;
use crate::game_automation::task::Task;
use async_trait::async_trait;
use std::time::Duration;

const POPUP_DELAY: Duration = Duration::from_millis(500);

pub struct DailyRewards;

impl DailyRewards {
    async fn claim_tab(engine: &MatchEngine, tab: &str) -> AutomationResult<()> {
        let t = engine.targets();
        engine.click_text(&t.exact(tab)).await?;
        engine.click_text(&t.fuzzy("一键领取")).await?;
        tokio::time::sleep(POPUP_DELAY).await;
        engine.tap(BLANK_POINT, Duration::ZERO).await
    }
}

#[async_trait]
impl Task for DailyRewards {
    fn name(&self) -> &str {
        "task"
    }

    fn label(&self) -> &str {
        "领取日常任务"
    }

    async fn run(&self, engine: &mut MatchEngine) -> AutomationResult<()> {
        let t = engine.targets();
        engine.click_text(&t.exact("任务")).await?;
        Self::claim_tab(engine, "日常").await?;
        Self::claim_tab(engine, "周常").await?;
        tokio::time::sleep(POPUP_DELAY).await;
        engine.click_image(&t.image("home")).await?;
        Ok(())
    }
}
