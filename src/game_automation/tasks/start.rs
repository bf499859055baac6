// Launch the game and get past the login popups
use crate::game_automation::error::AutomationResult;
use crate::game_automation::match_engine::MatchEngine;
use crate::game_automation::task::Task;
use async_trait::async_trait;
use std::time::Duration;

pub struct StartGame {
    package: String,
}

impl StartGame {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

#[async_trait]
impl Task for StartGame {
    fn name(&self) -> &str {
        "start"
    }

    fn label(&self) -> &str {
        "启动游戏"
    }

    async fn run(&self, engine: &mut MatchEngine) -> AutomationResult<()> {
        let t = engine.targets();
        let close = t.image("x").with_threshold(0.6);

        engine.launch_app(&self.package).await?;
        // cold start plus update check can take minutes
        engine
            .click_text(&t.exact("开始游戏").with_timeout(Duration::from_secs(180)))
            .await?;

        engine
            .click_text(&t.fuzzy("今天不再提示").with_timeout(Duration::from_secs(50)))
            .await?;
        engine.click_image(&close).await?;

        engine
            .click_text(&t.fuzzy("今天不再提示").with_timeout(Duration::from_secs(10)))
            .await?;
        engine.clear_latch();
        engine.click_image(&close).await?;

        engine.click_text(&t.exact("签到")).await?;
        engine.clear_latch();
        engine
            .click_image(&t.image("break").with_threshold(0.6))
            .await?;
        Ok(())
    }
}
