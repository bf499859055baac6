// Mirror arena: keep fighting weak opponents until the daily attempts run out
use crate::game_automation::error::{AutomationError, AutomationResult};
use crate::game_automation::match_engine::MatchEngine;
use crate::game_automation::task::Task;
use crate::game_automation::types::{BoundingBox, Point, TextBox};
use async_trait::async_trait;
use std::time::Duration;

/// Where the first opponent's combat power is printed.
pub const OPPONENT_POWER_REGION: BoundingBox = BoundingBox::from_rect(1022, 150, 82, 23);
/// Opponents above this are skipped with a list refresh.
pub const MAX_OPPONENT_POWER: u32 = 30_000;
/// Back arrow of the "out of attempts" dialog.
const DIALOG_BACK: Point = Point::new(220, 50);

pub struct Exercise;

/// Reads the opponent power from a recognized string such as `31,250`.
pub fn parse_power(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn opponent_power(boxes: &[TextBox]) -> AutomationResult<(u32, Point)> {
    let first = boxes.first().ok_or_else(|| AutomationError::TargetMissing {
        target: "opponent power".to_string(),
    })?;
    let power = parse_power(&first.text).ok_or_else(|| AutomationError::UnreadableValue {
        text: first.text.clone(),
    })?;
    Ok((power, first.center()))
}

#[async_trait]
impl Task for Exercise {
    fn name(&self) -> &str {
        "exercise"
    }

    fn label(&self) -> &str {
        "演习"
    }

    async fn run(&self, engine: &mut MatchEngine) -> AutomationResult<()> {
        let t = engine.targets();
        engine.click_text(&t.exact("出击")).await?;
        engine.click_text(&t.exact("模拟军演")).await?;
        engine.click_text(&t.exact("镜像竞技")).await?;

        let mut round = 0u32;
        loop {
            round += 1;
            tokio::time::sleep(Duration::from_secs(2)).await;

            let boxes = engine.read_text(Some(OPPONENT_POWER_REGION)).await?;
            let (power, at) = opponent_power(&boxes)?;
            log::info!("⚔️ Round {}: opponent power {}", round, power);

            if power > MAX_OPPONENT_POWER {
                engine.clear_latch();
                engine
                    .click_image(&t.image("refresh").with_threshold(0.6))
                    .await?;
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }

            engine.tap(at, Duration::ZERO).await?;
            if engine
                .find_text(&t.contains("今日可购买的模拟次数"))
                .await
                .is_found()
            {
                log::info!("🏁 No attempts left after {} rounds", round);
                engine.tap(DIALOG_BACK, Duration::ZERO).await?;
                engine.clear_latch();
                engine.click_image(&t.image("home")).await?;
                return Ok(());
            }

            engine.click_text(&t.exact("挑战")).await?;
            engine
                .click_text(
                    &t.exact("战斗胜利")
                        .with_timeout(Duration::from_secs(120))
                        .with_settle_delay(Duration::from_secs(2)),
                )
                .await?;
            engine.click_text(&t.exact("获得物品")).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_power() {
        assert_eq!(parse_power("31250"), Some(31250));
        assert_eq!(parse_power("31,250"), Some(31250));
        assert_eq!(parse_power(" 28 000 "), Some(28000));
        assert_eq!(parse_power("战力"), None);
        assert_eq!(parse_power(""), None);
    }

    #[test]
    fn test_opponent_power_uses_first_box() {
        let boxes = vec![
            TextBox::new("29800", BoundingBox::new(1030, 152, 1090, 170)),
            TextBox::new("99999", BoundingBox::new(0, 0, 10, 10)),
        ];
        let (power, at) = opponent_power(&boxes).unwrap();
        assert_eq!(power, 29800);
        assert_eq!(at, Point::new(1060, 161));
    }

    #[test]
    fn test_empty_read_is_an_error() {
        assert!(matches!(
            opponent_power(&[]),
            Err(AutomationError::TargetMissing { .. })
        ));
    }
}
