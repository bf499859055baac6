//! The CrossCore task script: one `Task` per unit of daily progress.
//!
//! Coordinates and reference images are authored for one fixed device
//! resolution; nothing here scales them.

mod daily;
mod exercise;
mod start;

pub use daily::DailyRewards;
pub use exercise::{Exercise, MAX_OPPONENT_POWER, OPPONENT_POWER_REGION, parse_power};
pub use start::StartGame;

use super::task::TaskRegistry;
use super::types::Point;
use std::sync::Arc;

/// Empty spot on the reward screens; tapping it dismisses the reward popup.
pub const BLANK_POINT: Point = Point::new(600, 500);

pub const DEFAULT_GAME_PACKAGE: &str = "com.megagame.crosscore.bilibili";

/// Registry in display order: `start`, `task`, `exercise`.
pub fn crosscore_registry(package: &str) -> TaskRegistry {
    TaskRegistry::new()
        .with(Arc::new(StartGame::new(package)))
        .with(Arc::new(DailyRewards))
        .with(Arc::new(Exercise))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_and_labels() {
        let registry = crosscore_registry(DEFAULT_GAME_PACKAGE);
        assert_eq!(registry.names(), vec!["start", "task", "exercise"]);
        assert_eq!(registry.get("task").unwrap().label(), "领取日常任务");
        assert!(registry.get("launch").is_none());
    }
}
