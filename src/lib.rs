pub mod adb;
pub mod args;
pub mod config;
pub mod device_record;
pub mod game_automation;

pub use adb::AdbBackend;
pub use config::AutomationConfig;
pub use game_automation::{MatchEngine, Scheduler, TaskRunner};
