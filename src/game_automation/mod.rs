// Game automation module
// Perception-gated actions (wait for a text or image target, then tap it),
// the task scripts built from them, a fail-fast task runner and a periodic
// scheduler on top.

pub mod backends;
pub mod diagnostics;
pub mod dispatcher;
pub mod error;
pub mod match_engine;
pub mod match_image;
pub mod ocr;
pub mod poll;
pub mod runner;
pub mod scheduler;
pub mod task;
pub mod tasks;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export the main types and functions for easy access
pub use backends::{PollHook, ScreenDevice, TapHook, TemplateMatcher, TextRecognizer};
pub use diagnostics::dump_screen_text;
pub use error::{AutomationError, AutomationResult};
pub use match_engine::{DebounceLatch, MatchEngine};
pub use match_image::TemplateLibrary;
pub use ocr::TesseractRecognizer;
pub use runner::{RunReport, TaskRunner};
pub use scheduler::{ScheduleStatus, Scheduler, format_countdown};
pub use task::{Task, TaskRegistry};
pub use tasks::crosscore_registry;
pub use types::{
    BoundingBox, Frame, ImageTarget, MatchMode, MatchResult, Point, TargetDefaults, TaskSet, TextBox,
    TextTarget,
};
