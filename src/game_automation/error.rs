use thiserror::Error;

/// A specialized `Result` type for automation operations.
pub type AutomationResult<T> = Result<T, AutomationError>;

/// Errors raised by the match engine, tasks, the task runner and the scheduler.
///
/// A target that never shows up during a poll is not an error; it is
/// reported as [`MatchResult::NotFound`](super::types::MatchResult).
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Screen capture failed: {0}")]
    Capture(String),

    #[error("Frame decoding failed: {0}")]
    Decode(String),

    #[error("Text recognition failed: {0}")]
    Recognition(String),

    #[error("Template '{image}' unavailable: {reason}")]
    Template { image: String, reason: String },

    #[error("Touch at ({x}, {y}) failed: {reason}")]
    Touch { x: u32, y: u32, reason: String },

    #[error("Launching '{package}' failed: {reason}")]
    Launch { package: String, reason: String },

    #[error("Required target '{target}' never appeared")]
    TargetMissing { target: String },

    #[error("Could not read a value from '{text}'")]
    UnreadableValue { text: String },

    #[error("Unknown task '{0}'")]
    UnknownTask(String),

    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: Box<AutomationError>,
    },

    #[error("Another task run is already in progress")]
    RunInProgress,

    #[error("No device connected")]
    NoDevice,

    #[error("No tasks selected")]
    EmptyTaskSet,

    #[error("Interval must be a positive, representable number of minutes, got {0}")]
    InvalidInterval(i64),

    #[error("Scheduler is already running")]
    AlreadyRunning,
}

impl AutomationError {
    /// Validation errors are reported to the caller before any state changes.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AutomationError::NoDevice
                | AutomationError::EmptyTaskSet
                | AutomationError::InvalidInterval(_)
                | AutomationError::AlreadyRunning
                | AutomationError::UnknownTask(_)
        )
    }
}
