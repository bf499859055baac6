use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB-related operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error(
        "'adb' binary not found in PATH. Install Android Platform Tools or use --impl=rust for the ADB server backend."
    )]
    AdbNotInstalled,

    #[error("Failed to invoke '{program}': {source}")]
    SpawnFailed {
        program: String,
        source: std::io::Error,
    },

    #[error("Command '{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("ADB server request '{command}' failed: {source}")]
    Server {
        command: String,
        source: adb_client::RustADBError,
    },

    #[error("No devices available")]
    NoDevices,

    #[error("Device '{name}' not found")]
    DeviceNotFound { name: String },

    #[error("Could not parse screen size from 'wm size' output")]
    ScreenSizeParseFailed,

    #[error("Operation timed out after {duration:?}: {description}")]
    Timeout {
        duration: std::time::Duration,
        description: String,
    },

    #[error("Task failed to complete: {source}")]
    JoinError {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl AdbError {
    /// Errors that mean the device went away rather than a single command misbehaving.
    pub fn is_disconnect(&self) -> bool {
        match self {
            AdbError::Timeout { .. } | AdbError::NoDevices | AdbError::DeviceNotFound { .. } => {
                true
            }
            AdbError::CommandFailed { stderr, .. } => {
                let lower = stderr.to_lowercase();
                lower.contains("offline")
                    || lower.contains("not found")
                    || lower.contains("no devices")
            }
            _ => false,
        }
    }
}
