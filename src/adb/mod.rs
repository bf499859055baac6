// ADB module - device discovery, screen capture and touch injection
// Two interchangeable implementations: the `adb` binary and the ADB server protocol.

pub mod backend;
pub mod error;
pub mod rust_impl;
pub mod shell;
pub mod types;


// Re-export the main types and functions for easy access
pub use backend::{AdbBackend, select_device};
pub use error::{AdbError, AdbResult};
pub use types::{AdbClient, Device, ImageCapture};
