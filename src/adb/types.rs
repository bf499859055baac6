// Core ADB types and traits
use super::error::AdbResult;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ImageCapture {
    pub bytes: Vec<u8>,
    pub duration_ms: u128,
}

// Trait defining ADB capabilities (shell or rust implementations)
#[allow(async_fn_in_trait)]
pub trait AdbClient: Send + Sync {
    async fn list_devices() -> AdbResult<Vec<Device>>
    where
        Self: Sized;
    async fn new_with_device(device_name: &str) -> AdbResult<Self>
    where
        Self: Sized;

    // Raw backend-specific capture, PNG encoded
    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>>;

    async fn screen_capture(&self) -> AdbResult<ImageCapture> {
        let start = std::time::Instant::now();
        let bytes = self.screen_capture_bytes().await?;
        Ok(ImageCapture {
            bytes,
            duration_ms: start.elapsed().as_millis(),
        })
    }

    async fn tap(&self, x: u32, y: u32) -> AdbResult<()>;
    async fn start_app(&self, package: &str) -> AdbResult<()>;
    fn screen_dimensions(&self) -> (u32, u32);
    fn device_name(&self) -> &str;
}

/// One row of the device listing: serial plus the state adb reports for it.
#[derive(Debug, PartialEq, Eq, Serialize, Clone)]
pub struct Device {
    pub name: String,
    pub status: String,
}

impl Device {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    /// Only fully authorized devices can be driven.
    pub fn is_ready(&self) -> bool {
        self.status == "device"
    }
}

/// Parses `Physical size: 1080x2280` out of `wm size` output.
/// An `Override size:` line, when present, wins because it is what input events use.
pub fn parse_screen_size(stdout: &str) -> Option<(u32, u32)> {
    let mut physical = None;
    for line in stdout.lines() {
        let line = line.trim();
        let (is_override, size_str) = if let Some(rest) = line.strip_prefix("Override size: ") {
            (true, rest)
        } else if let Some(rest) = line.strip_prefix("Physical size: ") {
            (false, rest)
        } else {
            continue;
        };
        let parts: Vec<&str> = size_str.trim().split('x').collect();
        if parts.len() == 2
            && let (Ok(x), Ok(y)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>())
        {
            if is_override {
                return Some((x, y));
            }
            physical = Some((x, y));
        }
    }
    physical
}
