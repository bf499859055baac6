use super::error::AdbResult;
use super::rust_impl::RustAdb;
use super::shell::AdbShell;
use super::types::{AdbClient, Device, ImageCapture};

pub enum AdbBackend {
    Shell(AdbShell),
    Rust(RustAdb),
}

impl AdbBackend {
    pub async fn list_devices(use_rust: bool) -> AdbResult<Vec<Device>> {
        if use_rust {
            RustAdb::list_devices().await
        } else {
            AdbShell::list_devices().await
        }
    }

    pub async fn new_with_device(name: &str, use_rust: bool) -> AdbResult<Self> {
        if use_rust {
            Ok(AdbBackend::Rust(RustAdb::new_with_device(name).await?))
        } else {
            Ok(AdbBackend::Shell(AdbShell::new_with_device(name).await?))
        }
    }

    pub fn device_name(&self) -> &str {
        match self {
            AdbBackend::Shell(s) => s.device_name(),
            AdbBackend::Rust(r) => r.device_name(),
        }
    }

    pub fn screen_dimensions(&self) -> (u32, u32) {
        match self {
            AdbBackend::Shell(s) => s.screen_dimensions(),
            AdbBackend::Rust(r) => r.screen_dimensions(),
        }
    }

    pub async fn screen_capture(&self) -> AdbResult<ImageCapture> {
        match self {
            AdbBackend::Shell(s) => <AdbShell as AdbClient>::screen_capture(s).await,
            AdbBackend::Rust(r) => <RustAdb as AdbClient>::screen_capture(r).await,
        }
    }

    pub async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>> {
        match self {
            AdbBackend::Shell(s) => s.screen_capture_bytes().await,
            AdbBackend::Rust(r) => r.screen_capture_bytes().await,
        }
    }

    pub async fn tap(&self, x: u32, y: u32) -> AdbResult<()> {
        match self {
            AdbBackend::Shell(s) => s.tap(x, y).await,
            AdbBackend::Rust(r) => r.tap(x, y).await,
        }
    }

    pub async fn start_app(&self, package: &str) -> AdbResult<()> {
        match self {
            AdbBackend::Shell(s) => s.start_app(package).await,
            AdbBackend::Rust(r) => r.start_app(package).await,
        }
    }
}

/// Picks the device to connect to: an explicit request wins, then the
/// last-used device if it is still attached, then the first ready device.
pub fn select_device(
    devices: &[Device],
    requested: Option<&str>,
    last_used: Option<&str>,
) -> Option<String> {
    let ready: Vec<&Device> = devices.iter().filter(|d| d.is_ready()).collect();
    if let Some(name) = requested {
        return ready.iter().find(|d| d.name == name).map(|d| d.name.clone());
    }
    if let Some(name) = last_used
        && let Some(device) = ready.iter().find(|d| d.name == name)
    {
        return Some(device.name.clone());
    }
    ready.first().map(|d| d.name.clone())
}
