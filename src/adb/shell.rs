use super::error::{AdbError, AdbResult};
use super::types::{AdbClient, Device, parse_screen_size};
use std::time::Duration;
use tokio::process::Command;

const ADB: &str = "adb";
const TAP_TIMEOUT: Duration = Duration::from_secs(5);
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// ADB backend that drives the `adb` binary from Android Platform Tools.
pub struct AdbShell {
    pub device: Device,
    pub screen_x: u32,
    pub screen_y: u32,
}

impl AdbShell {
    fn ensure_adb_available() -> AdbResult<()> {
        match std::process::Command::new(ADB).arg("version").output() {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(AdbError::CommandFailed {
                command: "adb version".to_string(),
                stderr: format!("exit status {}", out.status),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AdbError::AdbNotInstalled),
            Err(e) => Err(AdbError::SpawnFailed {
                program: ADB.to_string(),
                source: e,
            }),
        }
    }

    /// Runs `adb -s <serial> <args..>` and returns stdout.
    async fn run_for_device(&self, args: &[&str], timeout: Duration) -> AdbResult<Vec<u8>> {
        let mut cmd = Command::new(ADB);
        cmd.arg("-s").arg(&self.device.name).args(args);
        let description = format!("adb -s {} {}", self.device.name, args.join(" "));
        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| AdbError::Timeout {
                duration: timeout,
                description: description.clone(),
            })?
            .map_err(|e| AdbError::SpawnFailed {
                program: ADB.to_string(),
                source: e,
            })?;
        if !output.status.success() {
            return Err(AdbError::CommandFailed {
                command: description,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    async fn get_screen_size(&self) -> AdbResult<(u32, u32)> {
        let out = self
            .run_for_device(&["shell", "wm", "size"], Duration::from_secs(5))
            .await?;
        parse_screen_size(&String::from_utf8_lossy(&out)).ok_or(AdbError::ScreenSizeParseFailed)
    }

    pub fn parse_devices(output: &str) -> Vec<Device> {
        output
            .lines()
            .skip(1)
            .filter_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 2 {
                    Some(Device::new(parts[0], parts[1]))
                } else {
                    None
                }
            })
            .collect()
    }
}

impl AdbClient for AdbShell {
    async fn list_devices() -> AdbResult<Vec<Device>> {
        Self::ensure_adb_available()?;
        let output = Command::new(ADB)
            .arg("devices")
            .output()
            .await
            .map_err(|e| AdbError::SpawnFailed {
                program: ADB.to_string(),
                source: e,
            })?;
        if !output.status.success() {
            return Err(AdbError::CommandFailed {
                command: "adb devices".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(Self::parse_devices(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn new_with_device(device_name: &str) -> AdbResult<Self> {
        let devices = Self::list_devices().await?;
        let device = devices
            .into_iter()
            .find(|d| d.name == device_name && d.is_ready())
            .ok_or_else(|| AdbError::DeviceNotFound {
                name: device_name.to_string(),
            })?;
        let mut shell = AdbShell {
            device,
            screen_x: 0,
            screen_y: 0,
        };
        let (sx, sy) = shell.get_screen_size().await?;
        shell.screen_x = sx;
        shell.screen_y = sy;
        Ok(shell)
    }

    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>> {
        self.run_for_device(&["exec-out", "screencap", "-p"], CAPTURE_TIMEOUT)
            .await
    }

    // `wm size` reports the natural orientation, so taps are not checked against it
    async fn tap(&self, x: u32, y: u32) -> AdbResult<()> {
        let xs = x.to_string();
        let ys = y.to_string();
        self.run_for_device(&["shell", "input", "tap", &xs, &ys], TAP_TIMEOUT)
            .await?;
        Ok(())
    }

    async fn start_app(&self, package: &str) -> AdbResult<()> {
        self.run_for_device(
            &[
                "shell",
                "monkey",
                "-p",
                package,
                "-c",
                "android.intent.category.LAUNCHER",
                "1",
            ],
            Duration::from_secs(10),
        )
        .await?;
        Ok(())
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        (self.screen_x, self.screen_y)
    }

    fn device_name(&self) -> &str {
        &self.device.name
    }
}
