// https://crates.io/crates/adb_client
use super::error::{AdbError, AdbResult};
use super::types::{AdbClient, Device, parse_screen_size};
use adb_client::{ADBDeviceExt, ADBServer, ADBServerDevice};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// ADB backend talking to the local ADB server over its socket protocol.
pub struct RustAdb {
    device: Device,
    server_device: Arc<Mutex<ADBServerDevice>>,
    screen_x: u32,
    screen_y: u32,
}

impl RustAdb {
    /// Runs a device shell command on the blocking pool so the timeout can fire
    /// even when the USB link hangs.
    async fn shell(&self, args: Vec<String>, timeout: Duration) -> AdbResult<Vec<u8>> {
        let server_device = Arc::clone(&self.server_device);
        let command = args.join(" ");
        let task_command = command.clone();
        let task = tokio::task::spawn_blocking(move || -> AdbResult<Vec<u8>> {
            let mut out: Vec<u8> = Vec::new();
            let refs: Vec<&str> = args.iter().map(String::as_str).collect();
            let mut dev = server_device.blocking_lock();
            dev.shell_command(&refs, &mut out)
                .map_err(|source| AdbError::Server {
                    command: task_command,
                    source,
                })?;
            Ok(out)
        });

        match tokio::time::timeout(timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(AdbError::Timeout {
                duration: timeout,
                description: command,
            }),
        }
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

impl AdbClient for RustAdb {
    async fn list_devices() -> AdbResult<Vec<Device>> {
        let mut server = ADBServer::default();
        let device_list = tokio::task::spawn_blocking(move || server.devices())
            .await?
            .map_err(|source| AdbError::Server {
                command: "devices".to_string(),
                source,
            })?;
        Ok(device_list
            .into_iter()
            .map(|d| Device::new(d.identifier, format!("{:?}", d.state).to_lowercase()))
            .collect())
    }

    async fn new_with_device(device_name: &str) -> AdbResult<Self> {
        let name = device_name.to_string();
        let server_device = tokio::task::spawn_blocking(move || {
            let mut server = ADBServer::default();
            server.get_device_by_name(&name)
        })
        .await?
        .map_err(|source| AdbError::Server {
            command: format!("open {device_name}"),
            source,
        })?;

        let mut adb = RustAdb {
            device: Device::new(device_name, "device"),
            server_device: Arc::new(Mutex::new(server_device)),
            screen_x: 0,
            screen_y: 0,
        };
        let out = adb
            .shell(owned(&["wm", "size"]), Duration::from_secs(5))
            .await?;
        let (sx, sy) =
            parse_screen_size(&String::from_utf8_lossy(&out)).ok_or(AdbError::ScreenSizeParseFailed)?;
        adb.screen_x = sx;
        adb.screen_y = sy;
        Ok(adb)
    }

    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>> {
        self.shell(owned(&["screencap", "-p"]), Duration::from_secs(10))
            .await
    }

    async fn tap(&self, x: u32, y: u32) -> AdbResult<()> {
        self.shell(
            vec![
                "input".to_string(),
                "tap".to_string(),
                x.to_string(),
                y.to_string(),
            ],
            Duration::from_secs(5),
        )
        .await?;
        Ok(())
    }

    async fn start_app(&self, package: &str) -> AdbResult<()> {
        self.shell(
            owned(&[
                "monkey",
                "-p",
                package,
                "-c",
                "android.intent.category.LAUNCHER",
                "1",
            ]),
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
