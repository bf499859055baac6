// Last successfully connected device, remembered across runs
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const RECORD_DIR: &str = ".crosscore-adb-run";
const RECORD_FILE: &str = "device.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub last_device: Option<String>,
}

impl DeviceRecord {
    /// `~/.crosscore-adb-run/device.json`, or `None` without a home directory.
    pub fn default_path() -> Option<PathBuf> {
        homedir::my_home()
            .ok()
            .flatten()
            .map(|home| home.join(RECORD_DIR).join(RECORD_FILE))
    }

    /// A missing or unreadable record reads as empty.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("⚠️ Could not read {}: {}", path.display(), e);
                return Self::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("⚠️ Ignoring corrupt device record {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Records `device` as the last one used and persists the record.
    pub fn remember(path: &Path, device: &str) -> std::io::Result<()> {
        let record = DeviceRecord {
            last_device: Some(device.to_string()),
        };
        record.save(path)?;
        log::debug!("💾 Remembered device {} in {}", device, path.display());
        Ok(())
    }
}
