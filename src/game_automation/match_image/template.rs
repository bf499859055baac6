//! Reference image loading and caching

use image::GrayImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A reference image, converted to grayscale for matching.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub path: PathBuf,
    pub image: Arc<GrayImage>,
}

impl Template {
    pub fn load(name: &str, path: PathBuf) -> Result<Self, String> {
        let image = image::open(&path)
            .map_err(|e| format!("Failed to load template {}: {e}", path.display()))?;
        let gray = image.to_luma8();
        if gray.width() == 0 || gray.height() == 0 {
            return Err(format!("Template {} is empty", path.display()));
        }
        Ok(Self {
            name: name.to_string(),
            path,
            image: Arc::new(gray),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Center tap coordinates for a match whose top-left corner is at `(x, y)`.
    pub fn tap_coordinates(&self, match_x: u32, match_y: u32) -> (u32, u32) {
        (match_x + self.width() / 2, match_y + self.height() / 2)
    }
}

/// Reference images addressed by id: `home` resolves to `<dir>/home.png`.
/// Each image is read from disk once and then served from memory.
pub struct TemplateLibrary {
    directory: PathBuf,
    cache: Mutex<HashMap<String, Template>>,
}

impl TemplateLibrary {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.png"))
    }

    pub fn get(&self, name: &str) -> Result<Template, String> {
        if let Ok(cache) = self.cache.lock()
            && let Some(template) = cache.get(name)
        {
            return Ok(template.clone());
        }
        let template = Template::load(name, self.path_for(name))?;
        log::debug!(
            "🖼️ Loaded template '{}' ({}x{})",
            name,
            template.width(),
            template.height()
        );
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(name.to_string(), template.clone());
        }
        Ok(template)
    }

    /// Names of the `.png` files in the library directory, sorted.
    pub fn available(&self) -> Result<Vec<String>, String> {
        let entries = std::fs::read_dir(&self.directory)
            .map_err(|e| format!("Failed to read directory {}: {e}", self.directory.display()))?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let file_name = entry.file_name().to_str()?.to_string();
                file_name.strip_suffix(".png").map(str::to_string)
            })
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn count_cached(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}
