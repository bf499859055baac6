// Failure-time screen dump for operator review
use super::match_engine::MatchEngine;
use super::types::TextBox;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Captures the screen, recognizes everything on it and logs one
/// `text: (x, y)` line per string. With `save_dir`, the frame is also
/// written there as a PNG.
///
/// Never fails: problems while dumping are logged and swallowed so the
/// task's own error is what reaches the caller.
pub async fn dump_screen_text(engine: &MatchEngine, save_dir: Option<&Path>) -> Vec<TextBox> {
    log::info!("🩺 Diagnostic dump on {}", engine.device_name());
    let frame = match engine.capture().await {
        Ok(frame) => frame,
        Err(e) => {
            log::error!("❌ Diagnostic capture failed: {}", e);
            return Vec::new();
        }
    };

    if let Some(dir) = save_dir {
        match save_frame(dir, frame.png_bytes()).await {
            Ok(path) => log::info!("💾 Failure frame saved to {}", path.display()),
            Err(e) => log::warn!("⚠️ Could not save failure frame: {}", e),
        }
    }

    match engine.read_frame_text(&frame, None).await {
        Ok(boxes) => {
            if boxes.is_empty() {
                log::info!("🩺 (no text recognized)");
            }
            for b in &boxes {
                log::info!("🩺 {}: {}", b.text, b.center());
            }
            boxes
        }
        Err(e) => {
            log::error!("❌ Diagnostic recognition failed: {}", e);
            Vec::new()
        }
    }
}

async fn save_frame(dir: &Path, png: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let path = dir.join(format!("failure-{stamp}.png"));
    tokio::fs::write(&path, png).await?;
    Ok(path)
}
