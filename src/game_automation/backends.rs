//! Seams between the automation core and the outside world: the device
//! (screen source + touch), the text recognizer and the template matcher.

use super::error::{AutomationError, AutomationResult};
use super::types::{Frame, Point, TextBox};
use crate::adb::AdbBackend;
use async_trait::async_trait;

#[async_trait]
pub trait ScreenDevice: Send + Sync {
    /// Fresh capture of the current screen.
    async fn capture(&self) -> AutomationResult<Frame>;
    /// Exactly one touch event at `point`.
    async fn touch(&self, point: Point) -> AutomationResult<()>;
    async fn launch(&self, package: &str) -> AutomationResult<()>;
    fn name(&self) -> &str;
}

#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// All strings found in the frame, in recognizer output order.
    async fn recognize(&self, frame: &Frame) -> AutomationResult<Vec<TextBox>>;
}

#[async_trait]
pub trait TemplateMatcher: Send + Sync {
    /// Center and score of the best match of `image` in the frame, or `None`
    /// when the best score is below `threshold`.
    async fn find(
        &self,
        frame: &Frame,
        image: &str,
        threshold: f64,
    ) -> AutomationResult<Option<(Point, f64)>>;
}

/// Side action interleaved with an image poll, e.g. dismissing an overlay.
#[async_trait]
pub trait PollHook: Send + Sync {
    async fn on_poll(&self, device: &dyn ScreenDevice) -> AutomationResult<()>;
}

/// Hook that taps a fixed point on every poll cycle.
pub struct TapHook(pub Point);

#[async_trait]
impl PollHook for TapHook {
    async fn on_poll(&self, device: &dyn ScreenDevice) -> AutomationResult<()> {
        device.touch(self.0).await
    }
}

#[async_trait]
impl ScreenDevice for AdbBackend {
    async fn capture(&self) -> AutomationResult<Frame> {
        let capture = self
            .screen_capture()
            .await
            .map_err(|e| {
                if e.is_disconnect() {
                    log::warn!("🔌 {} looks disconnected: {}", self.device_name(), e);
                }
                AutomationError::Capture(e.to_string())
            })?;
        log::debug!(
            "📸 Captured {} bytes in {}ms",
            capture.bytes.len(),
            capture.duration_ms
        );
        Ok(Frame::new(capture.bytes))
    }

    async fn touch(&self, point: Point) -> AutomationResult<()> {
        self.tap(point.x, point.y)
            .await
            .map_err(|e| AutomationError::Touch {
                x: point.x,
                y: point.y,
                reason: e.to_string(),
            })
    }

    async fn launch(&self, package: &str) -> AutomationResult<()> {
        self.start_app(package)
            .await
            .map_err(|e| AutomationError::Launch {
                package: package.to_string(),
                reason: e.to_string(),
            })
    }

    fn name(&self) -> &str {
        self.device_name()
    }
}
