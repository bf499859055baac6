// Touch dispatch: one tap per call, no retries, no verification
use super::backends::ScreenDevice;
use super::error::AutomationResult;
use super::types::Point;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct ActionDispatcher {
    device: Arc<dyn ScreenDevice>,
}

impl ActionDispatcher {
    pub fn new(device: Arc<dyn ScreenDevice>) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &dyn ScreenDevice {
        self.device.as_ref()
    }

    /// Waits `settle_delay` (if any) so UI animations finish, then taps once.
    pub async fn tap(&self, point: Point, settle_delay: Duration) -> AutomationResult<()> {
        if !settle_delay.is_zero() {
            tokio::time::sleep(settle_delay).await;
        }
        log::debug!("👆 Tap at {} on {}", point, self.device.name());
        self.device.touch(point).await
    }
}
