// Bounded polling shared by every match engine operation
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Time budget for one wait-for-target operation.
///
/// Every cycle performs one attempt, then asks [`PollWindow::next_cycle`]
/// whether another attempt is allowed. The first attempt always happens,
/// so a zero timeout means "look once".
#[derive(Debug, Clone)]
pub struct PollWindow {
    started: Instant,
    timeout: Duration,
    interval: Duration,
    attempts: u32,
}

impl PollWindow {
    pub fn start(timeout: Duration, interval: Duration) -> Self {
        Self {
            started: Instant::now(),
            timeout,
            interval,
            attempts: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    /// Records the finished attempt. Returns `false` once the timeout has
    /// elapsed, otherwise sleeps one interval and returns `true`.
    pub async fn next_cycle(&mut self) -> bool {
        self.attempts += 1;
        if self.is_expired() {
            return false;
        }
        if !self.interval.is_zero() {
            sleep(self.interval).await;
        }
        true
    }
}
