//! Perception-gated primitives: poll the screen until a text or image
//! target shows up (or the timeout runs out), then optionally tap it.

use super::backends::{ScreenDevice, TemplateMatcher, TextRecognizer};
use super::dispatcher::ActionDispatcher;
use super::error::{AutomationError, AutomationResult};
use super::poll::PollWindow;
use super::types::{
    BoundingBox, Frame, ImageTarget, MatchMode, MatchResult, Point, TargetDefaults, TextBox,
    TextTarget,
};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TEXT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// One-shot memory of the last honored image match.
///
/// Once set, every image poll on the owning engine reports `NotFound`
/// until [`DebounceLatch::clear`] is called.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DebounceLatch {
    latched: Option<Point>,
}

impl DebounceLatch {
    pub fn is_set(&self) -> bool {
        self.latched.is_some()
    }

    pub fn get(&self) -> Option<Point> {
        self.latched
    }

    /// Keeps the first value; later sets are ignored.
    pub fn set(&mut self, point: Point) {
        if self.latched.is_none() {
            self.latched = Some(point);
        }
    }

    pub fn clear(&mut self) {
        self.latched = None;
    }
}

/// Similarity in [0, 1] between two strings, 1.0 meaning identical.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

pub fn text_matches(candidate: &str, target: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Exact => candidate == target,
        MatchMode::Fuzzy { threshold } => text_similarity(target, candidate) >= threshold,
        MatchMode::Contains => candidate.contains(target),
    }
}

/// First recognized box that satisfies the target, in recognizer order.
pub fn first_hit<'a>(boxes: &'a [TextBox], target: &str, mode: MatchMode) -> Option<&'a TextBox> {
    boxes.iter().find(|b| text_matches(&b.text, target, mode))
}

pub struct MatchEngine {
    device: Arc<dyn ScreenDevice>,
    dispatcher: ActionDispatcher,
    recognizer: Arc<dyn TextRecognizer>,
    matcher: Arc<dyn TemplateMatcher>,
    latch: DebounceLatch,
    text_poll_interval: Duration,
    targets: TargetDefaults,
}

impl MatchEngine {
    pub fn new(
        device: Arc<dyn ScreenDevice>,
        recognizer: Arc<dyn TextRecognizer>,
        matcher: Arc<dyn TemplateMatcher>,
    ) -> Self {
        Self {
            dispatcher: ActionDispatcher::new(device.clone()),
            device,
            recognizer,
            matcher,
            latch: DebounceLatch::default(),
            text_poll_interval: DEFAULT_TEXT_POLL_INTERVAL,
            targets: TargetDefaults::default(),
        }
    }

    pub fn with_text_poll_interval(mut self, interval: Duration) -> Self {
        self.text_poll_interval = interval;
        self
    }

    pub fn with_target_defaults(mut self, targets: TargetDefaults) -> Self {
        self.targets = targets;
        self
    }

    /// Defaults for targets built by tasks running on this engine.
    pub fn targets(&self) -> TargetDefaults {
        self.targets
    }

    pub fn device_name(&self) -> &str {
        self.device.name()
    }

    pub fn latched(&self) -> Option<Point> {
        self.latch.get()
    }

    pub fn clear_latch(&mut self) {
        if self.latch.is_set() {
            log::debug!("🔓 Debounce latch cleared");
        }
        self.latch.clear();
    }

    /// Polls capture + recognition until the target text shows up.
    /// Capture or recognition failures count as a missed cycle.
    pub async fn find_text(&self, target: &TextTarget) -> MatchResult {
        log::debug!("🔎 Waiting for text '{}' ({:?})", target.text, target.mode);
        let mut window = PollWindow::start(target.timeout, self.text_poll_interval);
        loop {
            match self.scan_text(target).await {
                Ok(Some(hit)) => {
                    log::debug!(
                        "🎯 Text '{}' matched '{}' at {}",
                        target.text,
                        hit.text,
                        hit.center()
                    );
                    return MatchResult::Found(hit.center());
                }
                Ok(None) => {}
                Err(e) => log::warn!("⚠️ Poll for '{}' failed: {}", target.text, e),
            }
            if !window.next_cycle().await {
                log::debug!(
                    "👀 Text '{}' not found after {} attempts",
                    target.text,
                    window.attempts()
                );
                return MatchResult::NotFound;
            }
        }
    }

    async fn scan_text(&self, target: &TextTarget) -> AutomationResult<Option<TextBox>> {
        let frame = self.device.capture().await?;
        let boxes = self.recognizer.recognize(&frame).await?;
        Ok(first_hit(&boxes, &target.text, target.mode).cloned())
    }

    /// Polls the template matcher until the reference image shows up.
    ///
    /// A successful match sets the debounce latch; while it is set this
    /// returns `NotFound` immediately. The target's hook runs after every
    /// cycle that did not produce a match.
    pub async fn find_image(&mut self, target: &ImageTarget) -> MatchResult {
        if self.latch.is_set() {
            log::debug!("🔒 Image '{}' skipped, latch is set", target.image);
            return MatchResult::NotFound;
        }
        log::debug!(
            "🔎 Waiting for image '{}' (threshold {:.2})",
            target.image,
            target.threshold
        );
        let mut window = PollWindow::start(target.timeout, target.interval);
        loop {
            match self.scan_image(target).await {
                Ok(Some((point, score))) => {
                    log::debug!(
                        "🎯 Image '{}' found at {} with score {:.3}",
                        target.image,
                        point,
                        score
                    );
                    self.latch.set(point);
                    return MatchResult::Found(point);
                }
                Ok(None) => {}
                Err(e) => log::warn!("⚠️ Poll for image '{}' failed: {}", target.image, e),
            }
            if let Some(hook) = &target.on_poll
                && let Err(e) = hook.on_poll(self.device.as_ref()).await
            {
                log::warn!("⚠️ Poll hook for '{}' failed: {}", target.image, e);
            }
            if !window.next_cycle().await {
                log::debug!(
                    "👀 Image '{}' not found after {} attempts",
                    target.image,
                    window.attempts()
                );
                return MatchResult::NotFound;
            }
        }
    }

    async fn scan_image(&self, target: &ImageTarget) -> AutomationResult<Option<(Point, f64)>> {
        let frame = self.device.capture().await?;
        let found = self
            .matcher
            .find(&frame, &target.image, target.threshold)
            .await?;
        Ok(found.filter(|(_, score)| *score >= target.threshold))
    }

    /// Waits for the text and taps its center after the settle delay.
    /// Absence is not an error; the step just does nothing.
    pub async fn click_text(&self, target: &TextTarget) -> AutomationResult<MatchResult> {
        let result = self.find_text(target).await;
        if let MatchResult::Found(point) = result {
            log::info!("👆 Click '{}' at {}", target.text, point);
            self.dispatcher.tap(point, target.settle_delay).await?;
        }
        Ok(result)
    }

    /// Waits for the image and taps the match center.
    pub async fn click_image(&mut self, target: &ImageTarget) -> AutomationResult<MatchResult> {
        let result = self.find_image(target).await;
        if let MatchResult::Found(point) = result {
            log::info!("👆 Click image '{}' at {}", target.image, point);
            self.dispatcher.tap(point, Duration::ZERO).await?;
        }
        Ok(result)
    }

    /// Guard step: the target must appear within its timeout.
    pub async fn require_text(&self, target: &TextTarget) -> AutomationResult<Point> {
        self.find_text(target)
            .await
            .point()
            .ok_or_else(|| AutomationError::TargetMissing {
                target: target.text.clone(),
            })
    }

    pub async fn tap(&self, point: Point, settle_delay: Duration) -> AutomationResult<()> {
        self.dispatcher.tap(point, settle_delay).await
    }

    pub async fn launch_app(&self, package: &str) -> AutomationResult<()> {
        log::info!("🚀 Launching {} on {}", package, self.device.name());
        self.device.launch(package).await
    }

    pub async fn capture(&self) -> AutomationResult<Frame> {
        self.device.capture().await
    }

    /// Single capture + recognition pass. With a region, only that part of
    /// the screen is read and the boxes are mapped back to screen space.
    pub async fn read_text(&self, region: Option<BoundingBox>) -> AutomationResult<Vec<TextBox>> {
        let frame = self.device.capture().await?;
        self.read_frame_text(&frame, region).await
    }

    pub async fn read_frame_text(
        &self,
        frame: &Frame,
        region: Option<BoundingBox>,
    ) -> AutomationResult<Vec<TextBox>> {
        match region {
            None => self.recognizer.recognize(frame).await,
            Some(region) => {
                let cropped = frame.crop(region)?;
                let boxes = self.recognizer.recognize(&cropped).await?;
                Ok(boxes
                    .into_iter()
                    .map(|b| TextBox::new(b.text, b.bbox.offset(region.left, region.top)))
                    .collect())
            }
        }
    }
}
