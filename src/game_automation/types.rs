// Data model shared by the match engine, tasks and scheduler
use super::backends::PollHook;
use super::error::{AutomationError, AutomationResult};
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_TEXT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.7;
pub const DEFAULT_IMAGE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_IMAGE_INTERVAL: Duration = Duration::from_millis(500);

/// Pixel coordinate in the device's native resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle given by its top-left and bottom-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Box from an origin plus size, the layout used for crop regions.
    pub const fn from_rect(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn center(&self) -> Point {
        Point::new((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    pub fn offset(&self, dx: u32, dy: u32) -> BoundingBox {
        BoundingBox::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }
}

/// One recognized string and where it sits on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub text: String,
    pub bbox: BoundingBox,
}

impl TextBox {
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }

    pub fn center(&self) -> Point {
        self.bbox.center()
    }
}

/// Captured screen image, PNG encoded, stamped with its capture time.
#[derive(Debug, Clone)]
pub struct Frame {
    png: Arc<[u8]>,
    captured_at: Instant,
}

impl Frame {
    pub fn new(png: Vec<u8>) -> Self {
        Self {
            png: png.into(),
            captured_at: Instant::now(),
        }
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    pub fn decode(&self) -> AutomationResult<image::DynamicImage> {
        image::load_from_memory(&self.png)
            .map_err(|e| AutomationError::Decode(format!("Failed to decode frame: {e}")))
    }

    /// Cuts `region` out of the frame and re-encodes it as a new frame.
    /// The region is clipped to the frame bounds.
    pub fn crop(&self, region: BoundingBox) -> AutomationResult<Frame> {
        let image = self.decode()?;
        let x = region.left.min(image.width());
        let y = region.top.min(image.height());
        let width = region.width().min(image.width() - x);
        let height = region.height().min(image.height() - y);
        let cropped = image.crop_imm(x, y, width, height);
        let mut png = Vec::new();
        cropped
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| AutomationError::Decode(format!("Failed to encode cropped frame: {e}")))?;
        Ok(Frame {
            png: png.into(),
            captured_at: self.captured_at,
        })
    }
}

/// Outcome of a poll: absence is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Found(Point),
    NotFound,
}

impl MatchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, MatchResult::Found(_))
    }

    pub fn point(&self) -> Option<Point> {
        match self {
            MatchResult::Found(p) => Some(*p),
            MatchResult::NotFound => None,
        }
    }
}

/// How a recognized string is compared with the target text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchMode {
    Exact,
    /// Normalized edit-distance similarity at or above `threshold`.
    Fuzzy { threshold: f64 },
    /// Target occurs as a substring of the recognized string.
    Contains,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextTarget {
    pub text: String,
    pub mode: MatchMode,
    pub timeout: Duration,
    pub settle_delay: Duration,
}

impl TextTarget {
    pub fn exact(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: MatchMode::Exact,
            timeout: DEFAULT_TEXT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn fuzzy(text: impl Into<String>) -> Self {
        Self {
            mode: MatchMode::Fuzzy {
                threshold: DEFAULT_FUZZY_THRESHOLD,
            },
            ..Self::exact(text)
        }
    }

    pub fn contains(text: impl Into<String>) -> Self {
        Self {
            mode: MatchMode::Contains,
            ..Self::exact(text)
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.mode = MatchMode::Fuzzy { threshold };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}

#[derive(Clone)]
pub struct ImageTarget {
    /// Reference image id, resolved by the template matcher (e.g. `home` -> `images/home.png`).
    pub image: String,
    pub threshold: f64,
    pub timeout: Duration,
    pub interval: Duration,
    /// Runs after every poll cycle that did not match, including failed captures.
    pub on_poll: Option<Arc<dyn PollHook>>,
}

impl ImageTarget {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            threshold: DEFAULT_IMAGE_THRESHOLD,
            timeout: DEFAULT_IMAGE_TIMEOUT,
            interval: DEFAULT_IMAGE_INTERVAL,
            on_poll: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn PollHook>) -> Self {
        self.on_poll = Some(hook);
        self
    }
}

impl fmt::Debug for ImageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageTarget")
            .field("image", &self.image)
            .field("threshold", &self.threshold)
            .field("timeout", &self.timeout)
            .field("interval", &self.interval)
            .field("on_poll", &self.on_poll.is_some())
            .finish()
    }
}

/// Timeouts and thresholds that tasks apply to the targets they build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetDefaults {
    pub text_timeout: Duration,
    pub settle_delay: Duration,
    pub fuzzy_threshold: f64,
    pub image_threshold: f64,
    pub image_timeout: Duration,
    pub image_interval: Duration,
}

impl Default for TargetDefaults {
    fn default() -> Self {
        Self {
            text_timeout: DEFAULT_TEXT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            image_threshold: DEFAULT_IMAGE_THRESHOLD,
            image_timeout: DEFAULT_IMAGE_TIMEOUT,
            image_interval: DEFAULT_IMAGE_INTERVAL,
        }
    }
}

impl TargetDefaults {
    fn text(&self, text: &str, mode: MatchMode) -> TextTarget {
        TextTarget {
            text: text.to_string(),
            mode,
            timeout: self.text_timeout,
            settle_delay: self.settle_delay,
        }
    }

    pub fn exact(&self, text: &str) -> TextTarget {
        self.text(text, MatchMode::Exact)
    }

    pub fn fuzzy(&self, text: &str) -> TextTarget {
        self.text(
            text,
            MatchMode::Fuzzy {
                threshold: self.fuzzy_threshold,
            },
        )
    }

    pub fn contains(&self, text: &str) -> TextTarget {
        self.text(text, MatchMode::Contains)
    }

    pub fn image(&self, image: &str) -> ImageTarget {
        ImageTarget::new(image)
            .with_threshold(self.image_threshold)
            .with_timeout(self.image_timeout)
            .with_interval(self.image_interval)
    }
}

/// Ordered list of task names for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSet(Vec<String>);

impl TaskSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for TaskSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}
