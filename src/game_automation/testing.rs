// Scripted stand-ins for the device, recognizer and matcher
use super::backends::{ScreenDevice, TemplateMatcher, TextRecognizer};
use super::error::{AutomationError, AutomationResult};
use super::match_engine::MatchEngine;
use super::task::Task;
use super::types::{BoundingBox, Frame, Point, TextBox};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SCREEN_WIDTH: u32 = 1280;
pub const SCREEN_HEIGHT: u32 = 720;

/// Queue of scripted answers; once drained, the last answer repeats.
pub struct Script<T: Clone> {
    queue: Mutex<VecDeque<T>>,
    last: Mutex<T>,
}

impl<T: Clone> Script<T> {
    pub fn new(fallback: T) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            last: Mutex::new(fallback),
        }
    }

    pub fn push(&self, value: T) {
        self.queue.lock().unwrap().push_back(value);
    }

    pub fn next(&self) -> T {
        match self.queue.lock().unwrap().pop_front() {
            Some(value) => {
                *self.last.lock().unwrap() = value.clone();
                value
            }
            None => self.last.lock().unwrap().clone(),
        }
    }
}

pub fn text(s: &str, left: u32, top: u32, right: u32, bottom: u32) -> TextBox {
    TextBox::new(s, BoundingBox::new(left, top, right, bottom))
}

fn blank_png() -> Vec<u8> {
    let img = image::GrayImage::from_pixel(SCREEN_WIDTH, SCREEN_HEIGHT, image::Luma([40]));
    let mut png = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    png
}

pub struct FakeDevice {
    png: Vec<u8>,
    failing_captures: AtomicUsize,
    pub captures: AtomicUsize,
    taps: Mutex<Vec<Point>>,
    launches: Mutex<Vec<String>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            png: blank_png(),
            failing_captures: AtomicUsize::new(0),
            captures: AtomicUsize::new(0),
            taps: Mutex::new(Vec::new()),
            launches: Mutex::new(Vec::new()),
        }
    }

    /// The next `n` captures fail as if the device were locked.
    pub fn fail_next_captures(&self, n: usize) {
        self.failing_captures.store(n, Ordering::SeqCst);
    }

    pub fn taps(&self) -> Vec<Point> {
        self.taps.lock().unwrap().clone()
    }

    pub fn launches(&self) -> Vec<String> {
        self.launches.lock().unwrap().clone()
    }

    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScreenDevice for FakeDevice {
    async fn capture(&self) -> AutomationResult<Frame> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_captures.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_captures.store(failing - 1, Ordering::SeqCst);
            return Err(AutomationError::Capture("device locked".into()));
        }
        Ok(Frame::new(self.png.clone()))
    }

    async fn touch(&self, point: Point) -> AutomationResult<()> {
        self.taps.lock().unwrap().push(point);
        Ok(())
    }

    async fn launch(&self, package: &str) -> AutomationResult<()> {
        self.launches.lock().unwrap().push(package.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "fake-5554"
    }
}

/// Width field of the PNG IHDR chunk.
fn png_width(png: &[u8]) -> u32 {
    u32::from_be_bytes([png[16], png[17], png[18], png[19]])
}

/// Full-screen frames read from `screen`, cropped frames from `region`.
pub struct FakeRecognizer {
    pub screen: Script<Vec<TextBox>>,
    pub region: Script<Vec<TextBox>>,
    pub calls: AtomicUsize,
}

impl FakeRecognizer {
    pub fn new() -> Self {
        Self {
            screen: Script::new(Vec::new()),
            region: Script::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A screen that always shows `boxes`.
    pub fn showing(boxes: Vec<TextBox>) -> Self {
        let recognizer = Self::new();
        recognizer.screen.push(boxes);
        recognizer
    }
}

#[async_trait]
impl TextRecognizer for FakeRecognizer {
    async fn recognize(&self, frame: &Frame) -> AutomationResult<Vec<TextBox>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if png_width(frame.png_bytes()) < SCREEN_WIDTH {
            Ok(self.region.next())
        } else {
            Ok(self.screen.next())
        }
    }
}

/// Per-image scripted results; unknown images never match.
pub struct FakeMatcher {
    images: Mutex<HashMap<String, Arc<Script<Option<(Point, f64)>>>>>,
}

impl FakeMatcher {
    pub fn new() -> Self {
        Self {
            images: Mutex::new(HashMap::new()),
        }
    }

    fn script(&self, image: &str) -> Arc<Script<Option<(Point, f64)>>> {
        self.images
            .lock()
            .unwrap()
            .entry(image.to_string())
            .or_insert_with(|| Arc::new(Script::new(None)))
            .clone()
    }

    /// `image` is always visible at `point` with `score`.
    pub fn showing(self, image: &str, point: Point, score: f64) -> Self {
        self.script(image).push(Some((point, score)));
        self
    }

    /// Next answers for `image`, in order.
    pub fn push(&self, image: &str, result: Option<(Point, f64)>) {
        self.script(image).push(result);
    }
}

#[async_trait]
impl TemplateMatcher for FakeMatcher {
    async fn find(
        &self,
        _frame: &Frame,
        image: &str,
        threshold: f64,
    ) -> AutomationResult<Option<(Point, f64)>> {
        Ok(self
            .script(image)
            .next()
            .filter(|(_, score)| *score >= threshold))
    }
}

pub fn engine(
    device: &Arc<FakeDevice>,
    recognizer: &Arc<FakeRecognizer>,
    matcher: &Arc<FakeMatcher>,
) -> MatchEngine {
    MatchEngine::new(device.clone(), recognizer.clone(), matcher.clone())
}

/// Task that records its invocation in a shared journal and can fail or
/// take a while.
pub struct ScriptedTask {
    name: String,
    journal: Arc<Mutex<Vec<String>>>,
    fail: bool,
    duration: Duration,
}

impl ScriptedTask {
    pub fn new(name: &str, journal: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            journal: journal.clone(),
            fail: false,
            duration: Duration::ZERO,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn taking(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

#[async_trait]
impl Task for ScriptedTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, engine: &mut MatchEngine) -> AutomationResult<()> {
        self.journal.lock().unwrap().push(self.name.clone());
        if !self.duration.is_zero() {
            tokio::time::sleep(self.duration).await;
        }
        if self.fail {
            return Err(AutomationError::TargetMissing {
                target: format!("{} landmark on {}", self.name, engine.device_name()),
            });
        }
        Ok(())
    }
}
