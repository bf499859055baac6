//! Periodic re-runs of a task set.
//!
//! `start` validates its input, then spawns a loop that wakes once per tick,
//! fires the runner when the next fire time has passed and keeps a countdown
//! for display. `stop` only flips a flag; the loop notices at its next tick,
//! so a run that is already in flight is allowed to finish.

use super::error::{AutomationError, AutomationResult};
use super::runner::TaskRunner;
use super::types::TaskSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::{Instant, sleep};

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Snapshot of the scheduler for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleStatus {
    pub running: bool,
    pub interval: Option<Duration>,
    pub task_set: TaskSet,
    pub next_fire: Option<Instant>,
    pub remaining: Option<Duration>,
    pub runs: u32,
    pub failures: u32,
}

impl ScheduleStatus {
    /// Countdown as `MM:SS`, or `--:--` when idle.
    pub fn countdown(&self) -> String {
        match (self.running, self.remaining) {
            (true, Some(remaining)) => format_countdown(remaining),
            _ => "--:--".to_string(),
        }
    }
}

pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[derive(Debug, Default)]
struct ScheduleState {
    running: bool,
    interval: Option<Duration>,
    task_set: TaskSet,
    next_fire: Option<Instant>,
    remaining: Option<Duration>,
    runs: u32,
    failures: u32,
    // one token per start, so a loop from an earlier start cannot revive
    stop_token: Option<Arc<AtomicBool>>,
}

pub struct Scheduler {
    runner: RwLock<Option<Arc<TaskRunner>>>,
    state: Arc<RwLock<ScheduleState>>,
    tick: Duration,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            runner: RwLock::new(None),
            state: Arc::new(RwLock::new(ScheduleState::default())),
            tick: DEFAULT_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Device connected: scheduled runs go through `runner`.
    pub async fn attach(&self, runner: Arc<TaskRunner>) {
        *self.runner.write().await = Some(runner);
    }

    /// Device gone: stops any running schedule.
    pub async fn detach(&self) {
        self.stop().await;
        *self.runner.write().await = None;
    }

    pub async fn is_attached(&self) -> bool {
        self.runner.read().await.is_some()
    }

    /// `idle -> running`. Every check happens before any state changes.
    pub async fn start(&self, task_set: TaskSet, interval_minutes: i64) -> AutomationResult<()> {
        let mut state = self.state.write().await;
        if state.running {
            return Err(AutomationError::AlreadyRunning);
        }
        let runner = self
            .runner
            .read()
            .await
            .clone()
            .ok_or(AutomationError::NoDevice)?;
        if task_set.is_empty() {
            return Err(AutomationError::EmptyTaskSet);
        }
        let Some((interval, next_fire)) = interval_from_minutes(interval_minutes) else {
            return Err(AutomationError::InvalidInterval(interval_minutes));
        };
        runner.registry().resolve(&task_set)?;

        let token = Arc::new(AtomicBool::new(false));

        state.running = true;
        state.interval = Some(interval);
        state.task_set = task_set.clone();
        state.next_fire = Some(next_fire);
        state.remaining = Some(interval);
        state.runs = 0;
        state.failures = 0;
        state.stop_token = Some(token.clone());
        drop(state);

        log::info!(
            "⏱️ Scheduler started: {} every {} min, first run in {}",
            task_set,
            interval_minutes,
            format_countdown(interval)
        );

        tokio::spawn(schedule_loop(
            self.state.clone(),
            runner,
            task_set,
            interval,
            self.tick,
            token,
        ));
        Ok(())
    }

    /// `running -> idle`. No-op when idle.
    pub async fn stop(&self) {
        let mut state = self.state.write().await;
        if !state.running {
            return;
        }
        if let Some(token) = state.stop_token.take() {
            token.store(true, Ordering::SeqCst);
        }
        state.running = false;
        state.next_fire = None;
        state.remaining = None;
        log::info!("⏹️ Scheduler stopped after {} runs", state.runs);
    }

    pub async fn is_running(&self) -> bool {
        self.state.read().await.running
    }

    pub async fn status(&self) -> ScheduleStatus {
        let state = self.state.read().await;
        ScheduleStatus {
            running: state.running,
            interval: state.interval,
            task_set: state.task_set.clone(),
            next_fire: state.next_fire,
            remaining: state.remaining,
            runs: state.runs,
            failures: state.failures,
        }
    }
}

/// Positive minutes that fit in a `Duration` and an `Instant` from now.
fn interval_from_minutes(minutes: i64) -> Option<(Duration, Instant)> {
    if minutes <= 0 {
        return None;
    }
    let secs = u64::try_from(minutes).ok()?.checked_mul(60)?;
    let interval = Duration::from_secs(secs);
    let next_fire = Instant::now().checked_add(interval)?;
    Some((interval, next_fire))
}

async fn schedule_loop(
    state: Arc<RwLock<ScheduleState>>,
    runner: Arc<TaskRunner>,
    task_set: TaskSet,
    interval: Duration,
    tick: Duration,
    token: Arc<AtomicBool>,
) {
    loop {
        sleep(tick).await;
        if token.load(Ordering::SeqCst) {
            break;
        }

        let now = Instant::now();
        let next_fire = state.read().await.next_fire;
        let Some(next_fire) = next_fire else {
            break;
        };

        if now < next_fire {
            state.write().await.remaining = Some(next_fire - now);
            continue;
        }

        log::info!("⏱️ Scheduled run of {}", task_set);
        let result = runner.run(&task_set).await;

        if let Err(e) = &result {
            log::error!("❌ Scheduled run failed: {}", e);
        }
        let mut st = state.write().await;
        if token.load(Ordering::SeqCst) {
            break;
        }
        st.runs += 1;
        if result.is_err() {
            st.failures += 1;
        }
        // a failed run still moves the next fire forward
        let Some(next_fire) = now.checked_add(interval) else {
            log::error!("❌ Next run time is out of range, stopping scheduler");
            st.running = false;
            st.next_fire = None;
            st.remaining = None;
            st.stop_token = None;
            break;
        };
        st.next_fire = Some(next_fire);
        st.remaining = Some(next_fire.saturating_duration_since(Instant::now()));
        log::info!(
            "⏱️ Next run in {}",
            format_countdown(st.remaining.unwrap_or_default())
        );
    }
    log::debug!("⏱️ Scheduler loop exited");
}
