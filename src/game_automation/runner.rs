// Sequential, fail-fast execution of a task set on the shared engine
use super::diagnostics::dump_screen_text;
use super::error::{AutomationError, AutomationResult};
use super::match_engine::MatchEngine;
use super::task::TaskRegistry;
use super::types::{Frame, TaskSet, TextBox};
use std::error::Error as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// What a finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub completed: Vec<String>,
    pub elapsed: std::time::Duration,
}

/// Owns the one engine (and so the one device connection and latch).
///
/// The engine mutex is the run-in-progress guard: only one task set runs at
/// a time, whether it was started by hand or by the scheduler.
pub struct TaskRunner {
    registry: Arc<TaskRegistry>,
    engine: Mutex<MatchEngine>,
    diagnostics_dir: Option<PathBuf>,
}

impl TaskRunner {
    pub fn new(registry: Arc<TaskRegistry>, engine: MatchEngine) -> Self {
        Self {
            registry,
            engine: Mutex::new(engine),
            diagnostics_dir: None,
        }
    }

    pub fn with_diagnostics_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.diagnostics_dir = dir;
        self
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn is_busy(&self) -> bool {
        self.engine.try_lock().is_err()
    }

    /// Runs `set`, waiting for any run already in progress to finish first.
    pub async fn run(&self, set: &TaskSet) -> AutomationResult<RunReport> {
        let mut engine = self.engine.lock().await;
        self.run_locked(&mut engine, set).await
    }

    /// Runs `set` unless another run holds the engine, in which case the
    /// request is rejected with `RunInProgress`.
    pub async fn try_run(&self, set: &TaskSet) -> AutomationResult<RunReport> {
        let mut engine = self
            .engine
            .try_lock()
            .map_err(|_| AutomationError::RunInProgress)?;
        self.run_locked(&mut engine, set).await
    }

    /// Diagnostic dump of the current screen, outside any run.
    pub async fn dump(&self) -> AutomationResult<Vec<TextBox>> {
        let engine = self
            .engine
            .try_lock()
            .map_err(|_| AutomationError::RunInProgress)?;
        Ok(dump_screen_text(&engine, self.diagnostics_dir.as_deref()).await)
    }

    pub async fn capture(&self) -> AutomationResult<Frame> {
        let engine = self
            .engine
            .try_lock()
            .map_err(|_| AutomationError::RunInProgress)?;
        engine.capture().await
    }

    async fn run_locked(
        &self,
        engine: &mut MatchEngine,
        set: &TaskSet,
    ) -> AutomationResult<RunReport> {
        let tasks = self.registry.resolve(set)?;
        let started = Instant::now();
        let mut completed = Vec::with_capacity(tasks.len());
        log::info!("▶️ Running {} on {}", set, engine.device_name());

        for task in tasks {
            let task_started = Instant::now();
            log::info!("🚦 Task '{}' ({}) started", task.name(), task.label());
            engine.clear_latch();

            if let Err(e) = task.run(engine).await {
                log_failure(task.name(), &e);
                dump_screen_text(engine, self.diagnostics_dir.as_deref()).await;
                return Err(AutomationError::TaskFailed {
                    task: task.name().to_string(),
                    source: Box::new(e),
                });
            }

            log::info!(
                "✅ Task '{}' completed in {:.1}s",
                task.name(),
                task_started.elapsed().as_secs_f64()
            );
            completed.push(task.name().to_string());
        }

        let elapsed = started.elapsed();
        log::info!("🏁 Finished {} in {:.1}s", set, elapsed.as_secs_f64());
        Ok(RunReport { completed, elapsed })
    }
}

fn log_failure(task: &str, error: &AutomationError) {
    log::error!("❌ Task '{}' failed: {}", task, error);
    let mut source = error.source();
    while let Some(cause) = source {
        log::error!("   caused by: {}", cause);
        source = cause.source();
    }
}
