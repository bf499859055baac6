// Named units of game progress and the registry that resolves them
use super::error::{AutomationError, AutomationResult};
use super::match_engine::MatchEngine;
use super::types::TaskSet;
use async_trait::async_trait;
use std::sync::Arc;

/// A scripted sequence of match-then-act steps.
///
/// Implementations hold no state between invocations; anything a run needs
/// lives in local variables or in the engine's latch.
#[async_trait]
pub trait Task: Send + Sync {
    /// Registry key, e.g. `task`.
    fn name(&self) -> &str;

    /// Human readable label shown next to the name.
    fn label(&self) -> &str {
        self.name()
    }

    async fn run(&self, engine: &mut MatchEngine) -> AutomationResult<()>;
}

/// Task name to task mapping, built once at startup.
/// Keeps registration order, which is also the order of `all()`.
#[derive(Default, Clone)]
pub struct TaskRegistry {
    tasks: Vec<Arc<dyn Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task; a later task with the same name replaces the earlier one.
    pub fn register(&mut self, task: Arc<dyn Task>) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.name() == task.name()) {
            log::warn!("⚠️ Task '{}' registered twice, replacing", task.name());
            *slot = task;
        } else {
            self.tasks.push(task);
        }
    }

    pub fn with(mut self, task: Arc<dyn Task>) -> Self {
        self.register(task);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Task>> {
        self.tasks.iter().find(|t| t.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.iter().any(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn tasks(&self) -> &[Arc<dyn Task>] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Every registered task, in registration order ("run all").
    pub fn all(&self) -> TaskSet {
        TaskSet::new(self.names())
    }

    /// Resolves every name up front so an unknown name fails before
    /// anything runs.
    pub fn resolve(&self, set: &TaskSet) -> AutomationResult<Vec<Arc<dyn Task>>> {
        set.names()
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| AutomationError::UnknownTask(name.clone()))
            })
            .collect()
    }
}
