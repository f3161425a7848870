//! Fail-fast startup pipeline.
//!
//! Startup is an ordered list of tasks run against one shared context. Each
//! task either completes, schedules background work, or fails; the first
//! failure aborts the remainder.

use async_trait::async_trait;

use crate::context::TaskContext;
use crate::error::AgentError;

/// Outcome of one pipeline task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The task finished its work.
    Done,
    /// The task started work that continues in the background.
    Running,
    /// The task spawned a periodic background loop.
    Scheduled,
    /// The task failed; the pipeline stops.
    Failed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Done => "done",
            Self::Running => "running",
            Self::Scheduled => "scheduled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One step of agent startup.
#[async_trait]
pub trait Task: Send + Sync {
    /// Stable task name used in logs and failure reports.
    fn name(&self) -> &'static str;

    /// Run the task, reading and extending the shared context.
    async fn run(&self, ctx: &mut TaskContext) -> TaskStatus;
}

/// Ordered task runner.
pub struct TaskPipeline {
    tasks: Vec<Box<dyn Task>>,
}

impl Default for TaskPipeline {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl TaskPipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task to the end of the pipeline.
    #[must_use]
    pub fn with_task(mut self, task: Box<dyn Task>) -> Self {
        self.tasks.push(task);
        self
    }

    /// Run every task in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::TaskFailed`] naming the task that failed.
    pub async fn run(&self, ctx: &mut TaskContext) -> Result<(), AgentError> {
        for task in &self.tasks {
            let status = task.run(ctx).await;
            tracing::info!(task = task.name(), status = %status, "Startup task finished");
            if status == TaskStatus::Failed {
                return Err(AgentError::TaskFailed(task.name()));
            }
        }
        Ok(())
    }
}
