//! Bounded task pool
//!
//! Runs a batch of independent tasks with a fixed number of concurrent slots.
//! A failing or panicking task is logged and reported in its outcome; it never
//! cancels its siblings.

use crate::{Result, TrawlError};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};

/// Result of one task, tagged with the label it was submitted under
#[derive(Debug)]
pub struct TaskOutcome<T> {
    pub label: String,
    pub result: Result<T>,
}

impl<T> TaskOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fixed-size pool of execution slots
#[derive(Debug, Clone)]
pub struct TaskExecutor {
    semaphore: Arc<Semaphore>,
    max_concurrency: usize,
}

impl TaskExecutor {
    /// Creates a pool with `max_concurrency` slots (at least one)
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Runs every task and waits for all of them to settle
    ///
    /// Outcomes come back in completion order, one per submitted task.
    pub async fn run_all<T, F>(&self, tasks: Vec<(String, F)>) -> Vec<TaskOutcome<T>>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let mut set = JoinSet::new();
        let mut labels: HashMap<Id, String> = HashMap::with_capacity(tasks.len());

        for (label, task) in tasks {
            let semaphore = Arc::clone(&self.semaphore);
            let task_label = label.clone();

            let handle = set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return TaskOutcome {
                        result: Err(TrawlError::TaskAborted {
                            label: task_label.clone(),
                            message: "task pool closed".to_string(),
                        }),
                        label: task_label,
                    };
                };

                TaskOutcome {
                    result: task.await,
                    label: task_label,
                }
            });
            labels.insert(handle.id(), label);
        }

        let mut outcomes = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    // A panic or abort loses the outcome, so recover the label by task id
                    let label = labels
                        .remove(&join_error.id())
                        .unwrap_or_else(|| "unknown task".to_string());
                    TaskOutcome {
                        result: Err(TrawlError::TaskAborted {
                            label: label.clone(),
                            message: join_error.to_string(),
                        }),
                        label,
                    }
                }
            };

            if let Err(e) = &outcome.result {
                tracing::error!("Task {} failed: {}", outcome.label, e);
            }
            outcomes.push(outcome);
        }

        outcomes
    }
}
