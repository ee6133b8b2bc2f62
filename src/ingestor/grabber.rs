//! Concurrency-bounded grabber
//!
//! Drains a [`TaskQueue`] with at most `max_connections` adapter calls in
//! flight. Every task runs exactly once; a failing task is recorded and
//! excluded while the rest of the run carries on.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::state_manager::GrabProgress;
use crate::config::RunOptions;
use crate::errors::{FetchError, FetchResult};
use crate::job_scheduling::{FetchTask, TaskError, TaskQueue};
use crate::models::{Channel, Program};
use crate::sites::BatchSink;

/// Collections produced by one grab, in queue order
#[derive(Debug, Default)]
pub struct GrabOutcome {
    pub channels: Vec<Channel>,
    pub programs: Vec<Program>,
    /// Tasks whose fetch failed, each with its error recorded
    pub failed: Vec<FetchTask>,
    pub succeeded: usize,
}

impl GrabOutcome {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }
}

pub struct Grabber {
    max_connections: usize,
    timeout: Option<Duration>,
    delay: Option<Duration>,
    progress: Arc<GrabProgress>,
}

impl Grabber {
    pub fn new(options: &RunOptions) -> Self {
        Self {
            max_connections: options.max_connections.max(1),
            timeout: options.timeout,
            delay: options.delay,
            progress: Arc::new(GrabProgress::default()),
        }
    }

    /// Shared progress counters of the grab in flight
    pub fn progress(&self) -> Arc<GrabProgress> {
        self.progress.clone()
    }

    /// Run every queued task and merge the successful results
    pub async fn grab(&self, queue: TaskQueue) -> GrabOutcome {
        let tasks = queue.drain();
        let total = tasks.len();
        self.progress.begin(total);

        let mut results: Vec<(usize, FetchTask, FetchResult<BatchSink>)> =
            stream::iter(tasks.into_iter().enumerate())
                .map(|(position, task)| self.run_task(position, total, task))
                .buffer_unordered(self.max_connections)
                .collect()
                .await;

        // Completion order is arbitrary; merge in queue order
        results.sort_by_key(|(position, _, _)| *position);

        let mut outcome = GrabOutcome::default();
        for (_, mut task, result) in results {
            match result {
                Ok(sink) => {
                    outcome.succeeded += 1;
                    outcome.channels.push(task.channel.clone());
                    outcome.programs.extend(sink.into_programs());
                }
                Err(e) => {
                    task.error = Some(TaskError::from(&e));
                    outcome.failed.push(task);
                }
            }
        }
        outcome
    }

    async fn run_task(
        &self,
        position: usize,
        total: usize,
        task: FetchTask,
    ) -> (usize, FetchTask, FetchResult<BatchSink>) {
        let config = task.config.with_overrides(self.timeout, self.delay);
        let deadline = config.deadline();
        let mut sink = BatchSink::new();

        let result = match tokio::time::timeout(
            deadline,
            task.adapter
                .grab(&task.channel, task.date, &config, &mut sink),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(deadline)),
        };

        let index = self.progress.record(result.is_ok());
        match &result {
            Ok(()) => info!(
                "[{}/{}] {} ({} programs)",
                index,
                total,
                task.key(),
                sink.program_count()
            ),
            Err(e) => error!("[{}/{}] {}: {}", index, total, task.key(), e),
        }

        (position, task, result.map(|()| sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::{DummyAdapter, FetchAdapter};
    use chrono::NaiveDate;

    fn queue_of(channels: &[&str]) -> TaskQueue {
        let adapter: Arc<dyn FetchAdapter> = Arc::new(DummyAdapter::new());
        let date = NaiveDate::from_ymd_opt(2025, 2, 13).unwrap();
        let mut queue = TaskQueue::new();
        for site_id in channels {
            let channel = Channel {
                site: "dummy.ca".to_string(),
                site_id: site_id.to_string(),
                xmltv_id: site_id.to_string(),
                name: site_id.to_string(),
                lang: "en".to_string(),
                logo: None,
            };
            let task = FetchTask::new(channel, date, adapter.config(), adapter.clone());
            queue.put(task.key(), task);
        }
        queue
    }

    #[tokio::test]
    async fn test_grab_merges_in_queue_order() {
        let grabber = Grabber::new(&RunOptions::default().with_max_connections(3));
        let outcome = grabber.grab(queue_of(&["c", "a", "b"])).await;

        let ids: Vec<_> = outcome.channels.iter().map(|c| c.xmltv_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(outcome.programs.len(), 72);
        assert_eq!(outcome.programs[0].channel, "c");
        assert_eq!(outcome.succeeded, 3);
        assert!(outcome.failed.is_empty());

        let progress = grabber.progress().snapshot();
        assert_eq!(progress.completed, 3);
        assert_eq!(progress.failed, 0);
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let grabber = Grabber::new(&RunOptions::default());
        let outcome = grabber.grab(TaskQueue::new()).await;
        assert_eq!(outcome.total(), 0);
    }
}
