//! Task queue construction and run orchestration
//!
//! - [`QueueBuilder`] expands channel declarations into a deduplicated
//!   [`TaskQueue`] of `(channel, date)` tasks
//! - [`JobRunner`] sequences queue building, grabbing, assembly and output
//! - [`GrabScheduler`] repeats runs on a cron schedule

pub mod job_runner;
pub mod job_scheduler;
pub mod queue_builder;
pub mod task_queue;
pub mod types;

pub use job_runner::{JobRunner, RunReport};
pub use job_scheduler::GrabScheduler;
pub use queue_builder::QueueBuilder;
pub use task_queue::TaskQueue;
pub use types::{FetchTask, TaskError, TaskKey};
