//! Ingestion engine
//!
//! [`Grabber`] drains a task queue under a concurrency bound and
//! [`GrabProgress`] tracks it while it runs.

pub mod grabber;
pub mod state_manager;

pub use grabber::{GrabOutcome, Grabber};
pub use state_manager::{GrabProgress, ProgressSnapshot};
