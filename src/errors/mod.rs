//! Centralized error handling for the grabber
//!
//! Errors are split by how a run reacts to them:
//!
//! - **Run errors** ([`AppError`]): configuration, I/O, catalog and channel
//!   loading failures. These abort the current run.
//! - **Site errors** ([`SiteError`]): a channel names a site with no registered
//!   adapter. The channel is skipped, the run continues.
//! - **Fetch errors** ([`FetchError`]): an adapter failed for one task. The
//!   failure is recorded on the task and excluded from the guide.
//!
//! Malformed channel declarations never produce an error value; the queue
//! builder drops them.
//!
//! # Usage
//!
//! ```rust
//! use epg_grabber::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("max_connections must be at least 1"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for adapter fetch results
pub type FetchResult<T> = Result<T, FetchError>;
