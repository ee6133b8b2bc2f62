//! Shared helpers used by the adapters, the guide writer and the scheduler.

pub mod cron_helper;
pub mod decompression;
pub mod human_format;
pub mod time;
pub mod xmltv_parser;

pub use decompression::{CompressionFormat, DecompressionService};
