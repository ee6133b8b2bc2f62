pub mod catalog;
pub mod channels;
pub mod config;
pub mod errors;
pub mod guide;
pub mod ingestor;
pub mod job_scheduling;
pub mod models;
pub mod sites;
pub mod utils;
