//! One grab run: queue, grab, assemble, write

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

use super::queue_builder::QueueBuilder;
use crate::catalog::ChannelCatalog;
use crate::config::RunOptions;
use crate::config::duration_serde;
use crate::errors::AppResult;
use crate::guide::{GuideAssembler, GuideWriter};
use crate::ingestor::Grabber;
use crate::models::ChannelDeclaration;
use crate::sites::SiteRegistry;
use crate::utils::human_format::format_duration;

/// Summary of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// 1-based position of this run within the process
    pub run_index: u64,
    pub reference_date: NaiveDate,
    pub tasks: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub channels: usize,
    pub programs: usize,
    pub outputs: Vec<PathBuf>,
    #[serde(with = "duration_serde::duration")]
    pub duration: Duration,
    /// The queue was empty and nothing was grabbed or written
    pub skipped: bool,
}

impl RunReport {
    fn skipped(run_id: Uuid, run_index: u64, reference_date: NaiveDate, duration: Duration) -> Self {
        Self {
            run_id,
            run_index,
            reference_date,
            tasks: 0,
            succeeded: 0,
            failed: 0,
            channels: 0,
            programs: 0,
            outputs: Vec::new(),
            duration,
            skipped: true,
        }
    }
}

/// Sequences a full run. Holds no state between runs apart from the run
/// counter, so a scheduler can call [`JobRunner::run`] once per tick.
pub struct JobRunner {
    registry: SiteRegistry,
    catalog: Arc<dyn ChannelCatalog>,
    declarations: Vec<ChannelDeclaration>,
    options: RunOptions,
    writer: GuideWriter,
    runs: AtomicU64,
}

impl JobRunner {
    pub fn new(
        registry: SiteRegistry,
        catalog: Arc<dyn ChannelCatalog>,
        declarations: Vec<ChannelDeclaration>,
        options: RunOptions,
        writer: GuideWriter,
    ) -> AppResult<Self> {
        options.validate()?;
        Ok(Self {
            registry,
            catalog,
            declarations,
            options,
            writer,
            runs: AtomicU64::new(0),
        })
    }

    pub async fn run(&self) -> AppResult<RunReport> {
        let run_index = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        // Pin "today" so queue and guide agree even across midnight
        let reference_date = self.options.reference_date();
        let options = self.options.clone().with_reference_date(reference_date);

        info!("run #{} ({}):", run_index, run_id);

        let queue = QueueBuilder::new(&self.registry, self.catalog.as_ref(), &options)
            .build(&self.declarations);
        if queue.is_empty() {
            info!("No tasks to run for {}, skipping run #{}", reference_date, run_index);
            return Ok(RunReport::skipped(
                run_id,
                run_index,
                reference_date,
                started.elapsed(),
            ));
        }

        let tasks = queue.size();
        info!("Grabbing {} task(s) with {} connection(s)...", tasks, options.max_connections);

        let grabber = Grabber::new(&options);
        let outcome = grabber.grab(queue).await;
        let succeeded = outcome.succeeded;
        let failed = outcome.failed.len();

        let guide = GuideAssembler::new(&options).assemble(outcome);
        let written = self.writer.write(&guide).await?;

        let duration = started.elapsed();
        info!(
            "Done in {} ({} succeeded, {} failed, {} channel(s), {} program(s))",
            format_duration(duration),
            succeeded,
            failed,
            guide.channels.len(),
            guide.programs.len()
        );

        Ok(RunReport {
            run_id,
            run_index,
            reference_date,
            tasks,
            succeeded,
            failed,
            channels: guide.channels.len(),
            programs: guide.programs.len(),
            outputs: written.paths,
            duration,
            skipped: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::JsonCatalog;
    use crate::errors::AppError;
    use tempfile::TempDir;

    fn runner(dir: &TempDir, declarations: Vec<ChannelDeclaration>, options: RunOptions) -> AppResult<JobRunner> {
        JobRunner::new(
            SiteRegistry::with_builtin(),
            Arc::new(JsonCatalog::empty()),
            declarations,
            options,
            GuideWriter::new(dir.path().join("guide.xml")),
        )
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let dir = TempDir::new().unwrap();
        let result = runner(&dir, Vec::new(), RunOptions::default().with_max_connections(0));
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_run_counter_increments() {
        let dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 2, 13).unwrap();
        let runner = runner(
            &dir,
            vec![ChannelDeclaration::new("dummy.ca", "channel1", "Dummy Channel 1").with_lang("en")],
            RunOptions::default().with_reference_date(date),
        )
        .unwrap();

        let first = runner.run().await.unwrap();
        let second = runner.run().await.unwrap();

        assert_eq!(first.run_index, 1);
        assert_eq!(second.run_index, 2);
        assert_ne!(first.run_id, second.run_id);
        assert_eq!(first.programs, 24);
        assert_eq!(first.reference_date, date);
        assert_eq!(first.outputs, vec![dir.path().join("guide.xml")]);
    }
}
