//! Cron-driven repetition of grab runs

use chrono::{DateTime, Utc};
use cron::Schedule;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::job_runner::JobRunner;
use crate::errors::{AppError, AppResult};
use crate::utils::cron_helper::{next_scheduled_time, normalize_cron_expression, parse_schedule};
use crate::utils::human_format::format_duration;

/// Runs the [`JobRunner`] on every tick of a cron expression until cancelled.
/// The first run happens on the first tick, not at startup.
pub struct GrabScheduler {
    runner: Arc<JobRunner>,
    schedule: Schedule,
    expression: String,
}

impl GrabScheduler {
    /// Accepts 5-field (minute-first) and 6/7-field (seconds-first) expressions
    pub fn new(runner: Arc<JobRunner>, expression: &str) -> AppResult<Self> {
        let schedule = parse_schedule(expression).map_err(AppError::configuration)?;
        Ok(Self {
            runner,
            schedule,
            expression: normalize_cron_expression(expression),
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn next_run(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        next_scheduled_time(&self.schedule, now)
    }

    pub async fn run(&self, cancellation_token: CancellationToken) -> AppResult<()> {
        info!("Starting grab scheduler with schedule '{}'", self.expression);

        loop {
            let now = Utc::now();
            let Some(next) = self.next_run(now) else {
                warn!("Schedule '{}' has no upcoming runs, stopping", self.expression);
                break;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            info!(
                "Next run at {} (in {})",
                next.format("%Y-%m-%d %H:%M:%S UTC"),
                format_duration(wait)
            );

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    if let Err(e) = self.runner.run().await {
                        error!("Run failed: {}", e);
                    }
                }
                _ = cancellation_token.cancelled() => {
                    info!("Grab scheduler received cancellation signal, shutting down");
                    break;
                }
            }
        }

        info!("Grab scheduler stopped");
        Ok(())
    }
}
