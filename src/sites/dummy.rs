//! Built-in `dummy.ca` site
//!
//! Produces a fixed schedule without any I/O: one program per hour for the
//! whole local day, in UTC-05:00. Useful for smoke runs and tests.

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone};

use super::traits::{BatchSink, FetchAdapter, GrabBatch, SiteConfig};
use crate::errors::{FetchError, FetchResult};
use crate::models::{Channel, Program};

pub const DUMMY_SITE: &str = "dummy.ca";

const UTC_OFFSET_WEST_SECS: i32 = 5 * 3600;
const PROGRAMS_PER_DAY: i64 = 24;

#[derive(Debug, Clone, Default)]
pub struct DummyAdapter;

impl DummyAdapter {
    pub fn new() -> Self {
        Self
    }

    fn schedule(channel: &Channel, date: NaiveDate) -> FetchResult<Vec<Program>> {
        let offset = FixedOffset::west_opt(UTC_OFFSET_WEST_SECS)
            .ok_or_else(|| FetchError::adapter("Invalid dummy.ca UTC offset"))?;
        let day_start = offset
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .single()
            .ok_or_else(|| FetchError::adapter(format!("Ambiguous local midnight on {date}")))?;

        let programs = (0..PROGRAMS_PER_DAY)
            .map(|hour| {
                let start = day_start + TimeDelta::hours(hour);
                let stop = start + TimeDelta::hours(1);
                Program::new(channel, start, stop, format!("{} {:02}:00", channel.name, hour))
                    .with_description(format!("Hourly program {} of {}", hour + 1, PROGRAMS_PER_DAY))
                    .with_category("General")
            })
            .collect();
        Ok(programs)
    }
}

#[async_trait]
impl FetchAdapter for DummyAdapter {
    fn site(&self) -> &str {
        DUMMY_SITE
    }

    fn config(&self) -> SiteConfig {
        SiteConfig::new(DUMMY_SITE).with_days(1)
    }

    async fn grab(
        &self,
        channel: &Channel,
        date: NaiveDate,
        _config: &SiteConfig,
        sink: &mut BatchSink,
    ) -> FetchResult<()> {
        sink.report(GrabBatch::new(date, Self::schedule(channel, date)?));
        Ok(())
    }
}
