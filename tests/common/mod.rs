//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use epg_grabber::errors::{FetchError, FetchResult};
use epg_grabber::models::{Channel, ChannelDeclaration, Program};
use epg_grabber::sites::{BatchSink, FetchAdapter, GrabBatch, SiteConfig};

pub const TEST_SITE: &str = "scripted.tv";

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn declaration(site: &str, site_id: &str, lang: &str) -> ChannelDeclaration {
    ChannelDeclaration::new(site, site_id, format!("Channel {site_id}")).with_lang(lang)
}

/// Test adapter with scripted timing, batch count and failures.
///
/// Tracks how many calls are in flight so tests can assert the concurrency
/// bound.
#[derive(Debug)]
pub struct ScriptedAdapter {
    site: String,
    days: Option<u32>,
    latency: Duration,
    batches: usize,
    fail_on: HashSet<String>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new(site: &str) -> Self {
        Self {
            site: site.to_string(),
            days: None,
            latency: Duration::ZERO,
            batches: 1,
            fail_on: HashSet::new(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = Some(days);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_batches(mut self, batches: usize) -> Self {
        self.batches = batches;
        self
    }

    /// Fail (after reporting its batches) for channels with this site id
    pub fn failing_on(mut self, site_id: &str) -> Self {
        self.fail_on.insert(site_id.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchAdapter for ScriptedAdapter {
    fn site(&self) -> &str {
        &self.site
    }

    fn config(&self) -> SiteConfig {
        let mut config = SiteConfig::new(&self.site);
        config.days = self.days;
        config
    }

    async fn grab(
        &self,
        channel: &Channel,
        date: NaiveDate,
        _config: &SiteConfig,
        sink: &mut BatchSink,
    ) -> FetchResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let day_start = date.and_time(NaiveTime::MIN).and_utc().fixed_offset();
        for hour in 0..self.batches {
            let start = day_start + TimeDelta::hours(hour as i64);
            let program = Program::new(channel, start, start + TimeDelta::hours(1), format!("Show {hour}"));
            sink.report(GrabBatch::new(date, vec![program]));
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_on.contains(&channel.site_id) {
            return Err(FetchError::adapter(format!("scripted failure for {}", channel.site_id)));
        }
        Ok(())
    }
}
