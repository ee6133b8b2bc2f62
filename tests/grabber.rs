//! Grabber behaviour under concurrency, failures and timeouts

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedAdapter, TEST_SITE, date, declaration};
use epg_grabber::catalog::JsonCatalog;
use epg_grabber::config::RunOptions;
use epg_grabber::ingestor::{GrabOutcome, Grabber};
use epg_grabber::job_scheduling::QueueBuilder;
use epg_grabber::models::ChannelDeclaration;
use epg_grabber::sites::SiteRegistry;
use tracing_test::traced_test;

fn channels(count: usize) -> Vec<ChannelDeclaration> {
    (1..=count)
        .map(|i| declaration(TEST_SITE, &format!("ch{i}"), "en"))
        .collect()
}

async fn grab_with(
    adapter: Arc<ScriptedAdapter>,
    declarations: &[ChannelDeclaration],
    options: RunOptions,
) -> GrabOutcome {
    let mut registry = SiteRegistry::new();
    registry.register(adapter);
    let catalog = JsonCatalog::empty();
    let options = options.with_reference_date(date(2025, 2, 13));

    let queue = QueueBuilder::new(&registry, &catalog, &options).build(declarations);
    Grabber::new(&options).grab(queue).await
}

#[tokio::test]
async fn test_concurrency_limit_respected() {
    let adapter = Arc::new(ScriptedAdapter::new(TEST_SITE).with_latency(Duration::from_millis(50)));

    let outcome = grab_with(
        adapter.clone(),
        &channels(10),
        RunOptions::default().with_max_connections(2),
    )
    .await;

    assert_eq!(outcome.succeeded, 10);
    assert_eq!(adapter.calls(), 10);
    assert!(adapter.max_in_flight() <= 2, "saw {} in flight", adapter.max_in_flight());
    assert_eq!(adapter.max_in_flight(), 2);
}

#[tokio::test]
async fn test_default_runs_one_at_a_time() {
    let adapter = Arc::new(ScriptedAdapter::new(TEST_SITE).with_latency(Duration::from_millis(5)));

    grab_with(adapter.clone(), &channels(4), RunOptions::default()).await;

    assert_eq!(adapter.max_in_flight(), 1);
}

#[tokio::test]
#[traced_test]
async fn test_failure_is_isolated() {
    let adapter = Arc::new(
        ScriptedAdapter::new(TEST_SITE)
            .with_latency(Duration::from_millis(5))
            .failing_on("ch5"),
    );

    let outcome = grab_with(
        adapter.clone(),
        &channels(10),
        RunOptions::default().with_max_connections(4),
    )
    .await;

    assert_eq!(adapter.calls(), 10);
    assert_eq!(outcome.succeeded, 9);
    assert_eq!(outcome.channels.len(), 9);
    assert!(outcome.channels.iter().all(|c| c.site_id != "ch5"));
    assert!(outcome.programs.iter().all(|p| p.channel != "ch5"));

    assert_eq!(outcome.failed.len(), 1);
    let failed = &outcome.failed[0];
    assert_eq!(failed.channel.site_id, "ch5");
    assert_eq!(
        failed.error.as_ref().map(|e| e.message.as_str()),
        Some("scripted failure for ch5")
    );
    assert!(logs_contain("scripted failure for ch5"));
}

#[tokio::test]
async fn test_progressive_batches_are_appended() {
    let adapter = Arc::new(ScriptedAdapter::new(TEST_SITE).with_batches(3));

    let outcome = grab_with(adapter, &channels(2), RunOptions::default()).await;

    assert_eq!(outcome.programs.len(), 6);
    let titles: Vec<_> = outcome.programs.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Show 0", "Show 1", "Show 2", "Show 0", "Show 1", "Show 2"]);
}

#[tokio::test]
async fn test_partial_batches_of_failed_task_are_dropped() {
    let adapter = Arc::new(ScriptedAdapter::new(TEST_SITE).with_batches(4).failing_on("ch1"));

    let outcome = grab_with(adapter, &channels(2), RunOptions::default()).await;

    assert_eq!(outcome.programs.len(), 4);
    assert!(outcome.programs.iter().all(|p| p.channel == "ch2"));
}

#[tokio::test]
async fn test_slow_task_times_out() {
    let adapter = Arc::new(ScriptedAdapter::new(TEST_SITE).with_latency(Duration::from_millis(500)));
    let mut options = RunOptions::default();
    options.timeout = Some(Duration::from_millis(20));

    let outcome = grab_with(adapter, &channels(1), options).await;

    assert_eq!(outcome.succeeded, 0);
    assert_eq!(outcome.failed.len(), 1);
    let error = outcome.failed[0].error.clone().unwrap();
    assert!(error.timed_out);
    assert_eq!(error.message, "Request timed out after 20ms");
}

#[tokio::test]
async fn test_results_follow_queue_order() {
    // All six run at once, so completion order is arbitrary
    let adapter = Arc::new(ScriptedAdapter::new(TEST_SITE).with_latency(Duration::from_millis(10)));

    let outcome = grab_with(
        adapter,
        &channels(6),
        RunOptions::default().with_max_connections(6),
    )
    .await;

    let ids: Vec<_> = outcome.channels.iter().map(|c| c.site_id.as_str()).collect();
    assert_eq!(ids, vec!["ch1", "ch2", "ch3", "ch4", "ch5", "ch6"]);
}

#[tokio::test]
async fn test_progress_counters() {
    let adapter = Arc::new(ScriptedAdapter::new(TEST_SITE).failing_on("ch2"));
    let mut registry = SiteRegistry::new();
    registry.register(adapter);
    let catalog = JsonCatalog::empty();
    let options = RunOptions::default()
        .with_days(2)
        .with_reference_date(date(2025, 2, 13));

    let queue = QueueBuilder::new(&registry, &catalog, &options).build(&channels(3));
    let grabber = Grabber::new(&options);
    let progress = grabber.progress();
    grabber.grab(queue).await;

    let snapshot = progress.snapshot();
    assert_eq!(snapshot.total, 6);
    assert_eq!(snapshot.completed, 6);
    assert_eq!(snapshot.failed, 2);
    assert_eq!(snapshot.succeeded(), 4);
}

#[tokio::test]
async fn test_progress_restarts_for_each_grab() {
    let adapter = Arc::new(ScriptedAdapter::new(TEST_SITE));
    let mut registry = SiteRegistry::new();
    registry.register(adapter);
    let catalog = JsonCatalog::empty();
    let options = RunOptions::default().with_reference_date(date(2025, 2, 13));

    let grabber = Grabber::new(&options);
    let builder = QueueBuilder::new(&registry, &catalog, &options);
    let first = grabber.grab(builder.build(&channels(2))).await;
    let second = grabber.grab(builder.build(&channels(2))).await;
    assert_eq!(first.succeeded, 2);
    assert_eq!(second.succeeded, 2);

    let snapshot = grabber.progress().snapshot();
    assert_eq!(snapshot.total, 2);
    assert_eq!(snapshot.completed, 2);
    assert_eq!(snapshot.failed, 0);
}
