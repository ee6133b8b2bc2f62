//! Full runs through the job runner against the built-in dummy site

mod common;

use std::path::Path;
use std::sync::Arc;

use common::{ScriptedAdapter, TEST_SITE, date, declaration};
use epg_grabber::catalog::JsonCatalog;
use epg_grabber::channels::{ChannelSource, load_declarations};
use epg_grabber::config::RunOptions;
use epg_grabber::errors::AppError;
use epg_grabber::guide::GuideWriter;
use epg_grabber::job_scheduling::JobRunner;
use epg_grabber::sites::SiteRegistry;
use epg_grabber::utils::xmltv_parser::parse_xmltv_programs;
use tempfile::TempDir;
use tracing_test::traced_test;

const DUMMY_CHANNELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<channels>
  <channel site="dummy.ca" lang="en" xmltv_id="Channel1.ca" site_id="channel1">Dummy Channel 1</channel>
  <channel site="dummy.ca" lang="es" xmltv_id="Channel2.ca" site_id="channel2">Dummy Channel 2</channel>
</channels>
"#;

fn write_sites(dir: &Path) {
    let site_dir = dir.join("sites/dummy.ca");
    std::fs::create_dir_all(&site_dir).unwrap();
    std::fs::write(site_dir.join("dummy.ca.channels.xml"), DUMMY_CHANNELS).unwrap();
}

async fn runner_for(dir: &TempDir, options: RunOptions, writer: GuideWriter) -> JobRunner {
    write_sites(dir.path());
    let sites_dir = dir.path().join("sites");
    let source = ChannelSource::Site("dummy.ca".to_string());
    let declarations = load_declarations(&source, &sites_dir).await.unwrap();

    let mut registry = SiteRegistry::with_builtin();
    registry.load_dir(&sites_dir, &reqwest::Client::new()).unwrap();

    JobRunner::new(
        registry,
        Arc::new(JsonCatalog::empty()),
        declarations,
        options,
        writer,
    )
    .unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_dummy_site_english_only() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("guides/dummy.xml");
    let options = RunOptions::default()
        .with_lang("en")
        .with_days(1)
        .with_reference_date(date(2025, 2, 13));

    let runner = runner_for(&dir, options, GuideWriter::new(&output)).await;
    let report = runner.run().await.unwrap();

    assert!(!report.skipped);
    assert_eq!(report.tasks, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.channels, 1);
    assert_eq!(report.programs, 24);

    let xml = std::fs::read_to_string(&output).unwrap();
    assert!(xml.contains("<tv date=\"20250213\">"));
    assert!(xml.contains("<channel id=\"Channel1.ca\">"));
    assert!(!xml.contains("Channel2.ca"));

    let programs = parse_xmltv_programs(&xml).unwrap();
    assert_eq!(programs.len(), 24);
    assert!(programs.iter().all(|p| p.channel == "Channel1.ca"));

    assert!(logs_contain("[1/1] dummy.ca (en) - Channel1.ca - Feb 13, 2025 (24 programs)"));
}

#[tokio::test]
async fn test_all_languages_and_days() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("guide.xml");
    let options = RunOptions::default()
        .with_days(2)
        .with_max_connections(2)
        .with_reference_date(date(2025, 2, 13));

    let writer = GuideWriter::new(&output)
        .with_gzip(true)
        .with_channels_listing(true);
    let runner = runner_for(&dir, options, writer).await;
    let report = runner.run().await.unwrap();

    assert_eq!(report.tasks, 4);
    assert_eq!(report.channels, 2);
    assert_eq!(report.programs, 96);
    assert_eq!(report.outputs.len(), 3);
    assert!(dir.path().join("guide.xml.gz").is_file());

    let listing = std::fs::read_to_string(dir.path().join("guide.channels.xml")).unwrap();
    assert!(listing.contains("site_id=\"channel1\""));
    assert!(listing.contains("site_id=\"channel2\""));
}

#[tokio::test]
async fn test_output_is_stable_across_runs() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("guide.xml");
    let options = RunOptions::default()
        .with_max_connections(4)
        .with_reference_date(date(2025, 2, 13));

    let runner = runner_for(&dir, options, GuideWriter::new(&output)).await;

    runner.run().await.unwrap();
    let first = std::fs::read(&output).unwrap();
    runner.run().await.unwrap();
    let second = std::fs::read(&output).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
#[traced_test]
async fn test_empty_queue_skips_the_run() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("guide.xml");
    let options = RunOptions::default()
        .with_lang("fr")
        .with_reference_date(date(2025, 2, 13));

    let runner = runner_for(&dir, options, GuideWriter::new(&output)).await;
    let report = runner.run().await.unwrap();

    assert!(report.skipped);
    assert_eq!(report.tasks, 0);
    assert!(report.outputs.is_empty());
    assert!(!output.exists());
    assert!(logs_contain("No tasks to run"));
}

#[test]
fn test_missing_channel_source_is_fatal() {
    let err = ChannelSource::from_options(None, None).unwrap_err();
    assert!(matches!(err, AppError::MissingChannelSource));
    assert_eq!(
        err.to_string(),
        "One of the arguments must be presented: `--site` or `--channels`"
    );
}

#[tokio::test]
async fn test_run_with_only_failures_writes_an_empty_guide() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("guide.xml");
    let mut registry = SiteRegistry::new();
    registry.register(Arc::new(ScriptedAdapter::new(TEST_SITE).failing_on("one")));

    let runner = JobRunner::new(
        registry,
        Arc::new(JsonCatalog::empty()),
        vec![declaration(TEST_SITE, "one", "en")],
        RunOptions::default().with_reference_date(date(2025, 2, 13)),
        GuideWriter::new(&output),
    )
    .unwrap();
    let report = runner.run().await.unwrap();

    assert!(!report.skipped);
    assert_eq!(report.failed, 1);
    assert_eq!(report.programs, 0);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<tv date=\"20250213\">\n</tv>\n"
    );
}
