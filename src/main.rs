use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epg_grabber::{
    catalog::{ChannelCatalog, JsonCatalog},
    channels::{ChannelSource, load_declarations},
    config::{Config, RunOptions, defaults::DEFAULT_CONFIG_FILE, defaults::ENV_CURR_DATE, parse_reference_date},
    guide::GuideWriter,
    job_scheduling::{GrabScheduler, JobRunner},
    sites::SiteRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "epg-grabber")]
#[command(version)]
#[command(about = "Grab TV program schedules from many sites into one XMLTV guide")]
#[command(long_about = None)]
struct Cli {
    /// Name of the site to parse
    #[arg(short, long)]
    site: Option<String>,

    /// Path to a *.channels.xml file (used when no site is given)
    #[arg(short, long, value_name = "PATH")]
    channels: Option<PathBuf>,

    /// Path to the output guide file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Filter channels by language (ISO 639-2 code)
    #[arg(short, long)]
    lang: Option<String>,

    /// Override the request timeout of every site, in milliseconds
    #[arg(short, long, value_name = "MS")]
    timeout: Option<u64>,

    /// Override the delay between requests, in milliseconds
    #[arg(short, long, value_name = "MS")]
    delay: Option<u64>,

    /// Override the number of days to grab
    #[arg(long)]
    days: Option<u32>,

    /// Limit on the number of concurrent requests
    #[arg(short = 'x', long, value_name = "N")]
    max_connections: Option<usize>,

    /// Schedule runs with a cron expression (e.g. "0 0 * * *")
    #[arg(long, value_name = "EXPRESSION")]
    cron: Option<String>,

    /// Also write a gzip-compressed copy of the guide
    #[arg(long)]
    gzip: bool,

    /// Also write the grabbed channels as <output>.channels.xml
    #[arg(long)]
    channels_listing: bool,

    /// Configuration file path
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory holding site configs and channels files
    #[arg(long, value_name = "DIR")]
    sites_dir: Option<PathBuf>,

    /// Channel catalog (channels.json) path or URL
    #[arg(long, value_name = "PATH|URL")]
    catalog: Option<String>,

    /// First date to grab (YYYY-MM-DD), defaults to today or $CURR_DATE
    #[arg(long, value_name = "DATE")]
    date: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    /// Flags win over the file and environment layers
    fn apply_to(&self, config: &mut Config) {
        if let Some(lang) = &self.lang {
            config.grab.lang = Some(lang.clone());
        }
        if let Some(days) = self.days {
            config.grab.days = Some(days);
        }
        if let Some(max_connections) = self.max_connections {
            config.grab.max_connections = max_connections;
        }
        if let Some(timeout) = self.timeout {
            config.grab.timeout = Some(Duration::from_millis(timeout));
        }
        if let Some(delay) = self.delay {
            config.grab.delay = Some(Duration::from_millis(delay));
        }
        if let Some(output) = &self.output {
            config.paths.output = output.clone();
        }
        if let Some(sites_dir) = &self.sites_dir {
            config.paths.sites_dir = sites_dir.clone();
        }
        if let Some(catalog) = &self.catalog {
            config.paths.catalog = Some(catalog.clone());
        }
        if let Some(cron) = &self.cron {
            config.schedule.cron = Some(cron.clone());
        }
        config.output.gzip |= self.gzip;
        config.output.channels_listing |= self.channels_listing;
    }
}

fn init_tracing(log_level: &str, log_format: LogFormat) {
    let log_filter = format!("epg_grabber={log_level}");
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| log_filter.into());

    match log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    info!("Starting epg-grabber v{}", env!("CARGO_PKG_VERSION"));

    let source = ChannelSource::from_options(cli.site.clone(), cli.channels.clone())?;

    let mut config = Config::load(&cli.config)?;
    cli.apply_to(&mut config);

    let mut options = RunOptions::from_config(&config.grab);
    let reference_date = match cli.date.clone().or_else(|| std::env::var(ENV_CURR_DATE).ok()) {
        Some(value) => Some(parse_reference_date(&value)?),
        None => None,
    };
    if let Some(date) = reference_date {
        info!("Using reference date {}", date);
        options = options.with_reference_date(date);
    }

    let client = reqwest::Client::builder()
        .user_agent(concat!("epg-grabber/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut registry = SiteRegistry::with_builtin();
    registry.load_dir(&config.paths.sites_dir, &client)?;
    info!("Registered sites: {}", registry.sites().join(", "));

    let catalog: Arc<dyn ChannelCatalog> = match &config.paths.catalog {
        Some(location) => Arc::new(JsonCatalog::load(location, &client).await?),
        None => Arc::new(JsonCatalog::empty()),
    };

    info!("Loading channels...");
    let declarations = load_declarations(&source, &config.paths.sites_dir).await?;

    let writer = GuideWriter::from_config(&config.paths.output, &config.output);
    let runner = Arc::new(JobRunner::new(registry, catalog, declarations, options, writer)?);

    match &config.schedule.cron {
        Some(expression) => {
            let scheduler = GrabScheduler::new(runner, expression)?;
            let cancellation_token = CancellationToken::new();

            let shutdown = cancellation_token.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Received Ctrl+C, stopping after the current run");
                        shutdown.cancel();
                    }
                    Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
                }
            });

            scheduler.run(cancellation_token).await?;
        }
        None => {
            runner.run().await?;
        }
    }

    Ok(())
}
