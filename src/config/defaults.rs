/// Configuration default values
///
/// Central location for every default the grabber falls back to.
// Grab defaults
pub const DEFAULT_MAX_CONNECTIONS: usize = 1;
pub const DEFAULT_DAYS: u32 = 1;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 0;

// Path defaults
pub const DEFAULT_CONFIG_FILE: &str = "epg-grabber.toml";
pub const DEFAULT_SITES_DIR: &str = "./sites";
pub const DEFAULT_OUTPUT_PATH: &str = "./guide.xml";

// Environment
pub const ENV_PREFIX: &str = "EPG_GRABBER_";
pub const ENV_CURR_DATE: &str = "CURR_DATE";
