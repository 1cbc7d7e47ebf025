use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.stackexchange.com/2.3";
pub const DEFAULT_SITE: &str = "stackoverflow";
pub const DEFAULT_FILTER: &str = "withbody";
pub const DEFAULT_PAGE_SIZE: u32 = 30;
pub const DEFAULT_MAX_ITEMS: usize = 300;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub site: String,
    pub filter: String,
    pub page_size: u32,
    /// Safety cap on the accumulated item count, independent of `has_more`.
    pub max_items: usize,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            site: DEFAULT_SITE.to_string(),
            filter: DEFAULT_FILTER.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_items: DEFAULT_MAX_ITEMS,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Browse the newest questions of a Stack Exchange site.
#[derive(Parser, Debug)]
#[command(name = "iqm", version, about)]
pub struct Cli {
    /// API root, without the trailing `/questions`
    #[arg(long, env = "IQM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "IQM_SITE", default_value = DEFAULT_SITE)]
    pub site: String,

    /// Response filter passed through to the API
    #[arg(long, env = "IQM_FILTER", default_value = DEFAULT_FILTER)]
    pub filter: String,

    #[arg(long, env = "IQM_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE,
          value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: u32,

    /// Stop fetching once this many questions are loaded
    #[arg(long, env = "IQM_MAX_ITEMS", default_value_t = DEFAULT_MAX_ITEMS)]
    pub max_items: usize,

    #[arg(long, env = "IQM_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Where logs go; the terminal belongs to the UI
    #[arg(long, env = "IQM_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            site: self.site.clone(),
            filter: self.filter.clone(),
            page_size: self.page_size,
            max_items: self.max_items,
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("iqm.log"))
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
