use std::{path::PathBuf, time::Duration};

/// Years scraped when none are given.
pub const DEFAULT_YEARS: [i32; 2] = [2014, 2022];

/// Daily history pages of Chicago Midway (KMDW). The ISO date is appended.
pub const DEFAULT_BASE_URL: &str =
    "https://www.wunderground.com/history/daily/us/il/chicago/KMDW/date";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub years: Vec<i32>,
    pub base_url: String,
    /// Where `weather_data_<year>.csv` files are written.
    pub output_dir: PathBuf,
    /// Consecutive pages that fail to load before the run gives up.
    pub max_transport_failures: usize,
    pub browser: BrowserConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            years: DEFAULT_YEARS.to_vec(),
            base_url: String::from(DEFAULT_BASE_URL),
            output_dir: PathBuf::from("."),
            max_transport_failures: 5,
            browser: BrowserConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Chrome/Chromium executable. `None` lets the launcher look for one.
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub window_size: (u32, u32),
    /// How long to wait for the observation table to show up.
    pub ready_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            window_size: (1920, 1080),
            ready_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn output_path(&self, year: i32) -> PathBuf {
        self.output_dir.join(format!("weather_data_{year}.csv"))
    }
}
