use std::{path::PathBuf, time::Duration};

use clap::Parser;
use weather_history::{
    config::{DEFAULT_BASE_URL, DEFAULT_YEARS},
    years::Years,
    BrowserConfig, Config,
};

#[derive(Debug, Parser)]
#[command(about = "Download hourly weather history into one CSV per year.")]
pub struct Cli {
    /// Years to scrape, e.g. `2014,2022` or `2014-2016`
    #[arg(long, default_value_t = Years(DEFAULT_YEARS.to_vec()))]
    pub years: Years,
    /// History page of the station; the ISO date is appended
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
    /// Directory receiving `weather_data_<year>.csv`
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
    /// Chrome or Chromium executable
    #[arg(long = "chrome", env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,
    /// Open a visible browser window instead of running headless
    #[arg(long)]
    pub show_browser: bool,
    /// Seconds to wait for the observation table of each page
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config {
            years: self.years.0,
            base_url: self.base_url,
            output_dir: self.output_dir,
            browser: BrowserConfig {
                chrome_path: self.chrome_path,
                headless: !self.show_browser,
                ready_timeout: Duration::from_secs(self.timeout_secs),
                ..BrowserConfig::default()
            },
            ..Config::default()
        }
    }
}
