use clap::Parser;
use env_logger::Env;
use weather_history::{ChromeFetcher, HistoryScraper};

mod cli;

fn main() -> miette::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = cli::Cli::parse().into_config();

    let fetcher = ChromeFetcher::launch(&config.base_url, &config.browser)?;
    let mut scraper = HistoryScraper::new(fetcher, config);
    let summaries = scraper.run()?;

    for summary in &summaries {
        println!(
            "{}: {} records -> {}",
            summary.year,
            summary.records,
            summary.path.display()
        );
    }

    Ok(())
}
