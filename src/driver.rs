//! Walks every day of the configured years and writes one CSV per year.
//!
//! A date whose page cannot be loaded or read is logged and kept as an
//! empty day, so one bad page never costs the rest of the year. Failing to
//! write an output file, losing the browser, or a run of pages that cannot
//! be loaded at all stops the run before the current year's file is touched.

use std::path::PathBuf;

use miette::Diagnostic;
use scraper::Html;
use thiserror::Error;
use time::Date;

use crate::{
    config::Config,
    dates,
    export::{self, WriteError},
    extract::extract,
    fetch::{FetchError, PageFetcher},
    DailyObservations, YearlyObservations,
};

#[derive(Debug, Error, Diagnostic)]
pub enum ScrapeError {
    #[error("Year {year} cannot be scraped")]
    #[diagnostic(code(weather_history::driver::year))]
    Year {
        year: i32,
        #[source]
        source: time::error::ComponentRange,
    },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Write(#[from] WriteError),
    #[error("Gave up at {date} after {failures} pages in a row failed to load")]
    #[diagnostic(
        code(weather_history::driver::unreachable),
        help("check the network connection and the base URL")
    )]
    Unreachable { date: Date, failures: usize },
}

/// What was written for one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSummary {
    pub year: i32,
    pub path: PathBuf,
    pub days: usize,
    pub empty_days: usize,
    pub records: usize,
}

pub struct HistoryScraper<F> {
    fetcher: F,
    config: Config,
    transport_failures: usize,
}

impl<F: PageFetcher> HistoryScraper<F> {
    pub fn new(fetcher: F, config: Config) -> Self {
        Self {
            fetcher,
            config,
            transport_failures: 0,
        }
    }

    /// Scrape and write every configured year, in order.
    pub fn run(&mut self) -> Result<Vec<YearSummary>, ScrapeError> {
        let years = self.config.years.clone();
        years.into_iter().map(|year| self.run_year(year)).collect()
    }

    pub fn run_year(&mut self, year: i32) -> Result<YearSummary, ScrapeError> {
        log::info!("scraping {year}");
        let data = self.scrape_year(year)?;

        let path = self.config.output_path(year);
        let records = export::write_year(&data, &path)?;
        let summary = YearSummary {
            year,
            path,
            days: data.days.len(),
            empty_days: data.empty_days(),
            records,
        };
        log::info!(
            "wrote {} records for {year} to {} ({} of {} days empty)",
            summary.records,
            summary.path.display(),
            summary.empty_days,
            summary.days,
        );

        Ok(summary)
    }

    pub fn scrape_year(&mut self, year: i32) -> Result<YearlyObservations, ScrapeError> {
        let days = dates::days_of_year(year).map_err(|source| ScrapeError::Year { year, source })?;

        let mut data = YearlyObservations::new(year);
        for date in days {
            data.push(self.scrape_day(date)?);
        }
        Ok(data)
    }

    /// A fatal fetch error, or too many consecutive transport failures,
    /// escapes; anything else becomes an empty day.
    pub fn scrape_day(&mut self, date: Date) -> Result<DailyObservations, ScrapeError> {
        let source = match self.fetcher.fetch(date) {
            Ok(source) => {
                self.transport_failures = 0;
                source
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                if e.is_transport() {
                    self.transport_failures += 1;
                    if self.transport_failures >= self.config.max_transport_failures {
                        log::error!("{date}: {e}");
                        return Err(ScrapeError::Unreachable {
                            date,
                            failures: self.transport_failures,
                        });
                    }
                } else {
                    self.transport_failures = 0;
                }
                log::warn!("skipping {date}: {e}");
                return Ok(DailyObservations::empty(date));
            }
        };

        let document = Html::parse_document(&source);
        match extract(&document, date) {
            Ok(day) => {
                log::debug!("{date}: {} records", day.records.len());
                Ok(day)
            }
            Err(e) => {
                log::warn!("skipping {date}: {e}");
                Ok(DailyObservations::empty(date))
            }
        }
    }
}
