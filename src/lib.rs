use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::Date;

pub mod config;
pub mod dates;
pub mod driver;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod years;

pub use config::{BrowserConfig, Config};
pub use driver::{HistoryScraper, ScrapeError};
pub use extract::{extract, ExtractError};
pub use fetch::{ChromeFetcher, FetchError, PageFetcher};

time::serde::format_description!(iso_date, Date, dates::ISO_DATE);

/// Labels of the CSV header, in record field order.
pub const HEADER: [&str; 11] = [
    "Date",
    "Time",
    "Temperature",
    "Dew Point",
    "Humidity",
    "Wind",
    "Wind Speed",
    "Wind Gust",
    "Pressure",
    "Precip.",
    "Condition",
];

/// One hourly row of the history table.
///
/// Every field except `date` is kept as the text the page displayed, with
/// the unit label removed from the numeric columns. Nothing is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationRecord {
    #[serde(rename = "Date", with = "iso_date")]
    pub date: Date,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Temperature")]
    pub temperature: String,
    #[serde(rename = "Dew Point")]
    pub dew_point: String,
    #[serde(rename = "Humidity")]
    pub humidity: String,
    #[serde(rename = "Wind")]
    pub wind: String,
    #[serde(rename = "Wind Speed")]
    pub wind_speed: String,
    #[serde(rename = "Wind Gust")]
    pub wind_gust: String,
    #[serde(rename = "Pressure")]
    pub pressure: String,
    #[serde(rename = "Precip.")]
    pub precipitation: String,
    #[serde(rename = "Condition")]
    pub condition: String,
}

/// The table columns a record is built from, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Time,
    Temperature,
    DewPoint,
    Humidity,
    Wind,
    WindSpeed,
    WindGust,
    Pressure,
    Precipitation,
    Condition,
}

impl ObservationRecord {
    /// A record for `date` with every text field empty.
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            time: String::new(),
            temperature: String::new(),
            dew_point: String::new(),
            humidity: String::new(),
            wind: String::new(),
            wind_speed: String::new(),
            wind_gust: String::new(),
            pressure: String::new(),
            precipitation: String::new(),
            condition: String::new(),
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Time => &mut self.time,
            Field::Temperature => &mut self.temperature,
            Field::DewPoint => &mut self.dew_point,
            Field::Humidity => &mut self.humidity,
            Field::Wind => &mut self.wind,
            Field::WindSpeed => &mut self.wind_speed,
            Field::WindGust => &mut self.wind_gust,
            Field::Pressure => &mut self.pressure,
            Field::Precipitation => &mut self.precipitation,
            Field::Condition => &mut self.condition,
        }
    }
}

/// All the records scraped for a single day, in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyObservations {
    pub date: Date,
    pub records: Vec<ObservationRecord>,
}

impl DailyObservations {
    pub fn new(date: Date, records: Vec<ObservationRecord>) -> Self {
        Self { date, records }
    }

    pub fn empty(date: Date) -> Self {
        Self::new(date, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PartialOrd for DailyObservations {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DailyObservations {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearlyObservations {
    pub year: i32,
    // Ascending, one entry per scraped date.
    pub days: Vec<DailyObservations>,
}

impl YearlyObservations {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            days: Vec::new(),
        }
    }

    pub fn push(&mut self, day: DailyObservations) {
        if let Some(last) = self.days.last() {
            if last.date >= day.date {
                log::warn!("days are not ordered: {} after {}", day.date, last.date);
            }
        }
        self.days.push(day);
    }

    pub fn first_date(&self) -> Option<Date> {
        self.days.first().map(|day| day.date)
    }

    pub fn last_date(&self) -> Option<Date> {
        self.days.last().map(|day| day.date)
    }

    /// Every record of the year, flattened across days.
    pub fn records(&self) -> impl Iterator<Item = &ObservationRecord> {
        self.days.iter().flat_map(|day| day.records.iter())
    }

    pub fn empty_days(&self) -> usize {
        self.days.iter().filter(|day| day.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn record(date: Date, time: &str) -> ObservationRecord {
        let mut record = ObservationRecord::empty(date);
        record.time = time.to_string();
        record
    }

    #[test]
    fn field_mut_targets_named_field() {
        let mut record = ObservationRecord::empty(date!(2014 - 01 - 01));
        *record.field_mut(Field::DewPoint) = "12".to_string();
        *record.field_mut(Field::Precipitation) = "0.0".to_string();
        assert_eq!(record.dew_point, "12");
        assert_eq!(record.precipitation, "0.0");
        assert!(record.temperature.is_empty());
    }

    #[test]
    fn records_flatten_days_in_order() {
        let mut year = YearlyObservations::new(2014);
        let first = date!(2014 - 01 - 01);
        let second = date!(2014 - 01 - 02);
        year.push(DailyObservations::new(
            first,
            vec![record(first, "12:53 AM"), record(first, "1:53 AM")],
        ));
        year.push(DailyObservations::empty(second));

        let times: Vec<_> = year.records().map(|r| r.time.as_str()).collect();
        assert_eq!(times, ["12:53 AM", "1:53 AM"]);
        assert_eq!(year.empty_days(), 1);
        assert_eq!(year.first_date(), Some(first));
        assert_eq!(year.last_date(), Some(second));
    }
}
