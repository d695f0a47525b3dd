//! Turns a rendered history page into observation records.
//!
//! The page shows one `table.mat-table` whose `tr.mat-row` rows are the
//! hourly observations. Cells are identified by position only; [`COLUMNS`]
//! is the single place that knows which cell feeds which field.

use std::sync::LazyLock;

use miette::Diagnostic;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use time::Date;

use crate::{DailyObservations, Field, ObservationRecord};

/// CSS selector of the observation table. Also the marker the fetcher waits for.
pub const TABLE_SELECTOR: &str = "table.mat-table";
const ROW_SELECTOR: &str = "tr.mat-row";
const CELL_SELECTOR: &str = "td";

/// Separator between a value and its unit label, e.g. `30\u{a0}°F`.
const UNIT_SEPARATOR: char = '\u{a0}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    /// Trimmed text, kept whole.
    Text,
    /// Trimmed text with the unit label cut off.
    Value,
}

const COLUMNS: [(Field, Cell); 10] = [
    (Field::Time, Cell::Text),
    (Field::Temperature, Cell::Value),
    (Field::DewPoint, Cell::Value),
    (Field::Humidity, Cell::Value),
    (Field::Wind, Cell::Text),
    (Field::WindSpeed, Cell::Value),
    (Field::WindGust, Cell::Value),
    (Field::Pressure, Cell::Value),
    (Field::Precipitation, Cell::Value),
    (Field::Condition, Cell::Text),
];

struct Selectors {
    table: Selector,
    row: Selector,
    cell: Selector,
}

// The selectors are string constants, so parsing them only fails if one of
// the constants above is edited into invalid CSS. Every extract test hits this.
static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    table: Selector::parse(TABLE_SELECTOR).expect("table selector is valid"),
    row: Selector::parse(ROW_SELECTOR).expect("row selector is valid"),
    cell: Selector::parse(CELL_SELECTOR).expect("cell selector is valid"),
});

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ExtractError {
    #[error("No observation table in the page for {date}")]
    #[diagnostic(
        code(weather_history::extract::table_not_found),
        help("the page layout may have changed")
    )]
    TableNotFound { date: Date },
    #[error("Row {row} of {date} has {cells} cells, expected at least {}", COLUMNS.len())]
    #[diagnostic(code(weather_history::extract::malformed_row))]
    MalformedRow { date: Date, row: usize, cells: usize },
}

/// Extract every observation row of `document`, stamping each with `date`.
///
/// Rows without any `td` are skipped. A row with some cells but fewer than
/// the table needs is an error rather than a shifted record.
pub fn extract(document: &Html, date: Date) -> Result<DailyObservations, ExtractError> {
    let table = document
        .select(&SELECTORS.table)
        .next()
        .ok_or(ExtractError::TableNotFound { date })?;

    let mut records = Vec::new();
    for (row, tr) in table.select(&SELECTORS.row).enumerate() {
        let cells: Vec<ElementRef> = tr.select(&SELECTORS.cell).collect();
        if cells.is_empty() {
            continue;
        }
        if cells.len() < COLUMNS.len() {
            return Err(ExtractError::MalformedRow {
                date,
                row,
                cells: cells.len(),
            });
        }

        let mut record = ObservationRecord::empty(date);
        for ((field, kind), cell) in COLUMNS.iter().zip(&cells) {
            let text = cell_text(cell);
            *record.field_mut(*field) = match kind {
                Cell::Text => text,
                Cell::Value => strip_unit(&text).to_string(),
            };
        }
        records.push(record);
    }

    Ok(DailyObservations::new(date, records))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Trim `text` and drop everything from the first non-breaking space on.
pub fn strip_unit(text: &str) -> &str {
    let text = text.trim();
    match text.split_once(UNIT_SEPARATOR) {
        Some((value, _unit)) => value,
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn page(rows: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><body>
            <table class="mat-table">
              <thead><tr class="mat-header-row"><th>Time</th><th>Temperature</th></tr></thead>
              <tbody>{rows}</tbody>
            </table>
            </body></html>"#
        ))
    }

    fn row(time: &str, temp: &str, condition: &str) -> String {
        format!(
            r#"<tr class="mat-row">
              <td><span>{time}</span></td>
              <td><span class="wu-value">{temp}</span>&nbsp;<span class="wu-label">°F</span></td>
              <td>20&nbsp;°F</td>
              <td> 85&nbsp;% </td>
              <td>WSW</td>
              <td>13&nbsp;mph</td>
              <td>0&nbsp;mph</td>
              <td>29.62&nbsp;in</td>
              <td>0.0&nbsp;in</td>
              <td> {condition} </td>
            </tr>"#
        )
    }

    #[test]
    fn extracts_rows_in_table_order() {
        let day = date!(2014 - 01 - 01);
        let rows = [
            row("12:53 AM", "30", "Cloudy"),
            row("1:53 AM", "29", "Light Snow"),
            row("2:53 AM", "28", "Fair"),
        ]
        .concat();

        let daily = extract(&page(&rows), day).unwrap();
        assert_eq!(daily.date, day);
        assert_eq!(daily.records.len(), 3);

        let first = &daily.records[0];
        assert_eq!(first.date, day);
        assert_eq!(first.time, "12:53 AM");
        assert_eq!(first.temperature, "30");
        assert_eq!(first.dew_point, "20");
        assert_eq!(first.humidity, "85");
        assert_eq!(first.wind, "WSW");
        assert_eq!(first.wind_speed, "13");
        assert_eq!(first.wind_gust, "0");
        assert_eq!(first.pressure, "29.62");
        assert_eq!(first.precipitation, "0.0");
        assert_eq!(first.condition, "Cloudy");

        let times: Vec<_> = daily.records.iter().map(|r| r.time.as_str()).collect();
        assert_eq!(times, ["12:53 AM", "1:53 AM", "2:53 AM"]);
        assert!(daily.records.iter().all(|r| r.date == day));
    }

    #[test]
    fn text_columns_keep_their_nbsp() {
        let rows = r#"<tr class="mat-row">
              <td> 12:53&nbsp;AM </td>
              <td>30&nbsp;°F</td><td>20&nbsp;°F</td><td>85&nbsp;%</td>
              <td>W&nbsp;SW</td>
              <td>13&nbsp;mph</td><td>0&nbsp;mph</td><td>29.62&nbsp;in</td><td>0.0&nbsp;in</td>
              <td>Light&nbsp;Snow</td>
            </tr>"#;

        let daily = extract(&page(rows), date!(2014 - 01 - 01)).unwrap();
        let record = &daily.records[0];
        assert_eq!(record.time, "12:53\u{a0}AM");
        assert_eq!(record.wind, "W\u{a0}SW");
        assert_eq!(record.condition, "Light\u{a0}Snow");
        assert_eq!(record.temperature, "30");
        assert_eq!(record.precipitation, "0.0");
    }

    #[test]
    fn empty_table_gives_empty_day() {
        let daily = extract(&page(""), date!(2022 - 06 - 01)).unwrap();
        assert!(daily.is_empty());
    }

    #[test]
    fn rows_without_cells_are_skipped() {
        let rows = format!(
            r#"<tr class="mat-row"></tr>{}"#,
            row("12:53 AM", "30", "Fair")
        );
        let daily = extract(&page(&rows), date!(2022 - 06 - 01)).unwrap();
        assert_eq!(daily.records.len(), 1);
    }

    #[test]
    fn short_row_is_malformed() {
        let rows = format!(
            r#"{}<tr class="mat-row"><td>1:53 AM</td><td>30</td><td>20</td><td>85</td></tr>"#,
            row("12:53 AM", "30", "Fair")
        );
        let day = date!(2022 - 06 - 01);
        assert_eq!(
            extract(&page(&rows), day),
            Err(ExtractError::MalformedRow {
                date: day,
                row: 1,
                cells: 4
            })
        );
    }

    #[test]
    fn missing_table_is_reported() {
        let day = date!(2022 - 06 - 01);
        let document = Html::parse_document("<html><body><p>Loading…</p></body></html>");
        assert_eq!(
            extract(&document, day),
            Err(ExtractError::TableNotFound { date: day })
        );
    }

    #[test]
    fn strip_unit_keeps_text_before_first_nbsp() {
        assert_eq!(strip_unit("30\u{a0}°F"), "30");
        assert_eq!(strip_unit("  29.62\u{a0}in\u{a0}Hg "), "29.62");
        assert_eq!(strip_unit(" Calm "), "Calm");
        assert_eq!(strip_unit(""), "");
        assert_eq!(strip_unit(strip_unit("30\u{a0}°F")), "30");
    }
}
