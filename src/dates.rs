use time::{
    error::{ComponentRange, Format},
    format_description::BorrowedFormatItem,
    macros::format_description,
    Date,
};

/// `YYYY-MM-DD`, shared by history URLs and the CSV `Date` column.
pub const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Every day of `year`, January 1st to December 31st inclusive.
///
/// Fails when `year` is outside the range `time` can represent.
pub fn days_of_year(year: i32) -> Result<YearDays, ComponentRange> {
    Ok(YearDays {
        next: Some(Date::from_ordinal_date(year, 1)?),
        year,
    })
}

pub fn iso(date: Date) -> Result<String, Format> {
    date.format(ISO_DATE)
}

#[derive(Debug, Clone)]
pub struct YearDays {
    next: Option<Date>,
    year: i32,
}

impl Iterator for YearDays {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let current = self.next?;
        self.next = current.next_day().filter(|day| day.year() == self.year);
        Some(current)
    }
}
