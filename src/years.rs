//! Parsing of year lists such as `2014,2022` or `2014-2016,2020`.

use std::{fmt, str::FromStr};

use logos::{Lexer, Logos};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t]+")]
enum Token {
    #[regex("[0-9]+")]
    Number,
    #[token(",")]
    Comma,
    #[token("-")]
    Dash,
}

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum YearsError {
    #[error("No year given")]
    #[diagnostic(code(weather_history::years::empty))]
    Empty,
    #[error("Expected a year, found `{0}`")]
    #[diagnostic(
        code(weather_history::years::expected_year),
        help("years are written in full, e.g. `2014,2022` or `2014-2016`")
    )]
    ExpectedYear(String),
    #[error("Year `{0}` is out of range")]
    #[diagnostic(code(weather_history::years::out_of_range))]
    OutOfRange(String),
    #[error("Unexpected `{0}` after a year")]
    #[diagnostic(code(weather_history::years::unexpected))]
    Unexpected(String),
    #[error("Range {0}-{1} goes backwards")]
    #[diagnostic(code(weather_history::years::reversed_range))]
    ReversedRange(i32, i32),
}

/// An ordered list of years without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Years(pub Vec<i32>);

impl fmt::Display for Years {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, year) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{year}")?;
        }
        Ok(())
    }
}

impl FromStr for Years {
    type Err = YearsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(YearsError::Empty);
        }

        let mut lexer = Token::lexer(s);
        let mut years: Vec<i32> = Vec::new();
        let mut push = |year: i32| {
            if !years.contains(&year) {
                years.push(year);
            }
        };

        loop {
            let start = year(&mut lexer)?;
            let mut separator = lexer.next();

            if let Some(Ok(Token::Dash)) = separator {
                let end = year(&mut lexer)?;
                if end < start {
                    return Err(YearsError::ReversedRange(start, end));
                }
                (start..=end).for_each(&mut push);
                separator = lexer.next();
            } else {
                push(start);
            }

            match separator {
                None => break,
                Some(Ok(Token::Comma)) => continue,
                Some(_) => return Err(YearsError::Unexpected(lexer.slice().to_string())),
            }
        }

        Ok(Self(years))
    }
}

fn year(lexer: &mut Lexer<'_, Token>) -> Result<i32, YearsError> {
    match lexer.next() {
        Some(Ok(Token::Number)) => lexer
            .slice()
            .parse()
            .map_err(|_| YearsError::OutOfRange(lexer.slice().to_string())),
        Some(_) => Err(YearsError::ExpectedYear(lexer.slice().to_string())),
        None => Err(YearsError::ExpectedYear(String::from("end of input"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Vec<i32>, YearsError> {
        s.parse::<Years>().map(|years| years.0)
    }

    #[test]
    fn single_and_list() {
        assert_eq!(parse("2014"), Ok(vec![2014]));
        assert_eq!(parse("2014,2022"), Ok(vec![2014, 2022]));
        assert_eq!(parse(" 2022 , 2014 "), Ok(vec![2022, 2014]));
    }

    #[test]
    fn ranges_are_inclusive() {
        assert_eq!(parse("2014-2016"), Ok(vec![2014, 2015, 2016]));
        assert_eq!(parse("2010,2014-2015"), Ok(vec![2010, 2014, 2015]));
        assert_eq!(parse("2020-2020"), Ok(vec![2020]));
    }

    #[test]
    fn duplicates_keep_first_position() {
        assert_eq!(parse("2022,2014,2022,2013-2014"), Ok(vec![2022, 2014, 2013]));
    }

    #[test]
    fn display_parses_back() {
        let years: Years = "2014-2016,2022".parse().unwrap();
        assert_eq!(years.to_string(), "2014,2015,2016,2022");
        assert_eq!(years.to_string().parse::<Years>(), Ok(years));
    }

    #[test]
    fn errors() {
        assert_eq!(parse(""), Err(YearsError::Empty));
        assert_eq!(parse("2014,"), Err(YearsError::ExpectedYear(String::from("end of input"))));
        assert_eq!(parse("2014 2015"), Err(YearsError::Unexpected(String::from("2015"))));
        assert_eq!(parse("2016-2014"), Err(YearsError::ReversedRange(2016, 2014)));
        assert!(matches!(parse("abc"), Err(YearsError::ExpectedYear(_))));
        assert_eq!(
            parse("99999999999"),
            Err(YearsError::OutOfRange(String::from("99999999999")))
        );
    }
}
