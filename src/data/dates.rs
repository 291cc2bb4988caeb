// dates.rs - Flexible collection-date parsing for GISAID date fields

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rayon::prelude::*;

/// Tokens that mean "no date" and are never handed to a format parser
pub const NULL_DATE_TOKENS: [&str; 7] = ["", "Unknown", "unknown", "N/A", "NA", "None", "none"];

/// Layouts tried by the permissive last-resort parser
const GENERIC_DATE_FORMATS: [&str; 10] = [
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%d %b %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%B %d, %Y",
];

const GENERIC_DATETIME_FORMATS: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Supported collection-date layouts, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    YearMonthDay,
    /// `YYYY-MM` (first day of the month)
    YearMonth,
    /// `YYYY` (first day of the year)
    Year,
    /// `DD-Mon-YYYY`
    DayMonYear,
    /// `Mon-YYYY` (first day of the month)
    MonYear,
    /// `Mon-DD-YYYY`
    MonDayYear,
    /// `YYYYMMDD`
    Compact,
}

impl DateFormat {
    /// Priority order: the first layout that parses wins
    pub const PRIORITY: [DateFormat; 7] = [
        DateFormat::YearMonthDay,
        DateFormat::YearMonth,
        DateFormat::Year,
        DateFormat::DayMonYear,
        DateFormat::MonYear,
        DateFormat::MonDayYear,
        DateFormat::Compact,
    ];

    /// Try to parse an already-trimmed string with this layout only
    pub fn parse(&self, s: &str) -> Option<NaiveDate> {
        match self {
            DateFormat::YearMonthDay => {
                let (year, _) = s.split_once('-')?;
                if !is_digits(year, 4, 4) {
                    return None;
                }
                NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
            }
            DateFormat::YearMonth => {
                let (year, month) = s.split_once('-')?;
                if !is_digits(year, 4, 4) || !is_digits(month, 1, 2) {
                    return None;
                }
                NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
            }
            DateFormat::Year => {
                if !is_digits(s, 4, 4) {
                    return None;
                }
                NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1)
            }
            DateFormat::DayMonYear | DateFormat::MonYear | DateFormat::MonDayYear => {
                let (_, year) = s.rsplit_once('-')?;
                if !is_digits(year, 4, 4) {
                    return None;
                }
                match self {
                    DateFormat::DayMonYear => NaiveDate::parse_from_str(s, "%d-%b-%Y").ok(),
                    DateFormat::MonYear => {
                        NaiveDate::parse_from_str(&format!("01-{}", s), "%d-%b-%Y").ok()
                    }
                    _ => NaiveDate::parse_from_str(s, "%b-%d-%Y").ok(),
                }
            }
            DateFormat::Compact => {
                if !is_digits(s, 8, 8) {
                    return None;
                }
                NaiveDate::from_ymd_opt(
                    s[0..4].parse().ok()?,
                    s[4..6].parse().ok()?,
                    s[6..8].parse().ok()?,
                )
            }
        }
    }
}

fn is_digits(s: &str, min_len: usize, max_len: usize) -> bool {
    (min_len..=max_len).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Check for a null sentinel (after trimming)
pub fn is_null_token(raw: &str) -> bool {
    NULL_DATE_TOKENS.contains(&raw.trim())
}

/// Last-resort permissive parse for layouts outside the GISAID set
fn parse_generic(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in GENERIC_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    GENERIC_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse one date string, trying every supported layout in priority order.
/// Null sentinels and unparseable input give `None`.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if NULL_DATE_TOKENS.contains(&s) {
        return None;
    }
    DateFormat::PRIORITY
        .iter()
        .find_map(|format| format.parse(s))
        .or_else(|| parse_generic(s))
}

/// Fallback path for one string that missed the dominant layout
fn parse_fallback(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if NULL_DATE_TOKENS.contains(&s) {
        return None;
    }
    DateFormat::PRIORITY[1..]
        .iter()
        .find_map(|format| format.parse(s))
        .or_else(|| parse_generic(s))
}

/// Two-pass batch parser: the dominant `YYYY-MM-DD` layout is applied to the
/// whole batch first, then only the misses go through the full fallback chain.
/// Output order matches input order.
pub fn batch_parse_dates<S: AsRef<str> + Sync>(raw_dates: &[S]) -> Vec<Option<NaiveDate>> {
    let mut parsed: Vec<Option<NaiveDate>> = raw_dates
        .par_iter()
        .map(|raw| DateFormat::YearMonthDay.parse(raw.as_ref().trim()))
        .collect();

    let misses: Vec<usize> = parsed
        .iter()
        .enumerate()
        .filter(|(i, date)| date.is_none() && !is_null_token(raw_dates[*i].as_ref()))
        .map(|(i, _)| i)
        .collect();

    for i in misses {
        parsed[i] = parse_fallback(raw_dates[i].as_ref());
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_gisaid_layouts() {
        assert_eq!(parse_flexible_date("2024-01-17"), Some(ymd(2024, 1, 17)));
        assert_eq!(parse_flexible_date("2024-03"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_flexible_date("1987"), Some(ymd(1987, 1, 1)));
        assert_eq!(parse_flexible_date("09-Apr-2009"), Some(ymd(2009, 4, 9)));
        assert_eq!(parse_flexible_date("Apr-2009"), Some(ymd(2009, 4, 1)));
        assert_eq!(parse_flexible_date("Apr-09-2009"), Some(ymd(2009, 4, 9)));
        assert_eq!(parse_flexible_date("20090409"), Some(ymd(2009, 4, 9)));
        assert_eq!(parse_flexible_date("  2024-01-17 "), Some(ymd(2024, 1, 17)));
    }

    #[test]
    fn test_null_tokens() {
        for token in NULL_DATE_TOKENS {
            assert_eq!(parse_flexible_date(token), None);
        }
        assert!(is_null_token(" NA "));
        assert!(!is_null_token("2024"));
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(parse_flexible_date("2024/02/29"), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_flexible_date("2024-01-17T08:30:00Z"), Some(ymd(2024, 1, 17)));
        assert_eq!(parse_flexible_date("2024-01-17 08:30:00"), Some(ymd(2024, 1, 17)));
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(parse_flexible_date("2023-02-30"), None);
        assert_eq!(parse_flexible_date("2024-13"), None);
        assert_eq!(parse_flexible_date("not a date"), None);
        assert_eq!(parse_flexible_date("99999999"), None);
    }

    #[test]
    fn test_short_years_are_rejected() {
        assert_eq!(DateFormat::YearMonthDay.parse("99-01-01"), None);
        assert_eq!(DateFormat::YearMonthDay.parse("999-01-01"), None);
        assert_eq!(DateFormat::DayMonYear.parse("09-Apr-09"), None);
        assert_eq!(DateFormat::MonYear.parse("Apr-09"), None);
        assert_eq!(DateFormat::MonDayYear.parse("Apr-09-209"), None);
        assert_eq!(parse_flexible_date("99-01-01"), None);
        assert_eq!(batch_parse_dates(&["99-01-01", "2099-01-01"]), vec![None, Some(ymd(2099, 1, 1))]);
    }

    #[test]
    fn test_batch_matches_single_parse() {
        let raw = vec![
            "2024-01-17",
            "2024-02",
            "",
            "Unknown",
            "1987",
            "17-Jan-2024",
            "garbage",
            "20240117",
        ];
        let batch = batch_parse_dates(&raw);
        let single: Vec<_> = raw.iter().map(|s| parse_flexible_date(s)).collect();
        assert_eq!(batch, single);
        assert_eq!(batch.len(), raw.len());
    }

    #[test]
    fn test_batch_empty() {
        let empty: Vec<String> = Vec::new();
        assert!(batch_parse_dates(&empty).is_empty());
    }
}
