// temporal.rs - Calendar-aligned period bucketing and count series

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::data::record::Record;

/// Bucket size for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Week,
    Month,
    Quarter,
}

impl Granularity {
    /// Calendar-aligned period containing `date` (ISO week starts Monday)
    pub fn period_of(self, date: NaiveDate) -> Period {
        let start = match self {
            Granularity::Week => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            Granularity::Month => date.with_day(1).unwrap_or(date),
            Granularity::Quarter => {
                let month = (date.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
            }
        };
        Period {
            start,
            granularity: self,
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "w" => Ok(Granularity::Week),
            "month" | "m" => Ok(Granularity::Month),
            "quarter" | "q" => Ok(Granularity::Quarter),
            _ => Err(format!("Invalid period: {}. Use: week, month, quarter", s)),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Week => write!(f, "week"),
            Granularity::Month => write!(f, "month"),
            Granularity::Quarter => write!(f, "quarter"),
        }
    }
}

/// One calendar period, ordered by its start date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    pub start: NaiveDate,
    pub granularity: Granularity,
}

impl Period {
    /// Last day of the period (inclusive)
    pub fn end(&self) -> NaiveDate {
        match self.granularity {
            Granularity::Week => self.start + Duration::days(6),
            Granularity::Month => add_months(self.start, 1) - Duration::days(1),
            Granularity::Quarter => add_months(self.start, 3) - Duration::days(1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end()
    }

    /// `YYYY-Www`, `YYYY-MM` or `YYYYQn`
    pub fn label(&self) -> String {
        match self.granularity {
            Granularity::Week => {
                let iso = self.start.iso_week();
                format!("{}-W{:02}", iso.year(), iso.week())
            }
            Granularity::Month => self.start.format("%Y-%m").to_string(),
            Granularity::Quarter => {
                format!("{}Q{}", self.start.year(), self.start.month0() / 3 + 1)
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.month0() + months;
    let year = date.year() + (total / 12) as i32;
    NaiveDate::from_ymd_opt(year, total % 12 + 1, 1).unwrap_or(date)
}

/// Counts per observed period, strictly ascending by period start.
/// Periods with no records are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountSeries {
    pub granularity: Granularity,
    pub entries: Vec<(Period, usize)>,
}

impl CountSeries {
    pub fn from_dates<I>(dates: I, granularity: Granularity) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut buckets: BTreeMap<Period, usize> = BTreeMap::new();
        for date in dates {
            *buckets.entry(granularity.period_of(date)).or_insert(0) += 1;
        }
        Self {
            granularity,
            entries: buckets.into_iter().collect(),
        }
    }

    pub fn counts(&self) -> Vec<usize> {
        self.entries.iter().map(|(_, c)| *c).collect()
    }

    pub fn periods(&self) -> Vec<Period> {
        self.entries.iter().map(|(p, _)| *p).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of dated records
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }
}

/// Bucket dated records into periods; undated records are left out
pub fn aggregate(records: &[Record], granularity: Granularity) -> CountSeries {
    CountSeries::from_dates(records.iter().filter_map(|r| r.collection_date), granularity)
}

/// Records dated within `[start, end]` inclusive, in input order
pub fn records_in_window(records: &[Record], start: NaiveDate, end: NaiveDate) -> Vec<Record> {
    records
        .iter()
        .filter(|r| matches!(r.collection_date, Some(d) if start <= d && d <= end))
        .cloned()
        .collect()
}

/// Earliest record dated inside `period`; ties go to input order
pub fn first_in_period<'a>(records: &'a [Record], period: &Period) -> Option<&'a Record> {
    records
        .iter()
        .filter_map(|r| r.collection_date.map(|d| (d, r)))
        .filter(|(d, _)| period.contains(*d))
        .min_by_key(|(d, _)| *d)
        .map(|(_, r)| r)
}

/// Earliest and latest collection dates
pub fn date_span(records: &[Record]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = records.iter().filter_map(|r| r.collection_date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_record;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_periods_are_iso_aligned() {
        // 2021-01-03 is a Sunday in ISO week 2020-W53
        let period = Granularity::Week.period_of(date(2021, 1, 3));
        assert_eq!(period.start, date(2020, 12, 28));
        assert_eq!(period.label(), "2020-W53");
        assert_eq!(period.end(), date(2021, 1, 3));

        let monday = Granularity::Week.period_of(date(2021, 1, 4));
        assert_eq!(monday.label(), "2021-W01");
    }

    #[test]
    fn test_month_and_quarter_periods() {
        let month = Granularity::Month.period_of(date(2024, 2, 17));
        assert_eq!(month.label(), "2024-02");
        assert_eq!(month.end(), date(2024, 2, 29));

        let quarter = Granularity::Quarter.period_of(date(2023, 11, 30));
        assert_eq!(quarter.start, date(2023, 10, 1));
        assert_eq!(quarter.label(), "2023Q4");
        assert_eq!(quarter.end(), date(2023, 12, 31));
        assert!(quarter.contains(date(2023, 12, 31)));
        assert!(!quarter.contains(date(2024, 1, 1)));
    }

    #[test]
    fn test_series_from_dates_sorted() {
        let dates = vec![
            date(2020, 3, 15),
            date(2020, 1, 2),
            date(2020, 3, 1),
            date(2019, 12, 31),
            date(2020, 1, 20),
        ];
        let series = CountSeries::from_dates(dates, Granularity::Month);
        let labels: Vec<String> = series.periods().iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["2019-12", "2020-01", "2020-03"]);
        assert_eq!(series.counts(), vec![1, 2, 2]);
        assert_eq!(series.total(), 5);
    }

    #[test]
    fn test_aggregate_skips_undated() {
        let records = vec![
            parse_record("A/X/1/2020|H3N2|HA|2020-05-01|E1|", "A"),
            parse_record("A/X/2/2020|H3N2|HA|Unknown|E2|", "A"),
            parse_record("A/X/3/2020|H3N2|HA|2020-05-20|E3|", "A"),
        ];
        let series = aggregate(&records, Granularity::Quarter);
        assert_eq!(series.len(), 1);
        assert_eq!(series.total(), 2);
        assert!(aggregate(&[], Granularity::Week).is_empty());
    }

    #[test]
    fn test_window_and_first_in_period() {
        let records = vec![
            parse_record("A/X/1/2020|H3N2|HA|2020-05-20|E1|", "A"),
            parse_record("A/X/2/2020|H3N2|HA|2020-05-03|E2|", "A"),
            parse_record("A/X/3/2020|H3N2|HA|2020-05-03|E3|", "A"),
            parse_record("A/X/4/2020|H3N2|HA|2020-06-01|E4|", "A"),
        ];
        let window = records_in_window(&records, date(2020, 5, 3), date(2020, 5, 31));
        assert_eq!(window.len(), 3);

        let may = Granularity::Month.period_of(date(2020, 5, 1));
        assert_eq!(first_in_period(&records, &may).unwrap().accession, "E2");

        assert_eq!(date_span(&records), Some((date(2020, 5, 3), date(2020, 6, 1))));
        assert_eq!(date_span(&[]), None);
    }

    #[test]
    fn test_period_serializes_as_label() {
        let period = Granularity::Quarter.period_of(date(2020, 2, 2));
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"2020Q1\"");
    }
}
