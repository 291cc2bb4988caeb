// sampler.rs - Lifespan classification and adaptive representative sampling

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::core::temporal::{date_span, Granularity, Period};
use crate::core::waves::{WaveAnalysis, WaveDetector};
use crate::data::record::Record;

/// Spans shorter than this are Micro
pub const MICRO_MAX_DAYS: i64 = 90;
/// Spans up to and including this are Seasonal
pub const SEASONAL_MAX_DAYS: i64 = 270;
/// Peaks needed before wave sampling is preferred over quarters
pub const MIN_WAVE_PEAKS: usize = 2;

/// Dataset lifespan category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LifespanCategory {
    Micro,
    Seasonal,
    Endemic,
}

impl LifespanCategory {
    /// Classify a span in days
    pub fn from_span_days(days: i64) -> Self {
        if days < MICRO_MAX_DAYS {
            LifespanCategory::Micro
        } else if days <= SEASONAL_MAX_DAYS {
            LifespanCategory::Seasonal
        } else {
            LifespanCategory::Endemic
        }
    }
}

impl FromStr for LifespanCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "micro" => Ok(LifespanCategory::Micro),
            "seasonal" => Ok(LifespanCategory::Seasonal),
            "endemic" => Ok(LifespanCategory::Endemic),
            _ => Err(format!(
                "Invalid lifespan category: {}. Use: micro, seasonal, endemic, auto",
                s
            )),
        }
    }
}

impl fmt::Display for LifespanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifespanCategory::Micro => write!(f, "Micro"),
            LifespanCategory::Seasonal => write!(f, "Seasonal"),
            LifespanCategory::Endemic => write!(f, "Endemic"),
        }
    }
}

/// Strategy actually used to build a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SamplingStrategy {
    WeeklySentinel,
    MonthlySentinel,
    WaveRepresentatives,
    QuarterlySentinel,
}

impl fmt::Display for SamplingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingStrategy::WeeklySentinel => write!(f, "weekly sentinel"),
            SamplingStrategy::MonthlySentinel => write!(f, "monthly sentinel"),
            SamplingStrategy::WaveRepresentatives => write!(f, "wave representatives"),
            SamplingStrategy::QuarterlySentinel => write!(f, "quarterly sentinel"),
        }
    }
}

/// Result of one sampling run
#[derive(Debug, Clone)]
pub struct SamplingOutcome {
    pub category: LifespanCategory,
    pub strategy: SamplingStrategy,
    pub records: Vec<Record>,
    /// Present when wave detection ran (Endemic datasets)
    pub analysis: Option<WaveAnalysis>,
}

/// Picks sampling resolution from the dataset's temporal span
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveSampler {
    detector: WaveDetector,
    group_by_identity: bool,
}

impl Default for AdaptiveSampler {
    fn default() -> Self {
        Self::new(WaveDetector::default())
    }
}

impl AdaptiveSampler {
    pub fn new(detector: WaveDetector) -> Self {
        Self {
            detector,
            group_by_identity: true,
        }
    }

    /// Group sentinel buckets by period alone instead of (hash, period)
    pub fn without_identity(mut self) -> Self {
        self.group_by_identity = false;
        self
    }

    /// Micro below 90 days, Seasonal up to 270, Endemic beyond; Seasonal when undated
    pub fn classify(&self, records: &[Record]) -> LifespanCategory {
        match date_span(records) {
            Some((first, last)) => LifespanCategory::from_span_days((last - first).num_days()),
            None => LifespanCategory::Seasonal,
        }
    }

    /// Representative subset for a category
    pub fn sample(&self, records: &[Record], category: LifespanCategory) -> Vec<Record> {
        self.dispatch(records, category).records
    }

    /// Classify, then sample
    pub fn run(&self, records: &[Record]) -> SamplingOutcome {
        self.dispatch(records, self.classify(records))
    }

    pub fn run_with(&self, records: &[Record], category: Option<LifespanCategory>) -> SamplingOutcome {
        match category {
            Some(category) => self.dispatch(records, category),
            None => self.run(records),
        }
    }

    fn dispatch(&self, records: &[Record], category: LifespanCategory) -> SamplingOutcome {
        let outcome = |strategy, sampled, analysis| SamplingOutcome {
            category,
            strategy,
            records: sampled,
            analysis,
        };

        match category {
            LifespanCategory::Micro => outcome(
                SamplingStrategy::WeeklySentinel,
                self.sentinel(records, Granularity::Week),
                None,
            ),
            LifespanCategory::Seasonal => outcome(
                SamplingStrategy::MonthlySentinel,
                self.sentinel(records, Granularity::Month),
                None,
            ),
            LifespanCategory::Endemic => {
                let analysis = self.detector.detect(records);
                if analysis.wave_count >= MIN_WAVE_PEAKS {
                    let reps = wave_representatives(records, &analysis);
                    outcome(SamplingStrategy::WaveRepresentatives, reps, Some(analysis))
                } else {
                    outcome(
                        SamplingStrategy::QuarterlySentinel,
                        self.sentinel(records, Granularity::Quarter),
                        Some(analysis),
                    )
                }
            }
        }
    }

    /// Chronologically first record of every (hash, period) bucket, in date order.
    /// Undated records are dropped.
    pub fn sentinel(&self, records: &[Record], granularity: Granularity) -> Vec<Record> {
        let mut dated: Vec<&Record> = records
            .iter()
            .filter(|r| r.collection_date.is_some())
            .collect();
        dated.sort_by_key(|r| r.collection_date);

        let mut seen: HashSet<(&str, Period)> = HashSet::new();
        dated
            .into_iter()
            .filter(|r| {
                let Some(date) = r.collection_date else {
                    return false;
                };
                let hash = if self.group_by_identity {
                    r.sequence_hash.as_str()
                } else {
                    ""
                };
                seen.insert((hash, granularity.period_of(date)))
            })
            .cloned()
            .collect()
    }

    /// Evenly spaced records across the date-sorted collection (undated last)
    pub fn chronological(records: &[Record], target_n: usize) -> Vec<Record> {
        if records.len() <= target_n {
            return records.to_vec();
        }
        if target_n == 0 {
            return Vec::new();
        }
        let mut sorted: Vec<&Record> = records.iter().collect();
        sorted.sort_by_key(|r| (r.collection_date.is_none(), r.collection_date));

        let step = sorted.len() as f64 / target_n as f64;
        (0..target_n)
            .map(|i| sorted[(i as f64 * step) as usize].clone())
            .collect()
    }
}

/// Earliest and latest record, then the first record of each peak and trough
/// week, de-duplicated by sequence hash
pub fn wave_representatives(records: &[Record], analysis: &WaveAnalysis) -> Vec<Record> {
    let dated: Vec<&Record> = records
        .iter()
        .filter(|r| r.collection_date.is_some())
        .collect();
    if dated.is_empty() {
        return Vec::new();
    }

    let mut picks: Vec<&Record> = Vec::new();
    if let Some(first) = dated.iter().copied().min_by_key(|r| r.collection_date) {
        picks.push(first);
    }
    if let Some(last) = dated.iter().copied().max_by_key(|r| r.collection_date) {
        picks.push(last);
    }

    let mut periods: Vec<Period> = analysis
        .peaks
        .iter()
        .chain(analysis.troughs.iter())
        .map(|(p, _)| *p)
        .collect();
    periods.sort();
    periods.dedup();

    for period in &periods {
        let hit = dated.iter().copied().find(|r| {
            r.collection_date
                .map(|d| period.granularity.period_of(d) == *period)
                .unwrap_or(false)
        });
        if let Some(record) = hit {
            picks.push(record);
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    picks
        .into_iter()
        .filter(|r| seen.insert(r.sequence_hash.as_str()))
        .cloned()
        .collect()
}
