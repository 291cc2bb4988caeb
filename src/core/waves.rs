// waves.rs - Epidemic wave detection on aggregated weekly counts

use serde::Serialize;
use std::fmt;

use crate::core::temporal::{aggregate, CountSeries, Granularity, Period};
use crate::data::record::Record;

pub const DEFAULT_SENSITIVITY: f64 = 0.5;
pub const DEFAULT_MIN_PEAK_HEIGHT: usize = 5;
/// Minimum separation, in periods, between accepted peaks
pub const PEAK_DISTANCE: usize = 2;
/// Series shorter than this are not analysed
pub const MIN_PERIODS: usize = 3;
/// Months of data needed for off-season detection
pub const MIN_MONTHS: usize = 4;

/// Peaks, troughs and the weekly series they were found on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveAnalysis {
    pub peaks: Vec<(Period, usize)>,
    pub troughs: Vec<(Period, usize)>,
    pub wave_count: usize,
    pub series: CountSeries,
}

impl WaveAnalysis {
    fn empty(series: CountSeries) -> Self {
        Self {
            peaks: Vec::new(),
            troughs: Vec::new(),
            wave_count: 0,
            series,
        }
    }
}

/// Checklist candidate kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CandidateKind {
    #[serde(rename = "Major Peak")]
    MajorPeak,
    #[serde(rename = "Wave Trough")]
    WaveTrough,
    #[serde(rename = "Off-Season Cluster")]
    OffSeasonCluster,
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateKind::MajorPeak => write!(f, "Major Peak"),
            CandidateKind::WaveTrough => write!(f, "Wave Trough"),
            CandidateKind::OffSeasonCluster => write!(f, "Off-Season Cluster"),
        }
    }
}

/// One selectable checklist item. Only peaks carry a rank (1 = largest).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub period: Period,
    pub count: usize,
    pub kind: CandidateKind,
    pub rank: Option<usize>,
}

/// Peak/trough detector. Works on the weekly series only, never on rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveDetector {
    sensitivity: f64,
    min_peak_height: usize,
}

impl Default for WaveDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY, DEFAULT_MIN_PEAK_HEIGHT)
    }
}

impl WaveDetector {
    /// `sensitivity` is clamped to `[0, 1]`
    pub fn new(sensitivity: f64, min_peak_height: usize) -> Self {
        let sensitivity = if sensitivity.is_nan() {
            DEFAULT_SENSITIVITY
        } else {
            sensitivity.clamp(0.0, 1.0)
        };
        Self {
            sensitivity,
            min_peak_height,
        }
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn min_peak_height(&self) -> usize {
        self.min_peak_height
    }

    /// Aggregate to ISO weeks and detect waves
    pub fn detect(&self, records: &[Record]) -> WaveAnalysis {
        self.detect_series(aggregate(records, Granularity::Week))
    }

    pub fn detect_series(&self, series: CountSeries) -> WaveAnalysis {
        if series.len() < MIN_PERIODS {
            return WaveAnalysis::empty(series);
        }

        let counts: Vec<f64> = series.entries.iter().map(|(_, c)| *c as f64).collect();
        let peak_idx = find_peaks(
            &counts,
            self.min_peak_height as f64,
            self.prominence_threshold(&counts),
            PEAK_DISTANCE,
        );
        let trough_idx = find_troughs(&counts, &peak_idx);

        let pick = |idx: &[usize]| -> Vec<(Period, usize)> {
            idx.iter().map(|&i| series.entries[i]).collect()
        };
        let peaks = pick(&peak_idx);
        let troughs = pick(&trough_idx);

        WaveAnalysis {
            wave_count: peaks.len(),
            peaks,
            troughs,
            series,
        }
    }

    /// `max(1, sensitivity * median(non-zero counts))`
    pub fn prominence_threshold(&self, counts: &[f64]) -> f64 {
        let non_zero: Vec<f64> = counts.iter().copied().filter(|&c| c > 0.0).collect();
        let median_count = median(&non_zero).unwrap_or(1.0);
        (self.sensitivity * median_count).max(1.0)
    }

    /// Peaks ranked by count, troughs and off-season months, ordered by period start
    pub fn candidate_peaks(&self, records: &[Record]) -> Vec<Candidate> {
        let analysis = self.detect(records);
        let mut candidates = Vec::new();

        let mut ranked = analysis.peaks.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        for (rank, (period, count)) in ranked.into_iter().enumerate() {
            candidates.push(Candidate {
                period,
                count,
                kind: CandidateKind::MajorPeak,
                rank: Some(rank + 1),
            });
        }

        for (period, count) in analysis.troughs {
            candidates.push(Candidate {
                period,
                count,
                kind: CandidateKind::WaveTrough,
                rank: None,
            });
        }

        for (period, count) in off_season_clusters(records) {
            candidates.push(Candidate {
                period,
                count,
                kind: CandidateKind::OffSeasonCluster,
                rank: None,
            });
        }

        candidates.sort_by_key(|c| c.period.start);
        candidates
    }
}

/// Low-activity months: `0 < count <= max(1, Q1 - 1.5 * IQR)` over monthly counts
pub fn off_season_clusters(records: &[Record]) -> Vec<(Period, usize)> {
    let monthly = aggregate(records, Granularity::Month);
    if monthly.len() < MIN_MONTHS {
        return Vec::new();
    }

    let counts: Vec<f64> = monthly.entries.iter().map(|(_, c)| *c as f64).collect();
    let q1 = quantile(&counts, 0.25);
    let q3 = quantile(&counts, 0.75);
    let low_threshold = (q1 - 1.5 * (q3 - q1)).max(1.0);

    monthly
        .entries
        .into_iter()
        .filter(|(_, count)| *count > 0 && (*count as f64) <= low_threshold)
        .collect()
}

/// Indices of local maxima passing height, distance and prominence filters.
/// Plateaus report their middle sample (rounded down).
pub fn find_peaks(counts: &[f64], height: f64, prominence: f64, distance: usize) -> Vec<usize> {
    let peaks: Vec<usize> = local_maxima(counts)
        .into_iter()
        .filter(|&i| counts[i] >= height)
        .collect();
    let peaks = select_by_distance(counts, &peaks, distance);
    peaks
        .into_iter()
        .filter(|&i| peak_prominence(counts, i) >= prominence)
        .collect()
}

/// Position of the minimum strictly between each pair of consecutive peaks
pub fn find_troughs(counts: &[f64], peaks: &[usize]) -> Vec<usize> {
    peaks
        .windows(2)
        .filter(|pair| pair[1] > pair[0] + 1)
        .filter_map(|pair| {
            (pair[0] + 1..pair[1]).min_by(|&a, &b| {
                counts[a]
                    .partial_cmp(&counts[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        })
        .collect()
}

/// Local maxima, excluding the first and last sample
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if x.len() < 3 {
        return maxima;
    }
    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    maxima
}

/// Keep the highest peaks first, dropping neighbours closer than `distance`
fn select_by_distance(x: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    if distance <= 1 || peaks.len() < 2 {
        return peaks.to_vec();
    }
    let mut keep = vec![true; peaks.len()];
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| {
        x[peaks[b]]
            .partial_cmp(&x[peaks[a]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for &j in &order {
        if !keep[j] {
            continue;
        }
        for k in (0..j).rev() {
            if peaks[j] - peaks[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..peaks.len() {
            if peaks[k] - peaks[j] >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Height above the higher of the two lowest points reachable on either
/// side before meeting a taller sample
pub fn peak_prominence(x: &[f64], peak: usize) -> f64 {
    let height = x[peak];

    let mut left_min = height;
    for &v in x[..=peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &x[peak..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Linear-interpolated quantile, `q` in `[0, 1]`
fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
