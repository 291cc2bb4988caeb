// refine.rs - Convenience filters layered on the filter engine

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::core::filter::{FilterEngine, FilterOperator, FilterRule, RuleValue};
use crate::data::record::{Record, CLADE_LEVELS};

/// Deduplication key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupMode {
    /// `sequence_hash` alone
    Sequence,
    /// `(sequence_hash, subtype_clean)`
    SequenceAndSubtype,
}

impl FromStr for DedupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequence" | "hash" => Ok(DedupMode::Sequence),
            "seq+subtype" | "sequence+subtype" => Ok(DedupMode::SequenceAndSubtype),
            _ => Err(format!(
                "Invalid dedup mode: {}. Use: none, sequence, seq+subtype",
                s
            )),
        }
    }
}

impl fmt::Display for DedupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupMode::Sequence => write!(f, "sequence"),
            DedupMode::SequenceAndSubtype => write!(f, "seq+subtype"),
        }
    }
}

/// Keep records with `sequence_length >= min_length`
pub fn min_length(records: &[Record], min_length: usize) -> Vec<Record> {
    records
        .iter()
        .filter(|r| r.sequence_length >= min_length)
        .cloned()
        .collect()
}

/// Drop records containing `threshold` consecutive `N` bases. 0 disables the filter.
pub fn max_n_run(records: &[Record], threshold: usize) -> Vec<Record> {
    if threshold == 0 {
        return records.to_vec();
    }
    let run = "N".repeat(threshold);
    records
        .iter()
        .filter(|r| !r.sequence.contains(&run))
        .cloned()
        .collect()
}

/// Keep the first record of every dedup key
pub fn deduplicate(records: &[Record], mode: DedupMode) -> Vec<Record> {
    let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|r| {
            let subtype = match mode {
                DedupMode::Sequence => "",
                DedupMode::SequenceAndSubtype => r.subtype_clean.as_str(),
            };
            seen.insert((r.sequence_hash.as_str(), subtype))
        })
        .cloned()
        .collect()
}

/// Keep records whose accession is in the allow-list. An empty list keeps everything.
pub fn filter_accessions(records: &[Record], accessions: &HashSet<String>) -> Vec<Record> {
    if accessions.is_empty() {
        return records.to_vec();
    }
    let allowed: HashSet<&str> = accessions.iter().map(|a| a.trim()).collect();
    records
        .iter()
        .filter(|r| allowed.contains(r.accession.trim()))
        .cloned()
        .collect()
}

/// Clade filter. With a level, the clade prefix at that level must equal `pattern`;
/// without one, the raw clade must start with it.
pub fn clade_filter(records: &[Record], pattern: &str, level: Option<usize>) -> Vec<Record> {
    let rule = match level {
        Some(level) if (1..=CLADE_LEVELS).contains(&level) => {
            FilterRule::equals(&format!("clade_level_{}", level), pattern)
        }
        _ => FilterRule::new("clade", FilterOperator::StartsWith, pattern.trim()),
    };
    FilterEngine::new(&[rule]).apply(records)
}

/// Keep records whose `subtype_clean` is one of `subtypes`
pub fn subtype_filter(records: &[Record], subtypes: &[String]) -> Vec<Record> {
    if subtypes.is_empty() {
        return records.to_vec();
    }
    let rule = FilterRule::new(
        "subtype_clean",
        FilterOperator::InList,
        RuleValue::List(subtypes.iter().cloned().map(RuleValue::Text).collect()),
    );
    FilterEngine::new(&[rule]).apply(records)
}

/// Quality and identity refinements applied after rule filtering
#[derive(Debug, Clone, Default)]
pub struct RefineOptions {
    pub min_length: Option<usize>,
    pub max_n_run: Option<usize>,
    pub dedup: Option<DedupMode>,
    pub accessions: HashSet<String>,
}

impl RefineOptions {
    pub fn is_noop(&self) -> bool {
        self.min_length.is_none()
            && self.max_n_run.unwrap_or(0) == 0
            && self.dedup.is_none()
            && self.accessions.is_empty()
    }
}

/// Apply refinements in order: accessions, length, N runs, dedup
pub fn refine(records: &[Record], options: &RefineOptions) -> Vec<Record> {
    let mut current = filter_accessions(records, &options.accessions);
    if let Some(n) = options.min_length {
        current = min_length(&current, n);
    }
    if let Some(threshold) = options.max_n_run {
        current = max_n_run(&current, threshold);
    }
    if let Some(mode) = options.dedup {
        current = deduplicate(&current, mode);
    }
    current
}
