// fields.rs - Field discovery and data-quality reporting

use serde::Serialize;
use std::collections::HashSet;

use crate::data::record::{Record, FIELD_NAMES};

/// Minimum share of populated records for a field to be offered as a filter target
pub const AVAILABILITY_THRESHOLD_PCT: usize = 10;

/// Records scanned for example values
const SAMPLE_SCAN: usize = 100;
const SAMPLE_VALUES: usize = 5;

/// Fields never offered as filter targets
const HIDDEN_FIELDS: [&str; 2] = ["sequence", "sequence_hash"];

/// Population statistics for one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub populated: usize,
    pub populated_pct: f64,
    pub n_unique: usize,
    pub sample_values: Vec<String>,
}

impl FieldSummary {
    pub fn compute(records: &[Record], name: &str) -> Self {
        let mut unique: HashSet<String> = HashSet::new();
        let mut populated = 0usize;
        for record in records {
            if let Some(value) = record.field(name) {
                if value.is_populated() {
                    populated += 1;
                    if let Some(text) = value.as_text() {
                        unique.insert(text.to_string());
                    }
                }
            }
        }

        let mut sample_values: Vec<String> = Vec::new();
        for record in records.iter().take(SAMPLE_SCAN) {
            if sample_values.len() == SAMPLE_VALUES {
                break;
            }
            if let Some(value) = record.field(name) {
                if let (true, Some(text)) = (value.is_populated(), value.as_text()) {
                    if !sample_values.iter().any(|v| v == text) {
                        sample_values.push(text.to_string());
                    }
                }
            }
        }

        Self {
            name: name.to_string(),
            populated,
            populated_pct: (share_pct(populated, records.len()) * 10.0).round() / 10.0,
            n_unique: unique.len(),
            sample_values,
        }
    }

    /// True when strictly more than 10% of `total` records populate the field.
    /// Compared on exact counts; `populated_pct` is rounded for display only.
    pub fn is_available(&self, total: usize) -> bool {
        self.populated as u128 * 100 > total as u128 * AVAILABILITY_THRESHOLD_PCT as u128
    }
}

fn share_pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Fields populated in more than 10% of records, in canonical field order
pub fn available_fields(records: &[Record]) -> Vec<FieldSummary> {
    if records.is_empty() {
        return Vec::new();
    }
    FIELD_NAMES
        .iter()
        .filter(|name| !HIDDEN_FIELDS.contains(name))
        .map(|name| FieldSummary::compute(records, name))
        .filter(|summary| summary.is_available(records.len()))
        .collect()
}

/// Counts of defaulted metadata, reported as quality signals rather than errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQualityReport {
    pub total: usize,
    pub missing_date: usize,
    pub unknown_host: usize,
    pub unknown_location: usize,
    pub unknown_clade: usize,
    pub unknown_subtype: usize,
    pub unknown_segment: usize,
    pub unknown_accession: usize,
}

impl DataQualityReport {
    pub fn assess(records: &[Record]) -> Self {
        let unpopulated = |name: &str| {
            records
                .iter()
                .filter(|r| !r.field(name).map(|v| v.is_populated()).unwrap_or(false))
                .count()
        };
        Self {
            total: records.len(),
            missing_date: records.iter().filter(|r| r.collection_date.is_none()).count(),
            unknown_host: unpopulated("host"),
            unknown_location: unpopulated("location"),
            unknown_clade: unpopulated("clade"),
            unknown_subtype: unpopulated("subtype"),
            unknown_segment: unpopulated("segment"),
            unknown_accession: unpopulated("accession"),
        }
    }

    /// Defaulted values summed across fields
    pub fn defaulted_values(&self) -> usize {
        self.missing_date
            + self.unknown_host
            + self.unknown_location
            + self.unknown_clade
            + self.unknown_subtype
            + self.unknown_segment
            + self.unknown_accession
    }

    pub fn print_report(&self) {
        println!("📋 Data quality ({} records):", self.total);
        if self.total == 0 {
            println!("   (no records)");
            return;
        }
        let rows = [
            ("collection_date", self.missing_date),
            ("host", self.unknown_host),
            ("location", self.unknown_location),
            ("clade", self.unknown_clade),
            ("subtype", self.unknown_subtype),
            ("segment", self.unknown_segment),
            ("accession", self.unknown_accession),
        ];
        for (name, count) in rows {
            let pct = count as f64 / self.total as f64 * 100.0;
            let marker = if count == 0 { "✅" } else { "⚠️ " };
            println!("   {} {:<16} {:>7} defaulted ({:.1}%)", marker, name, count, pct);
        }
    }
}
