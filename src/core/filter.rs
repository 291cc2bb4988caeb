// filter.rs - Declarative single-pass filter engine

use chrono::NaiveDate;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::data::dates::parse_flexible_date;
use crate::data::record::{is_known_field, FieldValue, Record};

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    Regex,
    InList,
    DateRange,
}

/// Shape of the value an operator expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Scalar,
    List,
    Pair,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 8] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::Contains,
        FilterOperator::NotContains,
        FilterOperator::StartsWith,
        FilterOperator::Regex,
        FilterOperator::InList,
        FilterOperator::DateRange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not_equals",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "not_contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::Regex => "regex",
            FilterOperator::InList => "in_list",
            FilterOperator::DateRange => "date_range",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            FilterOperator::InList => Arity::List,
            FilterOperator::DateRange => Arity::Pair,
            _ => Arity::Scalar,
        }
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::ALL
            .iter()
            .find(|op| op.as_str() == s.trim().to_lowercase())
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = FilterOperator::ALL.iter().map(|op| op.as_str()).collect();
                format!("Invalid filter operator: {}. Use: {}", s, names.join(", "))
            })
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule value: a scalar, a list of scalars, or a `[start, end]` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<RuleValue>),
}

impl RuleValue {
    /// Scalar rendering; lists are joined with commas
    pub fn as_text(&self) -> String {
        match self {
            RuleValue::Text(s) => s.clone(),
            RuleValue::Integer(i) => i.to_string(),
            RuleValue::Float(f) => f.to_string(),
            RuleValue::Bool(b) => b.to_string(),
            RuleValue::List(items) => items
                .iter()
                .map(RuleValue::as_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// List rendering; a scalar becomes a one-element list
    pub fn as_list(&self) -> Vec<String> {
        match self {
            RuleValue::List(items) => items.iter().map(RuleValue::as_text).collect(),
            scalar => vec![scalar.as_text()],
        }
    }
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        RuleValue::Text(value.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(value: String) -> Self {
        RuleValue::Text(value)
    }
}

impl From<Vec<&str>> for RuleValue {
    fn from(values: Vec<&str>) -> Self {
        RuleValue::List(values.into_iter().map(RuleValue::from).collect())
    }
}

/// Declarative predicate `{field, operator, value}`. Rules combine by AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub field: String,
    pub operator: FilterOperator,
    pub value: RuleValue,
}

impl FilterRule {
    pub fn new(field: &str, operator: FilterOperator, value: impl Into<RuleValue>) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value: value.into(),
        }
    }

    pub fn equals(field: &str, value: &str) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }

    pub fn in_list(field: &str, values: &[&str]) -> Self {
        Self::new(field, FilterOperator::InList, values.to_vec())
    }

    pub fn date_range(field: &str, start: &str, end: &str) -> Self {
        Self::new(field, FilterOperator::DateRange, vec![start, end])
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value.as_text())
    }
}

/// Why a rule was left out of the mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnknownField,
    InvalidRegex(String),
    InvalidDateRange,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownField => write!(f, "unknown field"),
            SkipReason::InvalidRegex(e) => write!(f, "invalid regex: {}", e),
            SkipReason::InvalidDateRange => write!(f, "date_range needs two parseable dates"),
        }
    }
}

#[derive(Debug)]
enum Predicate {
    Equals(String),
    NotEquals(String),
    Contains(Regex),
    NotContains(Regex),
    StartsWith(String),
    Pattern(Regex),
    InList(HashSet<String>),
    DateRange(NaiveDate, NaiveDate),
}

#[derive(Debug)]
struct CompiledRule {
    field: String,
    predicate: Predicate,
}

impl CompiledRule {
    fn compile(rule: &FilterRule) -> Result<Self, SkipReason> {
        if !is_known_field(&rule.field) {
            return Err(SkipReason::UnknownField);
        }

        let literal = |needle: &str| {
            RegexBuilder::new(&regex::escape(needle))
                .case_insensitive(true)
                .build()
                .map_err(|e| SkipReason::InvalidRegex(e.to_string()))
        };

        let predicate = match rule.operator {
            FilterOperator::Equals => Predicate::Equals(rule.value.as_text().trim().to_string()),
            FilterOperator::NotEquals => {
                Predicate::NotEquals(rule.value.as_text().trim().to_string())
            }
            FilterOperator::Contains => Predicate::Contains(literal(&rule.value.as_text())?),
            FilterOperator::NotContains => Predicate::NotContains(literal(&rule.value.as_text())?),
            FilterOperator::StartsWith => Predicate::StartsWith(rule.value.as_text()),
            FilterOperator::Regex => Predicate::Pattern(
                RegexBuilder::new(&rule.value.as_text())
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| SkipReason::InvalidRegex(e.to_string()))?,
            ),
            FilterOperator::InList => Predicate::InList(
                rule.value
                    .as_list()
                    .iter()
                    .map(|v| v.trim().to_string())
                    .collect(),
            ),
            FilterOperator::DateRange => {
                let bounds = rule.value.as_list();
                if bounds.len() != 2 {
                    return Err(SkipReason::InvalidDateRange);
                }
                match (parse_flexible_date(&bounds[0]), parse_flexible_date(&bounds[1])) {
                    (Some(start), Some(end)) => Predicate::DateRange(start, end),
                    _ => return Err(SkipReason::InvalidDateRange),
                }
            }
        };

        Ok(Self {
            field: rule.field.clone(),
            predicate,
        })
    }

    fn matches(&self, record: &Record) -> bool {
        let value = match record.field(&self.field) {
            Some(value) => value,
            None => return true,
        };
        let text: &str = match &value {
            FieldValue::Text(text) => text.as_ref(),
            FieldValue::Null => {
                return matches!(
                    self.predicate,
                    Predicate::NotEquals(_) | Predicate::NotContains(_)
                )
            }
        };

        match &self.predicate {
            Predicate::Equals(expected) => text.trim() == expected,
            Predicate::NotEquals(expected) => text.trim() != expected,
            Predicate::Contains(needle) => needle.is_match(text),
            Predicate::NotContains(needle) => !needle.is_match(text),
            Predicate::StartsWith(prefix) => text.starts_with(prefix.as_str()),
            Predicate::Pattern(pattern) => pattern.is_match(text),
            Predicate::InList(allowed) => allowed.contains(text.trim()),
            Predicate::DateRange(start, end) => match parse_flexible_date(text) {
                Some(date) => *start <= date && date <= *end,
                None => false,
            },
        }
    }
}

/// Rules compiled once and evaluated as one combined mask
#[derive(Debug)]
pub struct FilterEngine {
    rules: Vec<CompiledRule>,
    skipped: Vec<(FilterRule, SkipReason)>,
}

impl FilterEngine {
    /// Compile rules. Rules on unknown fields, invalid regexes and unusable
    /// date ranges are skipped (they act as always-true).
    pub fn new(rules: &[FilterRule]) -> Self {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut skipped = Vec::new();
        for rule in rules {
            match CompiledRule::compile(rule) {
                Ok(c) => compiled.push(c),
                Err(reason) => skipped.push((rule.clone(), reason)),
            }
        }
        Self {
            rules: compiled,
            skipped,
        }
    }

    /// Rules that were skipped, with the reason
    pub fn skipped(&self) -> &[(FilterRule, SkipReason)] {
        &self.skipped
    }

    /// Number of rules that take part in the mask
    pub fn active_rules(&self) -> usize {
        self.rules.len()
    }

    /// Combined AND mask, one entry per record
    pub fn mask(&self, records: &[Record]) -> Vec<bool> {
        records
            .par_iter()
            .map(|record| self.rules.iter().all(|rule| rule.matches(record)))
            .collect()
    }

    /// Matching subset in input order
    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        if self.rules.is_empty() {
            return records.to_vec();
        }
        let mask = self.mask(records);
        records
            .iter()
            .zip(mask)
            .filter(|(_, keep)| *keep)
            .map(|(record, _)| record.clone())
            .collect()
    }
}

/// Apply a rule list in one pass
pub fn apply_filters(records: &[Record], rules: &[FilterRule]) -> Vec<Record> {
    FilterEngine::new(rules).apply(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_record;

    fn sample_records() -> Vec<Record> {
        vec![
            parse_record("A/California/07/2009|A/_H1N1|HA|2009-04-09|EPI_ISL_1|6B.1A", "ACGT"),
            parse_record("A/Texas/50/2012|A_/_H3N2|HA|2012-04-15|EPI_ISL_2|3C.2a1b", "ACGA"),
            parse_record("A/duck/Egypt/1/2021|H5N1|NA|2021-11|EPI_ISL_3|2.3.4.4b", "TTGA"),
            parse_record("B/Victoria/2/1987|B|HA|1987|EPI_ISL_4|V1A", "GGGG"),
            parse_record("A/swine/Iowa/A0/2020|A_/_H1N2|HA|Unknown|EPI_ISL_5|", "CCCC"),
        ]
    }

    fn accessions(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.accession.as_str()).collect()
    }

    #[test]
    fn test_equals_and_not_equals_trim() {
        let records = sample_records();
        let hits = apply_filters(&records, &[FilterRule::equals("segment", "  NA ")]);
        assert_eq!(accessions(&hits), vec!["EPI_ISL_3"]);

        let rule = FilterRule::new("segment", FilterOperator::NotEquals, "HA");
        assert_eq!(accessions(&apply_filters(&records, &[rule])), vec!["EPI_ISL_3"]);
    }

    #[test]
    fn test_contains_is_literal_and_case_insensitive() {
        let records = sample_records();
        let rule = FilterRule::new("isolate", FilterOperator::Contains, "DUCK");
        assert_eq!(accessions(&apply_filters(&records, &[rule])), vec!["EPI_ISL_3"]);

        // "." must not act as a wildcard
        let rule = FilterRule::new("clade", FilterOperator::Contains, "2.3");
        assert_eq!(accessions(&apply_filters(&records, &[rule])), vec!["EPI_ISL_3"]);

        let rule = FilterRule::new("isolate", FilterOperator::NotContains, "/20");
        assert_eq!(accessions(&apply_filters(&records, &[rule])), vec!["EPI_ISL_4"]);
    }

    #[test]
    fn test_starts_with_is_case_sensitive() {
        let records = sample_records();
        let rule = FilterRule::new("isolate", FilterOperator::StartsWith, "B/");
        assert_eq!(accessions(&apply_filters(&records, &[rule])), vec!["EPI_ISL_4"]);
        let rule = FilterRule::new("isolate", FilterOperator::StartsWith, "b/");
        assert!(apply_filters(&records, &[rule]).is_empty());
    }

    #[test]
    fn test_regex_and_invalid_regex_skipped() {
        let records = sample_records();
        let rule = FilterRule::new("subtype_clean", FilterOperator::Regex, "^h[35]n");
        assert_eq!(
            accessions(&apply_filters(&records, &[rule])),
            vec!["EPI_ISL_2", "EPI_ISL_3"]
        );

        let invalid = FilterRule::new("isolate", FilterOperator::Regex, "([unclosed");
        let engine = FilterEngine::new(&[invalid]);
        assert_eq!(engine.skipped().len(), 1);
        assert!(matches!(engine.skipped()[0].1, SkipReason::InvalidRegex(_)));
        assert_eq!(engine.apply(&records).len(), records.len());
    }

    #[test]
    fn test_in_list() {
        let records = sample_records();
        let rule = FilterRule::in_list("subtype_clean", &["H3N2", " H1N1 "]);
        assert_eq!(
            accessions(&apply_filters(&records, &[rule])),
            vec!["EPI_ISL_1", "EPI_ISL_2"]
        );
    }

    #[test]
    fn test_date_range_inclusive_and_undated_excluded() {
        let records = sample_records();
        let rule = FilterRule::date_range("collection_date", "2009-04-09", "2021-11-01");
        assert_eq!(
            accessions(&apply_filters(&records, &[rule])),
            vec!["EPI_ISL_1", "EPI_ISL_2", "EPI_ISL_3"]
        );

        let broken = FilterRule::new("collection_date", FilterOperator::DateRange, "2020-01-01");
        let engine = FilterEngine::new(&[broken]);
        assert_eq!(engine.skipped()[0].1, SkipReason::InvalidDateRange);
    }

    #[test]
    fn test_unknown_field_skipped() {
        let records = sample_records();
        let engine = FilterEngine::new(&[FilterRule::equals("passage", "E3")]);
        assert_eq!(engine.active_rules(), 0);
        assert_eq!(engine.skipped()[0].1, SkipReason::UnknownField);
        assert_eq!(engine.apply(&records), records);
    }

    #[test]
    fn test_rules_combine_with_and() {
        let records = sample_records();
        let rules = vec![
            FilterRule::equals("segment", "HA"),
            FilterRule::new("isolate", FilterOperator::StartsWith, "A/"),
            FilterRule::new("clade_level_1", FilterOperator::NotEquals, "6B"),
        ];
        assert_eq!(
            accessions(&apply_filters(&records, &rules)),
            vec!["EPI_ISL_2", "EPI_ISL_5"]
        );
    }

    #[test]
    fn test_null_fields() {
        let records = sample_records();
        // EPI_ISL_5 has no clade, so clade_level_1 is null
        let rule = FilterRule::new("clade_level_1", FilterOperator::Contains, "");
        assert_eq!(apply_filters(&records, &[rule]).len(), 4);
        let rule = FilterRule::equals("clade", "Unknown");
        assert_eq!(accessions(&apply_filters(&records, &[rule])), vec!["EPI_ISL_5"]);
    }

    #[test]
    fn test_subset_and_idempotent() {
        let records = sample_records();
        let rules = vec![
            FilterRule::new("host", FilterOperator::Regex, "human|avian"),
            FilterRule::date_range("collection_date", "2000-01-01", "2030-12-31"),
        ];
        let once = apply_filters(&records, &rules);
        let twice = apply_filters(&once, &rules);
        assert_eq!(once, twice);
        assert!(once.iter().all(|r| records.contains(r)));
    }

    #[test]
    fn test_in_list_tally_on_mixed_set() {
        let subtypes = ["A_/_H3N2", "A_/_H1N1", "A_/_H5N1", "B", "A_/_H1N2"];
        let records: Vec<Record> = (0..100)
            .map(|i| {
                parse_record(
                    &format!("A/Place/{}/2020|{}|HA|2020-01-01|EPI_{}|3C", i, subtypes[i % 5], i),
                    "ACGT",
                )
            })
            .collect();
        let expected = records
            .iter()
            .filter(|r| r.subtype_clean == "H3N2" || r.subtype_clean == "H1N1")
            .count();
        let rule = FilterRule::in_list("subtype_clean", &["H3N2", "H1N1"]);
        assert_eq!(apply_filters(&records, &[rule]).len(), expected);
        assert_eq!(expected, 40);
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("in_list".parse::<FilterOperator>(), Ok(FilterOperator::InList));
        assert_eq!(" Date_Range ".parse::<FilterOperator>(), Ok(FilterOperator::DateRange));
        assert!("between".parse::<FilterOperator>().is_err());
        assert_eq!(FilterOperator::DateRange.arity(), Arity::Pair);
    }

    #[test]
    fn test_rules_from_toml() {
        #[derive(Deserialize)]
        struct Rules {
            rules: Vec<FilterRule>,
        }
        let parsed: Rules = toml::from_str(
            r#"
            [[rules]]
            field = "subtype_clean"
            operator = "in_list"
            value = ["H3N2", "H1N1"]

            [[rules]]
            field = "sequence_length"
            operator = "equals"
            value = 1700
            "#,
        )
        .unwrap();
        assert_eq!(parsed.rules.len(), 2);
        assert_eq!(parsed.rules[0].value.as_list(), vec!["H3N2", "H1N1"]);
        assert_eq!(parsed.rules[1].value.as_text(), "1700");
    }
}
