// record.rs - Canonical in-memory record for one parsed sequence

use chrono::NaiveDate;
use serde::Serialize;
use std::borrow::Cow;

use crate::data::header::HeaderFields;

/// External default written wherever a value is missing
pub const UNKNOWN: &str = "Unknown";

/// Number of derived clade hierarchy levels
pub const CLADE_LEVELS: usize = 6;

/// Every field name a filter rule may reference
pub const FIELD_NAMES: [&str; 19] = [
    "isolate",
    "subtype",
    "subtype_clean",
    "segment",
    "collection_date",
    "accession",
    "clade",
    "clade_level_1",
    "clade_level_2",
    "clade_level_3",
    "clade_level_4",
    "clade_level_5",
    "clade_level_6",
    "host",
    "location",
    "sequence",
    "sequence_length",
    "sequence_hash",
    "year",
];

/// Check whether a name refers to a record field (including `clade_lN` aliases)
pub fn is_known_field(name: &str) -> bool {
    if FIELD_NAMES.contains(&name) {
        return true;
    }
    name.strip_prefix("clade_l")
        .and_then(|level| level.parse::<usize>().ok())
        .map(|level| (1..=CLADE_LEVELS).contains(&level))
        .unwrap_or(false)
}

/// One metadata value as seen by filters and reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Null,
}

impl<'a> FieldValue<'a> {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_ref()),
            FieldValue::Null => None,
        }
    }

    /// Non-null, non-"Unknown" and non-empty
    pub fn is_populated(&self) -> bool {
        match self {
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                !trimmed.is_empty() && trimmed != UNKNOWN
            }
            FieldValue::Null => false,
        }
    }
}

/// One parsed sequence and its metadata. Created once by the header parser;
/// every downstream stage produces new collections instead of mutating records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub isolate: String,
    pub subtype: String,
    pub subtype_clean: String,
    pub segment: String,
    pub collection_date: Option<NaiveDate>,
    pub accession: String,
    pub clade: Option<String>,
    pub clade_levels: [Option<String>; CLADE_LEVELS],
    pub host: Option<String>,
    pub location: Option<String>,
    pub sequence: String,
    pub sequence_length: usize,
    pub sequence_hash: String,
}

impl Record {
    /// Assemble a record from resolved header fields and a normalized sequence
    pub fn from_parts(
        fields: HeaderFields,
        collection_date: Option<NaiveDate>,
        sequence: String,
        sequence_hash: String,
    ) -> Self {
        let clade_levels = clade_levels(fields.clade.as_deref());
        Self {
            isolate: fields.isolate,
            subtype_clean: fields.subtype_clean,
            subtype: fields.subtype,
            segment: fields.segment,
            collection_date,
            accession: fields.accession,
            clade: fields.clade,
            clade_levels,
            host: fields.host,
            location: fields.location,
            sequence_length: sequence.chars().count(),
            sequence,
            sequence_hash,
        }
    }

    /// Clade prefix at `level` (1-based); `None` past the hierarchy depth
    pub fn clade_level(&self, level: usize) -> Option<&str> {
        if level == 0 || level > CLADE_LEVELS {
            return None;
        }
        self.clade_levels[level - 1].as_deref()
    }

    /// `YYYY-MM-DD`, or "Unknown" when the date is missing
    pub fn date_label(&self) -> String {
        match self.collection_date {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => UNKNOWN.to_string(),
        }
    }

    /// Look up a field by name. `None` means the field does not exist.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "isolate" => borrowed(&self.isolate),
            "subtype" => borrowed(&self.subtype),
            "subtype_clean" => borrowed(&self.subtype_clean),
            "segment" => borrowed(&self.segment),
            "accession" => borrowed(&self.accession),
            "clade" => or_unknown(self.clade.as_deref()),
            "host" => or_unknown(self.host.as_deref()),
            "location" => or_unknown(self.location.as_deref()),
            "sequence" => borrowed(&self.sequence),
            "sequence_hash" => borrowed(&self.sequence_hash),
            "sequence_length" => owned(self.sequence_length.to_string()),
            "collection_date" => match self.collection_date {
                Some(date) => owned(date.format("%Y-%m-%d").to_string()),
                None => FieldValue::Null,
            },
            "year" => match self.collection_date {
                Some(date) => owned(date.format("%Y").to_string()),
                None => FieldValue::Null,
            },
            other => {
                let level = other
                    .strip_prefix("clade_level_")
                    .or_else(|| other.strip_prefix("clade_l"))?
                    .parse::<usize>()
                    .ok()?;
                if level == 0 || level > CLADE_LEVELS {
                    return None;
                }
                match self.clade_level(level) {
                    Some(prefix) => borrowed(prefix),
                    None => FieldValue::Null,
                }
            }
        };
        Some(value)
    }

    /// Header in the fixed 6-field standard layout, without the leading `>`
    pub fn standard_header(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.isolate,
            self.subtype,
            self.segment,
            self.date_label(),
            self.accession,
            self.clade.as_deref().unwrap_or(UNKNOWN)
        )
    }
}

fn borrowed(s: &str) -> FieldValue<'_> {
    FieldValue::Text(Cow::Borrowed(s))
}

fn owned<'a>(s: String) -> FieldValue<'a> {
    FieldValue::Text(Cow::Owned(s))
}

fn or_unknown(value: Option<&str>) -> FieldValue<'_> {
    borrowed(value.unwrap_or(UNKNOWN))
}

/// Progressive dot-prefixes of a clade string; all `None` when absent
pub fn clade_levels(clade: Option<&str>) -> [Option<String>; CLADE_LEVELS] {
    let mut levels: [Option<String>; CLADE_LEVELS] = Default::default();
    let Some(clade) = clade else {
        return levels;
    };
    let parts: Vec<&str> = clade.split('.').collect();
    for (k, slot) in levels.iter_mut().enumerate() {
        if k < parts.len() {
            *slot = Some(parts[..=k].join("."));
        }
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::header::parse_record;

    #[test]
    fn test_clade_levels_contiguous() {
        let levels = clade_levels(Some("3C.2a1b.2a.2a"));
        assert_eq!(levels[0].as_deref(), Some("3C"));
        assert_eq!(levels[1].as_deref(), Some("3C.2a1b"));
        assert_eq!(levels[3].as_deref(), Some("3C.2a1b.2a.2a"));
        assert_eq!(levels[4], None);
        assert_eq!(levels[5], None);

        assert!(clade_levels(None).iter().all(|l| l.is_none()));

        let deep = clade_levels(Some("a.b.c.d.e.f.g.h"));
        assert_eq!(deep[5].as_deref(), Some("a.b.c.d.e.f"));
    }

    #[test]
    fn test_field_lookup() {
        let record = parse_record(
            "A/California/07/2009|A/_H1N1|HA|2009-04-09|EPI_ISL_29553|6B.1A",
            "ACGT",
        );
        assert_eq!(
            record.field("subtype_clean").unwrap().as_text(),
            Some("H1N1")
        );
        assert_eq!(
            record.field("collection_date").unwrap().as_text(),
            Some("2009-04-09")
        );
        assert_eq!(record.field("year").unwrap().as_text(), Some("2009"));
        assert_eq!(record.field("clade_level_2").unwrap().as_text(), Some("6B.1A"));
        assert_eq!(record.field("clade_l1").unwrap().as_text(), Some("6B"));
        assert_eq!(record.field("clade_level_3"), Some(FieldValue::Null));
        assert_eq!(record.field("sequence_length").unwrap().as_text(), Some("4"));
        assert!(record.field("clade_level_7").is_none());
        assert!(record.field("no_such_field").is_none());

        assert!(is_known_field("host"));
        assert!(is_known_field("clade_l6"));
        assert!(!is_known_field("clade_l7"));
        assert!(!is_known_field("no_such_field"));
    }

    #[test]
    fn test_missing_values_use_sentinel() {
        let record = parse_record("lonely", "AC");
        assert_eq!(record.field("clade").unwrap().as_text(), Some(UNKNOWN));
        assert!(!record.field("clade").unwrap().is_populated());
        assert_eq!(record.field("collection_date"), Some(FieldValue::Null));
        assert_eq!(record.date_label(), UNKNOWN);
        assert_eq!(record.standard_header(), "lonely|Unknown|Unknown|Unknown|Unknown|Unknown");
    }
}
