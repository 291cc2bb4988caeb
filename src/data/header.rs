// header.rs - GISAID header parsing into structured records

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::data::dates::parse_flexible_date;
use crate::data::record::{Record, UNKNOWN};
use crate::hashers::{normalize_sequence, IdentityHasher, Md5Hasher};

/// Part count at which the extended layout is selected
pub const EXTENDED_FIELD_COUNT: usize = 9;

const AVIAN_KEYWORDS: [&str; 12] = [
    "duck", "goose", "chicken", "swan", "gull", "teal", "quail", "pheasant", "pigeon", "turkey",
    "ostrich", "wild bird",
];

const MAMMAL_KEYWORDS: [&str; 10] = [
    "swine", "pig", "ferret", "mink", "seal", "cat", "dog", "horse", "tiger", "leopard",
];

/// Isolate-name segments that describe type or host rather than place
const LOCATION_SKIP: [&str; 15] = [
    "a", "b", "duck", "goose", "chicken", "swan", "gull", "swine", "pig", "ferret", "mink",
    "seal", "environment", "wild bird", "avian",
];

/// Values that mean "not given" for host and location
const SENTINELS: [&str; 7] = ["", "Unknown", "unknown", "None", "none", "N/A", "NA"];

/// Clade values that mean "not given". Anything else, `N/A` included, is kept verbatim.
const CLADE_SENTINELS: [&str; 4] = ["", "Unknown", "None", "none"];

fn subtype_regex() -> &'static Regex {
    static SUBTYPE_RE: OnceLock<Regex> = OnceLock::new();
    SUBTYPE_RE.get_or_init(|| Regex::new(r"H\d+N\d+").expect("static subtype pattern"))
}

/// Host class inferred from isolate naming conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostClass {
    Human,
    Avian,
    Mammalian,
    Environment,
}

impl HostClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostClass::Human => "Human",
            HostClass::Avian => "Avian",
            HostClass::Mammalian => "Mammalian",
            HostClass::Environment => "Environment",
        }
    }
}

impl fmt::Display for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `isolate|subtype|segment|date|accession|clade`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardHeader {
    pub isolate: String,
    pub subtype: String,
    pub segment: String,
    pub date: String,
    pub accession: String,
    pub clade: String,
}

/// `name|type|subtype|segment|location|host|date|clade|accession`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedHeader {
    pub name: String,
    pub virus_type: String,
    pub subtype: String,
    pub segment: String,
    pub location: String,
    pub host: String,
    pub date: String,
    pub clade: String,
    pub accession: String,
}

/// Header layout, chosen purely by the number of pipe-delimited parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLayout {
    Standard(StandardHeader),
    Extended(ExtendedHeader),
}

impl HeaderLayout {
    /// Split a header (text after `>`) and pick the layout.
    /// Missing trailing parts of the standard layout become "Unknown".
    pub fn parse(header: &str) -> Self {
        let parts: Vec<&str> = header.split('|').map(str::trim).collect();

        if parts.len() >= EXTENDED_FIELD_COUNT {
            return HeaderLayout::Extended(ExtendedHeader {
                name: parts[0].to_string(),
                virus_type: parts[1].to_string(),
                subtype: parts[2].to_string(),
                segment: parts[3].to_string(),
                location: parts[4].to_string(),
                host: parts[5].to_string(),
                date: parts[6].to_string(),
                clade: parts[7].to_string(),
                accession: parts[8].to_string(),
            });
        }

        let part = |i: usize| parts.get(i).copied().unwrap_or(UNKNOWN).to_string();
        HeaderLayout::Standard(StandardHeader {
            isolate: part(0),
            subtype: part(1),
            segment: part(2),
            date: parts.get(3).copied().unwrap_or("").to_string(),
            accession: part(4),
            clade: part(5),
        })
    }
}

/// Header metadata resolved into record-ready values. The date stays raw so
/// batches can go through the two-pass date parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    pub isolate: String,
    pub subtype: String,
    pub subtype_clean: String,
    pub segment: String,
    pub raw_date: String,
    pub accession: String,
    pub clade: Option<String>,
    pub host: Option<String>,
    pub location: Option<String>,
}

impl HeaderFields {
    /// Parse one header line. Never fails: unusable values fall back to
    /// "Unknown" or `None`.
    pub fn parse(header: &str) -> Self {
        match HeaderLayout::parse(header) {
            HeaderLayout::Standard(h) => {
                let isolate = or_unknown(h.isolate);
                let host = infer_host(&isolate).map(|c| c.as_str().to_string());
                let location = extract_location(&isolate);
                let subtype = or_unknown(h.subtype);
                Self {
                    subtype_clean: clean_subtype(&subtype),
                    subtype,
                    segment: or_unknown(h.segment),
                    raw_date: h.date,
                    accession: or_unknown(h.accession),
                    clade: clade_value(h.clade),
                    host,
                    location,
                    isolate,
                }
            }
            HeaderLayout::Extended(h) => {
                let subtype = or_unknown(h.subtype);
                Self {
                    isolate: or_unknown(h.name),
                    subtype_clean: clean_subtype(&subtype),
                    subtype,
                    segment: or_unknown(h.segment),
                    raw_date: h.date,
                    accession: or_unknown(h.accession),
                    clade: clade_value(h.clade),
                    host: non_sentinel(h.host),
                    location: non_sentinel(h.location),
                }
            }
        }
    }
}

fn or_unknown(value: String) -> String {
    if value.is_empty() {
        UNKNOWN.to_string()
    } else {
        value
    }
}

fn non_sentinel(value: String) -> Option<String> {
    if SENTINELS.contains(&value.as_str()) {
        None
    } else {
        Some(value)
    }
}

fn clade_value(value: String) -> Option<String> {
    if CLADE_SENTINELS.contains(&value.as_str()) {
        None
    } else {
        Some(value)
    }
}

/// First `H<digits>N<digits>` match, or the raw subtype verbatim
pub fn clean_subtype(subtype: &str) -> String {
    match subtype_regex().find(subtype) {
        Some(m) => m.as_str().to_string(),
        None => subtype.to_string(),
    }
}

/// Infer the host class from an isolate name
pub fn infer_host(isolate: &str) -> Option<HostClass> {
    if isolate.is_empty() {
        return None;
    }
    let lower = isolate.to_lowercase();
    if lower.contains("/environment/") {
        return Some(HostClass::Environment);
    }
    if AVIAN_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(HostClass::Avian);
    }
    if MAMMAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(HostClass::Mammalian);
    }
    if (isolate.starts_with("A/") || isolate.starts_with("B/")) && isolate.matches('/').count() >= 2
    {
        return Some(HostClass::Human);
    }
    None
}

/// First isolate-name segment that is not a type or host keyword
pub fn extract_location(isolate: &str) -> Option<String> {
    isolate
        .split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .find(|part| !LOCATION_SKIP.contains(&part.to_lowercase().as_str()))
        .filter(|part| *part != UNKNOWN)
        .map(str::to_string)
}

/// Parse one header + raw sequence body with the default hasher
pub fn parse_record(header: &str, sequence: &str) -> Record {
    parse_record_with_hasher(header, sequence, &Md5Hasher)
}

/// Parse one header + raw sequence body into a record
pub fn parse_record_with_hasher(
    header: &str,
    sequence: &str,
    hasher: &dyn IdentityHasher,
) -> Record {
    let fields = HeaderFields::parse(header);
    let date = parse_flexible_date(&fields.raw_date);
    let sequence = normalize_sequence(sequence);
    let hash = hasher.hash_sequence(&sequence);
    Record::from_parts(fields, date, sequence, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_standard_header_scenario() {
        let record = parse_record(
            "A/California/07/2009|A/_H1N1|HA|2009-04-09|EPI_ISL_29553|6B.1A",
            "acgtACGTNNNNNacgt",
        );
        assert_eq!(record.isolate, "A/California/07/2009");
        assert_eq!(record.subtype, "A/_H1N1");
        assert_eq!(record.subtype_clean, "H1N1");
        assert_eq!(record.segment, "HA");
        assert_eq!(record.accession, "EPI_ISL_29553");
        assert_eq!(record.host.as_deref(), Some("Human"));
        assert_eq!(record.location.as_deref(), Some("California"));
        assert_eq!(record.sequence, "ACGTACGTNNNNNACGT");
        assert_eq!(record.sequence_length, record.sequence.len());
        assert_eq!(record.sequence_length, 17);
        assert_eq!(record.clade_level(1), Some("6B"));
        assert_eq!(record.clade_level(2), Some("6B.1A"));
        assert_eq!(record.clade_level(3), None);
        assert_eq!(
            record.collection_date,
            NaiveDate::from_ymd_opt(2009, 4, 9)
        );
    }

    #[test]
    fn test_extended_header_scenario() {
        let record = parse_record(
            "B/Victoria/2/1987|B|B|NA|Australia|Human|1987|V1A.3a.2|EPI_ISL_100123",
            "ACGT",
        );
        assert_eq!(record.collection_date, NaiveDate::from_ymd_opt(1987, 1, 1));
        assert_eq!(record.subtype_clean, "B");
        assert_eq!(record.segment, "NA");
        assert_eq!(record.location.as_deref(), Some("Australia"));
        assert_eq!(record.host.as_deref(), Some("Human"));
        assert_eq!(record.accession, "EPI_ISL_100123");
        assert_eq!(record.clade.as_deref(), Some("V1A.3a.2"));
        assert_eq!(record.clade_level(3), Some("V1A.3a.2"));
    }

    #[test]
    fn test_explicit_clade_survives_export() {
        let header = "A/Texas/1/2020|A_/_H3N2|HA|2020-01-01|EPI_1|N/A";
        let record = parse_record(header, "ACGT");
        assert_eq!(record.clade.as_deref(), Some("N/A"));
        assert_eq!(record.standard_header(), header);

        let record = parse_record("A/Texas/1/2020|A_/_H3N2|HA|2020-01-01|EPI_1|NA", "ACGT");
        assert_eq!(record.clade.as_deref(), Some("NA"));
        assert_eq!(record.clade_level(1), Some("NA"));

        for missing in ["Unknown", "None", "none", ""] {
            let header = format!("A/Texas/1/2020|A_/_H3N2|HA|2020-01-01|EPI_1|{}", missing);
            let record = parse_record(&header, "ACGT");
            assert_eq!(record.clade, None, "clade {:?}", missing);
            assert!(record.clade_levels.iter().all(|l| l.is_none()));
        }
    }

    #[test]
    fn test_layout_selection_by_part_count() {
        assert!(matches!(HeaderLayout::parse("a|b|c|d|e|f"), HeaderLayout::Standard(_)));
        assert!(matches!(HeaderLayout::parse("a|b|c|d|e|f|g|h"), HeaderLayout::Standard(_)));
        assert!(matches!(HeaderLayout::parse("a|b|c|d|e|f|g|h|i"), HeaderLayout::Extended(_)));
        assert!(matches!(HeaderLayout::parse("a|b|c|d|e|f|g|h|i|j"), HeaderLayout::Extended(_)));
    }

    #[test]
    fn test_short_header_is_padded() {
        let record = parse_record("A/duck/Hokkaido/5/2022|H5N1", "");
        assert_eq!(record.subtype_clean, "H5N1");
        assert_eq!(record.segment, UNKNOWN);
        assert_eq!(record.accession, UNKNOWN);
        assert_eq!(record.clade, None);
        assert!(record.clade_levels.iter().all(|l| l.is_none()));
        assert_eq!(record.collection_date, None);
        assert_eq!(record.host.as_deref(), Some("Avian"));
        assert_eq!(record.location.as_deref(), Some("Hokkaido"));
        assert_eq!(record.sequence_length, 0);
    }

    #[test]
    fn test_entirely_malformed_header_keeps_sequence() {
        let record = parse_record("", "acgt");
        assert_eq!(record.isolate, UNKNOWN);
        assert_eq!(record.subtype_clean, UNKNOWN);
        assert_eq!(record.host, None);
        assert_eq!(record.location, None);
        assert_eq!(record.sequence, "ACGT");
    }

    #[test]
    fn test_subtype_clean() {
        assert_eq!(clean_subtype("A_/_H3N2"), "H3N2");
        assert_eq!(clean_subtype("H10N7 reassortant"), "H10N7");
        assert_eq!(clean_subtype("B"), "B");
        assert_eq!(clean_subtype("h3n2"), "h3n2");
    }

    #[test]
    fn test_host_inference() {
        assert_eq!(infer_host("A/environment/Vietnam/1/2020"), Some(HostClass::Environment));
        assert_eq!(infer_host("A/chicken/Egypt/1/2021"), Some(HostClass::Avian));
        assert_eq!(infer_host("A/wild bird/Korea/1/2021"), Some(HostClass::Avian));
        assert_eq!(infer_host("A/swine/Iowa/1/2019"), Some(HostClass::Mammalian));
        assert_eq!(infer_host("B/Washington/02/2019"), Some(HostClass::Human));
        assert_eq!(infer_host("A/Texas"), None);
        assert_eq!(infer_host("hCoV-19/Italy/1/2020"), None);
        assert_eq!(infer_host(""), None);
    }

    #[test]
    fn test_location_extraction() {
        assert_eq!(extract_location("A/California/07/2009").as_deref(), Some("California"));
        assert_eq!(extract_location("A/duck/Bangladesh/1/2020").as_deref(), Some("Bangladesh"));
        assert_eq!(extract_location("A/Новосибирск/RII-7.429/2024").as_deref(), Some("Новосибирск"));
        assert_eq!(extract_location("A//duck/"), None);
        assert_eq!(extract_location(""), None);
    }

    #[test]
    fn test_explicit_sentinels_become_none() {
        let record = parse_record("n|A|H3N2|HA|Unknown|unknown||none|EPI_1", "A");
        assert_eq!(record.location, None);
        assert_eq!(record.host, None);
        assert_eq!(record.clade, None);

        let record = parse_record("n|A|H3N2|HA|N/A|NA||NA|EPI_1", "A");
        assert_eq!(record.location, None);
        assert_eq!(record.host, None);
        assert_eq!(record.clade.as_deref(), Some("NA"));
        assert_eq!(record.collection_date, None);
    }
}
