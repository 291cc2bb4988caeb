// config.rs - Configuration file support

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::core::filter::FilterRule;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    // Input/Output
    pub input: Option<String>,
    pub output: Option<String>,
    pub filtered_output: Option<String>,
    pub metadata: Option<String>,
    pub waves_json: Option<String>,

    // Core settings
    pub hasher: Option<String>,
    pub threads: Option<usize>,

    // Refinement
    pub subtypes: Option<Vec<String>>,
    pub clade: Option<String>,
    pub clade_level: Option<usize>,
    pub min_length: Option<usize>,
    pub max_n_run: Option<usize>,
    pub dedup: Option<String>,
    pub accessions_file: Option<String>,

    // Waves and sampling
    pub category: Option<String>,
    pub sensitivity: Option<f64>,
    pub min_peak_height: Option<usize>,
    pub max_samples: Option<usize>,

    // Flags
    pub dry_run: Option<bool>,

    // Declarative filter rules, combined with AND
    pub rules: Option<Vec<FilterRule>>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config = Self::from_toml(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# seqwave.toml - Configuration file for seqwave
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# GISAID-style FASTA input (6-field or 9-field headers)
input = "/path/to/gisaid.fasta"

# Sampled representatives (FASTA, standard 6-field headers)
output = "representatives.fasta"

# Filtered records before sampling (FASTA)
# filtered_output = "filtered.fasta"

# Metadata table of the sampled representatives (TSV)
metadata = "representatives.tsv"

# Wave analysis and candidate checklist (JSON)
waves_json = "waves.json"

# =============================================================================
# CORE SETTINGS
# =============================================================================

# Identity hasher: md5, sha256
hasher = "md5"

# Number of threads (omit for auto-detection)
# threads = 8

# =============================================================================
# REFINEMENT
# =============================================================================

# Keep only these subtypes (matched against subtype_clean)
# subtypes = ["H3N2", "H1N1"]

# Keep only one clade; with clade_level (1-6) the match is exact at that level
# clade = "3C.2a1b"
# clade_level = 2

# Minimum sequence length
min_length = 900

# Drop sequences containing this many consecutive N bases (0 = disabled)
max_n_run = 10

# Deduplication: none, sequence, seq+subtype
dedup = "sequence"

# Keep only accessions listed in a file (one per line)
# accessions_file = "accessions.txt"

# =============================================================================
# WAVES AND SAMPLING
# =============================================================================

# Lifespan category: auto, micro, seasonal, endemic
category = "auto"

# Wave detection sensitivity (0.0-1.0). Higher = fewer, larger peaks
sensitivity = 0.5

# Minimum weekly count for a peak
min_peak_height = 5

# Cap the sample size by even chronological spacing
# max_samples = 500

# =============================================================================
# FLAGS
# =============================================================================

# Validate inputs and report data quality without sampling
dry_run = false

# =============================================================================
# FILTER RULES (combined with AND)
# =============================================================================
# Operators: equals, not_equals, contains, not_contains, starts_with,
#            regex, in_list, date_range

[[rules]]
field = "segment"
operator = "equals"
value = "HA"

[[rules]]
field = "collection_date"
operator = "date_range"
value = ["2022-01-01", "2024-12-31"]

# [[rules]]
# field = "host"
# operator = "in_list"
# value = ["Human", "Avian"]
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::FilterOperator;

    #[test]
    fn test_sample_config_parses() {
        let config = Config::from_toml(&Config::generate_sample()).unwrap();
        assert_eq!(config.hasher.as_deref(), Some("md5"));
        assert_eq!(config.min_length, Some(900));
        assert_eq!(config.sensitivity, Some(0.5));
        let rules = config.rules.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].operator, FilterOperator::DateRange);
        assert_eq!(rules[1].value.as_list(), vec!["2022-01-01", "2024-12-31"]);
    }

    #[test]
    fn test_unknown_operator_is_an_error() {
        let err = Config::from_toml(
            r#"
            [[rules]]
            field = "segment"
            operator = "between"
            value = "HA"
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_toml("").unwrap();
        assert!(config.input.is_none());
        assert!(config.rules.is_none());
    }
}
