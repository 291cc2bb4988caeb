// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// seqwave - Temporal-aware sequence surveillance: filter, detect epidemic waves, sample
pub struct Args {
    /// path to GISAID-style FASTA file
    #[argh(option, short = 'i')]
    pub input: Option<String>,

    /// output FASTA file for the sampled representatives
    #[argh(option, short = 'o')]
    pub output: Option<String>,

    /// output FASTA file for the filtered (pre-sampling) records
    #[argh(option)]
    pub filtered_output: Option<String>,

    /// output metadata table (TSV) for the sampled representatives
    #[argh(option)]
    pub metadata: Option<String>,

    /// output wave analysis and candidate checklist (JSON)
    #[argh(option)]
    pub waves_json: Option<String>,

    /// filter rule as field:operator:value (repeatable; list values comma-separated)
    #[argh(option)]
    pub filter: Vec<String>,

    /// keep only these subtypes (comma-separated, matched against subtype_clean)
    #[argh(option)]
    pub subtypes: Option<String>,

    /// keep only this clade (prefix match unless --clade-level is given)
    #[argh(option)]
    pub clade: Option<String>,

    /// clade hierarchy level (1-6) for an exact --clade match
    #[argh(option)]
    pub clade_level: Option<usize>,

    /// minimum sequence length
    #[argh(option)]
    pub min_length: Option<usize>,

    /// drop sequences containing this many consecutive N bases (0 = disabled)
    #[argh(option)]
    pub max_n_run: Option<usize>,

    /// deduplication: none, sequence, seq+subtype (default: none)
    #[argh(option, default = "String::from(\"none\")")]
    pub dedup: String,

    /// keep only accessions listed in a file (one per line)
    #[argh(option)]
    pub accessions_file: Option<String>,

    /// lifespan category: auto, micro, seasonal, endemic (default: auto)
    #[argh(option, default = "String::from(\"auto\")")]
    pub category: String,

    /// wave detection sensitivity (0.0-1.0, default: 0.5)
    #[argh(option, default = "0.5")]
    pub sensitivity: f64,

    /// minimum weekly count for a peak (default: 5)
    #[argh(option, default = "5")]
    pub min_peak_height: usize,

    /// cap the sample size by even chronological spacing
    #[argh(option)]
    pub max_samples: Option<usize>,

    /// identity hasher: md5, sha256 (default: md5)
    #[argh(option, default = "String::from(\"md5\")")]
    pub hasher: String,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// list filterable fields with population statistics, then exit
    #[argh(switch)]
    pub fields: bool,

    /// benchmark mode: time each stage against the latency targets and exit
    #[argh(switch)]
    pub benchmark: bool,

    /// with --benchmark: generate this many synthetic GISAID records instead of reading --input
    #[argh(option)]
    pub synthetic: Option<usize>,

    /// validate inputs and report data quality without sampling (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,

    /// list available identity hashers and exit
    #[argh(switch)]
    pub list_hashers: bool,
}
