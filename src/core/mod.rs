// mod.rs - Core analysis: filtering, temporal aggregation, waves, sampling

pub mod fields;
pub mod filter;
pub mod refine;
pub mod sampler;
pub mod temporal;
pub mod waves;

// Re-export main types for convenience
pub use fields::{available_fields, DataQualityReport, FieldSummary};
pub use filter::{apply_filters, FilterEngine, FilterOperator, FilterRule, RuleValue, SkipReason};
pub use refine::{
    clade_filter, deduplicate, filter_accessions, max_n_run, min_length, refine, subtype_filter,
    DedupMode, RefineOptions,
};
pub use sampler::{AdaptiveSampler, LifespanCategory, SamplingOutcome, SamplingStrategy};
pub use temporal::{
    aggregate, date_span, first_in_period, records_in_window, CountSeries, Granularity, Period,
};
pub use waves::{off_season_clusters, Candidate, CandidateKind, WaveAnalysis, WaveDetector};
