// lib.rs - seqwave library root

//! # seqwave - Temporal-aware surveillance of GISAID-style sequence datasets
//!
//! Turns FASTA files of viral isolates into structured records and runs the
//! surveillance pipeline over them:
//!
//! - **Ingestion**: 6-field and 9-field GISAID headers, flexible dates, host and
//!   location inference, dot-hierarchy clade levels
//! - **Identity hashing**: 12-character content fingerprints (MD5 or SHA-256)
//! - **Filtering**: declarative rules evaluated as one parallel mask, plus
//!   length, N-run, dedup, accession, clade and subtype refinements
//! - **Waves**: weekly aggregation, peak/trough detection, off-season clusters
//! - **Sampling**: lifespan classification (Micro/Seasonal/Endemic) with
//!   weekly, monthly, quarterly or wave-based representative selection
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use seqwave::prelude::*;
//! use seqwave::data::parse_fasta;
//!
//! let text = std::fs::read_to_string("gisaid.fasta").map_err(|e| e.to_string())?;
//! let batch = parse_fasta(&text, &Md5Hasher)?;
//!
//! let rules = vec![FilterRule::in_list("subtype_clean", &["H3N2", "H1N1"])];
//! let filtered = FilterEngine::new(&rules).apply(&batch.records);
//!
//! let outcome = AdaptiveSampler::default().run(&filtered);
//! println!("{}: {} representatives", outcome.category, outcome.records.len());
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod hashers;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{apply_filters, FilterEngine, FilterOperator, FilterRule, RuleValue};
    pub use crate::core::{AdaptiveSampler, LifespanCategory, SamplingOutcome, SamplingStrategy};
    pub use crate::core::{Candidate, CandidateKind, WaveAnalysis, WaveDetector};
    pub use crate::data::{parse_record, Record, UNKNOWN};
    pub use crate::hashers::{HasherRegistry, IdentityHasher, Md5Hasher, Sha256Hasher};
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use core::{AdaptiveSampler, FilterEngine, FilterRule, WaveDetector};
pub use data::Record;
pub use hashers::{HasherRegistry, IdentityHasher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "seqwave v{} - Temporal-aware sequence surveillance pipeline",
        VERSION
    )
}
