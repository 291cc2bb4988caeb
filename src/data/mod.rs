// mod.rs - Record model and ingestion module

pub mod dates;
pub mod fasta;
pub mod header;
pub mod record;
pub mod synthetic;

// Re-export main types for convenience
pub use dates::{batch_parse_dates, parse_flexible_date, DateFormat};
pub use fasta::{parse_fasta, read_fasta_file, FastaEntry, ParsedBatch};
pub use header::{parse_record, parse_record_with_hasher, HeaderFields, HeaderLayout, HostClass};
pub use synthetic::generate_sample_gisaid;
pub use record::{is_known_field, FieldValue, Record, CLADE_LEVELS, FIELD_NAMES, UNKNOWN};
