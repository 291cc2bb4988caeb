// mod.rs - Output writers: FASTA, metadata TSV, wave report JSON

use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::sampler::{LifespanCategory, SamplingStrategy};
use crate::core::waves::{Candidate, WaveAnalysis};
use crate::data::record::{Record, CLADE_LEVELS, UNKNOWN};

/// Residues per FASTA line
pub const FASTA_LINE_WIDTH: usize = 60;

/// Metadata TSV columns, in order
pub const METADATA_COLUMNS: [&str; 17] = [
    "accession",
    "isolate",
    "subtype",
    "subtype_clean",
    "segment",
    "collection_date",
    "clade",
    "clade_level_1",
    "clade_level_2",
    "clade_level_3",
    "clade_level_4",
    "clade_level_5",
    "clade_level_6",
    "host",
    "location",
    "sequence_length",
    "sequence_hash",
];

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(file_path).parent() {
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        create_dir_all(parent).map_err(|e| {
            format!(
                "Failed to create parent directory '{}': {}",
                parent.display(),
                e
            )
        })?;
    }
    Ok(())
}

fn create_writer(file_path: &str) -> Result<BufWriter<File>, String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path, e))?;
    Ok(BufWriter::new(file))
}

/// Render records as FASTA with standard 6-field headers
pub fn to_fasta(records: &[Record]) -> String {
    let mut out = String::new();
    for record in records {
        out.push('>');
        out.push_str(&record.standard_header());
        out.push('\n');
        for chunk in record.sequence.as_bytes().chunks(FASTA_LINE_WIDTH) {
            out.push_str(&String::from_utf8_lossy(chunk));
            out.push('\n');
        }
    }
    out
}

/// Write records as FASTA with standard 6-field headers
pub fn write_fasta(file_path: &str, records: &[Record]) -> Result<(), String> {
    let mut writer = create_writer(file_path)?;
    writer
        .write_all(to_fasta(records).as_bytes())
        .map_err(|e| format!("Write error: {}", e))?;
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ {} sequences written to: {}", records.len(), file_path);
    Ok(())
}

fn metadata_row(record: &Record) -> Vec<String> {
    let opt = |v: Option<&str>| v.unwrap_or(UNKNOWN).to_string();
    let mut row = vec![
        record.accession.clone(),
        record.isolate.clone(),
        record.subtype.clone(),
        record.subtype_clean.clone(),
        record.segment.clone(),
        record.date_label(),
        opt(record.clade.as_deref()),
    ];
    for level in 1..=CLADE_LEVELS {
        row.push(opt(record.clade_level(level)));
    }
    row.push(opt(record.host.as_deref()));
    row.push(opt(record.location.as_deref()));
    row.push(record.sequence_length.to_string());
    row.push(record.sequence_hash.clone());
    row
}

/// Write one metadata row per record; missing values become "Unknown"
pub fn write_metadata<W: Write>(writer: W, records: &[Record]) -> Result<(), String> {
    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    tsv.write_record(METADATA_COLUMNS)
        .map_err(|e| format!("Write error: {}", e))?;
    for record in records {
        tsv.write_record(metadata_row(record))
            .map_err(|e| format!("Write error: {}", e))?;
    }
    tsv.flush().map_err(|e| format!("Flush error: {}", e))?;
    Ok(())
}

/// Write the metadata table as TSV
pub fn write_metadata_tsv(file_path: &str, records: &[Record]) -> Result<(), String> {
    let writer = create_writer(file_path)?;
    write_metadata(writer, records)?;
    println!("✅ Metadata written to: {}", file_path);
    Ok(())
}

/// Wave analysis and sampling summary as written to JSON
#[derive(Debug, Serialize)]
pub struct WaveReport<'a> {
    pub tool: String,
    pub generated: String,
    pub command: &'a str,
    pub total_records: usize,
    pub sampled_records: usize,
    pub category: LifespanCategory,
    pub strategy: SamplingStrategy,
    pub analysis: &'a WaveAnalysis,
    pub candidates: &'a [Candidate],
}

impl<'a> WaveReport<'a> {
    pub fn new(
        command: &'a str,
        total_records: usize,
        sampled_records: usize,
        category: LifespanCategory,
        strategy: SamplingStrategy,
        analysis: &'a WaveAnalysis,
        candidates: &'a [Candidate],
    ) -> Self {
        Self {
            tool: format!("seqwave v{}", env!("CARGO_PKG_VERSION")),
            generated: chrono::Utc::now()
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            command,
            total_records,
            sampled_records,
            category,
            strategy,
            analysis,
            candidates,
        }
    }
}

/// Write the wave report as pretty-printed JSON
pub fn write_waves_json(file_path: &str, report: &WaveReport) -> Result<(), String> {
    let mut writer = create_writer(file_path)?;
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| format!("Failed to serialize wave report: {}", e))?;
    writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Wave report written to: {}", file_path);
    Ok(())
}
