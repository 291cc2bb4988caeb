// fasta.rs - FASTA text ingestion into record collections

use bio::io::fasta;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::data::dates::batch_parse_dates;
use crate::data::header::HeaderFields;
use crate::data::record::Record;
use crate::hashers::{normalize_sequence, IdentityHasher};

/// One raw FASTA entry: header text after `>` and the concatenated body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaEntry {
    pub header: String,
    pub sequence: String,
}

/// Records parsed from one FASTA text, in input order
#[derive(Debug)]
pub struct ParsedBatch {
    pub records: Vec<Record>,
    pub elapsed: Duration,
}

/// Split FASTA text into entries. Anything before the first header line is ignored.
pub fn split_fasta(text: &str) -> Result<Vec<FastaEntry>, String> {
    let start = if text.starts_with('>') {
        Some(0)
    } else {
        text.find("\n>").map(|pos| pos + 1)
    };
    let Some(start) = start else {
        return Ok(Vec::new());
    };

    let body = &text[start..];
    // bio splits the header into id and description at the first whitespace,
    // so headers are taken verbatim from the `>` lines instead.
    let mut headers = body
        .lines()
        .filter_map(|line| line.strip_prefix('>'))
        .map(|line| line.trim_end_matches('\r'));

    let reader = fasta::Reader::new(body.as_bytes());
    let mut entries = Vec::new();

    for (index, record_result) in reader.records().enumerate() {
        let record = record_result
            .map_err(|e| format!("Invalid FASTA record #{}: {}", index + 1, e))?;
        let header = headers
            .next()
            .ok_or_else(|| format!("FASTA record #{} has no header line", index + 1))?
            .to_string();
        let sequence = String::from_utf8_lossy(record.seq()).into_owned();
        entries.push(FastaEntry { header, sequence });
    }

    Ok(entries)
}

/// Parse raw entries into records. Headers and hashes are computed in
/// parallel; dates go through the two-pass batch parser. Output order is input order.
pub fn parse_entries(entries: &[FastaEntry], hasher: &dyn IdentityHasher) -> Vec<Record> {
    let parsed: Vec<(HeaderFields, String)> = entries
        .par_iter()
        .map(|entry| {
            (
                HeaderFields::parse(&entry.header),
                normalize_sequence(&entry.sequence),
            )
        })
        .collect();

    let raw_dates: Vec<&str> = parsed.iter().map(|(f, _)| f.raw_date.as_str()).collect();
    let dates = batch_parse_dates(&raw_dates);

    parsed
        .into_par_iter()
        .zip(dates.into_par_iter())
        .map(|((fields, sequence), date)| {
            let hash = hasher.hash_sequence(&sequence);
            Record::from_parts(fields, date, sequence, hash)
        })
        .collect()
}

/// Parse decoded FASTA text into records
pub fn parse_fasta(text: &str, hasher: &dyn IdentityHasher) -> Result<ParsedBatch, String> {
    let start = Instant::now();
    let entries = split_fasta(text)?;
    let records = parse_entries(&entries, hasher);
    Ok(ParsedBatch {
        records,
        elapsed: start.elapsed(),
    })
}

/// Read a UTF-8 FASTA file (invalid bytes are replaced) and parse it
pub fn read_fasta_file(path: &Path, hasher: &dyn IdentityHasher) -> Result<ParsedBatch, String> {
    println!("🧬 Loading FASTA: {}", path.display());

    let bytes = std::fs::read(path)
        .map_err(|e| format!("Failed to read FASTA file '{}': {}", path.display(), e))?;
    let text = String::from_utf8_lossy(&bytes);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .map_err(|e| format!("Invalid progress template: {}", e))?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Parsing {} ({} bytes)", path.display(), bytes.len()));

    let batch = parse_fasta(&text, hasher)?;

    pb.finish_with_message(format!(
        "✅ Parsed {} records in {:.2}s",
        batch.records.len(),
        batch.elapsed.as_secs_f64()
    ));
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashers::{sequence_hash, Md5Hasher};

    const SAMPLE: &str = "\
>A/California/07/2009|A/_H1N1|HA|2009-04-09|EPI_ISL_29553|6B.1A
acgtACGT
NNNNNacgt

>A/New York/392/2004|A_/_H3N2|HA|2004-12|EPI_ISL_2|3C
ACGT
>B/Victoria/2/1987|B|B|NA|Australia|Human|1987|V1A.3a.2|EPI_ISL_100123
GGCC
";

    #[test]
    fn test_split_multiline_entries() {
        let entries = split_fasta(SAMPLE).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[1].header,
            "A/New York/392/2004|A_/_H3N2|HA|2004-12|EPI_ISL_2|3C"
        );
        assert_eq!(normalize_sequence(&entries[0].sequence), "ACGTACGTNNNNNACGT");
    }

    #[test]
    fn test_parse_fasta_preserves_order() {
        let batch = parse_fasta(SAMPLE, &Md5Hasher).unwrap();
        let isolates: Vec<&str> = batch.records.iter().map(|r| r.isolate.as_str()).collect();
        assert_eq!(
            isolates,
            vec!["A/California/07/2009", "A/New York/392/2004", "B/Victoria/2/1987"]
        );
        assert_eq!(batch.records[0].sequence_hash, sequence_hash("ACGTACGTNNNNNACGT"));
        assert_eq!(batch.records[1].location.as_deref(), Some("New York"));
        assert_eq!(
            batch.records[1].collection_date,
            chrono::NaiveDate::from_ymd_opt(2004, 12, 1)
        );
    }

    #[test]
    fn test_preamble_and_empty_input() {
        let text = "some preamble\n>x|H3N2\nAC\n";
        let entries = split_fasta(text).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].header, "x|H3N2");

        assert!(split_fasta("").unwrap().is_empty());
        assert!(split_fasta("no headers here").unwrap().is_empty());
    }

    #[test]
    fn test_header_whitespace_is_kept() {
        let text = ">A/New\tYork/1/2020|H3N2|HA|2020-01-01|EPI_1|3C\r\nACGT\r\n>A/Ohio  2|H1N1\nGG\n";
        let entries = split_fasta(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].header, "A/New\tYork/1/2020|H3N2|HA|2020-01-01|EPI_1|3C");
        assert_eq!(entries[1].header, "A/Ohio  2|H1N1");
        assert_eq!(normalize_sequence(&entries[1].sequence), "GG");
    }

    #[test]
    fn test_parse_many_records() {
        let mut text = String::new();
        for i in 0..500 {
            text.push_str(&format!(
                ">A/Texas/{}/2022|A_/_H3N2|HA|2022-{:02}-{:02}|EPI_ISL_{}|3C.2a1b\nACGT{}\n",
                i,
                i % 12 + 1,
                i % 28 + 1,
                i,
                "A".repeat(i % 7)
            ));
        }
        let batch = parse_fasta(&text, &Md5Hasher).unwrap();
        assert_eq!(batch.records.len(), 500);
        for (i, record) in batch.records.iter().enumerate() {
            assert_eq!(record.accession, format!("EPI_ISL_{}", i));
            assert!(record.collection_date.is_some());
            assert_eq!(record.sequence_length, 4 + i % 7);
        }
    }
}
