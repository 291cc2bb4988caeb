// wave_report.rs - Checklist report of epidemic wave candidates for manual selection

use clap::{Arg, Command};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use seqwave::core::{aggregate, first_in_period, records_in_window, Granularity};
use seqwave::data::{parse_flexible_date, read_fasta_file};
use seqwave::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("Wave Report")
        .version(seqwave::VERSION)
        .about("Lists detected peaks, troughs and off-season clusters as checklist candidates")
        .arg(Arg::new("input")
            .long("input")
            .short('i')
            .value_name("FILE")
            .help("GISAID-style FASTA file")
            .required(true))
        .arg(Arg::new("sensitivity")
            .long("sensitivity")
            .value_name("FLOAT")
            .help("Prominence sensitivity, 0.0-1.0 (default: 0.5)")
            .default_value("0.5"))
        .arg(Arg::new("min-peak-height")
            .long("min-peak-height")
            .value_name("COUNT")
            .help("Minimum weekly count for a peak (default: 5)")
            .default_value("5"))
        .arg(Arg::new("hasher")
            .long("hasher")
            .value_name("NAME")
            .help("Identity hasher: md5, sha256 (default: md5)")
            .default_value("md5"))
        .arg(Arg::new("start")
            .long("start")
            .value_name("DATE")
            .help("Restrict to records collected on or after this date"))
        .arg(Arg::new("end")
            .long("end")
            .value_name("DATE")
            .help("Restrict to records collected on or before this date"))
        .arg(Arg::new("series")
            .long("series")
            .value_name("PERIOD")
            .help("Also print the count series: week, month, quarter"))
        .arg(Arg::new("output")
            .long("output")
            .short('o')
            .value_name("FILE")
            .help("Write the candidate checklist as TSV"))
        .get_matches();

    let input = matches
        .get_one::<String>("input")
        .ok_or("--input is required")?;
    let sensitivity: f64 = matches
        .get_one::<String>("sensitivity")
        .map(|s| s.parse::<f64>())
        .transpose()
        .map_err(|e| format!("Invalid --sensitivity: {}", e))?
        .unwrap_or(0.5);
    let min_peak_height: usize = matches
        .get_one::<String>("min-peak-height")
        .map(|s| s.parse::<usize>())
        .transpose()
        .map_err(|e| format!("Invalid --min-peak-height: {}", e))?
        .unwrap_or(5);
    let hasher_name = matches
        .get_one::<String>("hasher")
        .map(String::as_str)
        .unwrap_or("md5");

    let registry = HasherRegistry::new();
    let hasher = registry.get_hasher(hasher_name).ok_or_else(|| {
        format!(
            "Invalid hasher '{}'. Available: {}",
            hasher_name,
            registry.get_hasher_names().join(", ")
        )
    })?;

    println!("🌊 Wave Report v{}", seqwave::VERSION);
    let batch = read_fasta_file(Path::new(input), hasher.as_ref())?;
    let mut records = batch.records;

    // Optional date window
    let start = parse_date_arg(matches.get_one::<String>("start"), "--start")?;
    let end = parse_date_arg(matches.get_one::<String>("end"), "--end")?;
    if start.is_some() || end.is_some() {
        let lo = start.unwrap_or(chrono::NaiveDate::MIN);
        let hi = end.unwrap_or(chrono::NaiveDate::MAX);
        if lo > hi {
            return Err("--start must not be after --end".into());
        }
        let before = records.len();
        records = records_in_window(&records, lo, hi);
        println!("📅 Date window: {} → {} records", before, records.len());
    }

    let detector = WaveDetector::new(sensitivity, min_peak_height);
    let sampler = AdaptiveSampler::new(detector);
    println!(
        "📊 {} records, lifespan category: {}",
        records.len(),
        sampler.classify(&records)
    );

    if let Some(period) = matches.get_one::<String>("series") {
        let granularity: Granularity = period.parse()?;
        let series = aggregate(&records, granularity);
        println!("\n📈 Counts per {} ({} periods):", granularity, series.len());
        for (period, count) in &series.entries {
            println!("   {:<10} {:>6}", period.to_string(), count);
        }
    }

    let candidates = detector.candidate_peaks(&records);
    if candidates.is_empty() {
        println!("\n⚠️  No candidates: signal too flat or too few periods");
        return Ok(());
    }

    println!("\n📋 Candidate checklist ({} items):", candidates.len());
    println!("   {:<10} {:>6}  {:<20} {:>4}  first accession", "period", "count", "type", "rank");
    let mut rows = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        let first = first_in_period(&records, &candidate.period)
            .map(|r| r.accession.as_str())
            .unwrap_or(UNKNOWN);
        let rank = candidate
            .rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:<10} {:>6}  {:<20} {:>4}  {}",
            candidate.period.to_string(),
            candidate.count,
            candidate.kind.to_string(),
            rank,
            first
        );
        rows.push((candidate, rank, first.to_string()));
    }

    if let Some(path) = matches.get_one::<String>("output") {
        let file = File::create(path)
            .map_err(|e| format!("Failed to create output file '{}': {}", path, e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "period\tcount\ttype\trank\tfirst_accession")?;
        for (candidate, rank, first) in rows {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}",
                candidate.period, candidate.count, candidate.kind, rank, first
            )?;
        }
        writer.flush()?;
        println!("\n✅ Checklist written to: {}", path);
    }

    Ok(())
}

fn parse_date_arg(value: Option<&String>, flag: &str) -> Result<Option<chrono::NaiveDate>, String> {
    match value {
        Some(raw) => parse_flexible_date(raw)
            .map(Some)
            .ok_or_else(|| format!("Invalid {} date: {}", flag, raw)),
        None => Ok(None),
    }
}
