// main.rs - CLI entry point

use std::path::Path;
use std::time::{Duration, Instant};

use seqwave::cli::Config;
use seqwave::core::{available_fields, clade_filter, refine, subtype_filter, DataQualityReport};
use seqwave::data::{generate_sample_gisaid, parse_fasta, read_fasta_file};
use seqwave::output::{write_fasta, write_metadata_tsv, write_waves_json, WaveReport};
use seqwave::prelude::*;

/// Latency targets for benchmark mode
const PARSE_TARGET_PER_10K: Duration = Duration::from_secs(5);
const FILTER_TARGET: Duration = Duration::from_secs(1);
const PEAKS_TARGET: Duration = Duration::from_millis(100);
const SAMPLING_TARGET: Duration = Duration::from_secs(2);
const SYNTHETIC_SEED: u64 = 42;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    if args.list_hashers {
        println!("🔨 Available hashers:");
        for (name, desc) in HasherRegistry::new().list_hashers() {
            println!("   • {:<8} {}", name, desc);
        }
        return Ok(());
    }

    // Load configuration file if specified
    let mut config_rules = Vec::new();
    if let Some(config_path) = args.config.clone() {
        let (merged, rules) = args.with_config_file(&config_path)?;
        args = merged;
        config_rules = rules;
    }

    if args.synthetic.is_some() && !args.benchmark {
        return Err("--synthetic is only valid with --benchmark".to_string());
    }

    println!("🧬 seqwave v{}", env!("CARGO_PKG_VERSION"));

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        println!("🧵 Threads: {}", n);
    } else {
        println!("🧵 Threads: {} (auto-detected)", rayon::current_num_threads());
    }

    // Validate all arguments
    let validation = validate_args(&args, &config_rules)?;
    println!("🔨 Hasher: {}", validation.hasher.name());

    let batch = match (args.synthetic, args.input.as_deref()) {
        (Some(n), _) => {
            println!("🧪 Generating {} synthetic records", n);
            let text = generate_sample_gisaid(n, SYNTHETIC_SEED);
            parse_fasta(&text, validation.hasher.as_ref())?
        }
        (None, Some(input)) => read_fasta_file(Path::new(input), validation.hasher.as_ref())?,
        (None, None) => return Err("--input is required".to_string()),
    };
    let records = batch.records;
    println!(
        "📊 Parsed {} records in {:.2}s",
        records.len(),
        batch.elapsed.as_secs_f64()
    );

    if args.fields {
        print_fields(&records);
        return Ok(());
    }

    DataQualityReport::assess(&records).print_report();

    if args.benchmark {
        return run_benchmark(&records, batch.elapsed, &validation, &command_line);
    }

    // Rule filtering
    for (rule, reason) in validation.engine.skipped() {
        println!("⚠️  Skipping filter '{}': {}", rule, reason);
    }
    let mut filtered = validation.engine.apply(&records);
    if validation.engine.active_rules() > 0 {
        println!(
            "🔍 Filter rules ({}): {} → {} records",
            validation.engine.active_rules(),
            records.len(),
            filtered.len()
        );
    }

    if !validation.subtypes.is_empty() {
        let before = filtered.len();
        filtered = subtype_filter(&filtered, &validation.subtypes);
        println!(
            "🔍 Subtypes [{}]: {} → {} records",
            validation.subtypes.join(", "),
            before,
            filtered.len()
        );
    }

    if let Some(clade) = &args.clade {
        let before = filtered.len();
        filtered = clade_filter(&filtered, clade, args.clade_level);
        println!("🔍 Clade {}: {} → {} records", clade, before, filtered.len());
    }

    if !validation.refine.is_noop() {
        let before = filtered.len();
        filtered = refine(&filtered, &validation.refine);
        println!("🧹 Refinement: {} → {} records", before, filtered.len());
    }

    if filtered.is_empty() {
        println!("⚠️  No records left after filtering");
    }

    if let Some(path) = &args.filtered_output {
        write_fasta(path, &filtered)?;
    }

    if args.dry_run {
        println!("✅ Dry run completed successfully");
        println!("📊 {} of {} records pass all filters", filtered.len(), records.len());
        return Ok(());
    }

    // Adaptive sampling
    let sampler = validation.sampler();
    let start = Instant::now();
    let outcome = sampler.run_with(&filtered, validation.category);
    println!(
        "\n🎯 Lifespan category: {} → {}",
        outcome.category, outcome.strategy
    );

    let mut sampled = outcome.records;
    if let Some(cap) = args.max_samples {
        if sampled.len() > cap {
            sampled = AdaptiveSampler::chronological(&sampled, cap);
            println!("✂️  Capped to {} records by chronological spacing", cap);
        }
    }
    println!(
        "✅ Selected {} representatives from {} records in {:.2}s",
        sampled.len(),
        filtered.len(),
        start.elapsed().as_secs_f64()
    );

    // Waves and checklist candidates
    let analysis = match outcome.analysis {
        Some(analysis) => analysis,
        None => validation.detector.detect(&filtered),
    };
    let candidates = validation.detector.candidate_peaks(&filtered);
    print_waves(&analysis, &candidates);

    // Outputs
    if let Some(path) = &args.output {
        write_fasta(path, &sampled)?;
    }
    if let Some(path) = &args.metadata {
        write_metadata_tsv(path, &sampled)?;
    }
    if let Some(path) = &args.waves_json {
        let report = WaveReport::new(
            &command_line,
            filtered.len(),
            sampled.len(),
            outcome.category,
            outcome.strategy,
            &analysis,
            &candidates,
        );
        write_waves_json(path, &report)?;
    }

    if args.output.is_none() && args.metadata.is_none() && args.waves_json.is_none() {
        println!("💡 No output requested; use --output, --metadata or --waves-json");
    }

    Ok(())
}

fn print_fields(records: &[Record]) {
    let fields = available_fields(records);
    println!("\n📋 Filterable fields ({} of {} records):", fields.len(), records.len());
    for field in fields {
        println!(
            "   • {:<16} {:>5.1}% populated, {:>6} unique  e.g. {}",
            field.name,
            field.populated_pct,
            field.n_unique,
            field.sample_values.join(", ")
        );
    }
}

fn print_waves(analysis: &WaveAnalysis, candidates: &[Candidate]) {
    println!(
        "\n🌊 Waves: {} peak(s), {} trough(s) over {} weeks",
        analysis.wave_count,
        analysis.troughs.len(),
        analysis.series.len()
    );
    for (period, count) in &analysis.peaks {
        println!("   ▲ {} ({} sequences)", period, count);
    }
    for (period, count) in &analysis.troughs {
        println!("   ▼ {} ({} sequences)", period, count);
    }
    let off_season = candidates
        .iter()
        .filter(|c| c.kind == CandidateKind::OffSeasonCluster)
        .count();
    if off_season > 0 {
        println!("   ⚠️  {} off-season cluster month(s)", off_season);
    }
}

fn verdict(elapsed: Duration, target: Duration) -> &'static str {
    if elapsed <= target {
        "PASS"
    } else {
        "FAIL"
    }
}

fn run_benchmark(
    records: &[Record],
    parse_elapsed: Duration,
    validation: &ValidationResult,
    command_line: &str,
) -> Result<(), String> {
    println!("\n🏁 === BENCHMARK MODE ===");
    println!(
        "📊 {} records, {} threads",
        records.len(),
        rayon::current_num_threads()
    );

    // Parse target scales with the record count, 5s per 10k records
    let parse_target = PARSE_TARGET_PER_10K.mul_f64((records.len() as f64 / 10_000.0).max(1.0));

    // A single filter pass: the configured rules, or a representative in_list rule
    let bench_rules = if validation.rules.is_empty() {
        vec![FilterRule::in_list("subtype_clean", &["H3N2", "H1N1"])]
    } else {
        validation.rules.clone()
    };
    let filter_start = Instant::now();
    let filtered = FilterEngine::new(&bench_rules).apply(records);
    let filter_elapsed = filter_start.elapsed();

    let peaks_start = Instant::now();
    let analysis = validation.detector.detect(records);
    let peaks_elapsed = peaks_start.elapsed();

    let sampling_start = Instant::now();
    let outcome = validation.sampler().run(records);
    let sampling_elapsed = sampling_start.elapsed();

    let stages = [
        ("parse", parse_elapsed, parse_target),
        ("filter", filter_elapsed, FILTER_TARGET),
        ("peaks", peaks_elapsed, PEAKS_TARGET),
        ("sampling", sampling_elapsed, SAMPLING_TARGET),
    ];

    println!();
    let mut all_pass = true;
    for (name, elapsed, target) in &stages {
        let result = verdict(*elapsed, *target);
        all_pass &= result == "PASS";
        let icon = if result == "PASS" { "✅" } else { "❌" };
        println!(
            "   {} {:<9} {:>10.2} ms  (target {:>7.0} ms)  {}",
            icon,
            name,
            elapsed.as_secs_f64() * 1000.0,
            target.as_secs_f64() * 1000.0,
            result
        );
    }
    println!(
        "\n📈 Filter kept {} records; {} wave(s); {} representatives ({})",
        filtered.len(),
        analysis.wave_count,
        outcome.records.len(),
        outcome.strategy
    );

    let timestamp = chrono::Utc::now().timestamp();
    let json_filename = format!("seqwave_benchmark_{}.json", timestamp);
    let stage_results: Vec<serde_json::Value> = stages
        .iter()
        .map(|(name, elapsed, target)| {
            serde_json::json!({
                "stage": name,
                "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
                "target_ms": target.as_secs_f64() * 1000.0,
                "result": verdict(*elapsed, *target),
            })
        })
        .collect();

    let benchmark_results = serde_json::json!({
        "timestamp": timestamp,
        "command_line": command_line,
        "test_info": {
            "threads": rayon::current_num_threads(),
            "hasher": validation.hasher.name(),
            "sensitivity": validation.detector.sensitivity(),
            "min_peak_height": validation.detector.min_peak_height(),
        },
        "dataset_info": {
            "records": records.len(),
            "filtered_records": filtered.len(),
            "weekly_periods": analysis.series.len(),
            "wave_count": analysis.wave_count,
            "category": outcome.category.to_string(),
            "representatives": outcome.records.len(),
        },
        "stages": stage_results,
        "all_pass": all_pass,
    });

    let content = serde_json::to_string_pretty(&benchmark_results)
        .map_err(|e| format!("Failed to serialize benchmark results: {}", e))?;
    std::fs::write(&json_filename, content)
        .map_err(|e| format!("Failed to write '{}': {}", json_filename, e))?;
    println!("💾 Benchmark results saved to: {}", json_filename);

    if all_pass {
        println!("✅ All stages within targets");
    } else {
        println!("⚠️  Some stages exceeded their targets");
    }
    Ok(())
}
