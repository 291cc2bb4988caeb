// validation.rs - Input validation utilities

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;

use crate::cli::args::Args;
use crate::core::filter::{Arity, FilterEngine, FilterOperator, FilterRule, RuleValue};
use crate::core::refine::{DedupMode, RefineOptions};
use crate::core::sampler::{AdaptiveSampler, LifespanCategory};
use crate::core::waves::WaveDetector;
use crate::data::record::CLADE_LEVELS;
use crate::hashers::{HasherRegistry, IdentityHasher};

pub struct ValidationResult {
    pub hasher: Arc<dyn IdentityHasher>,
    pub rules: Vec<FilterRule>,
    pub engine: FilterEngine,
    pub subtypes: Vec<String>,
    pub refine: RefineOptions,
    pub category: Option<LifespanCategory>,
    pub detector: WaveDetector,
}

impl ValidationResult {
    pub fn sampler(&self) -> AdaptiveSampler {
        AdaptiveSampler::new(self.detector)
    }
}

/// Validate all command line arguments. `config_rules` come from the TOML
/// config and are ANDed with `--filter` rules.
pub fn validate_args(args: &Args, config_rules: &[FilterRule]) -> Result<ValidationResult, String> {
    // Validate hasher
    let registry = HasherRegistry::new();
    let hasher = registry.get_hasher(&args.hasher).ok_or_else(|| {
        let available: Vec<String> = registry
            .list_hashers()
            .into_iter()
            .map(|(name, desc)| format!("{} ({})", name, desc))
            .collect();
        format!(
            "Invalid hasher '{}'. Available: {}",
            args.hasher,
            available.join(", ")
        )
    })?;

    // Validate wave detection parameters
    if !(0.0..=1.0).contains(&args.sensitivity) {
        return Err("Sensitivity must be between 0.0 and 1.0".to_string());
    }
    let detector = WaveDetector::new(args.sensitivity, args.min_peak_height);

    // Validate category
    let category = match args.category.trim().to_lowercase().as_str() {
        "auto" => None,
        other => Some(other.parse::<LifespanCategory>()?),
    };

    // Validate dedup mode
    let dedup = match args.dedup.trim().to_lowercase().as_str() {
        "none" => None,
        other => Some(other.parse::<DedupMode>()?),
    };

    if let Some(level) = args.clade_level {
        if !(1..=CLADE_LEVELS).contains(&level) {
            return Err(format!("Clade level must be between 1 and {}", CLADE_LEVELS));
        }
        if args.clade.is_none() {
            return Err("--clade-level requires --clade".to_string());
        }
    }

    if args.max_samples == Some(0) {
        return Err("--max-samples must be greater than 0".to_string());
    }

    // Collect rules: config first, then CLI
    let mut rules = config_rules.to_vec();
    for spec in &args.filter {
        rules.push(parse_rule_spec(spec)?);
    }
    let engine = FilterEngine::new(&rules);

    let subtypes = args
        .subtypes
        .as_deref()
        .map(split_list)
        .unwrap_or_default();

    let accessions = match &args.accessions_file {
        Some(path) => load_set_from_file(path)?,
        None => HashSet::new(),
    };

    Ok(ValidationResult {
        hasher,
        rules,
        engine,
        subtypes,
        refine: RefineOptions {
            min_length: args.min_length,
            max_n_run: args.max_n_run,
            dedup,
            accessions,
        },
        category,
        detector,
    })
}

/// Parse `field:operator:value`. List and date_range values are comma-separated.
pub fn parse_rule_spec(spec: &str) -> Result<FilterRule, String> {
    let mut parts = spec.splitn(3, ':');
    let (field, operator, value) = match (parts.next(), parts.next(), parts.next()) {
        (Some(f), Some(o), Some(v)) if !f.trim().is_empty() => (f.trim(), o, v),
        _ => {
            return Err(format!(
                "Invalid filter '{}'. Expected field:operator:value",
                spec
            ))
        }
    };
    let operator: FilterOperator = operator.parse()?;

    let value = match operator.arity() {
        Arity::Scalar => RuleValue::Text(value.to_string()),
        Arity::List | Arity::Pair => {
            let items = split_list(value);
            if operator.arity() == Arity::Pair && items.len() != 2 {
                return Err(format!(
                    "Invalid filter '{}': {} needs start,end",
                    spec, operator
                ));
            }
            RuleValue::List(items.into_iter().map(RuleValue::Text).collect())
        }
    };

    Ok(FilterRule::new(field, operator, value))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load a set of strings from a file (one per line)
fn load_set_from_file(file_path: &str) -> Result<HashSet<String>, String> {
    let file = File::open(file_path)
        .map_err(|e| format!("Failed to open list file '{}': {}", file_path, e))?;

    let reader = BufReader::new(file);
    let mut set = HashSet::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            format!(
                "Failed to read line {} from '{}': {}",
                line_num + 1,
                file_path,
                e
            )
        })?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            set.insert(trimmed.to_string());
        }
    }

    println!("📋 Loaded {} accessions from '{}'", set.len(), file_path);
    Ok(set)
}
