// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};
use crate::core::filter::FilterRule;

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.input.is_none() {
            self.input = config.input;
        }
        if self.output.is_none() {
            self.output = config.output;
        }
        if self.filtered_output.is_none() {
            self.filtered_output = config.filtered_output;
        }
        if self.metadata.is_none() {
            self.metadata = config.metadata;
        }
        if self.waves_json.is_none() {
            self.waves_json = config.waves_json;
        }

        // Core settings (only override defaults, not explicit CLI values)
        if self.hasher == "md5" {
            if let Some(hasher) = config.hasher {
                self.hasher = hasher;
            }
        }
        if self.threads.is_none() {
            self.threads = config.threads;
        }

        // Refinement
        if self.subtypes.is_none() {
            self.subtypes = config.subtypes.map(|list| list.join(","));
        }
        if self.clade.is_none() {
            self.clade = config.clade;
        }
        if self.clade_level.is_none() {
            self.clade_level = config.clade_level;
        }
        if self.min_length.is_none() {
            self.min_length = config.min_length;
        }
        if self.max_n_run.is_none() {
            self.max_n_run = config.max_n_run;
        }
        if self.dedup == "none" {
            if let Some(dedup) = config.dedup {
                self.dedup = dedup;
            }
        }
        if self.accessions_file.is_none() {
            self.accessions_file = config.accessions_file;
        }

        // Waves and sampling (only override defaults)
        if self.category == "auto" {
            if let Some(category) = config.category {
                self.category = category;
            }
        }
        if self.sensitivity == 0.5 {
            if let Some(sensitivity) = config.sensitivity {
                self.sensitivity = sensitivity;
            }
        }
        if self.min_peak_height == 5 {
            if let Some(height) = config.min_peak_height {
                self.min_peak_height = height;
            }
        }
        if self.max_samples.is_none() {
            self.max_samples = config.max_samples;
        }

        // Flags
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args. Config rules are returned
    /// separately; they are ANDed with any --filter rules.
    pub fn with_config_file(self, config_path: &str) -> Result<(Self, Vec<FilterRule>), String> {
        let mut config = Config::from_file(config_path)?;
        let rules = config.rules.take().unwrap_or_default();
        Ok((self.merge_with_config(config), rules))
    }
}
