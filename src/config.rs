use crate::consts::{
    DEFAULT_ANNEALING_FACTOR, DEFAULT_GRAIL_CATEGORIES, DEFAULT_NUM_CATEGORIES, DEFAULT_TEMPERATURE,
};
use crate::core_types::CategoryId;
use crate::error::{ReshufflerError, RsResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[command(flatten)]
    pub anneal: AnnealParams,
    #[command(flatten)]
    pub weights: PenaltyWeights,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealParams {
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f64,
    #[arg(long, default_value_t = DEFAULT_ANNEALING_FACTOR)]
    pub annealing_factor: f64,
    /// Overrides the iteration budget derived from the cooling schedule.
    #[arg(long)]
    pub max_iterations: Option<usize>,
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl Default for AnnealParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            annealing_factor: DEFAULT_ANNEALING_FACTOR,
            max_iterations: None,
            verbose: false,
        }
    }
}

/// Relative weights of the three allocation penalty terms.
#[derive(Args, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    #[arg(long, default_value_t = 1.0)]
    pub weight_duplication: f64,
    #[arg(long, default_value_t = 1.0)]
    pub weight_returned_category: f64,
    #[arg(long, default_value_t = 1.0)]
    pub weight_returned_token: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            weight_duplication: 1.0,
            weight_returned_category: 1.0,
            weight_returned_token: 1.0,
        }
    }
}

impl PenaltyWeights {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RsResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ReshufflerError::Config(format!(
                "Failed to read weights file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let weights: Self = serde_json::from_str(&content)?;
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> RsResult<()> {
        let all = [
            ("weight_duplication", self.weight_duplication),
            ("weight_returned_category", self.weight_returned_category),
            ("weight_returned_token", self.weight_returned_token),
        ];
        for (name, w) in all {
            if !w.is_finite() || w < 0.0 {
                return Err(ReshufflerError::Config(format!(
                    "{} must be a finite, non-negative number, got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }

    /// Copies over the weights that were explicitly given on the command line.
    pub fn merge_from_cli(&mut self, cli_weights: &PenaltyWeights, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli_weights.$field;
                }
            };
        }

        update_if_present!(weight_duplication, "weight_duplication");
        update_if_present!(weight_returned_category, "weight_returned_category");
        update_if_present!(weight_returned_token, "weight_returned_token");
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputParams {
    #[arg(global = true, long, default_value_t = DEFAULT_NUM_CATEGORIES)]
    pub num_categories: usize,
    /// Owner whose allocation is the score-exempt pool.
    #[arg(global = true, long)]
    pub pool_owner: Option<String>,
    /// Categories counted as grails in the reports, comma separated.
    #[arg(global = true, long, value_delimiter = ',', default_values_t = DEFAULT_GRAIL_CATEGORIES.to_vec())]
    pub grail_categories: Vec<CategoryId>,
}

impl Default for InputParams {
    fn default() -> Self {
        Self {
            num_categories: DEFAULT_NUM_CATEGORIES,
            pool_owner: None,
            grail_categories: DEFAULT_GRAIL_CATEGORIES.to_vec(),
        }
    }
}
