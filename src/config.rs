use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, SplitError};

const RATIO_TOLERANCE: f64 = 1e-6;

/// Settings for turning a corpus into training data.
///
/// Every field is optional in a config file; missing ones take their default.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub train_ratio: f64,
    pub test_ratio: f64,
    pub dev_ratio: f64,
    /// Seed for shuffling the corpus before it is split.
    pub seed: u64,
    /// Only use this many sentences of the corpus.
    pub max_sentences: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.8,
            test_ratio: 0.1,
            dev_ratio: 0.1,
            seed: 42,
            max_sentences: None,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SplitError> {
        let ratios = [
            ("train_ratio", self.train_ratio),
            ("test_ratio", self.test_ratio),
            ("dev_ratio", self.dev_ratio),
        ];

        for &(name, value) in ratios.iter() {
            if !(0.0..=1.0).contains(&value) {
                return Err(SplitError::RatioOutOfRange { name, value });
            }
        }

        let sum = self.train_ratio + self.test_ratio + self.dev_ratio;
        if (sum - 1.0).abs() > RATIO_TOLERANCE {
            return Err(SplitError::RatiosDoNotSumToOne(sum));
        }

        Ok(())
    }
}
