// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Versioned public copy of the German Credit dataset.
pub const DEFAULT_DATASET_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/statlog/german/german.data";

/// File name of the cached raw dataset inside `raw_dir()`.
pub const RAW_FILE_NAME: &str = "german_credit.data";

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SYNTHETIC_RECORDS: usize = 1000;

/// Runtime settings for one pipeline run.
///
/// Resolution order: built-in defaults, then the YAML file named by
/// `CREDIT_ETL_CONFIG` (if set), then the `CREDIT_ETL_*` environment
/// overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root under which `data/raw` and `data/processed` live.
    pub base_dir: PathBuf,
    /// Seed for synthetic records, score noise and request dates.
    pub seed: u64,
    pub dataset_url: String,
    pub fetch_timeout_secs: u64,
    /// Number of records generated when the dataset cannot be fetched.
    pub synthetic_records: usize,
    /// Also write a `.parquet` copy of every table.
    pub write_parquet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            seed: DEFAULT_SEED,
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            fetch_timeout_secs: 30,
            synthetic_records: DEFAULT_SYNTHETIC_RECORDS,
            write_parquet: false,
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var("CREDIT_ETL_CONFIG") {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("deserializing YAML config")
    }

    /// Apply `CREDIT_ETL_*` overrides using `lookup` to resolve variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("CREDIT_ETL_BASE_DIR") {
            self.base_dir = PathBuf::from(dir);
        }
        if let Some(seed) = lookup("CREDIT_ETL_SEED") {
            self.seed = seed
                .trim()
                .parse()
                .with_context(|| format!("CREDIT_ETL_SEED is not an integer: {:?}", seed))?;
        }
        if let Some(url) = lookup("CREDIT_ETL_URL") {
            self.dataset_url = url;
        }
        if let Some(secs) = lookup("CREDIT_ETL_TIMEOUT_SECS") {
            self.fetch_timeout_secs = secs.trim().parse().with_context(|| {
                format!("CREDIT_ETL_TIMEOUT_SECS is not an integer: {:?}", secs)
            })?;
        }
        if let Some(flag) = lookup("CREDIT_ETL_PARQUET") {
            self.write_parquet = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        Ok(())
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("processed")
    }

    pub fn raw_file(&self) -> PathBuf {
        self.raw_dir().join(RAW_FILE_NAME)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Create the raw-cache and processed-output directories if absent.
    pub fn ensure_dirs(&self) -> Result<()> {
        for d in [self.raw_dir(), self.processed_dir()] {
            fs::create_dir_all(&d)
                .with_context(|| format!("creating directory {}", d.display()))?;
        }
        Ok(())
    }
}
