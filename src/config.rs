//! Engine configuration
//!
//! Settings are plain serde structs loadable from TOML or YAML. The active
//! configuration is process-wide: operators read it through [`global`] when
//! deciding whether to fan work out over rayon.

use std::fs;
use std::path::Path;
use std::sync::RwLock;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Application name, used in log output
    pub app_name: String,
    /// Minimum number of rows (or groups / partitions) before work is parallelized
    pub parallel_threshold: usize,
    /// Number of shards used when rows are processed in parallel
    pub shuffle_partitions: usize,
    /// chrono format used when parsing dates from text
    pub date_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "tablrs".to_string(),
            parallel_threshold: 10_000,
            shuffle_partitions: 8,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application name
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Set the parallelization threshold
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Set the number of shards for parallel row processing
    pub fn with_shuffle_partitions(mut self, partitions: usize) -> Self {
        self.shuffle_partitions = partitions;
        self
    }

    /// Set the date format
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<()> {
        if self.parallel_threshold == 0 {
            return Err(Error::Config(
                "parallel_threshold must be at least 1".to_string(),
            ));
        }
        if self.shuffle_partitions == 0 {
            return Err(Error::Config(
                "shuffle_partitions must be at least 1".to_string(),
            ));
        }
        if self.date_format.trim().is_empty() {
            return Err(Error::Config("date_format must not be empty".to_string()));
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Err(Error::Config(format!(
                "unsupported configuration file: {}",
                path.display()
            ))),
        }
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Whether `size` units of work should be spread over rayon
    pub fn should_parallelize(&self, size: usize) -> bool {
        size >= self.parallel_threshold
    }

    /// Shard length for `len` rows
    pub fn chunk_size(&self, len: usize) -> usize {
        (len / self.shuffle_partitions.max(1)).max(1)
    }
}

lazy_static! {
    static ref GLOBAL_CONFIG: RwLock<EngineConfig> = RwLock::new(EngineConfig::default());
}

/// Snapshot of the active configuration
pub fn global() -> EngineConfig {
    match GLOBAL_CONFIG.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => {
            log::warn!("engine configuration lock poisoned, using last written value");
            poisoned.into_inner().clone()
        }
    }
}

/// Replace the active configuration after validating it
pub fn set_global(config: EngineConfig) -> Result<()> {
    config.validate()?;
    log::debug!(
        "{}: parallel_threshold={}, shuffle_partitions={}",
        config.app_name,
        config.parallel_threshold,
        config.shuffle_partitions
    );
    match GLOBAL_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
    Ok(())
}
