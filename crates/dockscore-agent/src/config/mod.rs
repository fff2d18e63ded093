//! Configuration loading for dockscore.
//! Reads dockscore.toml from the current directory or the path in DOCKSCORE_CONFIG.
//! Every setting has a default, so a missing file means a default run.

use dockscore_common::DockscoreError;
use dockscore_molecules::discovery::{DEFAULT_INPUT_DIR, DEFAULT_SUFFIX};
use dockscore_molecules::MalformedPolicy;
use dockscore_ranker::DEFAULT_OUTPUT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "DOCKSCORE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "dockscore.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

fn default_input_dir() -> PathBuf { PathBuf::from(DEFAULT_INPUT_DIR) }
fn default_suffix()    -> String  { DEFAULT_SUFFIX.to_string() }

impl Default for InputConfig {
    fn default() -> Self {
        Self { dir: default_input_dir(), suffix: default_suffix() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

fn default_output_path() -> PathBuf { PathBuf::from(DEFAULT_OUTPUT) }

impl Default for OutputConfig {
    fn default() -> Self {
        Self { path: default_output_path() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Files parsed at once. 1 keeps the run single-threaded.
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub malformed: MalformedPolicy,
}

fn default_workers() -> usize { 1 }

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { workers: default_workers(), malformed: MalformedPolicy::default() }
    }
}


impl Config {
    /// Load configuration.
    /// Checks DOCKSCORE_CONFIG env var first, then dockscore.toml in the current directory.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                if !Path::new(&path).exists() {
                    anyhow::bail!("Config file not found: {} (from {})", path, CONFIG_ENV);
                }
                Self::load_from(Path::new(&path))
            }
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
            }
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> dockscore_common::Result<()> {
        if self.input.suffix.is_empty() {
            return Err(DockscoreError::Config("input.suffix must not be empty".to_string()));
        }
        if self.processing.workers == 0 {
            return Err(DockscoreError::Config("processing.workers must be at least 1".to_string()));
        }
        if self.output.path.file_name().is_none() {
            return Err(DockscoreError::Config(format!(
                "output.path {:?} does not name a file",
                self.output.path
            )));
        }
        Ok(())
    }
}
