//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

const SIGCOMP_DISCLAIMER: &str = "I hereby accept the SigComp 2011 disclaimer.";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which half of the dataset an archive populates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

/// Dataset layout on disk
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Dataset root, e.g. `data/sigComp2011`
    #[serde(default = "default_root")]
    pub root: String,

    #[serde(default = "default_train_subdir")]
    pub train_subdir: String,

    #[serde(default = "default_test_subdir")]
    pub test_subdir: String,

    /// Recognized file extensions (case-insensitive)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_root() -> String {
    "data/sigComp2011".to_string()
}

fn default_train_subdir() -> String {
    "train".to_string()
}

fn default_test_subdir() -> String {
    "test".to_string()
}

fn default_extensions() -> Vec<String> {
    vec![".png".to_string()]
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            train_subdir: default_train_subdir(),
            test_subdir: default_test_subdir(),
            extensions: default_extensions(),
        }
    }
}

impl DatasetConfig {
    pub fn root(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    pub fn train_dir(&self) -> PathBuf {
        self.root().join(&self.train_subdir)
    }

    pub fn test_dir(&self) -> PathBuf {
        self.root().join(&self.test_subdir)
    }

    pub fn split_dir(&self, split: Split) -> PathBuf {
        match split {
            Split::Train => self.train_dir(),
            Split::Test => self.test_dir(),
        }
    }
}

/// Archive download and extraction settings
#[derive(Debug, Clone, Deserialize)]
pub struct AcquisitionConfig {
    #[serde(default = "default_archives")]
    pub archives: Vec<ArchiveConfig>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// One remote archive
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    pub split: Split,
    pub url: String,
    /// ZIP password, if the archive is encrypted
    #[serde(default)]
    pub password: Option<String>,
}

fn default_archives() -> Vec<ArchiveConfig> {
    vec![
        ArchiveConfig {
            split: Split::Train,
            url: "http://www.iapr-tc11.org/dataset/ICDAR_SignatureVerification/SigComp2011/sigComp2011-trainingSet.zip".to_string(),
            password: Some(SIGCOMP_DISCLAIMER.to_string()),
        },
        ArchiveConfig {
            split: Split::Test,
            url: "http://www.iapr-tc11.org/dataset/ICDAR_SignatureVerification/SigComp2011/sigComp2011-test.zip".to_string(),
            password: Some(SIGCOMP_DISCLAIMER.to_string()),
        },
    ]
}

fn default_request_timeout() -> u64 {
    600
}

fn default_user_agent() -> String {
    format!("sigcomp/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            archives: default_archives(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Index cache settings
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: String,
}

fn default_cache_path() -> String {
    "data/sigComp2011/index.cache".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

impl CacheConfig {
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("sigcomp").join("config.toml")),
            Some(PathBuf::from("/etc/sigcomp/config.toml")),
            Some(PathBuf::from("./sigcomp.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first existing, parseable file among `candidates`, falling back to the environment
    pub fn load_first(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(root) = lookup("SIGCOMP_DATA_DIR") {
            self.dataset.root = root;
        }
        if let Some(path) = lookup("SIGCOMP_CACHE_PATH") {
            self.cache.path = path;
        }
        if let Some(level) = lookup("SIGCOMP_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("SIGCOMP_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# SigComp Configuration
#
# Environment variables override these settings:
# - SIGCOMP_DATA_DIR
# - SIGCOMP_CACHE_PATH
# - SIGCOMP_LOG_LEVEL
# - SIGCOMP_LOG_FORMAT

[dataset]
# Dataset root; archives are downloaded here
root = "data/sigComp2011"

# Sub-directories the archives are extracted into
train_subdir = "train"
test_subdir = "test"

# Recognized image extensions (case-insensitive)
extensions = [".png"]

[acquisition]
# HTTP request timeout in seconds
request_timeout_secs = 600

[[acquisition.archives]]
split = "train"
url = "http://www.iapr-tc11.org/dataset/ICDAR_SignatureVerification/SigComp2011/sigComp2011-trainingSet.zip"
password = "I hereby accept the SigComp 2011 disclaimer."

[[acquisition.archives]]
split = "test"
url = "http://www.iapr-tc11.org/dataset/ICDAR_SignatureVerification/SigComp2011/sigComp2011-test.zip"
password = "I hereby accept the SigComp 2011 disclaimer."

[cache]
# Index cache file; delete it to rebuild the index
path = "data/sigComp2011/index.cache"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
