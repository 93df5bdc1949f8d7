//! Configuration management for codebrief.
//!
//! Loads configuration from TOML files and environment variables, with
//! defaults for every setting. Configuration is read once per
//! invocation and passed down explicitly.

use crate::core::error::{BriefError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub capability: CapabilityConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Walk, chunking and aggregation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Characters per chunk (not bytes!)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Character overlap between consecutive chunks
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Joins chunk summaries into the file text
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Extensions to process, without the dot; empty means every file
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Per-directory ignore file name
    #[serde(default = "default_ignore_file_name")]
    pub ignore_file_name: String,

    /// Patterns applied at the root before the root ignore file; the
    /// ignore files themselves are always excluded
    #[serde(default = "default_builtin_ignores")]
    pub builtin_ignores: Vec<String>,

    /// Skip files and directories whose name starts with '.'
    #[serde(default = "default_true")]
    pub skip_hidden: bool,

    /// Maximum file size in MB (skip larger files)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,

    /// Summarize the joined chunk summaries once more per file
    #[serde(default)]
    pub overview: bool,
}

/// Which built-in capability to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityBackend {
    /// Extractive summary, no model
    #[default]
    Excerpt,
    /// Hashed trigram embedding
    Ngram,
    /// External program per chunk
    Command,
}

impl std::fmt::Display for CapabilityBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityBackend::Excerpt => write!(f, "excerpt"),
            CapabilityBackend::Ngram => write!(f, "ngram"),
            CapabilityBackend::Command => write!(f, "command"),
        }
    }
}

/// Capability construction settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CapabilityConfig {
    /// Backend used for summaries
    #[serde(default)]
    pub summarizer: CapabilityBackend,

    /// Backend used for embeddings
    #[serde(default = "default_embedder")]
    pub embedder: CapabilityBackend,

    /// Leading-line length kept by the excerpt summarizer
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,

    /// Vector width of the n-gram embedder
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Program run by the command backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments for the command backend (`{path}`, `{chunk}` expand)
    #[serde(default)]
    pub args: Vec<String>,
}

/// Concurrency and time limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Files processed in parallel by concurrent runs
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Run deadline in seconds (0 = none)
    #[serde(default)]
    pub timeout_sec: u64,
}

// Default value functions
fn default_chunk_size() -> usize {
    1500
}

fn default_overlap() -> usize {
    100
}

fn default_separator() -> String {
    "\n".to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    ["py", "js", "java", "cpp", "c", "rb", "go", "php", "ts"]
        .iter()
        .map(|e| e.to_string())
        .collect()
}

fn default_ignore_file_name() -> String {
    ".gitignore".to_string()
}

fn default_builtin_ignores() -> Vec<String> {
    [".git/", "node_modules/", "__pycache__/", "*.pyc"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_max_file_size() -> usize {
    10
}

fn default_embedder() -> CapabilityBackend {
    CapabilityBackend::Ngram
}

fn default_excerpt_chars() -> usize {
    crate::core::capability::excerpt::DEFAULT_EXCERPT_CHARS
}

fn default_dimensions() -> usize {
    crate::core::capability::ngram::DEFAULT_EMBEDDING_DIMENSIONS
}

fn default_workers() -> usize {
    4
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            separator: default_separator(),
            allowed_extensions: default_allowed_extensions(),
            ignore_file_name: default_ignore_file_name(),
            builtin_ignores: default_builtin_ignores(),
            skip_hidden: default_true(),
            max_file_size_mb: default_max_file_size(),
            overview: false,
        }
    }
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            summarizer: CapabilityBackend::default(),
            embedder: default_embedder(),
            excerpt_chars: default_excerpt_chars(),
            dimensions: default_dimensions(),
            command: None,
            args: Vec::new(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            timeout_sec: 0,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            BriefError::ConfigError(format!("Failed to read config file {path:?}: {e}"))
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. CODEBRIEF_CONFIG env var
    /// 2. XDG config file (~/.config/codebrief/config.toml)
    /// 3. ./codebrief.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        xdg.log_paths();

        let mut config = if let Ok(config_path) = env::var("CODEBRIEF_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("codebrief.toml").exists() {
                Self::from_file("codebrief.toml")?
            } else {
                Self::default()
            }
        };

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        if let Some(size) = env_parse("CODEBRIEF_CHUNK_SIZE") {
            self.pipeline.chunk_size = size;
        }
        if let Some(overlap) = env_parse("CODEBRIEF_OVERLAP") {
            self.pipeline.overlap = overlap;
        }
        if let Some(size) = env_parse("CODEBRIEF_MAX_FILE_SIZE_MB") {
            self.pipeline.max_file_size_mb = size;
        }
        if let Ok(name) = env::var("CODEBRIEF_IGNORE_FILE") {
            if !name.is_empty() {
                self.pipeline.ignore_file_name = name;
            }
        }

        if let Some(workers) = env_parse("CODEBRIEF_WORKERS") {
            self.limits.workers = workers;
        }
        if let Some(timeout) = env_parse("CODEBRIEF_TIMEOUT_SEC") {
            self.limits.timeout_sec = timeout;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.chunk_size == 0 {
            return Err(BriefError::InvalidConfiguration(
                "Chunk size must be non-zero".to_string(),
            ));
        }

        if self.pipeline.overlap >= self.pipeline.chunk_size {
            return Err(BriefError::InvalidConfiguration(
                "Overlap must be less than chunk size".to_string(),
            ));
        }

        if self.pipeline.ignore_file_name.contains('/') {
            return Err(BriefError::InvalidConfiguration(
                "Ignore file name must not contain '/'".to_string(),
            ));
        }

        if self.capability.dimensions == 0 {
            return Err(BriefError::InvalidConfiguration(
                "Embedding dimensions must be non-zero".to_string(),
            ));
        }

        if self.limits.workers == 0 {
            return Err(BriefError::InvalidConfiguration(
                "Workers must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Chunk size: {} chars", self.pipeline.chunk_size);
        tracing::info!("  Overlap: {} chars", self.pipeline.overlap);
        tracing::info!("  Max file size: {} MB", self.pipeline.max_file_size_mb);
        tracing::info!(
            "  Extensions: {}",
            if self.pipeline.allowed_extensions.is_empty() {
                "all".to_string()
            } else {
                self.pipeline.allowed_extensions.join(",")
            }
        );
        tracing::info!("  Ignore file: {}", self.pipeline.ignore_file_name);
        tracing::info!("  Summarizer: {}", self.capability.summarizer);
        tracing::info!("  Embedder: {}", self.capability.embedder);
        if let Some(command) = &self.capability.command {
            tracing::info!("  Command: {}", command);
        }
        tracing::info!("  Workers: {}", self.limits.workers);
        tracing::info!("  Timeout: {}s", self.limits.timeout_sec);
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
