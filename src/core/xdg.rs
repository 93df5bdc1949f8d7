//! XDG Base Directory support
//!
//! codebrief only reads configuration, so only the config directory is
//! resolved.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "codebrief";

/// Resolved configuration locations
#[derive(Debug, Clone)]
pub struct XdgDirs {
    pub config_dir: PathBuf,
}

impl XdgDirs {
    /// Resolve directories
    ///
    /// Priority order (highest to lowest):
    /// 1. `CODEBRIEF_CONFIG_DIR`
    /// 2. `XDG_CONFIG_HOME`
    /// 3. `~/.config`
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(dir) = env::var("CODEBRIEF_CONFIG_DIR") {
            return PathBuf::from(dir);
        }

        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return PathBuf::from(xdg).join(APP_DIR);
            }
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }

    /// Config file path (`CODEBRIEF_CONFIG_FILE` overrides)
    pub fn config_file(&self) -> PathBuf {
        if let Ok(file) = env::var("CODEBRIEF_CONFIG_FILE") {
            return PathBuf::from(file);
        }

        self.config_dir.join("config.toml")
    }

    pub fn log_paths(&self) {
        tracing::debug!("Config dir: {:?}", self.config_dir);
        tracing::debug!("Config file: {:?}", self.config_file());
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
