//! Configuration for the `with` launcher

use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Result, WithError};
use crate::invoker::ArgMode;

/// Overrides the configured shell interpreter
pub const SHELL_VAR: &str = "WITH_SHELL";

/// Launcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Interpreter that runs the intermediary launcher
    #[serde(default = "default_shell")]
    pub shell: PathBuf,

    /// Extra context directories, searched after ~/.with and before built-ins
    #[serde(default)]
    pub extra_paths: Vec<PathBuf>,

    /// How forwarded arguments reach the context
    #[serde(default)]
    pub arg_mode: ArgMode,

    /// Suppress depth status lines
    #[serde(default)]
    pub quiet: bool,
}

fn default_shell() -> PathBuf {
    PathBuf::from("/bin/bash")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            extra_paths: Vec::new(),
            arg_mode: ArgMode::default(),
            quiet: false,
        }
    }
}

impl Config {
    /// Load config from file, defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| WithError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| WithError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_shell_override(env::var_os(SHELL_VAR))
    }

    fn with_shell_override(mut self, shell: Option<OsString>) -> Self {
        if let Some(shell) = shell.filter(|s| !s.is_empty()) {
            self.shell = PathBuf::from(shell);
        }
        self
    }
}
