//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level gabarito configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GabaritoConfig {
    /// How many wrong answers cancel one right answer. Zero disables the
    /// penalty.
    #[serde(default = "default_penalty_divisor")]
    pub penalty_divisor: i32,
    /// Output directory for grade sheets.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Selection statuses to call out on the log while grading.
    #[serde(default = "default_announce")]
    pub announce: Vec<String>,
}

fn default_penalty_divisor() -> i32 {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./gabarito-results")
}
fn default_announce() -> Vec<String> {
    vec!["last-positive-accepted".to_string()]
}

impl Default for GabaritoConfig {
    fn default() -> Self {
        Self {
            penalty_divisor: default_penalty_divisor(),
            output_dir: default_output_dir(),
            announce: default_announce(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `gabarito.toml` in the current directory
/// 2. `~/.config/gabarito/config.toml`
pub fn load_config_from(path: Option<&Path>) -> Result<GabaritoConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gabarito.toml");
        if local.exists() {
            Some(local)
        } else if let Some(global) = global_config_path() {
            global.exists().then_some(global)
        } else {
            None
        }
    };

    match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))
        }
        None => Ok(GabaritoConfig::default()),
    }
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("gabarito")
            .join("config.toml")
    })
}
