use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Operator defaults; command-line flags take precedence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub engine_url: Option<String>,
    pub credentials_dir: Option<PathBuf>,
    /// Retries for fetching a kubeconfig from the engine
    pub retries: Option<u32>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(path).with_context(|| format!("Failed to read config {:?}", path))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {:?}", parent))?;
        }
        let bytes = serde_json::to_vec_pretty(self).context("Failed to serialize config")?;
        fs::write(path, bytes).with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }

    /// Overlay values that are set in `other`
    pub fn merge(mut self, other: Config) -> Self {
        if other.engine_url.is_some() {
            self.engine_url = other.engine_url;
        }
        if other.credentials_dir.is_some() {
            self.credentials_dir = other.credentials_dir;
        }
        if other.retries.is_some() {
            self.retries = other.retries;
        }
        self
    }
}

pub fn default_config_path() -> PathBuf {
    let mut dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("kubeforge");
    dir.push("config.json");
    dir
}
