use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::types::Config;

pub const CONFIG_FILE: &str = ".devctl.yaml";

/// Default config location inside a project root.
pub fn default_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Load config from `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("invalid config in {}", path.display()))?;
    Ok(config)
}
