use anyhow::Result;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Config;

pub fn default_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join("backupConfig.json")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let cfg: Config = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config JSON: {}", path.display()))?;
    Ok(cfg)
}
