use crate::asset::ASSET_PREFIX;
use crate::utils::get_config_dir;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{read_to_string, write};
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RwallConfig {
    /// Git repository the wallpapers are cloned from.
    pub repository: String,
    /// Where images live once moved.
    pub library_folder: PathBuf,
    /// Clone target, removed after the move.
    pub staging_folder: PathBuf,
    pub asset_prefix: String,
    pub theme: String,
}

fn pictures_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
}

impl Default for RwallConfig {
    fn default() -> Self {
        Self {
            repository: "https://github.com/Incalculas/wallpapers".to_string(),
            library_folder: pictures_dir().join("rwall"),
            staging_folder: pictures_dir().join("rwall_temp"),
            asset_prefix: ASSET_PREFIX.to_string(),
            theme: "Dark".to_string(),
        }
    }
}

impl RwallConfig {
    pub fn load_or_default() -> Result<Self> {
        let config_path = get_config_dir()?.join(CONFIG_FILE);

        if config_path.exists() {
            let content = read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            log::debug!("No config at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = get_config_dir()?.join(CONFIG_FILE);
        let content =
            serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        write(&config_path, content)?;
        log::info!("Saved config to {}", config_path.display());
        Ok(())
    }
}
