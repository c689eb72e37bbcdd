use anyhow::{Context, Result};
use dance_mimic::config::Settings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: Settings,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Colorize scores and markers
    #[serde(default = "default_true")]
    pub color: bool,

    /// Decimal places shown for distances
    #[serde(default = "default_precision")]
    pub precision: usize,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_precision() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: Settings::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: default_true(),
            precision: default_precision(),
        }
    }
}

impl Config {
    /// Get config directory path (~/.dance-mimic/)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".dance-mimic"))
    }

    /// Config file path, `~/.dance-mimic/config.toml` unless overridden
    pub fn config_file(path_override: Option<&str>) -> Result<PathBuf> {
        match path_override {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(Self::config_dir()?.join("config.toml")),
        }
    }

    /// Load configuration from file, then apply `DANCE_MIMIC_*` environment overrides
    pub fn load(path_override: Option<&str>) -> Result<Self> {
        let config_file = Self::config_file(path_override)?;

        let mut config = if config_file.exists() {
            Self::load_from(&config_file)?
        } else {
            tracing::debug!("Config file not found, using defaults");
            Self::default()
        };

        config.engine = config.engine.apply_env_overrides();
        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }
}
