use margin_engine::outline::Numbering;
use margin_engine::suggest::{SuggestionEngine, SuggestionEntry, TriggerTable, default_entries};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub outline: OutlineConfig,
    pub suggestions: SuggestionsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    pub show_numbers: bool,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self { show_numbers: true }
    }
}

impl OutlineConfig {
    pub fn numbering(&self) -> Numbering {
        Numbering::from(self.show_numbers)
    }
}

/// Key that accepts a pending suggestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptKey {
    #[default]
    Tab,
    Enter,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    pub accept_key: AcceptKey,
    /// Rows between the cursor and the description popup
    pub popup_offset_y: i32,
    /// Replaces the built-in triggers when present
    pub triggers: Vec<SuggestionEntry>,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            accept_key: AcceptKey::default(),
            popup_offset_y: margin_engine::suggest::DEFAULT_POPUP_OFFSET_Y,
            triggers: default_entries(),
        }
    }
}

impl SuggestionsConfig {
    pub fn trigger_table(&self) -> TriggerTable {
        TriggerTable::from_entries(self.triggers.iter().cloned())
    }

    pub fn engine(&self) -> SuggestionEngine {
        SuggestionEngine::new(self.trigger_table()).with_popup_offset(self.popup_offset_y)
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/margin");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expand `~` and environment variables; `None` if a variable is unset
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
