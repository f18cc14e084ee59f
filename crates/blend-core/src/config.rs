//! Vessel configuration.
//!
//! Provides [`BlendConfig`] with defaults for vessel capacity and the recipe
//! book. The configuration is stored as pretty-printed JSON; a missing file
//! is created with defaults, and an unreadable one falls back to defaults
//! with a warning so a bad edit never prevents the vessel from working.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CAPACITY};
use crate::error::ConfigError;
use crate::recipe::RecipeBook;

/// Configuration shared by every vessel built from it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BlendConfig {
    /// Number of slots in a vessel. Must be at least 1.
    pub capacity: usize,
    /// Reagent to recipe mapping.
    pub recipes: RecipeBook,
    /// Log level filter string (e.g. "info", "debug", "blend_engine=trace").
    pub log_level: String,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            recipes: RecipeBook::standard(),
            log_level: "info".to_string(),
        }
    }
}

impl BlendConfig {
    /// Platform config location, e.g. `~/.config/potion_blender/potion_blender_config.json`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Reject configurations no vessel can be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Strictly load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Write the config, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Io(format!("{}: {e}", parent.display())))?;
        }
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))
    }

    /// Load the config at `path`, writing defaults there first if it does not
    /// exist. Any read or parse failure falls back to defaults.
    pub fn load_or_init(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "no config file found, creating one");
            let config = Self::default();
            if let Err(e) = config.save(path) {
                warn!(error = %e, "could not write default config");
            }
            return config;
        }

        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), capacity = config.capacity, "loaded config");
                config
            }
            Err(e) => {
                warn!(error = %e, "unable to read config, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::ReagentKind;

    #[test]
    fn default_capacity() {
        let cfg = BlendConfig::default();
        assert_eq!(cfg.capacity, DEFAULT_CAPACITY);
        assert_eq!(cfg.recipes, RecipeBook::standard());
    }

    #[test]
    fn default_log_level_is_info() {
        assert_eq!(BlendConfig::default().log_level, "info");
    }

    #[test]
    fn default_path_ends_with_file_name() {
        let path = BlendConfig::default_path();
        assert!(path.ends_with(Path::new(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn zero_capacity_rejected() {
        let cfg = BlendConfig {
            capacity: 0,
            ..BlendConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            BlendConfig::from_json(r#"{"capacity":0}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = BlendConfig::from_json(r#"{"capacity":3}"#).unwrap();
        assert_eq!(cfg.capacity, 3);
        assert_eq!(cfg.recipes, RecipeBook::standard());
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn recipes_can_be_overridden() {
        let cfg = BlendConfig::from_json(
            r#"{"recipes":{"plain":{"artifact":"combined_splash_potion"}}}"#,
        )
        .unwrap();
        assert_eq!(cfg.recipes.len(), 1);
        assert!(cfg.recipes.contains(ReagentKind::Plain));
        assert!(!cfg.recipes.contains(ReagentKind::Dilution));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            BlendConfig::from_json("{ capacity: "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let cfg = BlendConfig {
            capacity: 5,
            ..BlendConfig::default()
        };
        cfg.save(&path).unwrap();
        assert_eq!(BlendConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn load_or_init_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let cfg = BlendConfig::load_or_init(&path);
        assert_eq!(cfg, BlendConfig::default());
        assert!(path.exists());
        assert_eq!(BlendConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn load_or_init_falls_back_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "not json").unwrap();
        assert_eq!(BlendConfig::load_or_init(&path), BlendConfig::default());
    }

    #[test]
    fn load_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(BlendConfig::load(&path), Err(ConfigError::Io(_))));
    }
}
