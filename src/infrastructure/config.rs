use crate::domain::{
    config::{DevtermConfig, EndpointConfig, GlobalConfig, SessionConfig},
    error::{DevtermError, DevtermResult},
};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration manager
///
/// Layers, lowest to highest: built-in defaults, the global file, the
/// nearest project file. Each layer only overrides the sections it
/// actually contains.
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> DevtermResult<Self> {
        let global_config_path = Self::get_global_config_path()?;
        let project_config_path = Self::find_project_config_path();

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    /// Create a manager over explicit paths
    pub fn with_paths(global_config_path: PathBuf, project_config_path: Option<PathBuf>) -> Self {
        Self {
            global_config_path,
            project_config_path,
        }
    }

    /// Load configuration from files
    pub fn load_config(&self) -> DevtermResult<DevtermConfig> {
        let mut config = DevtermConfig::default();

        if self.global_config_path.exists() {
            Self::merge_from_path(&mut config, &self.global_config_path)?;
        }

        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                Self::merge_from_path(&mut config, project_path)?;
            }
        }

        Ok(config)
    }

    /// Load configuration from a single file on top of the defaults
    pub fn load_config_from_path(path: &Path) -> DevtermResult<DevtermConfig> {
        let mut config = DevtermConfig::default();
        Self::merge_from_path(&mut config, path)?;
        Ok(config)
    }

    fn merge_from_path(config: &mut DevtermConfig, path: &Path) -> DevtermResult<()> {
        let content = fs::read_to_string(path).map_err(|e| DevtermError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let table: toml::Table = content.parse().map_err(|e| DevtermError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        if let Some(global) = Self::section::<GlobalConfig>(&table, "global", path)? {
            config.global = global;
        }
        if let Some(endpoint) = Self::section::<EndpointConfig>(&table, "endpoint", path)? {
            config.endpoint = endpoint;
        }
        if let Some(session) = Self::section::<SessionConfig>(&table, "session", path)? {
            config.session = session;
        }

        Ok(())
    }

    fn section<T: DeserializeOwned>(
        table: &toml::Table,
        name: &str,
        path: &Path,
    ) -> DevtermResult<Option<T>> {
        table
            .get(name)
            .cloned()
            .map(|value| {
                value.try_into::<T>().map_err(|e| DevtermError::Config {
                    message: format!("Invalid [{}] section in {}: {}", name, path.display(), e),
                })
            })
            .transpose()
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(path: &Path, config: &DevtermConfig) -> DevtermResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| DevtermError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DevtermError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        fs::write(path, content).map_err(|e| DevtermError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Write a default configuration file, never overwriting one
    pub fn init_config(path: &Path) -> DevtermResult<()> {
        if path.exists() {
            return Err(DevtermError::Config {
                message: format!("Configuration already exists: {}", path.display()),
            });
        }

        Self::save_config_to_path(path, &DevtermConfig::default())
    }

    /// Get global configuration path
    fn get_global_config_path() -> DevtermResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| DevtermError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join("devterm").join("config.toml"))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = path.join(".devterm").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Default location for a new project configuration under `dir`
    pub fn project_config_path_in(dir: &Path) -> PathBuf {
        dir.join(".devterm").join("config.toml")
    }

    /// Get the global config path
    pub fn get_global_config_path_ref(&self) -> &PathBuf {
        &self.global_config_path
    }
}
