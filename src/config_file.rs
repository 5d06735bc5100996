//! Configuration file handling for engagor

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::help::SCRIPT_NAME_WIDTH;

/// Scripts root used when nothing else is configured
pub const DEFAULT_ROOT: &str = "scripts";

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("Unknown working directory: {0}")]
    UnknownWorkingDirectory(String),
    #[error("Unable to parse YAML config file {path}: {source}")]
    Yaml {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("Unable to parse JSON config file {path}: {source}")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("Invalid config: {0}")]
    Validation(String),
}

/// Contents of an `.engagor.*` file
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Scripts root, relative to the config file's directory
    pub root: Option<PathBuf>,
    /// Column width of script names in group listings
    pub name_width: Option<usize>,
}

/// List of supported configuration file names
const FILENAMES: [&str; 3] = [".engagor.yaml", ".engagor.yml", ".engagor.json"];

impl Config {
    /// Loads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file cannot be read, or
    /// `ConfigError::Yaml`/`ConfigError::Json` if parsing fails.
    pub fn from_file(file: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(file)
            .map_err(|_| ConfigError::ConfigNotFound(file.to_path_buf()))?;
        if file.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&contents).map_err(|e| ConfigError::Json {
                source: e,
                path: file.to_path_buf(),
            })
        } else if contents.trim().is_empty() {
            Ok(Config::default())
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Yaml {
                source: e,
                path: file.to_path_buf(),
            })
        }
    }

    /// Searches for a configuration file in `start` and its parents.
    #[must_use]
    pub fn find_config_from(start: &Path) -> Option<PathBuf> {
        let mut path = start.to_path_buf();
        debug!("Searching for config file in {}", start.display());
        loop {
            for file in &FILENAMES {
                let config_path = path.join(file);
                if config_path.is_file() {
                    info!("Found config file: {}", config_path.display());
                    return Some(config_path);
                }
            }
            if !path.pop() {
                return None;
            }
        }
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root: PathBuf,
    pub name_width: usize,
    pub config_path: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from an optional config file found relative to `cwd`.
    ///
    /// An explicit `config_file` must exist. Without one, the nearest
    /// `.engagor.*` file in `cwd` or its parents is used, falling back to
    /// defaults when there is none. `root_override` replaces the configured
    /// root and is resolved against `cwd`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file is missing, cannot be parsed,
    /// or contains invalid values.
    pub fn resolve(
        cwd: &Path,
        config_file: Option<&Path>,
        root_override: Option<&Path>,
    ) -> Result<Settings, ConfigError> {
        let config_path = match config_file {
            Some(file) => {
                let file = cwd.join(file);
                if !file.is_file() {
                    return Err(ConfigError::ConfigNotFound(file));
                }
                Some(file)
            }
            None => Config::find_config_from(cwd),
        };

        let (config, base) = match &config_path {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                let base = path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
                (Config::from_file(path)?, base)
            }
            None => (Config::default(), cwd.to_path_buf()),
        };

        let name_width = config.name_width.unwrap_or(SCRIPT_NAME_WIDTH);
        if name_width == 0 {
            return Err(ConfigError::Validation(
                "name_width must be greater than zero".to_string(),
            ));
        }

        let root = match root_override {
            Some(root) => cwd.join(root),
            None => base.join(config.root.unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT))),
        };

        Ok(Settings {
            root,
            name_width,
            config_path,
        })
    }

    /// Like [`Settings::resolve`], relative to the process working directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownWorkingDirectory` if the working directory
    /// cannot be determined, or any error from [`Settings::resolve`].
    pub fn load(
        config_file: Option<&Path>,
        root_override: Option<&Path>,
    ) -> Result<Settings, ConfigError> {
        let cwd = std::env::current_dir()
            .map_err(|e| ConfigError::UnknownWorkingDirectory(e.to_string()))?;
        Settings::resolve(&cwd, config_file, root_override)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".engagor.json");
        std::fs::write(&path, r#"{"root": "tools", "name_width": 12}"#).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.root, Some(PathBuf::from("tools")));
        assert_eq!(config.name_width, Some(12));
    }

    #[test]
    fn test_from_file_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".engagor.yaml");
        std::fs::write(&path, "root: tools\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.root, Some(PathBuf::from("tools")));
        assert_eq!(config.name_width, None);
    }

    #[test]
    fn test_from_file_empty_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".engagor.yml");
        std::fs::write(&path, "").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert!(config.root.is_none());
    }

    #[test]
    fn test_from_file_unknown_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".engagor.yaml");
        std::fs::write(&path, "rot: tools\n").unwrap();
        match Config::from_file(&path) {
            Err(ConfigError::Yaml { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected ConfigError::Yaml, got: {other:?}"),
        }
    }

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".engagor.yaml"), "root: tools\n").unwrap();
        assert_eq!(
            Config::find_config_from(&nested),
            Some(dir.path().join(".engagor.yaml"))
        );
    }

    #[test]
    fn test_resolve_defaults_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::resolve(dir.path(), None, None).unwrap();
        assert_eq!(settings.root, dir.path().join(DEFAULT_ROOT));
        assert_eq!(settings.name_width, SCRIPT_NAME_WIDTH);
        assert_eq!(settings.config_path, None);
    }

    #[test]
    fn test_resolve_root_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join(".engagor.yaml"), "root: tools\nname_width: 8\n").unwrap();

        let settings = Settings::resolve(&nested, None, None).unwrap();
        assert_eq!(settings.root, dir.path().join("tools"));
        assert_eq!(settings.name_width, 8);
    }

    #[test]
    fn test_resolve_root_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".engagor.yaml"), "root: tools\n").unwrap();
        let settings = Settings::resolve(dir.path(), None, Some(Path::new("other"))).unwrap();
        assert_eq!(settings.root, dir.path().join("other"));
    }

    #[test]
    fn test_resolve_missing_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::resolve(dir.path(), Some(Path::new("missing.yaml")), None);
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_resolve_zero_width_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".engagor.yaml"), "name_width: 0\n").unwrap();
        match Settings::resolve(dir.path(), None, None) {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("name_width"), "got: {msg}"),
            other => panic!("Expected Validation error, got: {other:?}"),
        }
    }
}
