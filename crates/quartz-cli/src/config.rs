//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use quartz::{QuartzError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for QuartzError {
    fn from(err: ConfigError) -> Self {
        QuartzError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (quartz/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - A configured palette is invalid
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, QuartzError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("quartz/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "quartz", "quartz") {
        let system_config = proj_dirs.config_dir().join("config.toml");
        if system_config.exists() {
            info!(
                path = system_config.display().to_string();
                "Loading configuration from system path"
            );
            return load_config_file(system_config);
        }
        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, QuartzError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

/// Palettes are parsed eagerly so a bad stop fails at load time.
fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.variants().indent() == 0 {
        return Err(ConfigError::Validation(
            "`variants.indent` must be at least 1".to_string(),
        ));
    }
    for name in config.recolor().palette_names() {
        config.recolor().palette(name).map_err(ConfigError::Validation)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let file = write_config(
            r##"
[index]
asset_root = "assets"
scan_mode = "naive"

[variants]
indent = 2

[recolor.palettes]
fire = ["#ff0000", "#ffaa00@0.5", "yellow"]
"##,
        );
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.index().asset_root(), "assets");
        assert_eq!(config.variants().indent_unit(), "  ");
        assert_eq!(config.variants().backup_folder(), "_backup");
        let fire = config.recolor().palette("fire").unwrap().unwrap();
        assert_eq!(fire.len(), 3);
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let err = load_config(Some("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, QuartzError::Config(_)));
    }

    #[test]
    fn test_invalid_palette_fails_validation() {
        let file = write_config("[recolor.palettes]\nbad = [\"not-a-color\"]\n");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }
}
