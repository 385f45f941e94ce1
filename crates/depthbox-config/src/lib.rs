mod types;

pub use types::*;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Returns the config directory, e.g. `~/.config/depthbox/`.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("depthbox");
    Ok(dir)
}

/// Returns the config file path: `<config_dir>/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from disk, or return defaults if there is none.
///
/// The file is only ever read. Nothing (calibration included) is written back.
pub fn load_config() -> Result<AppConfig> {
    let path = config_path()?;
    if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        let config = parse_config(&contents)?;
        info!(?path, "Loaded config");
        Ok(config)
    } else {
        info!("No config found, using defaults");
        Ok(AppConfig::default())
    }
}

/// Parse and sanitize a TOML config document.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    Ok(config.sanitized())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.window, glam::Vec2::new(14.0, 9.0));
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(parse_config("window = \"wide\"").is_err());
    }
}
