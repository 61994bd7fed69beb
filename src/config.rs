//! User configuration (`config.toml`).
//!
//! ```toml
//! [grid]
//! rows = 100
//! cols = 26
//! ```

use directories::ProjectDirs;
use refsheet_core::GridConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    grid: GridConfig,
}

/// Load the grid configuration from `config_file`, or from the user config
/// dir when none is given. Problems are returned as warnings and the
/// defaults are used instead.
pub fn load_config(config_file: Option<&PathBuf>) -> (GridConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (GridConfig::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (GridConfig::default(), warnings);
    }

    match read_config(&path) {
        Ok(parsed) => {
            log::debug!("loaded config from {}", path.display());
            (parsed.grid, warnings)
        }
        Err(warning) => {
            warnings.push(warning);
            (GridConfig::default(), warnings)
        }
    }
}

fn read_config(path: &Path) -> Result<ConfigFile, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    toml::from_str::<ConfigFile>(&content)
        .map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "refsheet")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
