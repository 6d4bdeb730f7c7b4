use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};

use crate::config::types::AppConfig;
use crate::util::is_valid_date_format;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LISTING_BOARD_CONFIG";

/// Discover and load the app config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `$LISTING_BOARD_CONFIG` environment variable
/// 3. `$XDG_CONFIG_HOME/listing-board/config.toml`
/// 4. `~/.config/listing-board/config.toml`
///
/// With none of these present the built-in defaults are used.
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit_path {
        return read_config(path);
    }

    match find_config() {
        Some(path) => read_config(&path),
        None => {
            tracing::debug!("config: no file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Parse a config file, failing on unreadable files, invalid TOML, or a
/// `date_format` chrono cannot render.
pub fn read_config(path: &Path) -> Result<AppConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML from {}", path.display()))?;
    ensure!(
        is_valid_date_format(&config.defaults.date_format),
        "{}: invalid date_format {:?}",
        path.display(),
        config.defaults.date_format
    );
    tracing::debug!("config: loaded {}", path.display());
    Ok(config)
}

fn find_config() -> Option<PathBuf> {
    // $LISTING_BOARD_CONFIG
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    // $XDG_CONFIG_HOME/listing-board/config.toml
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("listing-board/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // ~/.config/listing-board/config.toml
    if let Some(home) = home_dir() {
        let p = home.join(".config/listing-board/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
