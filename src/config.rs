use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub store: StoreConfig,
  /// Custom title for the header (defaults to the store domain if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Base URL of the document store API
  pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
  /// Terminal width at or below which the narrow card layout applies
  #[serde(default = "default_narrow_width")]
  pub narrow_width: u16,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      narrow_width: default_narrow_width(),
    }
  }
}

fn default_narrow_width() -> u16 {
  100
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./folio.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/folio/config.yaml
  /// 4. ~/.config/folio/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/folio/config.yaml\n\
                 with at least a store url."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("folio.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("folio").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the document store API token from environment variables.
  ///
  /// Checks FOLIO_API_TOKEN first, then PORTFOLIO_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("FOLIO_API_TOKEN")
      .or_else(|_| std::env::var("PORTFOLIO_API_TOKEN"))
      .map_err(|_| {
        eyre!(
          "Store API token not found. Set FOLIO_API_TOKEN or PORTFOLIO_API_TOKEN environment variable."
        )
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_parses() {
    let config: Config = serde_yaml::from_str("store:\n  url: https://api.example.com\n").unwrap();
    assert_eq!(config.store.url, "https://api.example.com");
    assert_eq!(config.ui.narrow_width, 100);
    assert!(config.title.is_none());
  }

  #[test]
  fn test_narrow_width_override() {
    let yaml = "store:\n  url: https://api.example.com\nui:\n  narrow_width: 80\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.ui.narrow_width, 80);
  }
}
