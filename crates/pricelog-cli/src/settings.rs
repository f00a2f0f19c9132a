//! Layered configuration: optional TOML file, then `PRICELOG_*` environment
//! variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use pricelog_core::locate::HeaderLabels;
use serde::Deserialize;

/// Settings read from `pricelog.toml` and the environment.
#[derive(Debug, Deserialize, Default)]
pub struct Settings {
  /// Default SQLite database when `--db` is not given.
  #[serde(default)]
  pub store_path: Option<PathBuf>,
  /// Header labels to look for; defaults to the stock export's labels.
  #[serde(default)]
  pub labels:     HeaderLabels,
}

impl Settings {
  /// Load settings from `file` (if it exists) and the environment.
  ///
  /// Nested keys use a double underscore: `PRICELOG_LABELS__PRICE`.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(file.to_path_buf()).required(false))
      .add_source(
        config::Environment::with_prefix("PRICELOG")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  /// The store to use: `flag` if given, else `store_path`, `~` expanded.
  pub fn store_path(&self, flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let path = flag
      .or_else(|| self.store_path.clone())
      .context("no store path: pass --db or set store_path in the config file")?;
    Ok(expand_tilde(&path))
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  #[test]
  fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings.labels, HeaderLabels::default());
  }

  #[test]
  fn file_overrides_individual_labels() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("pricelog.toml");
    fs::write(&file, "store_path = \"/var/lib/pricelog.db\"\n\n[labels]\nid = \"SKU\"\n")
      .unwrap();

    let settings = Settings::load(&file).unwrap();
    assert_eq!(settings.store_path, Some(PathBuf::from("/var/lib/pricelog.db")));
    assert_eq!(settings.labels.id, "SKU");
    assert_eq!(settings.labels.price, HeaderLabels::default().price);
  }

  #[test]
  fn flag_wins_over_settings() {
    let settings = Settings { store_path: Some("/a.db".into()), ..Default::default() };
    assert_eq!(settings.store_path(Some("/b.db".into())).unwrap(), PathBuf::from("/b.db"));
    assert_eq!(settings.store_path(None).unwrap(), PathBuf::from("/a.db"));
  }

  #[test]
  fn store_path_is_required() {
    assert!(Settings::default().store_path(None).is_err());
  }

  #[test]
  fn plain_paths_are_not_expanded() {
    assert_eq!(expand_tilde(Path::new("data/prices.db")), PathBuf::from("data/prices.db"));
  }
}
