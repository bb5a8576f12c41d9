//! # Configuration
//!
//! Configuration is loaded by [`confique`] from, in priority order:
//! 1. **Environment variables**: `PUBS_DIR` overrides `pubsdir`.
//! 2. **Config file**: `pubs.toml` in the OS config directory, or the path
//!    given with `--config` / `PUBS_CONFIG`.
//! 3. **Compiled Defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `pubsdir` | `~/.pubs` | Repository root |
//! | `import_copy` | `true` | Copy attached documents into `pubsdir/doc/` |
//! | `import_move` | `false` | Delete the original after copying it in |
//! | `note_ext` | `.txt` | Extension of note files |

use crate::error::{PubsError, Result};
use confique::Config;
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "pubs.toml";

/// Configuration for pubs, stored in `pubs.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PubsConfig {
    /// Root directory of the repository. A leading `~` is expanded.
    #[config(default = "~/.pubs", env = "PUBS_DIR")]
    pub pubsdir: PathBuf,

    /// Copy attached documents into the repository instead of linking them.
    #[config(default = true)]
    pub import_copy: bool,

    /// Delete the original document after copying it into the repository.
    #[config(default = false)]
    pub import_move: bool,

    /// Extension for note files (e.g. ".txt", ".md")
    #[config(default = ".txt")]
    pub note_ext: String,
}

impl Default for PubsConfig {
    fn default() -> Self {
        Self {
            pubsdir: PathBuf::from("~/.pubs"),
            import_copy: true,
            import_move: false,
            note_ext: ".txt".to_string(),
        }
    }
}

impl PubsConfig {
    /// Load from `path` (a missing file means defaults) and the environment.
    pub fn load(path: &Path) -> Result<Self> {
        PubsConfig::builder()
            .env()
            .file(path)
            .load()
            .map_err(|e| PubsError::Config(e.to_string()))
    }

    /// Environment and defaults only, for when no config file location is known.
    pub fn from_env() -> Result<Self> {
        PubsConfig::builder()
            .env()
            .load()
            .map_err(|e| PubsError::Config(e.to_string()))
    }

    /// Write this configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = toml::to_string_pretty(self).map_err(|e| PubsError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Where the config file lives when no explicit path is given.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "pubs", "pubs").map(|d| d.config_dir().join(CONFIG_FILENAME))
    }

    /// `pubsdir` with a leading `~` expanded to the home directory.
    pub fn pubsdir(&self) -> PathBuf {
        expand_home(&self.pubsdir)
    }

    /// The note extension, normalized to start with a dot.
    pub fn note_ext(&self) -> String {
        if self.note_ext.starts_with('.') {
            self.note_ext.clone()
        } else {
            format!(".{}", self.note_ext)
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}
