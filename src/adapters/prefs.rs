//! TOML-file preference store

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::domain::errors::{EditError, EditResult};
use crate::ports::{Preferences, PrefsStore};

/// [`PrefsStore`] persisting preferences to a single TOML file.
///
/// A missing file yields defaults; a corrupt file is an error rather than a
/// silent reset.
pub struct TomlPrefsStore {
    path: PathBuf,
}

impl TomlPrefsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PrefsStore for TomlPrefsStore {
    fn load(&self) -> EditResult<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let text = fs::read_to_string(&self.path)?;
        toml::from_str(&text).map_err(|e| EditError::Prefs {
            message: format!("invalid preference file {}: {}", self.path.display(), e),
        })
    }

    fn save(&self, prefs: &Preferences) -> EditResult<()> {
        let text = toml::to_string_pretty(prefs).map_err(|e| EditError::Prefs {
            message: format!("unserializable preferences: {}", e),
        })?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), "saved preferences");
        Ok(())
    }
}
