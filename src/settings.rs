// Copyright (C) 2026 The sboard authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Persistent user preferences, stored as JSON in the platform config
//! directory. These are conveniences that survive restarts; losing them is
//! never an error the user has to deal with.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Errors saving or loading the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no config directory on this platform")]
    NoConfigDir,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The terminal geometry at last shutdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub columns: u16,
    pub rows: u16,
}

/// User preferences remembered across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The directory of the most recent save/load dialog; new dialogs start
    /// here.
    pub last_state_dir: Option<PathBuf>,

    /// The terminal size at last shutdown.
    pub window: Option<WindowGeometry>,
}

impl Settings {
    /// Loads settings from the default location. A missing or unreadable
    /// file yields defaults; this never blocks startup.
    pub fn load() -> Settings {
        let path = match default_path() {
            Ok(path) => path,
            Err(e) => {
                warn!(err = %e, "Unable to locate settings");
                return Settings::default();
            }
        };
        Settings::load_from(&path)
    }

    fn load_from(path: &Path) -> Settings {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Settings::default(),
            Err(e) => {
                warn!(path = %path.display(), err = %e, "Unable to read settings");
                return Settings::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), err = %e, "Unable to parse settings");
                Settings::default()
            }
        }
    }

    /// Writes the settings to the default location, creating the config
    /// directory if needed.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&default_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The directory save/load dialogs should start in.
    pub fn last_state_dir(&self) -> &Path {
        self.last_state_dir
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
    }

    /// Remembers the directory of a state file the user just picked.
    pub fn remember_state_dir(&mut self, state_file: &Path) {
        if let Some(dir) = state_file.parent() {
            if !dir.as_os_str().is_empty() {
                self.last_state_dir = Some(dir.to_path_buf());
            }
        }
    }
}

fn default_path() -> Result<PathBuf, SettingsError> {
    let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
    Ok(dir.join("sboard").join("settings.json"))
}
