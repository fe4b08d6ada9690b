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

//! The sampler session: the ordered sample list, the Armed/Idle dispatch
//! state machine, and save/load of the whole list.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::engine::Engine;
use crate::state::{self, StateError};

use super::sample::{Sample, SampleConfig};
use super::{Key, LoopMode};

/// Errors from session operations. All recoverable: the caller reports them
/// to the user and the session is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("only {0} channels are available")]
    ChannelLimit(usize),

    #[error("no sample is selected")]
    NoSelection,

    #[error("no sample at position {0}")]
    BadIndex(usize),
}

/// A sampler session. Owns the ordered list of configured samples and the
/// dispatch state; all operations run on the caller's thread.
///
/// While Armed, key events trigger samples; while Idle they are left to the
/// surrounding UI. Callers are expected to filter key-repeat events before
/// dispatching.
pub struct Session {
    engine: Arc<dyn Engine>,
    samples: Vec<Sample>,
    armed: bool,
    selected: Option<usize>,
    state_file: Option<PathBuf>,
    dirty: bool,
}

impl Session {
    /// Creates an empty, idle session on the given engine.
    pub fn new(engine: Arc<dyn Engine>) -> Session {
        Session {
            engine,
            samples: Vec::new(),
            armed: false,
            selected: None,
            state_file: None,
            dirty: false,
        }
    }

    /// Arms the session: key events now trigger samples.
    pub fn arm(&mut self) {
        if !self.armed {
            self.armed = true;
            info!("Session armed");
        }
    }

    /// Disarms the session and force-stops every sample.
    pub fn disarm(&mut self) {
        if self.armed {
            self.armed = false;
            for sample in &self.samples {
                sample.stop();
            }
            info!("Session disarmed");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Dispatches a key press. Every sample bound to the key responds:
    /// one-shot samples start (re-triggering restarts), auto-loop samples
    /// toggle. Matching is by logical key only; samples may share a key.
    pub fn key_pressed(&self, key: Key) {
        if !self.armed {
            return;
        }
        for sample in self.samples.iter().filter(|s| s.key() == key) {
            match sample.loop_mode() {
                LoopMode::OneShot => start_logged(sample),
                LoopMode::AutoLoop => {
                    if sample.is_playing() {
                        sample.stop();
                    } else {
                        start_logged(sample);
                    }
                }
            }
        }
    }

    /// Dispatches a key release. One-shot samples bound to the key stop;
    /// auto-loop samples ignore releases entirely.
    pub fn key_released(&self, key: Key) {
        if !self.armed {
            return;
        }
        for sample in self
            .samples
            .iter()
            .filter(|s| s.key() == key && s.loop_mode() == LoopMode::OneShot)
        {
            sample.stop();
        }
    }

    /// Appends a new sample built from dialog input and selects it. The
    /// sample's channel index is the current list length; indices are never
    /// reused after a removal.
    pub fn add_sample(&mut self, config: SampleConfig) -> Result<usize, SessionError> {
        let limit = self.engine.max_channels();
        if self.samples.len() >= limit {
            return Err(SessionError::ChannelLimit(limit));
        }

        let channel = self.samples.len();
        debug!(name = config.name, channel, "Sample added");
        self.samples
            .push(Sample::new(config, self.engine.clone(), channel));
        let index = self.samples.len() - 1;
        self.selected = Some(index);
        self.dirty = true;
        Ok(index)
    }

    /// Overwrites the selected sample's name, file, key and loop mode.
    pub fn edit_sample(&mut self, config: SampleConfig) -> Result<(), SessionError> {
        let index = self.selected.ok_or(SessionError::NoSelection)?;
        self.samples[index].apply_config(config);
        self.dirty = true;
        Ok(())
    }

    /// Removes the selected sample, stopping its playback. The remaining
    /// samples keep their channel indices.
    pub fn remove_sample(&mut self) -> Result<(), SessionError> {
        let index = self.selected.ok_or(SessionError::NoSelection)?;
        let sample = self.samples.remove(index);
        sample.stop();
        debug!(name = sample.name(), "Sample removed");

        self.selected = if self.samples.is_empty() {
            None
        } else {
            Some(index.min(self.samples.len() - 1))
        };
        self.dirty = true;
        Ok(())
    }

    /// Stops and removes every sample. The bound state file, if any, stays
    /// bound; deciding whether to save first is the caller's concern.
    pub fn clear(&mut self) {
        self.engine.stop_all();
        self.samples.clear();
        self.selected = None;
        self.dirty = false;
        info!("Session cleared");
    }

    /// Selects the sample at the given position.
    pub fn select(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.samples.len() {
            return Err(SessionError::BadIndex(index));
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Moves the selection to the next sample, saturating at the end.
    pub fn select_next(&mut self) {
        if let Some(index) = self.selected {
            self.selected = Some((index + 1).min(self.samples.len().saturating_sub(1)));
        } else if !self.samples.is_empty() {
            self.selected = Some(0);
        }
    }

    /// Moves the selection to the previous sample, saturating at the start.
    pub fn select_prev(&mut self) {
        if let Some(index) = self.selected {
            self.selected = Some(index.saturating_sub(1));
        } else if !self.samples.is_empty() {
            self.selected = Some(0);
        }
    }

    /// Sets the selected sample's volume.
    pub fn set_volume(&mut self, volume: i32) -> Result<(), SessionError> {
        let index = self.selected.ok_or(SessionError::NoSelection)?;
        self.samples[index].set_volume(volume);
        self.dirty = true;
        Ok(())
    }

    /// Sets the selected sample's pan.
    pub fn set_pan(&mut self, pan: i32) -> Result<(), SessionError> {
        let index = self.selected.ok_or(SessionError::NoSelection)?;
        self.samples[index].set_pan(pan);
        self.dirty = true;
        Ok(())
    }

    /// Writes the sample list to the given path. On success the path becomes
    /// the session's bound state file for subsequent quick saves.
    pub fn save_to(&mut self, path: &Path) -> Result<(), StateError> {
        let records: Vec<_> = self.samples.iter().map(Sample::to_record).collect();
        state::write_state(path, &records)?;
        self.state_file = Some(path.to_path_buf());
        self.dirty = false;
        info!(path = %path.display(), samples = records.len(), "State saved");
        Ok(())
    }

    /// Replaces the sample list with the contents of the given state file.
    /// The document is parsed in full before anything changes, so a failed
    /// load leaves the session untouched. Channel indices are assigned by
    /// parse order. The bound state file is deliberately not changed: the
    /// next save of a freshly loaded session still asks where to save.
    pub fn load_from(&mut self, path: &Path) -> Result<usize, StateError> {
        let records = state::read_state(path)?;
        if records.len() > self.engine.max_channels() {
            return Err(StateError::TooManySamples(records.len()));
        }

        for sample in &self.samples {
            sample.stop();
        }
        self.samples = records
            .into_iter()
            .enumerate()
            .map(|(channel, record)| Sample::from_record(record, self.engine.clone(), channel))
            .collect();
        self.selected = if self.samples.is_empty() { None } else { Some(0) };
        self.dirty = false;

        info!(path = %path.display(), samples = self.samples.len(), "State loaded");
        Ok(self.samples.len())
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True if the sample list has changed since the last save or load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The state file bound by the most recent successful save, if any.
    pub fn state_file(&self) -> Option<&Path> {
        self.state_file.as_deref()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Sample> {
        self.selected.map(|index| &self.samples[index])
    }
}

fn start_logged(sample: &Sample) {
    if let Err(e) = sample.start() {
        error!(
            name = sample.name(),
            file = %sample.file().display(),
            err = %e,
            "Unable to start sample"
        );
    }
}
