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

//! The controller drives a session from user events. Drivers produce events
//! (terminal input, scripted tests); prompters gather the free-form input a
//! dialog would, so the event loop itself stays free of any UI.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::sampler::{Key, SampleConfig, Session};
use crate::settings::Settings;
use crate::state::STATE_FILE_EXTENSION;
use crate::util::ensure_extension;

pub mod terminal;

/// Controller events that will trigger behavior in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Arms the session: subsequent key events trigger samples.
    Arm,

    /// Disarms the session, force-stopping all playback.
    Disarm,

    /// A key went down. Repeats are flagged so they can be dropped; holding
    /// a key must not re-trigger its samples.
    KeyDown { key: Key, repeat: bool },

    /// A key came up.
    KeyUp { key: Key, repeat: bool },

    /// Prompts for a new sample and appends it.
    AddSample,

    /// Prompts for replacement values for the selected sample.
    EditSample,

    /// Removes the selected sample.
    RemoveSample,

    /// Removes every sample, offering to save unsaved changes first.
    ClearState,

    /// Saves to the bound state file, prompting for a path if none is bound.
    SaveState,

    /// Prompts for a state file and loads it.
    RestoreState,

    /// Selects the sample at the given position.
    Select(usize),

    /// Moves the selection to the next sample.
    SelectNext,

    /// Moves the selection to the previous sample.
    SelectPrev,

    /// Sets the selected sample's volume (0-100).
    SetVolume(i32),

    /// Sets the selected sample's pan (-100 to 100).
    SetPan(i32),

    /// Prints the sample list.
    ListSamples,

    /// Exits the event loop.
    Quit,
}

/// A source of controller events. `next_event` blocks until an event is
/// available and returns `None` when the source is exhausted.
pub trait Driver {
    fn next_event(&mut self, armed: bool) -> io::Result<Option<Event>>;
}

/// Gathers the input a modal dialog would. Every method may be declined by
/// the user, which cancels the operation that asked.
pub trait Prompter {
    /// Asks for a sample's name, file, key and loop mode. `existing` holds
    /// the current values when editing.
    fn sample_config(&mut self, existing: Option<&SampleConfig>) -> Option<SampleConfig>;

    /// Asks a yes/no question.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Asks where to save a state file, starting in the given directory.
    fn save_path(&mut self, start_dir: &Path) -> Option<PathBuf>;

    /// Asks which state file to open, starting in the given directory.
    fn open_path(&mut self, start_dir: &Path) -> Option<PathBuf>;

    /// Reports a recoverable error to the user.
    fn error(&mut self, message: &str);
}

/// Drives a session until its driver runs out of events or the user quits.
pub struct Controller<D: Driver, P: Prompter> {
    session: Session,
    settings: Settings,
    driver: D,
    prompter: P,
}

impl<D: Driver, P: Prompter> Controller<D, P> {
    pub fn new(session: Session, settings: Settings, driver: D, prompter: P) -> Controller<D, P> {
        Controller {
            session,
            settings,
            driver,
            prompter,
        }
    }

    /// Runs the event loop. Returns when the driver is exhausted or the
    /// user quits; recoverable errors are reported and the loop continues.
    pub fn run(&mut self) -> io::Result<()> {
        info!(samples = self.session.len(), "Controller started");

        loop {
            let event = match self.driver.next_event(self.session.is_armed())? {
                Some(event) => event,
                None => break,
            };
            debug!(event = ?event, "Received event");

            match event {
                Event::Arm => self.session.arm(),
                Event::Disarm => self.session.disarm(),
                Event::KeyDown { key, repeat } => {
                    if !repeat {
                        self.session.key_pressed(key);
                    }
                }
                Event::KeyUp { key, repeat } => {
                    if !repeat {
                        self.session.key_released(key);
                    }
                }
                Event::AddSample => self.add_sample(),
                Event::EditSample => self.edit_sample(),
                Event::RemoveSample => {
                    if let Err(e) = self.session.remove_sample() {
                        self.prompter.error(&e.to_string());
                    }
                }
                Event::ClearState => self.clear_state(),
                Event::SaveState => self.save_state(),
                Event::RestoreState => self.restore_state(),
                Event::Select(index) => {
                    if let Err(e) = self.session.select(index) {
                        self.prompter.error(&e.to_string());
                    }
                }
                Event::SelectNext => self.session.select_next(),
                Event::SelectPrev => self.session.select_prev(),
                Event::SetVolume(volume) => {
                    if let Err(e) = self.session.set_volume(volume) {
                        self.prompter.error(&e.to_string());
                    }
                }
                Event::SetPan(pan) => {
                    if let Err(e) = self.session.set_pan(pan) {
                        self.prompter.error(&e.to_string());
                    }
                }
                Event::ListSamples => self.list_samples(),
                Event::Quit => break,
            }
        }

        self.session.disarm();
        info!("Controller closing");
        Ok(())
    }

    /// Prompts for and appends a new sample. Dispatch is suspended while the
    /// dialog is up; a running session resumes afterwards, whether or not
    /// the dialog was cancelled.
    fn add_sample(&mut self) {
        if self.session.len() >= crate::sampler::MAX_CHANNELS {
            self.prompter.error(&format!(
                "only {} channels are available",
                crate::sampler::MAX_CHANNELS
            ));
            return;
        }

        let was_armed = self.session.is_armed();
        self.session.disarm();

        if let Some(config) = self.prompter.sample_config(None) {
            if let Err(e) = self.session.add_sample(config) {
                self.prompter.error(&e.to_string());
            }
        }

        if was_armed {
            self.session.arm();
        }
    }

    fn edit_sample(&mut self) {
        let existing = match self.session.selected() {
            Some(sample) => sample.config(),
            None => {
                self.prompter.error("no sample is selected");
                return;
            }
        };

        let was_armed = self.session.is_armed();
        self.session.disarm();

        if let Some(config) = self.prompter.sample_config(Some(&existing)) {
            if let Err(e) = self.session.edit_sample(config) {
                self.prompter.error(&e.to_string());
            }
        }

        if was_armed {
            self.session.arm();
        }
    }

    /// Clears the session, first offering to save unsaved changes.
    fn clear_state(&mut self) {
        if self.session.is_dirty()
            && self
                .prompter
                .confirm("Save the current state before clearing?")
        {
            self.save_state();
        }
        self.session.clear();
    }

    /// Quick-saves to the bound state file; prompts for a path when no file
    /// is bound yet and remembers its directory for the next dialog.
    fn save_state(&mut self) {
        let path = match self.session.state_file() {
            Some(path) => path.to_path_buf(),
            None => {
                let path = match self.prompter.save_path(self.settings.last_state_dir()) {
                    Some(path) => ensure_extension(path, STATE_FILE_EXTENSION),
                    None => return,
                };
                self.settings.remember_state_dir(&path);
                path
            }
        };

        if let Err(e) = self.session.save_to(&path) {
            error!(path = %path.display(), err = %e, "Unable to save state");
            self.prompter.error(&format!("unable to save state: {}", e));
        }
    }

    /// Prompts for a state file and loads it. Loading never binds the save
    /// path; the next save still asks where to write.
    fn restore_state(&mut self) {
        let path = match self.prompter.open_path(self.settings.last_state_dir()) {
            Some(path) => path,
            None => return,
        };
        self.settings.remember_state_dir(&path);

        if let Err(e) = self.session.load_from(&path) {
            error!(path = %path.display(), err = %e, "Unable to load state");
            self.prompter.error(&format!("unable to load state: {}", e));
        }
    }

    fn list_samples(&self) {
        if self.session.is_empty() {
            println!("No samples configured.");
            return;
        }
        for (index, sample) in self.session.samples().iter().enumerate() {
            let marker = if self.session.selected_index() == Some(index) {
                '*'
            } else {
                ' '
            };
            println!("{} {:2}: {}", marker, index, sample);
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Consumes the controller, handing back the settings for persistence.
    pub fn into_settings(self) -> Settings {
        self.settings
    }
}
