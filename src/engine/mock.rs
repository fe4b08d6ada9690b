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
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use super::EngineError;

/// A single engine command, recorded in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Start {
        channel: usize,
        file: PathBuf,
        looped: bool,
    },
    Stop {
        channel: usize,
    },
    SetVolume {
        channel: usize,
        volume: f32,
    },
    SetPan {
        channel: usize,
        pan: f32,
    },
    StopAll,
}

/// A mock engine. Doesn't actually play anything; records every command it
/// receives and tracks per-channel playing state.
pub struct Engine {
    max_channels: usize,
    calls: Mutex<Vec<Call>>,
    playing: Mutex<Vec<bool>>,
}

impl Engine {
    /// Creates a mock engine with the given channel count.
    pub fn new(max_channels: usize) -> Engine {
        Engine {
            max_channels,
            calls: Mutex::new(Vec::new()),
            playing: Mutex::new(vec![false; max_channels]),
        }
    }

    /// Returns every call recorded so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Clears the recorded call log.
    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    /// Simulates one-shot playback running out on the given channel.
    pub fn finish(&self, channel: usize) {
        if let Some(playing) = self.playing.lock().get_mut(channel) {
            *playing = false;
        }
    }
}

impl super::Engine for Engine {
    fn max_channels(&self) -> usize {
        self.max_channels
    }

    fn start(&self, channel: usize, file: &Path, looped: bool) -> Result<(), EngineError> {
        let mut playing = self.playing.lock();
        let slot = playing
            .get_mut(channel)
            .ok_or(EngineError::BadChannel(channel))?;
        *slot = true;
        self.calls.lock().push(Call::Start {
            channel,
            file: file.to_path_buf(),
            looped,
        });
        debug!(channel, file = %file.display(), "Mock channel started");
        Ok(())
    }

    fn stop(&self, channel: usize) {
        let mut playing = self.playing.lock();
        match playing.get_mut(channel) {
            Some(slot) => *slot = false,
            None => return,
        }
        self.calls.lock().push(Call::Stop { channel });
    }

    fn is_playing(&self, channel: usize) -> bool {
        self.playing.lock().get(channel).copied().unwrap_or(false)
    }

    fn set_volume(&self, channel: usize, volume: f32) {
        self.calls.lock().push(Call::SetVolume { channel, volume });
    }

    fn set_pan(&self, channel: usize, pan: f32) {
        self.calls.lock().push(Call::SetPan { channel, pan });
    }

    fn stop_all(&self) {
        let mut playing = self.playing.lock();
        for slot in playing.iter_mut() {
            *slot = false;
        }
        self.calls.lock().push(Call::StopAll);
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use crate::engine::Engine as _;

    use super::*;

    #[test]
    fn test_mock_engine_tracks_playing_state() {
        let engine = Engine::new(2);
        assert!(!engine.is_playing(0));

        engine
            .start(0, Path::new("kick.wav"), false)
            .expect("start failed");
        assert!(engine.is_playing(0));
        assert!(!engine.is_playing(1));

        engine.stop(0);
        assert!(!engine.is_playing(0));
    }

    #[test]
    fn test_mock_engine_rejects_bad_channel() {
        let engine = Engine::new(1);
        assert!(engine.start(1, Path::new("kick.wav"), false).is_err());
    }

    #[test]
    fn test_mock_engine_records_calls() {
        let engine = Engine::new(2);
        engine
            .start(1, Path::new("loop.wav"), true)
            .expect("start failed");
        engine.set_volume(1, 0.5);
        engine.stop(1);

        assert_eq!(
            engine.calls(),
            vec![
                Call::Start {
                    channel: 1,
                    file: "loop.wav".into(),
                    looped: true,
                },
                Call::SetVolume {
                    channel: 1,
                    volume: 0.5,
                },
                Call::Stop { channel: 1 },
            ]
        );
    }

    #[test]
    fn test_mock_engine_finish() {
        let engine = Engine::new(1);
        engine
            .start(0, Path::new("one-shot.wav"), false)
            .expect("start failed");
        assert!(engine.is_playing(0));

        engine.finish(0);
        assert!(!engine.is_playing(0));
        // Natural end of playback is not a stop command.
        assert!(!engine.calls().contains(&Call::Stop { channel: 0 }));
    }
}
