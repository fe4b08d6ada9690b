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
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::engine::{Engine, EngineError};
use crate::state::SampleRecord;

use super::Key;

/// The default volume of a newly configured sample.
pub const DEFAULT_VOLUME: i32 = 100;
/// Volume range, in percent of full scale.
pub const VOLUME_RANGE: std::ops::RangeInclusive<i32> = 0..=100;
/// Pan range; -100 is hard left, 0 is center, 100 is hard right.
pub const PAN_RANGE: std::ops::RangeInclusive<i32> = -100..=100;

/// How a sample behaves across a press/release pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Plays while the key is held: press starts (re-triggering restarts),
    /// release stops.
    OneShot,
    /// Loops until toggled off: press toggles between playing and stopped,
    /// release is ignored.
    AutoLoop,
}

impl LoopMode {
    /// The persisted integer code: 0 for one-shot. Any non-zero code reads
    /// back as auto-loop.
    pub fn code(&self) -> i64 {
        match self {
            LoopMode::OneShot => 0,
            LoopMode::AutoLoop => 1,
        }
    }

    /// Reconstructs a loop mode from a persisted integer code.
    pub fn from_code(code: i64) -> LoopMode {
        if code == 0 {
            LoopMode::OneShot
        } else {
            LoopMode::AutoLoop
        }
    }

    /// True if the engine should loop the source indefinitely.
    pub fn is_looped(&self) -> bool {
        *self == LoopMode::AutoLoop
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopMode::OneShot => write!(f, "one-shot"),
            LoopMode::AutoLoop => write!(f, "auto-loop"),
        }
    }
}

/// Error parsing a loop mode name.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized loop mode {0:?} (expected \"one-shot\" or \"auto-loop\")")]
pub struct LoopModeParseError(String);

impl FromStr for LoopMode {
    type Err = LoopModeParseError;

    fn from_str(s: &str) -> Result<LoopMode, LoopModeParseError> {
        match s.trim().to_lowercase().as_str() {
            "one-shot" | "oneshot" | "one" | "o" => Ok(LoopMode::OneShot),
            "auto-loop" | "autoloop" | "auto" | "loop" | "l" => Ok(LoopMode::AutoLoop),
            other => Err(LoopModeParseError(other.to_string())),
        }
    }
}

/// The dialog-collected configuration of a sample. Volume and pan are edited
/// live on the sample itself and are not part of the dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    /// The display name.
    pub name: String,
    /// The backing audio file.
    pub file: PathBuf,
    /// The trigger key.
    pub key: Key,
    /// The loop mode.
    pub loop_mode: LoopMode,
}

/// One configured sound: a named audio file bound to a trigger key, with
/// playback parameters and a fixed playback channel in the engine.
pub struct Sample {
    name: String,
    file: PathBuf,
    key: Key,
    loop_mode: LoopMode,
    volume: i32,
    pan: i32,
    channel: usize,
    engine: Arc<dyn Engine>,
}

impl Sample {
    /// Creates a sample from dialog input, with default volume and pan.
    pub fn new(config: SampleConfig, engine: Arc<dyn Engine>, channel: usize) -> Sample {
        Sample {
            name: config.name,
            file: config.file,
            key: config.key,
            loop_mode: config.loop_mode,
            volume: DEFAULT_VOLUME,
            pan: 0,
            channel,
            engine,
        }
    }

    /// Reconstructs a sample from a persisted record. Out-of-range volume
    /// and pan values are clamped.
    pub fn from_record(record: SampleRecord, engine: Arc<dyn Engine>, channel: usize) -> Sample {
        let mut sample = Sample {
            name: record.name,
            file: record.file,
            key: record.key,
            loop_mode: record.loop_mode,
            volume: DEFAULT_VOLUME,
            pan: 0,
            channel,
            engine,
        };
        sample.volume = clamp(record.volume, VOLUME_RANGE);
        sample.pan = clamp(record.pan, PAN_RANGE);
        sample
    }

    /// The persisted record for this sample.
    pub fn to_record(&self) -> SampleRecord {
        SampleRecord {
            name: self.name.clone(),
            file: self.file.clone(),
            key: self.key,
            loop_mode: self.loop_mode,
            volume: self.volume,
            pan: self.pan,
        }
    }

    /// The dialog-editable subset of this sample, used to pre-fill the
    /// configuration dialog when editing.
    pub fn config(&self) -> SampleConfig {
        SampleConfig {
            name: self.name.clone(),
            file: self.file.clone(),
            key: self.key,
            loop_mode: self.loop_mode,
        }
    }

    /// Overwrites name, file, key and loop mode in place. Volume and pan are
    /// deliberately untouched.
    pub fn apply_config(&mut self, config: SampleConfig) {
        self.name = config.name;
        self.file = config.file;
        self.key = config.key;
        self.loop_mode = config.loop_mode;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self) -> &std::path::Path {
        &self.file
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn volume(&self) -> i32 {
        self.volume
    }

    pub fn pan(&self) -> i32 {
        self.pan
    }

    /// The fixed engine channel this sample plays on. Positional at creation
    /// time and never renumbered.
    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Starts playback, applying the current volume and pan to the fresh
    /// engine handle.
    pub fn start(&self) -> Result<(), EngineError> {
        self.engine
            .start(self.channel, &self.file, self.loop_mode.is_looped())?;
        self.engine.set_volume(self.channel, volume_scale(self.volume));
        self.engine.set_pan(self.channel, pan_scale(self.pan));
        Ok(())
    }

    /// Stops playback, releasing the engine handle.
    pub fn stop(&self) {
        self.engine.stop(self.channel);
    }

    /// True if this sample's channel is currently playing.
    pub fn is_playing(&self) -> bool {
        self.engine.is_playing(self.channel)
    }

    /// Sets the volume, clamped to range, and pushes it to the engine.
    pub fn set_volume(&mut self, volume: i32) {
        self.volume = clamp(volume, VOLUME_RANGE);
        self.engine.set_volume(self.channel, volume_scale(self.volume));
    }

    /// Sets the pan, clamped to range, and pushes it to the engine.
    pub fn set_pan(&mut self, pan: i32) {
        self.pan = clamp(pan, PAN_RANGE);
        self.engine.set_pan(self.channel, pan_scale(self.pan));
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] key={} {} vol={} pan={}",
            self.name,
            crate::util::filename_display(&self.file),
            self.key,
            self.loop_mode,
            self.volume,
            self.pan,
        )
    }
}

fn clamp(value: i32, range: std::ops::RangeInclusive<i32>) -> i32 {
    value.clamp(*range.start(), *range.end())
}

fn volume_scale(volume: i32) -> f32 {
    volume as f32 / 100.0
}

fn pan_scale(pan: i32) -> f32 {
    pan as f32 / 100.0
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::engine::mock;
    use crate::engine::mock::Call;

    use super::*;

    fn make_sample(loop_mode: LoopMode) -> (Sample, Arc<mock::Engine>) {
        let engine = Arc::new(mock::Engine::new(4));
        let sample = Sample::new(
            SampleConfig {
                name: "kick".to_string(),
                file: "kick.wav".into(),
                key: Key::from_char('a'),
                loop_mode,
            },
            engine.clone(),
            0,
        );
        (sample, engine)
    }

    #[test]
    fn test_start_applies_volume_and_pan() {
        let (mut sample, engine) = make_sample(LoopMode::OneShot);
        sample.set_volume(50);
        sample.set_pan(-100);
        engine.reset_calls();

        sample.start().expect("start failed");
        assert_eq!(
            engine.calls(),
            vec![
                Call::Start {
                    channel: 0,
                    file: "kick.wav".into(),
                    looped: false,
                },
                Call::SetVolume {
                    channel: 0,
                    volume: 0.5,
                },
                Call::SetPan {
                    channel: 0,
                    pan: -1.0,
                },
            ]
        );
    }

    #[test]
    fn test_auto_loop_starts_looped() {
        let (sample, engine) = make_sample(LoopMode::AutoLoop);
        sample.start().expect("start failed");
        assert!(matches!(
            engine.calls().first(),
            Some(Call::Start { looped: true, .. })
        ));
    }

    #[test]
    fn test_volume_and_pan_clamped() {
        let (mut sample, _engine) = make_sample(LoopMode::OneShot);
        sample.set_volume(250);
        assert_eq!(sample.volume(), 100);
        sample.set_volume(-1);
        assert_eq!(sample.volume(), 0);
        sample.set_pan(500);
        assert_eq!(sample.pan(), 100);
        sample.set_pan(-500);
        assert_eq!(sample.pan(), -100);
    }

    #[test]
    fn test_apply_config_preserves_volume_and_pan() {
        let (mut sample, _engine) = make_sample(LoopMode::OneShot);
        sample.set_volume(30);
        sample.set_pan(10);

        sample.apply_config(SampleConfig {
            name: "snare".to_string(),
            file: "snare.wav".into(),
            key: Key::from_char('b'),
            loop_mode: LoopMode::AutoLoop,
        });

        assert_eq!(sample.name(), "snare");
        assert_eq!(sample.key(), Key::from_char('b'));
        assert_eq!(sample.loop_mode(), LoopMode::AutoLoop);
        assert_eq!(sample.volume(), 30);
        assert_eq!(sample.pan(), 10);
    }

    #[test]
    fn test_record_round_trip() {
        let (mut sample, engine) = make_sample(LoopMode::AutoLoop);
        sample.set_volume(75);
        sample.set_pan(-20);

        let record = sample.to_record();
        let restored = Sample::from_record(record, engine, 3);

        assert_eq!(restored.name(), sample.name());
        assert_eq!(restored.file(), sample.file());
        assert_eq!(restored.key(), sample.key());
        assert_eq!(restored.loop_mode(), sample.loop_mode());
        assert_eq!(restored.volume(), 75);
        assert_eq!(restored.pan(), -20);
        assert_eq!(restored.channel(), 3);
    }

    #[test]
    fn test_loop_mode_codes() {
        assert_eq!(LoopMode::from_code(0), LoopMode::OneShot);
        assert_eq!(LoopMode::from_code(1), LoopMode::AutoLoop);
        // Any non-zero code is auto-loop.
        assert_eq!(LoopMode::from_code(7), LoopMode::AutoLoop);
        assert_eq!(LoopMode::from_code(-1), LoopMode::AutoLoop);
    }
}
