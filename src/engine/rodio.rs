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

//! The real audio engine, delegating decoding, mixing and output to rodio.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use cpal::traits::{DeviceTrait, HostTrait};
use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, OutputStreamHandle, SpatialSink, Source};
use tracing::{debug, info};

use super::EngineError;

// Ear positions for the spatial sinks. Panning moves the emitter along the
// line between them.
const LEFT_EAR: [f32; 3] = [-1.0, 0.0, 0.0];
const RIGHT_EAR: [f32; 3] = [1.0, 0.0, 0.0];

/// An audio engine backed by rodio. Each channel maps to at most one spatial
/// sink; the sink is created lazily when the channel starts and dropped when
/// it stops or when one-shot playback runs out.
pub struct Engine {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    slots: Mutex<Vec<Option<SpatialSink>>>,
    max_channels: usize,
    device_name: String,
}

impl Engine {
    /// Creates an engine bound to the named cpal output device, or to the
    /// default output device if no name is given.
    pub fn new(device_name: Option<&str>, max_channels: usize) -> Result<Engine, EngineError> {
        let host = cpal::default_host();

        let (device, resolved_name) = match device_name {
            Some(name) => {
                let device = host
                    .output_devices()?
                    .find(|device| device.name().is_ok_and(|n| n == name))
                    .ok_or_else(|| EngineError::DeviceNotFound(name.to_string()))?;
                (device, name.to_string())
            }
            None => {
                let device = host
                    .default_output_device()
                    .ok_or(EngineError::NoOutputDevice)?;
                let name = device.name().unwrap_or_else(|_| "default".to_string());
                (device, name)
            }
        };

        let (stream, handle) = OutputStream::try_from_device(&device)?;

        info!(
            device = resolved_name,
            max_channels, "Audio engine initialized"
        );

        Ok(Engine {
            _stream: stream,
            handle,
            slots: Mutex::new((0..max_channels).map(|_| None).collect()),
            max_channels,
            device_name: resolved_name,
        })
    }

    /// Lists the names of all cpal output devices.
    pub fn list_output_devices() -> Result<Vec<String>, EngineError> {
        let mut names = Vec::new();
        for device in cpal::default_host().output_devices()? {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// The name of the output device this engine is bound to.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl super::Engine for Engine {
    fn max_channels(&self) -> usize {
        self.max_channels
    }

    fn start(&self, channel: usize, file: &Path, looped: bool) -> Result<(), EngineError> {
        let mut slots = self.slots.lock();
        let slot = slots
            .get_mut(channel)
            .ok_or(EngineError::BadChannel(channel))?;

        // Restart semantics: any playback already on this channel is cut.
        if let Some(old) = slot.take() {
            old.stop();
        }

        let sink = SpatialSink::try_new(&self.handle, [0.0; 3], LEFT_EAR, RIGHT_EAR)?;
        let reader = BufReader::new(File::open(file)?);
        if looped {
            sink.append(Decoder::new_looped(reader)?.convert_samples::<f32>());
        } else {
            sink.append(Decoder::new(reader)?.convert_samples::<f32>());
        }
        *slot = Some(sink);

        debug!(channel, file = %file.display(), looped, "Channel started");
        Ok(())
    }

    fn stop(&self, channel: usize) {
        let mut slots = self.slots.lock();
        if let Some(sink) = slots.get_mut(channel).and_then(Option::take) {
            sink.stop();
            debug!(channel, "Channel stopped");
        }
    }

    fn is_playing(&self, channel: usize) -> bool {
        let mut slots = self.slots.lock();
        match slots.get_mut(channel) {
            Some(slot) => match slot {
                Some(sink) if sink.empty() => {
                    // One-shot playback ran out; release the handle.
                    *slot = None;
                    false
                }
                Some(_) => true,
                None => false,
            },
            None => false,
        }
    }

    fn set_volume(&self, channel: usize, volume: f32) {
        let slots = self.slots.lock();
        if let Some(Some(sink)) = slots.get(channel) {
            sink.set_volume(volume);
        }
    }

    fn set_pan(&self, channel: usize, pan: f32) {
        let slots = self.slots.lock();
        if let Some(Some(sink)) = slots.get(channel) {
            sink.set_emitter_position([pan, 0.0, 0.0]);
        }
    }

    fn stop_all(&self) {
        let mut slots = self.slots.lock();
        for slot in slots.iter_mut() {
            if let Some(sink) = slot.take() {
                sink.stop();
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("device", &self.device_name)
            .field("max_channels", &self.max_channels)
            .finish()
    }
}
