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
use std::io;
use std::path::Path;
use std::sync::Arc;

pub mod mock;
pub mod rodio;

/// The boundary to the external audio engine. Decoding, mixing and output all
/// happen behind this trait; the rest of the crate only issues channel-level
/// start/stop/parameter commands.
pub trait Engine {
    /// The number of concurrent playback channels this engine was created with.
    fn max_channels(&self) -> usize;

    /// Starts playback of the given file on the given channel. Starting a
    /// channel that is already playing restarts it from the beginning.
    fn start(&self, channel: usize, file: &Path, looped: bool) -> Result<(), EngineError>;

    /// Stops playback on the given channel, releasing its playback handle.
    /// Stopping an idle channel is a no-op.
    fn stop(&self, channel: usize);

    /// Returns true if the given channel is currently playing.
    fn is_playing(&self, channel: usize) -> bool;

    /// Sets the volume of the given channel. 0.0 is silent, 1.0 is full scale.
    fn set_volume(&self, channel: usize, volume: f32);

    /// Sets the stereo position of the given channel, from -1.0 (hard left)
    /// to 1.0 (hard right).
    fn set_pan(&self, channel: usize, pan: f32);

    /// Stops playback on every channel.
    fn stop_all(&self);
}

/// Errors surfaced by the audio engine boundary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no audio output device named {0:?}")]
    DeviceNotFound(String),

    #[error("no default audio output device available")]
    NoOutputDevice,

    #[error("channel {0} is out of range")]
    BadChannel(usize),

    #[error("unable to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("unable to open audio output stream: {0}")]
    Stream(#[from] ::rodio::StreamError),

    #[error("unable to start playback: {0}")]
    Play(#[from] ::rodio::PlayError),

    #[error("unable to decode audio file: {0}")]
    Decode(#[from] ::rodio::decoder::DecoderError),

    #[error("audio file I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Gets an engine for the given device name. Names beginning with "mock"
/// return a silent mock engine, which is useful for testing without audio
/// hardware. No name selects the default output device.
pub fn get_engine(
    device_name: Option<&str>,
    max_channels: usize,
) -> Result<Arc<dyn Engine>, EngineError> {
    if let Some(name) = device_name {
        if name.starts_with("mock") {
            return Ok(Arc::new(mock::Engine::new(max_channels)));
        }
    }

    Ok(Arc::new(rodio::Engine::new(device_name, max_channels)?))
}

/// Lists the names of the available audio output devices.
pub fn list_devices() -> Result<Vec<String>, EngineError> {
    rodio::Engine::list_output_devices()
}
