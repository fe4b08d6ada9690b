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

//! The sampler core: configured samples, trigger keys, and the session that
//! dispatches key events to them.

pub mod key;
pub mod sample;
pub mod session;

pub use key::Key;
pub use sample::{LoopMode, Sample, SampleConfig};
pub use session::{Session, SessionError};

/// The maximum number of concurrent playback channels, and therefore the
/// maximum number of configured samples in a session.
pub const MAX_CHANNELS: usize = 32;
