// Copyright (C) 2026 The midifile-performer authors
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

use midly::num::{u4, u7};

const NOTE_ON: u64 = 0x90;
const NOTE_OFF: u64 = 0x80;

const COMMAND_MASK: u64 = 0xF0 << 16;
const CHANNEL_MASK: u64 = 0x0F << 16;
const PITCH_MASK: u64 = 0xFF << 8;
const VELOCITY_MASK: u64 = 0xFF;

/// A single note transition. This is the unit the chronology stores and the
/// unit a render batch returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteEvent {
    /// True for a note-on with nonzero velocity, false for a release.
    pub pressed: bool,
    pub pitch: u7,
    pub channel: u4,
    pub velocity: u7,
}

impl NoteEvent {
    /// Creates a new note event.
    pub fn new(pressed: bool, pitch: u7, channel: u4, velocity: u7) -> NoteEvent {
        NoteEvent {
            pressed,
            pitch,
            channel,
            velocity,
        }
    }

    /// Returns the release counterpart of this event: same pitch and channel,
    /// note-off command, release velocity 0.
    pub fn release(&self) -> NoteEvent {
        NoteEvent {
            pressed: false,
            pitch: self.pitch,
            channel: self.channel,
            velocity: u7::from_int_lossy(0),
        }
    }

    /// Packs the event into a single word for the wire: command and channel
    /// byte at bit 16, pitch at bit 8, velocity at bit 0. A real event always
    /// carries a nonzero command nibble, so 0 never collides with the batch
    /// terminator.
    pub fn encode(&self) -> u64 {
        let command = if self.pressed { NOTE_ON } else { NOTE_OFF };
        ((command | u64::from(self.channel.as_int())) << 16)
            | (u64::from(self.pitch.as_int()) << 8)
            | u64::from(self.velocity.as_int())
    }

    /// Recovers an event from an encoded word. Returns None for the zero
    /// terminator and for any word that does not carry a note command.
    pub fn decode(data: u64) -> Option<NoteEvent> {
        let pressed = match (data & COMMAND_MASK) >> 16 {
            NOTE_ON => true,
            NOTE_OFF => false,
            _ => return None,
        };
        Some(NoteEvent {
            pressed,
            pitch: u7::from_int_lossy(((data & PITCH_MASK) >> 8) as u8),
            channel: u4::from_int_lossy(((data & CHANNEL_MASK) >> 16) as u8),
            velocity: u7::from_int_lossy((data & VELOCITY_MASK) as u8),
        })
    }
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pitch={} channel={} velocity={}",
            if self.pressed { "NoteOn" } else { "NoteOff" },
            self.pitch.as_int(),
            self.channel.as_int(),
            self.velocity.as_int(),
        )
    }
}
