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
//! An event-sequencing engine for gesture-driven performance of MIDI files.
//!
//! A host parses a MIDI file, pushes its note on/off events into the
//! performer's chronology, and seals it with finalize. From then on, each
//! press or release edge of an input contact (a touch point, identified by a
//! small integer) renders a batch of note events: a press claims the next
//! group of simultaneous note-ons on the timeline, and the matching release
//! ends exactly those notes. Batches cross the C ABI as fixed-capacity,
//! zero-terminated arrays of bit-packed words; the Rust API returns plain
//! vectors.

pub mod chronology;
pub mod event;
pub mod ffi;
pub mod performer;

pub use chronology::{Chronology, ChronologyError, Onset, TimedEvent};
pub use event::NoteEvent;
pub use ffi::MAX_EVENT_AMOUNT;
pub use performer::{Performer, PerformerError, RenderedNote};
