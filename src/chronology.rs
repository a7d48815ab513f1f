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
use midly::num::{u4, u7};

use crate::event::NoteEvent;

/// Typed error for chronology construction so callers can distinguish
/// ordering violations from field range violations.
#[derive(Debug, thiserror::Error)]
pub enum ChronologyError {
    #[error("time delta {0} moves backwards")]
    TimeBackwards(i64),

    #[error("pitch {0} outside 0-127")]
    PitchOutOfRange(i32),

    #[error("channel {0} outside 0-15")]
    ChannelOutOfRange(i32),

    #[error("velocity {0} outside 0-127")]
    VelocityOutOfRange(i32),
}

/// A note event together with the absolute time it occupies on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedEvent {
    pub time: u64,
    pub event: NoteEvent,
}

/// A group of note-ons sharing one onset time. This is the unit a press
/// gesture consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Onset {
    pub time: u64,
    pub notes: Vec<NoteEvent>,
}

/// The ordered timeline of note events extracted from a MIDI file.
/// Append-only: events arrive as deltas relative to the previous event and
/// are stored with accumulated absolute times. A delta of zero marks
/// simultaneity.
#[derive(Default)]
pub struct Chronology {
    events: Vec<TimedEvent>,
    /// Absolute time of the most recently appended event.
    clock: u64,
}

impl Chronology {
    /// Creates a new, empty chronology.
    pub fn new() -> Chronology {
        Chronology::default()
    }

    /// Appends one event `delta` ticks or milliseconds after the previous
    /// one. Out-of-range fields and backwards deltas are rejected and leave
    /// the chronology untouched.
    pub fn append(
        &mut self,
        delta: i64,
        pressed: bool,
        pitch: i32,
        channel: i32,
        velocity: i32,
    ) -> Result<(), ChronologyError> {
        if delta < 0 {
            return Err(ChronologyError::TimeBackwards(delta));
        }
        if !(0..=127).contains(&pitch) {
            return Err(ChronologyError::PitchOutOfRange(pitch));
        }
        if !(0..=15).contains(&channel) {
            return Err(ChronologyError::ChannelOutOfRange(channel));
        }
        if !(0..=127).contains(&velocity) {
            return Err(ChronologyError::VelocityOutOfRange(velocity));
        }

        self.clock += delta as u64;
        self.events.push(TimedEvent {
            time: self.clock,
            event: NoteEvent::new(
                pressed,
                u7::from_int_lossy(pitch as u8),
                u4::from_int_lossy(channel as u8),
                u7::from_int_lossy(velocity as u8),
            ),
        });
        Ok(())
    }

    /// Gets the number of events on the timeline.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the timeline holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Gets the events on the timeline.
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Groups the press events by onset time, preserving timeline order.
    /// Release events in the stream delimit note durations in the source
    /// file; they are not replayed verbatim, so they do not appear here. The
    /// performer synthesizes releases from whatever a contact holds.
    pub fn onsets(&self) -> Vec<Onset> {
        let mut onsets: Vec<Onset> = Vec::new();
        for timed in self.events.iter().filter(|timed| timed.event.pressed) {
            match onsets.last_mut() {
                Some(last) if last.time == timed.time => last.notes.push(timed.event),
                _ => onsets.push(Onset {
                    time: timed.time,
                    notes: vec![timed.event],
                }),
            }
        }
        onsets
    }
}

#[cfg(test)]
mod test {
    use super::{Chronology, ChronologyError};

    #[test]
    fn accumulates_deltas_into_absolute_times() -> Result<(), ChronologyError> {
        let mut chronology = Chronology::new();
        chronology.append(100, true, 60, 0, 90)?;
        chronology.append(0, true, 64, 0, 90)?;
        chronology.append(50, false, 60, 0, 0)?;

        let times: Vec<u64> = chronology
            .events()
            .iter()
            .map(|timed| timed.time)
            .collect();
        assert_eq!(vec![100, 100, 150], times);
        Ok(())
    }

    #[test]
    fn groups_simultaneous_presses_into_one_onset() -> Result<(), ChronologyError> {
        let mut chronology = Chronology::new();
        // A two-note chord, its releases, then a single note.
        chronology.append(0, true, 60, 0, 90)?;
        chronology.append(0, true, 64, 0, 90)?;
        chronology.append(500, false, 60, 0, 0)?;
        chronology.append(0, false, 64, 0, 0)?;
        chronology.append(500, true, 67, 0, 90)?;

        let onsets = chronology.onsets();
        assert_eq!(2, onsets.len());
        assert_eq!(0, onsets[0].time);
        assert_eq!(2, onsets[0].notes.len());
        assert_eq!(1000, onsets[1].time);
        assert_eq!(1, onsets[1].notes.len());
        assert_eq!(67, onsets[1].notes[0].pitch.as_int());
        Ok(())
    }

    #[test]
    fn rejects_backwards_time() {
        let mut chronology = Chronology::new();
        assert!(matches!(
            chronology.append(-1, true, 60, 0, 90),
            Err(ChronologyError::TimeBackwards(-1))
        ));
        assert!(chronology.is_empty());
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let mut chronology = Chronology::new();
        assert!(matches!(
            chronology.append(0, true, 128, 0, 90),
            Err(ChronologyError::PitchOutOfRange(128))
        ));
        assert!(matches!(
            chronology.append(0, true, 60, 16, 90),
            Err(ChronologyError::ChannelOutOfRange(16))
        ));
        assert!(matches!(
            chronology.append(0, true, 60, 0, -3),
            Err(ChronologyError::VelocityOutOfRange(-3))
        ));
        assert!(chronology.is_empty());
    }

    #[test]
    fn releases_do_not_form_onsets() -> Result<(), ChronologyError> {
        let mut chronology = Chronology::new();
        chronology.append(0, false, 60, 0, 0)?;
        chronology.append(10, false, 62, 0, 0)?;
        assert!(chronology.onsets().is_empty());
        assert_eq!(2, chronology.len());
        Ok(())
    }
}
