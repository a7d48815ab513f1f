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
use std::collections::HashMap;

use tracing::{debug, info};

use crate::chronology::{Chronology, ChronologyError, Onset};
use crate::event::NoteEvent;

/// Typed error for out-of-order calls and invalid pushed events. The C ABI
/// flattens these into status codes and empty batches; the Rust API keeps
/// them observable.
#[derive(Debug, thiserror::Error)]
pub enum PerformerError {
    #[error("chronology is sealed; call clear before pushing again")]
    NotBuilding,

    #[error("chronology is still building; call finalize before rendering")]
    NotReady,

    #[error(transparent)]
    Chronology(#[from] ChronologyError),
}

/// Whether the performer is accepting pushes or servicing renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Building,
    Ready,
}

/// A rendered note together with the onset time that produced it, so batches
/// can be kept in timeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderedNote {
    pub time: u64,
    pub event: NoteEvent,
}

/// Per-contact cursor state: the notes this contact is currently holding.
/// Created lazily on the first render for a contact id.
#[derive(Default)]
struct Contact {
    held: Vec<RenderedNote>,
}

/// The performer organizes a chronology of note events and replays it one
/// press gesture at a time. Each press (from any contact) claims the next
/// unconsumed onset, so simultaneous contacts receive disjoint slices of the
/// timeline; each release ends exactly the notes its contact started.
pub struct Performer {
    chronology: Chronology,
    onsets: Vec<Onset>,
    /// Shared consumption cursor into `onsets`.
    next_onset: usize,
    contacts: HashMap<u32, Contact>,
    state: State,
}

impl Performer {
    /// Creates a new performer in building state with an empty chronology.
    pub fn new() -> Performer {
        Performer {
            chronology: Chronology::new(),
            onsets: Vec::new(),
            next_onset: 0,
            contacts: HashMap::new(),
            state: State::Building,
        }
    }

    /// Discards the chronology and all contact cursors and returns to
    /// building state. Never fails; clearing twice is the same as clearing
    /// once.
    pub fn clear(&mut self) {
        self.chronology = Chronology::new();
        self.onsets.clear();
        self.next_onset = 0;
        self.contacts.clear();
        self.state = State::Building;
        debug!("Performer cleared.");
    }

    /// Appends one event to the chronology, `delta` ticks or milliseconds
    /// after the previously pushed event. Only valid while building; a push
    /// after finalize is rejected and leaves the chronology untouched.
    pub fn push(
        &mut self,
        delta: i64,
        pressed: bool,
        pitch: i32,
        channel: i32,
        velocity: i32,
    ) -> Result<(), PerformerError> {
        if self.state != State::Building {
            return Err(PerformerError::NotBuilding);
        }
        self.chronology.append(delta, pressed, pitch, channel, velocity)?;
        Ok(())
    }

    /// Seals the chronology and enters ready state. Idempotent: a second
    /// call is a no-op and does not disturb cursors or consumed onsets.
    pub fn finalize(&mut self) {
        if self.state == State::Ready {
            return;
        }
        self.onsets = self.chronology.onsets();
        self.next_onset = 0;
        self.state = State::Ready;
        info!(
            events = self.chronology.len(),
            onsets = self.onsets.len(),
            "Chronology sealed."
        );
    }

    /// Renders the note events one press or release edge should trigger.
    ///
    /// On a press the contact first releases anything it still holds (a
    /// re-press without a matching release), then claims the next unconsumed
    /// onset and starts its notes; at the end of the chronology the press
    /// yields only those releases, possibly an empty batch. On a release the
    /// contact ends every note it holds, paired by pitch and channel.
    ///
    /// A contact id never seen before starts with an empty cursor; it is not
    /// an error. Rendering before finalize is.
    pub fn render(
        &mut self,
        pressed: bool,
        contact_id: u32,
    ) -> Result<Vec<RenderedNote>, PerformerError> {
        if self.state != State::Ready {
            return Err(PerformerError::NotReady);
        }

        let contact = self.contacts.entry(contact_id).or_default();
        let mut batch: Vec<RenderedNote> = Vec::new();

        // Held notes predate any onset claimed below, so releasing them
        // first keeps the batch in non-decreasing time order.
        for held in contact.held.drain(..) {
            batch.push(RenderedNote {
                time: held.time,
                event: held.event.release(),
            });
        }

        if pressed {
            if let Some(onset) = self.onsets.get(self.next_onset) {
                self.next_onset += 1;
                for note in &onset.notes {
                    let rendered = RenderedNote {
                        time: onset.time,
                        event: *note,
                    };
                    contact.held.push(rendered);
                    batch.push(rendered);
                }
            }
        }

        debug!(
            contact = contact_id,
            pressed,
            events = batch.len(),
            "Rendered gesture."
        );
        Ok(batch)
    }
}

impl Default for Performer {
    fn default() -> Self {
        Performer::new()
    }
}
