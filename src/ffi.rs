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
//! Flat C-ABI surface over a process-wide performer. The entry point names
//! and argument shapes match the shared library the original hosts link
//! against; no panic or error type crosses this boundary. Failure is a
//! negative status or an empty zero-terminated batch.

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::performer::Performer;

/// Capacity of the caller-supplied render buffer, in events: the theoretical
/// worst case of 16 channels x 2 transitions x 128 pitches.
pub const MAX_EVENT_AMOUNT: usize = 4096;

// The observed ABI has no handle parameter, so the performer is a single
// process-wide instance. Calls take the lock for their whole duration.
static PERFORMER: Mutex<Option<Performer>> = Mutex::new(None);

fn with_performer<T>(f: impl FnOnce(&mut Performer) -> T) -> T {
    let mut guard = PERFORMER.lock();
    f(guard.get_or_insert_with(Performer::new))
}

/// Resets the process-wide performer: discards the chronology and all
/// contact cursors and enters building state.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn clearPerformer() {
    with_performer(|performer| performer.clear());
}

/// Appends one note event, `time` ticks or milliseconds after the previously
/// pushed event. Returns 0 on success and -1 if the event was rejected
/// (out-of-range field, backwards delta, or chronology already sealed);
/// a rejected event leaves the chronology untouched.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn pushMPTKEvent(
    time: i64,
    pressed: bool,
    pitch: i32,
    channel: i32,
    velocity: i32,
) -> i32 {
    with_performer(|performer| {
        match performer.push(time, pressed, pitch, channel, velocity) {
            Ok(()) => 0,
            Err(e) => {
                warn!(error = %e, "Discarding pushed event.");
                -1
            }
        }
    })
}

/// Seals the chronology and enters ready state. Idempotent.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn finalizePerformer() {
    with_performer(|performer| performer.finalize());
}

/// Renders the events one press or release edge should trigger for the given
/// contact, writing one encoded event per slot and terminating the batch
/// with a zero. At most `MAX_EVENT_AMOUNT - 1` events are written so the
/// terminator always fits. Returns the number of events written, or -1 if
/// `buffer` is null. Rendering before finalize yields an empty batch.
///
/// # Safety
///
/// `buffer` must be null or valid for writes of `MAX_EVENT_AMOUNT` `u64`
/// values. The buffer is owned by the caller and only written during this
/// call.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn renderCommand(pressed: bool, id: u32, buffer: *mut u64) -> i32 {
    if buffer.is_null() {
        warn!("Render called with a null buffer.");
        return -1;
    }
    let out = unsafe { std::slice::from_raw_parts_mut(buffer, MAX_EVENT_AMOUNT) };

    let batch = with_performer(|performer| match performer.render(pressed, id) {
        Ok(batch) => batch,
        Err(e) => {
            debug!(error = %e, "Returning empty batch.");
            Vec::new()
        }
    });

    let count = batch.len().min(MAX_EVENT_AMOUNT - 1);
    for (slot, note) in out.iter_mut().zip(batch.iter().take(count)) {
        *slot = note.event.encode();
    }
    out[count] = 0;
    count as i32
}

#[cfg(test)]
mod test {
    use serial_test::serial;

    use super::{
        clearPerformer, finalizePerformer, pushMPTKEvent, renderCommand, MAX_EVENT_AMOUNT,
    };
    use crate::event::NoteEvent;

    fn render(pressed: bool, id: u32) -> (i32, Vec<u64>) {
        let mut buffer = vec![0xFFFF_FFFF_FFFF_FFFFu64; MAX_EVENT_AMOUNT];
        let count = unsafe { renderCommand(pressed, id, buffer.as_mut_ptr()) };
        (count, buffer)
    }

    /// Decodes a buffer the way the hosts do: read until the first zero.
    fn decode(buffer: &[u64]) -> Vec<NoteEvent> {
        buffer
            .iter()
            .take_while(|data| **data != 0)
            .map(|data| NoteEvent::decode(*data).expect("invalid encoded event"))
            .collect()
    }

    #[test]
    #[serial]
    fn full_performance_flow() {
        clearPerformer();
        assert_eq!(0, pushMPTKEvent(0, true, 60, 0, 100));
        assert_eq!(0, pushMPTKEvent(500, false, 60, 0, 0));
        finalizePerformer();

        let (count, buffer) = render(true, 1);
        assert_eq!(1, count);
        let events = decode(&buffer);
        assert_eq!(1, events.len());
        assert!(events[0].pressed);
        assert_eq!(60, events[0].pitch.as_int());
        assert_eq!(0, events[0].channel.as_int());
        assert_eq!(100, events[0].velocity.as_int());

        let (count, buffer) = render(false, 1);
        assert_eq!(1, count);
        let events = decode(&buffer);
        assert_eq!(1, events.len());
        assert!(!events[0].pressed);
        assert_eq!(60, events[0].pitch.as_int());
        assert_eq!(0, events[0].channel.as_int());
    }

    #[test]
    #[serial]
    fn oversized_batch_is_capped_with_terminator() {
        clearPerformer();
        // 5000 simultaneous note-ons, more than one batch can carry.
        for i in 0..5000u32 {
            let pitch = (i % 128) as i32;
            let channel = ((i / 128) % 16) as i32;
            assert_eq!(0, pushMPTKEvent(0, true, pitch, channel, 100));
        }
        finalizePerformer();

        let (count, buffer) = render(true, 1);
        assert_eq!((MAX_EVENT_AMOUNT - 1) as i32, count);
        assert!(buffer[..MAX_EVENT_AMOUNT - 1]
            .iter()
            .all(|data| *data != 0));
        assert_eq!(0, buffer[MAX_EVENT_AMOUNT - 1]);
    }

    #[test]
    #[serial]
    fn render_before_finalize_is_empty() {
        clearPerformer();
        pushMPTKEvent(0, true, 60, 0, 100);

        let (count, buffer) = render(true, 1);
        assert_eq!(0, count);
        assert_eq!(0, buffer[0]);
    }

    #[test]
    #[serial]
    fn push_after_finalize_is_rejected() {
        clearPerformer();
        assert_eq!(0, pushMPTKEvent(0, true, 60, 0, 100));
        finalizePerformer();
        assert_eq!(-1, pushMPTKEvent(0, true, 62, 0, 100));

        // The sealed chronology still renders its original content.
        let (count, buffer) = render(true, 1);
        assert_eq!(1, count);
        assert_eq!(60, decode(&buffer)[0].pitch.as_int());
    }

    #[test]
    #[serial]
    fn out_of_range_push_is_rejected() {
        clearPerformer();
        assert_eq!(-1, pushMPTKEvent(0, true, 128, 0, 100));
        assert_eq!(-1, pushMPTKEvent(0, true, 60, 16, 100));
        assert_eq!(-1, pushMPTKEvent(0, true, 60, 0, 200));
        assert_eq!(-1, pushMPTKEvent(-5, true, 60, 0, 100));
        finalizePerformer();

        let (count, _) = render(true, 1);
        assert_eq!(0, count);
    }

    #[test]
    #[serial]
    fn null_buffer_is_rejected() {
        clearPerformer();
        finalizePerformer();
        assert_eq!(-1, unsafe {
            renderCommand(true, 1, std::ptr::null_mut())
        });
    }

    #[test]
    #[serial]
    fn clear_discards_ready_state() {
        clearPerformer();
        pushMPTKEvent(0, true, 60, 0, 100);
        finalizePerformer();
        clearPerformer();

        let (count, buffer) = render(true, 1);
        assert_eq!(0, count);
        assert_eq!(0, buffer[0]);
    }
}
