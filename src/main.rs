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
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use midly::{Format, MidiMessage, Smf, TrackEventKind};

use midifile_performer::Performer;

#[derive(Parser)]
#[clap(
    version = crate_version!(),
    about = "A gesture-driven MIDI file performer."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the note on/off events a MIDI file feeds to the performer.
    Events {
        /// The path to the MIDI file.
        path: PathBuf,
    },
    /// Pushes a MIDI file into a performer and simulates press/release
    /// gestures on a single contact, printing each rendered batch.
    Perform {
        /// The path to the MIDI file.
        path: PathBuf,
        /// The number of press and release gesture pairs to simulate.
        #[arg(short, long, default_value_t = 8)]
        gestures: usize,
    },
}

/// A note transition extracted from a MIDI file, at an absolute tick.
struct FileNote {
    tick: u64,
    pressed: bool,
    pitch: u8,
    channel: u8,
    velocity: u8,
}

/// Extracts the note on/off events of a file in non-decreasing tick order.
/// Note-ons with velocity zero are normalized to releases before they ever
/// reach the performer. Parallel (format 1) tracks are merged by absolute
/// tick; sequential tracks are concatenated.
fn note_events(smf: &Smf) -> Vec<FileNote> {
    let mut notes: Vec<FileNote> = Vec::new();
    let mut base = 0u64;
    for track in &smf.tracks {
        let mut tick = base;
        for event in track {
            tick += u64::from(event.delta.as_int());
            if let TrackEventKind::Midi { channel, message } = event.kind {
                let (pressed, key, vel) = match message {
                    MidiMessage::NoteOn { key, vel } => (vel.as_int() != 0, key, vel),
                    MidiMessage::NoteOff { key, vel } => (false, key, vel),
                    _ => continue,
                };
                notes.push(FileNote {
                    tick,
                    pressed,
                    pitch: key.as_int(),
                    channel: channel.as_int(),
                    velocity: vel.as_int(),
                });
            }
        }
        if matches!(smf.header.format, Format::Sequential) {
            base = tick;
        }
    }
    if matches!(smf.header.format, Format::Parallel) {
        // Stable, so simultaneous events keep their track order.
        notes.sort_by_key(|note| note.tick);
    }
    notes
}

/// Pushes a file's note events into a fresh, finalized performer, converting
/// absolute ticks to the relative deltas the push interface expects.
fn load_performer(notes: &[FileNote]) -> Result<Performer, Box<dyn Error>> {
    let mut performer = Performer::new();
    let mut latest = 0u64;
    for note in notes {
        performer.push(
            (note.tick - latest) as i64,
            note.pressed,
            i32::from(note.pitch),
            i32::from(note.channel),
            i32::from(note.velocity),
        )?;
        latest = note.tick;
    }
    performer.finalize();
    Ok(performer)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Events { path } => {
            let buf: Vec<u8> = fs::read(&path)?;
            let smf = Smf::parse(&buf)?;
            let notes = note_events(&smf);

            if notes.is_empty() {
                println!("No note events found in {}.", path.display());
                return Ok(());
            }

            println!("Note events (count: {}):", notes.len());
            for note in notes {
                println!(
                    "- tick={} {} pitch={} channel={} velocity={}",
                    note.tick,
                    if note.pressed { "on" } else { "off" },
                    note.pitch,
                    note.channel,
                    note.velocity,
                );
            }
        }
        Commands::Perform { path, gestures } => {
            let buf: Vec<u8> = fs::read(&path)?;
            let smf = Smf::parse(&buf)?;
            let notes = note_events(&smf);
            let mut performer = load_performer(&notes)?;

            for gesture in 0..gestures {
                for pressed in [true, false] {
                    let batch = performer.render(pressed, 0)?;
                    println!(
                        "gesture {} {} (events: {}):",
                        gesture,
                        if pressed { "press" } else { "release" },
                        batch.len(),
                    );
                    for note in batch {
                        println!("- {} (0x{:06x})", note.event, note.event.encode());
                    }
                }
            }
        }
    }

    Ok(())
}
