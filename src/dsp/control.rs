//! Control/audio split: drive a player from another thread.
//!
//! Setters on `ControlHandle` never touch the player. They push a
//! `SynthCommand` into a wait-free SPSC ring. `RealtimePlayer` drains the
//! ring at the top of each pull (or block), so every recompute runs on the
//! audio context between two samples and is never partially visible.
//!
//! Chords replaced on the audio side are handed back through a second ring
//! so their last reference is dropped on the control side.

use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};

use crate::chord::Chord;
use crate::error::ChordSynthError;

use super::player::{ChordPlayer, chord_display_value};
use super::wavetable::Waveform;

pub const COMMAND_QUEUE_CAPACITY: usize = 64;
pub const GARBAGE_QUEUE_CAPACITY: usize = 64;

/// A control-rate change for the audio context.
#[derive(Debug, Clone)]
pub enum SynthCommand {
    Init(f64),
    SetChord(Arc<Chord>),
    SetWaveform(Waveform),
    SetUnisonCount(i32),
    SetBaseDetuneCents(f64),
    Reset,
}

/// Producer end of the command queue (control → audio)
pub type CommandProducer = Producer<SynthCommand>;
/// Consumer end of the command queue (audio ← control)
pub type CommandConsumer = Consumer<SynthCommand>;

/// Split a configured player into a control handle and an audio-side
/// player. The handle mirrors the player's current chord and waveform for
/// visualization.
pub fn split(player: ChordPlayer) -> (ControlHandle, RealtimePlayer) {
    let (command_tx, command_rx) = RingBuffer::new(COMMAND_QUEUE_CAPACITY);
    let (garbage_tx, garbage_rx) = RingBuffer::new(GARBAGE_QUEUE_CAPACITY);
    let handle = ControlHandle {
        command_tx,
        garbage_rx,
        chord: player.chord().cloned(),
        waveform: player.waveform(),
    };
    let realtime = RealtimePlayer {
        player,
        command_rx,
        garbage_tx,
    };
    (handle, realtime)
}

/// Control-context side. Owned by the UI/input task.
pub struct ControlHandle {
    command_tx: CommandProducer,
    garbage_rx: Consumer<Arc<Chord>>,
    chord: Option<Arc<Chord>>,
    waveform: Waveform,
}

impl ControlHandle {
    fn send(&mut self, cmd: SynthCommand) -> Result<(), ChordSynthError> {
        self.collect_garbage();
        log::debug!("sending {cmd:?}");
        self.command_tx.push(cmd).map_err(|_| {
            log::warn!("command queue full, dropping control change");
            ChordSynthError::QueueFull
        })
    }

    pub fn init(&mut self, sample_rate: f64) -> Result<(), ChordSynthError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            log::warn!("ignoring invalid sample rate {sample_rate}");
            return Ok(());
        }
        self.send(SynthCommand::Init(sample_rate))
    }

    /// `None` and unplayable chords are ignored, as on the player itself.
    pub fn set_chord(&mut self, chord: Option<Arc<Chord>>) -> Result<(), ChordSynthError> {
        let Some(chord) = chord else {
            return Ok(());
        };
        if !chord.is_playable() {
            log::warn!("ignoring unplayable chord '{}'", chord.name);
            return Ok(());
        }
        self.send(SynthCommand::SetChord(Arc::clone(&chord)))?;
        self.chord = Some(chord);
        Ok(())
    }

    pub fn set_waveform(&mut self, waveform: Waveform) -> Result<(), ChordSynthError> {
        self.send(SynthCommand::SetWaveform(waveform))?;
        self.waveform = waveform;
        Ok(())
    }

    pub fn set_unison_count(&mut self, count: i32) -> Result<(), ChordSynthError> {
        self.send(SynthCommand::SetUnisonCount(count))
    }

    pub fn set_base_detune_cents(&mut self, cents: f64) -> Result<(), ChordSynthError> {
        self.send(SynthCommand::SetBaseDetuneCents(cents))
    }

    pub fn reset(&mut self) -> Result<(), ChordSynthError> {
        self.send(SynthCommand::Reset)
    }

    /// Switch chord and restart phases in one step, as a chord change
    /// during playback normally wants.
    pub fn switch_chord(&mut self, chord: Arc<Chord>) -> Result<(), ChordSynthError> {
        self.set_chord(Some(chord))?;
        self.reset()
    }

    /// Visualization value for the latest requested chord and waveform.
    pub fn display_value(&self, time: f64) -> f64 {
        chord_display_value(self.chord.as_deref(), self.waveform, time)
    }

    pub fn chord(&self) -> Option<&Arc<Chord>> {
        self.chord.as_ref()
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Commands not yet picked up by the audio context.
    pub fn pending(&self) -> usize {
        self.command_tx.buffer().capacity() - self.command_tx.slots()
    }

    /// Drop chords the audio context has released.
    pub fn collect_garbage(&mut self) {
        while let Ok(_chord) = self.garbage_rx.pop() {}
    }
}

/// Audio-context side. Owned by the output callback.
pub struct RealtimePlayer {
    player: ChordPlayer,
    command_rx: CommandConsumer,
    garbage_tx: Producer<Arc<Chord>>,
}

impl RealtimePlayer {
    /// Apply pending commands. Bounded by the queue capacity so a busy
    /// control thread cannot stall the pull.
    fn process_commands(&mut self) {
        for _ in 0..COMMAND_QUEUE_CAPACITY {
            let Ok(cmd) = self.command_rx.pop() else {
                break;
            };
            match cmd {
                SynthCommand::Init(rate) => self.player.init(rate),
                SynthCommand::SetChord(chord) => {
                    let previous = self.player.chord().cloned();
                    if self.player.set_chord(Some(chord)) {
                        if let Some(previous) = previous {
                            // queue full: dropped here as a fallback
                            let _ = self.garbage_tx.push(previous);
                        }
                    }
                }
                SynthCommand::SetWaveform(w) => self.player.set_waveform(w),
                SynthCommand::SetUnisonCount(n) => self.player.set_unison_count(n),
                SynthCommand::SetBaseDetuneCents(c) => self.player.set_base_detune_cents(c),
                SynthCommand::Reset => self.player.reset(),
            }
        }
    }

    /// Apply pending commands, then produce one sample.
    #[inline]
    pub fn next_sample(&mut self) -> i16 {
        self.process_commands();
        self.player.next_sample()
    }

    /// Apply pending commands once, then fill `out`. Parameters are
    /// constant across the block.
    pub fn fill(&mut self, out: &mut [i16]) {
        self.process_commands();
        for sample in out.iter_mut() {
            *sample = self.player.next_sample();
        }
    }

    pub fn player(&self) -> &ChordPlayer {
        &self.player
    }
}
