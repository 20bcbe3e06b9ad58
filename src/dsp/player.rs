//! Chord player: a fixed bank of phase accumulators mixed into one i16 stream.
//!
//! Each of the three chord notes is played by `voice_count` unison voices,
//! so at most 12 voices are active. The voice arrays are sized for the worst
//! case and never reallocate; `next_sample` does bounded work and touches
//! no heap.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::chord::{Chord, NOTES_PER_CHORD};

use super::unison::{MAX_UNISON_VOICES, UnisonEngine};
use super::wavetable::{REFERENCE_PEAK, TABLE_SIZE, Waveform, WaveformTable};

/// Voice capacity: every chord note at full unison.
pub const MAX_VOICES: usize = NOTES_PER_CHORD * MAX_UNISON_VOICES;

/// Plays one chord with one waveform and a unison spread.
///
/// Parameter changes are instantaneous: the next `next_sample` call
/// reflects them with no crossfade.
#[derive(Debug, Clone)]
pub struct ChordPlayer {
    table: Arc<WaveformTable>,
    chord: Option<Arc<Chord>>,
    waveform: Waveform,
    /// Zero until `init` succeeds.
    sample_rate: f64,
    unison: UnisonEngine,
    phases: [f64; MAX_VOICES],
    increments: [f64; MAX_VOICES],
    active_voices: usize,
    /// Per-voice amplitude budget, `REFERENCE_PEAK / active_voices`.
    max_amp_per_voice: i16,
}

impl Default for ChordPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChordPlayer {
    /// A player using the process-wide wavetable.
    pub fn new() -> Self {
        Self::with_table(WaveformTable::shared())
    }

    pub fn with_table(table: Arc<WaveformTable>) -> Self {
        let unison = UnisonEngine::new();
        let active_voices = NOTES_PER_CHORD * unison.voice_count();
        ChordPlayer {
            table,
            chord: None,
            waveform: Waveform::Sine,
            sample_rate: 0.0,
            unison,
            phases: [0.0; MAX_VOICES],
            increments: [0.0; MAX_VOICES],
            active_voices,
            max_amp_per_voice: REFERENCE_PEAK / active_voices as i16,
        }
    }

    /// Set the output sample rate. Must precede any sample pull; may be
    /// called again to change rate. Non-positive or non-finite rates are
    /// ignored.
    pub fn init(&mut self, sample_rate: f64) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return;
        }
        self.sample_rate = sample_rate;
        self.recompute_increments();
    }

    /// Bind a chord. `None` and chords with non-playable notes are ignored
    /// and the previous chord is kept. Returns `true` if the chord was bound.
    pub fn set_chord(&mut self, chord: Option<Arc<Chord>>) -> bool {
        match chord {
            Some(chord) if chord.is_playable() => {
                self.chord = Some(chord);
                self.recompute_increments();
                true
            }
            _ => false,
        }
    }

    /// Increments depend only on frequency, so no recompute is needed.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Select the waveform by raw tag; unknown tags select `Sine`.
    pub fn set_waveform_tag(&mut self, tag: i32) {
        self.set_waveform(Waveform::from_tag(tag));
    }

    pub fn set_unison_count(&mut self, count: i32) {
        if self.unison.set_voice_count(count) {
            self.recompute_increments();
        }
    }

    pub fn set_base_detune_cents(&mut self, cents: f64) {
        if self.unison.set_base_detune_cents(cents) {
            self.recompute_increments();
        }
    }

    /// Zero every phase accumulator. Used for a clean restart on chord
    /// switches: transitions become predictable rather than click-free.
    pub fn reset(&mut self) {
        self.phases = [0.0; MAX_VOICES];
    }

    fn recompute_increments(&mut self) {
        let voice_count = self.unison.voice_count();
        self.active_voices = NOTES_PER_CHORD * voice_count;
        self.max_amp_per_voice = REFERENCE_PEAK / self.active_voices as i16;

        let Some(chord) = self.chord.as_deref() else {
            return;
        };
        if self.sample_rate <= 0.0 {
            return;
        }

        let table_size = TABLE_SIZE as f64;
        let ratios = self.unison.ratios();
        for (j, &note) in chord.notes.iter().enumerate() {
            for (v, &ratio) in ratios.iter().enumerate() {
                self.increments[j * voice_count + v] =
                    table_size * note * ratio / self.sample_rate;
            }
        }
    }

    /// True once a sample rate and a chord are both bound.
    pub fn is_ready(&self) -> bool {
        self.sample_rate > 0.0 && self.chord.is_some()
    }

    /// Produce one mixed output sample. Silence until `is_ready`.
    ///
    /// Each active voice contributes at most `max_amp_per_voice`, and
    /// `active_voices * max_amp_per_voice <= REFERENCE_PEAK`, so the sum
    /// always fits in i16 without clamping.
    #[inline]
    pub fn next_sample(&mut self) -> i16 {
        if !self.is_ready() {
            return 0;
        }

        let table_size = TABLE_SIZE as f64;
        let active = self.active_voices;
        let mut sum: i32 = 0;
        for (phase, &inc) in self.phases[..active]
            .iter_mut()
            .zip(&self.increments[..active])
        {
            // increments stay below TABLE_SIZE for any note under the
            // sample rate, so one subtraction is enough
            if *phase >= table_size {
                *phase -= table_size;
            }
            sum += self
                .table
                .scaled_sample(self.waveform, *phase as usize, self.max_amp_per_voice)
                as i32;
            *phase += inc;
        }
        sum as i16
    }

    /// Visualization value in [-1, 1] at `time` seconds. Reads only the
    /// chord and waveform selection, never the live phases.
    pub fn display_value(&self, time: f64) -> f64 {
        chord_display_value(self.chord.as_deref(), self.waveform, time)
    }

    pub fn chord(&self) -> Option<&Arc<Chord>> {
        self.chord.as_ref()
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn unison(&self) -> &UnisonEngine {
        &self.unison
    }

    pub fn active_voices(&self) -> usize {
        self.active_voices
    }

    pub fn max_amp_per_voice(&self) -> i16 {
        self.max_amp_per_voice
    }

    /// Phase increments of the active voices.
    pub fn increments(&self) -> &[f64] {
        &self.increments[..self.active_voices]
    }

    /// Phase accumulators of the active voices.
    pub fn phases(&self) -> &[f64] {
        &self.phases[..self.active_voices]
    }

    /// Whether every active voice advances by less than one table period
    /// per sample, the precondition for single-subtraction phase wrap.
    pub fn increments_in_range(&self) -> bool {
        self.increments().iter().all(|&inc| inc < TABLE_SIZE as f64)
    }
}

/// Average of the chord's three notes rendered with the closed-form
/// waveform at `time` seconds. No chord means a flat line.
pub fn chord_display_value(chord: Option<&Chord>, waveform: Waveform, time: f64) -> f64 {
    let Some(chord) = chord else {
        return 0.0;
    };
    let sum: f64 = chord
        .notes
        .iter()
        .map(|&freq| WaveformTable::display_value(waveform, 2.0 * PI * freq * time))
        .sum();
    sum / NOTES_PER_CHORD as f64
}
