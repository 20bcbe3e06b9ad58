//! Synth settings: the values a driver would otherwise pass to the setters
//! one by one, loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::chord::ChordLibrary;
use crate::dsp::player::ChordPlayer;
use crate::dsp::unison::DEFAULT_DETUNE_CENTS;
use crate::dsp::wavetable::Waveform;
use crate::error::ChordSynthError;

/// Player settings. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthConfig {
    /// Output rate in Hz.
    pub sample_rate: f64,
    /// Chord name, looked up in a `ChordLibrary`.
    pub chord: String,
    pub waveform: Waveform,
    /// Unison voices per note (clamped to 1..=4 when applied).
    pub unison_count: i32,
    /// Base unison detune in cents (clamped to 0..=50 when applied).
    pub detune_cents: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            sample_rate: 44100.0,
            chord: "Cm7".to_string(),
            waveform: Waveform::Sine,
            unison_count: 1,
            detune_cents: DEFAULT_DETUNE_CENTS,
        }
    }
}

impl SynthConfig {
    pub fn from_json(json: &str) -> Result<Self, ChordSynthError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<(), ChordSynthError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ChordSynthError::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        Ok(())
    }

    /// Build a ready player: resolves the chord, applies every setting and
    /// starts from zero phase.
    pub fn build_player(&self, library: &ChordLibrary) -> Result<ChordPlayer, ChordSynthError> {
        self.validate()?;
        let chord = library.require_chord(&self.chord)?;

        let mut player = ChordPlayer::new();
        player.init(self.sample_rate);
        player.set_chord(Some(chord));
        player.set_waveform(self.waveform);
        player.set_unison_count(self.unison_count);
        player.set_base_detune_cents(self.detune_cents);
        player.reset();

        if !player.increments_in_range() {
            return Err(ChordSynthError::InvalidConfig(format!(
                "chord '{}' has notes at or above the {} Hz sample rate",
                self.chord, self.sample_rate
            )));
        }

        log::info!(
            "player ready: {} {} x{} ({:.1} cents) @ {} Hz",
            self.chord,
            self.waveform,
            player.unison().voice_count(),
            player.unison().detune_cents(),
            self.sample_rate
        );
        Ok(player)
    }
}
