pub mod chord;
pub mod config;
pub mod dsp;
pub mod error;

pub use chord::{Chord, ChordLibrary};
pub use config::SynthConfig;
pub use dsp::control::{ControlHandle, RealtimePlayer, SynthCommand};
pub use dsp::player::ChordPlayer;
pub use dsp::unison::UnisonEngine;
pub use dsp::wavetable::{Waveform, WaveformTable};
pub use error::ChordSynthError;

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the chordsynth-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: the built-in chords and progressions as a JS object.
#[wasm_bindgen]
pub fn chord_library() -> Result<JsValue, JsValue> {
    let descriptor = ChordLibrary::builtin().to_descriptor();
    serde_wasm_bindgen::to_value(&descriptor).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render `seconds` of a JSON `SynthConfig` to WAV bytes.
#[wasm_bindgen]
pub fn render_chord_wav(config_json: &str, seconds: f64) -> Result<Vec<u8>, JsValue> {
    let config = SynthConfig::from_json(config_json).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    dsp::renderer::render_wav(&config, &ChordLibrary::builtin(), seconds)
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render a built-in progression to WAV bytes.
#[wasm_bindgen]
pub fn render_progression_wav(
    config_json: &str,
    progression: &str,
    seconds_per_chord: f64,
) -> Result<Vec<u8>, JsValue> {
    let config = SynthConfig::from_json(config_json).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    dsp::renderer::render_progression_wav(
        &config,
        &ChordLibrary::builtin(),
        progression,
        seconds_per_chord,
    )
    .map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed chord player over the built-in library, for AudioWorklet
/// playback. Everything runs on the worklet thread, so no command queue.
#[wasm_bindgen]
pub struct WasmChordSynth {
    player: ChordPlayer,
    library: ChordLibrary,
}

#[wasm_bindgen]
impl WasmChordSynth {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64) -> WasmChordSynth {
        let library = ChordLibrary::builtin();
        let mut player = ChordPlayer::new();
        player.init(sample_rate);
        player.set_chord(library.chord("Cm7"));
        WasmChordSynth { player, library }
    }

    pub fn init(&mut self, sample_rate: f64) {
        self.player.init(sample_rate);
    }

    /// Select a chord by name. Unknown names keep the current chord.
    pub fn set_chord(&mut self, name: &str) -> bool {
        self.player.set_chord(self.library.chord(name))
    }

    pub fn set_waveform(&mut self, tag: i32) {
        self.player.set_waveform_tag(tag);
    }

    /// Advance to the next waveform and return its tag.
    pub fn next_waveform(&mut self) -> i32 {
        let next = self.player.waveform().next();
        self.player.set_waveform(next);
        next.tag()
    }

    pub fn waveform_name(&self) -> String {
        self.player.waveform().short_name().to_string()
    }

    pub fn chord_name(&self) -> String {
        self.player
            .chord()
            .map(|c| c.name.to_string())
            .unwrap_or_default()
    }

    pub fn set_unison_count(&mut self, count: i32) {
        self.player.set_unison_count(count);
    }

    pub fn set_base_detune_cents(&mut self, cents: f64) {
        self.player.set_base_detune_cents(cents);
    }

    pub fn reset(&mut self) {
        self.player.reset();
    }

    pub fn next_sample(&mut self) -> i16 {
        self.player.next_sample()
    }

    /// Pull `len` samples.
    pub fn fill(&mut self, len: usize) -> Vec<i16> {
        dsp::renderer::render_pcm_i16(&mut self.player, len)
    }

    pub fn display_value(&self, time: f64) -> f64 {
        self.player.display_value(time)
    }
}
