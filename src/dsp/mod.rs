//! DSP: wavetable chord synthesis.
//!
//! `ChordPlayer` produces 16-bit samples from shared `WaveformTable`s and a
//! `UnisonEngine` spread. Drive it directly from the audio context, or split
//! it with `control::split` when settings change on another thread.

pub mod control;
pub mod player;
pub mod renderer;
pub mod unison;
pub mod wavetable;
