//! Unison: detuned copies of each chord note.
//!
//! The spread layout is a fixed per-count table rather than linear spacing:
//!
//! | voices | offsets (× base detune `d`)      |
//! |--------|----------------------------------|
//! | 1      | `0`                              |
//! | 2      | `-d, +d`                         |
//! | 3      | `-d, 0, +d`                      |
//! | 4      | `-1.5d, -0.5d, +0.5d, +1.5d`     |

/// Maximum unison voices per chord note.
pub const MAX_UNISON_VOICES: usize = 4;

pub const DEFAULT_DETUNE_CENTS: f64 = 7.0;
pub const MAX_DETUNE_CENTS: f64 = 50.0;

/// Detune changes smaller than this are treated as no change.
const DETUNE_TOLERANCE: f64 = 0.001;

/// Convert a pitch offset in cents to a frequency multiplier.
pub fn cents_to_ratio(cents: f64) -> f64 {
    2.0_f64.powf(cents / 1200.0)
}

/// Voice count, base detune, and the frequency ratios derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct UnisonEngine {
    voice_count: usize,
    detune_cents: f64,
    ratios: [f64; MAX_UNISON_VOICES],
}

impl Default for UnisonEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UnisonEngine {
    /// One voice, 7 cents base detune.
    pub fn new() -> Self {
        let mut engine = UnisonEngine {
            voice_count: 1,
            detune_cents: DEFAULT_DETUNE_CENTS,
            ratios: [1.0; MAX_UNISON_VOICES],
        };
        engine.recalculate();
        engine
    }

    pub fn voice_count(&self) -> usize {
        self.voice_count
    }

    pub fn detune_cents(&self) -> f64 {
        self.detune_cents
    }

    /// One ratio per active unison voice.
    pub fn ratios(&self) -> &[f64] {
        &self.ratios[..self.voice_count]
    }

    /// Set the voice count, clamped to 1..=4. Returns `true` if the ratios
    /// were recomputed.
    pub fn set_voice_count(&mut self, count: i32) -> bool {
        let count = count.clamp(1, MAX_UNISON_VOICES as i32) as usize;
        if count == self.voice_count {
            return false;
        }
        self.voice_count = count;
        self.recalculate();
        true
    }

    /// Set the base detune, clamped to 0..=50 cents. Returns `true` if the
    /// ratios were recomputed. NaN is ignored.
    pub fn set_base_detune_cents(&mut self, cents: f64) -> bool {
        if cents.is_nan() {
            return false;
        }
        let cents = cents.clamp(0.0, MAX_DETUNE_CENTS);
        if (cents - self.detune_cents).abs() < DETUNE_TOLERANCE {
            return false;
        }
        self.detune_cents = cents;
        self.recalculate();
        true
    }

    fn recalculate(&mut self) {
        let d = self.detune_cents;
        match self.voice_count {
            1 => {
                self.ratios[0] = 1.0;
            }
            2 => {
                self.ratios[0] = cents_to_ratio(-d);
                self.ratios[1] = cents_to_ratio(d);
            }
            3 => {
                self.ratios[0] = cents_to_ratio(-d);
                self.ratios[1] = 1.0;
                self.ratios[2] = cents_to_ratio(d);
            }
            _ => {
                self.ratios[0] = cents_to_ratio(-1.5 * d);
                self.ratios[1] = cents_to_ratio(-0.5 * d);
                self.ratios[2] = cents_to_ratio(0.5 * d);
                self.ratios[3] = cents_to_ratio(1.5 * d);
            }
        }
    }
}
