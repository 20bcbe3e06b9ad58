//! Wavetables: one period of each waveform, quantized to i16.
//!
//! All four tables are built once and shared read-only by every player.
//! Lookup is naive (no interpolation, no band-limiting); aliasing at high
//! harmonics is accepted.

use std::f64::consts::PI;
use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Deserializer, Serialize};

/// Entries per table (one waveform period).
pub const TABLE_SIZE: usize = 256;

/// Peak amplitude stored in the tables. Also the total mixing headroom:
/// a player never sums to more than this.
pub const REFERENCE_PEAK: i16 = 14000;

/// Number of waveform shapes.
pub const WAVEFORM_COUNT: usize = 4;

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl Waveform {
    /// All shapes in tag order.
    pub const ALL: [Waveform; WAVEFORM_COUNT] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Square,
        Waveform::Sawtooth,
    ];

    /// Map a raw tag to a shape. Unknown tags fall back to `Sine`.
    pub fn from_tag(tag: i32) -> Self {
        match tag {
            1 => Waveform::Triangle,
            2 => Waveform::Square,
            3 => Waveform::Sawtooth,
            _ => Waveform::Sine,
        }
    }

    /// Parse a waveform name. Unknown names fall back to `Sine`.
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "triangle" | "tri" => Waveform::Triangle,
            "square" | "sqr" => Waveform::Square,
            "sawtooth" | "saw" => Waveform::Sawtooth,
            _ => Waveform::Sine,
        }
    }

    pub fn tag(self) -> i32 {
        self.index() as i32
    }

    fn index(self) -> usize {
        match self {
            Waveform::Sine => 0,
            Waveform::Triangle => 1,
            Waveform::Square => 2,
            Waveform::Sawtooth => 3,
        }
    }

    /// The next shape in cycle order, wrapping back to `Sine`.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % WAVEFORM_COUNT]
    }

    /// Abbreviated label for small displays.
    pub fn short_name(self) -> &'static str {
        match self {
            Waveform::Sine => "SINE",
            Waveform::Triangle => "TRI",
            Waveform::Square => "SQR",
            Waveform::Sawtooth => "SAW",
        }
    }

    /// Normalized value in [-1, 1] at `phase` in [0, 1).
    fn evaluate(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (2.0 * PI * phase).sin(),
            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl<'de> Deserialize<'de> for Waveform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Waveform::from_name(&name))
    }
}

/// Four immutable lookup tables, indexed by waveform.
#[derive(Debug, Clone)]
pub struct WaveformTable {
    tables: [[i16; TABLE_SIZE]; WAVEFORM_COUNT],
}

static SHARED: LazyLock<Arc<WaveformTable>> = LazyLock::new(|| Arc::new(WaveformTable::build()));

impl WaveformTable {
    /// Fill every table at `REFERENCE_PEAK`.
    pub fn build() -> Self {
        let mut tables = [[0i16; TABLE_SIZE]; WAVEFORM_COUNT];
        for waveform in Waveform::ALL {
            let table = &mut tables[waveform.index()];
            for (i, entry) in table.iter_mut().enumerate() {
                let phase = i as f64 / TABLE_SIZE as f64;
                // `as` truncates toward zero
                *entry = (waveform.evaluate(phase) * REFERENCE_PEAK as f64) as i16;
            }
        }
        WaveformTable { tables }
    }

    /// The process-wide table instance.
    pub fn shared() -> Arc<WaveformTable> {
        Arc::clone(&SHARED)
    }

    /// Raw table value. `index` is taken modulo `TABLE_SIZE`.
    #[inline]
    pub fn sample(&self, waveform: Waveform, index: usize) -> i16 {
        self.tables[waveform.index()][index % TABLE_SIZE]
    }

    /// Table value rescaled from `REFERENCE_PEAK` to `target_peak`,
    /// truncating toward zero.
    #[inline]
    pub fn scaled_sample(&self, waveform: Waveform, index: usize, target_peak: i16) -> i16 {
        let raw = self.sample(waveform, index) as i32;
        (raw * target_peak as i32 / REFERENCE_PEAK as i32) as i16
    }

    /// The whole table for one shape.
    pub fn table(&self, waveform: Waveform) -> &[i16; TABLE_SIZE] {
        &self.tables[waveform.index()]
    }

    /// Closed-form waveform value at an arbitrary phase in radians, for
    /// visualization. Shape matches the tables but is not quantized.
    /// Non-finite phases give 0.
    pub fn display_value(waveform: Waveform, phase_radians: f64) -> f64 {
        if !phase_radians.is_finite() {
            return 0.0;
        }
        let normalized = phase_radians.rem_euclid(2.0 * PI) / (2.0 * PI);
        // rem_euclid can round up to exactly 2π for tiny negative inputs
        let normalized = if normalized >= 1.0 { 0.0 } else { normalized };
        waveform.evaluate(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_starts_at_zero() {
        let t = WaveformTable::build();
        assert_eq!(t.sample(Waveform::Sine, 0), 0);
        assert_eq!(t.sample(Waveform::Sine, TABLE_SIZE / 4), REFERENCE_PEAK);
    }

    #[test]
    fn tables_stay_within_reference_peak() {
        let t = WaveformTable::build();
        for w in Waveform::ALL {
            for &s in t.table(w) {
                assert!(s.abs() <= REFERENCE_PEAK, "{w} out of range: {s}");
            }
        }
    }

    #[test]
    fn square_is_exact_peak() {
        let t = WaveformTable::build();
        assert_eq!(t.sample(Waveform::Square, 0), REFERENCE_PEAK);
        assert_eq!(t.sample(Waveform::Square, TABLE_SIZE / 2 - 1), REFERENCE_PEAK);
        assert_eq!(t.sample(Waveform::Square, TABLE_SIZE / 2), -REFERENCE_PEAK);
        assert_eq!(t.sample(Waveform::Square, TABLE_SIZE - 1), -REFERENCE_PEAK);
    }

    #[test]
    fn triangle_is_continuous_at_wrap() {
        let t = WaveformTable::build();
        assert_eq!(t.sample(Waveform::Triangle, 0), -REFERENCE_PEAK);
        assert_eq!(t.sample(Waveform::Triangle, TABLE_SIZE / 2), REFERENCE_PEAK);
        let last = t.sample(Waveform::Triangle, TABLE_SIZE - 1) as i32;
        let first = t.sample(Waveform::Triangle, 0) as i32;
        // one table step of a ±peak triangle is 4 * peak / N
        let step = 4 * REFERENCE_PEAK as i32 / TABLE_SIZE as i32 + 1;
        assert!((last - first).abs() <= step, "triangle jumps at wrap: {last} -> {first}");
    }

    #[test]
    fn sawtooth_ramps_up() {
        let t = WaveformTable::build();
        let saw = t.table(Waveform::Sawtooth);
        assert_eq!(saw[0], -REFERENCE_PEAK);
        assert!(saw.windows(2).all(|w| w[1] > w[0]), "sawtooth should rise monotonically");
    }

    #[test]
    fn index_wraps_modulo_table_size() {
        let t = WaveformTable::build();
        assert_eq!(
            t.sample(Waveform::Sawtooth, TABLE_SIZE + 5),
            t.sample(Waveform::Sawtooth, 5)
        );
    }

    #[test]
    fn scaled_sample_rescales_toward_zero() {
        let t = WaveformTable::build();
        assert_eq!(t.scaled_sample(Waveform::Square, 0, 4666), 4666);
        assert_eq!(t.scaled_sample(Waveform::Square, 200, 4666), -4666);
        let raw = t.sample(Waveform::Sine, 10) as i32;
        let expected = (raw * 1166 / REFERENCE_PEAK as i32) as i16;
        assert_eq!(t.scaled_sample(Waveform::Sine, 10, 1166), expected);
    }

    #[test]
    fn display_value_matches_shape() {
        let quarter = PI / 2.0;
        assert!((WaveformTable::display_value(Waveform::Sine, quarter) - 1.0).abs() < 1e-12);
        assert_eq!(WaveformTable::display_value(Waveform::Triangle, 0.0), -1.0);
        assert!((WaveformTable::display_value(Waveform::Triangle, PI) - 1.0).abs() < 1e-12);
        assert_eq!(WaveformTable::display_value(Waveform::Square, 0.1), 1.0);
        assert_eq!(WaveformTable::display_value(Waveform::Square, PI + 0.1), -1.0);
        assert_eq!(WaveformTable::display_value(Waveform::Sawtooth, 0.0), -1.0);
    }

    #[test]
    fn display_value_wraps_any_phase() {
        for w in Waveform::ALL {
            for k in -50..50 {
                let phase = k as f64 * 0.37;
                let v = WaveformTable::display_value(w, phase);
                assert!((-1.0..=1.0).contains(&v), "{w} at {phase}: {v}");
            }
        }
        let v = WaveformTable::display_value(Waveform::Sawtooth, -PI / 2.0);
        assert!((v - 0.5).abs() < 1e-12, "negative phase should wrap, got {v}");
    }

    #[test]
    fn display_value_flat_for_non_finite_phase() {
        for w in Waveform::ALL {
            for phase in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                assert_eq!(WaveformTable::display_value(w, phase), 0.0, "{w} at {phase}");
            }
        }
    }

    #[test]
    fn unknown_tags_fall_back_to_sine() {
        assert_eq!(Waveform::from_tag(2), Waveform::Square);
        assert_eq!(Waveform::from_tag(-1), Waveform::Sine);
        assert_eq!(Waveform::from_tag(42), Waveform::Sine);
        assert_eq!(Waveform::from_name("SAW"), Waveform::Sawtooth);
        assert_eq!(Waveform::from_name("noise"), Waveform::Sine);
    }

    #[test]
    fn next_cycles_through_all_shapes() {
        let mut w = Waveform::Sine;
        let mut seen = Vec::new();
        for _ in 0..WAVEFORM_COUNT {
            seen.push(w);
            w = w.next();
        }
        assert_eq!(w, Waveform::Sine);
        assert_eq!(seen, Waveform::ALL.to_vec());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Waveform::Sawtooth).unwrap();
        assert_eq!(json, "\"sawtooth\"");
        let w: Waveform = serde_json::from_str("\"tri\"").unwrap();
        assert_eq!(w, Waveform::Triangle);
    }

    #[test]
    fn shared_table_is_one_instance() {
        let a = WaveformTable::shared();
        let b = WaveformTable::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
