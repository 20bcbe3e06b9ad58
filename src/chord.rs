//! Chord library: three-note voicings and the progressions built from them.
//!
//! Chords are immutable once created and shared by `Arc`; players hold a
//! reference and never edit it. The JSON layout mirrors the in-memory one:
//!
//! ```json
//! {
//!   "chords": [{ "name": "Cm7", "notes": [261.63, 622.25, 932.33], "description": "..." }],
//!   "progressions": [{ "name": "Minor", "chords": ["Cm7"] }]
//! }
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ChordSynthError;

/// Notes per chord voicing.
pub const NOTES_PER_CHORD: usize = 3;

/// Note frequencies in Hz (scientific pitch notation).
pub mod note_freq {
    // Octave 4
    pub const C4: f64 = 261.63;
    pub const DB4: f64 = 277.18;
    pub const D4: f64 = 293.66;
    pub const EB4: f64 = 311.13;
    pub const E4: f64 = 329.63;
    pub const F4: f64 = 349.23;
    pub const GB4: f64 = 369.99;
    pub const G4: f64 = 392.00;
    pub const AB4: f64 = 415.30;
    pub const A4: f64 = 440.00;
    pub const BB4: f64 = 466.16;
    pub const B4: f64 = 493.88;

    // Octave 5
    pub const C5: f64 = 523.25;
    pub const DB5: f64 = 554.37;
    pub const D5: f64 = 587.33;
    pub const EB5: f64 = 622.25;
    pub const E5: f64 = 659.25;
    pub const F5: f64 = 698.46;
    pub const GB5: f64 = 739.99;
    pub const G5: f64 = 783.99;
    pub const AB5: f64 = 830.61;
    pub const A5: f64 = 880.00;
    pub const BB5: f64 = 932.33;
    pub const B5: f64 = 987.77;

    // Octave 6
    pub const C6: f64 = 1046.50;
    pub const DB6: f64 = 1108.73;
    pub const D6: f64 = 1174.66;
    pub const EB6: f64 = 1244.51;
    pub const E6: f64 = 1318.51;
    pub const F6: f64 = 1396.91;
    pub const GB6: f64 = 1479.98;
    pub const G6: f64 = 1567.98;
    pub const AB6: f64 = 1661.22;
    pub const A6: f64 = 1760.00;
    pub const BB6: f64 = 1864.66;
    pub const B6: f64 = 1975.53;
}

use note_freq::*;

/// A fixed three-note voicing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chord {
    /// Display name (e.g. "Cm7").
    pub name: Cow<'static, str>,
    /// Note frequencies in Hz, lowest voice first.
    pub notes: [f64; NOTES_PER_CHORD],
    /// Free-form description of the voicing.
    #[serde(default)]
    pub description: Cow<'static, str>,
}

impl Chord {
    pub const fn new_static(
        name: &'static str,
        notes: [f64; NOTES_PER_CHORD],
        description: &'static str,
    ) -> Self {
        Chord {
            name: Cow::Borrowed(name),
            notes,
            description: Cow::Borrowed(description),
        }
    }

    pub fn new(name: impl Into<String>, notes: [f64; NOTES_PER_CHORD]) -> Self {
        Chord {
            name: Cow::Owned(name.into()),
            notes,
            description: Cow::Borrowed(""),
        }
    }

    /// Every note must be a finite, positive frequency.
    pub fn is_playable(&self) -> bool {
        self.notes.iter().all(|f| f.is_finite() && *f > 0.0)
    }

    pub fn validate(&self) -> Result<(), ChordSynthError> {
        if self.is_playable() {
            Ok(())
        } else {
            Err(ChordSynthError::InvalidChord {
                name: self.name.to_string(),
                reason: format!("notes must be finite and positive, got {:?}", self.notes),
            })
        }
    }
}

// ── Built-in voicings ───────────────────────────────────────
// Three-note voicings spread wide for clarity on small speakers.

pub const CM7: Chord = Chord::new_static("Cm7", [C4, EB5, BB5], "C4 + Eb5 + Bb5 (wide voicing)");
pub const EBMAJ7: Chord = Chord::new_static("Ebmaj7", [EB5, G5, D6], "Eb5 + G5 + D6");
pub const ABMAJ7: Chord = Chord::new_static("Abmaj7", [AB5, C6, G6], "Ab5 + C6 + G6");
pub const GMAJ7: Chord = Chord::new_static("Gmaj7", [G4, B5, GB6], "G4 + B5 + F#6");
pub const DM7: Chord = Chord::new_static("Dm7", [D4, F5, C6], "D4 + F5 + C6");
pub const FMAJ7: Chord = Chord::new_static("Fmaj7", [F4, A5, E6], "F4 + A5 + E6");

/// A named sequence of chords, referenced by chord name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    pub name: String,
    pub chords: Vec<String>,
}

/// Serialized form of a `ChordLibrary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordLibraryDescriptor {
    pub chords: Vec<Chord>,
    #[serde(default)]
    pub progressions: Vec<Progression>,
}

/// Lookup of shared chords and progressions.
#[derive(Debug, Clone, Default)]
pub struct ChordLibrary {
    chords: Vec<Arc<Chord>>,
    progressions: Vec<Progression>,
}

impl ChordLibrary {
    /// The six built-in voicings and two progressions.
    pub fn builtin() -> Self {
        let chords = [CM7, EBMAJ7, ABMAJ7, GMAJ7, DM7, FMAJ7]
            .into_iter()
            .map(Arc::new)
            .collect();
        let progressions = vec![
            Progression {
                name: "Jazz 1".to_string(),
                // Abmaj7 plays twice
                chords: ["Ebmaj7", "Cm7", "Abmaj7", "Abmaj7"].map(String::from).to_vec(),
            },
            Progression {
                name: "Major 2-5-1".to_string(),
                chords: ["Dm7", "Gmaj7", "Cm7"].map(String::from).to_vec(),
            },
        ];
        ChordLibrary { chords, progressions }
    }

    /// Build a library from a descriptor, rejecting unplayable chords and
    /// progressions that name unknown chords.
    pub fn from_descriptor(descriptor: ChordLibraryDescriptor) -> Result<Self, ChordSynthError> {
        for chord in &descriptor.chords {
            chord.validate()?;
        }
        let library = ChordLibrary {
            chords: descriptor.chords.into_iter().map(Arc::new).collect(),
            progressions: descriptor.progressions,
        };
        for progression in &library.progressions {
            library.progression(&progression.name)?;
        }
        log::debug!(
            "loaded chord library: {} chords, {} progressions",
            library.chords.len(),
            library.progressions.len()
        );
        Ok(library)
    }

    pub fn from_json(json: &str) -> Result<Self, ChordSynthError> {
        let descriptor: ChordLibraryDescriptor = serde_json::from_str(json)?;
        Self::from_descriptor(descriptor)
    }

    pub fn to_descriptor(&self) -> ChordLibraryDescriptor {
        ChordLibraryDescriptor {
            chords: self.chords.iter().map(|c| Chord::clone(c)).collect(),
            progressions: self.progressions.clone(),
        }
    }

    /// Find a chord by exact name.
    pub fn chord(&self, name: &str) -> Option<Arc<Chord>> {
        self.chords.iter().find(|c| c.name == name).cloned()
    }

    pub fn require_chord(&self, name: &str) -> Result<Arc<Chord>, ChordSynthError> {
        self.chord(name).ok_or_else(|| ChordSynthError::UnknownChord {
            name: name.to_string(),
        })
    }

    pub fn chords(&self) -> &[Arc<Chord>] {
        &self.chords
    }

    pub fn progression_names(&self) -> impl Iterator<Item = &str> {
        self.progressions.iter().map(|p| p.name.as_str())
    }

    /// Resolve a progression to its chords, in play order.
    pub fn progression(&self, name: &str) -> Result<Vec<Arc<Chord>>, ChordSynthError> {
        let progression = self
            .progressions
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ChordSynthError::UnknownProgression {
                name: name.to_string(),
            })?;
        progression
            .chords
            .iter()
            .map(|chord_name| self.require_chord(chord_name))
            .collect()
    }
}
