use std::fmt;

#[derive(Debug)]
pub enum ChordSynthError {
    Json(serde_json::Error),
    UnknownChord { name: String },
    UnknownProgression { name: String },
    InvalidChord { name: String, reason: String },
    InvalidConfig(String),
    QueueFull,
}

impl fmt::Display for ChordSynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChordSynthError::Json(e) => write!(f, "JSON error: {e}"),
            ChordSynthError::UnknownChord { name } => write!(f, "Unknown chord '{name}'"),
            ChordSynthError::UnknownProgression { name } => {
                write!(f, "Unknown progression '{name}'")
            }
            ChordSynthError::InvalidChord { name, reason } => {
                write!(f, "Invalid chord '{name}': {reason}")
            }
            ChordSynthError::InvalidConfig(msg) => write!(f, "Invalid config: {msg}"),
            ChordSynthError::QueueFull => {
                write!(f, "Command queue full - audio context may be stalled")
            }
        }
    }
}

impl std::error::Error for ChordSynthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChordSynthError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ChordSynthError {
    fn from(e: serde_json::Error) -> Self {
        ChordSynthError::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_chord() {
        let e = ChordSynthError::UnknownChord { name: "Xm9".to_string() };
        assert_eq!(format!("{e}"), "Unknown chord 'Xm9'");
    }

    #[test]
    fn json_error_converts() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let e: ChordSynthError = err.into();
        assert!(matches!(e, ChordSynthError::Json(_)));
        assert!(std::error::Error::source(&e).is_some());
    }
}
