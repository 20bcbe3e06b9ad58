//! WAV renderer: renders a configured chord (or progression) to a WAV byte
//! buffer.

use crate::chord::ChordLibrary;
use crate::config::SynthConfig;
use crate::error::ChordSynthError;

use super::player::ChordPlayer;

/// Pull `num_samples` samples from `player`.
pub fn render_pcm_i16(player: &mut ChordPlayer, num_samples: usize) -> Vec<i16> {
    (0..num_samples).map(|_| player.next_sample()).collect()
}

/// WAV header size in bytes.
const HEADER_SIZE: usize = 44;

/// Largest mono 16-bit sample count whose RIFF size fields fit in a u32.
pub const MAX_WAV_SAMPLES: usize = (u32::MAX as usize - (HEADER_SIZE - 8)) / 2;

fn seconds_to_samples(seconds: f64, sample_rate: f64) -> Result<usize, ChordSynthError> {
    // NaN and negatives render nothing
    let samples = seconds.max(0.0) * sample_rate;
    if samples > MAX_WAV_SAMPLES as f64 {
        return Err(ChordSynthError::InvalidConfig(format!(
            "{seconds} s at {sample_rate} Hz is too long for a WAV file"
        )));
    }
    Ok(samples as usize)
}

/// Render `seconds` of the configured chord to a WAV file as bytes
/// (16-bit mono PCM).
pub fn render_wav(
    config: &SynthConfig,
    library: &ChordLibrary,
    seconds: f64,
) -> Result<Vec<u8>, ChordSynthError> {
    let mut player = config.build_player(library)?;
    let num_samples = seconds_to_samples(seconds, config.sample_rate)?;
    let pcm = render_pcm_i16(&mut player, num_samples);
    Ok(encode_wav(&pcm, config.sample_rate.round() as u32, 1))
}

/// Render a progression, holding each chord for `seconds_per_chord`.
/// Every chord change restarts the phases, so each chord begins the same
/// way it would on its own.
pub fn render_progression_wav(
    config: &SynthConfig,
    library: &ChordLibrary,
    progression: &str,
    seconds_per_chord: f64,
) -> Result<Vec<u8>, ChordSynthError> {
    let chords = library.progression(progression)?;
    let mut player = config.build_player(library)?;
    let per_chord = seconds_to_samples(seconds_per_chord, config.sample_rate)?;
    let total = per_chord
        .checked_mul(chords.len())
        .filter(|&n| n <= MAX_WAV_SAMPLES)
        .ok_or_else(|| {
            ChordSynthError::InvalidConfig(format!(
                "progression '{progression}' is too long for a WAV file"
            ))
        })?;

    let mut pcm = Vec::with_capacity(total);
    for chord in chords {
        log::debug!("progression '{progression}': {}", chord.name);
        player.set_chord(Some(chord));
        player.reset();
        if !player.increments_in_range() {
            return Err(ChordSynthError::InvalidConfig(format!(
                "progression '{progression}' has notes at or above the sample rate"
            )));
        }
        pcm.extend((0..per_chord).map(|_| player.next_sample()));
    }
    Ok(encode_wav(&pcm, config.sample_rate.round() as u32, 1))
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer. Callers keep
/// `samples.len()` within `MAX_WAV_SAMPLES`.
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(HEADER_SIZE + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::wavetable::{REFERENCE_PEAK, Waveform};

    fn data_samples(wav: &[u8]) -> Vec<i16> {
        wav[44..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    #[test]
    fn wav_header_valid() {
        let wav = render_wav(&SynthConfig::default(), &ChordLibrary::builtin(), 0.1).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 44100);

        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 1);
    }

    #[test]
    fn wav_size_correct() {
        let wav = render_wav(&SynthConfig::default(), &ChordLibrary::builtin(), 0.5).unwrap();

        // 0.5s = 22050 samples * 1 channel * 2 bytes
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size, 44100);
        assert_eq!(wav.len(), 44 + 44100);
    }

    #[test]
    fn negative_duration_renders_empty() {
        let wav = render_wav(&SynthConfig::default(), &ChordLibrary::builtin(), -3.0).unwrap();
        assert_eq!(wav.len(), 44);
    }

    #[test]
    fn oversized_duration_is_rejected() {
        let lib = ChordLibrary::builtin();
        let cfg = SynthConfig::default();
        for seconds in [1e12, f64::INFINITY] {
            assert!(matches!(
                render_wav(&cfg, &lib, seconds),
                Err(ChordSynthError::InvalidConfig(_))
            ));
        }
        // each chord fits, the whole progression does not
        let per_chord = MAX_WAV_SAMPLES as f64 / 44100.0 / 2.0;
        assert!(matches!(
            render_progression_wav(&cfg, &lib, "Jazz 1", per_chord),
            Err(ChordSynthError::InvalidConfig(_))
        ));
    }

    #[test]
    fn duration_limit_matches_riff_fields() {
        assert_eq!(seconds_to_samples(f64::NAN, 44100.0).unwrap(), 0);
        let longest = (MAX_WAV_SAMPLES - 44100) as f64 / 44100.0;
        assert!(seconds_to_samples(longest, 44100.0).unwrap() <= MAX_WAV_SAMPLES);
        let data_size = MAX_WAV_SAMPLES as u64 * 2;
        assert!(36 + data_size <= u32::MAX as u64);
    }

    #[test]
    fn rendered_audio_is_bounded_and_audible() {
        let cfg = SynthConfig {
            waveform: Waveform::Sawtooth,
            unison_count: 4,
            ..SynthConfig::default()
        };
        let wav = render_wav(&cfg, &ChordLibrary::builtin(), 0.25).unwrap();
        let samples = data_samples(&wav);
        assert!(samples.iter().any(|&s| s != 0), "should not be silent");
        assert!(samples.iter().all(|&s| s.abs() <= REFERENCE_PEAK));
    }

    #[test]
    fn progression_restarts_each_chord() {
        let lib = ChordLibrary::builtin();
        let cfg = SynthConfig {
            waveform: Waveform::Square,
            ..SynthConfig::default()
        };
        let wav = render_progression_wav(&cfg, &lib, "Major 2-5-1", 0.01).unwrap();
        let samples = data_samples(&wav);
        let per_chord = 441;
        assert_eq!(samples.len(), 3 * per_chord);
        // square starts every chord at the positive peak budget
        for k in 0..3 {
            assert_eq!(samples[k * per_chord], 3 * (REFERENCE_PEAK / 3), "chord {k}");
        }
    }

    #[test]
    fn progression_matches_single_chord_render() {
        let lib = ChordLibrary::builtin();
        let cfg = SynthConfig {
            chord: "Ebmaj7".to_string(),
            ..SynthConfig::default()
        };
        let prog = render_progression_wav(&cfg, &lib, "Jazz 1", 0.02).unwrap();
        let single = render_wav(&cfg, &lib, 0.02).unwrap();
        let per_chord = single.len() - 44;
        // first chord of "Jazz 1" is Ebmaj7
        assert_eq!(&prog[44..44 + per_chord], &single[44..]);
    }

    #[test]
    fn unknown_progression_fails() {
        let err = render_progression_wav(
            &SynthConfig::default(),
            &ChordLibrary::builtin(),
            "Nope",
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, ChordSynthError::UnknownProgression { .. }));
    }
}
