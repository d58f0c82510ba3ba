//! Interval resolution.
//!
//! Chromatic intervals are named semitone constants independent of key;
//! scalar intervals are scale-degree counts translated to semitones by
//! walking step sizes from a reference pitch.

use crate::error::PitchError;
use crate::key::KeySignature;
use crate::pitch::{Accidental, Letter};

/// Named chromatic intervals and their semitone values.
const INTERVAL_SEMITONES: [(&str, i32); 27] = [
    ("unison", 0),
    ("perfect 1", 0),
    ("augmented 1", 1),
    ("diminished 2", 0),
    ("minor 2", 1),
    ("major 2", 2),
    ("augmented 2", 3),
    ("diminished 3", 2),
    ("minor 3", 3),
    ("major 3", 4),
    ("augmented 3", 5),
    ("diminished 4", 4),
    ("perfect 4", 5),
    ("augmented 4", 6),
    ("diminished 5", 6),
    ("perfect 5", 7),
    ("augmented 5", 8),
    ("diminished 6", 7),
    ("minor 6", 8),
    ("major 6", 9),
    ("augmented 6", 10),
    ("diminished 7", 9),
    ("minor 7", 10),
    ("major 7", 11),
    ("augmented 7", 12),
    ("diminished 8", 11),
    ("perfect 8", 12),
];

/// Semitone value of a named chromatic interval ("major 3", "perfect 5").
///
/// # Errors
/// `InvalidArgument` for a name outside the recognized set.
pub fn named_interval(name: &str) -> Result<i32, PitchError> {
    let wanted = name.trim().to_lowercase();
    let wanted = match wanted.as_str() {
        "octave" => "perfect 8",
        other => other,
    };
    INTERVAL_SEMITONES
        .iter()
        .find(|(n, _)| *n == wanted)
        .map(|&(_, semitones)| semitones)
        .ok_or_else(|| PitchError::InvalidArgument(format!("unknown interval '{name}'")))
}

/// Semitones spanned by a signed scale-degree count from a reference pitch.
///
/// Walks one step-size lookup per degree so the answer tracks the mode's
/// uneven steps: a third up from C in C major is 4 semitones, from D only 3.
pub fn scalar_interval(degrees: i32, key: &KeySignature, reference: (Letter, Accidental)) -> i32 {
    let mut pc = (reference.0.natural_pitch_class() + reference.1.offset()).rem_euclid(12);
    let mut semitones = 0;
    for _ in 0..degrees.unsigned_abs() {
        let step = if degrees > 0 {
            key.step_up_from_class(pc)
        } else {
            key.step_down_from_class(pc)
        };
        semitones += step;
        pc = (pc + step).rem_euclid(12);
    }
    semitones
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_intervals() {
        assert_eq!(named_interval("unison").unwrap(), 0);
        assert_eq!(named_interval("major 3").unwrap(), 4);
        assert_eq!(named_interval("Perfect 5").unwrap(), 7);
        assert_eq!(named_interval("diminished 7").unwrap(), 9);
        assert_eq!(named_interval("octave").unwrap(), 12);
        assert!(named_interval("grand 11").is_err());
    }

    #[test]
    fn test_scalar_interval_depends_on_degree() {
        let key = KeySignature::default();
        let c = (Letter::C, Accidental::Natural);
        let d = (Letter::D, Accidental::Natural);
        assert_eq!(scalar_interval(2, &key, c), 4); // C-E, major third
        assert_eq!(scalar_interval(2, &key, d), 3); // D-F, minor third
        assert_eq!(scalar_interval(7, &key, c), 12); // octave
        assert_eq!(scalar_interval(-2, &key, c), -3); // C down to A
        assert_eq!(scalar_interval(0, &key, c), 0);
    }

    #[test]
    fn test_scalar_interval_in_minor() {
        let key: KeySignature = "A minor".parse().unwrap();
        let a = (Letter::A, Accidental::Natural);
        assert_eq!(scalar_interval(2, &key, a), 3); // A-C, minor third
        assert_eq!(scalar_interval(4, &key, a), 7); // A-E, perfect fifth
    }
}
