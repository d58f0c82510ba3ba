//! Tuning systems: equal temperament and custom frequency-ratio tables.
//!
//! A custom temperament is a per-octave list of spelled pitches with
//! frequency ratios, anchored at a voice's starting pitch. The classic
//! historical tunings are available as presets.

use serde::{Deserialize, Serialize};

use crate::error::PitchError;
use crate::pitch::{Accidental, Letter};

/// The tuning system mapping pitch classes to frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Temperament {
    /// Twelve-tone equal temperament.
    Equal,
    /// A custom per-octave ratio table.
    Custom(CustomTemperament),
}

impl Temperament {
    pub fn is_custom(&self) -> bool {
        matches!(self, Temperament::Custom(_))
    }
}

/// One pitch of a custom temperament's octave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperamentEntry {
    pub letter: Letter,
    pub accidental: Accidental,
    /// Frequency ratio to the octave's anchor pitch, in [1, 2).
    pub ratio: f64,
}

impl TemperamentEntry {
    pub fn new(letter: Letter, accidental: Accidental, ratio: f64) -> Self {
        Self {
            letter,
            accidental,
            ratio,
        }
    }

    fn pitch_class(&self) -> i32 {
        (self.letter.natural_pitch_class() + self.accidental.offset()).rem_euclid(12)
    }
}

/// A named custom temperament table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTemperament {
    name: String,
    entries: Vec<TemperamentEntry>,
}

impl CustomTemperament {
    /// Build a custom temperament from its octave table.
    ///
    /// # Errors
    /// `InvalidArgument` if the table is empty or an entry's ratio is not a
    /// finite positive number.
    pub fn new(name: &str, entries: Vec<TemperamentEntry>) -> Result<Self, PitchError> {
        if entries.is_empty() {
            return Err(PitchError::InvalidArgument(format!(
                "temperament '{name}' has no entries"
            )));
        }
        for entry in &entries {
            if !entry.ratio.is_finite() || entry.ratio <= 0.0 {
                return Err(PitchError::InvalidArgument(format!(
                    "temperament '{name}' has ratio {}",
                    entry.ratio
                )));
            }
        }
        Ok(Self {
            name: name.to_string(),
            entries,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of pitches per octave.
    pub fn note_count(&self) -> usize {
        self.entries.len()
    }

    /// Table entry at a position within the octave.
    pub fn entry(&self, index: usize) -> &TemperamentEntry {
        &self.entries[index % self.entries.len()]
    }

    /// Position of a spelled pitch in the table, falling back to a pitch
    /// class match for enharmonic spellings.
    pub fn position_of(&self, letter: Letter, accidental: Accidental) -> Option<usize> {
        if let Some(idx) = self
            .entries
            .iter()
            .position(|e| e.letter == letter && e.accidental == accidental)
        {
            return Some(idx);
        }
        let pc = (letter.natural_pitch_class() + accidental.offset()).rem_euclid(12);
        self.entries.iter().position(|e| e.pitch_class() == pc)
    }

    /// Five-limit just intonation.
    pub fn just_intonation() -> Self {
        Self::from_ratios(
            "just intonation",
            &[
                1.0,
                16.0 / 15.0,
                9.0 / 8.0,
                6.0 / 5.0,
                5.0 / 4.0,
                4.0 / 3.0,
                45.0 / 32.0,
                3.0 / 2.0,
                8.0 / 5.0,
                5.0 / 3.0,
                16.0 / 9.0,
                15.0 / 8.0,
            ],
        )
    }

    /// Pythagorean (three-limit) tuning.
    pub fn pythagorean() -> Self {
        Self::from_ratios(
            "Pythagorean",
            &[
                1.0,
                256.0 / 243.0,
                9.0 / 8.0,
                32.0 / 27.0,
                81.0 / 64.0,
                4.0 / 3.0,
                729.0 / 512.0,
                3.0 / 2.0,
                128.0 / 81.0,
                27.0 / 16.0,
                16.0 / 9.0,
                243.0 / 128.0,
            ],
        )
    }

    /// Quarter-comma meantone, the sixteenth-century keyboard standard.
    pub fn meantone_quarter_comma() -> Self {
        // Fifths narrowed so that four of them make a pure 5/4 major third.
        let fifth = 5.0_f64.powf(0.25);
        let ratios: Vec<f64> = [0, 7, 2, -3, 4, -1, 6, 1, 8, 3, -2, 5]
            .iter()
            .map(|&fifths: &i32| {
                let mut r = fifth.powi(fifths);
                while r >= 2.0 {
                    r /= 2.0;
                }
                while r < 1.0 {
                    r *= 2.0;
                }
                r
            })
            .collect();
        Self::from_ratios("1/4 comma meantone", &ratios)
    }

    fn from_ratios(name: &str, ratios: &[f64]) -> Self {
        // Chromatic spellings matching the historical tables: sharps on the
        // upper chromatics except the flat-side Eb/Ab/Bb of meantone usage.
        const SPELLINGS: [(Letter, Accidental); 12] = [
            (Letter::C, Accidental::Natural),
            (Letter::C, Accidental::Sharp),
            (Letter::D, Accidental::Natural),
            (Letter::E, Accidental::Flat),
            (Letter::E, Accidental::Natural),
            (Letter::F, Accidental::Natural),
            (Letter::F, Accidental::Sharp),
            (Letter::G, Accidental::Natural),
            (Letter::G, Accidental::Sharp),
            (Letter::A, Accidental::Natural),
            (Letter::B, Accidental::Flat),
            (Letter::B, Accidental::Natural),
        ];
        let entries = SPELLINGS
            .iter()
            .zip(ratios.iter())
            .map(|(&(letter, accidental), &ratio)| TemperamentEntry::new(letter, accidental, ratio))
            .collect();
        Self {
            name: name.to_string(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_rejected() {
        assert!(CustomTemperament::new("empty", Vec::new()).is_err());
    }

    #[test]
    fn test_bad_ratio_rejected() {
        let entries = vec![TemperamentEntry::new(Letter::C, Accidental::Natural, -1.0)];
        assert!(CustomTemperament::new("bad", entries).is_err());
    }

    #[test]
    fn test_presets_cover_octave() {
        for table in [
            CustomTemperament::just_intonation(),
            CustomTemperament::pythagorean(),
            CustomTemperament::meantone_quarter_comma(),
        ] {
            assert_eq!(table.note_count(), 12);
            assert!((table.entry(0).ratio - 1.0).abs() < 1e-12);
            for i in 0..12 {
                let r = table.entry(i).ratio;
                assert!((1.0..2.0).contains(&r), "{}: ratio {r} out of range", table.name());
            }
        }
    }

    #[test]
    fn test_just_fifth_is_pure() {
        let just = CustomTemperament::just_intonation();
        let idx = just.position_of(Letter::G, Accidental::Natural).unwrap();
        assert!((just.entry(idx).ratio - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_position_of_enharmonic_fallback() {
        let just = CustomTemperament::just_intonation();
        // D# is spelled Eb in the table; the pitch class match finds it.
        let idx = just.position_of(Letter::D, Accidental::Sharp).unwrap();
        assert_eq!(idx, 3);
    }
}
