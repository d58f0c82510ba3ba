//! Key signatures, modes, and diatonic step sizes.
//!
//! A key signature is a spelled tonic plus a mode. The scale is built with
//! one letter per degree, so F# major contains E# and Ab major contains Db.
//! Step-size lookups answer "how many semitones to the adjacent scale
//! degree", the primitive that moveable-do transposition, scalar intervals,
//! and scalar delta conversion are all built on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PitchError;
use crate::pitch::{parse_pitch_name, spell_pitch_class, Accidental, Letter};

/// Iteration guard for semitone-to-scalar conversion.
const MAX_SCALAR_STEPS: usize = 100;

/// Diatonic modes, each with a seven-step half-step pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    HarmonicMinor,
    MelodicMinor,
}

impl Mode {
    /// Semitone steps between successive scale degrees.
    pub fn half_steps(self) -> [i32; 7] {
        match self {
            Mode::Major => [2, 2, 1, 2, 2, 2, 1],
            Mode::Minor => [2, 1, 2, 2, 1, 2, 2],
            Mode::Dorian => [2, 1, 2, 2, 2, 1, 2],
            Mode::Phrygian => [1, 2, 2, 2, 1, 2, 2],
            Mode::Lydian => [2, 2, 2, 1, 2, 2, 1],
            Mode::Mixolydian => [2, 2, 1, 2, 2, 1, 2],
            Mode::Locrian => [1, 2, 2, 1, 2, 2, 2],
            Mode::HarmonicMinor => [2, 1, 2, 2, 1, 3, 1],
            Mode::MelodicMinor => [2, 1, 2, 2, 2, 2, 1],
        }
    }

    /// Resolve a mode name, accepting the Greek aliases.
    pub fn from_name(name: &str) -> Option<Mode> {
        match name.trim().to_lowercase().as_str() {
            "major" | "ionian" => Some(Mode::Major),
            "minor" | "aeolian" | "natural minor" => Some(Mode::Minor),
            "dorian" => Some(Mode::Dorian),
            "phrygian" => Some(Mode::Phrygian),
            "lydian" => Some(Mode::Lydian),
            "mixolydian" => Some(Mode::Mixolydian),
            "locrian" => Some(Mode::Locrian),
            "harmonic minor" => Some(Mode::HarmonicMinor),
            "melodic minor" => Some(Mode::MelodicMinor),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
            Mode::Locrian => "locrian",
            Mode::HarmonicMinor => "harmonic minor",
            Mode::MelodicMinor => "melodic minor",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A spelled tonic plus a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeySignature {
    pub tonic_letter: Letter,
    pub tonic_accidental: Accidental,
    pub mode: Mode,
}

impl KeySignature {
    pub fn new(tonic_letter: Letter, tonic_accidental: Accidental, mode: Mode) -> Self {
        Self {
            tonic_letter,
            tonic_accidental,
            mode,
        }
    }

    /// Pitch class of the tonic.
    pub fn tonic_pitch_class(&self) -> i32 {
        (self.tonic_letter.natural_pitch_class() + self.tonic_accidental.offset()).rem_euclid(12)
    }

    /// The seven spelled scale degrees, tonic first.
    ///
    /// Each degree takes the next letter in scale order; the accidental is
    /// whatever the mode's step pattern demands for that letter.
    pub fn scale(&self) -> [(Letter, Accidental); 7] {
        let steps = self.mode.half_steps();
        let tonic_pc = self.tonic_pitch_class();
        let flat_bias = self.tonic_accidental.offset() < 0;
        std::array::from_fn(|degree| {
            let letter = Letter::from_index(self.tonic_letter.index() + degree);
            let target_pc = (tonic_pc + steps[..degree].iter().sum::<i32>()).rem_euclid(12);
            let mut diff = (target_pc - letter.natural_pitch_class()).rem_euclid(12);
            if diff > 6 {
                diff -= 12;
            }
            match Accidental::from_offset(diff) {
                Some(accidental) => (letter, accidental),
                // Degrees beyond double accidentals respell chromatically.
                None => spell_pitch_class(target_pc, flat_bias),
            }
        })
    }

    /// Pitch classes of the scale degrees, tonic first.
    pub fn scale_pitch_classes(&self) -> [i32; 7] {
        self.scale()
            .map(|(l, a)| (l.natural_pitch_class() + a.offset()).rem_euclid(12))
    }

    /// Scale degree (0-6) of a pitch class, if it is in the scale.
    pub fn degree_of(&self, pitch_class: i32) -> Option<usize> {
        self.scale_pitch_classes()
            .iter()
            .position(|&pc| pc == pitch_class.rem_euclid(12))
    }

    /// The key's own spelling of a pitch class, if the class is diatonic.
    pub fn spelling_for_pitch_class(&self, pitch_class: i32) -> Option<(Letter, Accidental)> {
        let degree = self.degree_of(pitch_class)?;
        Some(self.scale()[degree])
    }

    /// Whether chromatic pitches outside the scale should prefer flat names.
    pub fn prefers_flats(&self) -> bool {
        self.scale().iter().any(|(_, a)| a.offset() < 0)
    }

    /// Semitones up to the next scale degree.
    ///
    /// A pitch class absent from the scale measures from where it sits to
    /// the next scale member above (the nearest enclosing degree). Always
    /// positive.
    pub fn step_size_up(&self, letter: Letter, accidental: Accidental) -> i32 {
        let pc = (letter.natural_pitch_class() + accidental.offset()).rem_euclid(12);
        self.step_up_from_class(pc)
    }

    /// Semitones down to the previous scale degree. Always negative.
    pub fn step_size_down(&self, letter: Letter, accidental: Accidental) -> i32 {
        let pc = (letter.natural_pitch_class() + accidental.offset()).rem_euclid(12);
        self.step_down_from_class(pc)
    }

    pub(crate) fn step_up_from_class(&self, pitch_class: i32) -> i32 {
        let members = self.scale_pitch_classes();
        for d in 1..=12 {
            if members.contains(&(pitch_class + d).rem_euclid(12)) {
                return d;
            }
        }
        12
    }

    pub(crate) fn step_down_from_class(&self, pitch_class: i32) -> i32 {
        let members = self.scale_pitch_classes();
        for d in 1..=12 {
            if members.contains(&(pitch_class - d).rem_euclid(12)) {
                return -d;
            }
        }
        -12
    }

    /// Convert a semitone delta to scale-degree steps, walking one degree at
    /// a time from `start`.
    ///
    /// Exact for deltas that land on scale degrees; a delta that overshoots
    /// stops once the walk has crossed it. Bounded, so pathological inputs
    /// cannot loop.
    pub fn scalar_distance(&self, start: (Letter, Accidental), semitones: i32) -> i32 {
        let mut remaining = semitones;
        let mut scalar = 0;
        let mut pc = (start.0.natural_pitch_class() + start.1.offset()).rem_euclid(12);
        let mut guard = 0;
        while remaining > 0 && guard < MAX_SCALAR_STEPS {
            let step = self.step_up_from_class(pc);
            remaining -= step;
            scalar += 1;
            pc = (pc + step).rem_euclid(12);
            guard += 1;
        }
        while remaining < 0 && guard < MAX_SCALAR_STEPS {
            let step = self.step_down_from_class(pc);
            remaining -= step;
            scalar -= 1;
            pc = (pc + step).rem_euclid(12);
            guard += 1;
        }
        scalar
    }
}

impl Default for KeySignature {
    fn default() -> Self {
        Self::new(Letter::C, Accidental::Natural, Mode::Major)
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {}",
            self.tonic_letter, self.tonic_accidental, self.mode
        )
    }
}

impl FromStr for KeySignature {
    type Err = PitchError;

    /// Parse forms like "C major", "F# minor", "Bb harmonic minor".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (tonic, mode_name) = trimmed
            .split_once(char::is_whitespace)
            .ok_or_else(|| PitchError::InvalidArgument(format!("bad key signature '{s}'")))?;
        let (letter, accidental) = parse_pitch_name(tonic)?;
        let mode = Mode::from_name(mode_name)
            .ok_or_else(|| PitchError::InvalidArgument(format!("unknown mode '{mode_name}'")))?;
        Ok(KeySignature::new(letter, accidental, mode))
    }
}
