//! Symbolic pitch representation and the pitch codec.
//!
//! This module provides the three pitch representations and the deterministic
//! conversions between them:
//!
//! - symbolic: letter name + accidental + octave (`SymbolicPitch`)
//! - pitch number: an anchor-relative integer where A0 = 0
//! - frequency: hertz, with a residual cents offset from the nearest
//!   notated pitch
//!
//! Frequency conversion is anchored at A4 = 440 Hz under equal temperament;
//! custom temperaments map pitch numbers through their per-octave tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PitchError;
use crate::temperament::Temperament;

/// Reference frequency for A4.
pub const A4_HZ: f64 = 440.0;

/// Pitch number of A4 with the A0 = 0 anchor.
pub const A4_NUMBER: i32 = 48;

/// Letter names, in scale order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// All letters in scale order starting from C.
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Pitch class of the natural letter (C=0, D=2, E=4, F=5, G=7, A=9, B=11).
    pub fn natural_pitch_class(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// Position in scale order (C=0 .. B=6).
    pub fn index(self) -> usize {
        match self {
            Letter::C => 0,
            Letter::D => 1,
            Letter::E => 2,
            Letter::F => 3,
            Letter::G => 4,
            Letter::A => 5,
            Letter::B => 6,
        }
    }

    /// Letter at a scale-order position, wrapping every seven letters.
    pub fn from_index(index: usize) -> Letter {
        Letter::ALL[index % 7]
    }

    fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        };
        write!(f, "{}", c)
    }
}

/// Accidental applied to a letter, from double flat to double sharp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    /// Semitone offset from the natural letter (-2 ..= 2).
    pub fn offset(self) -> i32 {
        match self {
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }

    /// Accidental for a semitone offset, if one exists.
    pub fn from_offset(offset: i32) -> Option<Accidental> {
        match offset {
            -2 => Some(Accidental::DoubleFlat),
            -1 => Some(Accidental::Flat),
            0 => Some(Accidental::Natural),
            1 => Some(Accidental::Sharp),
            2 => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    /// Resolve an accidental token to its accidental.
    ///
    /// Accepts long names ("double sharp", "flat"), ASCII suffixes ("##",
    /// "b"), and the Unicode glyphs (♯, ♭, 𝄪, 𝄫, ♮). Returns `None` for
    /// anything outside the recognized set.
    pub fn from_token(token: &str) -> Option<Accidental> {
        match token.trim().to_lowercase().as_str() {
            "double sharp" | "##" | "x" | "𝄪" => Some(Accidental::DoubleSharp),
            "sharp" | "#" | "♯" => Some(Accidental::Sharp),
            "natural" | "" | "♮" => Some(Accidental::Natural),
            "flat" | "b" | "♭" => Some(Accidental::Flat),
            "double flat" | "bb" | "𝄫" => Some(Accidental::DoubleFlat),
            _ => None,
        }
    }
}

impl fmt::Display for Accidental {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Accidental::DoubleFlat => "bb",
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::DoubleSharp => "##",
        };
        write!(f, "{}", s)
    }
}

/// A notated pitch: letter, accidental, and octave.
///
/// The canonical textual form is letter, accidental suffix, octave ("C#4",
/// "Bb3", "C4"). The accidental is folded into pitch-number comparisons and
/// kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolicPitch {
    pub letter: Letter,
    pub accidental: Accidental,
    pub octave: i32,
}

impl SymbolicPitch {
    pub fn new(letter: Letter, accidental: Accidental, octave: i32) -> Self {
        Self {
            letter,
            accidental,
            octave,
        }
    }

    /// A natural pitch at the given octave.
    pub fn natural(letter: Letter, octave: i32) -> Self {
        Self::new(letter, Accidental::Natural, octave)
    }

    /// Pitch class 0-11, accidental included.
    pub fn pitch_class(&self) -> i32 {
        (self.letter.natural_pitch_class() + self.accidental.offset()).rem_euclid(12)
    }

    /// Pitch number with the A0 = 0 anchor.
    ///
    /// The accidental counts toward the number, so enharmonic spellings of
    /// the same sounding pitch agree: B#3 and C4 are both 39.
    ///
    /// # Examples
    /// ```
    /// use cantus_pitch::pitch::{Accidental, Letter, SymbolicPitch};
    ///
    /// assert_eq!(SymbolicPitch::natural(Letter::A, 0).number(), 0);
    /// assert_eq!(SymbolicPitch::natural(Letter::A, 4).number(), 48);
    /// assert_eq!(SymbolicPitch::natural(Letter::C, 4).number(), 39);
    /// assert_eq!(
    ///     SymbolicPitch::new(Letter::B, Accidental::Sharp, 3).number(),
    ///     39
    /// );
    /// ```
    pub fn number(&self) -> i32 {
        self.octave * 12 + self.letter.natural_pitch_class() + self.accidental.offset() - 9
    }

    /// Letter plus accidental, without the octave ("C#", "Bb").
    pub fn label(&self) -> String {
        format!("{}{}", self.letter, self.accidental)
    }
}

impl fmt::Display for SymbolicPitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.letter, self.accidental, self.octave)
    }
}

impl FromStr for SymbolicPitch {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() || *c == '-')
            .map(|(i, _)| i)
            .ok_or_else(|| PitchError::InvalidArgument(format!("missing octave in '{s}'")))?;
        let (name, octave_str) = trimmed.split_at(split);
        let (letter, accidental) = parse_pitch_name(name)?;
        let octave: i32 = octave_str
            .parse()
            .map_err(|_| PitchError::InvalidArgument(format!("bad octave in '{s}'")))?;
        Ok(SymbolicPitch::new(letter, accidental, octave))
    }
}

/// Parse a pitch name without an octave ("C#", "Bb", "E").
pub fn parse_pitch_name(name: &str) -> Result<(Letter, Accidental), PitchError> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    let letter = chars
        .next()
        .and_then(Letter::from_char)
        .ok_or_else(|| PitchError::InvalidArgument(format!("bad pitch name '{name}'")))?;
    let accidental = Accidental::from_token(chars.as_str())
        .ok_or_else(|| PitchError::InvalidArgument(format!("bad pitch name '{name}'")))?;
    Ok((letter, accidental))
}

/// Sharp-preference spellings of the twelve pitch classes.
const SHARP_SPELLINGS: [(Letter, Accidental); 12] = [
    (Letter::C, Accidental::Natural),
    (Letter::C, Accidental::Sharp),
    (Letter::D, Accidental::Natural),
    (Letter::D, Accidental::Sharp),
    (Letter::E, Accidental::Natural),
    (Letter::F, Accidental::Natural),
    (Letter::F, Accidental::Sharp),
    (Letter::G, Accidental::Natural),
    (Letter::G, Accidental::Sharp),
    (Letter::A, Accidental::Natural),
    (Letter::A, Accidental::Sharp),
    (Letter::B, Accidental::Natural),
];

/// Flat-preference spellings of the twelve pitch classes.
const FLAT_SPELLINGS: [(Letter, Accidental); 12] = [
    (Letter::C, Accidental::Natural),
    (Letter::D, Accidental::Flat),
    (Letter::D, Accidental::Natural),
    (Letter::E, Accidental::Flat),
    (Letter::E, Accidental::Natural),
    (Letter::F, Accidental::Natural),
    (Letter::G, Accidental::Flat),
    (Letter::G, Accidental::Natural),
    (Letter::A, Accidental::Flat),
    (Letter::A, Accidental::Natural),
    (Letter::B, Accidental::Flat),
    (Letter::B, Accidental::Natural),
];

/// Chromatic spelling of a pitch class with a sharp or flat preference.
pub(crate) fn spell_pitch_class(pc: i32, flats: bool) -> (Letter, Accidental) {
    let idx = pc.rem_euclid(12) as usize;
    if flats {
        FLAT_SPELLINGS[idx]
    } else {
        SHARP_SPELLINGS[idx]
    }
}

/// Place a spelling at the octave that makes its pitch number exact.
///
/// The octave is derived from the number, not copied in, so boundary
/// spellings land where they sound: number 39 spelled B# yields B#3.
pub(crate) fn pitch_from_number(number: i32, letter: Letter, accidental: Accidental) -> SymbolicPitch {
    let octave =
        (number + 9 - letter.natural_pitch_class() - accidental.offset()).div_euclid(12);
    SymbolicPitch::new(letter, accidental, octave)
}

/// Equal-tempered symbolic pitch for a pitch number, sharp spelling.
pub(crate) fn equal_number_to_pitch(number: i32) -> SymbolicPitch {
    let pc = (number + 9).rem_euclid(12);
    let (letter, accidental) = spell_pitch_class(pc, false);
    pitch_from_number(number, letter, accidental)
}

/// Map a pitch number to a symbolic pitch under a temperament.
///
/// Under equal temperament the chromatic scale is walked from the A0 anchor
/// (sharp spelling). A custom temperament subtracts `offset` — the voice's
/// pitch-number offset, keeping the anchor consistent with
/// [`SymbolicPitch::number`] — then indexes its per-octave table, advancing
/// the octave from `starting_pitch` on each wraparound.
///
/// # Examples
/// ```
/// use cantus_pitch::pitch::{number_to_pitch, Letter, SymbolicPitch};
/// use cantus_pitch::temperament::Temperament;
///
/// let start = SymbolicPitch::natural(Letter::C, 4);
/// let pitch = number_to_pitch(48, &Temperament::Equal, &start, 0);
/// assert_eq!(pitch.to_string(), "A4");
/// ```
pub fn number_to_pitch(
    number: i32,
    temperament: &Temperament,
    starting_pitch: &SymbolicPitch,
    offset: i32,
) -> SymbolicPitch {
    match temperament {
        Temperament::Equal => equal_number_to_pitch(number),
        Temperament::Custom(table) => {
            let len = table.note_count() as i32;
            let steps = number - offset;
            let entry = table.entry(steps.rem_euclid(len) as usize);
            SymbolicPitch::new(
                entry.letter,
                entry.accidental,
                starting_pitch.octave + steps.div_euclid(len),
            )
        }
    }
}

/// Equal-tempered frequency of a pitch number.
pub(crate) fn equal_frequency(number: i32) -> f64 {
    A4_HZ * 2.0_f64.powf((number - A4_NUMBER) as f64 / 12.0)
}

/// Find the nearest notated pitch for a frequency, with residual cents.
///
/// The nearest equal-tempered pitch comes from `round(12 * log2(hz / 440))`
/// relative to A4; exact halfway points resolve to the lower pitch so the
/// residual always lies in (-50, 50].
///
/// # Errors
/// `InvalidFrequency` for non-finite or non-positive input.
///
/// # Examples
/// ```
/// use cantus_pitch::pitch::frequency_to_pitch;
///
/// let (pitch, cents) = frequency_to_pitch(440.0).unwrap();
/// assert_eq!(pitch.to_string(), "A4");
/// assert!(cents.abs() < 1e-9);
/// ```
pub fn frequency_to_pitch(hertz: f64) -> Result<(SymbolicPitch, f64), PitchError> {
    if !hertz.is_finite() || hertz <= 0.0 {
        return Err(PitchError::InvalidFrequency(hertz));
    }
    let exact = 12.0 * (hertz / A4_HZ).log2();
    // Ties round down: cents stays in (-50, 50].
    let nearest = (exact - 0.5).ceil() as i32;
    let cents = 100.0 * (exact - nearest as f64);
    Ok((equal_number_to_pitch(A4_NUMBER + nearest), cents))
}

/// Frequency of a symbolic pitch plus a cents offset under a temperament.
///
/// A custom temperament looks the pitch up in its table relative to
/// `starting_pitch`; a pitch class missing from the table falls back to the
/// equal-tempered frequency.
pub fn pitch_to_frequency(
    pitch: &SymbolicPitch,
    cents: f64,
    temperament: &Temperament,
    starting_pitch: &SymbolicPitch,
) -> f64 {
    let base = match temperament {
        Temperament::Equal => equal_frequency(pitch.number()),
        Temperament::Custom(table) => match table.position_of(pitch.letter, pitch.accidental) {
            Some(idx) => {
                equal_frequency(starting_pitch.number())
                    * table.entry(idx).ratio
                    * 2.0_f64.powi(pitch.octave - starting_pitch.octave)
            }
            None => equal_frequency(pitch.number()),
        },
    };
    base * 2.0_f64.powf(cents / 1200.0)
}
