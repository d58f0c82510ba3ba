//! The transposition primitive.
//!
//! Every other component funnels through [`resolve`]: semitone offsets under
//! fixed-do, scale-degree walks under moveable-do, octave rollover kept
//! consistent with the pitch codec, and enharmonic spelling chosen from the
//! key, an explicit direction hint, or the key's flat/sharp bias, in that
//! order.

use serde::{Deserialize, Serialize};

use crate::interval::scalar_interval;
use crate::key::KeySignature;
use crate::pitch::{pitch_from_number, spell_pitch_class, Accidental, Letter, SymbolicPitch};
use crate::voice::{InvertMode, KeyContext, Voice};

/// Spelling hint at enharmonic boundaries: prefer sharp names going up,
/// flat names going down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

/// How a caller names the octave of a pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OctaveSpec {
    /// An explicit absolute octave.
    Absolute(i32),
    /// The voice's current octave.
    Current,
    /// One above the voice's current octave.
    Next,
    /// One below the voice's current octave.
    Previous,
    /// The octave nearest the last note played.
    Nearest,
}

/// Transpose a pitch by an offset within a key context.
///
/// With `context.moveable` set, `offset` counts scale degrees and is walked
/// one step-size lookup at a time; otherwise it is semitones added directly.
/// The resulting octave always satisfies the codec invariant
/// `result.number() == pitch.number() + semitones`.
///
/// # Examples
/// ```
/// use cantus_pitch::pitch::{Letter, SymbolicPitch};
/// use cantus_pitch::transpose::resolve;
/// use cantus_pitch::voice::KeyContext;
///
/// let context = KeyContext::default(); // C major, fixed-do
/// let c4 = SymbolicPitch::natural(Letter::C, 4);
/// assert_eq!(resolve(&c4, 7, &context, None).to_string(), "G4");
/// assert_eq!(resolve(&c4, 12, &context, None).to_string(), "C5");
/// ```
pub fn resolve(
    pitch: &SymbolicPitch,
    offset: i32,
    context: &KeyContext,
    direction: Option<Direction>,
) -> SymbolicPitch {
    let semitones = if context.moveable {
        scalar_interval(offset, &context.key, (pitch.letter, pitch.accidental))
    } else {
        offset
    };
    spelled(pitch.number() + semitones, &context.key, direction)
}

/// Transpose by scale degrees regardless of the moveable setting.
pub fn scalar_transpose(pitch: &SymbolicPitch, degrees: i32, key: &KeySignature) -> SymbolicPitch {
    let semitones = scalar_interval(degrees, key, (pitch.letter, pitch.accidental));
    spelled(pitch.number() + semitones, key, None)
}

/// Spell a pitch number: scale spelling first, then the direction hint,
/// then the key's flat/sharp bias.
pub(crate) fn spelled(
    number: i32,
    key: &KeySignature,
    direction: Option<Direction>,
) -> SymbolicPitch {
    let pc = (number + 9).rem_euclid(12);
    let (letter, accidental) = match key.spelling_for_pitch_class(pc) {
        Some(spelling) => spelling,
        None => match direction {
            Some(Direction::Up) => spell_pitch_class(pc, false),
            Some(Direction::Down) => spell_pitch_class(pc, true),
            None => spell_pitch_class(pc, key.prefers_flats()),
        },
    };
    pitch_from_number(number, letter, accidental)
}

/// Pick the octave for a pitch whose octave was given relative or not at all.
///
/// Explicit absolute octaves pass through. `Nearest` minimizes the semitone
/// jump from the last note played, ties toward the lower octave, so note
/// sequences written without octaves move smoothly.
pub fn calc_octave(
    current_octave: i32,
    requested: OctaveSpec,
    last_note: Option<&SymbolicPitch>,
    new_pitch: (Letter, Accidental),
) -> i32 {
    match requested {
        OctaveSpec::Absolute(octave) => octave,
        OctaveSpec::Current => current_octave,
        OctaveSpec::Next => current_octave + 1,
        OctaveSpec::Previous => current_octave - 1,
        OctaveSpec::Nearest => {
            let last = match last_note {
                Some(last) => last,
                None => return 4,
            };
            let mut best = last.octave;
            let mut best_distance = i32::MAX;
            for octave in [last.octave - 1, last.octave, last.octave + 1] {
                let candidate = SymbolicPitch::new(new_pitch.0, new_pitch.1, octave);
                let distance = (candidate.number() - last.number()).abs();
                if distance < best_distance {
                    best = octave;
                    best_distance = distance;
                }
            }
            best
        }
    }
}

/// Mirror delta for the voice's active inversion scopes, innermost last.
///
/// Each record reflects the running pitch around its pivot: `Even` around
/// the pivot itself, `Odd` around the point a quarter tone above it (so the
/// delta can be half-integral), `Scalar` in scale degrees. Callers apply
/// `2 * delta` semitones before the main transposition; that product is
/// always whole.
pub fn calculate_invert(voice: &Voice, pitch: &SymbolicPitch) -> f64 {
    let key = &voice.context.key;
    let mut delta = 0.0;
    let mut num1 = pitch.number() as f64;
    for record in voice.invert_list.iter().rev() {
        let pivot = SymbolicPitch::new(record.letter, record.accidental, record.octave);
        let num2 = pivot.number() as f64;
        match record.mode {
            InvertMode::Even => {
                let contribution = num2 - num1;
                delta += contribution;
                num1 += 2.0 * contribution;
            }
            InvertMode::Odd => {
                let contribution = num2 - num1 + 0.5;
                delta += contribution;
                num1 += 2.0 * contribution;
            }
            InvertMode::Scalar => {
                let start = spelled(num1.round() as i32, key, None);
                let steps = key.scalar_distance(
                    (start.letter, start.accidental),
                    (num2 - num1).round() as i32,
                );
                let mirrored = scalar_transpose(&pivot, steps, key);
                let num3 = mirrored.number() as f64;
                delta += (num3 - num1) / 2.0;
                num1 = num3;
            }
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Mode;
    use crate::voice::InvertRecord;

    fn fixed_c_major() -> KeyContext {
        KeyContext::default()
    }

    #[test]
    fn test_semitone_transposition() {
        let context = fixed_c_major();
        let c4 = SymbolicPitch::natural(Letter::C, 4);
        assert_eq!(resolve(&c4, 4, &context, None).to_string(), "E4");
        assert_eq!(resolve(&c4, -1, &context, None).to_string(), "B3");
        assert_eq!(resolve(&c4, 13, &context, None).to_string(), "C#5");
    }

    #[test]
    fn test_transposition_inverse() {
        let context = fixed_c_major();
        let g4 = SymbolicPitch::natural(Letter::G, 4);
        for n in -15..=15 {
            let there = resolve(&g4, n, &context, None);
            let back = resolve(&there, -n, &context, None);
            assert_eq!(back.number(), g4.number(), "offset {n}");
        }
    }

    #[test]
    fn test_moveable_do_walks_degrees() {
        let mut context = fixed_c_major();
        context.moveable = true;
        let c4 = SymbolicPitch::natural(Letter::C, 4);
        assert_eq!(resolve(&c4, 2, &context, None).to_string(), "E4");
        assert_eq!(resolve(&c4, 7, &context, None).to_string(), "C5");
        assert_eq!(resolve(&c4, -1, &context, None).to_string(), "B3");
    }

    #[test]
    fn test_direction_disambiguates_spelling() {
        let context = fixed_c_major();
        let c4 = SymbolicPitch::natural(Letter::C, 4);
        assert_eq!(resolve(&c4, 1, &context, Some(Direction::Up)).to_string(), "C#4");
        assert_eq!(resolve(&c4, 1, &context, Some(Direction::Down)).to_string(), "Db4");
    }

    #[test]
    fn test_key_spelling_wins() {
        let mut context = fixed_c_major();
        context.key = "Ab major".parse().unwrap();
        let c4 = SymbolicPitch::natural(Letter::C, 4);
        // pc 1 is Db in Ab major, whatever the hint says.
        assert_eq!(resolve(&c4, 1, &context, Some(Direction::Up)).to_string(), "Db4");
    }

    #[test]
    fn test_octave_rollover_matches_codec() {
        let context = fixed_c_major();
        let b3 = SymbolicPitch::natural(Letter::B, 3);
        let up = resolve(&b3, 1, &context, None);
        assert_eq!(up.to_string(), "C4");
        assert_eq!(up.octave, 4);
    }

    #[test]
    fn test_calc_octave_explicit_and_relative() {
        let g = (Letter::G, Accidental::Natural);
        assert_eq!(calc_octave(4, OctaveSpec::Absolute(2), None, g), 2);
        assert_eq!(calc_octave(4, OctaveSpec::Current, None, g), 4);
        assert_eq!(calc_octave(4, OctaveSpec::Next, None, g), 5);
        assert_eq!(calc_octave(4, OctaveSpec::Previous, None, g), 3);
        assert_eq!(calc_octave(4, OctaveSpec::Nearest, None, g), 4);
    }

    #[test]
    fn test_calc_octave_nearest_minimizes_jump() {
        let last = SymbolicPitch::natural(Letter::B, 3);
        // C a semitone above B3 is C4, not C3.
        let octave = calc_octave(3, OctaveSpec::Nearest, Some(&last), (Letter::C, Accidental::Natural));
        assert_eq!(octave, 4);

        let last = SymbolicPitch::natural(Letter::C, 4);
        // B a semitone below C4 is B3.
        let octave = calc_octave(4, OctaveSpec::Nearest, Some(&last), (Letter::B, Accidental::Natural));
        assert_eq!(octave, 3);
    }

    #[test]
    fn test_calc_octave_tritone_tie_prefers_lower() {
        let last = SymbolicPitch::natural(Letter::C, 4);
        // F# is a tritone from C in both directions; take the lower octave.
        let octave = calc_octave(4, OctaveSpec::Nearest, Some(&last), (Letter::F, Accidental::Sharp));
        assert_eq!(octave, 3);
    }

    #[test]
    fn test_even_inversion_mirrors_around_pivot() {
        let mut voice = Voice::default();
        voice.invert_list.push(InvertRecord {
            letter: Letter::C,
            accidental: Accidental::Natural,
            octave: 4,
            mode: InvertMode::Even,
        });
        let e4 = SymbolicPitch::natural(Letter::E, 4);
        let delta = calculate_invert(&voice, &e4);
        // E4 (43) mirrored around C4 (39) lands on Ab3 (35): 2*delta = -8.
        assert_eq!((2.0 * delta) as i32, -8);
    }

    #[test]
    fn test_nested_inversions_sum() {
        let mut voice = Voice::default();
        voice.invert_list.push(InvertRecord {
            letter: Letter::C,
            accidental: Accidental::Natural,
            octave: 4,
            mode: InvertMode::Even,
        });
        voice.invert_list.push(InvertRecord {
            letter: Letter::E,
            accidental: Accidental::Natural,
            octave: 4,
            mode: InvertMode::Even,
        });
        let g4 = SymbolicPitch::natural(Letter::G, 4);
        let delta = calculate_invert(&voice, &g4);
        // Innermost first: G4 (46) -> mirror around E4 (43) = 40; then mirror
        // around C4 (39) = 38. Total applied 2*delta = 38 - 46 = -8.
        assert_eq!((2.0 * delta).round() as i32, -8);
    }

    #[test]
    fn test_odd_inversion_half_step() {
        let mut voice = Voice::default();
        voice.invert_list.push(InvertRecord {
            letter: Letter::C,
            accidental: Accidental::Natural,
            octave: 4,
            mode: InvertMode::Odd,
        });
        let c4 = SymbolicPitch::natural(Letter::C, 4);
        let delta = calculate_invert(&voice, &c4);
        // Mirror around the quarter tone above C4: C4 maps one semitone up.
        assert_eq!((2.0 * delta).round() as i32, 1);
    }

    #[test]
    fn test_scalar_inversion_mirrors_in_degrees() {
        let mut voice = Voice::default();
        voice.context.key = KeySignature::new(Letter::C, Accidental::Natural, Mode::Major);
        voice.invert_list.push(InvertRecord {
            letter: Letter::C,
            accidental: Accidental::Natural,
            octave: 4,
            mode: InvertMode::Scalar,
        });
        // E4 is two degrees above C4; the mirror is two degrees below: A3.
        let e4 = SymbolicPitch::natural(Letter::E, 4);
        let delta = calculate_invert(&voice, &e4);
        let mirrored = e4.number() + (2.0 * delta).round() as i32;
        assert_eq!(mirrored, SymbolicPitch::natural(Letter::A, 3).number());
    }
}
