//! Per-voice state.
//!
//! One `Voice` owns everything the engine mutates: the key context it was
//! configured with (copied, not shared), its running transposition state,
//! inversion scopes, interval sets, and the note-event and modifier stacks.
//! The engine itself keeps nothing between calls, so voices can be processed
//! in parallel as long as each has a single writer.

use serde::{Deserialize, Serialize};

use crate::key::KeySignature;
use crate::modifier::ModifierStack;
use crate::pitch::{Accidental, Letter, SymbolicPitch};
use crate::temperament::Temperament;
use crate::transpose::Direction;

/// Identifier of the block whose execution window scopes a modifier.
/// Assigned by the external scheduler.
pub type BlockId = u64;

/// Key, tuning, and transposition-interpretation settings for a voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyContext {
    pub key: KeySignature,
    /// Moveable-do: offsets count scale degrees instead of semitones.
    pub moveable: bool,
    pub temperament: Temperament,
    /// Anchor pitch for custom temperament tables.
    pub starting_pitch: SymbolicPitch,
}

impl Default for KeyContext {
    fn default() -> Self {
        Self {
            key: KeySignature::default(),
            moveable: false,
            temperament: Temperament::Equal,
            starting_pitch: SymbolicPitch::natural(Letter::C, 4),
        }
    }
}

/// Flavor of an inversion scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvertMode {
    /// Mirror around the pivot pitch.
    Even,
    /// Mirror around the quarter tone above the pivot.
    Odd,
    /// Mirror in scale degrees.
    Scalar,
}

/// An active inversion scope: pivot pitch plus mirror mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvertRecord {
    pub letter: Letter,
    pub accidental: Accidental,
    pub octave: i32,
    pub mode: InvertMode,
}

/// All mutable state the engine touches for one voice.
#[derive(Debug, Clone)]
pub struct Voice {
    pub context: KeyContext,
    /// Net semitone transposition from active accidental and semitone
    /// transpose scopes.
    pub transposition: i32,
    /// Octave register shift, in octaves.
    pub register: i32,
    /// Scale-degree transposition applied to incoming pitches.
    pub scalar_transposition: i32,
    /// Additive anchor for pitch-number conversion, set by the caller and
    /// applied symmetrically on both sides of the round trip.
    pub pitch_number_offset: i32,
    /// Active inversion scopes, innermost last.
    pub invert_list: Vec<InvertRecord>,
    /// Scalar intervals sounded with every note (chords in degrees).
    pub intervals: Vec<i32>,
    /// Semitone intervals sounded with every note, each with an optional
    /// spelling direction.
    pub semitone_intervals: Vec<(i32, Option<Direction>)>,
    pub last_note_played: Option<SymbolicPitch>,
    pub previous_note_played: Option<SymbolicPitch>,
    pub current_octave: i32,
    /// Beat value recorded with each note event entry.
    pub beat_factor: f64,
    /// Depth of open "just measuring" scopes; nonzero diverts played pitches
    /// into the first/last pitch trackers instead of note events.
    pub just_measuring: usize,
    pub first_pitch: Vec<i32>,
    pub last_pitch: Vec<i32>,
    /// While `Some`, pitch numbers are recorded here instead of resolved.
    pub define_mode: Option<Vec<i32>>,
    pub(crate) modifiers: ModifierStack,
    pub(crate) note_scopes: Vec<crate::event::NoteScope>,
    pub(crate) next_scope_id: u64,
}

impl Voice {
    pub fn new(context: KeyContext) -> Self {
        let anchor = SymbolicPitch::natural(Letter::C, 4).number();
        Self {
            context,
            transposition: 0,
            register: 0,
            scalar_transposition: 0,
            // Pitch number 0 plays the conventional middle-C anchor.
            pitch_number_offset: anchor,
            invert_list: Vec::new(),
            intervals: Vec::new(),
            semitone_intervals: Vec::new(),
            last_note_played: None,
            previous_note_played: None,
            current_octave: 4,
            beat_factor: 1.0,
            just_measuring: 0,
            first_pitch: Vec::new(),
            last_pitch: Vec::new(),
            define_mode: None,
            modifiers: ModifierStack::default(),
            note_scopes: Vec::new(),
            next_scope_id: 0,
        }
    }

    /// Whether any note scope is open.
    pub fn in_note_scope(&self) -> bool {
        !self.note_scopes.is_empty()
    }

    /// Number of nested open note scopes.
    pub fn open_note_scopes(&self) -> usize {
        self.note_scopes.len()
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new(KeyContext::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_anchor_is_middle_c() {
        let voice = Voice::default();
        assert_eq!(voice.pitch_number_offset, 39);
        assert_eq!(voice.current_octave, 4);
        assert!(!voice.in_note_scope());
    }

    #[test]
    fn test_voice_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Voice>();
    }
}
