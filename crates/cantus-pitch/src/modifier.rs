//! Scoped, reversible pitch modifiers.
//!
//! Accidental and semitone-transpose blocks shift a voice's transposition
//! for the duration of their execution window. Each registration stores the
//! inverse effect keyed by block id; the external scheduler's scope-exit
//! signal is the only thing that applies it, and it applies it exactly once.

use std::collections::HashMap;

use crate::error::PitchError;
use crate::pitch::Accidental;
use crate::voice::{BlockId, Voice};

/// Pending undo for an open modifier scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UndoRecord {
    /// Undo re-applies the stored magnitude, negated.
    Accidental(i32),
    /// Undo pops the matching magnitude off the value stack.
    SemitoneTranspose,
}

/// Per-voice map of open modifier scopes.
///
/// Re-registering the same block id before its undo fires replaces the
/// dispatch entry (last registration wins); semitone-transpose magnitudes
/// still stack so nested scopes of different sizes unwind correctly.
#[derive(Debug, Clone, Default)]
pub(crate) struct ModifierStack {
    undo: HashMap<BlockId, UndoRecord>,
    transposition_values: Vec<i32>,
}

/// Apply a scoped accidental to the voice.
///
/// The accidental's value (negated while any inversion scope is active) is
/// added to `voice.transposition`, and the inverse is registered against
/// `block`. An unrecognized token still registers a zero-magnitude effect —
/// every call registers exactly one scoped effect — and reports
/// `UnresolvedAccidental` so the caller can surface it.
pub fn register_accidental(
    voice: &mut Voice,
    block: BlockId,
    token: &str,
) -> Result<(), PitchError> {
    let resolved = Accidental::from_token(token);
    let value = resolved.map(|a| a.offset()).unwrap_or(0);

    let inverted = !voice.invert_list.is_empty();
    voice.transposition += if inverted { -value } else { value };
    voice.modifiers.undo.insert(block, UndoRecord::Accidental(value));

    match resolved {
        Some(_) => Ok(()),
        None => Err(PitchError::UnresolvedAccidental(token.to_string())),
    }
}

/// Apply a scoped semitone transposition to the voice.
///
/// Also pushes `amount` onto the voice's value stack so the undo pops the
/// exact matching magnitude, keeping nested re-entrant transpositions of
/// different sizes balanced.
pub fn register_semitone_transpose(voice: &mut Voice, block: BlockId, amount: i32) {
    let inverted = !voice.invert_list.is_empty();
    voice.transposition += if inverted { -amount } else { amount };
    voice.modifiers.transposition_values.push(amount);
    voice
        .modifiers
        .undo
        .insert(block, UndoRecord::SemitoneTranspose);
}

/// Scope-exit signal from the external scheduler.
///
/// Invokes the pending undo for `block` exactly once. The inversion state is
/// re-read at exit time, matching entry. A block with no pending undo is a
/// no-op: scope-exit signaling is outside this engine's control.
pub fn scope_exit(voice: &mut Voice, block: BlockId) {
    let record = match voice.modifiers.undo.remove(&block) {
        Some(record) => record,
        None => return,
    };
    let inverted = !voice.invert_list.is_empty();
    match record {
        UndoRecord::Accidental(value) => {
            voice.transposition += if inverted { value } else { -value };
        }
        UndoRecord::SemitoneTranspose => {
            if let Some(value) = voice.modifiers.transposition_values.pop() {
                voice.transposition += if inverted { value } else { -value };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::{Accidental as Acc, Letter};
    use crate::voice::{InvertMode, InvertRecord};

    #[test]
    fn test_accidental_scope_symmetry() {
        let mut voice = Voice::default();
        register_accidental(&mut voice, 1, "sharp").unwrap();
        assert_eq!(voice.transposition, 1);
        scope_exit(&mut voice, 1);
        assert_eq!(voice.transposition, 0);
    }

    #[test]
    fn test_accidental_negated_under_inversion() {
        let mut voice = Voice::default();
        voice.invert_list.push(InvertRecord {
            letter: Letter::C,
            accidental: Acc::Natural,
            octave: 4,
            mode: InvertMode::Even,
        });
        register_accidental(&mut voice, 1, "double sharp").unwrap();
        assert_eq!(voice.transposition, -2);
        scope_exit(&mut voice, 1);
        assert_eq!(voice.transposition, 0);
    }

    #[test]
    fn test_unresolved_accidental_still_registers() {
        let mut voice = Voice::default();
        let err = register_accidental(&mut voice, 7, "demisharp").unwrap_err();
        assert_eq!(err, PitchError::UnresolvedAccidental("demisharp".into()));
        assert_eq!(voice.transposition, 0);
        // The zero-magnitude scope still exists and exits cleanly.
        scope_exit(&mut voice, 7);
        assert_eq!(voice.transposition, 0);
    }

    #[test]
    fn test_nested_semitone_transposes_unwind_in_order() {
        let mut voice = Voice::default();
        register_semitone_transpose(&mut voice, 1, 5);
        register_semitone_transpose(&mut voice, 2, 3);
        assert_eq!(voice.transposition, 8);
        scope_exit(&mut voice, 2);
        assert_eq!(voice.transposition, 5);
        scope_exit(&mut voice, 1);
        assert_eq!(voice.transposition, 0);
    }

    #[test]
    fn test_reregistration_replaces_dispatch() {
        let mut voice = Voice::default();
        register_accidental(&mut voice, 1, "flat").unwrap();
        register_accidental(&mut voice, 1, "sharp").unwrap();
        assert_eq!(voice.transposition, 0);
        // Only the last registration's undo fires.
        scope_exit(&mut voice, 1);
        assert_eq!(voice.transposition, -1);
        scope_exit(&mut voice, 1);
        assert_eq!(voice.transposition, -1);
    }

    #[test]
    fn test_missing_undo_is_noop() {
        let mut voice = Voice::default();
        scope_exit(&mut voice, 42);
        assert_eq!(voice.transposition, 0);
    }
}
