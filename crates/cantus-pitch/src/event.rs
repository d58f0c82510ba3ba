//! Note events and the per-voice note-scope stack.
//!
//! A note scope is the execution window of a note block: `begin_note` opens
//! one, pitches played inside it accumulate into its `NoteEvent`, and
//! `end_note` closes it and hands the event back for the synthesis
//! collaborator. Scopes nest; a pitch always lands in the scope opened last
//! and still open.

use serde::{Deserialize, Serialize};

use crate::error::PitchError;
use crate::pitch::SymbolicPitch;
use crate::transpose::{calculate_invert, resolve, Direction};
use crate::voice::Voice;

/// One playable note: every pitch sounded while its scope was open, as
/// parallel ordered sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Letter-plus-accidental labels ("C#", "Bb").
    pub pitches: Vec<String>,
    pub octaves: Vec<i32>,
    pub cents: Vec<f64>,
    pub hertz: Vec<f64>,
    /// One beat value per play call, not per pitch.
    pub beat_values: Vec<f64>,
}

impl NoteEvent {
    /// Number of pitch entries.
    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }
}

/// Identity of an open note scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(u64);

#[derive(Debug, Clone)]
pub(crate) struct NoteScope {
    pub id: ScopeId,
    pub event: NoteEvent,
}

/// Open a note scope on the voice and return its id.
pub fn begin_note(voice: &mut Voice) -> ScopeId {
    let id = ScopeId(voice.next_scope_id);
    voice.next_scope_id += 1;
    voice.note_scopes.push(NoteScope {
        id,
        event: NoteEvent::default(),
    });
    id
}

/// Close a note scope and hand its event to the caller.
///
/// # Errors
/// `NoNote` if the scope is not open (already ended, or never begun).
pub fn end_note(voice: &mut Voice, scope: ScopeId) -> Result<NoteEvent, PitchError> {
    let index = voice
        .note_scopes
        .iter()
        .rposition(|s| s.id == scope)
        .ok_or(PitchError::NoNote)?;
    Ok(voice.note_scopes.remove(index).event)
}

/// Resolve a pitch through the voice's active modifiers and append it to the
/// innermost open note event.
///
/// The applied offset is `transposition + register * 12 + 2 * invert delta`.
/// Returns the resolved pitch, which callers use as the reference for
/// interval expansion within the same note.
pub fn add_pitch(
    voice: &mut Voice,
    pitch: &SymbolicPitch,
    cents: f64,
    hertz: f64,
    direction: Option<Direction>,
) -> Result<SymbolicPitch, PitchError> {
    let delta = if voice.invert_list.is_empty() {
        0.0
    } else {
        calculate_invert(voice, pitch)
    };
    add_pitch_with_delta(voice, pitch, cents, hertz, direction, delta)
}

/// `add_pitch` with the invert delta precomputed, so one play call applies a
/// single delta to the base pitch and every chord tone.
pub(crate) fn add_pitch_with_delta(
    voice: &mut Voice,
    pitch: &SymbolicPitch,
    cents: f64,
    hertz: f64,
    direction: Option<Direction>,
    delta: f64,
) -> Result<SymbolicPitch, PitchError> {
    let offset = voice.transposition + voice.register * 12 + (2.0 * delta).round() as i32;
    let resolved = resolve(pitch, offset, &voice.context, direction);
    append_to_event(voice, &resolved, cents, hertz)?;
    Ok(resolved)
}

/// Append an already-resolved pitch to the innermost open note event.
pub(crate) fn append_to_event(
    voice: &mut Voice,
    resolved: &SymbolicPitch,
    cents: f64,
    hertz: f64,
) -> Result<(), PitchError> {
    let scope = voice.note_scopes.last_mut().ok_or(PitchError::NoNote)?;
    scope.event.pitches.push(resolved.label());
    scope.event.octaves.push(resolved.octave);
    scope.event.cents.push(cents);
    scope.event.hertz.push(hertz);
    Ok(())
}

/// Record the voice's beat factor on the innermost open note event.
pub(crate) fn push_beat_value(voice: &mut Voice) {
    let beat = voice.beat_factor;
    if let Some(scope) = voice.note_scopes.last_mut() {
        scope.event.beat_values.push(beat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Letter;

    #[test]
    fn test_scope_stack_appends_to_innermost() {
        let mut voice = Voice::default();
        let outer = begin_note(&mut voice);
        let inner = begin_note(&mut voice);

        let c4 = SymbolicPitch::natural(Letter::C, 4);
        add_pitch(&mut voice, &c4, 0.0, 0.0, None).unwrap();

        let inner_event = end_note(&mut voice, inner).unwrap();
        assert_eq!(inner_event.pitches, ["C"]);
        let outer_event = end_note(&mut voice, outer).unwrap();
        assert!(outer_event.is_empty());
    }

    #[test]
    fn test_add_pitch_applies_transposition_and_register() {
        let mut voice = Voice::default();
        voice.transposition = 2;
        voice.register = 1;
        let scope = begin_note(&mut voice);

        let c4 = SymbolicPitch::natural(Letter::C, 4);
        let resolved = add_pitch(&mut voice, &c4, 0.0, 0.0, None).unwrap();
        assert_eq!(resolved.to_string(), "D5");

        let event = end_note(&mut voice, scope).unwrap();
        assert_eq!(event.pitches, ["D"]);
        assert_eq!(event.octaves, [5]);
    }

    #[test]
    fn test_add_pitch_without_scope_fails() {
        let mut voice = Voice::default();
        let c4 = SymbolicPitch::natural(Letter::C, 4);
        let err = add_pitch(&mut voice, &c4, 0.0, 0.0, None).unwrap_err();
        assert_eq!(err, PitchError::NoNote);
    }

    #[test]
    fn test_end_note_twice_fails() {
        let mut voice = Voice::default();
        let scope = begin_note(&mut voice);
        end_note(&mut voice, scope).unwrap();
        assert_eq!(end_note(&mut voice, scope).unwrap_err(), PitchError::NoNote);
    }
}
