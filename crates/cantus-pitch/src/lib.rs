//! Cantus Pitch - Deterministic Pitch Resolution and Transformation
//!
//! This crate converts between three representations of musical pitch —
//! symbolic (letter + accidental + octave), integer pitch number (A0 = 0),
//! and frequency in hertz with residual cents — and applies reversible,
//! scope-bound transformations (transposition, accidentals, inversion,
//! intervals) to a pitch within a key signature and temperament.
//!
//! # Determinism
//!
//! Every operation is pure computation over the [`voice::Voice`] it is
//! handed: same voice state in, same pitches out. The engine retains
//! nothing between calls, so independent voices can be processed in
//! parallel as long as each voice has a single writer.
//!
//! # Example
//!
//! ```
//! use cantus_pitch::actions::play_pitch;
//! use cantus_pitch::event::{begin_note, end_note};
//! use cantus_pitch::pitch::{Accidental, Letter};
//! use cantus_pitch::transpose::OctaveSpec;
//! use cantus_pitch::voice::Voice;
//!
//! let mut voice = Voice::default();
//! let scope = begin_note(&mut voice);
//! play_pitch(&mut voice, Letter::C, Accidental::Natural, OctaveSpec::Absolute(4), 0.0)?;
//! let event = end_note(&mut voice, scope)?;
//! assert_eq!(event.pitches, ["C"]);
//! assert_eq!(event.octaves, [4]);
//! # Ok::<(), cantus_pitch::error::PitchError>(())
//! ```
//!
//! # Module Structure
//!
//! - [`pitch`]: symbolic pitch and the number/frequency codec
//! - [`temperament`]: equal temperament and custom ratio tables
//! - [`key`]: key signatures, modes, and diatonic step sizes
//! - [`interval`]: named and scalar interval resolution
//! - [`transpose`]: the transposition primitive, octave placement, inversion
//! - [`voice`]: per-voice state
//! - [`modifier`]: scoped reversible accidentals and transpositions
//! - [`event`]: note events and the note-scope stack
//! - [`actions`]: the operation surface a scheduler calls

pub mod actions;
pub mod error;
pub mod event;
pub mod interval;
pub mod key;
pub mod modifier;
pub mod pitch;
pub mod temperament;
pub mod transpose;
pub mod voice;

// Re-export main types
pub use actions::{
    consonant_step_size, delta_pitch, num_to_pitch, play_hertz, play_pitch, play_pitch_number,
    set_pitch_number_offset, DeltaKind, MessageSink,
};
pub use error::PitchError;
pub use event::{add_pitch, begin_note, end_note, NoteEvent, ScopeId};
pub use interval::{named_interval, scalar_interval};
pub use key::{KeySignature, Mode};
pub use modifier::{register_accidental, register_semitone_transpose, scope_exit};
pub use pitch::{
    frequency_to_pitch, number_to_pitch, pitch_to_frequency, Accidental, Letter, SymbolicPitch,
};
pub use temperament::{CustomTemperament, Temperament, TemperamentEntry};
pub use transpose::{calc_octave, calculate_invert, resolve, Direction, OctaveSpec};
pub use voice::{BlockId, InvertMode, InvertRecord, KeyContext, Voice};

/// Crate version for engine identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
