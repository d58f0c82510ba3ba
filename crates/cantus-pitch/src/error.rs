//! Error types for pitch resolution.

use thiserror::Error;

/// Errors raised by the pitch engine.
///
/// All resolution functions are pure and fail immediately on invalid input;
/// there are no internal retries. `NoNote` is a typed control failure (a
/// pitch was submitted with no open note scope), distinct from genuinely
/// malformed input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PitchError {
    /// Non-numeric or otherwise malformed required input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Frequency input was non-finite or not positive.
    #[error("invalid frequency {0} (must be finite and positive)")]
    InvalidFrequency(f64),

    /// A pitch was submitted for playback with no open note scope and the
    /// voice not in measuring mode.
    #[error("no note scope is open")]
    NoNote,

    /// An accidental token was not found in the recognized accidental set.
    /// The scoped effect is still registered with magnitude zero; this error
    /// exists so the caller can surface the unrecognized token.
    #[error("unrecognized accidental '{0}'")]
    UnresolvedAccidental(String),
}
