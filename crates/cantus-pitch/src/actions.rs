//! The operation surface of the engine.
//!
//! These are the entry points a block scheduler calls to sound pitches:
//! play by name, by pitch number, or by frequency, plus the query operations
//! (delta pitch, consonant step size, pitch-number conversion). All of them
//! are pure over the `Voice` they are handed.

use crate::error::PitchError;
use crate::event::{add_pitch_with_delta, append_to_event, push_beat_value};
use crate::interval::scalar_interval;
use crate::pitch::{
    frequency_to_pitch, number_to_pitch, Accidental, Letter, SymbolicPitch,
};
use crate::transpose::{calc_octave, calculate_invert, resolve, scalar_transpose, Direction, OctaveSpec};
use crate::voice::Voice;

/// Receiver for human-readable notices. The engine never renders or
/// localizes text itself; warnings go here, failures are typed returns.
pub trait MessageSink {
    fn notice(&mut self, message: &str);
}

/// Which flavor of pitch change `delta_pitch` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaKind {
    /// Half-step difference.
    Semitone,
    /// Scale-degree difference.
    Scalar,
}

/// Process (and/or play) a named pitch.
///
/// The octave is settled first via [`calc_octave`], then any scalar
/// transposition shifts the pitch in scale degrees. In measuring mode the
/// pitch number is recorded instead of played; otherwise an open note scope
/// is required.
pub fn play_pitch(
    voice: &mut Voice,
    letter: Letter,
    accidental: Accidental,
    octave: OctaveSpec,
    cents: f64,
) -> Result<(), PitchError> {
    let octave = calc_octave(
        voice.current_octave,
        octave,
        voice.last_note_played.as_ref(),
        (letter, accidental),
    );
    let mut pitch = SymbolicPitch::new(letter, accidental, octave);
    if voice.scalar_transposition != 0 {
        pitch = scalar_transpose(&pitch, voice.scalar_transposition, &voice.context.key);
    }
    dispatch_pitch(voice, pitch, cents, 0.0)
}

/// Process a frequency in hertz.
///
/// Resolves the nearest notated pitch and residual cents, then behaves like
/// [`play_pitch`] for that pitch.
///
/// # Errors
/// `InvalidFrequency` for non-finite or non-positive input; `NoNote` when no
/// note scope is open and the voice is not measuring.
pub fn play_hertz(voice: &mut Voice, hertz: f64) -> Result<(), PitchError> {
    let (pitch, cents) = frequency_to_pitch(hertz)?;
    dispatch_pitch(voice, pitch, cents, hertz)
}

/// Process a pitch number.
///
/// In define mode the raw number is appended to the definition buffer and
/// nothing is resolved. Otherwise the number is mapped through the voice's
/// temperament (offset-symmetrically) and played. With a custom temperament
/// and a nonzero transposition, a notice goes to `sink`: scalar and semitone
/// transposition coincide there.
pub fn play_pitch_number(
    voice: &mut Voice,
    number: i32,
    sink: Option<&mut dyn MessageSink>,
) -> Result<(), PitchError> {
    if let Some(buffer) = voice.define_mode.as_mut() {
        buffer.push(number);
        return Ok(());
    }

    if voice.context.temperament.is_custom()
        && voice.scalar_transposition + voice.transposition != 0
    {
        if let Some(sink) = sink {
            sink.notice(
                "scalar transpositions are equal to semitone transpositions for custom temperament",
            );
        }
    }

    let pitch = number_to_pitch(
        number + voice.pitch_number_offset,
        &voice.context.temperament,
        &voice.context.starting_pitch,
        voice.pitch_number_offset,
    );
    play_pitch(
        voice,
        pitch.letter,
        pitch.accidental,
        OctaveSpec::Absolute(pitch.octave),
        0.0,
    )
}

/// Shared playback path: measuring mode diverts to the pitch trackers, an
/// open note scope accumulates the base pitch plus every configured
/// interval, anything else is `NoNote`.
fn dispatch_pitch(
    voice: &mut Voice,
    pitch: SymbolicPitch,
    cents: f64,
    hertz: f64,
) -> Result<(), PitchError> {
    if voice.just_measuring > 0 {
        record_measured(voice, &pitch);
        return Ok(());
    }
    if !voice.in_note_scope() {
        return Err(PitchError::NoNote);
    }

    let delta = if voice.invert_list.is_empty() {
        0.0
    } else {
        calculate_invert(voice, &pitch)
    };
    let base = add_pitch_with_delta(voice, &pitch, cents, hertz, None, delta)?;

    // Chord tones are measured from the resolved base; the voice's
    // transposition is already in it, so they append without re-applying it.
    for degrees in voice.intervals.clone() {
        let semitones = scalar_interval(degrees, &voice.context.key, (base.letter, base.accidental));
        let tone = resolve(&base, semitones, &voice.context, None);
        append_to_event(voice, &tone, cents, 0.0)?;
    }
    for (semitones, direction) in voice.semitone_intervals.clone() {
        let tone = resolve(&base, semitones, &voice.context, direction);
        append_to_event(voice, &tone, cents, 0.0)?;
    }

    push_beat_value(voice);
    voice.previous_note_played = voice.last_note_played.take();
    voice.last_note_played = Some(base);
    voice.current_octave = base.octave;
    Ok(())
}

/// Measuring mode: record the pitch number into the first/last trackers of
/// the innermost open measurement.
fn record_measured(voice: &mut Voice, pitch: &SymbolicPitch) {
    let canonical = resolve(pitch, 0, &voice.context, None);
    let number = canonical.number() - voice.pitch_number_offset;
    let open = voice.just_measuring;
    if voice.first_pitch.len() < open {
        voice.first_pitch.push(number);
    } else if voice.last_pitch.len() < open {
        voice.last_pitch.push(number);
    }
}

/// Symbolic pitch for a pitch number under the voice's temperament.
///
/// Fractional input floors; callers read the letter or octave off the
/// result.
///
/// # Errors
/// `InvalidArgument` for non-finite input.
pub fn num_to_pitch(voice: &Voice, number: f64) -> Result<SymbolicPitch, PitchError> {
    if !number.is_finite() {
        return Err(PitchError::InvalidArgument(format!(
            "pitch number {number}"
        )));
    }
    Ok(number_to_pitch(
        number.floor() as i32 + voice.pitch_number_offset,
        &voice.context.temperament,
        &voice.context.starting_pitch,
        voice.pitch_number_offset,
    ))
}

/// Re-anchor pitch-number conversion so the given pitch becomes number 0.
pub fn set_pitch_number_offset(
    voice: &mut Voice,
    letter: Letter,
    accidental: Accidental,
    octave: OctaveSpec,
) {
    let octave = calc_octave(
        voice.current_octave,
        octave,
        voice.last_note_played.as_ref(),
        (letter, accidental),
    );
    voice.pitch_number_offset = SymbolicPitch::new(letter, accidental, octave).number();
}

/// Change between the last two notes played, in half steps or scale steps.
/// Zero until two notes have been played.
pub fn delta_pitch(voice: &Voice, kind: DeltaKind) -> i32 {
    let (previous, last) = match (&voice.previous_note_played, &voice.last_note_played) {
        (Some(previous), Some(last)) => (previous, last),
        _ => return 0,
    };
    let delta = last.number() - previous.number();
    match kind {
        DeltaKind::Semitone => delta,
        DeltaKind::Scalar => voice
            .context
            .key
            .scalar_distance((previous.letter, previous.accidental), delta),
    }
}

/// Semitones to the adjacent scale degree from the last note played
/// (G when nothing has been played yet).
pub fn consonant_step_size(voice: &Voice, direction: Direction) -> i32 {
    let (letter, accidental) = voice
        .last_note_played
        .map(|pitch| (pitch.letter, pitch.accidental))
        .unwrap_or((Letter::G, Accidental::Natural));
    match direction {
        Direction::Up => voice.context.key.step_size_up(letter, accidental),
        Direction::Down => voice.context.key.step_size_down(letter, accidental),
    }
}
