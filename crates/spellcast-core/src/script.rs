//! Turning engine cues into a spoken script.
//!
//! A turn is the ordered list of utterances one transition produces. The
//! announcer plays a turn front to back; nothing here touches audio.

use std::time::Duration;

use rand::Rng;

use crate::types::Cue;

/// Phrase spoken before a word the first time it is presented.
pub const INTRO_PHRASE: &str = "The next word is:";

/// Gap between the intro phrase and the word.
pub const INTRO_PAUSE: Duration = Duration::from_millis(350);

/// Gap between two back-to-back phrases (praise → next word, copy → later).
pub const BEAT_PAUSE: Duration = Duration::from_millis(250);

pub const CORRECT_LINES: &[&str] = &[
    "Great job!",
    "Well done!",
    "Excellent!",
    "Nice work!",
    "Awesome spelling!",
];

pub const TRY_AGAIN_LINES: &[&str] = &[
    "That's okay. Let's try again.",
    "Almost there. Give it another try.",
    "Good effort! Listen carefully and try once more.",
    "You can do it. Try again.",
];

pub const COPY_LATER_LINE: &str = "You can try this word again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    Say(String),
    Pause(Duration),
}

/// Expand `cues` into the utterances to play, in order.
///
/// [`Cue::Celebrate`] is visual only and produces no speech.
pub fn script<R: Rng + ?Sized>(cues: &[Cue], rng: &mut R) -> Vec<Utterance> {
    let mut out = Vec::new();
    let spoken: Vec<&Cue> = cues.iter().filter(|c| !matches!(c, Cue::Celebrate)).collect();

    for (i, cue) in spoken.iter().enumerate() {
        match cue {
            Cue::Celebrate => {}
            Cue::Correct => {
                out.push(Utterance::Say(pick(CORRECT_LINES, rng).to_string()));
                if matches!(spoken.get(i + 1), Some(Cue::Announce { .. })) {
                    out.push(Utterance::Pause(BEAT_PAUSE));
                }
            }
            Cue::TryAgain => {
                out.push(Utterance::Say(pick(TRY_AGAIN_LINES, rng).to_string()));
            }
            Cue::Reveal { word } => {
                out.push(Utterance::Say(format!("Let's copy the word, {word}.")));
                out.push(Utterance::Pause(BEAT_PAUSE));
                out.push(Utterance::Say(COPY_LATER_LINE.to_string()));
            }
            Cue::Announce { word, intro } => {
                if *intro {
                    out.push(Utterance::Say(INTRO_PHRASE.to_string()));
                    out.push(Utterance::Pause(INTRO_PAUSE));
                }
                out.push(Utterance::Say(word.clone()));
            }
        }
    }

    out
}

/// Uniform pick from a fixed, non-empty phrase set.
fn pick<'a, R: Rng + ?Sized>(lines: &[&'a str], rng: &mut R) -> &'a str {
    lines[rng.random_range(0..lines.len())]
}
