//! Shared types for the spellcast drill engine.
//!
//! These types are used across spellcast-lib and spellcast-cli. Keeping them in
//! spellcast-core means consumers (a UI, a test harness) can depend on them
//! without pulling in tokio, rodio, or other heavy deps.

use serde::{Deserialize, Serialize};

/// Number of tries a word gets before its spelling is revealed.
pub const MAX_TRIES: u8 = 2;

// ─── Voice types ───────────────────────────────────────────────────────────

/// Voice chain configuration.
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// ElevenLabs API key. Without one the enhanced voice is skipped.
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_url: String,
    pub voice_id: String,
    pub model_id: String,
    /// Local Kokoro server used as the fallback voice.
    pub kokoro_url: String,
    pub kokoro_voice: String,
    pub speed: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            elevenlabs_api_key: None,
            elevenlabs_url: "https://api.elevenlabs.io".into(),
            voice_id: "21m00Tcm4TlvDq8ikWAM".into(),
            model_id: "eleven_multilingual_v2".into(),
            kokoro_url: "http://localhost:3001".into(),
            kokoro_voice: "af_heart".into(),
            speed: 0.95,
        }
    }
}

/// Observable announcer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncerState {
    Idle,
    Speaking,
}

/// Announcer status snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncerStatus {
    pub state: AnnouncerState,
    /// Turn counter; bumped every time a new announcement preempts the old one.
    pub turn: u64,
    /// Name of the provider that spoke last, if any did.
    pub last_voice: Option<String>,
}

/// Answer to the "is the enhanced voice available" capability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceAvailability {
    pub enabled: bool,
    /// "elevenlabs" | "fallback"
    pub provider: String,
}

// ─── Session types ─────────────────────────────────────────────────────────

/// A word in the drill set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: u32,
    pub text: String,
    #[serde(default)]
    pub incorrect_attempts: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Practicing,
    Complete,
}

/// Progress on the word at the front of the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub tries_left: u8,
    pub revealed: bool,
    pub draft_answer: String,
}

impl Default for Attempt {
    fn default() -> Self {
        Self {
            tries_left: MAX_TRIES,
            revealed: false,
            draft_answer: String::new(),
        }
    }
}

fn default_tries() -> u8 {
    MAX_TRIES
}

/// Serializable full session state.
///
/// Missing optional fields fall back to their fresh values so older or
/// hand-edited snapshots still load; a missing word list does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default)]
    pub queue_ids: Vec<u32>,
    #[serde(default)]
    pub mastered_ids: Vec<u32>,
    #[serde(default = "default_tries")]
    pub tries_left: u8,
    #[serde(default)]
    pub revealed: bool,
    #[serde(default)]
    pub draft_answer: String,
    #[serde(default)]
    pub phase: Phase,
}

/// Read model handed to the UI after every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub current_word: Option<Word>,
    pub mastered: usize,
    pub remaining: usize,
    pub total: usize,
    pub total_mistakes: u32,
    pub current_mistakes: u32,
    pub tries_left: u8,
    pub revealed: bool,
    pub phase: Phase,
    pub draft_answer: String,
}

/// Something the engine wants said or shown after a transition.
///
/// Cues of one transition form a turn and are listed in the order they must
/// be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Cue {
    /// Correct answer; the UI may play its celebration.
    Celebrate,
    /// Praise after a correct answer.
    Correct,
    /// Encouragement after a wrong answer with tries remaining.
    TryAgain,
    /// Tries exhausted; the word is shown and should be copied.
    Reveal { word: String },
    /// Say the word, optionally preceded by the intro phrase.
    Announce { word: String, intro: bool },
}
