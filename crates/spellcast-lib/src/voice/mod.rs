//! Speech providers and the ranked fallback chain.
//!
//! A provider turns text into audible speech and resolves when the speech has
//! finished. The chain tries providers in rank order; the first success wins
//! and a chain where everything failed completes silently. Speech is best
//! effort and never surfaces an error to the session.

pub mod elevenlabs;
pub mod kokoro;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::{debug, warn};

use spellcast_core::text_prep::is_speakable;
use spellcast_core::types::{VoiceAvailability, VoiceConfig};

use crate::playback::AudioOut;

pub use elevenlabs::{ElevenLabsClient, ElevenLabsVoice};
pub use kokoro::KokoroVoice;

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("voice service not configured")]
    NotConfigured,
    #[error("nothing to say")]
    EmptyText,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("voice service error {status}: {body}")]
    Service { status: u16, body: String },
    #[error("no audio output available")]
    NoAudioOutput,
    #[error("could not decode audio: {0}")]
    Decode(String),
    #[error("playback interrupted")]
    Interrupted,
}

/// Upper bound on a single clip; a spoken word is a few kilobytes.
pub const MAX_AUDIO_BYTES: usize = 8 * 1024 * 1024;

/// Stream a synthesis response body, refusing clips over [`MAX_AUDIO_BYTES`].
pub(crate) async fn read_audio(resp: reqwest::Response) -> Result<Vec<u8>, SpeechError> {
    let mut audio = Vec::new();
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if audio.len() + chunk.len() > MAX_AUDIO_BYTES {
            return Err(SpeechError::Decode(format!(
                "clip larger than {MAX_AUDIO_BYTES} bytes"
            )));
        }
        audio.extend_from_slice(&chunk);
    }
    Ok(audio)
}

/// A speech backend.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Short name for logs and status.
    fn name(&self) -> &'static str;

    /// Whether this provider is configured at all. Unavailable providers are
    /// skipped without a request.
    fn is_available(&self) -> bool {
        true
    }

    /// Speak `text`, resolving when it has finished playing.
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;

    /// Cut off whatever this provider is currently playing.
    fn stop(&self) {}
}

/// Ranked providers, primary first.
#[derive(Clone, Default)]
pub struct VoiceChain {
    providers: Vec<Arc<dyn SpeechProvider>>,
}

impl VoiceChain {
    pub fn new(providers: Vec<Arc<dyn SpeechProvider>>) -> Self {
        Self { providers }
    }

    /// ElevenLabs first, local Kokoro second, sharing one playback thread.
    pub fn from_config(config: &VoiceConfig) -> Self {
        let audio = AudioOut::spawn();
        let cloud = ElevenLabsClient::new(config);
        Self::new(vec![
            Arc::new(ElevenLabsVoice::new(cloud, audio.clone())),
            Arc::new(KokoroVoice::new(config, audio)),
        ])
    }

    /// Speak through the first provider that succeeds.
    ///
    /// Returns the name of that provider, or `None` when every provider
    /// failed or playback was interrupted.
    pub async fn speak(&self, text: &str) -> Option<&'static str> {
        if !is_speakable(text) {
            return None;
        }
        for provider in &self.providers {
            if !provider.is_available() {
                continue;
            }
            match provider.speak(text).await {
                Ok(()) => {
                    debug!("voice: {} spoke {} chars", provider.name(), text.len());
                    return Some(provider.name());
                }
                Err(SpeechError::Interrupted) => {
                    debug!("voice: {} interrupted", provider.name());
                    return None;
                }
                Err(e) => {
                    warn!("voice: {} failed, trying next: {e}", provider.name());
                }
            }
        }
        warn!("voice: no provider could speak, staying silent");
        None
    }

    /// Stop playback on every provider.
    pub fn interrupt(&self) {
        for provider in &self.providers {
            provider.stop();
        }
    }

    /// Capability check for the primary (enhanced) voice.
    pub fn availability(&self) -> VoiceAvailability {
        let enabled = self.providers.first().is_some_and(|p| p.is_available());
        VoiceAvailability {
            enabled,
            provider: if enabled {
                self.providers[0].name().to_string()
            } else {
                "fallback".to_string()
            },
        }
    }
}
