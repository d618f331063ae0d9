//! ElevenLabs text-to-speech: the enhanced network voice.

use async_trait::async_trait;
use tracing::{debug, error};

use spellcast_core::text_prep::is_blank;
use spellcast_core::types::VoiceConfig;

use super::{SpeechError, SpeechProvider, read_audio};
use crate::playback::AudioOut;

/// Thin client for the ElevenLabs synthesis endpoint. Also backs the
/// `/tts` proxy route.
#[derive(Clone)]
pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model_id: String,
    default_voice: String,
}

impl ElevenLabsClient {
    pub fn new(config: &VoiceConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.elevenlabs_api_key.clone().filter(|k| !k.is_empty()),
            base_url: config.elevenlabs_url.trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            default_voice: config.voice_id.clone(),
        }
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Synthesize `text` to mp3 bytes with `voice_id` (or the default voice).
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: Option<&str>,
    ) -> Result<Vec<u8>, SpeechError> {
        let api_key = self.api_key.as_deref().ok_or(SpeechError::NotConfigured)?;
        if is_blank(text) {
            return Err(SpeechError::EmptyText);
        }

        let voice = voice_id.filter(|v| !v.is_empty()).unwrap_or(&self.default_voice);
        let url = format!("{}/v1/text-to-speech/{voice}", self.base_url);
        let body = serde_json::json!({
            "text": text,
            "model_id": self.model_id,
            "voice_settings": {
                "stability": 0.35,
                "similarity_boost": 0.9,
                "style": 0.4,
                "use_speaker_boost": true,
            },
        });

        debug!("elevenlabs: POST {} chars (voice {voice})", text.len());

        let resp = self
            .http
            .post(&url)
            .header("xi-api-key", api_key)
            .header("accept", "audio/mpeg")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("elevenlabs: error {status}: {body}");
            return Err(SpeechError::Service { status, body });
        }

        let audio = read_audio(resp).await?;
        debug!("elevenlabs: received {} bytes", audio.len());
        Ok(audio)
    }
}

/// The enhanced voice: ElevenLabs synthesis played on the shared output.
pub struct ElevenLabsVoice {
    client: ElevenLabsClient,
    audio: AudioOut,
}

impl ElevenLabsVoice {
    pub fn new(client: ElevenLabsClient, audio: AudioOut) -> Self {
        Self { client, audio }
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsVoice {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    fn is_available(&self) -> bool {
        self.client.is_configured()
    }

    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let audio = self.client.synthesize(text, None).await?;
        self.audio.play(audio).await
    }

    fn stop(&self) {
        self.audio.stop();
    }
}
