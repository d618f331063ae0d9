//! Local Kokoro server: the fallback voice.

use async_trait::async_trait;
use tracing::{debug, error};

use spellcast_core::types::VoiceConfig;

use super::{SpeechError, SpeechProvider, read_audio};
use crate::playback::AudioOut;

pub struct KokoroVoice {
    http: reqwest::Client,
    url: String,
    voice: String,
    speed: f32,
    audio: AudioOut,
}

impl KokoroVoice {
    pub fn new(config: &VoiceConfig, audio: AudioOut) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: speech_endpoint(&config.kokoro_url),
            voice: config.kokoro_voice.clone(),
            speed: config.speed,
            audio,
        }
    }
}

fn speech_endpoint(base: &str) -> String {
    format!("{}/v1/audio/speech", base.trim_end_matches('/'))
}

#[async_trait]
impl SpeechProvider for KokoroVoice {
    fn name(&self) -> &'static str {
        "kokoro"
    }

    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let body = serde_json::json!({
            "input": text,
            "voice": self.voice,
            "model": "kokoro",
            "response_format": "wav",
            "speed": self.speed,
        });

        debug!("kokoro: POST {} chars", text.len());

        let resp = self.http.post(&self.url).json(&body).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            error!("kokoro: error {status}: {body}");
            return Err(SpeechError::Service { status, body });
        }

        let audio = read_audio(resp).await?;
        self.audio.play(audio).await
    }

    fn stop(&self) {
        self.audio.stop();
    }
}
