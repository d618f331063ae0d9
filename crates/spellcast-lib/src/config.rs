//! Application configuration, loaded from the environment at startup.

use std::path::PathBuf;

use spellcast_core::types::VoiceConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("no data directory on this platform; set SPELLCAST_STATE_DIR")]
    NoStateDir,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub voice: VoiceConfig,
    /// Directory the session snapshot is written to.
    pub state_dir: PathBuf,
}

impl AppConfig {
    /// Defaults overridden by `ELEVENLABS_API_KEY`, `ELEVENLABS_VOICE_ID`,
    /// `ELEVENLABS_URL`, `KOKORO_URL`, `KOKORO_VOICE`, `KOKORO_SPEED` and
    /// `SPELLCAST_STATE_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut voice = VoiceConfig {
            elevenlabs_api_key: var("ELEVENLABS_API_KEY").filter(|k| !k.trim().is_empty()),
            ..Default::default()
        };
        if let Some(id) = var("ELEVENLABS_VOICE_ID") {
            voice.voice_id = id;
        }
        if let Some(url) = var("ELEVENLABS_URL") {
            voice.elevenlabs_url = url;
        }
        if let Some(url) = var("KOKORO_URL") {
            voice.kokoro_url = url;
        }
        if let Some(name) = var("KOKORO_VOICE") {
            voice.kokoro_voice = name;
        }
        if let Some(speed) = var("KOKORO_SPEED") {
            voice.speed = speed
                .parse::<f32>()
                .ok()
                .filter(|s| *s > 0.0)
                .ok_or_else(|| ConfigError::InvalidValue("KOKORO_SPEED".into(), speed.clone()))?;
        }

        let state_dir = match var("SPELLCAST_STATE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_state_dir()?,
        };

        Ok(Self { voice, state_dir })
    }
}

/// `<platform data dir>/spellcast`.
pub fn default_state_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|d| d.join("spellcast"))
        .ok_or(ConfigError::NoStateDir)
}
