use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::voices::{find_prebuilt, language_by_name, DEFAULT_VOICE};
use crate::wav::PcmFormat;

/// Speech model the generation collaborator is expected to call.
pub const DEFAULT_SPEECH_MODEL: &str = "googleai/gemini-2.5-flash-preview-tts";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown voice '{0}'")]
    UnknownVoice(String),
    #[error("Unknown target language '{0}'")]
    UnknownLanguage(String),
    #[error("Invalid PCM format: {0}")]
    InvalidPcm(String),
}

/// Application settings.
///
/// Every field has a default, so a settings file only needs the keys it
/// changes:
///
/// ```json
/// { "defaultVoice": "Rigel", "pcm": { "sampleRate": 16000 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Prebuilt voice used when a request names none.
    pub default_voice: String,
    /// Format assumed for raw audio that arrives without `rate`/`channels`
    /// parameters.
    pub pcm: PcmFormat,
    pub speech_model: String,
    /// Language preselected for translation.
    pub target_language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_voice: DEFAULT_VOICE.to_string(),
            pcm: PcmFormat::default(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            target_language: "Spanish".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&content)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the voice and language names refer to known catalog entries
    /// and that the fallback PCM format is playable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pcm.validate().map_err(ConfigError::InvalidPcm)?;
        if find_prebuilt(&self.default_voice).is_none() {
            return Err(ConfigError::UnknownVoice(self.default_voice.clone()));
        }
        if language_by_name(&self.target_language).is_none() {
            return Err(ConfigError::UnknownLanguage(self.target_language.clone()));
        }
        Ok(())
    }
}
