use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::data_uri::{DataUri, DataUriError};
use crate::wav::{read_wav, PcmFormat, WavError, WAV_MIME};
use crate::SpeechClip;

#[derive(thiserror::Error, Debug)]
pub enum SpeechError {
    #[error("Text is empty. Enter some text to generate speech.")]
    EmptyText,
    #[error("Speech generation returned no audio")]
    MissingAudioPayload,
    #[error("Speech generation failed: {0}")]
    Collaborator(String),
    #[error("Invalid audio payload: {0}")]
    DataUri(#[from] DataUriError),
    #[error("Invalid WAV payload: {0}")]
    Wav(#[from] WavError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input of the speech generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    pub text: String,
    /// Prebuilt voice id. `None` uses the configured default voice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_name: None,
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice_name = Some(voice.into());
        self
    }
}

/// Output of [`generate_speech`]: a playable WAV data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechOutput {
    pub media: String,
}

/// The remote speech model.
///
/// Implementations perform one remote call per [`generate`](Self::generate)
/// with no retries, and return the audio exactly as the model produced it.
pub trait SpeechGenerator {
    /// Generate speech for `request`.
    ///
    /// Returns the model's media as a data URI (typically raw PCM such as
    /// `data:audio/L16;codec=pcm;rate=24000;base64,...`), or `None` when the
    /// model answered without audio. `request.voice_name` is always set.
    fn generate(
        &mut self,
        request: &SpeechRequest,
    ) -> Result<Option<String>, Box<dyn std::error::Error>>;

    /// Generate speech and decode it into a [`SpeechClip`] using default settings.
    fn synthesize(&mut self, request: &SpeechRequest) -> Result<SpeechClip, SpeechError> {
        synthesize_clip(self, request, &Settings::default())
    }

    /// Generate speech and write it to a WAV file.
    ///
    /// Default implementation calls `synthesize()` then `SpeechClip::write_wav()`.
    fn synthesize_to_file(
        &mut self,
        request: &SpeechRequest,
        wav_path: &Path,
    ) -> Result<(), SpeechError> {
        self.synthesize(request)?.write_wav(wav_path)?;
        Ok(())
    }
}

/// Call the collaborator and decode its audio into a [`SpeechClip`].
///
/// The request's voice falls back to `settings.default_voice`. Raw audio is
/// interpreted with `settings.pcm`, overridden by `rate`/`channels` MIME
/// parameters when the model supplies them. WAV payloads are decoded and
/// their own format used.
pub fn synthesize_clip<G: SpeechGenerator + ?Sized>(
    generator: &mut G,
    request: &SpeechRequest,
    settings: &Settings,
) -> Result<SpeechClip, SpeechError> {
    if request.text.trim().is_empty() {
        return Err(SpeechError::EmptyText);
    }

    let request = SpeechRequest {
        text: request.text.clone(),
        voice_name: Some(
            request
                .voice_name
                .clone()
                .unwrap_or_else(|| settings.default_voice.clone()),
        ),
    };

    log::debug!(
        "Requesting speech for {} chars with voice {:?}",
        request.text.chars().count(),
        request.voice_name
    );

    let media = generator
        .generate(&request)
        .map_err(|e| SpeechError::Collaborator(e.to_string()))?
        .ok_or(SpeechError::MissingAudioPayload)?;

    let audio = DataUri::parse(&media)?;
    if audio.is_mime(WAV_MIME) || audio.is_mime("audio/x-wav") || audio.is_mime("audio/wave") {
        let (format, pcm) = read_wav(audio.data())?;
        return Ok(SpeechClip { pcm, format });
    }

    let format = pcm_format_for(&audio, settings.pcm);
    log::info!(
        "Received {} bytes of {} audio ({} ch, {} Hz)",
        audio.data().len(),
        audio.mime_type(),
        format.channels,
        format.sample_rate
    );
    Ok(SpeechClip {
        pcm: audio.into_data(),
        format,
    })
}

/// Generate speech and return it as a `data:audio/wav;base64,...` URI.
pub fn generate_speech<G: SpeechGenerator + ?Sized>(
    generator: &mut G,
    request: &SpeechRequest,
    settings: &Settings,
) -> Result<SpeechOutput, SpeechError> {
    let clip = synthesize_clip(generator, request, settings)?;
    Ok(SpeechOutput {
        media: clip.to_data_uri(),
    })
}

fn pcm_format_for(audio: &DataUri, fallback: PcmFormat) -> PcmFormat {
    let mut format = fallback;
    if let Some(rate) = audio
        .param("rate")
        .and_then(|r| r.parse::<u32>().ok())
        .filter(|&r| r > 0)
    {
        format.sample_rate = rate;
    }
    if let Some(channels) = audio
        .param("channels")
        .and_then(|c| c.parse::<u16>().ok())
        .filter(|&c| c > 0)
    {
        format.channels = channels;
    }
    // L16 is 16-bit by definition (RFC 2586).
    if audio.is_mime("audio/L16") {
        format.sample_width = 2;
    }
    format
}
