//! # hearsay-rs
//!
//! Core of the HearSay text-to-speech front-end.
//!
//! ## Features
//!
//! - **PCM → WAV**: wrap the raw PCM returned by a cloud speech model in a
//!   canonical 44-byte WAV header and hand it out as a `data:` URI
//! - **Collaborator contracts**: typed inputs/outputs for speech generation,
//!   OCR, translation and grammar correction
//! - **Voices**: prebuilt cloud voices and a platform voice lookup table with
//!   a fixed language fallback chain
//! - **Session**: request sequencing so the latest request always wins
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! hearsay-rs = "2026.10"
//! ```
//!
//! ```rust
//! use hearsay_rs::wav::{wav_data_uri, PcmFormat};
//!
//! // 24 kHz mono 16-bit, as returned by the speech model
//! let pcm = vec![0u8; 48000];
//! let src = wav_data_uri(&pcm, PcmFormat::default());
//! assert!(src.starts_with("data:audio/wav;base64,"));
//! ```
//!
//! Plugging in a speech model:
//!
//! ```rust,ignore
//! use hearsay_rs::{config::Settings, session::Session};
//!
//! let mut session = Session::new(Settings::default());
//! session.set_text("Hello, world!");
//! session.speak(&mut my_cloud_client)?;
//! let src = session.audio_src();
//! ```

pub mod collaborators;
pub mod config;
pub mod data_uri;
pub mod session;
pub mod voices;
pub mod wav;

use std::path::Path;

pub use collaborators::{SpeechError, SpeechGenerator, SpeechRequest};
pub use data_uri::DataUri;
pub use wav::PcmFormat;

/// Decoded speech audio.
///
/// Contains raw little-endian PCM bytes and the format they are laid out in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechClip {
    /// Interleaved PCM bytes, exactly as received
    pub pcm: Vec<u8>,
    pub format: PcmFormat,
}

impl SpeechClip {
    /// The clip as a WAV container.
    pub fn to_wav(&self) -> Vec<u8> {
        wav::encode_wav(&self.pcm, self.format)
    }

    /// The clip as a `data:audio/wav;base64,...` URI.
    pub fn to_data_uri(&self) -> String {
        wav::wav_data_uri(&self.pcm, self.format)
    }

    /// Write the clip to a WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), std::io::Error> {
        std::fs::write(path, self.to_wav())?;
        log::info!("Wrote {} bytes of audio to {}", self.pcm.len(), path.display());
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.format.duration_secs(self.pcm.len())
    }
}
