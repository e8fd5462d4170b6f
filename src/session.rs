//! Front-end session state.
//!
//! A [`Session`] holds what the user is working on (text, chosen voice,
//! target language) and what the collaborators produced (the playable audio
//! URI). Each state slot that a remote call can overwrite is guarded by a
//! [`RequestSequencer`]: every request carries a [`RequestToken`], and a
//! completion is applied only if its token is still the latest one issued for
//! that slot. A slow answer to an old request can therefore never replace
//! the answer to a newer one.
//!
//! ```rust
//! use hearsay_rs::session::{Completion, Session};
//! use hearsay_rs::collaborators::SpeechOutput;
//! use hearsay_rs::config::Settings;
//!
//! let mut session = Session::new(Settings::default());
//! session.set_text("Hello there");
//!
//! let (first, _) = session.begin_speech()?;
//! let (second, _) = session.begin_speech()?;
//!
//! let newer = SpeechOutput { media: "data:audio/wav;base64,Mg==".into() };
//! let older = SpeechOutput { media: "data:audio/wav;base64,MQ==".into() };
//! assert_eq!(session.finish_speech(second, Ok(newer))?, Completion::Applied);
//! assert_eq!(session.finish_speech(first, Ok(older))?, Completion::Stale);
//! assert_eq!(session.audio_src(), Some("data:audio/wav;base64,Mg=="));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::collaborators::{
    generate_speech, CorrectGrammarInput, ExtractTextInput, GrammarCorrector, SpeechError,
    SpeechGenerator, SpeechOutput, SpeechRequest, TextExtractor, TranslateInput, Translator,
};
use crate::config::Settings;
use crate::data_uri::DataUri;
use crate::voices::{find_prebuilt, language_by_name, VoiceMatch, VoiceTable};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Text is empty. Enter some text first.")]
    EmptyText,
    #[error("Unknown voice '{0}'")]
    UnknownVoice(String),
    #[error("Unknown target language '{0}'")]
    UnknownLanguage(String),
    #[error("The image is not clear enough to read text from")]
    UnreadableImage,
    #[error(transparent)]
    Speech(#[from] SpeechError),
    #[error("Request failed: {0}")]
    Collaborator(String),
}

/// Identifies one request within a [`RequestSequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Issues monotonically increasing request tokens.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    /// Last issued token; 0 before the first request.
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no token newer than `token` has been issued.
    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    pub fn latest(&self) -> Option<RequestToken> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(RequestToken(n)),
        }
    }
}

/// Whether a completion was applied to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request was issued after this one, or this one was already
    /// finished; the result was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No audio loaded.
    #[default]
    Idle,
    Playing,
    Paused,
}

pub struct Session {
    settings: Settings,
    text: String,
    voice: String,
    target_language: String,
    audio_src: Option<String>,
    /// Outstanding request per slot; cleared once its result is applied.
    speech_pending: Option<RequestToken>,
    text_pending: Option<RequestToken>,
    playback: PlaybackState,
    speech_requests: RequestSequencer,
    text_requests: RequestSequencer,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            text: String::new(),
            voice: settings.default_voice.clone(),
            target_language: settings.target_language.clone(),
            audio_src: None,
            speech_pending: None,
            text_pending: None,
            playback: PlaybackState::Idle,
            speech_requests: RequestSequencer::new(),
            text_requests: RequestSequencer::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text with the user's own edit.
    ///
    /// Any text request still in flight is superseded, so its result can not
    /// overwrite the edit.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Some(token) = self.text_pending.take() {
            log::debug!("Text edited while {token:?} was in flight");
        }
        self.text_requests.issue();
        self.text = text.into();
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Select a prebuilt voice by id (case-insensitive).
    pub fn select_voice(&mut self, id: &str) -> Result<(), SessionError> {
        let voice =
            find_prebuilt(id).ok_or_else(|| SessionError::UnknownVoice(id.to_string()))?;
        self.voice = voice.id.to_string();
        Ok(())
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn select_target_language(&mut self, name: &str) -> Result<(), SessionError> {
        let language =
            language_by_name(name).ok_or_else(|| SessionError::UnknownLanguage(name.to_string()))?;
        self.target_language = language.name.to_string();
        Ok(())
    }

    /// Pick a platform voice for the target language, for local playback
    /// through the host's speech synthesis instead of the cloud model.
    pub fn platform_voice<'a>(&self, table: &'a VoiceTable) -> Option<VoiceMatch<'a>> {
        let tag = language_by_name(&self.target_language)
            .map(|language| language.tag)
            .unwrap_or("en-US");
        table.resolve(tag)
    }

    /// Playable `data:audio/wav;base64,...` URI of the last generated speech.
    pub fn audio_src(&self) -> Option<&str> {
        self.audio_src.as_deref()
    }

    /// True while the latest speech request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.speech_pending.is_some()
    }

    /// True while the latest text request (OCR, translation, grammar) is outstanding.
    pub fn is_text_pending(&self) -> bool {
        self.text_pending.is_some()
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    /// Start a speech request for the current text and voice.
    ///
    /// Clears the previous audio and stops playback. The returned request is
    /// meant for a [`SpeechGenerator`]; hand its result to
    /// [`finish_speech`](Self::finish_speech) with the token.
    pub fn begin_speech(&mut self) -> Result<(RequestToken, SpeechRequest), SessionError> {
        if self.text.trim().is_empty() {
            return Err(SessionError::EmptyText);
        }

        let token = self.speech_requests.issue();
        self.speech_pending = Some(token);
        self.audio_src = None;
        self.playback = PlaybackState::Idle;

        let request = SpeechRequest::new(self.text.clone()).with_voice(self.voice.clone());
        log::debug!("Speech request {token:?} issued");
        Ok((token, request))
    }

    /// Apply the result of a speech request.
    ///
    /// Results of superseded or already finished requests, successful or
    /// not, are dropped and reported as [`Completion::Stale`]. A current
    /// success loads the audio and starts playback.
    pub fn finish_speech(
        &mut self,
        token: RequestToken,
        result: Result<SpeechOutput, SpeechError>,
    ) -> Result<Completion, SessionError> {
        if !self.speech_requests.is_latest(token) || self.speech_pending != Some(token) {
            log::debug!("Dropping stale speech result for {token:?}");
            return Ok(Completion::Stale);
        }

        self.speech_pending = None;
        match result {
            Ok(output) => {
                self.audio_src = Some(output.media);
                self.playback = PlaybackState::Playing;
                Ok(Completion::Applied)
            }
            Err(e) => {
                log::error!("Error generating speech: {e}");
                Err(e.into())
            }
        }
    }

    /// Generate speech for the current text with `generator`.
    pub fn speak<G: SpeechGenerator + ?Sized>(
        &mut self,
        generator: &mut G,
    ) -> Result<Completion, SessionError> {
        let (token, request) = self.begin_speech()?;
        let result = generate_speech(generator, &request, &self.settings);
        self.finish_speech(token, result)
    }

    /// Start a request that will replace the text.
    pub fn begin_text_update(&mut self) -> RequestToken {
        let token = self.text_requests.issue();
        self.text_pending = Some(token);
        token
    }

    /// Apply the result of a text request; stale or repeated results are
    /// dropped.
    pub fn finish_text_update(
        &mut self,
        token: RequestToken,
        result: Result<String, SessionError>,
    ) -> Result<Completion, SessionError> {
        if !self.text_requests.is_latest(token) || self.text_pending != Some(token) {
            log::debug!("Dropping stale text result for {token:?}");
            return Ok(Completion::Stale);
        }

        self.text_pending = None;
        self.text = result?;
        Ok(Completion::Applied)
    }

    /// Replace the text with what OCR reads from `image`.
    ///
    /// An unreadable image leaves the text unchanged and fails with
    /// [`SessionError::UnreadableImage`].
    pub fn extract_text<E: TextExtractor + ?Sized>(
        &mut self,
        extractor: &mut E,
        image: &DataUri,
    ) -> Result<Completion, SessionError> {
        let token = self.begin_text_update();
        let result = extractor
            .extract_text(&ExtractTextInput::new(image))
            .map_err(|e| SessionError::Collaborator(e.to_string()))
            .and_then(|output| output.into_text().ok_or(SessionError::UnreadableImage));
        self.finish_text_update(token, result)
    }

    /// Translate the text into the selected target language.
    pub fn translate<T: Translator + ?Sized>(
        &mut self,
        translator: &mut T,
    ) -> Result<Completion, SessionError> {
        if self.text.trim().is_empty() {
            return Err(SessionError::EmptyText);
        }
        let input = TranslateInput {
            text: self.text.clone(),
            target_language: self.target_language.clone(),
        };

        let token = self.begin_text_update();
        let result = translator
            .translate(&input)
            .map(|output| output.translated_text)
            .map_err(|e| SessionError::Collaborator(e.to_string()));
        self.finish_text_update(token, result)
    }

    /// Replace the text with its grammar-corrected version.
    pub fn correct_grammar<C: GrammarCorrector + ?Sized>(
        &mut self,
        corrector: &mut C,
    ) -> Result<Completion, SessionError> {
        if self.text.trim().is_empty() {
            return Err(SessionError::EmptyText);
        }
        let input = CorrectGrammarInput {
            text: self.text.clone(),
        };

        let token = self.begin_text_update();
        let result = corrector
            .correct_grammar(&input)
            .map(|output| output.corrected_text)
            .map_err(|e| SessionError::Collaborator(e.to_string()));
        self.finish_text_update(token, result)
    }

    /// Play or pause the loaded audio. Does nothing when no audio is loaded.
    pub fn toggle_playback(&mut self) -> PlaybackState {
        self.playback = match (self.playback, self.audio_src.is_some()) {
            (_, false) => PlaybackState::Idle,
            (PlaybackState::Playing, true) => PlaybackState::Paused,
            (_, true) => PlaybackState::Playing,
        };
        self.playback
    }

    /// The audio element reached the end of the clip.
    pub fn playback_ended(&mut self) {
        if self.playback == PlaybackState::Playing {
            self.playback = PlaybackState::Paused;
        }
    }
}
