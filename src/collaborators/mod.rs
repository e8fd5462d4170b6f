//! Contracts of the hosted AI models.
//!
//! Each collaborator is a single remote call with at-most-once semantics.
//! The crate defines the inputs, outputs and failure signals; callers plug in
//! the actual transport by implementing the traits.
//!
//! | Trait | Input | Output | Failure |
//! |---|---|---|---|
//! | [`SpeechGenerator`] | text, optional voice | audio data URI | [`SpeechError::MissingAudioPayload`] when no audio |
//! | [`TextExtractor`] | image data URI | `{ isClear, extractedText }` | unreadable ⇒ unclear result, not an error |
//! | [`Translator`] | text, target language | `{ translatedText }` | upstream error |
//! | [`GrammarCorrector`] | text | `{ correctedText }` | upstream error |
//!
//! Retries, if any, belong to the implementations.

pub mod ocr;
pub mod speech;
pub mod text;

pub use ocr::{ExtractTextInput, ExtractTextOutput, TextExtractor};
pub use speech::{
    generate_speech, synthesize_clip, SpeechError, SpeechGenerator, SpeechOutput, SpeechRequest,
};
pub use text::{
    CorrectGrammarInput, CorrectGrammarOutput, GrammarCorrector, TranslateInput, TranslateOutput,
    Translator,
};
