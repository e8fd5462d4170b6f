use serde::{Deserialize, Serialize};

use crate::data_uri::{DataUri, DataUriError};

/// Input of the OCR collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractTextInput {
    /// Image or document as `data:<mimetype>;base64,<encoded_data>`.
    pub image_data_uri: String,
}

impl ExtractTextInput {
    pub fn new(image: &DataUri) -> Self {
        Self {
            image_data_uri: image.to_string(),
        }
    }

    /// Build from raw file bytes, e.g. the contents of a picked file.
    pub fn from_bytes(mime_type: &str, bytes: Vec<u8>) -> Self {
        Self::new(&DataUri::new(mime_type, bytes))
    }

    /// Decode the carried data URI.
    pub fn image(&self) -> Result<DataUri, DataUriError> {
        DataUri::parse(&self.image_data_uri)
    }
}

/// Result of the OCR collaborator.
///
/// An unclear result never carries text: constructing or deserializing one
/// with `isClear: false` discards any `extractedText`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawExtraction")]
pub struct ExtractTextOutput {
    is_clear: bool,
    extracted_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExtraction {
    is_clear: bool,
    #[serde(default)]
    extracted_text: String,
}

impl From<RawExtraction> for ExtractTextOutput {
    fn from(raw: RawExtraction) -> Self {
        Self::new(raw.is_clear, raw.extracted_text)
    }
}

impl ExtractTextOutput {
    pub fn new(is_clear: bool, extracted_text: impl Into<String>) -> Self {
        if !is_clear {
            return Self::unclear();
        }
        Self {
            is_clear,
            extracted_text: extracted_text.into(),
        }
    }

    pub fn clear(extracted_text: impl Into<String>) -> Self {
        Self::new(true, extracted_text)
    }

    pub fn unclear() -> Self {
        Self {
            is_clear: false,
            extracted_text: String::new(),
        }
    }

    pub fn is_clear(&self) -> bool {
        self.is_clear
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    /// The extracted text, or `None` if the image was unreadable.
    pub fn into_text(self) -> Option<String> {
        self.is_clear.then_some(self.extracted_text)
    }
}

/// The remote OCR model.
///
/// Unreadable input is reported through [`ExtractTextOutput::unclear`], not
/// as an error. Errors are reserved for upstream failures.
pub trait TextExtractor {
    fn extract_text(
        &mut self,
        input: &ExtractTextInput,
    ) -> Result<ExtractTextOutput, Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unclear_result_never_carries_text() {
        let output: ExtractTextOutput =
            serde_json::from_str(r#"{"isClear":false,"extractedText":"smudged guess"}"#).unwrap();
        assert!(!output.is_clear());
        assert_eq!(output.extracted_text(), "");
        assert_eq!(output.clone().into_text(), None);

        assert_eq!(ExtractTextOutput::new(false, "anything"), ExtractTextOutput::unclear());
    }

    #[test]
    fn clear_result_keeps_text() {
        let output: ExtractTextOutput =
            serde_json::from_str(r#"{"isClear":true,"extractedText":"EXIT"}"#).unwrap();
        assert_eq!(output, ExtractTextOutput::clear("EXIT"));
        assert_eq!(output.into_text().as_deref(), Some("EXIT"));
    }

    #[test]
    fn missing_text_field_deserializes_as_empty() {
        let output: ExtractTextOutput = serde_json::from_str(r#"{"isClear":false}"#).unwrap();
        assert_eq!(output, ExtractTextOutput::unclear());
    }

    #[test]
    fn output_serializes_with_remote_field_names() {
        let json = serde_json::to_string(&ExtractTextOutput::unclear()).unwrap();
        assert_eq!(json, r#"{"isClear":false,"extractedText":""}"#);
    }

    #[test]
    fn input_carries_a_data_uri() {
        let input = ExtractTextInput::from_bytes("image/png", vec![0x89, b'P', b'N', b'G']);
        assert_eq!(input.image_data_uri, "data:image/png;base64,iVBORw==");
        assert_eq!(input.image().unwrap().data(), &[0x89, b'P', b'N', b'G']);

        let json = serde_json::to_string(&input).unwrap();
        assert!(json.starts_with(r#"{"imageDataUri":"data:image/png"#));
    }
}
