//! `data:` URIs carrying base64 payloads.
//!
//! Every binary payload crossing a collaborator boundary travels as a data
//! URI: images sent to OCR, raw audio coming back from the speech model, and
//! the finished WAV handed to playback.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = "base64";
const DEFAULT_MIME: &str = "text/plain";

#[derive(thiserror::Error, Debug)]
pub enum DataUriError {
    #[error("Not a data URI: missing 'data:' prefix")]
    MissingPrefix,
    #[error("Malformed data URI: missing ',' before the payload")]
    MissingComma,
    #[error("Data URI payload is not base64-encoded")]
    NotBase64,
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime_type: String,
    params: Vec<(String, String)>,
    data: Vec<u8>,
}

impl DataUri {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            params: Vec::new(),
            data,
        }
    }

    /// Add a `;name=value` parameter after the MIME type.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Parse `data:<mime>[;name=value]*;base64,<payload>`.
    ///
    /// Only the portion before the first `,` is treated as metadata. An empty
    /// MIME type defaults to `text/plain`.
    pub fn parse(uri: &str) -> Result<Self, DataUriError> {
        let rest = strip_scheme(uri.trim_start()).ok_or(DataUriError::MissingPrefix)?;
        let (meta, payload) = rest.split_once(',').ok_or(DataUriError::MissingComma)?;

        let mut parts = meta.split(';');
        let mime_type = match parts.next().map(str::trim) {
            Some(mime) if !mime.is_empty() => mime.to_string(),
            _ => DEFAULT_MIME.to_string(),
        };

        let mut params = Vec::new();
        let mut is_base64 = false;
        for part in parts {
            let part = part.trim();
            if part.eq_ignore_ascii_case(BASE64_MARKER) {
                is_base64 = true;
            } else if let Some((name, value)) = part.split_once('=') {
                params.push((name.trim().to_string(), value.trim().to_string()));
            } else if !part.is_empty() {
                params.push((part.to_string(), String::new()));
            }
        }

        if !is_base64 {
            return Err(DataUriError::NotBase64);
        }

        let data = BASE64.decode(payload.trim())?;
        Ok(Self {
            mime_type,
            params,
            data,
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Case-insensitive lookup of a MIME parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// True when the MIME type (ignoring case) equals `mime`.
    pub fn is_mime(&self, mime: &str) -> bool {
        self.mime_type.eq_ignore_ascii_case(mime)
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}", self.mime_type)?;
        for (name, value) in &self.params {
            if value.is_empty() {
                write!(f, ";{name}")?;
            } else {
                write!(f, ";{name}={value}")?;
            }
        }
        write!(f, ";{BASE64_MARKER},{}", BASE64.encode(&self.data))
    }
}

impl FromStr for DataUri {
    type Err = DataUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn strip_scheme(uri: &str) -> Option<&str> {
    let head = uri.get(..SCHEME.len())?;
    head.eq_ignore_ascii_case(SCHEME)
        .then_some(&uri[SCHEME.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gemini_style_pcm_uri() {
        let uri = "data:audio/L16;codec=pcm;rate=24000;base64,AAECAw==";
        let parsed = DataUri::parse(uri).unwrap();

        assert_eq!(parsed.mime_type(), "audio/L16");
        assert!(parsed.is_mime("audio/l16"));
        assert_eq!(parsed.param("codec"), Some("pcm"));
        assert_eq!(parsed.param("RATE"), Some("24000"));
        assert_eq!(parsed.data(), &[0x00, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn display_writes_params_and_payload() {
        let uri = DataUri::new("audio/wav", vec![1, 2, 3]).with_param("rate", "16000");
        assert_eq!(uri.to_string(), "data:audio/wav;rate=16000;base64,AQID");
        assert_eq!(uri.to_string().parse::<DataUri>().unwrap(), uri);
    }

    #[test]
    fn empty_mime_defaults_to_text_plain() {
        let parsed = DataUri::parse("data:;base64,aGk=").unwrap();
        assert_eq!(parsed.mime_type(), "text/plain");
        assert_eq!(parsed.into_data(), b"hi");
    }

    #[test]
    fn empty_payload_is_allowed() {
        let parsed = DataUri::parse("data:image/png;base64,").unwrap();
        assert!(parsed.data().is_empty());
    }

    #[test]
    fn rejects_malformed_uris() {
        assert!(matches!(
            DataUri::parse("https://example.com/a.wav"),
            Err(DataUriError::MissingPrefix)
        ));
        assert!(matches!(
            DataUri::parse("data:audio/wav;base64"),
            Err(DataUriError::MissingComma)
        ));
        assert!(matches!(
            DataUri::parse("data:text/plain,hello"),
            Err(DataUriError::NotBase64)
        ));
        assert!(matches!(
            DataUri::parse("data:audio/wav;base64,@@@"),
            Err(DataUriError::Base64(_))
        ));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert!(DataUri::parse("DATA:image/jpeg;BASE64,AA==").is_ok());
    }
}
