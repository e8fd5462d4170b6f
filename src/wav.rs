//! Raw PCM to WAV container encoding.
//!
//! The encoder wraps a buffer of interleaved, signed, little-endian PCM
//! samples in the canonical 44-byte RIFF/WAVE header and returns the bytes,
//! their base64 encoding, or a ready-to-play `data:audio/wav;base64,...` URI.
//!
//! # Header Layout
//!
//! | Offset | Size | Value |
//! |---|---|---|
//! | 0 | 4 | `"RIFF"` |
//! | 4 | 4 | 36 + PCM length |
//! | 8 | 4 | `"WAVE"` |
//! | 12 | 4 | `"fmt "` |
//! | 16 | 4 | 16 |
//! | 20 | 2 | 1 (PCM) |
//! | 22 | 2 | channels |
//! | 24 | 4 | sample rate |
//! | 28 | 4 | byte rate (rate × channels × width) |
//! | 32 | 2 | block align (channels × width) |
//! | 34 | 2 | bits per sample (width × 8) |
//! | 36 | 4 | `"data"` |
//! | 40 | 4 | PCM length |
//! | 44 | .. | PCM bytes, verbatim |
//!
//! All integers are little-endian.
//!
//! # Examples
//!
//! ```rust
//! use hearsay_rs::wav::{encode_wav, wav_data_uri, PcmFormat};
//!
//! let pcm = [0x00, 0x01, 0x02, 0x03];
//! let wav = encode_wav(&pcm, PcmFormat::default());
//! assert_eq!(wav.len(), 48);
//!
//! let uri = wav_data_uri(&pcm, PcmFormat::default());
//! assert!(uri.starts_with("data:audio/wav;base64,UklGR"));
//! ```

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Size of the canonical WAV header written by [`encode_wav`].
pub const HEADER_LEN: usize = 44;

/// MIME type of the encoded container.
pub const WAV_MIME: &str = "audio/wav";

/// Default sample rate of the cloud speech model output.
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WAVE_MAGIC: &[u8; 4] = b"WAVE";
const FMT_CHUNK: &[u8; 4] = b"fmt ";
const DATA_CHUNK: &[u8; 4] = b"data";
const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;

#[derive(thiserror::Error, Debug)]
pub enum WavError {
    #[error("WAV data too short: need 44 header bytes, got {0}")]
    TooShort(usize),
    #[error("Missing {0:?} marker in WAV header")]
    BadMagic(&'static str),
    #[error("Unsupported WAV encoding: {0}")]
    NotPcm(String),
    #[error("WAV decode error: {0}")]
    Hound(#[from] hound::Error),
}

/// Layout of a PCM buffer.
///
/// The defaults match the cloud speech model: mono, 24 kHz, 16-bit.
///
/// Struct literals are never checked, so [`encode_wav`] stays total over its
/// input. Use [`PcmFormatBuilder`] to get a validated format:
///
/// ```rust
/// use hearsay_rs::wav::PcmFormatBuilder;
///
/// let stereo = PcmFormatBuilder::default().channels(2).build()?;
/// assert_eq!(stereo.block_align(), 4);
///
/// assert!(PcmFormatBuilder::default().sample_width(0).build().is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default, build_fn(validate = "Self::validate"))]
#[serde(default, rename_all = "camelCase")]
pub struct PcmFormat {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Samples per second, per channel.
    pub sample_rate: u32,
    /// Bytes per sample (2 for 16-bit).
    pub sample_width: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: DEFAULT_SAMPLE_RATE,
            sample_width: 2,
        }
    }
}

impl PcmFormatBuilder {
    fn validate(&self) -> Result<(), String> {
        let defaults = PcmFormat::default();
        PcmFormat {
            channels: self.channels.unwrap_or(defaults.channels),
            sample_rate: self.sample_rate.unwrap_or(defaults.sample_rate),
            sample_width: self.sample_width.unwrap_or(defaults.sample_width),
        }
        .validate()
    }
}

impl PcmFormat {
    /// Check that the format describes playable audio: at least one channel,
    /// a non-zero sample rate and a sample width of 1 to 4 bytes.
    ///
    /// [`encode_wav`] never calls this.
    pub fn validate(&self) -> Result<(), String> {
        if self.channels == 0 {
            return Err("channel count must be positive".to_string());
        }
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".to_string());
        }
        if !(1..=4).contains(&self.sample_width) {
            return Err(format!(
                "sample width must be 1..=4 bytes, got {}",
                self.sample_width
            ));
        }
        Ok(())
    }

    /// Bytes per interleaved frame (`channels × sample_width`).
    pub fn block_align(&self) -> u16 {
        self.channels.wrapping_mul(self.sample_width)
    }

    /// Bytes per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate
            .wrapping_mul(u32::from(self.channels))
            .wrapping_mul(u32::from(self.sample_width))
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.sample_width.wrapping_mul(8)
    }

    /// Number of bytes past the last complete frame in a buffer of `len` bytes.
    pub fn trailing_bytes(&self, len: usize) -> usize {
        match self.block_align() {
            0 => 0,
            align => len % usize::from(align),
        }
    }

    /// Playback duration of `len` bytes, counting complete frames only.
    pub fn duration_secs(&self, len: usize) -> f64 {
        let align = usize::from(self.block_align());
        if align == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        (len / align) as f64 / f64::from(self.sample_rate)
    }
}

/// Build the 44-byte header for `data_len` bytes of PCM.
///
/// Lengths beyond `u32::MAX` cannot be represented by RIFF and saturate.
pub fn wav_header(data_len: usize, format: PcmFormat) -> [u8; HEADER_LEN] {
    let data_size = u32::try_from(data_len).unwrap_or(u32::MAX);
    let riff_size = data_size.saturating_add(36);

    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(RIFF_MAGIC);
    header[4..8].copy_from_slice(&riff_size.to_le_bytes());
    header[8..12].copy_from_slice(WAVE_MAGIC);

    header[12..16].copy_from_slice(FMT_CHUNK);
    header[16..20].copy_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    header[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample().to_le_bytes());

    header[36..40].copy_from_slice(DATA_CHUNK);
    header[40..44].copy_from_slice(&data_size.to_le_bytes());
    header
}

/// Wrap `pcm` in a WAV container.
///
/// Never fails. A buffer that does not end on a frame boundary is written
/// as-is: the trailing partial frame is kept, not padded or dropped, and the
/// `data` size is the true byte length.
pub fn encode_wav(pcm: &[u8], format: PcmFormat) -> Vec<u8> {
    let trailing = format.trailing_bytes(pcm.len());
    if trailing != 0 {
        log::warn!(
            "PCM length {} is not a multiple of the {}-byte frame; {} trailing bytes kept",
            pcm.len(),
            format.block_align(),
            trailing
        );
    }

    let mut wav = Vec::with_capacity(HEADER_LEN + pcm.len());
    wav.extend_from_slice(&wav_header(pcm.len(), format));
    wav.extend_from_slice(pcm);
    wav
}

/// Base64 (standard alphabet, padded) of [`encode_wav`].
pub fn wav_base64(pcm: &[u8], format: PcmFormat) -> String {
    BASE64.encode(encode_wav(pcm, format))
}

/// `data:audio/wav;base64,...` URI of [`encode_wav`].
pub fn wav_data_uri(pcm: &[u8], format: PcmFormat) -> String {
    format!("data:{WAV_MIME};base64,{}", wav_base64(pcm, format))
}

/// Fields of a canonical 44-byte WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub riff_size: u32,
    pub format: PcmFormat,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    /// Decode the header written by [`encode_wav`].
    ///
    /// Only the canonical layout is accepted: `fmt ` immediately followed by
    /// `data`, with no extension or list chunks. Use [`read_wav`] for
    /// arbitrary files.
    pub fn parse(bytes: &[u8]) -> Result<Self, WavError> {
        if bytes.len() < HEADER_LEN {
            return Err(WavError::TooShort(bytes.len()));
        }

        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        if &bytes[0..4] != RIFF_MAGIC {
            return Err(WavError::BadMagic("RIFF"));
        }
        if &bytes[8..12] != WAVE_MAGIC {
            return Err(WavError::BadMagic("WAVE"));
        }
        if &bytes[12..16] != FMT_CHUNK {
            return Err(WavError::BadMagic("fmt "));
        }
        if &bytes[36..40] != DATA_CHUNK {
            return Err(WavError::BadMagic("data"));
        }

        let format_code = u16_at(20);
        if format_code != FORMAT_PCM {
            return Err(WavError::NotPcm(format!("format code {format_code}")));
        }

        let bits_per_sample = u16_at(34);
        Ok(Self {
            riff_size: u32_at(4),
            format: PcmFormat {
                channels: u16_at(22),
                sample_rate: u32_at(24),
                sample_width: bits_per_sample / 8,
            },
            byte_rate: u32_at(28),
            block_align: u16_at(32),
            bits_per_sample,
            data_size: u32_at(40),
        })
    }
}

/// Decode a WAV file with `hound` and return its format and raw PCM bytes.
///
/// Only integer PCM is supported. Samples are re-serialized in the file's own
/// width, so the bytes match the `data` chunk of the input.
pub fn read_wav(bytes: &[u8]) -> Result<(PcmFormat, Vec<u8>), WavError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int {
        return Err(WavError::NotPcm(format!(
            "{:?} samples at {} bits",
            spec.sample_format, spec.bits_per_sample
        )));
    }

    let sample_width = spec.bits_per_sample.div_ceil(8);
    let format = PcmFormat {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        sample_width,
    };

    let mut pcm = Vec::with_capacity(reader.len() as usize * usize::from(sample_width));
    for sample in reader.into_samples::<i32>() {
        let sample = sample?;
        match sample_width {
            // 8-bit WAV is stored unsigned; hound hands it back centred on zero.
            1 => pcm.push((sample + 128) as u8),
            2 => pcm.extend_from_slice(&(sample as i16).to_le_bytes()),
            3 => pcm.extend_from_slice(&sample.to_le_bytes()[..3]),
            _ => pcm.extend_from_slice(&sample.to_le_bytes()),
        }
    }

    log::debug!(
        "Decoded WAV: {} ch, {} Hz, {} bytes of PCM",
        format.channels,
        format.sample_rate,
        pcm.len()
    );
    Ok((format, pcm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm_format(channels: u16, sample_rate: u32, sample_width: u16) -> PcmFormat {
        PcmFormat {
            channels,
            sample_rate,
            sample_width,
        }
    }

    #[test]
    fn four_byte_buffer_matches_reference_layout() {
        let pcm = [0x00, 0x01, 0x02, 0x03];
        let wav = encode_wav(&pcm, PcmFormat::default());

        assert_eq!(wav.len(), 48);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 40);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u32::from_le_bytes(wav[16..20].try_into().unwrap()), 16);
        assert_eq!(u16::from_le_bytes([wav[20], wav[21]]), 1);
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 1);
        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), 24000);
        assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 48000);
        assert_eq!(u16::from_le_bytes([wav[32], wav[33]]), 2);
        assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 4);
        assert_eq!(&wav[44..], &pcm);
    }

    #[test]
    fn header_decodes_back_to_format_and_length() {
        let cases = [
            (PcmFormat::default(), 0usize),
            (pcm_format(2, 44100, 2), 400),
            (pcm_format(1, 8000, 1), 13),
            (pcm_format(6, 48000, 3), 180),
        ];

        for (format, len) in cases {
            let pcm: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let wav = encode_wav(&pcm, format);
            assert_eq!(wav.len(), len + HEADER_LEN);

            let header = WavHeader::parse(&wav).expect("canonical header");
            assert_eq!(header.format, format);
            assert_eq!(header.data_size as usize, len);
            assert_eq!(header.riff_size as usize, len + 36);
            assert_eq!(header.byte_rate, format.byte_rate());
            assert_eq!(header.block_align, format.block_align());
            assert_eq!(header.bits_per_sample, format.sample_width * 8);
            assert_eq!(&wav[HEADER_LEN..], pcm.as_slice());
        }
    }

    #[test]
    fn empty_buffer_yields_bare_header() {
        let wav = encode_wav(&[], PcmFormat::default());
        assert_eq!(wav.len(), HEADER_LEN);

        let header = WavHeader::parse(&wav).unwrap();
        assert_eq!(header.data_size, 0);
        assert_eq!(header.riff_size, 36);
    }

    #[test]
    fn defaults_declare_mono_24k_16bit() {
        let header = WavHeader::parse(&encode_wav(&[0; 8], PcmFormat::default())).unwrap();
        assert_eq!(header.format.channels, 1);
        assert_eq!(header.format.sample_rate, 24000);
        assert_eq!(header.bits_per_sample, 16);
    }

    #[test]
    fn encoding_is_deterministic() {
        let pcm: Vec<u8> = (0..=255).collect();
        let format = pcm_format(2, 16000, 2);
        assert_eq!(encode_wav(&pcm, format), encode_wav(&pcm, format));
        assert_eq!(wav_data_uri(&pcm, format), wav_data_uri(&pcm, format));
    }

    #[test]
    fn partial_final_frame_is_kept_verbatim() {
        let pcm = [0x10, 0x20, 0x30];
        let format = PcmFormat::default();
        assert_eq!(format.trailing_bytes(pcm.len()), 1);

        let wav = encode_wav(&pcm, format);
        assert_eq!(wav.len(), 47);

        let header = WavHeader::parse(&wav).unwrap();
        assert_eq!(header.data_size, 3);
        assert_eq!(header.riff_size, 39);
        assert_eq!(&wav[44..], &pcm);
    }

    #[test]
    fn hound_reads_back_original_pcm() {
        let samples: [i16; 6] = [0, 1, -1, i16::MAX, i16::MIN, 1234];
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let format = pcm_format(2, 22050, 2);

        let (decoded_format, decoded) = read_wav(&encode_wav(&pcm, format)).unwrap();
        assert_eq!(decoded_format, format);
        assert_eq!(decoded, pcm);
    }

    #[test]
    fn hound_round_trips_eight_and_twenty_four_bit() {
        let eight = pcm_format(1, 8000, 1);
        let pcm = vec![0u8, 127, 128, 255];
        assert_eq!(read_wav(&encode_wav(&pcm, eight)).unwrap().1, pcm);

        let twenty_four = pcm_format(1, 48000, 3);
        let pcm = vec![0x01, 0x02, 0x03, 0xff, 0xff, 0xff, 0x00, 0x00, 0x80];
        assert_eq!(read_wav(&encode_wav(&pcm, twenty_four)).unwrap().1, pcm);
    }

    #[test]
    fn base64_output_decodes_to_container() {
        let pcm = [0x00, 0x01, 0x02, 0x03];
        let encoded = wav_base64(&pcm, PcmFormat::default());
        assert_eq!(
            BASE64.decode(&encoded).unwrap(),
            encode_wav(&pcm, PcmFormat::default())
        );
        assert_eq!(
            wav_data_uri(&pcm, PcmFormat::default()),
            format!("data:audio/wav;base64,{encoded}")
        );
    }

    #[test]
    fn parse_rejects_foreign_headers() {
        assert!(matches!(WavHeader::parse(b"RIFF"), Err(WavError::TooShort(4))));

        let mut wav = encode_wav(&[0; 4], PcmFormat::default());
        wav[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(WavHeader::parse(&wav), Err(WavError::BadMagic("WAVE"))));

        let mut wav = encode_wav(&[0; 4], PcmFormat::default());
        wav[20] = 3;
        assert!(matches!(WavHeader::parse(&wav), Err(WavError::NotPcm(_))));
    }

    #[test]
    fn builder_validates_and_fills_defaults() {
        let format = PcmFormatBuilder::default().sample_rate(16000).build().unwrap();
        assert_eq!(format, pcm_format(1, 16000, 2));

        assert!(PcmFormatBuilder::default().channels(0).build().is_err());
        assert!(PcmFormatBuilder::default().sample_rate(0).build().is_err());
        assert!(PcmFormatBuilder::default().sample_width(5).build().is_err());
    }

    #[test]
    fn validate_rejects_unplayable_formats() {
        assert!(PcmFormat::default().validate().is_ok());
        assert!(pcm_format(0, 24000, 2).validate().is_err());
        assert!(pcm_format(1, 0, 2).validate().is_err());
        assert!(pcm_format(1, 24000, 0).validate().is_err());
        assert!(pcm_format(2, 48000, 4).validate().is_ok());

        // The encoder itself stays total over unchecked formats.
        assert_eq!(encode_wav(&[1, 2], pcm_format(0, 0, 0)).len(), HEADER_LEN + 2);
    }

    #[test]
    fn duration_counts_whole_frames() {
        let format = PcmFormat::default();
        assert_eq!(format.duration_secs(48000), 1.0);
        assert_eq!(format.duration_secs(48001), 1.0);
        assert_eq!(pcm_format(0, 24000, 2).duration_secs(10), 0.0);
    }
}
