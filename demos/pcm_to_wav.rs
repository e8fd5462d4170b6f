use std::path::PathBuf;
use std::time::Instant;

use hearsay_rs::{
    config::Settings,
    wav::{wav_data_uri, PcmFormatBuilder},
    SpeechClip,
};

/// Usage: `cargo run --example pcm_to_wav -- <input.pcm> [output.wav] [settings.json]`
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input = PathBuf::from(args.next().ok_or("missing input .pcm path")?);
    let output = PathBuf::from(args.next().unwrap_or_else(|| "output.wav".to_string()));
    let settings = match args.next() {
        Some(path) => Settings::load(&PathBuf::from(path))?,
        None => Settings::default(),
    };

    let format = PcmFormatBuilder::default()
        .channels(settings.pcm.channels)
        .sample_rate(settings.pcm.sample_rate)
        .sample_width(settings.pcm.sample_width)
        .build()?;

    let pcm = std::fs::read(&input)?;
    println!(
        "Read {} bytes of PCM ({} ch, {} Hz, {}-bit)",
        pcm.len(),
        format.channels,
        format.sample_rate,
        format.bits_per_sample()
    );

    let encode_start = Instant::now();
    let uri = wav_data_uri(&pcm, format);
    println!(
        "Encoded data URI of {} chars in {:.2?}",
        uri.len(),
        encode_start.elapsed()
    );

    let clip = SpeechClip { pcm, format };
    clip.write_wav(&output)?;
    println!(
        "Saved {:.2}s of audio to {}",
        clip.duration_secs(),
        output.display()
    );
    Ok(())
}
