// src/core/encoder.rs
//
// Playable output: 16-bit PCM mono WAV.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use crate::core::signal::Signal;
use crate::error::Result;

/// Full-scale value for 16-bit PCM
pub const PCM16_SCALE: f64 = 32767.0;

/// Clamp to [-1, 1], scale by 32767 and truncate toward zero
pub fn to_pcm16(sample: f64) -> i16 {
    // NaN clamps to NaN and `as` maps it to 0
    (sample.clamp(-1.0, 1.0) * PCM16_SCALE) as i16
}

fn wav_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn write_samples<W: Write + Seek>(writer: W, signal: &Signal) -> Result<()> {
    let mut wav = WavWriter::new(writer, wav_spec(signal.sample_rate()))?;
    for &sample in signal.samples() {
        wav.write_sample(to_pcm16(sample))?;
    }
    wav.finalize()?;
    Ok(())
}

/// Encode to an in-memory WAV file
pub fn encode_wav(signal: &Signal) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_samples(&mut cursor, signal)?;
    Ok(cursor.into_inner())
}

/// Encode to a WAV file on disk
pub fn write_wav(signal: &Signal, path: &Path) -> Result<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_samples(file, signal)
}
