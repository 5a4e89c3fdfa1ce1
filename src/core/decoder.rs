// src/core/decoder.rs
//
// Audio decoding boundary: any container Symphonia understands becomes a
// mono `Signal`. Multi-channel audio is averaged down to one channel.

use log::debug;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::core::signal::Signal;
use crate::error::{LabError, Result};

/// Decode an audio file into a mono signal
pub fn decode_file(path: &Path) -> Result<Signal> {
    let file = File::open(path)
        .map_err(|e| LabError::Decode(format!("failed to open {}: {}", path.display(), e)))?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    decode_source(Box::new(file), hint)
}

/// Decode an in-memory upload; `extension` (e.g. "wav") helps probing
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<Signal> {
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    decode_source(Box::new(Cursor::new(bytes)), hint)
}

fn decode_source(source: Box<dyn MediaSource>, hint: Hint) -> Result<Signal> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| LabError::Decode(format!("unrecognised or corrupt container: {}", e)))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| LabError::Decode("no supported audio track found".to_string()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| LabError::Decode("stream does not specify a sample rate".to_string()))?;
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| LabError::Decode(format!("no decoder for codec: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match probed.format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(LabError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            // Skip corrupt packets, keep the rest of the stream
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(LabError::Decode(e.to_string())),
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            channels = spec.channels.count();
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    if samples.is_empty() {
        return Err(LabError::Decode("no audio samples decoded".to_string()));
    }
    if channels == 0 {
        return Err(LabError::Decode("stream reports 0 audio channels".to_string()));
    }

    debug!(
        "Decoded {} frames at {} Hz from {} channel(s)",
        samples.len() / channels,
        sample_rate,
        channels
    );

    Signal::from_interleaved(&samples, channels, sample_rate)
}
