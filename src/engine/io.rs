//! Container I/O for cliptrim
//!
//! The core edits decoded PCM; compressed decode is an injected capability
//! (see [`ClipDecoder`]). What lives here is the WAV path: reading WAV files
//! for the CLI and tests, and rendering an edited clip into an in-memory
//! 16-bit WAV container so the playback surface can preview it.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;

use crate::engine::clip::{AudioClip, ChannelLayout};
use crate::error::{ClipError, Result};

/// Decoding capability for compressed uploads
///
/// Injected at the session boundary; the core never depends on a concrete
/// codec. Failures map to [`ClipError::Decode`] and leave any prior clip
/// untouched.
pub trait ClipDecoder {
    /// Decode raw file bytes into a PCM clip
    fn decode(&self, bytes: &[u8]) -> Result<AudioClip>;
}

/// WAV-backed decoder, used by the CLI and as the test decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl ClipDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioClip> {
        let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| ClipError::Decode {
            reason: format!("failed to parse WAV data: {}", e),
            source: Some(Box::new(e)),
        })?;
        read_clip(reader)
    }
}

/// Read a WAV file into a clip
///
/// Accepts mono or stereo, 8/16/24/32-bit integer or 32-bit float samples.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `Decode` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - More than 2 channels or an unknown bit depth
pub fn read_wav(path: &Path) -> Result<AudioClip> {
    if !path.exists() {
        return Err(ClipError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| ClipError::Decode {
        reason: format!("failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    read_clip(reader)
}

/// Write a clip to a 16-bit WAV file
pub fn write_wav(clip: &AudioClip, path: &Path) -> Result<()> {
    let mut writer = WavWriter::create(path, wav_spec(clip)).map_err(|e| {
        ClipError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    })?;
    write_samples(clip, &mut writer)?;
    writer
        .finalize()
        .map_err(|e| ClipError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

/// Render a clip into an in-memory 16-bit WAV container
///
/// This is the preview path: the returned bytes are handed to the waveform
/// renderer as a playable source, never written to disk.
pub fn render_wav(clip: &AudioClip) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let cursor = Cursor::new(&mut bytes);
        let mut writer = WavWriter::new(cursor, wav_spec(clip)).map_err(|e| {
            ClipError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        })?;
        write_samples(clip, &mut writer)?;
        writer.finalize().map_err(|e| {
            ClipError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        })?;
    }
    debug!(
        "rendered preview container: {} frames, {} bytes",
        clip.frame_count(),
        bytes.len()
    );
    Ok(bytes)
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn wav_spec(clip: &AudioClip) -> WavSpec {
    WavSpec {
        channels: clip.channels() as u16,
        sample_rate: clip.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn write_samples<W>(clip: &AudioClip, writer: &mut WavWriter<W>) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    for sample in clip.to_interleaved() {
        let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(scaled).map_err(|e| {
            ClipError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        })?;
    }
    Ok(())
}

fn read_clip<R: std::io::Read>(reader: WavReader<R>) -> Result<AudioClip> {
    let spec = reader.spec();
    let channels = spec.channels as usize;
    let sample_rate = spec.sample_rate;

    if channels == 0 || channels > 2 {
        return Err(ClipError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", channels),
        });
    }

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;

    let layout = if channels == 1 {
        ChannelLayout::Mono
    } else {
        ChannelLayout::Stereo
    };

    AudioClip::from_interleaved(&interleaved, layout, sample_rate)
}

/// Read samples from a WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| ClipError::Decode {
                reason: format!("failed to read float samples: {}", e),
                source: Some(Box::new(e)),
            }),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| ClipError::Decode {
                    reason: format!("failed to read 8-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| ClipError::Decode {
                    reason: format!("failed to read 16-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| ClipError::Decode {
                    reason: format!("failed to read 24-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| ClipError::Decode {
                    reason: format!("failed to read 32-bit int samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            other => Err(ClipError::UnsupportedFormat {
                format: format!("{}-bit integer audio", other),
            }),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
