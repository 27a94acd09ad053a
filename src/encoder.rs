//! MP3 Encoder Adapter
//!
//! Turns a finished clip into an ordered stream of compressed byte chunks
//! through an injected frame-encoder capability. The adapter owns
//! quantization and granule framing; the capability owns the codec. The
//! chunk sequence is ordered and all-or-nothing: a mid-stream failure
//! discards everything accumulated so far.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::engine::AudioClip;
use crate::error::{ClipError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Fixed block size (samples per channel) the frame encoder consumes per call
pub const GRANULE_SIZE: usize = 1152;

// ============================================================================
// Bitrate
// ============================================================================

/// Supported MP3 bitrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Bitrate {
    Kbps96,
    #[default]
    Kbps128,
    Kbps192,
    Kbps256,
    Kbps320,
}

impl Bitrate {
    /// All selectable bitrates, in ascending order
    pub const ALL: [Bitrate; 5] = [
        Bitrate::Kbps96,
        Bitrate::Kbps128,
        Bitrate::Kbps192,
        Bitrate::Kbps256,
        Bitrate::Kbps320,
    ];

    /// The bitrate value in kbps
    pub fn kbps(self) -> u32 {
        match self {
            Bitrate::Kbps96 => 96,
            Bitrate::Kbps128 => 128,
            Bitrate::Kbps192 => 192,
            Bitrate::Kbps256 => 256,
            Bitrate::Kbps320 => 320,
        }
    }

    /// Parse an integer kbps selection
    ///
    /// # Errors
    /// `InvalidBitrate` for anything outside {96, 128, 192, 256, 320}
    pub fn from_kbps(kbps: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.kbps() == kbps)
            .ok_or(ClipError::InvalidBitrate { kbps })
    }
}

impl std::fmt::Display for Bitrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} kbps", self.kbps())
    }
}

// ============================================================================
// Frame Encoder Capability
// ============================================================================

/// Low-level compressed-frame encoder capability (external)
///
/// One call per granule-sized block; each call may return zero or more
/// output bytes (codecs buffer internally). Implementations are injected at
/// session start; the core never reaches for an ambient global.
pub trait FrameEncoder {
    /// Configure the codec for a stream
    ///
    /// Always receives the clip's true channel count, even when mono input
    /// is duplicated for stereo framing.
    fn prepare(&mut self, channels: u16, sample_rate: u32, bitrate: Bitrate) -> Result<()>;

    /// Whether the codec needs a right-channel block even for mono input
    fn requires_stereo_input(&self) -> bool {
        false
    }

    /// Encode one block; `right` is present for stereo framing
    fn encode_block(&mut self, left: &[i16], right: Option<&[i16]>) -> Result<Vec<u8>>;

    /// Flush any buffered frames after the last block
    fn flush(&mut self) -> Result<Vec<u8>>;
}

// ============================================================================
// Encoded Output
// ============================================================================

/// Ordered sequence of opaque byte chunks
///
/// Concatenation in order yields a complete MP3 stream. Order is
/// significant; chunks are never reordered, merged, or dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedOutput {
    chunks: Vec<Vec<u8>>,
}

impl EncodedOutput {
    fn push(&mut self, chunk: Vec<u8>) {
        self.chunks.push(chunk);
    }

    /// The chunks in encode order
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    /// Number of chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total payload size in bytes
    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Concatenate all chunks into one contiguous stream
    pub fn concat(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        for chunk in &self.chunks {
            out.extend_from_slice(chunk);
        }
        out
    }
}

// ============================================================================
// Quantization
// ============================================================================

/// Quantize one channel of float samples to 16-bit signed integers
///
/// `q = round(s * 32767)`, clamped to [-32768, 32767]. This is where
/// deferred clipping from the volume step finally lands.
pub fn quantize_channel(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * 32767.0).round().clamp(-32768.0, 32767.0) as i16)
        .collect()
}

// ============================================================================
// Encode
// ============================================================================

/// Encode a clip into an ordered MP3 chunk stream
///
/// Quantizes each channel, partitions into [`GRANULE_SIZE`] blocks (the
/// final block may be short), feeds them to the capability in order, then
/// flushes. For mono clips whose capability requires stereo input framing,
/// the quantized stream is duplicated as a synthetic right channel; the
/// capability is still prepared with the true channel count.
///
/// All-or-nothing: any capability error aborts the export and the
/// accumulated chunks are discarded.
pub fn encode_clip(
    clip: &AudioClip,
    bitrate: Bitrate,
    encoder: &mut dyn FrameEncoder,
) -> Result<EncodedOutput> {
    encoder.prepare(clip.channels() as u16, clip.sample_rate(), bitrate)?;

    let left = quantize_channel(clip.channel(0));
    let right = if clip.channels() == 2 {
        Some(quantize_channel(clip.channel(1)))
    } else if encoder.requires_stereo_input() {
        // Synthetic right channel for stereo-framed codecs
        Some(left.clone())
    } else {
        None
    };

    info!(
        "encoding {} frames at {} ({} ch, {} Hz)",
        clip.frame_count(),
        bitrate,
        clip.channels(),
        clip.sample_rate()
    );

    let mut output = EncodedOutput::default();

    match &right {
        Some(right) => {
            for (left_block, right_block) in
                left.chunks(GRANULE_SIZE).zip(right.chunks(GRANULE_SIZE))
            {
                let bytes = encoder.encode_block(left_block, Some(right_block))?;
                if !bytes.is_empty() {
                    output.push(bytes);
                }
            }
        }
        None => {
            for left_block in left.chunks(GRANULE_SIZE) {
                let bytes = encoder.encode_block(left_block, None)?;
                if !bytes.is_empty() {
                    output.push(bytes);
                }
            }
        }
    }

    let tail = encoder.flush()?;
    if !tail.is_empty() {
        output.push(tail);
    }

    debug!(
        "encoded {} chunks, {} bytes",
        output.chunk_count(),
        output.byte_len()
    );
    Ok(output)
}

/// Derive the export file name from the uploaded file's name
///
/// `song.mp3` -> `song_modified.mp3`; a name without an extension gains the
/// suffix as-is.
pub fn export_file_name(original: &str) -> String {
    let stem = match original.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original,
    };
    format!("{}_modified.mp3", stem)
}

// ============================================================================
// Tests
// ============================================================================
