//! Immutable audio clip values
//!
//! An `AudioClip` is the decoded PCM snapshot that every edit operates on.
//! Clips are never mutated after construction: each pipeline step builds a
//! new clip from the previous one, and the session swaps whole values.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClipError, Result};

// ============================================================================
// Clip Identity
// ============================================================================

/// Identity token assigned to each loaded clip.
///
/// In-flight preview and export results carry the id of the clip they were
/// produced from; the session discards any result whose id no longer matches
/// the current clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(Uuid);

impl ClipId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    #[default]
    Mono,
    /// Two channels (stereo: left, right)
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Clip
// ============================================================================

/// Immutable decoded PCM clip
///
/// Stores audio as non-interleaved 32-bit floating point samples, one
/// `Vec<f32>` per channel. Samples are nominally in [-1, 1] but may
/// transiently exceed it after gain; clipping is deferred to export-time
/// quantization.
///
/// # Invariant
/// Every channel holds exactly `frame_count()` samples. Construction
/// validates this; no public API mutates the sample data afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    samples: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioClip {
    /// Create a clip from per-channel sample data
    ///
    /// # Arguments
    /// * `samples` - One Vec per channel (1 or 2 channels)
    /// * `sample_rate` - Sample rate in Hz (> 0)
    ///
    /// # Errors
    /// * `UnsupportedFormat` - Zero, or more than 2, channels, or a zero
    ///   sample rate
    /// * `Decode` - Channels of unequal length
    pub fn from_channels(samples: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ClipError::UnsupportedFormat {
                format: "0 Hz sample rate".to_string(),
            });
        }
        if samples.is_empty() || samples.len() > 2 {
            return Err(ClipError::UnsupportedFormat {
                format: format!("{}-channel audio (only mono/stereo supported)", samples.len()),
            });
        }
        let frames = samples[0].len();
        if samples.iter().any(|ch| ch.len() != frames) {
            return Err(ClipError::Decode {
                reason: format!(
                    "channel length mismatch: {:?}",
                    samples.iter().map(|ch| ch.len()).collect::<Vec<_>>()
                ),
                source: None,
            });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Create a clip from interleaved sample data (L, R, L, R, ... for stereo)
    pub fn from_interleaved(
        interleaved: &[f32],
        layout: ChannelLayout,
        sample_rate: u32,
    ) -> Result<Self> {
        let num_channels = layout.num_channels();

        if interleaved.len() % num_channels != 0 {
            return Err(ClipError::Decode {
                reason: format!(
                    "interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
                source: None,
            });
        }

        let frames = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(frames); num_channels];
        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Self::from_channels(samples, sample_rate)
    }

    /// Create a silent clip (all samples 0.0)
    pub fn silent(frames: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        Self {
            samples: vec![vec![0.0_f32; frames]; layout.num_channels()],
            sample_rate,
        }
    }

    /// Internal constructor for pipeline outputs whose invariant is already
    /// established by construction.
    pub(crate) fn from_parts(samples: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        debug_assert!(!samples.is_empty() && samples.len() <= 2);
        debug_assert!(samples.iter().all(|ch| ch.len() == samples[0].len()));
        Self {
            samples,
            sample_rate,
        }
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (1 or 2)
    #[inline]
    pub fn channels(&self) -> usize {
        self.samples.len()
    }

    /// Channel layout
    pub fn channel_layout(&self) -> ChannelLayout {
        ChannelLayout::from_count(self.channels()).unwrap_or_default()
    }

    /// Number of frames (samples per channel)
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the clip holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Immutable access to one channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Convert to interleaved format (L, R, L, R, ... for stereo)
    pub fn to_interleaved(&self) -> Vec<f32> {
        let frames = self.frame_count();
        let mut interleaved = Vec::with_capacity(frames * self.channels());
        for i in 0..frames {
            for channel in &self.samples {
                interleaved.push(channel[i]);
            }
        }
        interleaved
    }

    /// Peak absolute amplitude across all channels
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .flat_map(|ch| ch.iter())
            .map(|&s| s.abs())
            .fold(0.0_f32, f32::max)
    }

    /// Check that all samples are finite (not NaN or Infinity)
    pub fn is_finite(&self) -> bool {
        self.samples
            .iter()
            .flat_map(|ch| ch.iter())
            .all(|s| s.is_finite())
    }
}

// ============================================================================
// Tests
// ============================================================================
