//! Volume transform

use crate::engine::AudioClip;
use crate::pipeline::{MAX_VOLUME_PERCENT, MIN_VOLUME_PERCENT};

/// Apply a flat linear gain derived from an integer percent offset
///
/// `gain = 1 + percent / 100`, so -100..=200 maps to 0..=3. Samples are not
/// clamped here; values may leave [-1, 1] and clipping is deferred to
/// export-time quantization.
pub fn apply_volume(clip: &AudioClip, volume_percent: i32) -> AudioClip {
    let percent = volume_percent.clamp(MIN_VOLUME_PERCENT, MAX_VOLUME_PERCENT);
    if percent == 0 {
        return clip.clone();
    }

    let gain = 1.0 + percent as f32 / 100.0;
    let samples: Vec<Vec<f32>> = (0..clip.channels())
        .map(|ch| clip.channel(ch).iter().map(|&s| s * gain).collect())
        .collect();

    AudioClip::from_parts(samples, clip.sample_rate())
}
