//! Fade transforms
//!
//! Linear gain envelopes realizing fade-in and fade-out. The two envelopes
//! are independent; applying both to a clip shorter than their combined
//! length simply multiplies them.

use crate::engine::AudioClip;

/// Fade-in envelope value at time `t` for a ramp of `fade_secs`
///
/// `envelope(0) = 0`, `envelope(fade_secs) = 1`, linear in between, then 1.
#[inline]
pub fn fade_in_envelope(t: f64, fade_secs: f64) -> f32 {
    (t / fade_secs).min(1.0) as f32
}

/// Fade-out envelope value at time `t` for a clip of duration `d`
///
/// 1 until `d - fade_secs`, then a linear ramp reaching 0 at `t = d`.
#[inline]
pub fn fade_out_envelope(t: f64, d: f64, fade_secs: f64) -> f32 {
    ((d - t) / fade_secs).clamp(0.0, 1.0) as f32
}

/// Apply a linear fade-in over the first `fade_secs` seconds
pub fn fade_in(clip: &AudioClip, fade_secs: f64) -> AudioClip {
    if fade_secs <= 0.0 {
        return clip.clone();
    }

    let rate = clip.sample_rate() as f64;
    let samples: Vec<Vec<f32>> = (0..clip.channels())
        .map(|ch| {
            clip.channel(ch)
                .iter()
                .enumerate()
                .map(|(i, &s)| s * fade_in_envelope(i as f64 / rate, fade_secs))
                .collect()
        })
        .collect();

    AudioClip::from_parts(samples, clip.sample_rate())
}

/// Apply a linear fade-out over the final `fade_secs` seconds
pub fn fade_out(clip: &AudioClip, fade_secs: f64) -> AudioClip {
    if fade_secs <= 0.0 {
        return clip.clone();
    }

    let rate = clip.sample_rate() as f64;
    let duration = clip.duration_secs();
    let samples: Vec<Vec<f32>> = (0..clip.channels())
        .map(|ch| {
            clip.channel(ch)
                .iter()
                .enumerate()
                .map(|(i, &s)| s * fade_out_envelope(i as f64 / rate, duration, fade_secs))
                .collect()
        })
        .collect();

    AudioClip::from_parts(samples, clip.sample_rate())
}
