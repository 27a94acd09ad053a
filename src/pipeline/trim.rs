//! Trim transform
//!
//! Copies a contiguous frame sub-range into a new clip. Bounds arrive in
//! seconds from the selection controller and are clamped into the clip
//! before conversion to frame indices.

use log::warn;

use crate::engine::AudioClip;

/// Extract `[start, end)` seconds of a clip into a new clip
///
/// `start_frame = floor(start * rate)`, `end_frame = floor(end * rate)`;
/// the copied sub-range is `[start_frame, end_frame)`, verbatim per channel.
///
/// A degenerate or inverted range (after clamping) yields zero frames; the
/// original clip then passes through unchanged rather than failing. This
/// leniency is deliberate and logged.
pub fn trim(clip: &AudioClip, start: f64, end: f64) -> AudioClip {
    let duration = clip.duration_secs();
    let rate = clip.sample_rate() as f64;

    let clamped_start = start.max(0.0).min(duration);
    let clamped_end = end.max(clamped_start).min(duration);

    let start_frame = (clamped_start * rate).floor() as usize;
    // A full-range end maps to the final frame exactly, regardless of float
    // error in the seconds round-trip.
    let end_frame = if clamped_end >= duration {
        clip.frame_count()
    } else {
        ((clamped_end * rate).floor() as usize).min(clip.frame_count())
    };

    if end_frame <= start_frame {
        warn!(
            "trim: degenerate range [{:.3}s, {:.3}s], passing clip through",
            start, end
        );
        return clip.clone();
    }

    let samples: Vec<Vec<f32>> = (0..clip.channels())
        .map(|ch| clip.channel(ch)[start_frame..end_frame].to_vec())
        .collect();

    AudioClip::from_parts(samples, clip.sample_rate())
}
