//! Edit Pipeline
//!
//! Pure sample-buffer transforms composed in a fixed order:
//! trim -> volume -> fade-in -> fade-out.
//!
//! Trim runs first so the fade offsets are measured against the final
//! duration; volume is a flat multiplier; fades run last so they shape the
//! already-trimmed, already-scaled signal. The ordering is a contract, not
//! an accident of implementation.

mod fade;
mod trim;
mod volume;

pub use fade::{fade_in, fade_in_envelope, fade_out, fade_out_envelope};
pub use trim::trim;
pub use volume::apply_volume;

use serde::{Deserialize, Serialize};

use crate::engine::AudioClip;
use crate::selection::SelectionRange;

// ============================================================================
// Constants
// ============================================================================

/// Minimum volume adjustment in percent (full mute)
pub const MIN_VOLUME_PERCENT: i32 = -100;

/// Maximum volume adjustment in percent (triple gain)
pub const MAX_VOLUME_PERCENT: i32 = 200;

/// Maximum fade duration in whole seconds
pub const MAX_FADE_SECS: u32 = 5;

// ============================================================================
// Edit Request
// ============================================================================

/// One preview or export worth of edit settings
///
/// Constructed fresh from the current control values for each action; never
/// persisted. Out-of-range values are clamped at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditRequest {
    /// Apply the selection range as a trim
    pub trim: bool,
    /// Volume adjustment in percent, -100..=200 (gain 0..=3)
    pub volume_percent: i32,
    /// Fade-in duration in whole seconds, 0..=5
    pub fade_in_secs: u32,
    /// Fade-out duration in whole seconds, 0..=5
    pub fade_out_secs: u32,
}

impl EditRequest {
    /// Create a request, clamping each field to its valid range
    pub fn new(trim: bool, volume_percent: i32, fade_in_secs: u32, fade_out_secs: u32) -> Self {
        Self {
            trim,
            volume_percent: volume_percent.clamp(MIN_VOLUME_PERCENT, MAX_VOLUME_PERCENT),
            fade_in_secs: fade_in_secs.min(MAX_FADE_SECS),
            fade_out_secs: fade_out_secs.min(MAX_FADE_SECS),
        }
    }

    /// Linear gain implied by the volume percent: `1 + percent / 100`
    pub fn gain(&self) -> f32 {
        1.0 + self.volume_percent as f32 / 100.0
    }

    /// Whether applying this request would leave any clip unchanged
    pub fn is_identity(&self) -> bool {
        !self.trim && self.volume_percent == 0 && self.fade_in_secs == 0 && self.fade_out_secs == 0
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Apply a full edit request to a clip
///
/// Pure: never mutates `clip`. Steps run in the fixed order trim ->
/// volume -> fade-in -> fade-out; each step is skipped when its setting is
/// neutral. A degenerate or inverted trim range degrades to a no-op and the
/// clip flows through unchanged (see [`trim`]).
///
/// Fade envelopes are independent and may overlap in time on short clips;
/// their effects compose multiplicatively.
pub fn apply(clip: &AudioClip, request: &EditRequest, range: &SelectionRange) -> AudioClip {
    let mut out = if request.trim && !range.is_degenerate() {
        trim(clip, range.start, range.end)
    } else {
        clip.clone()
    };

    if request.volume_percent != 0 {
        out = apply_volume(&out, request.volume_percent);
    }

    if request.fade_in_secs > 0 {
        out = fade_in(&out, request.fade_in_secs as f64);
    }

    if request.fade_out_secs > 0 {
        out = fade_out(&out, request.fade_out_secs as f64);
    }

    out
}

// ============================================================================
// Tests
// ============================================================================
