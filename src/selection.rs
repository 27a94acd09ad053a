//! Drag-based selection state machine
//!
//! Converts pointer gestures over a fixed-width track into a validated
//! `[start, end]` time range. The controller works in fractional position
//! space (`0.0` = track left edge, `1.0` = right edge) and maps to seconds
//! only when a range is requested, so handle behavior is independent of the
//! clip's duration.

use log::debug;
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Position-space tolerance for bound comparisons (fraction of track width).
///
/// Used both as the minimum gap between handles and as the tolerance for
/// the `is_trimmed` predicate, so float noise never reads as a user edit.
pub const EPSILON: f64 = 0.01;

/// Selections narrower than this many seconds are treated as degenerate
const DEGENERATE_RANGE_SECS: f64 = 0.001;

/// Compare two track positions with the shared tolerance
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Selection Range
// ============================================================================

/// A validated time range in seconds, `0 <= start <= end <= duration`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: f64,
    pub end: f64,
}

impl SelectionRange {
    /// The full range of a clip: `{0, duration}`
    pub fn full(duration: f64) -> Self {
        Self {
            start: 0.0,
            end: duration,
        }
    }

    /// Length of the range in seconds
    pub fn len_secs(&self) -> f64 {
        self.end - self.start
    }

    /// Check whether the range is too narrow to trim meaningfully
    pub fn is_degenerate(&self) -> bool {
        (self.end - self.start).abs() <= DEGENERATE_RANGE_SECS
    }
}

// ============================================================================
// Selection Controller
// ============================================================================

/// Which marker a gesture is dragging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    /// No clip loaded; pointer input is ignored
    NoClip,
    /// Clip ready, no gesture active
    Ready,
    /// A pointer gesture is dragging one handle
    Adjusting(Handle),
}

/// State machine over a single active clip track
///
/// Lifecycle: `NoClip` -> `Ready` on [`clip_ready`](Self::clip_ready) ->
/// `Adjusting` while a gesture drags a handle -> back to `Ready` on release.
/// "Trimmed" is not a distinct state but the derived predicate
/// [`is_trimmed`](Self::is_trimmed).
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionController {
    state: State,
    start_pos: f64,
    end_pos: f64,
    duration: f64,
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            state: State::NoClip,
            start_pos: 0.0,
            end_pos: 1.0,
            duration: 0.0,
        }
    }

    /// Called when a clip becomes ready with a known duration
    ///
    /// Resets the bounds to the full range.
    pub fn clip_ready(&mut self, duration: f64) {
        self.state = State::Ready;
        self.start_pos = 0.0;
        self.end_pos = 1.0;
        self.duration = duration.max(0.0);
        debug!("selection ready, duration {:.3}s", self.duration);
    }

    /// Drop back to the no-clip state (clip discarded or replaced)
    pub fn clip_unloaded(&mut self) {
        *self = Self::new();
    }

    /// Whether a clip is currently loaded
    pub fn has_clip(&self) -> bool {
        self.state != State::NoClip
    }

    /// Track duration in seconds (0 before any clip is ready)
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Begin a drag gesture on one handle
    ///
    /// Only one handle may be active per gesture. Starting a new gesture
    /// while one is active replaces it, which detaches the previous
    /// gesture's updates. Ignored before a clip is ready.
    pub fn begin_drag(&mut self, handle: Handle) {
        match self.state {
            State::NoClip => {
                debug!("ignoring drag before clip ready");
            }
            State::Ready => {
                self.state = State::Adjusting(handle);
            }
            State::Adjusting(previous) => {
                debug!("replacing active {:?} gesture with {:?}", previous, handle);
                self.state = State::Adjusting(handle);
            }
        }
    }

    /// Update the active gesture with a pointer position
    ///
    /// `p` is the pointer's fractional offset across the track; positions
    /// outside the track are clamped to its extents rather than ending the
    /// gesture. Replaying the same position yields the same bounds.
    ///
    /// Dragging start: `start = min(p, end - EPSILON)`.
    /// Dragging end: `end = max(p, start + EPSILON)`.
    /// Bounds never cross.
    pub fn drag_to(&mut self, p: f64) {
        let State::Adjusting(handle) = self.state else {
            return;
        };
        let p = p.clamp(0.0, 1.0);
        match handle {
            Handle::Start => {
                self.start_pos = p.min(self.end_pos - EPSILON).max(0.0);
            }
            Handle::End => {
                self.end_pos = p.max(self.start_pos + EPSILON).min(1.0);
            }
        }
    }

    /// End the active gesture (pointer released anywhere)
    pub fn end_drag(&mut self) {
        if let State::Adjusting(_) = self.state {
            self.state = State::Ready;
            debug!(
                "gesture released at [{:.3}, {:.3}]",
                self.start_pos, self.end_pos
            );
        }
    }

    /// The handle currently being dragged, if any
    pub fn active_handle(&self) -> Option<Handle> {
        match self.state {
            State::Adjusting(handle) => Some(handle),
            _ => None,
        }
    }

    /// Reset the selection to the full range unconditionally
    ///
    /// Overrides any in-progress gesture; `is_trimmed` is false afterwards.
    pub fn clear(&mut self) {
        self.start_pos = 0.0;
        self.end_pos = 1.0;
        if self.state != State::NoClip {
            self.state = State::Ready;
        }
    }

    /// Whether the user has moved either marker off the full range
    ///
    /// Evaluated with the shared tolerance so float noise from drag math
    /// never registers as a trim.
    pub fn is_trimmed(&self) -> bool {
        self.has_clip() && (!approx_eq(self.start_pos, 0.0) || !approx_eq(self.end_pos, 1.0))
    }

    /// Start marker position in track space
    pub fn start_pos(&self) -> f64 {
        self.start_pos
    }

    /// End marker position in track space
    pub fn end_pos(&self) -> f64 {
        self.end_pos
    }

    /// Current bounds mapped to seconds
    pub fn range(&self) -> SelectionRange {
        SelectionRange {
            start: self.start_pos * self.duration,
            end: self.end_pos * self.duration,
        }
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
