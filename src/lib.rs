//! # cliptrim
//!
//! Core engine for a small audio clip editor: load a clip, mark a
//! selection, apply trim / volume / fade edits in a fixed order, preview
//! single effects as WAV, and export the result through a pluggable frame
//! encoder.
//!
//! ## Architecture
//!
//! - [`engine`] - The in-memory clip model and WAV decode/render
//! - [`selection`] - Drag-driven selection over a normalized track
//! - [`pipeline`] - Pure edit transforms and their fixed composition
//! - [`encoder`] - Quantization and block framing over a [`FrameEncoder`]
//! - [`session`] - The editor state machine tying everything together
//!
//! Everything outside WAV handling is platform-neutral: decoding of
//! compressed uploads, waveform rendering, and compressed encoding are
//! injected capabilities ([`ClipDecoder`], [`session::WaveformRenderer`],
//! [`FrameEncoder`]).
//!
//! ## Example
//!
//! ```no_run
//! use cliptrim::engine::{read_wav, write_wav};
//! use cliptrim::pipeline::{self, EditRequest};
//! use cliptrim::selection::SelectionRange;
//!
//! # fn main() -> cliptrim::Result<()> {
//! let clip = read_wav("take.wav".as_ref())?;
//! let request = EditRequest::new(true, 50, 1, 2);
//! let range = SelectionRange { start: 2.0, end: 5.0 };
//! let edited = pipeline::apply(&clip, &request, &range);
//! write_wav(&edited, "take_edit.wav".as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod encoder;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod selection;
pub mod session;

pub use encoder::FrameEncoder;
pub use engine::{AudioClip, ClipDecoder};
pub use error::{ClipError, Result};
pub use session::EditorSession;
