//! Audio Engine Module
//!
//! Core clip representation and container I/O:
//! - Immutable PCM clip values
//! - WAV preview rendering and file import/export

pub mod clip;
pub mod io;

pub use clip::{AudioClip, ChannelLayout, ClipId};
pub use io::{read_wav, render_wav, write_wav, ClipDecoder, WavDecoder};
