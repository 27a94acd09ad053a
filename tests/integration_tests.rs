//! Integration Tests
//!
//! End-to-end flows through the public API: upload, selection, pipeline,
//! preview rendering, and export through a recording frame encoder.

use pretty_assertions::assert_eq;

use cliptrim::encoder::{Bitrate, FrameEncoder, GRANULE_SIZE};
use cliptrim::engine::io::{render_wav, WavDecoder};
use cliptrim::engine::{AudioClip, ChannelLayout, ClipDecoder};
use cliptrim::pipeline::{self, EditRequest};
use cliptrim::selection::{Handle, SelectionRange};
use cliptrim::session::{EditorSession, PreviewKind, WaveformRenderer, ACCEPTED_MIME};
use cliptrim::{ClipError, Result};

// ============================================================================
// Test Doubles
// ============================================================================

/// Frame encoder double that records every call in order
#[derive(Default)]
struct RecordingEncoder {
    prepared: Option<(u16, u32, u32)>,
    block_lens: Vec<usize>,
    stereo_blocks: usize,
    flushed: bool,
}

impl FrameEncoder for RecordingEncoder {
    fn prepare(&mut self, channels: u16, sample_rate: u32, bitrate: Bitrate) -> Result<()> {
        self.prepared = Some((channels, sample_rate, bitrate.kbps()));
        Ok(())
    }

    fn encode_block(&mut self, left: &[i16], right: Option<&[i16]>) -> Result<Vec<u8>> {
        self.block_lens.push(left.len());
        if right.is_some() {
            self.stereo_blocks += 1;
        }
        Ok(vec![0xDA; 4])
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        self.flushed = true;
        Ok(vec![0xFA])
    }
}

#[derive(Default)]
struct NullRenderer {
    loaded_bytes: usize,
    destroyed: bool,
}

impl WaveformRenderer for NullRenderer {
    fn load(&mut self, wav_bytes: &[u8]) {
        self.loaded_bytes = wav_bytes.len();
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

fn mono_upload(duration_secs: f64, sample_rate: u32) -> Vec<u8> {
    let frames = (duration_secs * sample_rate as f64) as usize;
    let samples: Vec<f32> = (0..frames)
        .map(|i| (i as f32 * 0.01).sin() * 0.5)
        .collect();
    let clip = AudioClip::from_channels(vec![samples], sample_rate).unwrap();
    render_wav(&clip).unwrap()
}

// ============================================================================
// Pipeline Flows
// ============================================================================

#[test]
fn test_trim_ten_second_clip_to_three_seconds() {
    // 10 s mono at 44100 Hz, selection [2s, 5s]
    let clip = AudioClip::silent(441_000, ChannelLayout::Mono, 44100);
    let request = EditRequest::new(true, 0, 0, 0);
    let range = SelectionRange {
        start: 2.0,
        end: 5.0,
    };

    let out = pipeline::apply(&clip, &request, &range);
    assert_eq!(out.frame_count(), 132_300);
    assert!((out.duration_secs() - 3.0).abs() < 1e-9);
}

#[test]
fn test_volume_doubles_before_quantization() {
    let clip = AudioClip::from_channels(vec![vec![0.25; 4410]], 44100).unwrap();
    let request = EditRequest::new(false, 100, 0, 0);

    let out = pipeline::apply(&clip, &request, &SelectionRange::full(0.1));
    assert!((out.channel(0)[0] - 0.5).abs() < 1e-6);
}

// ============================================================================
// Export Through the Encoder Adapter
// ============================================================================

#[test]
fn test_export_frames_blocks_and_flushes_once() {
    let mut session = EditorSession::new();
    let bytes = mono_upload(0.5, 8000);
    session
        .load_upload("voice.mp3", ACCEPTED_MIME, &bytes, &WavDecoder)
        .unwrap();
    session.renderer_ready(0.5);

    let mut enc = RecordingEncoder::default();
    let artifact = session.export(Some(&mut enc)).unwrap();

    // 4000 frames: 3 full granules + a 544-frame tail
    assert_eq!(enc.block_lens, vec![GRANULE_SIZE, GRANULE_SIZE, GRANULE_SIZE, 544]);
    assert!(enc.flushed);
    assert_eq!(enc.prepared, Some((1, 8000, 128)));
    assert_eq!(enc.stereo_blocks, 0);

    // Data chunks plus exactly one flush chunk, flush last
    assert_eq!(artifact.output.chunk_count(), 5);
    assert_eq!(artifact.output.chunks().last().unwrap().as_slice(), &[0xFA]);
    assert_eq!(artifact.file_name, "voice_modified.mp3");
}

#[test]
fn test_export_applies_selection_and_controls() {
    let mut session = EditorSession::new();
    let bytes = mono_upload(4.0, 8000);
    session
        .load_upload("take.mp3", ACCEPTED_MIME, &bytes, &WavDecoder)
        .unwrap();
    session.renderer_ready(4.0);

    // Keep the middle half and set every control
    session.begin_drag(Handle::Start);
    session.drag_to(0.25);
    session.end_drag();
    session.begin_drag(Handle::End);
    session.drag_to(0.75);
    session.end_drag();
    session.set_volume_percent(50);
    session.set_fade_in_secs(1);
    session.set_fade_out_secs(1);

    let request = session.export_request();
    assert_eq!(request, EditRequest::new(true, 50, 1, 1));

    let mut enc = RecordingEncoder::default();
    let artifact = session.export(Some(&mut enc)).unwrap();

    // 2 s at 8000 Hz survive the trim: ceil(16000 / 1152) = 14 blocks
    assert_eq!(enc.block_lens.len(), 14);
    assert!(artifact.output.byte_len() > 0);
}

#[test]
fn test_export_without_encoder_leaves_session_usable() {
    let mut session = EditorSession::new();
    let bytes = mono_upload(1.0, 8000);
    session
        .load_upload("a.mp3", ACCEPTED_MIME, &bytes, &WavDecoder)
        .unwrap();
    session.renderer_ready(1.0);

    assert!(matches!(
        session.export(None),
        Err(ClipError::EncoderUnavailable)
    ));

    // The failed attempt must not leave the processing flag stuck
    let mut enc = RecordingEncoder::default();
    assert!(session.export(Some(&mut enc)).is_ok());
}

// ============================================================================
// Session Flows
// ============================================================================

#[test]
fn test_full_session_flow_with_renderer() {
    let mut session = EditorSession::new();
    let mut renderer = NullRenderer::default();

    // Wrong MIME first: silently ignored
    assert!(!session
        .load_upload("cover.png", "image/png", &[1, 2, 3], &WavDecoder)
        .unwrap());

    let bytes = mono_upload(2.0, 8000);
    assert!(session
        .load_upload("song.mp3", ACCEPTED_MIME, &bytes, &WavDecoder)
        .unwrap());
    session.renderer_ready(2.0);

    // Trim preview reaches the renderer as playable WAV bytes
    session.begin_drag(Handle::End);
    session.drag_to(0.5);
    session.end_drag();
    session
        .load_preview(PreviewKind::Trim, &mut renderer)
        .unwrap();
    assert!(renderer.loaded_bytes > 44);

    // The preview bytes decode back to the trimmed duration
    let preview = session.preview_wav(PreviewKind::Trim).unwrap();
    let decoded = WavDecoder.decode(&preview).unwrap();
    assert!((decoded.duration_secs() - 1.0).abs() < 0.01);

    session.reset(Some(&mut renderer));
    assert!(renderer.destroyed);
    assert!(!session.has_clip());
}

#[test]
fn test_replacing_clip_invalidates_inflight_export() {
    let mut session = EditorSession::new();
    session
        .load_upload("first.mp3", ACCEPTED_MIME, &mono_upload(1.0, 8000), &WavDecoder)
        .unwrap();
    session.renderer_ready(1.0);

    let job = session.begin_export().unwrap();

    session
        .load_upload("second.mp3", ACCEPTED_MIME, &mono_upload(1.0, 8000), &WavDecoder)
        .unwrap();
    session.renderer_ready(1.0);

    // The first job still runs to completion, but its result is stale
    let mut enc = RecordingEncoder::default();
    let output = job.run(&mut enc).unwrap();
    assert!(!output.is_empty());
    assert!(!session.finish_export(job.clip_id));

    // A fresh export against the new clip settles normally
    let job = session.begin_export().unwrap();
    assert!(session.finish_export(job.clip_id));
}
