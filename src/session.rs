//! Editor Session
//!
//! One explicit value owns every piece of mutable editor state: the loaded
//! clip, the selection controller, playback flags, and the current control
//! values. All transitions are plain methods on the session, testable
//! without any rendering surface; the playback/waveform library sits behind
//! the narrow [`WaveformRenderer`] capability and is only ever handed
//! finished WAV bytes.
//!
//! Cooperative concurrency contract: at most one export is in flight
//! (`ExportInProgress` otherwise), and late-completing work from a replaced
//! clip is identified by [`ClipId`] and discarded, never applied.

use log::{debug, info, warn};
use serde::Serialize;

use crate::encoder::{self, Bitrate, EncodedOutput, FrameEncoder};
use crate::engine::clip::{AudioClip, ClipId};
use crate::engine::io::{self, ClipDecoder};
use crate::error::{ClipError, Result};
use crate::pipeline::{self, EditRequest};
use crate::selection::{Handle, SelectionController, SelectionRange};

/// The only upload MIME type the editor accepts
pub const ACCEPTED_MIME: &str = "audio/mpeg";

// ============================================================================
// Renderer Capability
// ============================================================================

/// Narrow capability interface for the playback/waveform surface
///
/// The core never depends on the library's concrete shape: it calls `load`
/// with playable WAV bytes and `destroy` on reset, and consumes the
/// library's ready/timeupdate events as plain method calls on the session.
pub trait WaveformRenderer {
    /// Load a playable source (a WAV container rendered by the core)
    fn load(&mut self, wav_bytes: &[u8]);

    /// Tear the surface down
    fn destroy(&mut self);
}

// ============================================================================
// Preview & Export Value Types
// ============================================================================

/// Which single-effect preview the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Trim,
    FadeIn,
    FadeOut,
}

/// Snapshot of everything an export needs, taken by
/// [`EditorSession::begin_export`]
///
/// The job owns a clone of the clip, so the session may be freely modified
/// (or the clip replaced) while the host runs the job; staleness is settled
/// by [`EditorSession::finish_export`] against the embedded [`ClipId`].
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub clip: AudioClip,
    pub clip_id: ClipId,
    pub request: EditRequest,
    pub range: SelectionRange,
    pub bitrate: Bitrate,
    pub file_name: String,
}

impl ExportJob {
    /// Run the pipeline and the encoder adapter end to end
    pub fn run(&self, frame_encoder: &mut dyn FrameEncoder) -> Result<EncodedOutput> {
        let edited = pipeline::apply(&self.clip, &self.request, &self.range);
        encoder::encode_clip(&edited, self.bitrate, frame_encoder)
    }
}

/// A finished export: the output chunks plus the name to save them under
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub output: EncodedOutput,
}

/// Serializable snapshot of the session's observable state
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub file_name: Option<String>,
    pub duration_secs: f64,
    pub current_time: f64,
    pub playing: bool,
    pub processing: bool,
    pub is_trimmed: bool,
    pub selection: SelectionRange,
    pub volume_percent: i32,
    pub fade_in_secs: u32,
    pub fade_out_secs: u32,
    pub bitrate_kbps: u32,
}

// ============================================================================
// Editor Session
// ============================================================================

#[derive(Debug, Clone)]
struct LoadedClip {
    id: ClipId,
    clip: AudioClip,
    file_name: String,
}

/// All mutable editor state behind one value
#[derive(Debug, Clone)]
pub struct EditorSession {
    loaded: Option<LoadedClip>,
    selection: SelectionController,
    playing: bool,
    processing: bool,
    current_time: f64,
    volume_percent: i32,
    fade_in_secs: u32,
    fade_out_secs: u32,
    bitrate: Bitrate,
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            loaded: None,
            selection: SelectionController::new(),
            playing: false,
            processing: false,
            current_time: 0.0,
            volume_percent: 0,
            fade_in_secs: 0,
            fade_out_secs: 0,
            bitrate: Bitrate::default(),
        }
    }

    // ========================================================================
    // Upload & Lifecycle
    // ========================================================================

    /// Load an uploaded file into the session
    ///
    /// Only `audio/mpeg` uploads are accepted; anything else is rejected
    /// silently (returns `Ok(false)`, no clip created, prior clip
    /// untouched). Decode failures propagate and likewise leave the prior
    /// clip untouched. On success the clip is replaced under a fresh
    /// [`ClipId`], which invalidates any in-flight preview or export.
    pub fn load_upload(
        &mut self,
        file_name: &str,
        mime: &str,
        bytes: &[u8],
        decoder: &dyn ClipDecoder,
    ) -> Result<bool> {
        if mime != ACCEPTED_MIME {
            debug!("rejecting upload '{}' with MIME '{}'", file_name, mime);
            return Ok(false);
        }

        let clip = decoder.decode(bytes)?;
        if clip.is_empty() {
            return Err(ClipError::EmptyClip);
        }

        let id = ClipId::new();
        info!(
            "loaded '{}': {} frames, {} ch, {} Hz (clip {})",
            file_name,
            clip.frame_count(),
            clip.channels(),
            clip.sample_rate(),
            id
        );

        self.loaded = Some(LoadedClip {
            id,
            clip,
            file_name: file_name.to_string(),
        });
        // Selection waits for the renderer's ready(duration) event
        self.selection.clip_unloaded();
        self.playing = false;
        self.processing = false;
        self.current_time = 0.0;
        Ok(true)
    }

    /// Discard the clip and return every control to its initial value
    ///
    /// Tears down the renderer surface when one is attached.
    pub fn reset(&mut self, renderer: Option<&mut dyn WaveformRenderer>) {
        if let Some(renderer) = renderer {
            renderer.destroy();
        }
        *self = Self::new();
        debug!("session reset");
    }

    pub fn has_clip(&self) -> bool {
        self.loaded.is_some()
    }

    /// Identity of the current clip, if one is loaded
    pub fn clip_id(&self) -> Option<ClipId> {
        self.loaded.as_ref().map(|l| l.id)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.file_name.as_str())
    }

    // ========================================================================
    // Renderer Events
    // ========================================================================

    /// Consume the renderer's `ready(duration)` event
    pub fn renderer_ready(&mut self, duration: f64) {
        self.selection.clip_ready(duration);
    }

    /// Consume the renderer's `timeupdate(currentTime)` event
    pub fn time_update(&mut self, time: f64) {
        self.current_time = time;
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.selection.duration()
    }

    // ========================================================================
    // Playback Flags
    // ========================================================================

    /// Toggle play/pause; returns the new playing state
    pub fn toggle_playback(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Stop playback and rewind the cursor
    pub fn stop(&mut self) {
        self.playing = false;
        self.current_time = 0.0;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Pointer-down over a handle
    pub fn begin_drag(&mut self, handle: Handle) {
        self.selection.begin_drag(handle);
    }

    /// Pointer-move to a fractional track offset
    pub fn drag_to(&mut self, position: f64) {
        self.selection.drag_to(position);
    }

    /// Pointer-up anywhere
    pub fn end_drag(&mut self) {
        self.selection.end_drag();
    }

    /// Reset the selection to the full range
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ========================================================================
    // Edit Controls
    // ========================================================================

    pub fn set_volume_percent(&mut self, percent: i32) {
        self.volume_percent =
            percent.clamp(pipeline::MIN_VOLUME_PERCENT, pipeline::MAX_VOLUME_PERCENT);
    }

    pub fn set_fade_in_secs(&mut self, secs: u32) {
        self.fade_in_secs = secs.min(pipeline::MAX_FADE_SECS);
    }

    pub fn set_fade_out_secs(&mut self, secs: u32) {
        self.fade_out_secs = secs.min(pipeline::MAX_FADE_SECS);
    }

    pub fn set_bitrate(&mut self, bitrate: Bitrate) {
        self.bitrate = bitrate;
    }

    pub fn bitrate(&self) -> Bitrate {
        self.bitrate
    }

    // ========================================================================
    // Preview
    // ========================================================================

    /// Whether a trim preview is currently meaningful
    pub fn can_preview_trim(&self) -> bool {
        self.has_clip() && !self.selection.range().is_degenerate()
    }

    /// Build the request for a single-effect preview
    ///
    /// Previews isolate one effect at a time: a trim preview applies only
    /// the selection, a fade preview only that fade.
    pub fn preview_request(&self, kind: PreviewKind) -> EditRequest {
        match kind {
            PreviewKind::Trim => EditRequest::new(true, 0, 0, 0),
            PreviewKind::FadeIn => EditRequest::new(false, 0, self.fade_in_secs, 0),
            PreviewKind::FadeOut => EditRequest::new(false, 0, 0, self.fade_out_secs),
        }
    }

    /// Render a preview of one effect as playable WAV bytes
    pub fn preview_wav(&self, kind: PreviewKind) -> Result<Vec<u8>> {
        let loaded = self.loaded.as_ref().ok_or(ClipError::EmptyClip)?;
        let request = self.preview_request(kind);
        let edited = pipeline::apply(&loaded.clip, &request, &self.selection.range());
        io::render_wav(&edited)
    }

    /// Render a preview and hand it to the renderer
    pub fn load_preview(
        &self,
        kind: PreviewKind,
        renderer: &mut dyn WaveformRenderer,
    ) -> Result<()> {
        let bytes = self.preview_wav(kind)?;
        renderer.load(&bytes);
        Ok(())
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Build the request an export would apply: every active effect at once
    ///
    /// Trim participates only when the user actually moved a marker and the
    /// selection is non-degenerate.
    pub fn export_request(&self) -> EditRequest {
        let apply_trim = self.selection.is_trimmed() && !self.selection.range().is_degenerate();
        EditRequest::new(
            apply_trim,
            self.volume_percent,
            self.fade_in_secs,
            self.fade_out_secs,
        )
    }

    /// Snapshot an export job and mark the session as processing
    ///
    /// # Errors
    /// * `EmptyClip` - No clip is loaded
    /// * `ExportInProgress` - A previous export has not finished; concurrent
    ///   exports are rejected rather than queued
    pub fn begin_export(&mut self) -> Result<ExportJob> {
        if self.processing {
            return Err(ClipError::ExportInProgress);
        }
        let loaded = self.loaded.as_ref().ok_or(ClipError::EmptyClip)?;

        self.processing = true;
        Ok(ExportJob {
            clip: loaded.clip.clone(),
            clip_id: loaded.id,
            request: self.export_request(),
            range: self.selection.range(),
            bitrate: self.bitrate,
            file_name: encoder::export_file_name(&loaded.file_name),
        })
    }

    /// Settle a finished export against the current session state
    ///
    /// Returns `true` when the result belongs to the current clip. A stale
    /// result (the clip was replaced or the session reset while the job
    /// ran) returns `false` and must be discarded by the caller; it does
    /// not touch the processing flag, which the replacement already reset.
    pub fn finish_export(&mut self, clip_id: ClipId) -> bool {
        match &self.loaded {
            Some(loaded) if loaded.id == clip_id => {
                self.processing = false;
                true
            }
            _ => {
                warn!("discarding stale export result for clip {}", clip_id);
                false
            }
        }
    }

    /// One-shot cooperative export through an optional encoder capability
    ///
    /// Fails with `EncoderUnavailable` before any quantization when no
    /// capability was injected. Hosts that schedule work themselves should
    /// use [`begin_export`](Self::begin_export) /
    /// [`finish_export`](Self::finish_export) instead.
    pub fn export(
        &mut self,
        frame_encoder: Option<&mut dyn FrameEncoder>,
    ) -> Result<ExportArtifact> {
        let Some(frame_encoder) = frame_encoder else {
            return Err(ClipError::EncoderUnavailable);
        };

        let job = self.begin_export()?;
        let result = job.run(frame_encoder);
        self.finish_export(job.clip_id);

        let output = result?;
        info!(
            "export complete: '{}', {} chunks, {} bytes",
            job.file_name,
            output.chunk_count(),
            output.byte_len()
        );
        Ok(ExportArtifact {
            file_name: job.file_name,
            output,
        })
    }

    // ========================================================================
    // Summary
    // ========================================================================

    /// Snapshot the observable state (for hosts and diagnostics)
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            file_name: self.file_name().map(str::to_string),
            duration_secs: self.duration(),
            current_time: self.current_time,
            playing: self.playing,
            processing: self.processing,
            is_trimmed: self.selection.is_trimmed(),
            selection: self.selection.range(),
            volume_percent: self.volume_percent,
            fade_in_secs: self.fade_in_secs,
            fade_out_secs: self.fade_out_secs,
            bitrate_kbps: self.bitrate.kbps(),
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::io::WavDecoder;
    use crate::engine::ChannelLayout;

    /// Renderer double that records calls
    #[derive(Default)]
    struct RecordingRenderer {
        loads: usize,
        destroyed: bool,
    }

    impl WaveformRenderer for RecordingRenderer {
        fn load(&mut self, _wav_bytes: &[u8]) {
            self.loads += 1;
        }

        fn destroy(&mut self) {
            self.destroyed = true;
        }
    }

    /// Encoder double: one byte per block, one on flush
    struct TinyEncoder;

    impl FrameEncoder for TinyEncoder {
        fn prepare(&mut self, _channels: u16, _sample_rate: u32, _bitrate: Bitrate) -> Result<()> {
            Ok(())
        }

        fn encode_block(&mut self, _left: &[i16], _right: Option<&[i16]>) -> Result<Vec<u8>> {
            Ok(vec![0xAB])
        }

        fn flush(&mut self) -> Result<Vec<u8>> {
            Ok(vec![0xFE])
        }
    }

    fn upload_bytes(duration_secs: f32) -> Vec<u8> {
        let rate = 8000;
        let frames = (duration_secs * rate as f32) as usize;
        let clip = AudioClip::from_channels(
            vec![(0..frames).map(|i| ((i % 100) as f32 / 100.0) - 0.5).collect()],
            rate,
        )
        .unwrap();
        io::render_wav(&clip).unwrap()
    }

    fn loaded_session(duration_secs: f32) -> EditorSession {
        let mut session = EditorSession::new();
        let accepted = session
            .load_upload("take.mp3", ACCEPTED_MIME, &upload_bytes(duration_secs), &WavDecoder)
            .unwrap();
        assert!(accepted);
        session.renderer_ready(duration_secs as f64);
        session
    }

    #[test]
    fn test_rejects_foreign_mime_silently() {
        let mut session = EditorSession::new();
        let accepted = session
            .load_upload("notes.txt", "text/plain", b"hello", &WavDecoder)
            .unwrap();
        assert!(!accepted);
        assert!(!session.has_clip());
    }

    #[test]
    fn test_decode_failure_keeps_prior_clip() {
        let mut session = loaded_session(2.0);
        let prior_id = session.clip_id();

        let result = session.load_upload("bad.mp3", ACCEPTED_MIME, b"garbage", &WavDecoder);
        assert!(matches!(result, Err(ClipError::Decode { .. })));
        assert_eq!(session.clip_id(), prior_id);
    }

    #[test]
    fn test_ready_event_creates_full_selection() {
        let session = loaded_session(4.0);
        let range = session.selection().range();
        assert_eq!(range.start, 0.0);
        assert!((range.end - 4.0).abs() < 1e-9);
        assert!(!session.selection().is_trimmed());
    }

    #[test]
    fn test_drag_and_clear_flow() {
        let mut session = loaded_session(10.0);
        session.begin_drag(Handle::End);
        session.drag_to(0.5);
        session.end_drag();
        assert!(session.selection().is_trimmed());

        session.clear_selection();
        assert!(!session.selection().is_trimmed());
    }

    #[test]
    fn test_preview_isolates_single_effect() {
        let mut session = loaded_session(5.0);
        session.set_volume_percent(100);
        session.set_fade_in_secs(2);
        session.set_fade_out_secs(3);

        let fade_in = session.preview_request(PreviewKind::FadeIn);
        assert_eq!(fade_in, EditRequest::new(false, 0, 2, 0));

        let trim = session.preview_request(PreviewKind::Trim);
        assert_eq!(trim, EditRequest::new(true, 0, 0, 0));
    }

    #[test]
    fn test_preview_loads_renderer() {
        let session = loaded_session(2.0);
        let mut renderer = RecordingRenderer::default();
        session
            .load_preview(PreviewKind::FadeIn, &mut renderer)
            .unwrap();
        assert_eq!(renderer.loads, 1);
    }

    #[test]
    fn test_preview_without_clip_fails() {
        let session = EditorSession::new();
        let result = session.preview_wav(PreviewKind::Trim);
        assert!(matches!(result, Err(ClipError::EmptyClip)));
    }

    #[test]
    fn test_export_request_skips_untouched_selection() {
        let mut session = loaded_session(5.0);
        session.set_volume_percent(50);
        let request = session.export_request();
        assert!(!request.trim);
        assert_eq!(request.volume_percent, 50);

        session.begin_drag(Handle::Start);
        session.drag_to(0.3);
        session.end_drag();
        assert!(session.export_request().trim);
    }

    #[test]
    fn test_export_without_encoder_fails_fast() {
        let mut session = loaded_session(2.0);
        let result = session.export(None);
        assert!(matches!(result, Err(ClipError::EncoderUnavailable)));
        assert!(!session.is_processing());
    }

    #[test]
    fn test_export_produces_named_artifact() {
        let mut session = loaded_session(1.0);
        let mut enc = TinyEncoder;
        let artifact = session.export(Some(&mut enc)).unwrap();

        assert_eq!(artifact.file_name, "take_modified.mp3");
        assert!(artifact.output.chunk_count() >= 2);
        assert!(!session.is_processing());
    }

    #[test]
    fn test_second_export_rejected_while_processing() {
        let mut session = loaded_session(2.0);
        let _job = session.begin_export().unwrap();
        assert!(session.is_processing());

        let second = session.begin_export();
        assert!(matches!(second, Err(ClipError::ExportInProgress)));
    }

    #[test]
    fn test_stale_export_result_discarded() {
        let mut session = loaded_session(2.0);
        let job = session.begin_export().unwrap();

        // Clip replaced while the job is in flight
        session
            .load_upload("other.mp3", ACCEPTED_MIME, &upload_bytes(1.0), &WavDecoder)
            .unwrap();

        assert!(!session.finish_export(job.clip_id));
        // The replacement cleared the processing flag; a new export may start
        assert!(!session.is_processing());
    }

    #[test]
    fn test_export_job_runs_full_pipeline() {
        let mut session = loaded_session(2.0);
        session.renderer_ready(2.0);
        session.begin_drag(Handle::End);
        session.drag_to(0.5);
        session.end_drag();

        let job = session.begin_export().unwrap();
        let mut enc = TinyEncoder;
        let output = job.run(&mut enc).unwrap();
        assert!(session.finish_export(job.clip_id));

        // 1 s at 8000 Hz -> ceil(8000 / 1152) = 7 data chunks + flush
        assert_eq!(output.chunk_count(), 8);
    }

    #[test]
    fn test_reset_destroys_renderer_and_state() {
        let mut session = loaded_session(3.0);
        session.set_volume_percent(80);
        let mut renderer = RecordingRenderer::default();

        session.reset(Some(&mut renderer));

        assert!(renderer.destroyed);
        assert!(!session.has_clip());
        assert_eq!(session.summary().volume_percent, 0);
    }

    #[test]
    fn test_playback_flags() {
        let mut session = loaded_session(2.0);
        assert!(session.toggle_playback());
        session.time_update(1.25);
        assert_eq!(session.current_time(), 1.25);

        session.stop();
        assert!(!session.is_playing());
        assert_eq!(session.current_time(), 0.0);
    }

    #[test]
    fn test_summary_serializes() {
        let session = loaded_session(2.0);
        let json = serde_json::to_value(session.summary()).unwrap();
        assert_eq!(json["bitrate_kbps"], 128);
        assert_eq!(json["file_name"], "take.mp3");
    }

    #[test]
    fn test_empty_upload_rejected() {
        let mut session = EditorSession::new();
        let empty = io::render_wav(&AudioClip::silent(0, ChannelLayout::Mono, 8000)).unwrap();
        let result = session.load_upload("empty.mp3", ACCEPTED_MIME, &empty, &WavDecoder);
        assert!(matches!(result, Err(ClipError::EmptyClip)));
    }
}
