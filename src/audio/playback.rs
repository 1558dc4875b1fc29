//! Transport: start/stop over a paused-by-default output engine.
//!
//! The output callback and the controller share [`PlaybackState`]; the
//! controller only flips flags and the callback does the sample work in
//! [`render_output`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use super::source::AudioClip;

/// Host audio engine that may start out suspended
pub trait AudioContext {
    fn is_suspended(&self) -> bool;

    /// Ask the engine to run; must happen before playback is enabled
    fn resume(&mut self) -> anyhow::Result<()>;
}

/// Stand-in engine used when no output device could be opened
pub struct DetachedContext {
    reason: String,
}

impl DetachedContext {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AudioContext for DetachedContext {
    fn is_suspended(&self) -> bool {
        true
    }

    fn resume(&mut self) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("audio unavailable: {}", self.reason))
    }
}

/// Play flag and position cursor shared with the output callback
pub struct PlaybackState {
    playing: AtomicBool,
    /// Fractional source-frame index, stored as `f64` bits
    position: AtomicU64,
    total_frames: u64,
    sample_rate: u32,
}

impl PlaybackState {
    pub fn new(total_frames: u64, sample_rate: u32) -> Self {
        Self {
            playing: AtomicBool::new(false),
            position: AtomicU64::new(0f64.to_bits()),
            total_frames,
            sample_rate,
        }
    }

    pub fn for_clip(clip: &AudioClip) -> Self {
        Self::new(clip.frames() as u64, clip.sample_rate())
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }

    /// Cursor in source frames
    pub fn position_frames(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::Acquire))
    }

    pub fn position_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.position_frames() / self.sample_rate as f64
    }

    pub fn is_at_end(&self) -> bool {
        self.position_frames() >= self.total_frames as f64
    }

    /// Move the cursor, clamped to the clip
    pub fn seek_secs(&self, secs: f64) {
        let frames = (secs.max(0.0) * self.sample_rate as f64).min(self.total_frames as f64);
        self.position.store(frames.to_bits(), Ordering::Release);
    }
}

/// Start/stop entry points for the host UI
pub struct PlaybackController {
    context: Box<dyn AudioContext>,
    state: Arc<PlaybackState>,
}

impl PlaybackController {
    pub fn new(context: Box<dyn AudioContext>, state: Arc<PlaybackState>) -> Self {
        Self { context, state }
    }

    /// Resume the engine, then play from the current position.
    ///
    /// A refused resume leaves playback off and is only logged.
    pub fn start(&mut self) {
        if self.context.is_suspended() {
            if let Err(e) = self.context.resume() {
                log::warn!("Playback not started: {:#}", e);
                return;
            }
            log::debug!("Audio engine resumed");
        }

        if self.state.is_at_end() {
            self.state.seek_secs(0.0);
        }
        self.state.set_playing(true);
        log::info!("Playback started at {:.2}s", self.state.position_secs());
    }

    /// Pause, keeping the position
    pub fn stop(&mut self) {
        if self.state.is_playing() {
            self.state.set_playing(false);
            log::info!("Playback stopped at {:.2}s", self.state.position_secs());
        }
    }

    pub fn seek(&mut self, secs: f64) {
        self.state.seek_secs(secs);
        log::info!("Seeked to {:.2}s", self.state.position_secs());
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn position_secs(&self) -> f64 {
        self.state.position_secs()
    }

    pub fn state(&self) -> &Arc<PlaybackState> {
        &self.state
    }
}

/// Fill one interleaved output buffer from `clip` and advance the cursor.
///
/// Writes silence while stopped. `mono` receives one analysis sample per
/// output frame. At the end of the clip playback turns itself off.
pub fn render_output(
    out: &mut [f32],
    out_channels: usize,
    device_rate: u32,
    clip: &AudioClip,
    state: &PlaybackState,
    mono: &mut Vec<f32>,
) {
    mono.clear();
    let frames = out.len() / out_channels.max(1);

    if !state.is_playing() {
        out.fill(0.0);
        mono.resize(frames, 0.0);
        return;
    }

    let start_bits = state.position.load(Ordering::Acquire);
    let mut position = f64::from_bits(start_bits);
    let step = clip.sample_rate() as f64 / device_rate.max(1) as f64;
    let mut ended = false;

    for out_frame in out.chunks_mut(out_channels.max(1)) {
        // Nearest-sample resampling
        match clip.frame(position as usize) {
            Some(src) => {
                for (c, sample) in out_frame.iter_mut().enumerate() {
                    *sample = src[c.min(src.len() - 1)];
                }
                mono.push(clip.mono(position as usize));
                position += step;
            }
            None => {
                out_frame.fill(0.0);
                mono.push(0.0);
                ended = true;
            }
        }
    }

    position = position.min(clip.frames() as f64);
    // A concurrent seek wins over the callback's advance
    let _ = state.position.compare_exchange(
        start_bits,
        position.to_bits(),
        Ordering::AcqRel,
        Ordering::Acquire,
    );
    if ended {
        state.set_playing(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingContext {
        suspended: bool,
        state: Arc<PlaybackState>,
        /// `is_playing` observed at each resume call
        resumes: Arc<Mutex<Vec<bool>>>,
    }

    impl AudioContext for RecordingContext {
        fn is_suspended(&self) -> bool {
            self.suspended
        }

        fn resume(&mut self) -> anyhow::Result<()> {
            self.resumes.lock().unwrap().push(self.state.is_playing());
            self.suspended = false;
            Ok(())
        }
    }

    fn ramp_clip(frames: usize) -> AudioClip {
        let samples = (0..frames).map(|i| i as f32 / frames as f32).collect();
        AudioClip::from_interleaved(samples, 1, 48000).unwrap()
    }

    fn controller(clip: &AudioClip) -> (PlaybackController, Arc<Mutex<Vec<bool>>>) {
        let state = Arc::new(PlaybackState::for_clip(clip));
        let resumes = Arc::new(Mutex::new(Vec::new()));
        let context = RecordingContext {
            suspended: true,
            state: Arc::clone(&state),
            resumes: Arc::clone(&resumes),
        };
        (PlaybackController::new(Box::new(context), state), resumes)
    }

    #[test]
    fn test_start_resumes_before_playing() {
        let clip = ramp_clip(100);
        let (mut transport, resumes) = controller(&clip);

        transport.start();

        assert!(transport.is_playing());
        assert_eq!(*resumes.lock().unwrap(), vec![false]);

        // Already running: no second resume
        transport.stop();
        transport.start();
        assert_eq!(resumes.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_detached_context_never_plays() {
        let clip = ramp_clip(100);
        let state = Arc::new(PlaybackState::for_clip(&clip));
        let mut transport =
            PlaybackController::new(Box::new(DetachedContext::new("no device")), state);
        transport.start();
        assert!(!transport.is_playing());
    }

    #[test]
    fn test_stop_start_resumes_from_paused_position() {
        let clip = ramp_clip(1000);
        let (mut transport, _) = controller(&clip);
        let state = Arc::clone(transport.state());
        let mut out = vec![0.0; 100];
        let mut mono = Vec::new();

        transport.start();
        render_output(&mut out, 1, 48000, &clip, &state, &mut mono);
        assert_eq!(state.position_frames(), 100.0);

        transport.stop();
        render_output(&mut out, 1, 48000, &clip, &state, &mut mono);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(mono.len(), 100);
        assert_eq!(state.position_frames(), 100.0);

        transport.start();
        let mut out = vec![0.0; 10];
        render_output(&mut out, 1, 48000, &clip, &state, &mut mono);
        assert_eq!(out[0], clip.mono(100));
        assert_eq!(out[9], clip.mono(109));
        assert_eq!(state.position_frames(), 110.0);
    }

    #[test]
    fn test_end_of_clip_stops_and_rewinds_on_start() {
        let clip = ramp_clip(10);
        let (mut transport, _) = controller(&clip);
        let state = Arc::clone(transport.state());
        let mut out = vec![1.0; 16];
        let mut mono = Vec::new();

        transport.start();
        render_output(&mut out, 1, 48000, &clip, &state, &mut mono);
        assert!(!state.is_playing());
        assert!(state.is_at_end());
        assert_eq!(&out[10..], &[0.0; 6]);

        transport.start();
        assert_eq!(state.position_frames(), 0.0);
    }

    #[test]
    fn test_channel_mapping_and_rate_step() {
        // Stereo clip at half the device rate: each source frame plays twice
        let clip = AudioClip::from_interleaved(vec![0.1, 0.2, 0.3, 0.4], 2, 24000).unwrap();
        let state = PlaybackState::for_clip(&clip);
        state.set_playing(true);
        let mut out = vec![0.0; 4 * 3];
        let mut mono = Vec::new();

        render_output(&mut out, 3, 48000, &clip, &state, &mut mono);

        assert_eq!(&out[0..3], &[0.1, 0.2, 0.2]);
        assert_eq!(&out[3..6], &[0.1, 0.2, 0.2]);
        assert_eq!(&out[6..9], &[0.3, 0.4, 0.4]);
        assert_eq!(state.position_frames(), 2.0);
        assert_eq!(mono.len(), 4);
    }

    #[test]
    fn test_seek_clamps() {
        let clip = ramp_clip(48000);
        let (mut transport, _) = controller(&clip);
        transport.seek(0.5);
        assert!((transport.position_secs() - 0.5).abs() < 1e-9);
        transport.seek(10.0);
        assert!((transport.position_secs() - 1.0).abs() < 1e-9);
        transport.seek(-3.0);
        assert_eq!(transport.position_secs(), 0.0);
    }
}
