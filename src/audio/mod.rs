//! Clip playback and real-time spectrum analysis.
//!
//! Audio and video are paced independently; they meet only where the
//! [`SpectrumSampler`] polls the analysis thread's latest result.

mod analysis;
mod playback;
mod sampler;
mod source;
mod system;

// Re-export public types
pub use analysis::{blackman_window, AnalysisWorker, SampleTap, SharedSpectrum, SpectrumAnalyser};
pub use playback::{
    render_output, AudioContext, DetachedContext, PlaybackController, PlaybackState,
};
pub use sampler::{SpectrumSampler, SpectrumSnapshot};
pub use source::AudioClip;
pub use system::{AudioSystem, CpalContext};
