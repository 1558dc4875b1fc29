//! Session state: one store, one scheduler, one transport, created once.

use crate::audio::{AnalysisWorker, PlaybackController, SpectrumSampler};
use crate::control_panel::ControlEvent;
use crate::params::ParameterStore;
use crate::scheduler::{DrawError, FrameClock, FrameScheduler, FrameTarget, SchedulerState, SessionClock};

/// Everything that lives for the whole visualisation
pub struct Session<C: FrameClock = SessionClock> {
    store: ParameterStore,
    scheduler: FrameScheduler<C>,
    playback: PlaybackController,
    _analysis: Option<AnalysisWorker>,
}

impl<C: FrameClock> Session<C> {
    pub fn new(
        store: ParameterStore,
        sampler: SpectrumSampler,
        playback: PlaybackController,
        analysis: Option<AnalysisWorker>,
        clock: C,
    ) -> Self {
        Self {
            scheduler: FrameScheduler::new(sampler, store.clone(), clock),
            store,
            playback,
            _analysis: analysis,
        }
    }

    /// Start the frame loop; call once the scene has been built
    pub fn begin(&mut self) {
        self.scheduler.start();
    }

    pub fn tick<T: FrameTarget>(&mut self, target: &mut T) -> Result<(), DrawError> {
        self.scheduler.tick(target)
    }

    /// Apply a transport request. Returns `false` for quit.
    pub fn handle_control(&mut self, event: ControlEvent) -> bool {
        match event {
            ControlEvent::Start => self.playback.start(),
            ControlEvent::Stop => self.playback.stop(),
            ControlEvent::Seek(secs) => self.playback.seek(secs),
            ControlEvent::Quit => return false,
        }
        true
    }

    /// Host teardown
    pub fn end(&mut self) {
        self.playback.stop();
        self.scheduler.stop();
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn scheduler(&self) -> &FrameScheduler<C> {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.state() == SchedulerState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{DetachedContext, PlaybackState, SharedSpectrum};
    use std::sync::Arc;

    fn silent_session() -> Session {
        let playback = PlaybackController::new(
            Box::new(DetachedContext::new("test")),
            Arc::new(PlaybackState::new(44_100, 44_100)),
        );
        Session::new(
            ParameterStore::default(),
            SpectrumSampler::new(SharedSpectrum::new(512)),
            playback,
            None,
            SessionClock::new(),
        )
    }

    #[test]
    fn test_lifecycle() {
        let mut session = silent_session();
        assert!(!session.is_running());
        session.begin();
        assert!(session.is_running());
        session.end();
        assert!(!session.is_running());
        assert_eq!(session.scheduler().state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_controls_without_audio_device() {
        let mut session = silent_session();
        assert!(session.handle_control(ControlEvent::Start));
        assert!(!session.playback().is_playing());
        assert!(session.handle_control(ControlEvent::Seek(0.5)));
        assert!((session.playback().position_secs() - 0.5).abs() < 1e-9);
        assert!(!session.handle_control(ControlEvent::Quit));
    }
}
