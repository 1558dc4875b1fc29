//! Display-paced render loop: refresh spectrum, sync uniforms, draw, re-arm.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use crate::audio::{SpectrumSampler, SpectrumSnapshot};
use crate::params::ParameterStore;
use crate::uniforms::{UniformBridge, UniformFrame};

/// Source of session-relative time for the `time` uniform
pub trait FrameClock {
    /// Begin counting from zero
    fn start(&mut self);

    /// Seconds since `start`, never decreasing
    fn elapsed_secs(&mut self) -> f32;
}

/// Wall clock started when the loop starts running
#[derive(Debug, Default)]
pub struct SessionClock {
    started: Option<Instant>,
    last: f32,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameClock for SessionClock {
    fn start(&mut self) {
        self.started = Some(Instant::now());
        self.last = 0.0;
    }

    fn elapsed_secs(&mut self) -> f32 {
        let Some(started) = self.started else {
            return 0.0;
        };
        self.last = self.last.max(started.elapsed().as_secs_f32());
        self.last
    }
}

/// Why a draw did not reach the screen
#[derive(Debug, Clone, PartialEq)]
pub enum DrawError {
    /// Surface lost or outdated (resize, context loss); recoverable
    SurfaceLost,
    /// The display did not hand out a frame in time; skip this one
    Timeout,
    /// The renderer cannot continue
    Fatal(String),
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceLost => f.write_str("render surface lost"),
            Self::Timeout => f.write_str("timed out waiting for a frame"),
            Self::Fatal(msg) => write!(f, "fatal render error: {}", msg),
        }
    }
}

impl std::error::Error for DrawError {}

/// What the scheduler drives each tick
pub trait FrameTarget {
    /// Upload this tick's uniforms and spectrum
    fn push_uniforms(&mut self, frame: &UniformFrame, spectrum: &SpectrumSnapshot);

    /// Issue one draw with the last pushed values
    fn draw(&mut self) -> Result<(), DrawError>;

    /// Reconfigure the drawing surface after it was lost
    fn reacquire_surface(&mut self);

    /// Ask the display for the next tick
    fn request_next_frame(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Tick counter with rolling frame rate (logged once per second)
struct FrameStats {
    ticks: u64,
    frame_times: VecDeque<Duration>,
    last_frame: Option<Instant>,
    last_log: Instant,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            ticks: 0,
            frame_times: VecDeque::new(),
            last_frame: None,
            last_log: Instant::now(),
        }
    }

    fn record_frame(&mut self) {
        self.ticks += 1;
        let now = Instant::now();
        if let Some(last) = self.last_frame.replace(now) {
            self.frame_times.push_back(now - last);
            if self.frame_times.len() > 60 {
                self.frame_times.pop_front();
            }
        }

        if now - self.last_log > Duration::from_secs(1) {
            log::debug!("FPS: {:.1} ({} ticks)", self.fps(), self.ticks);
            self.last_log = now;
        }
    }

    fn fps(&self) -> f32 {
        let total: Duration = self.frame_times.iter().sum();
        if self.frame_times.is_empty() || total.is_zero() {
            return 0.0;
        }
        self.frame_times.len() as f32 / total.as_secs_f32()
    }
}

/// Owns the per-tick pipeline and its ordering
pub struct FrameScheduler<C: FrameClock = SessionClock> {
    state: SchedulerState,
    clock: C,
    sampler: SpectrumSampler,
    store: ParameterStore,
    bridge: UniformBridge,
    stats: FrameStats,
    last_frame: Option<UniformFrame>,
}

impl<C: FrameClock> FrameScheduler<C> {
    pub fn new(sampler: SpectrumSampler, store: ParameterStore, clock: C) -> Self {
        Self {
            state: SchedulerState::Idle,
            clock,
            sampler,
            store,
            bridge: UniformBridge::new(),
            stats: FrameStats::new(),
            last_frame: None,
        }
    }

    /// `Idle -> Running`, once the scene exists. Starts session time at 0.
    pub fn start(&mut self) {
        if self.state != SchedulerState::Idle {
            log::warn!("Frame scheduler already started ({:?})", self.state);
            return;
        }
        self.clock.start();
        self.state = SchedulerState::Running;
        log::info!("Frame loop running");
    }

    /// Run one tick against `target`.
    ///
    /// Lost surfaces are reacquired and timeouts skipped; only a fatal draw
    /// error stops the loop and is returned.
    pub fn tick<T: FrameTarget>(&mut self, target: &mut T) -> Result<(), DrawError> {
        if self.state != SchedulerState::Running {
            return Ok(());
        }

        // Capture everything before pushing anything
        let spectrum = self.sampler.refresh();
        let elapsed = self.clock.elapsed_secs();
        let parameters = self.store.get();
        let frame = self.bridge.sync(elapsed, &parameters);

        target.push_uniforms(&frame, spectrum);
        self.last_frame = Some(frame);

        match target.draw() {
            Ok(()) => {}
            Err(DrawError::SurfaceLost) => {
                log::warn!("Render surface lost, reconfiguring");
                target.reacquire_surface();
            }
            Err(DrawError::Timeout) => log::debug!("Frame timed out, skipping"),
            Err(err @ DrawError::Fatal(_)) => {
                log::error!("{}", err);
                self.state = SchedulerState::Stopped;
                return Err(err);
            }
        }

        self.stats.record_frame();
        target.request_next_frame();
        Ok(())
    }

    /// Host teardown: no further ticks run
    pub fn stop(&mut self) {
        if self.state != SchedulerState::Stopped {
            self.state = SchedulerState::Stopped;
            log::info!("Frame loop stopped after {} ticks", self.stats.ticks);
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Frame pushed by the most recent tick
    pub fn last_frame(&self) -> Option<&UniformFrame> {
        self.last_frame.as_ref()
    }

    pub fn tick_count(&self) -> u64 {
        self.stats.ticks
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn sampler(&self) -> &SpectrumSampler {
        &self.sampler
    }
}
