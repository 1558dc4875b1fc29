//! Wavefield - a wireframe wave plane that moves with the music.
//!
//! Knobs can be changed with the keyboard in the window or by typing
//! commands on stdin; Space/Backspace start and stop the audio.

use anyhow::{anyhow, Context};
use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use wavefield::audio::{
    AnalysisWorker, AudioClip, AudioSystem, DetachedContext, PlaybackController, PlaybackState,
    SharedSpectrum, SpectrumSampler,
};
use wavefield::cli::Args;
use wavefield::control_panel::{
    describe_parameters, spawn_console, ControlEvent, ControlPanel, PanelAction, CONSOLE_HELP,
};
use wavefield::mesh::PlaneGeometry;
use wavefield::params::{AnalyserConfig, ParameterStore, RenderConfig, SceneConfig};
use wavefield::rendering::RenderSystem;
use wavefield::scheduler::SessionClock;
use wavefield::session::Session;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Session (store, scheduler, transport)
    session: Session,
    panel: ControlPanel,

    // Scene
    plane: PlaneGeometry,
    render_config: RenderConfig,
    spectrum_bins: usize,

    autoplay: bool,
    shift_held: bool,
}

impl App {
    fn apply_control(&mut self, event_loop: &ActiveEventLoop, event: ControlEvent) {
        if !self.session.handle_control(event) {
            self.shutdown(event_loop);
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.session.end();
        event_loop.exit();
    }

    fn handle_panel(&mut self, event_loop: &ActiveEventLoop, action: PanelAction) {
        match action {
            PanelAction::Selected(field) => {
                let b = field.binding();
                log::info!(
                    "Selected {} '{}' = {:.3} [{} .. {}]",
                    field,
                    b.label,
                    self.session.store().value(field),
                    b.min,
                    b.max
                );
            }
            PanelAction::Changed(field, value) => log::info!("{} = {:.3}", field, value),
            PanelAction::Control(event) => self.apply_control(event_loop, event),
        }
    }
}

impl ApplicationHandler<ControlEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        // Create window
        let window_attributes = Window::default_attributes()
            .with_title("Wavefield")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        // Initialize rendering system
        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.plane,
            &self.render_config,
            self.spectrum_bins,
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                log::error!("Failed to initialise renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        // Scene exists: the loop can start
        self.session.begin();
        if self.autoplay {
            self.session.handle_control(ControlEvent::Start);
        }

        println!("\nWavefield is running!");
        println!("Tab: select parameter, Up/Down: adjust (Shift = x10), R: reset");
        println!("Space: start audio, Backspace: stop, ESC: quit\n");

        window.request_redraw();
        self.window = Some(window);
        self.render_system = Some(render_system);
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ControlEvent) {
        self.apply_control(event_loop, event);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(physical_size) => {
                if let Some(render_system) = &mut self.render_system {
                    render_system.resize(physical_size);
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_held = modifiers.state().shift_key();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                if let Some(action) = self.panel.handle_key(code, self.shift_held) {
                    self.handle_panel(event_loop, action);
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(render_system) = &mut self.render_system else {
                    return;
                };
                // The tick re-arms itself; a fatal error ends the session
                if let Err(e) = self.session.tick(render_system) {
                    log::error!("Stopping: {}", e);
                    self.shutdown(event_loop);
                }
            }
            _ => {}
        }
    }
}

/// Audio parts for the session; degrades to a silent, detached transport
fn open_audio(
    args: &Args,
    config: &AnalyserConfig,
) -> anyhow::Result<(PlaybackController, SharedSpectrum, Option<AnalysisWorker>)> {
    let Some(path) = &args.audio else {
        log::info!("No audio file given, running silent");
        return Ok(detached_audio(None, config, "no audio file given"));
    };

    let clip = AudioClip::load(path)?;
    let clip_state = PlaybackState::for_clip(&clip);

    match AudioSystem::new(clip, config) {
        Ok(audio) => Ok((audio.playback, audio.spectrum, Some(audio.analysis))),
        Err(e) => {
            log::warn!("Audio unavailable, visuals only: {:#}", e);
            Ok(detached_audio(Some(clip_state), config, &format!("{:#}", e)))
        }
    }
}

fn detached_audio(
    state: Option<PlaybackState>,
    config: &AnalyserConfig,
    reason: &str,
) -> (PlaybackController, SharedSpectrum, Option<AnalysisWorker>) {
    let state = Arc::new(state.unwrap_or_else(|| PlaybackState::new(0, 1)));
    let playback = PlaybackController::new(Box::new(DetachedContext::new(reason)), state);
    (playback, SharedSpectrum::new(config.bin_count()), None)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_params {
        println!("{}", describe_parameters(&ParameterStore::default()));
        return Ok(());
    }

    log::info!("Wavefield - audio-reactive wave plane");
    log::info!("Initializing systems...");

    let analyser_config = args.analyser_config();
    analyser_config
        .validate()
        .map_err(|e| anyhow!("Invalid analyser config: {}", e))?;
    let render_config = args.render_config();
    render_config
        .validate()
        .map_err(|e| anyhow!("Invalid render config: {}", e))?;

    let store = ParameterStore::new(args.initial_parameters());
    let (playback, spectrum, analysis) = open_audio(&args, &analyser_config)?;
    let spectrum_bins = spectrum.bin_count();

    let session = Session::new(
        store.clone(),
        SpectrumSampler::new(spectrum),
        playback,
        analysis,
        SessionClock::new(),
    );

    let event_loop = EventLoop::<ControlEvent>::with_user_event()
        .build()
        .context("create event loop")?;

    if !args.no_console {
        let proxy = event_loop.create_proxy();
        match spawn_console(store.clone(), move |event| proxy.send_event(event).is_ok()) {
            Ok(_) => log::info!("Console ready, type 'help' for commands"),
            Err(e) => log::warn!("Console panel unavailable: {}", e),
        }
        log::debug!("{}", CONSOLE_HELP);
    }

    let mut app = App {
        window: None,
        render_system: None,
        session,
        panel: ControlPanel::new(store),
        plane: PlaneGeometry::new(&SceneConfig::default()),
        render_config,
        spectrum_bins,
        autoplay: args.autoplay,
        shift_held: false,
    };

    event_loop.run_app(&mut app).context("run event loop")?;
    Ok(())
}
