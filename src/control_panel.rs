//! Control surfaces that edit knobs and drive the transport.
//!
//! Two panels write to the shared [`ParameterStore`]: keyboard input in the
//! window, and a console reading commands from stdin on its own thread.
//! Transport commands go back to the event loop as [`ControlEvent`]s.

use std::io::BufRead;
use std::thread;
use winit::keyboard::KeyCode;

use crate::params::{ParameterField, ParameterStore};

/// Requests the event loop must act on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    Start,
    Stop,
    Seek(f64),
    Quit,
}

/// Result of a key press on the keyboard panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelAction {
    Selected(ParameterField),
    Changed(ParameterField, f32),
    Control(ControlEvent),
}

/// Keyboard panel: select a knob, nudge it, reset it
#[derive(Debug)]
pub struct ControlPanel {
    store: ParameterStore,
    selected: usize,
}

impl ControlPanel {
    /// Nudge size as a fraction of the knob's range
    const FINE_STEP: f32 = 0.01;
    const COARSE_STEP: f32 = 0.1;

    pub fn new(store: ParameterStore) -> Self {
        Self { store, selected: 0 }
    }

    pub fn selected(&self) -> ParameterField {
        ParameterField::ALL[self.selected]
    }

    pub fn handle_key(&mut self, key: KeyCode, shift: bool) -> Option<PanelAction> {
        let count = ParameterField::COUNT;
        match key {
            KeyCode::Tab => {
                self.selected = if shift {
                    (self.selected + count - 1) % count
                } else {
                    (self.selected + 1) % count
                };
                Some(PanelAction::Selected(self.selected()))
            }
            KeyCode::ArrowUp | KeyCode::ArrowDown => {
                let field = self.selected();
                let step = if shift {
                    Self::COARSE_STEP
                } else {
                    Self::FINE_STEP
                };
                let sign = if key == KeyCode::ArrowUp { 1.0 } else { -1.0 };
                let value = self
                    .store
                    .nudge(field, sign * step * field.binding().span());
                Some(PanelAction::Changed(field, value))
            }
            KeyCode::KeyR => {
                let field = self.selected();
                Some(PanelAction::Changed(field, self.store.reset(field)))
            }
            KeyCode::Space => Some(PanelAction::Control(ControlEvent::Start)),
            KeyCode::Backspace => Some(PanelAction::Control(ControlEvent::Stop)),
            KeyCode::Escape => Some(PanelAction::Control(ControlEvent::Quit)),
            _ => None,
        }
    }
}

/// One line of console input
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Set(ParameterField, f32),
    Reset(ParameterField),
    Show,
    Help,
    Control(ControlEvent),
}

impl ConsoleCommand {
    /// Parse `<field> <value>`, `reset <field>`, `seek <secs>`,
    /// `start`, `stop`, `show`, `help`, `quit`
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let head = words
            .next()
            .ok_or_else(|| "empty command".to_string())?
            .to_ascii_lowercase();
        let arg = words.next();
        if let Some(extra) = words.next() {
            return Err(format!("unexpected '{}'", extra));
        }

        let cmd = match (head.as_str(), arg) {
            ("start" | "play", None) => Self::Control(ControlEvent::Start),
            ("stop" | "pause", None) => Self::Control(ControlEvent::Stop),
            ("quit" | "exit", None) => Self::Control(ControlEvent::Quit),
            ("show", None) => Self::Show,
            ("help", None) => Self::Help,
            ("seek", Some(secs)) => Self::Control(ControlEvent::Seek(parse_number(secs)?)),
            ("reset", Some(name)) => Self::Reset(name.parse()?),
            (name, Some(value)) => Self::Set(name.parse()?, parse_number(value)?),
            (other, None) => return Err(format!("unknown command '{}'", other)),
        };
        Ok(cmd)
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("'{}' is not a number", raw))
}

/// Render every knob with its binding, one per line
pub fn describe_parameters(store: &ParameterStore) -> String {
    store
        .get()
        .iter()
        .map(|(field, value)| {
            let b = field.binding();
            format!(
                "{:<16} {:>7.3}  [{} .. {}]  {}",
                field.name(),
                value,
                b.min,
                b.max,
                b.label
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub const CONSOLE_HELP: &str = "\
commands:
  <param> <value>   set a parameter (clamped to its range)
  reset <param>     restore a parameter's default
  show              list parameters
  start | stop      audio transport
  seek <seconds>    move the playback position
  quit              close the window";

/// Apply one console line; returns the event to forward, if any
pub fn apply_console_line(store: &ParameterStore, line: &str) -> Result<Option<ControlEvent>, String> {
    match ConsoleCommand::parse(line)? {
        ConsoleCommand::Set(field, value) => {
            let stored = store.set(field, value);
            log::info!("{} = {}", field, stored);
            Ok(None)
        }
        ConsoleCommand::Reset(field) => {
            let stored = store.reset(field);
            log::info!("{} = {} (default)", field, stored);
            Ok(None)
        }
        ConsoleCommand::Show => {
            println!("{}", describe_parameters(store));
            Ok(None)
        }
        ConsoleCommand::Help => {
            println!("{}", CONSOLE_HELP);
            Ok(None)
        }
        ConsoleCommand::Control(event) => Ok(Some(event)),
    }
}

/// Read commands from stdin until EOF on a background thread
pub fn spawn_console<F>(store: ParameterStore, mut forward: F) -> std::io::Result<thread::JoinHandle<()>>
where
    F: FnMut(ControlEvent) -> bool + Send + 'static,
{
    thread::Builder::new()
        .name("console-panel".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match apply_console_line(&store, &line) {
                    Ok(Some(event)) => {
                        // Event loop gone: nothing left to control
                        if !forward(event) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("{} (type 'help')", e),
                }
            }
            log::debug!("Console panel closed");
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycles_selection() {
        let mut panel = ControlPanel::new(ParameterStore::default());
        assert_eq!(panel.selected(), ParameterField::ColorSpeed);
        panel.handle_key(KeyCode::Tab, true);
        assert_eq!(panel.selected(), ParameterField::Wave2Speed);
        panel.handle_key(KeyCode::Tab, false);
        panel.handle_key(KeyCode::Tab, false);
        assert_eq!(panel.selected(), ParameterField::PointSize);
    }

    #[test]
    fn test_arrows_nudge_by_range_fraction() {
        let store = ParameterStore::default();
        let mut panel = ControlPanel::new(store.clone());
        panel.handle_key(KeyCode::Tab, false); // point_size, range 10

        let action = panel.handle_key(KeyCode::ArrowUp, true);
        assert_eq!(action, Some(PanelAction::Changed(ParameterField::PointSize, 2.0)));
        panel.handle_key(KeyCode::ArrowDown, false);
        assert!((store.value(ParameterField::PointSize) - 1.9).abs() < 1e-5);

        for _ in 0..50 {
            panel.handle_key(KeyCode::ArrowUp, true);
        }
        assert_eq!(store.value(ParameterField::PointSize), 10.0);

        panel.handle_key(KeyCode::KeyR, false);
        assert_eq!(store.value(ParameterField::PointSize), 1.0);
    }

    #[test]
    fn test_transport_keys() {
        let mut panel = ControlPanel::new(ParameterStore::default());
        assert_eq!(
            panel.handle_key(KeyCode::Space, false),
            Some(PanelAction::Control(ControlEvent::Start))
        );
        assert_eq!(
            panel.handle_key(KeyCode::Backspace, false),
            Some(PanelAction::Control(ControlEvent::Stop))
        );
        assert_eq!(panel.handle_key(KeyCode::KeyQ, false), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ConsoleCommand::parse("point_size 15"),
            Ok(ConsoleCommand::Set(ParameterField::PointSize, 15.0))
        );
        assert_eq!(
            ConsoleCommand::parse("noise_freq_1 0.5"),
            Ok(ConsoleCommand::Set(ParameterField::Wave1Frequency, 0.5))
        );
        assert_eq!(
            ConsoleCommand::parse("  START "),
            Ok(ConsoleCommand::Control(ControlEvent::Start))
        );
        assert_eq!(
            ConsoleCommand::parse("seek 12.5"),
            Ok(ConsoleCommand::Control(ControlEvent::Seek(12.5)))
        );
        assert_eq!(
            ConsoleCommand::parse("reset wave2_speed"),
            Ok(ConsoleCommand::Reset(ParameterField::Wave2Speed))
        );
        assert!(ConsoleCommand::parse("point_size loud").is_err());
        assert!(ConsoleCommand::parse("volume 3").is_err());
        assert!(ConsoleCommand::parse("stop now please").is_err());
        assert!(ConsoleCommand::parse("").is_err());
    }

    #[test]
    fn test_console_line_clamps_through_store() {
        let store = ParameterStore::default();
        assert_eq!(apply_console_line(&store, "wave1_amplitude -1"), Ok(None));
        assert_eq!(store.value(ParameterField::Wave1Amplitude), 0.0);
        assert_eq!(
            apply_console_line(&store, "stop"),
            Ok(Some(ControlEvent::Stop))
        );
    }

    #[test]
    fn test_describe_lists_every_knob() {
        let text = describe_parameters(&ParameterStore::default());
        assert_eq!(text.lines().count(), ParameterField::COUNT);
        assert!(text.contains("Wave 2 Amp"));
    }
}
