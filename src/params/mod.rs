//! Parameter definitions with documented units and ranges.
//!
//! - `knobs`/`store`: the user-tunable values the control panel edits
//! - `audio`/`render`: startup configuration, fixed for the session

mod audio;
mod knobs;
mod render;
mod store;

// Re-export all types
pub use audio::AnalyserConfig;
pub use knobs::{KnobBinding, ParameterField, ParameterSet};
pub use render::{RenderConfig, SceneConfig};
pub use store::ParameterStore;
