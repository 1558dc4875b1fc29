//! Wavefield library - audio-reactive wireframe plane
//!
//! Each displayed frame merges three independently paced sources (the
//! spectrum analysis thread, the knob store and the frame clock) into one
//! consistent set of shader uniforms.

pub mod audio;
pub mod camera;
pub mod cli;
pub mod control_panel;
pub mod mesh;
pub mod params;
pub mod rendering;
pub mod scheduler;
pub mod session;
pub mod uniforms;
