//! Uniform contract between the render loop and the wave shader.
//!
//! [`UniformFrame`] is laid out exactly like `WaveUniforms` in `shader.wgsl`;
//! field order follows [`UNIFORM_NAMES`].

use bytemuck::{Pod, Zeroable};

use crate::params::{ParameterField, ParameterSet};

/// Uniform names in buffer order
pub const UNIFORM_NAMES: [&str; 9] = [
    "time",
    "color_speed",
    "point_size",
    "noise_amp_1",
    "noise_freq_1",
    "speed_modifier_1",
    "noise_amp_2",
    "noise_freq_2",
    "speed_modifier_2",
];

/// Every value handed to the shader for one draw
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct UniformFrame {
    pub time: f32,
    pub color_speed: f32,
    pub point_size: f32,
    pub noise_amp_1: f32,
    pub noise_freq_1: f32,
    pub speed_modifier_1: f32,
    pub noise_amp_2: f32,
    pub noise_freq_2: f32,
    pub speed_modifier_2: f32,
    pub _padding: [f32; 3], // Pad to 48 bytes
}

impl UniformFrame {
    /// `(uniform name, value)` pairs in buffer order
    pub fn named_values(&self) -> [(&'static str, f32); 9] {
        let values = [
            self.time,
            self.color_speed,
            self.point_size,
            self.noise_amp_1,
            self.noise_freq_1,
            self.speed_modifier_1,
            self.noise_amp_2,
            self.noise_freq_2,
            self.speed_modifier_2,
        ];
        std::array::from_fn(|i| (UNIFORM_NAMES[i], values[i]))
    }

    /// Look up a value by uniform name
    pub fn get(&self, name: &str) -> Option<f32> {
        self.named_values()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Value fed by a knob
    pub fn parameter(&self, field: ParameterField) -> f32 {
        match field {
            ParameterField::ColorSpeed => self.color_speed,
            ParameterField::PointSize => self.point_size,
            ParameterField::Wave1Amplitude => self.noise_amp_1,
            ParameterField::Wave1Frequency => self.noise_freq_1,
            ParameterField::Wave1Speed => self.speed_modifier_1,
            ParameterField::Wave2Amplitude => self.noise_amp_2,
            ParameterField::Wave2Frequency => self.noise_freq_2,
            ParameterField::Wave2Speed => self.speed_modifier_2,
        }
    }
}

/// Maps elapsed time and knob values onto the uniform contract
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformBridge;

impl UniformBridge {
    pub fn new() -> Self {
        Self
    }

    /// Build the frame for one tick. Values pass through untouched; the
    /// store already clamped them.
    pub fn sync(&self, elapsed_time: f32, parameters: &ParameterSet) -> UniformFrame {
        UniformFrame {
            time: elapsed_time,
            color_speed: parameters.color_speed,
            point_size: parameters.point_size,
            noise_amp_1: parameters.wave1_amplitude,
            noise_freq_1: parameters.wave1_frequency,
            speed_modifier_1: parameters.wave1_speed,
            noise_amp_2: parameters.wave2_amplitude,
            noise_freq_2: parameters.wave2_frequency,
            speed_modifier_2: parameters.wave2_speed,
            _padding: [0.0; 3],
        }
    }
}
