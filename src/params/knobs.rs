//! User-tunable knobs: names, slider bindings and the value record.

use std::fmt;
use std::str::FromStr;

/// One user-tunable scalar knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterField {
    ColorSpeed,
    PointSize,
    Wave1Amplitude,
    Wave1Frequency,
    Wave1Speed,
    Wave2Amplitude,
    Wave2Frequency,
    Wave2Speed,
}

/// Control panel binding for a knob: label, slider range and startup value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobBinding {
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl KnobBinding {
    /// Snap `value` into `[min, max]`. NaN falls back to the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }

    /// Width of the slider range
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

impl ParameterField {
    pub const COUNT: usize = 8;

    /// All knobs in control-panel order
    pub const ALL: [ParameterField; Self::COUNT] = [
        Self::ColorSpeed,
        Self::PointSize,
        Self::Wave1Amplitude,
        Self::Wave1Frequency,
        Self::Wave1Speed,
        Self::Wave2Amplitude,
        Self::Wave2Frequency,
        Self::Wave2Speed,
    ];

    /// Position of this knob in [`ParameterField::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Knob name as used on the command line and console
    pub fn name(self) -> &'static str {
        match self {
            Self::ColorSpeed => "color_speed",
            Self::PointSize => "point_size",
            Self::Wave1Amplitude => "wave1_amplitude",
            Self::Wave1Frequency => "wave1_frequency",
            Self::Wave1Speed => "wave1_speed",
            Self::Wave2Amplitude => "wave2_amplitude",
            Self::Wave2Frequency => "wave2_frequency",
            Self::Wave2Speed => "wave2_speed",
        }
    }

    /// Name of the shader uniform this knob feeds
    pub fn uniform_name(self) -> &'static str {
        match self {
            Self::ColorSpeed => "color_speed",
            Self::PointSize => "point_size",
            Self::Wave1Amplitude => "noise_amp_1",
            Self::Wave1Frequency => "noise_freq_1",
            Self::Wave1Speed => "speed_modifier_1",
            Self::Wave2Amplitude => "noise_amp_2",
            Self::Wave2Frequency => "noise_freq_2",
            Self::Wave2Speed => "speed_modifier_2",
        }
    }

    pub fn binding(self) -> KnobBinding {
        let (label, min, max, default) = match self {
            Self::ColorSpeed => ("color change speed", 0.0, 2.0, 1.0),
            Self::PointSize => ("point size", 0.0, 10.0, 1.0),
            Self::Wave1Amplitude => ("Wave 1 Amp", 0.0, 3.0, 0.31),
            Self::Wave1Frequency => ("Wave 1 Freq", 0.0, 3.0, 0.31),
            Self::Wave1Speed => ("Wave 1 Speed", 0.0, 3.0, 1.0),
            Self::Wave2Amplitude => ("Wave 2 Amp", 0.0, 3.0, 1.5),
            Self::Wave2Frequency => ("Wave 2 Freq", 0.0, 3.0, 0.31),
            Self::Wave2Speed => ("Wave 2 Speed", 0.0, 3.0, 1.0),
        };
        KnobBinding {
            label,
            min,
            max,
            default,
        }
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParameterField {
    type Err = String;

    /// Accepts knob names and uniform names, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.name() == wanted || field.uniform_name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|f| f.name()).collect();
                format!("unknown parameter '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Snapshot of every knob value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    pub color_speed: f32,
    pub point_size: f32,
    pub wave1_amplitude: f32,
    pub wave1_frequency: f32,
    pub wave1_speed: f32,
    pub wave2_amplitude: f32,
    pub wave2_frequency: f32,
    pub wave2_speed: f32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        let mut set = Self {
            color_speed: 0.0,
            point_size: 0.0,
            wave1_amplitude: 0.0,
            wave1_frequency: 0.0,
            wave1_speed: 0.0,
            wave2_amplitude: 0.0,
            wave2_frequency: 0.0,
            wave2_speed: 0.0,
        };
        for field in ParameterField::ALL {
            *set.slot_mut(field) = field.binding().default;
        }
        set
    }
}

impl ParameterSet {
    pub fn get(&self, field: ParameterField) -> f32 {
        match field {
            ParameterField::ColorSpeed => self.color_speed,
            ParameterField::PointSize => self.point_size,
            ParameterField::Wave1Amplitude => self.wave1_amplitude,
            ParameterField::Wave1Frequency => self.wave1_frequency,
            ParameterField::Wave1Speed => self.wave1_speed,
            ParameterField::Wave2Amplitude => self.wave2_amplitude,
            ParameterField::Wave2Frequency => self.wave2_frequency,
            ParameterField::Wave2Speed => self.wave2_speed,
        }
    }

    /// Write a knob, clamping into its declared range
    pub fn set(&mut self, field: ParameterField, value: f32) {
        *self.slot_mut(field) = field.binding().clamp(value);
    }

    /// Iterate `(field, value)` pairs in control-panel order
    pub fn iter(&self) -> impl Iterator<Item = (ParameterField, f32)> + '_ {
        ParameterField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }

    fn slot_mut(&mut self, field: ParameterField) -> &mut f32 {
        match field {
            ParameterField::ColorSpeed => &mut self.color_speed,
            ParameterField::PointSize => &mut self.point_size,
            ParameterField::Wave1Amplitude => &mut self.wave1_amplitude,
            ParameterField::Wave1Frequency => &mut self.wave1_frequency,
            ParameterField::Wave1Speed => &mut self.wave1_speed,
            ParameterField::Wave2Amplitude => &mut self.wave2_amplitude,
            ParameterField::Wave2Frequency => &mut self.wave2_frequency,
            ParameterField::Wave2Speed => &mut self.wave2_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_bindings() {
        let set = ParameterSet::default();
        assert_eq!(set.color_speed, 1.0);
        assert_eq!(set.point_size, 1.0);
        assert_eq!(set.wave1_amplitude, 0.31);
        assert_eq!(set.wave1_frequency, 0.31);
        assert_eq!(set.wave1_speed, 1.0);
        assert_eq!(set.wave2_amplitude, 1.5);
        assert_eq!(set.wave2_frequency, 0.31);
        assert_eq!(set.wave2_speed, 1.0);
    }

    #[test]
    fn test_defaults_lie_in_range() {
        for field in ParameterField::ALL {
            let b = field.binding();
            assert!(b.min <= b.default && b.default <= b.max, "{field}");
        }
    }

    #[test]
    fn test_set_clamps() {
        let mut set = ParameterSet::default();
        set.set(ParameterField::PointSize, 15.0);
        set.set(ParameterField::Wave1Amplitude, -1.0);
        set.set(ParameterField::ColorSpeed, f32::NAN);
        assert_eq!(set.point_size, 10.0);
        assert_eq!(set.wave1_amplitude, 0.0);
        assert_eq!(set.color_speed, 1.0);
    }

    #[test]
    fn test_parse_accepts_uniform_names() {
        assert_eq!(
            "noise_amp_2".parse::<ParameterField>(),
            Ok(ParameterField::Wave2Amplitude)
        );
        assert_eq!(
            " Point_Size ".parse::<ParameterField>(),
            Ok(ParameterField::PointSize)
        );
        assert!("volume".parse::<ParameterField>().is_err());
    }

    #[test]
    fn test_index_matches_order() {
        for (i, field) in ParameterField::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }
}
