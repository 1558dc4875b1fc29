//! Spectrum analysis configuration.

/// Frequency analysis configuration (Web-Audio style analyser)
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// Analysis window size in samples (must be power of 2)
    pub fft_size: usize,

    /// Temporal smoothing between analysis frames, 0 = none
    /// Formula: smoothed = tau * previous + (1 - tau) * current
    pub smoothing_time_constant: f32,

    /// Magnitude (dB) mapped to byte 0
    pub min_decibels: f32,

    /// Magnitude (dB) mapped to byte 255
    pub max_decibels: f32,

    /// Analysis thread period (milliseconds)
    /// 10 ms keeps the published spectrum fresher than a 60 Hz frame
    pub update_interval_ms: u64,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
            update_interval_ms: 10,
        }
    }
}

impl AnalyserConfig {
    /// Number of magnitude bins produced per analysis (half the window)
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Centre frequency of `bin` at the given sample rate
    pub fn bin_frequency_hz(&self, bin: usize, sample_rate_hz: u32) -> f32 {
        bin as f32 * sample_rate_hz as f32 / self.fft_size as f32
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(format!(
                "FFT size must be a power of 2 in 32..=32768, got {}",
                self.fft_size
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(format!(
                "Smoothing must be in [0, 1), got {}",
                self.smoothing_time_constant
            ));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            ));
        }
        if self.update_interval_ms == 0 {
            return Err("Update interval must be > 0".to_string());
        }
        Ok(())
    }
}
