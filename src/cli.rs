//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::params::{AnalyserConfig, ParameterField, ParameterSet, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Wavefield")]
#[command(about = "Audio-reactive wireframe wave plane", long_about = None)]
pub struct Args {
    /// WAV file to play (omit to run the visuals silent)
    #[arg(value_name = "AUDIO")]
    pub audio: Option<PathBuf>,

    /// Analysis window size (power of two)
    #[arg(long, value_name = "SAMPLES", default_value_t = 1024)]
    pub fft_size: usize,

    /// Spectrum smoothing between analysis frames, 0..1
    #[arg(long, value_name = "TAU", default_value_t = 0.8)]
    pub smoothing: f32,

    /// Window width (pixels)
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Window height (pixels)
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Start playback as soon as the window opens
    #[arg(long)]
    pub autoplay: bool,

    /// Initial parameter value, e.g. --set point_size=4 (repeatable)
    #[arg(long = "set", value_name = "PARAM=VALUE", value_parser = parse_override)]
    pub overrides: Vec<(ParameterField, f32)>,

    /// Print the parameter table and exit
    #[arg(long)]
    pub list_params: bool,

    /// Do not read commands from stdin
    #[arg(long)]
    pub no_console: bool,
}

impl Args {
    pub fn analyser_config(&self) -> AnalyserConfig {
        AnalyserConfig {
            fft_size: self.fft_size,
            smoothing_time_constant: self.smoothing,
            ..AnalyserConfig::default()
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width,
            window_height: self.height,
            ..RenderConfig::default()
        }
    }

    /// Defaults with `--set` overrides applied (clamped)
    pub fn initial_parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::default();
        for &(field, value) in &self.overrides {
            params.set(field, value);
            if params.get(field) != value {
                log::warn!("{} = {} is out of range, using {}", field, value, params.get(field));
            }
        }
        params
    }
}

fn parse_override(raw: &str) -> Result<(ParameterField, f32), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PARAM=VALUE, got '{}'", raw))?;
    let field = name.parse::<ParameterField>()?;
    let value = value
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("'{}' is not a number", value))?;
    Ok((field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["wavefield"]);
        assert!(args.audio.is_none());
        assert_eq!(args.analyser_config().fft_size, 1024);
        assert_eq!(args.render_config().window_width, 1280);
        assert_eq!(args.initial_parameters(), ParameterSet::default());
    }

    #[test]
    fn test_overrides_are_clamped() {
        let args = Args::parse_from([
            "wavefield",
            "song.wav",
            "--set",
            "point_size=15",
            "--set",
            "noise_amp_1=-1",
            "--fft-size",
            "512",
        ]);
        let params = args.initial_parameters();
        assert_eq!(params.point_size, 10.0);
        assert_eq!(params.wave1_amplitude, 0.0);
        assert_eq!(args.analyser_config().bin_count(), 256);
        assert_eq!(args.audio, Some(PathBuf::from("song.wav")));
    }

    #[test]
    fn test_bad_override_rejected() {
        assert!(Args::try_parse_from(["wavefield", "--set", "point_size"]).is_err());
        assert!(Args::try_parse_from(["wavefield", "--set", "gain=1"]).is_err());
    }
}
