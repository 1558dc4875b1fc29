//! Audio system wiring clip playback, the output device and FFT analysis.

use anyhow::{anyhow, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use std::sync::Arc;

use super::analysis::{AnalysisWorker, SampleTap, SharedSpectrum};
use super::playback::{render_output, AudioContext, PlaybackController, PlaybackState};
use super::source::AudioClip;
use crate::params::AnalyserConfig;

/// cpal output stream, built paused until the first `start()`
pub struct CpalContext {
    stream: cpal::Stream,
    suspended: bool,
}

impl AudioContext for CpalContext {
    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> anyhow::Result<()> {
        self.stream.play().context("resume audio output stream")?;
        self.suspended = false;
        Ok(())
    }
}

/// Everything the session needs from the audio side
pub struct AudioSystem {
    pub playback: PlaybackController,
    pub spectrum: SharedSpectrum,
    pub analysis: AnalysisWorker,
}

impl AudioSystem {
    /// Open the default output device for `clip` and start analysis
    pub fn new(clip: AudioClip, config: &AnalyserConfig) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid analyser config: {}", e))?;

        let tap = SampleTap::new(config.fft_size);
        let spectrum = SharedSpectrum::new(config.bin_count());
        let state = Arc::new(PlaybackState::for_clip(&clip));

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No audio output device found"))?;
        let supported = device
            .default_output_config()
            .context("get default output config")?;

        log::info!(
            "Audio: {} @ {}Hz, {} ch, {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            supported.sample_rate().0,
            supported.channels(),
            supported.sample_format()
        );

        let format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();
        let clip = Arc::new(clip);

        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, clip, &state, &tap),
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, clip, &state, &tap),
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, clip, &state, &tap),
            other => return Err(anyhow!("unsupported output sample format: {other:?}")),
        }?;

        // Hold the engine suspended until the user asks for playback
        if let Err(e) = stream.pause() {
            log::debug!("Output stream cannot pause before start: {}", e);
        }

        let analysis = AnalysisWorker::spawn(config.clone(), tap, spectrum.clone());
        let context = CpalContext {
            stream,
            suspended: true,
        };

        Ok(Self {
            playback: PlaybackController::new(Box::new(context), state),
            spectrum,
            analysis,
        })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    clip: Arc<AudioClip>,
    state: &Arc<PlaybackState>,
    tap: &SampleTap,
) -> anyhow::Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let device_rate = config.sample_rate.0;
    let state = Arc::clone(state);
    let tap = tap.clone();
    let mut scratch: Vec<f32> = Vec::new();
    let mut mono: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len(), 0.0);
                render_output(
                    &mut scratch,
                    channels,
                    device_rate,
                    &clip,
                    &state,
                    &mut mono,
                );
                for (dst, &src) in data.iter_mut().zip(&scratch) {
                    *dst = T::from_sample(src);
                }
                tap.write(&mono);
            },
            |err| log::warn!("Audio stream error: {}", err),
            None,
        )
        .context("build audio output stream")
}
