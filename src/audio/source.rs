//! In-memory audio asset loaded from a WAV file.

use anyhow::{bail, Context};
use std::path::Path;

/// Decoded audio: interleaved f32 samples in [-1, 1]
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl AudioClip {
    /// Load a WAV file (integer or float PCM)
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("open audio file {}", path.display()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .with_context(|| format!("decode float samples from {}", path.display()))?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
                    .with_context(|| format!("decode int samples from {}", path.display()))?
            }
        };

        let clip = Self::from_interleaved(samples, spec.channels, spec.sample_rate)?;
        log::info!(
            "Loaded {}: {} ch @ {} Hz, {:.1}s",
            path.display(),
            clip.channels,
            clip.sample_rate,
            clip.duration_secs()
        );
        Ok(clip)
    }

    /// Wrap already-decoded interleaved samples
    pub fn from_interleaved(
        samples: Vec<f32>,
        channels: u16,
        sample_rate: u32,
    ) -> anyhow::Result<Self> {
        if channels == 0 {
            bail!("audio clip needs at least one channel");
        }
        if sample_rate == 0 {
            bail!("audio clip sample rate must be > 0");
        }
        if samples.len() % channels as usize != 0 {
            bail!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            );
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Samples of one frame, or `None` past the end
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let ch = self.channels as usize;
        let start = index.checked_mul(ch)?;
        self.samples.get(start..start + ch)
    }

    /// Channel average of one frame (silence past the end)
    pub fn mono(&self, index: usize) -> f32 {
        self.frame(index)
            .map(|f| f.iter().sum::<f32>() / f.len() as f32)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_access() {
        let clip = AudioClip::from_interleaved(vec![0.1, 0.3, 0.5, 0.7], 2, 8000).unwrap();
        assert_eq!(clip.frames(), 2);
        assert_eq!(clip.frame(1), Some(&[0.5, 0.7][..]));
        assert_eq!(clip.frame(2), None);
        assert!((clip.mono(0) - 0.2).abs() < 1e-6);
        assert_eq!(clip.mono(5), 0.0);
        assert!((clip.duration_secs() - 2.0 / 8000.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_ragged_samples() {
        assert!(AudioClip::from_interleaved(vec![0.0; 3], 2, 44100).is_err());
        assert!(AudioClip::from_interleaved(vec![0.0; 4], 0, 44100).is_err());
        assert!(AudioClip::from_interleaved(vec![0.0; 4], 1, 0).is_err());
    }

    #[test]
    fn test_load_int_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0i16, 16384, -16384, i16::MAX] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let clip = AudioClip::load(&path).unwrap();
        assert_eq!(clip.channels(), 1);
        assert_eq!(clip.sample_rate(), 22050);
        assert_eq!(clip.frames(), 4);
        assert!((clip.mono(1) - 0.5).abs() < 1e-4);
        assert!((clip.mono(2) + 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = AudioClip::load(Path::new("/definitely/not/here.wav")).unwrap_err();
        assert!(format!("{err:#}").contains("open audio file"));
    }
}
