//! FFT analysis thread and the shared buffers around it.
//!
//! The audio callback writes played samples into a [`SampleTap`]; the analysis
//! thread periodically turns the newest window into byte magnitudes and
//! publishes them through [`SharedSpectrum`] for the render loop to poll.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use std::thread;
use std::time::Duration;

use crate::params::AnalyserConfig;

/// Rolling window of the most recent mono samples sent to the output device
#[derive(Clone)]
pub struct SampleTap {
    samples: Arc<Mutex<VecDeque<f32>>>,
    capacity: usize,
}

impl SampleTap {
    /// Create a tap pre-filled with `capacity` samples of silence
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Arc::new(Mutex::new(std::iter::repeat(0.0).take(capacity).collect())),
            capacity,
        }
    }

    /// Append samples, discarding the oldest beyond capacity
    pub fn write(&self, samples: &[f32]) {
        let mut buf = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        let keep = samples.len().min(self.capacity);
        let overflow = (buf.len() + keep).saturating_sub(self.capacity);
        buf.drain(..overflow);
        buf.extend(&samples[samples.len() - keep..]);
    }

    /// Copy the newest `out.len()` samples into `out` (oldest first)
    pub fn latest(&self, out: &mut [f32]) {
        let buf = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        let n = out.len().min(buf.len());
        let pad = out.len() - n;
        out[..pad].fill(0.0);
        for (dst, src) in out[pad..].iter_mut().zip(buf.iter().skip(buf.len() - n)) {
            *dst = *src;
        }
    }
}

struct PublishedSpectrum {
    bins: Vec<u8>,
    generation: u64,
}

/// Latest analysis result, shared between the analysis thread and readers
#[derive(Clone)]
pub struct SharedSpectrum {
    inner: Arc<Mutex<PublishedSpectrum>>,
}

impl SharedSpectrum {
    /// Create a silent spectrum with `bin_count` bins
    pub fn new(bin_count: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PublishedSpectrum {
                bins: vec![0; bin_count],
                generation: 0,
            })),
        }
    }

    pub fn bin_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bins
            .len()
    }

    /// Replace the published bins
    pub fn publish(&self, bins: &[u8]) {
        let mut published = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let n = bins.len().min(published.bins.len());
        published.bins[..n].copy_from_slice(&bins[..n]);
        published.generation += 1;
    }

    /// Copy the latest bins into `out` without blocking.
    ///
    /// Returns the generation copied, or `None` if the writer held the lock
    /// (in which case `out` is left untouched).
    pub fn try_copy_into(&self, out: &mut [u8]) -> Option<u64> {
        let published = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        let n = out.len().min(published.bins.len());
        out[..n].copy_from_slice(&published.bins[..n]);
        Some(published.generation)
    }
}

/// Web-Audio style analyser: Blackman window, FFT, smoothing, dB to bytes
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    config: AnalyserConfig,
}

impl SpectrumAnalyser {
    pub fn new(config: &AnalyserConfig) -> Self {
        let n = config.fft_size;
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(n),
            window: (0..n).map(|i| blackman_window(i, n)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); n],
            smoothed: vec![0.0; config.bin_count()],
            config: config.clone(),
        }
    }

    pub fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Analyse one window of `fft_size` samples into `out` (`bin_count` bytes)
    pub fn process(&mut self, samples: &[f32], out: &mut [u8]) {
        let n = self.config.fft_size;
        debug_assert_eq!(samples.len(), n);

        for ((slot, &sample), &w) in self.buffer.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.buffer);

        let tau = self.config.smoothing_time_constant;
        let db_range = self.config.max_decibels - self.config.min_decibels;
        let scale = 1.0 / n as f32;

        for (k, (smoothed, byte)) in self.smoothed.iter_mut().zip(out.iter_mut()).enumerate() {
            let magnitude = self.buffer[k].norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            if !smoothed.is_finite() {
                *smoothed = 0.0;
            }

            // log10(0) = -inf, which clamps to byte 0
            let db = 20.0 * smoothed.log10();
            let scaled = 255.0 / db_range * (db - self.config.min_decibels);
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }
    }
}

/// Blackman window function for FFT analysis (alpha = 0.16)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

/// Background analysis thread, stopped and joined on drop
pub struct AnalysisWorker {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl AnalysisWorker {
    /// Spawn FFT analysis thread
    pub fn spawn(config: AnalyserConfig, tap: SampleTap, spectrum: SharedSpectrum) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let running_thread = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("spectrum-analysis".to_string())
            .spawn(move || {
                let mut analyser = SpectrumAnalyser::new(&config);
                let mut window = vec![0.0; config.fft_size];
                let mut bins = vec![0u8; config.bin_count()];
                let interval = Duration::from_millis(config.update_interval_ms);

                log::debug!(
                    "Analysis thread started ({} bins every {:?})",
                    bins.len(),
                    interval
                );

                while running_thread.load(Ordering::Acquire) {
                    thread::sleep(interval);
                    tap.latest(&mut window);
                    analyser.process(&window, &mut bins);
                    spectrum.publish(&bins);
                }

                log::debug!("Analysis thread stopped");
            });

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                log::warn!("Could not start analysis thread, spectrum stays silent: {}", e);
                None
            }
        };

        Self { running, handle }
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(smoothing: f32) -> AnalyserConfig {
        AnalyserConfig {
            smoothing_time_constant: smoothing,
            ..AnalyserConfig::default()
        }
    }

    fn tone(bin: usize, amplitude: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * bin as f32 * i as f32 / n as f32).sin())
            .collect()
    }

    #[test]
    fn test_blackman_window() {
        let size = 1024;

        // Blackman window is ~0 at the edges and 1 at the centre
        assert!(blackman_window(0, size).abs() < 1e-6);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_silence_is_zero() {
        let cfg = config(0.8);
        let mut analyser = SpectrumAnalyser::new(&cfg);
        let mut out = vec![7u8; cfg.bin_count()];
        analyser.process(&vec![0.0; cfg.fft_size], &mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tone_peaks_at_its_bin() {
        let cfg = config(0.0);
        let mut analyser = SpectrumAnalyser::new(&cfg);
        let mut out = vec![0u8; cfg.bin_count()];
        analyser.process(&tone(32, 0.001, cfg.fft_size), &mut out);

        let (peak_bin, &peak) = out.iter().enumerate().max_by_key(|&(_, &b)| b).unwrap();
        assert_eq!(peak_bin, 32);
        assert!(peak > 0 && peak < 255);
        assert_eq!(out[200], 0);
    }

    #[test]
    fn test_loud_tone_saturates() {
        let cfg = config(0.0);
        let mut analyser = SpectrumAnalyser::new(&cfg);
        let mut out = vec![0u8; cfg.bin_count()];
        analyser.process(&tone(64, 1.0, cfg.fft_size), &mut out);
        assert_eq!(out[64], 255);
    }

    #[test]
    fn test_smoothing_decays_gradually() {
        let cfg = config(0.8);
        let mut analyser = SpectrumAnalyser::new(&cfg);
        let mut out = vec![0u8; cfg.bin_count()];

        for _ in 0..20 {
            analyser.process(&tone(32, 0.01, cfg.fft_size), &mut out);
        }
        let loud = out[32];

        analyser.process(&vec![0.0; cfg.fft_size], &mut out);
        let first = out[32];
        analyser.process(&vec![0.0; cfg.fft_size], &mut out);
        let second = out[32];

        assert!(loud > first && first > second && second > 0);
    }

    #[test]
    fn test_tap_keeps_newest_samples() {
        let tap = SampleTap::new(4);
        tap.write(&[1.0, 2.0, 3.0]);
        tap.write(&[4.0, 5.0, 6.0, 7.0, 8.0]);

        let mut out = [0.0; 4];
        tap.latest(&mut out);
        assert_eq!(out, [5.0, 6.0, 7.0, 8.0]);

        let mut wide = [9.0; 6];
        tap.latest(&mut wide);
        assert_eq!(wide, [0.0, 0.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_shared_spectrum_generations() {
        let shared = SharedSpectrum::new(4);
        let mut out = [9u8; 4];
        assert_eq!(shared.try_copy_into(&mut out), Some(0));
        assert_eq!(out, [0; 4]);

        shared.publish(&[1, 2, 3, 4]);
        assert_eq!(shared.try_copy_into(&mut out), Some(1));
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn test_worker_publishes_and_stops() {
        let mut cfg = config(0.0);
        cfg.update_interval_ms = 1;
        let tap = SampleTap::new(cfg.fft_size);
        let shared = SharedSpectrum::new(cfg.bin_count());
        tap.write(&tone(16, 1.0, cfg.fft_size));

        let worker = AnalysisWorker::spawn(cfg.clone(), tap, shared.clone());
        let mut out = vec![0u8; cfg.bin_count()];
        let mut generation = 0;
        for _ in 0..500 {
            thread::sleep(Duration::from_millis(2));
            generation = shared.try_copy_into(&mut out).unwrap_or(0);
            if generation > 0 {
                break;
            }
        }
        drop(worker);

        assert!(generation > 0);
        assert_eq!(out[16], 255);
    }
}
