//! Per-frame pull of the latest spectrum into a reusable buffer.

use super::analysis::SharedSpectrum;

/// Byte magnitudes for one tick, `fft_size / 2` bins, low frequencies first.
///
/// The sampler refreshes this buffer in place; call [`SpectrumSnapshot::to_vec`]
/// to keep values beyond the current tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectrumSnapshot {
    bins: Vec<u8>,
}

impl SpectrumSnapshot {
    pub fn silent(bin_count: usize) -> Self {
        Self {
            bins: vec![0; bin_count],
        }
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn is_silent(&self) -> bool {
        self.bins.iter().all(|&b| b == 0)
    }

    /// Mean magnitude normalised to [0, 1]
    pub fn level(&self) -> f32 {
        if self.bins.is_empty() {
            return 0.0;
        }
        self.bins.iter().map(|&b| b as f32).sum::<f32>() / (255.0 * self.bins.len() as f32)
    }

    /// Explicit copy that outlives the tick
    pub fn to_vec(&self) -> Vec<u8> {
        self.bins.clone()
    }
}

/// Non-blocking reader of the analysis thread's latest result
pub struct SpectrumSampler {
    source: SharedSpectrum,
    snapshot: SpectrumSnapshot,
    last_generation: u64,
    stale_refreshes: u64,
}

impl SpectrumSampler {
    pub fn new(source: SharedSpectrum) -> Self {
        let bin_count = source.bin_count();
        Self {
            source,
            snapshot: SpectrumSnapshot::silent(bin_count),
            last_generation: 0,
            stale_refreshes: 0,
        }
    }

    /// Pull the most recent analysis into the reusable buffer.
    ///
    /// Never waits: if the analysis thread is mid-publish the previous
    /// values are kept for this tick.
    pub fn refresh(&mut self) -> &SpectrumSnapshot {
        match self.source.try_copy_into(&mut self.snapshot.bins) {
            Some(generation) => self.last_generation = generation,
            None => {
                self.stale_refreshes += 1;
                log::trace!("Spectrum busy, reusing previous bins");
            }
        }
        &self.snapshot
    }

    /// Current buffer contents without refreshing
    pub fn snapshot(&self) -> &SpectrumSnapshot {
        &self.snapshot
    }

    /// Analysis generation last copied (0 = nothing published yet)
    pub fn generation(&self) -> u64 {
        self.last_generation
    }

    /// Refreshes that kept previous values because the source was busy
    pub fn stale_refreshes(&self) -> u64 {
        self.stale_refreshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_before_analysis() {
        let mut sampler = SpectrumSampler::new(SharedSpectrum::new(512));
        let snapshot = sampler.refresh();
        assert_eq!(snapshot.len(), 512);
        assert!(snapshot.is_silent());
        assert_eq!(sampler.generation(), 0);
    }

    #[test]
    fn test_refresh_mutates_in_place() {
        let shared = SharedSpectrum::new(4);
        let mut sampler = SpectrumSampler::new(shared.clone());

        shared.publish(&[10, 20, 30, 40]);
        let kept = sampler.refresh().to_vec();
        let first_ptr = sampler.snapshot().bins().as_ptr();

        shared.publish(&[1, 2, 3, 4]);
        let second = sampler.refresh();

        assert_eq!(second.bins(), &[1, 2, 3, 4]);
        assert_eq!(second.bins().as_ptr(), first_ptr);
        assert_eq!(kept, vec![10, 20, 30, 40]);
        assert_eq!(sampler.generation(), 2);
    }

    #[test]
    fn test_level() {
        let shared = SharedSpectrum::new(2);
        let mut sampler = SpectrumSampler::new(shared.clone());
        shared.publish(&[255, 0]);
        assert!((sampler.refresh().level() - 0.5).abs() < 1e-6);
    }
}
