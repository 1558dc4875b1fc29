//! Shared knob storage crossing the control-surface / render-loop boundary.
//!
//! Each knob is an `AtomicU32` holding `f32` bits, so writers on any thread
//! update one field atomically and the render loop never waits on them.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use super::knobs::{ParameterField, ParameterSet};

struct StoreInner {
    values: [AtomicU32; ParameterField::COUNT],
    /// Bumped after every write (used to notice changes cheaply)
    revision: AtomicU64,
}

/// Cloneable handle to the session's knob values
#[derive(Clone)]
pub struct ParameterStore {
    inner: Arc<StoreInner>,
}

impl ParameterStore {
    /// Create a store holding `initial`, clamped into each knob's range
    pub fn new(initial: ParameterSet) -> Self {
        let values = std::array::from_fn(|i| {
            let field = ParameterField::ALL[i];
            AtomicU32::new(field.binding().clamp(initial.get(field)).to_bits())
        });
        Self {
            inner: Arc::new(StoreInner {
                values,
                revision: AtomicU64::new(0),
            }),
        }
    }

    /// Read every knob as currently stored
    pub fn get(&self) -> ParameterSet {
        let mut set = ParameterSet::default();
        for field in ParameterField::ALL {
            set.set(field, self.value(field));
        }
        set
    }

    /// Read a single knob
    pub fn value(&self, field: ParameterField) -> f32 {
        f32::from_bits(self.inner.values[field.index()].load(Ordering::Acquire))
    }

    /// Store `clamp(value, min, max)` for `field` and return what was stored
    pub fn set(&self, field: ParameterField, value: f32) -> f32 {
        let clamped = field.binding().clamp(value);
        if clamped != value {
            log::debug!("{} clamped {} -> {}", field, value, clamped);
        }
        self.inner.values[field.index()].store(clamped.to_bits(), Ordering::Release);
        self.inner.revision.fetch_add(1, Ordering::AcqRel);
        clamped
    }

    /// Move `field` by `delta`, clamped, and return the new value
    pub fn nudge(&self, field: ParameterField, delta: f32) -> f32 {
        let slot = &self.inner.values[field.index()];
        let binding = field.binding();
        let mut current = slot.load(Ordering::Acquire);
        loop {
            let next = binding.clamp(f32::from_bits(current) + delta);
            match slot.compare_exchange_weak(
                current,
                next.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.inner.revision.fetch_add(1, Ordering::AcqRel);
                    return next;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Restore the startup default for `field`
    pub fn reset(&self, field: ParameterField) -> f32 {
        self.set(field, field.binding().default)
    }

    /// Number of writes since creation
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Acquire)
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(ParameterSet::default())
    }
}

impl std::fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterStore")
            .field("values", &self.get())
            .field("revision", &self.revision())
            .finish()
    }
}
