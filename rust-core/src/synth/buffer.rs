//! Fixed-length sample buffer shared by synthesis, analysis and output

use super::wave::{synthesize, WaveDescriptor};
use crate::error::{try_zeroed, CoreError, Result};
use std::sync::Arc;

/// Fixed-length sample buffer
///
/// Length is set once at construction. Analysis borrows it; DAC sessions take an
/// immutable [`SampleBuffer::snapshot`] so later rewrites never reach a running session.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<f32>,
}

impl SampleBuffer {
    /// Create a zeroed buffer of `length` samples
    pub fn new(length: usize) -> Result<Self> {
        if length == 0 {
            return Err(CoreError::invalid("sample buffer length must be non-zero"));
        }
        Ok(Self {
            samples: try_zeroed(length)?,
        })
    }

    /// Zero every sample
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }

    /// Zero the buffer and synthesize `descriptors` into it
    pub fn regenerate(&mut self, descriptors: &[WaveDescriptor]) -> Result<()> {
        self.clear();
        synthesize(descriptors, &mut self.samples)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Immutable copy for consumers running in another execution context
    pub fn snapshot(&self) -> Arc<[f32]> {
        Arc::from(self.samples.as_slice())
    }
}
