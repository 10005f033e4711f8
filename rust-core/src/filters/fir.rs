//! Decimating FIR filter with state management
//!
//! Direct convolution over a ring-buffer delay line, evaluated only on the
//! samples that survive decimation.

use crate::error::{CoreError, Result};
use std::collections::TryReserveError;

/// Decimating FIR filter processor
pub struct FirDecimator {
    /// Filter coefficients h[n]
    coefficients: Vec<f32>,

    /// Ring buffer state (delay line), one slot per coefficient
    state_buffer: Vec<f32>,

    /// Current write position in ring buffer
    cursor: usize,

    /// Keep one output every `decimation` inputs
    decimation: usize,

    /// Inputs consumed since the last output
    phase: usize,
}

impl FirDecimator {
    /// Create a new decimator
    ///
    /// # Arguments
    /// * `coefficients` - Filter coefficients h[n] for n = 0..M-1
    /// * `decimation` - Decimation factor (1 = plain FIR)
    pub fn new(coefficients: Vec<f32>, decimation: usize) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(CoreError::invalid("FIR filter needs at least one coefficient"));
        }
        if decimation == 0 {
            return Err(CoreError::invalid("decimation factor must be non-zero"));
        }

        let state_buffer = vec![0.0; coefficients.len()];

        Ok(Self {
            coefficients,
            state_buffer,
            cursor: 0,
            decimation,
            phase: 0,
        })
    }

    /// Push one input sample; returns an output when the decimation phase completes
    #[inline]
    pub fn push_sample(&mut self, input: f32) -> Option<f32> {
        let length = self.coefficients.len();
        self.state_buffer[self.cursor] = input;

        self.phase += 1;
        let output = if self.phase == self.decimation {
            self.phase = 0;

            // y[n] = Σ h[k] * x[n-k]
            let mut acc = 0.0;
            for (k, &coeff) in self.coefficients.iter().enumerate() {
                let idx = (self.cursor + length - k) % length;
                acc += coeff * self.state_buffer[idx];
            }
            Some(acc)
        } else {
            None
        };

        self.cursor = (self.cursor + 1) % length;
        output
    }

    /// Process a block of samples
    ///
    /// # Returns
    /// Decimated output, `input.len() / decimation` samples (plus any carried phase)
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        let mut output = Vec::with_capacity(input.len() / self.decimation + 1);
        for &x in input {
            if let Some(y) = self.push_sample(x) {
                output.push(y);
            }
        }
        output
    }

    /// Process a block of samples, reporting allocation failure instead of aborting
    pub fn try_process(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let capacity = input.len() / self.decimation + 1;
        let mut output = Vec::new();
        output
            .try_reserve_exact(capacity)
            .map_err(|_: TryReserveError| CoreError::AllocationFailure { requested: capacity })?;

        output.extend(input.iter().filter_map(|&x| self.push_sample(x)));
        Ok(output)
    }

    /// Reset filter state (clear delay line and decimation phase)
    pub fn reset(&mut self) {
        self.state_buffer.fill(0.0);
        self.cursor = 0;
        self.phase = 0;
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    pub fn decimation(&self) -> usize {
        self.decimation
    }

    /// Group delay in input samples (linear-phase FIR)
    pub fn group_delay(&self) -> f32 {
        (self.coefficients.len() - 1) as f32 / 2.0
    }
}
