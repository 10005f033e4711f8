//! FFT engine using rustfft for complex in-place transforms
//!
//! Plans (twiddle tables) for every power-of-two size up to the configured
//! maximum are built once, so a transform never allocates.

use crate::error::{try_zeroed, CoreError, Result};
use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Complex FFT engine for power-of-two sizes
pub struct FftEngine {
    /// Largest supported transform size
    max_size: usize,

    /// Forward plans, index i holds size 2^(i+1)
    plans: Vec<Arc<dyn Fft<f32>>>,

    /// Reusable scratch buffer, sized for the largest plan
    scratch: Vec<Complex32>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `max_size` - Largest FFT size (power of two, at least 2)
    pub fn new(max_size: usize) -> Result<Self> {
        if max_size < 2 || !max_size.is_power_of_two() {
            return Err(CoreError::invalid(format!(
                "maximum FFT size {} must be a power of two >= 2",
                max_size
            )));
        }

        let mut planner = FftPlanner::<f32>::new();
        let plans: Vec<Arc<dyn Fft<f32>>> = (1..=max_size.trailing_zeros())
            .map(|bits| planner.plan_fft_forward(1usize << bits))
            .collect();

        let scratch_len = plans
            .iter()
            .map(|plan| plan.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);

        Ok(Self {
            max_size,
            plans,
            scratch: try_zeroed(scratch_len)?,
        })
    }

    /// Whether a transform of `size` points can run on this engine
    pub fn supports(&self, size: usize) -> bool {
        size >= 2 && size <= self.max_size && size.is_power_of_two()
    }

    /// Forward FFT in place, output in natural bin order
    pub fn process(&mut self, buffer: &mut [Complex32]) -> Result<()> {
        let size = buffer.len();
        if !self.supports(size) {
            return Err(CoreError::invalid(format!(
                "FFT size {} must be a power of two in 2..={}",
                size, self.max_size
            )));
        }

        let plan = &self.plans[size.trailing_zeros() as usize - 1];
        let scratch_len = plan.get_inplace_scratch_len();
        plan.process_with_scratch(buffer, &mut self.scratch[..scratch_len]);
        Ok(())
    }

    /// Get maximum FFT size
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
