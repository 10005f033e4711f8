//! Python bindings for spectrum analysis

use super::filter_bindings::PyWindowKind;
use crate::spectrum::SpectrumAnalyzer;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Spectrum analyzer exposed to Python
#[pyclass(name = "SpectrumAnalyzer")]
pub struct PySpectrumAnalyzer {
    analyzer: SpectrumAnalyzer,
}

#[pymethods]
impl PySpectrumAnalyzer {
    /// Create an analyzer, initialized when `max_size` is given
    ///
    /// Args:
    ///     max_size: Largest FFT size (power of two)
    #[new]
    #[pyo3(signature = (max_size=Some(4096)))]
    fn new(max_size: Option<usize>) -> PyResult<Self> {
        let mut analyzer = SpectrumAnalyzer::new();
        if let Some(size) = max_size {
            analyzer.initialize(size)?;
        }
        Ok(Self { analyzer })
    }

    fn initialize(&mut self, max_size: usize) -> PyResult<()> {
        Ok(self.analyzer.initialize(max_size)?)
    }

    fn deinitialize(&mut self) {
        self.analyzer.deinitialize();
    }

    fn is_initialized(&self) -> bool {
        self.analyzer.is_initialized()
    }

    /// Window and transform a signal
    ///
    /// Args:
    ///     signal: Samples as numpy array, power-of-two length
    ///     window: Analysis window
    ///
    /// Returns:
    ///     Tuple of (log magnitude in dB, power), each len(signal)/2 bins
    #[pyo3(signature = (signal, window=PyWindowKind::Hann))]
    fn apply<'py>(
        &mut self,
        py: Python<'py>,
        signal: PyReadonlyArray1<f32>,
        window: PyWindowKind,
    ) -> PyResult<(&'py PyArray1<f32>, &'py PyArray1<f32>)> {
        let samples = signal
            .as_slice()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let spectrum = self.analyzer.apply(samples, window.into())?;

        Ok((
            PyArray1::from_vec(py, spectrum.log_magnitude),
            PyArray1::from_vec(py, spectrum.power),
        ))
    }
}
