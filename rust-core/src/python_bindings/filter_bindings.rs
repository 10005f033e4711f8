//! Python bindings for windows and the decimating FIR filter

use crate::filters::{design_decimation_lowpass, FirDecimator, WindowKind};
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Window kind enum exposed to Python
#[pyclass(name = "WindowKind")]
#[derive(Clone, Copy)]
pub enum PyWindowKind {
    Hann,
    Blackman,
    BlackmanHarris,
    BlackmanNuttall,
    Nuttall,
    FlatTop,
}

impl From<PyWindowKind> for WindowKind {
    fn from(py_win: PyWindowKind) -> Self {
        match py_win {
            PyWindowKind::Hann => WindowKind::Hann,
            PyWindowKind::Blackman => WindowKind::Blackman,
            PyWindowKind::BlackmanHarris => WindowKind::BlackmanHarris,
            PyWindowKind::BlackmanNuttall => WindowKind::BlackmanNuttall,
            PyWindowKind::Nuttall => WindowKind::Nuttall,
            PyWindowKind::FlatTop => WindowKind::FlatTop,
        }
    }
}

#[pymethods]
impl PyWindowKind {
    /// Look up a window by its wire name, e.g. "BLACKMAN_HARRIS_F32"
    #[staticmethod]
    fn from_name(name: &str) -> PyResult<Self> {
        let kind: WindowKind = name.parse()?;
        Ok(match kind {
            WindowKind::Hann => PyWindowKind::Hann,
            WindowKind::Blackman => PyWindowKind::Blackman,
            WindowKind::BlackmanHarris => PyWindowKind::BlackmanHarris,
            WindowKind::BlackmanNuttall => PyWindowKind::BlackmanNuttall,
            WindowKind::Nuttall => PyWindowKind::Nuttall,
            WindowKind::FlatTop => PyWindowKind::FlatTop,
        })
    }

    /// Wire name of the window
    fn name(&self) -> &'static str {
        WindowKind::from(*self).name()
    }
}

/// Generate `length` window coefficients
#[pyfunction]
pub fn generate_window(py: Python<'_>, kind: PyWindowKind, length: usize) -> &PyArray1<f32> {
    PyArray1::from_vec(py, crate::filters::generate_window(kind.into(), length))
}

/// Decimating FIR filter exposed to Python
#[pyclass(name = "FirDecimator")]
pub struct PyFirDecimator {
    filter: FirDecimator,
}

#[pymethods]
impl PyFirDecimator {
    /// Create a decimator from explicit coefficients
    ///
    /// Args:
    ///     coefficients: Filter coefficients as numpy array
    ///     decimation: Keep one output every `decimation` inputs
    #[new]
    #[pyo3(signature = (coefficients, decimation=2))]
    fn new(coefficients: PyReadonlyArray1<f32>, decimation: usize) -> PyResult<Self> {
        let coeffs = coefficients
            .as_slice()
            .map_err(|e| PyValueError::new_err(e.to_string()))?
            .to_vec();
        Ok(Self {
            filter: FirDecimator::new(coeffs, decimation)?,
        })
    }

    /// Design a windowed-sinc anti-aliasing decimator
    ///
    /// Args:
    ///     taps: Filter length
    ///     decimation: Decimation factor, cutoff is 0.5/decimation cycles/sample
    ///     window: Window used to truncate the ideal response
    #[staticmethod]
    #[pyo3(signature = (taps=64, decimation=2, window=PyWindowKind::Blackman))]
    fn design(taps: usize, decimation: usize, window: PyWindowKind) -> PyResult<Self> {
        let coeffs = design_decimation_lowpass(taps, decimation, window.into())?;
        Ok(Self {
            filter: FirDecimator::new(coeffs, decimation)?,
        })
    }

    /// Filter and decimate a block of samples
    fn process<'py>(
        &mut self,
        py: Python<'py>,
        input: PyReadonlyArray1<f32>,
    ) -> PyResult<&'py PyArray1<f32>> {
        let samples = input
            .as_slice()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(PyArray1::from_vec(py, self.filter.try_process(samples)?))
    }

    fn reset(&mut self) {
        self.filter.reset();
    }

    fn coefficients<'py>(&self, py: Python<'py>) -> &'py PyArray1<f32> {
        PyArray1::from_slice(py, self.filter.coefficients())
    }

    fn group_delay(&self) -> f32 {
        self.filter.group_delay()
    }
}
