//! PyO3 bindings for Python integration

use crate::error::CoreError;
use pyo3::exceptions::{PyMemoryError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

mod filter_bindings;
mod signal_bindings;
mod spectrum_bindings;

impl From<CoreError> for PyErr {
    fn from(err: CoreError) -> PyErr {
        match err {
            CoreError::InvalidArgument(_) | CoreError::UnknownWindowType(_) => {
                PyValueError::new_err(err.to_string())
            }
            CoreError::AllocationFailure { .. } => PyMemoryError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

/// Python module definition
#[pymodule]
fn wavescope(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<filter_bindings::PyWindowKind>()?;
    m.add_class::<filter_bindings::PyFirDecimator>()?;
    m.add_class::<spectrum_bindings::PySpectrumAnalyzer>()?;

    m.add_function(wrap_pyfunction!(filter_bindings::generate_window, m)?)?;
    m.add_function(wrap_pyfunction!(signal_bindings::synthesize, m)?)?;
    m.add_function(wrap_pyfunction!(signal_bindings::rasterize, m)?)?;

    Ok(())
}
