//! Python bindings for synthesis and rasterization

use crate::display::{rasterize as rasterize_series, AxisBounds};
use crate::synth::{synthesize as synthesize_into, WaveDescriptor};
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Sum sine waves into a new buffer
///
/// Args:
///     waves: List of (amplitude, frequency, phase, offset) tuples, frequency
///         in cycles/sample
///     length: Number of samples
#[pyfunction]
pub fn synthesize(
    py: Python<'_>,
    waves: Vec<(f32, f32, f32, f32)>,
    length: usize,
) -> PyResult<&PyArray1<f32>> {
    let descriptors = waves
        .into_iter()
        .map(|(amplitude, frequency, phase, offset)| {
            WaveDescriptor::new(amplitude, frequency, phase, offset)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut samples = vec![0.0; length];
    synthesize_into(&descriptors, &mut samples)?;
    Ok(PyArray1::from_vec(py, samples))
}

/// Min/max column-binned bitmap of a series
///
/// Returns:
///     Rows of booleans, `height` rows of `width` pixels, True where marked
#[pyfunction]
#[pyo3(signature = (series, width=128, height=64, y_min=0.0, y_max=50.0))]
pub fn rasterize(
    series: PyReadonlyArray1<f32>,
    width: usize,
    height: usize,
    y_min: f32,
    y_max: f32,
) -> PyResult<Vec<Vec<bool>>> {
    let data = series
        .as_slice()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let canvas = rasterize_series(data, width, height, AxisBounds::new(y_min, y_max)?)?;

    Ok((0..canvas.height())
        .map(|y| (0..canvas.width()).map(|x| canvas.get(x, y)).collect())
        .collect())
}
