//! Column-binned min/max rasterization of a data series
//!
//! Maps an arbitrary-length series onto a much smaller pixel grid. Every
//! sample landing in a column widens that column's min/max envelope, and the
//! envelope is drawn as one contiguous vertical run, so a downsampled trace
//! stays connected instead of breaking into isolated dots.

use crate::error::{try_zeroed, CoreError, Result};
use serde::{Deserialize, Serialize};

/// Vertical value range mapped onto the canvas height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub min: f32,
    pub max: f32,
}

impl AxisBounds {
    pub fn new(min: f32, max: f32) -> Result<Self> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.max > self.min) || !self.min.is_finite() || !self.max.is_finite() {
            return Err(CoreError::invalid(format!(
                "axis bounds must satisfy min < max, got {}..{}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) / 2.0
    }
}

/// Monochrome bitmap, `true` marks a pixel covered by the data envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterCanvas {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl RasterCanvas {
    fn blank(width: usize, height: usize) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(CoreError::AllocationFailure { requested: usize::MAX })?;
        Ok(Self {
            width,
            height,
            pixels: try_zeroed(len)?,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the pixel at (x, y) is marked; out-of-range reads are unmarked
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x]
    }

    fn mark(&mut self, x: usize, y: usize) {
        self.pixels[y * self.width + x] = true;
    }

    /// First and last marked row of column `x`
    pub fn column_span(&self, x: usize) -> Option<(usize, usize)> {
        let first = (0..self.height).find(|&y| self.get(x, y))?;
        let last = (0..self.height).rev().find(|&y| self.get(x, y))?;
        Some((first, last))
    }

    /// Number of separate marked runs in column `x`
    pub fn column_runs(&self, x: usize) -> usize {
        (0..self.height)
            .filter(|&y| self.get(x, y) && (y == 0 || !self.get(x, y - 1)))
            .count()
    }

    pub fn marked_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    /// Render as text, one line per row, `mark` for marked pixels
    pub fn to_ascii(&self, mark: char) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(if self.get(x, y) { mark } else { ' ' });
            }
            if y + 1 < self.height {
                out.push('\n');
            }
        }
        out
    }
}

/// Rasterize `series` onto a `width` x `height` canvas
///
/// Row 0 is the top of the canvas and corresponds to `bounds.max`. Values
/// outside the bounds (including infinities) are clamped onto the edge rows;
/// NaN samples are ignored. When the series is shorter than the canvas is
/// wide, columns without samples stay blank.
pub fn rasterize(
    series: &[f32],
    width: usize,
    height: usize,
    bounds: AxisBounds,
) -> Result<RasterCanvas> {
    if series.is_empty() {
        return Err(CoreError::invalid("series is empty"));
    }
    if width == 0 || height == 0 {
        return Err(CoreError::invalid(format!(
            "canvas dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }
    bounds.validate()?;

    let mut column_min: Vec<f32> = try_zeroed(width)?;
    let mut column_max: Vec<f32> = try_zeroed(width)?;
    let mut column_used: Vec<bool> = try_zeroed(width)?;
    column_min.fill(bounds.max);
    column_max.fill(bounds.min);

    // floor(i * width / len) in integer arithmetic
    let length = series.len() as u64;
    for (i, &value) in series.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        let x = (i as u64 * width as u64 / length) as usize;

        column_used[x] = true;
        if value < column_min[x] {
            column_min[x] = value;
        }
        if value > column_max[x] {
            column_max[x] = value;
        }
    }

    let mut canvas = RasterCanvas::blank(width, height)?;
    let y_step = (height - 1) as f32 / (bounds.max - bounds.min);

    for x in 0..width {
        if !column_used[x] {
            continue;
        }

        let low = column_min[x].clamp(bounds.min, bounds.max);
        let high = column_max[x].clamp(bounds.min, bounds.max);

        let y_start = ((bounds.max - high) * y_step).round() as usize;
        let run_length = ((high - low) * y_step).round() as usize + 1;
        let y_end = (y_start + run_length).min(height);

        for y in y_start.min(height - 1)..y_end {
            canvas.mark(x, y);
        }
    }

    Ok(canvas)
}
