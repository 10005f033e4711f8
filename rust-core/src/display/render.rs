//! Drawing rasterized plots and axis labels onto a monochrome display

use super::raster::{rasterize, AxisBounds, RasterCanvas};
use crate::config::DisplayConfig;
use crate::error::{CoreError, Result};
use embedded_graphics::mono_font::ascii::FONT_4X6;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use std::fmt::Debug;

fn display_error<E: Debug>(error: E) -> CoreError {
    CoreError::Display(format!("{:?}", error))
}

/// Physical color of a marked pixel
fn lit_color(invert: bool) -> BinaryColor {
    if invert {
        BinaryColor::Off
    } else {
        BinaryColor::On
    }
}

/// Canvas size for a target, in pixels
fn target_dimensions<D: OriginDimensions>(target: &D) -> (usize, usize) {
    let size = target.size();
    (size.width as usize, size.height as usize)
}

/// Write every canvas pixel onto `target`
///
/// With `invert` set, marked pixels are written as `Off` and the background as
/// `On`, for panels that light a pixel on a 0 bit.
pub fn blit<D>(canvas: &RasterCanvas, target: &mut D, invert: bool) -> Result<()>
where
    D: DrawTarget<Color = BinaryColor>,
    D::Error: Debug,
{
    let (width, height) = (canvas.width(), canvas.height());
    let pixels = (0..height).flat_map(move |y| {
        (0..width).map(move |x| {
            let color = if canvas.get(x, y) {
                lit_color(invert)
            } else {
                lit_color(!invert)
            };
            Pixel(Point::new(x as i32, y as i32), color)
        })
    });

    target.draw_iter(pixels).map_err(display_error)
}

/// Frequency in Hz as a short label ("0", "250", "1.5k")
pub fn format_hz(frequency: f32) -> String {
    if frequency >= 1000.0 {
        format!("{:.1}k", frequency / 1000.0)
    } else {
        format!("{:.0}", frequency)
    }
}

/// Draw frequency ticks (0, fs/4, fs/2) along the bottom edge and magnitude
/// ticks (max, mid) along the right edge
pub fn draw_frequency_labels<D>(
    target: &mut D,
    sample_rate: u32,
    bounds: AxisBounds,
    invert: bool,
) -> Result<()>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    D::Error: Debug,
{
    let (width, height) = target_dimensions(target);
    if width == 0 || height == 0 {
        return Err(CoreError::invalid("display has no pixels"));
    }

    let style = MonoTextStyle::new(&FONT_4X6, lit_color(invert));
    let right = width as i32 - 1;
    let bottom = height as i32 - 1;
    let nyquist = sample_rate as f32 / 2.0;

    let frequency_ticks = [
        (0.0, 0, Alignment::Left),
        (nyquist / 2.0, right / 2, Alignment::Center),
        (nyquist, right, Alignment::Right),
    ];
    for (frequency, x, alignment) in frequency_ticks {
        let text_style = TextStyleBuilder::new()
            .alignment(alignment)
            .baseline(Baseline::Bottom)
            .build();
        Text::with_text_style(&format_hz(frequency), Point::new(x, bottom), style, text_style)
            .draw(target)
            .map_err(display_error)?;
    }

    let magnitude_ticks = [
        (bounds.max, 0, Baseline::Top),
        (bounds.midpoint(), bottom / 2, Baseline::Middle),
    ];
    for (value, y, baseline) in magnitude_ticks {
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Right)
            .baseline(baseline)
            .build();
        Text::with_text_style(&format!("{:.0}", value), Point::new(right, y), style, text_style)
            .draw(target)
            .map_err(display_error)?;
    }

    Ok(())
}

/// Plot a log-magnitude spectrum across the whole display, with labels if enabled
pub fn render_spectrum<D>(
    target: &mut D,
    log_magnitude: &[f32],
    sample_rate: u32,
    bounds: AxisBounds,
    config: &DisplayConfig,
) -> Result<RasterCanvas>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    D::Error: Debug,
{
    let (width, height) = target_dimensions(target);
    let canvas = rasterize(log_magnitude, width, height, bounds)?;
    blit(&canvas, target, config.invert)?;

    if config.labels {
        draw_frequency_labels(target, sample_rate, bounds, config.invert)?;
    }

    Ok(canvas)
}

/// Plot time-domain samples across the whole display
pub fn render_waveform<D>(
    target: &mut D,
    samples: &[f32],
    bounds: AxisBounds,
    config: &DisplayConfig,
) -> Result<RasterCanvas>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    D::Error: Debug,
{
    let (width, height) = target_dimensions(target);
    let canvas = rasterize(samples, width, height, bounds)?;
    blit(&canvas, target, config.invert)?;
    Ok(canvas)
}
