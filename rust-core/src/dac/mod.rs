//! Periodic analog output through an 8-bit digital-to-analog converter
//!
//! A [`RepeatingTimer`] drives a tick closure at the output sample rate; every
//! tick converts one sample to a converter code and hands it to a
//! [`DacChannel`]. Ticks run in a time-critical context: they never allocate,
//! block on I/O or log.

pub mod scaling;
pub mod scheduler;
pub mod timer;
pub mod ring;
#[cfg(feature = "cpal")]
pub mod cpal_sink;

use crate::error::Result;
use std::ops::ControlFlow;
use std::time::Duration;

pub use scaling::CodeScaler;
pub use scheduler::{DacScheduler, DacStatus};
pub use timer::{ManualTimer, ThreadTimer};
pub use ring::{code_channel, CodeConsumer, RingDac};

/// Single converter channel accepting native 8-bit code words
pub trait DacChannel: Send + 'static {
    fn write_code(&mut self, code: u8) -> Result<()>;
}

/// One unit of periodic work; `Break` ends the tick stream from inside
pub type TickFn = Box<dyn FnMut() -> ControlFlow<()> + Send + 'static>;

/// Platform repeating timer
pub trait RepeatingTimer {
    /// Start invoking `tick` every `period`
    fn arm(&mut self, period: Duration, tick: TickFn) -> Result<()>;

    /// Stop invoking the tick; no tick runs after this returns
    fn disarm(&mut self);

    fn is_armed(&self) -> bool;
}
