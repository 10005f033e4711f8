//! DAC output session management

use super::scaling::CodeScaler;
use super::{DacChannel, RepeatingTimer};
use crate::config::{DacConfig, RunMode};
use crate::error::{CoreError, Result};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::time::Duration;
use tracing::info;

/// Counters shared between the scheduler and the tick closure
#[derive(Default)]
struct SessionCounters {
    cursor: AtomicUsize,
    emitted: AtomicU64,
    skipped: AtomicU64,
    faulted: AtomicBool,
}

struct ActiveSession {
    period: Duration,
    sample_rate_hz: u32,
    counters: Arc<SessionCounters>,
}

/// Snapshot of the scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DacStatus {
    /// A session is armed and ticking
    pub running: bool,

    /// Samples written by the current (or last) session
    pub emitted: u64,

    /// Ticks whose write was dropped because the channel was busy
    pub skipped: u64,

    /// Index of the next sample to be written
    pub cursor: usize,

    /// Tick period of the current (or last) session
    pub period: Option<Duration>,

    /// The converter rejected a write and the session ended early
    pub faulted: bool,
}

/// Streams a sample buffer to a converter channel at a fixed rate
///
/// At most one session exists at a time; [`DacScheduler::start`] always
/// disarms the previous timer before arming a new one.
pub struct DacScheduler<T: RepeatingTimer, C: DacChannel> {
    timer: T,
    channel: Arc<Mutex<C>>,
    config: DacConfig,
    session: Option<ActiveSession>,
}

impl<T: RepeatingTimer, C: DacChannel> DacScheduler<T, C> {
    pub fn new(timer: T, channel: C, config: DacConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            timer,
            channel: Arc::new(Mutex::new(channel)),
            config,
            session: None,
        })
    }

    /// Start streaming `buffer` at `sample_rate_hz`
    ///
    /// # Arguments
    /// * `buffer` - Immutable samples; the session keeps its own reference
    /// * `sample_rate_hz` - Output rate, one tick per sample
    /// * `prevent_overflow` - Clamp samples into the converter range before scaling
    pub fn start(
        &mut self,
        buffer: Arc<[f32]>,
        sample_rate_hz: u32,
        prevent_overflow: bool,
    ) -> Result<()> {
        if sample_rate_hz == 0 {
            return Err(CoreError::invalid("sample rate must be non-zero"));
        }
        if buffer.is_empty() {
            return Err(CoreError::invalid("output buffer is empty"));
        }
        let period_us = 1_000_000 / u64::from(sample_rate_hz);
        if period_us == 0 {
            return Err(CoreError::invalid(format!(
                "sample rate {} Hz exceeds timer resolution",
                sample_rate_hz
            )));
        }
        let total = match self.config.run_mode {
            RunMode::Continuous => None,
            RunMode::SinglePass => Some(buffer.len() as u64),
            RunMode::Samples(0) => {
                return Err(CoreError::invalid("sample count must be non-zero"));
            }
            RunMode::Samples(n) => Some(n),
        };

        self.stop();

        let period = Duration::from_micros(period_us);
        let scaler = CodeScaler::from_config(&self.config, prevent_overflow);
        let counters = Arc::new(SessionCounters::default());
        let channel = Arc::clone(&self.channel);
        let length = buffer.len();

        let tick_counters = Arc::clone(&counters);
        let mut cursor = 0usize;
        let mut emitted = 0u64;
        let mut ticks = 0u64;

        let tick = Box::new(move || {
            let code = scaler.encode(buffer[cursor]);

            // Never wait for the channel: a busy channel costs this sample only
            match channel.try_lock() {
                Ok(mut dac) => {
                    if dac.write_code(code).is_err() {
                        tick_counters.faulted.store(true, Ordering::Release);
                        return ControlFlow::Break(());
                    }
                    emitted += 1;
                    tick_counters.emitted.store(emitted, Ordering::Release);
                }
                Err(TryLockError::WouldBlock) => {
                    tick_counters.skipped.fetch_add(1, Ordering::Relaxed);
                }
                Err(TryLockError::Poisoned(_)) => {
                    tick_counters.faulted.store(true, Ordering::Release);
                    return ControlFlow::Break(());
                }
            }
            ticks += 1;

            cursor = (cursor + 1) % length;
            tick_counters.cursor.store(cursor, Ordering::Release);

            match total {
                Some(total) if ticks >= total => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            }
        });

        self.timer.arm(period, tick)?;

        info!(
            "DAC session started: {} samples at {} Hz (period {} us, {:?}, clamp {})",
            length, sample_rate_hz, period_us, self.config.run_mode, prevent_overflow
        );

        self.session = Some(ActiveSession {
            period,
            sample_rate_hz,
            counters,
        });
        Ok(())
    }

    /// Disarm the timer; no tick runs after this returns
    ///
    /// Safe to call when no session is active.
    pub fn stop(&mut self) {
        let was_armed = self.timer.is_armed();
        self.timer.disarm();

        if let Some(session) = &self.session {
            let emitted = session.counters.emitted.load(Ordering::Acquire);
            if was_armed {
                info!("DAC session stopped after {} samples", emitted);
            } else {
                info!(
                    "DAC session at {} Hz had already completed ({} samples)",
                    session.sample_rate_hz, emitted
                );
            }
        }
        self.session = None;
    }

    /// True while the timer is delivering ticks
    pub fn is_running(&self) -> bool {
        self.session.is_some() && self.timer.is_armed()
    }

    pub fn status(&self) -> DacStatus {
        match &self.session {
            Some(session) => DacStatus {
                running: self.timer.is_armed(),
                emitted: session.counters.emitted.load(Ordering::Acquire),
                skipped: session.counters.skipped.load(Ordering::Acquire),
                cursor: session.counters.cursor.load(Ordering::Acquire),
                period: Some(session.period),
                faulted: session.counters.faulted.load(Ordering::Acquire),
            },
            None => DacStatus::default(),
        }
    }

    pub fn config(&self) -> &DacConfig {
        &self.config
    }

    /// Replace the converter settings; stops any running session
    pub fn set_config(&mut self, config: DacConfig) -> Result<()> {
        config.validate()?;
        self.stop();
        self.config = config;
        Ok(())
    }

    /// Run `f` with exclusive access to the converter channel
    ///
    /// Ticks landing while `f` runs skip their write rather than wait.
    pub fn with_channel<R>(&self, f: impl FnOnce(&mut C) -> R) -> Result<R> {
        let mut channel = self
            .channel
            .lock()
            .map_err(|_| CoreError::Timer("converter channel lock poisoned".to_string()))?;
        Ok(f(&mut channel))
    }
}

impl<T: RepeatingTimer, C: DacChannel> Drop for DacScheduler<T, C> {
    fn drop(&mut self) {
        self.timer.disarm();
    }
}
