//! Repeating timer implementations for host builds and tests

use super::{RepeatingTimer, TickFn};
use crate::error::{CoreError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Timer backed by a dedicated thread
///
/// Ticks are scheduled against absolute deadlines so sleep jitter does not
/// accumulate. After a tick overruns, the next tick fires once and the
/// schedule resumes from there instead of catching up. `disarm` wakes the thread and joins it before returning.
pub struct ThreadTimer {
    name: String,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadTimer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl Default for ThreadTimer {
    fn default() -> Self {
        Self::new("dac_timer")
    }
}

impl RepeatingTimer for ThreadTimer {
    fn arm(&mut self, period: Duration, mut tick: TickFn) -> Result<()> {
        if period.is_zero() {
            return Err(CoreError::invalid("timer period must be non-zero"));
        }
        if self.is_armed() {
            return Err(CoreError::Timer(format!("{} is already armed", self.name)));
        }

        // Reap a thread that ended on its own
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                let mut deadline = Instant::now() + period;

                while running.load(Ordering::SeqCst) {
                    let now = Instant::now();
                    if now < deadline {
                        thread::park_timeout(deadline - now);
                        continue;
                    }

                    if tick().is_break() {
                        running.store(false, Ordering::SeqCst);
                        break;
                    }
                    // Deadlines missed during an overrun are dropped, not replayed
                    deadline = (deadline + period).max(Instant::now());
                }
            });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(CoreError::Timer(e.to_string()))
            }
        }
    }

    fn disarm(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }

    fn is_armed(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[derive(Default)]
struct ManualState {
    streams: Vec<TickFn>,
    period: Option<Duration>,
    arm_count: usize,
    peak_streams: usize,
}

/// Deterministic timer driven by explicit [`ManualTimer::fire`] calls
///
/// Clones share state, so a test can keep one handle while a scheduler owns
/// another. Arming while armed adds a second tick stream instead of failing,
/// which lets tests observe overlap through [`ManualTimer::peak_streams`].
#[derive(Clone, Default)]
pub struct ManualTimer {
    state: Arc<Mutex<ManualState>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one tick of every armed stream; returns the number of ticks run
    pub fn fire(&self) -> usize {
        let Ok(mut state) = self.state.lock() else {
            return 0;
        };

        let mut fired = 0;
        state.streams.retain_mut(|tick| {
            fired += 1;
            tick().is_continue()
        });
        if state.streams.is_empty() {
            state.period = None;
        }
        fired
    }

    /// Fire `count` times; returns the total number of ticks run
    pub fn fire_n(&self, count: usize) -> usize {
        (0..count).map(|_| self.fire()).sum()
    }

    /// Period of the most recent arm, while armed
    pub fn period(&self) -> Option<Duration> {
        self.state.lock().ok().and_then(|state| state.period)
    }

    pub fn arm_count(&self) -> usize {
        self.state.lock().map(|state| state.arm_count).unwrap_or(0)
    }

    /// Largest number of tick streams ever armed at once
    pub fn peak_streams(&self) -> usize {
        self.state.lock().map(|state| state.peak_streams).unwrap_or(0)
    }
}

impl RepeatingTimer for ManualTimer {
    fn arm(&mut self, period: Duration, tick: TickFn) -> Result<()> {
        if period.is_zero() {
            return Err(CoreError::invalid("timer period must be non-zero"));
        }
        let mut state = self
            .state
            .lock()
            .map_err(|_| CoreError::Timer("manual timer state poisoned".to_string()))?;

        state.streams.push(tick);
        state.period = Some(period);
        state.arm_count += 1;
        state.peak_streams = state.peak_streams.max(state.streams.len());
        Ok(())
    }

    fn disarm(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.streams.clear();
            state.period = None;
        }
    }

    fn is_armed(&self) -> bool {
        self.state
            .lock()
            .map(|state| !state.streams.is_empty())
            .unwrap_or(false)
    }
}
