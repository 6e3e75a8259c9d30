//! Frame scheduling.
//!
//! A [`FrameScheduler`] is the clock the render loop ticks on: each call to
//! [`next_frame`](FrameScheduler::next_frame) yields the timestamp of the next
//! frame, or `None` when the schedule is exhausted. [`ManualScheduler`] steps a
//! virtual clock for tests and offline rendering; [`IntervalScheduler`] paces
//! real time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default frame interval, 60 Hz.
pub const FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Identifier of a scheduled frame. Increases by one per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Frame number.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    /// The handle that follows this one.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Shared flag that stops a render loop for good.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel. Irreversible.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Source of frame timestamps.
pub trait FrameScheduler {
    /// Wait until the next frame is due and return its timestamp.
    /// `None` ends the loop.
    fn next_frame(&mut self) -> Option<Instant>;
}

/// Deterministic scheduler over a virtual clock.
///
/// Each frame advances the clock by a fixed step without sleeping.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    now: Instant,
    step: Duration,
    remaining: Option<u64>,
}

impl ManualScheduler {
    /// Unbounded schedule starting at `start`.
    pub fn new(start: Instant, step: Duration) -> Self {
        Self {
            now: start,
            step,
            remaining: None,
        }
    }

    /// Stop after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> Instant {
        self.now
    }
}

impl FrameScheduler for ManualScheduler {
    fn next_frame(&mut self) -> Option<Instant> {
        if let Some(remaining) = &mut self.remaining {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        self.now += self.step;
        Some(self.now)
    }
}

/// Real-time scheduler that sleeps to hold a fixed frame rate.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    interval: Duration,
    last: Option<Instant>,
    remaining: Option<u64>,
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            remaining: None,
        }
    }

    /// Stop after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL)
    }
}

impl FrameScheduler for IntervalScheduler {
    fn next_frame(&mut self) -> Option<Instant> {
        if let Some(remaining) = &mut self.remaining {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }

        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
        let now = Instant::now();
        self.last = Some(now);
        Some(now)
    }
}
