//! Frame timing and resize debouncing.
//!
//! Both types take the current [`Instant`] as an argument instead of reading
//! the clock, so a virtual clock drives them as easily as a real one.
//!
//! # Example
//!
//! ```ignore
//! use particle_text::time::{Debouncer, FrameTimer};
//!
//! let start = Instant::now();
//! let mut timer = FrameTimer::new(start);
//! timer.update(start + Duration::from_millis(16));
//! println!("Frame: {}", timer.frame());
//!
//! let mut resize = Debouncer::new(Duration::from_millis(200));
//! resize.push((640, 480), start);
//! assert_eq!(resize.poll(start + Duration::from_millis(250)), Some((640, 480)));
//! ```

use std::time::{Duration, Instant};

/// Default quiet window for coalescing resize notifications.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// Frame counter with periodic FPS calculation.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    /// When the timer was created.
    start: Instant,
    /// When the last frame occurred.
    last_frame: Instant,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl FrameTimer {
    /// Create a new timer starting at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Record one frame at `now`.
    ///
    /// Returns `true` when the FPS figure was refreshed by this call.
    pub fn update(&mut self, now: Instant) -> bool {
        self.delta_secs = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            return true;
        }
        false
    }

    /// Seconds between the two most recent frames.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames recorded.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last update interval.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Time from start to the most recent frame.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.last_frame.saturating_duration_since(self.start)
    }
}

/// Coalesces bursts of values into the last one, released after a quiet window.
///
/// Every [`push`](Self::push) restarts the window. [`poll`](Self::poll) hands
/// out the pending value once no push has arrived for a full window.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
    coalesced: u64,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            coalesced: 0,
        }
    }

    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Queue `value`, replacing any pending one, and restart the window.
    ///
    /// Returns `true` if a pending value was replaced.
    pub fn push(&mut self, value: T, now: Instant) -> bool {
        let replaced = self.pending.replace((value, now + self.window)).is_some();
        if replaced {
            self.coalesced += 1;
        }
        replaced
    }

    /// Take the pending value if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of values overwritten before they were released.
    #[inline]
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_timer_new() {
        let t = FrameTimer::new(Instant::now());
        assert_eq!(t.frame(), 0);
        assert_eq!(t.fps(), 0.0);
        assert_eq!(t.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_timer_update() {
        let start = Instant::now();
        let mut t = FrameTimer::new(start);
        assert!(!t.update(start + MS * 10));

        assert_eq!(t.frame(), 1);
        assert!((t.delta() - 0.010).abs() < 1e-4);
        assert_eq!(t.elapsed(), MS * 10);
    }

    #[test]
    fn test_timer_fps() {
        let start = Instant::now();
        let mut t = FrameTimer::new(start);
        let mut refreshed = false;
        for i in 1..=30 {
            refreshed |= t.update(start + MS * (i * 20));
        }
        // 25 frames in the first 500ms.
        assert!(refreshed);
        assert!((t.fps() - 50.0).abs() < 0.5);
    }

    #[test]
    fn test_debounce_coalesces_burst() {
        let start = Instant::now();
        let mut d = Debouncer::new(MS * 200);

        assert!(!d.push(1, start));
        assert!(d.push(2, start + MS * 20));
        assert!(d.push(3, start + MS * 40));
        assert_eq!(d.coalesced(), 2);

        // Window restarts at the last push.
        assert_eq!(d.poll(start + MS * 210), None);
        assert_eq!(d.deadline(), Some(start + MS * 240));
        assert_eq!(d.poll(start + MS * 240), Some(3));
        assert!(!d.is_pending());
        assert_eq!(d.poll(start + MS * 1000), None);
    }

    #[test]
    fn test_debounce_separate_bursts() {
        let start = Instant::now();
        let mut d = Debouncer::default();
        assert_eq!(d.window(), DEBOUNCE_WINDOW);

        d.push("a", start);
        assert_eq!(d.poll(start + MS * 300), Some("a"));
        d.push("b", start + MS * 400);
        assert_eq!(d.poll(start + MS * 500), None);
        assert_eq!(d.poll(start + MS * 600), Some("b"));
    }
}
