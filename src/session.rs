//! Per-session simulation state.

use crate::input::{Pointer, PointerEvent};
use crate::scheduler::{CancellationToken, FrameHandle};
use glam::Vec2;

/// State that lives for the whole session and persists across frames.
///
/// Holds the pointer, the smoothed repulsion target, the handle of the
/// currently scheduled frame, and the loop's cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pointer: Pointer,
    repel_target: Vec2,
    frame: Option<FrameHandle>,
    last_frame: Option<FrameHandle>,
    cancel: CancellationToken,
}

impl Session {
    /// Fresh session with the repulsion target at `center`.
    pub fn new(center: Vec2) -> Self {
        Self {
            repel_target: center,
            ..Default::default()
        }
    }

    /// Start from an existing pointer state.
    pub fn with_pointer(mut self, pointer: Pointer) -> Self {
        self.pointer = pointer;
        self
    }

    /// Apply a pointer event.
    #[inline]
    pub fn apply_pointer(&mut self, event: PointerEvent) {
        self.pointer.apply(event);
    }

    #[inline]
    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    /// Current repulsion target.
    #[inline]
    pub fn repel_target(&self) -> Vec2 {
        self.repel_target
    }

    pub fn set_repel_target(&mut self, target: Vec2) {
        self.repel_target = target;
    }

    /// Schedule the next frame and return its handle.
    ///
    /// Returns `None` once the session is cancelled.
    pub fn schedule_frame(&mut self) -> Option<FrameHandle> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let next = self.last_frame.map_or(FrameHandle::default(), FrameHandle::next);
        self.frame = Some(next);
        self.last_frame = Some(next);
        Some(next)
    }

    /// Drop the pending frame, if any.
    pub fn cancel_frame(&mut self) -> Option<FrameHandle> {
        self.frame.take()
    }

    /// Handle of the frame currently scheduled.
    #[inline]
    pub fn scheduled_frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    /// Cancel the session for good, dropping any pending frame.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.frame = None;
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token shared with whoever drives the loop.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_targets_center() {
        let s = Session::new(Vec2::new(150.0, 75.0));
        assert_eq!(s.repel_target(), Vec2::new(150.0, 75.0));
        assert_eq!(s.pointer().position(), Vec2::ZERO);
        assert!(!s.pointer().is_hovering());
        assert!(s.scheduled_frame().is_none());
    }

    #[test]
    fn test_with_pointer_keeps_hover_and_position() {
        let mut pointer = Pointer::default();
        pointer.apply(PointerEvent::Enter);
        pointer.apply(PointerEvent::Move { x: 3.0, y: 4.0 });

        let s = Session::new(Vec2::new(50.0, 25.0)).with_pointer(pointer);
        assert_eq!(*s.pointer(), pointer);
        assert_eq!(s.repel_target(), Vec2::new(50.0, 25.0));
    }

    #[test]
    fn test_frame_handles_increase() {
        let mut s = Session::default();
        let a = s.schedule_frame().unwrap();
        let b = s.schedule_frame().unwrap();
        assert_eq!(a.get(), 0);
        assert_eq!(b.get(), 1);
        assert_eq!(s.cancel_frame(), Some(b));
        assert_eq!(s.schedule_frame().unwrap().get(), 2);
    }

    #[test]
    fn test_cancel_stops_scheduling() {
        let mut s = Session::default();
        let token = s.cancellation();
        s.schedule_frame();
        s.cancel();

        assert!(token.is_cancelled());
        assert!(s.scheduled_frame().is_none());
        assert!(s.schedule_frame().is_none());
    }

    #[test]
    fn test_external_cancellation() {
        let mut s = Session::default();
        s.cancellation().cancel();
        assert!(s.is_cancelled());
        assert!(s.schedule_frame().is_none());
    }

    #[test]
    fn test_pointer_events() {
        let mut s = Session::default();
        s.apply_pointer(PointerEvent::Enter);
        s.apply_pointer(PointerEvent::Move { x: 3.0, y: 4.0 });
        assert!(s.pointer().is_hovering());
        assert_eq!(s.pointer().position(), Vec2::new(3.0, 4.0));
    }
}
