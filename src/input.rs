//! Pointer input state.
//!
//! The host captures pointer events and translates them into surface
//! coordinates; the engine only keeps the last known position and whether the
//! pointer is over the surface.
//!
//! ```ignore
//! let mut pointer = Pointer::default();
//! pointer.apply(PointerEvent::Enter);
//! pointer.apply(PointerEvent::Move { x: 10.0, y: 10.0 });
//! assert!(pointer.is_hovering());
//! ```

use glam::Vec2;

/// A pointer notification from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved to surface coordinates `(x, y)`.
    Move { x: f32, y: f32 },
    /// Pointer entered the surface.
    Enter,
    /// Pointer left the surface.
    Leave,
}

/// Last known pointer state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    position: Vec2,
    hover: bool,
}

impl Pointer {
    /// Apply one event. Moves are recorded even while not hovering; a move
    /// to a non-finite position is dropped.
    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Move { x, y } => {
                let position = Vec2::new(x, y);
                if position.is_finite() {
                    self.position = position;
                } else {
                    log::debug!("ignoring pointer move to ({x}, {y})");
                }
            }
            PointerEvent::Enter => self.hover = true,
            PointerEvent::Leave => self.hover = false,
        }
    }

    /// Last reported position, or the origin if none yet.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether the pointer is over the surface.
    #[inline]
    pub fn is_hovering(&self) -> bool {
        self.hover
    }
}
