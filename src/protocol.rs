//! Inbound messages.
//!
//! Hosts talk to the engine with small JSON messages tagged by `type`:
//!
//! ```json
//! {"type": "resize", "width": 640, "height": 480}
//! {"type": "mousemove", "x": 12.5, "y": 40}
//! {"type": "mouseenter"}
//! {"type": "mouseleave"}
//! ```
//!
//! The one-time startup handoff is [`Init`], which carries the display surface
//! along with the [`Config`]. Only the config half has a JSON form
//! ([`InitPayload`]); the surface moves in as a value.

use crate::config::Config;
use crate::error::ProtocolError;
use crate::input::PointerEvent;
use serde::{Deserialize, Serialize};

/// Largest pointer coordinate magnitude passed on to the engine.
pub const POINTER_LIMIT: f64 = 1.0e6;

/// A control message applied between frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// New surface dimensions. Debounced.
    Resize { width: f64, height: f64 },
    /// Pointer moved, in surface coordinates.
    MouseMove { x: f64, y: f64 },
    MouseEnter,
    MouseLeave,
}

impl Message {
    /// Decode one message.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The pointer event this message carries, if any.
    ///
    /// Move coordinates are clamped to [`POINTER_LIMIT`]; a NaN coordinate
    /// yields no event.
    pub fn pointer_event(&self) -> Option<PointerEvent> {
        match *self {
            Message::MouseMove { x, y } => {
                if x.is_nan() || y.is_nan() {
                    return None;
                }
                Some(PointerEvent::Move {
                    x: x.clamp(-POINTER_LIMIT, POINTER_LIMIT) as f32,
                    y: y.clamp(-POINTER_LIMIT, POINTER_LIMIT) as f32,
                })
            }
            Message::MouseEnter => Some(PointerEvent::Enter),
            Message::MouseLeave => Some(PointerEvent::Leave),
            Message::Resize { .. } => None,
        }
    }
}

/// Startup handoff: the display surface and the initial configuration.
#[derive(Debug)]
pub struct Init<D> {
    pub surface: D,
    pub config: Config,
}

impl<D> Init<D> {
    pub fn new(surface: D, config: Config) -> Self {
        Self { surface, config }
    }
}

/// JSON form of the configuration half of [`Init`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitPayload {
    pub config: Config,
}

impl InitPayload {
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pair the parsed config with a surface.
    pub fn with_surface<D>(self, surface: D) -> Init<D> {
        Init::new(surface, self.config)
    }
}
