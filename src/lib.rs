//! # particle-text
//!
//! Text rendered as a field of particles that scatter away from the pointer
//! and spring back into place, with an optional neon glow.
//!
//! The engine rasterizes a message into an offscreen buffer, turns lit pixels
//! into particles, and every frame integrates them against a smoothed
//! repulsion target before compositing them onto a display surface.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_text::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let start = Instant::now();
//!     let config = Config {
//!         message: "HELLO".into(),
//!         width: 320.0,
//!         height: 120.0,
//!         ..Default::default()
//!     };
//!
//!     let mut engine: Engine = Engine::new();
//!     engine.init(Init::new(Surface::new(320, 120), config), start)?;
//!
//!     let (tx, rx) = std::sync::mpsc::channel();
//!     tx.send(Message::MouseEnter).ok();
//!     tx.send(Message::MouseMove { x: 160.0, y: 60.0 }).ok();
//!
//!     let mut scheduler = ManualScheduler::new(start, FRAME_INTERVAL).with_frame_limit(60);
//!     run(&mut engine, &mut scheduler, &rx);
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! Each [`Particle`] is six floats: position, velocity and origin. They live
//! back to back in a [`ParticleStore`] that is replaced wholesale whenever the
//! surface size changes.
//!
//! ### Frames
//!
//! One frame is:
//!
//! 1. Ease the repulsion target toward the pointer, or the center when the
//!    pointer is away ([`physics::update_target`]).
//! 2. Step every particle ([`physics::step_particle`]).
//! 3. Paint particles into the working buffer and draw it onto the display,
//!    twice with glow ([`compositor::render_frame`]).
//!
//! ### Inputs
//!
//! Hosts send [`Message`]s. Pointer messages apply immediately; resizes are
//! debounced and trigger a fresh particle mapping once they settle.
//!
//! ### Failure
//!
//! A frame that returns an error or panics stops the engine. There is no
//! retry; the error is logged and kept in [`Engine::last_error`].

pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod mapper;
pub mod physics;
pub mod protocol;
pub mod runner;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod surface;
pub mod text;
pub mod time;

pub use bytemuck;
pub use config::{Config, DrawType, Settings, TextAlign, TextBaseline};
pub use engine::{Engine, EngineState, EngineStats, Tick, RESIZE_DEBOUNCE};
pub use error::{ConfigError, EngineError, FrameError, ProtocolError, RenderError};
pub use glam::Vec2;
pub use image::Rgba;
pub use protocol::{Init, InitPayload, Message};
pub use runner::{run, RunOutcome, RunReport};
pub use scheduler::{CancellationToken, FrameHandle, FrameScheduler, IntervalScheduler, ManualScheduler};
pub use session::Session;
pub use store::{Particle, ParticleStore};
pub use surface::{CompositeMode, DisplaySurface, Filter, Surface};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use particle_text::prelude::*;
/// ```
///
/// This imports:
/// - [`Engine`] and its [`Tick`] and [`EngineState`]
/// - [`Config`] and [`Settings`]
/// - [`Message`] and [`Init`]
/// - [`Surface`] and the [`DisplaySurface`] trait
/// - the schedulers and [`run`]
/// - [`Vec2`], [`Rgba`] and [`Instant`](std::time::Instant)
pub mod prelude {
    pub use crate::config::{Config, DrawType, Settings, TextAlign, TextBaseline};
    pub use crate::engine::{Engine, EngineState, Tick, RESIZE_DEBOUNCE};
    pub use crate::error::{EngineError, FrameError, RenderError};
    pub use crate::protocol::{Init, Message};
    pub use crate::runner::run;
    pub use crate::scheduler::{FrameScheduler, IntervalScheduler, ManualScheduler, FRAME_INTERVAL};
    pub use crate::store::{Particle, ParticleStore};
    pub use crate::surface::{DisplaySurface, Surface};
    pub use glam::Vec2;
    pub use image::Rgba;
    pub use std::time::{Duration, Instant};
}
