//! The engine state machine.
//!
//! An [`Engine`] goes `Uninitialized → Running → Stopped`. [`Engine::init`]
//! takes ownership of the display surface and maps the message into
//! particles; every [`Engine::tick`] integrates and composites one frame.
//! A frame that fails or panics stops the engine for good.
//!
//! # Example
//!
//! ```ignore
//! use particle_text::prelude::*;
//!
//! let mut engine: Engine = Engine::new();
//! let now = Instant::now();
//! engine.init(Init::new(Surface::new(300, 150), Config::default()), now)?;
//!
//! engine.handle(Message::MouseEnter, now);
//! engine.handle(Message::MouseMove { x: 40.0, y: 60.0 }, now);
//! assert!(matches!(engine.tick(now), Tick::Rendered(_)));
//! ```

use crate::compositor;
use crate::config::{clamp_dimension, Settings};
use crate::error::{EngineError, FrameError, RenderError};
use crate::mapper;
use crate::physics;
use crate::protocol::{Init, Message};
use crate::scheduler::{CancellationToken, FrameHandle};
use crate::session::Session;
use crate::store::ParticleStore;
use crate::surface::{DisplaySurface, Surface};
use crate::time::Debouncer;
use log::{debug, error, info};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Quiet window that coalesces resize notifications.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(200);

/// Lifecycle of an engine. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Uninitialized,
    Running,
    Stopped,
}

/// Outcome of one [`Engine::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing to render yet.
    Idle,
    /// The given frame was rendered and the next one scheduled.
    Rendered(FrameHandle),
    /// The engine is stopped. No more frames will render.
    Halted,
}

/// Counters kept over the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    pub frames_rendered: u64,
    /// Particle populations derived, the initial one included.
    pub derivations: u64,
}

/// Particle text engine over a display surface `D`.
pub struct Engine<D: DisplaySurface = Surface> {
    state: EngineState,
    settings: Settings,
    session: Session,
    particles: ParticleStore,
    display: Option<D>,
    buffer: Surface,
    resize: Debouncer<(u32, u32)>,
    stats: EngineStats,
    started_at: Option<Instant>,
    last_error: Option<FrameError>,
}

impl<D: DisplaySurface> Engine<D> {
    pub fn new() -> Self {
        Self {
            state: EngineState::Uninitialized,
            settings: Settings::default(),
            session: Session::default(),
            particles: ParticleStore::default(),
            display: None,
            buffer: Surface::new(0, 0),
            resize: Debouncer::new(RESIZE_DEBOUNCE),
            stats: EngineStats::default(),
            started_at: None,
            last_error: None,
        }
    }

    /// Use a different resize debounce window.
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.resize = Debouncer::new(window);
        self
    }

    /// Take the display surface and configuration, derive the first particle
    /// population and schedule the first frame.
    pub fn init(&mut self, init: Init<D>, now: Instant) -> Result<(), EngineError> {
        if self.state != EngineState::Uninitialized {
            return Err(EngineError::AlreadyInitialized);
        }

        let Init { surface: mut display, config } = init;
        self.settings = config.resolve();
        let (width, height) = (self.settings.width, self.settings.height);

        display.resize(width, height);
        self.display = Some(display);
        self.buffer = Surface::new(width, height);
        // Pointer events may arrive before init.
        let pointer = *self.session.pointer();
        self.session = Session::new(self.settings.center()).with_pointer(pointer);
        self.derive();

        self.state = EngineState::Running;
        self.started_at = Some(now);
        self.session.schedule_frame();

        info!(
            "engine started: {}x{}, {} particles, font {}",
            width,
            height,
            self.particles.len(),
            self.settings.font_style()
        );
        Ok(())
    }

    /// Apply one inbound message. Pointer messages take effect immediately;
    /// resizes are debounced.
    pub fn handle(&mut self, message: Message, now: Instant) {
        if let Some(event) = message.pointer_event() {
            self.session.apply_pointer(event);
            return;
        }

        if let Message::Resize { width, height } = message {
            if self.state == EngineState::Uninitialized {
                debug!("resize to {width}x{height} before init ignored");
                return;
            }
            let dims = (clamp_dimension(width), clamp_dimension(height));
            if self.resize.push(dims, now) {
                debug!("resize coalesced, now {}x{}", dims.0, dims.1);
            }
        }
    }

    /// Run one frame if one is due.
    ///
    /// A pending resize whose window has elapsed is applied first, then the
    /// frame integrates and composites.
    pub fn tick(&mut self, now: Instant) -> Tick {
        if self.state == EngineState::Uninitialized {
            return Tick::Idle;
        }

        if let Some((width, height)) = self.resize.poll(now) {
            self.apply_resize(width, height);
        }

        if self.state == EngineState::Stopped {
            return Tick::Halted;
        }

        let frame = match self.session.scheduled_frame() {
            Some(frame) if !self.session.is_cancelled() => frame,
            _ => {
                self.session.cancel_frame();
                self.state = EngineState::Stopped;
                info!("engine cancelled after {} frames", self.stats.frames_rendered);
                return Tick::Halted;
            }
        };

        match panic::catch_unwind(AssertUnwindSafe(|| self.step_frame())) {
            Ok(Ok(())) => {
                self.stats.frames_rendered += 1;
                match self.session.schedule_frame() {
                    Some(_) => Tick::Rendered(frame),
                    None => {
                        self.state = EngineState::Stopped;
                        Tick::Halted
                    }
                }
            }
            Ok(Err(err)) => self.halt(err.into()),
            Err(payload) => self.halt(FrameError::Panicked(panic_message(&*payload))),
        }
    }

    fn step_frame(&mut self) -> Result<(), RenderError> {
        let Some(display) = self.display.as_mut() else {
            return Err(RenderError::SurfaceLost("no display surface".into()));
        };

        physics::integrate(&mut self.particles, &mut self.session, &self.settings);
        compositor::render_frame(
            display,
            &mut self.buffer,
            &self.particles,
            self.settings.font_color,
            self.settings.background_color,
            self.settings.glow,
        )
    }

    fn halt(&mut self, err: FrameError) -> Tick {
        self.session.cancel();
        self.state = EngineState::Stopped;
        error!("render loop halted after {} frames: {err}", self.stats.frames_rendered);
        self.last_error = Some(err);
        Tick::Halted
    }

    fn apply_resize(&mut self, width: u32, height: u32) {
        self.settings = self.settings.with_dimensions(width, height);
        if let Some(display) = self.display.as_mut() {
            display.resize(width, height);
        }
        self.buffer.resize(width, height);
        self.derive();
        info!("resized to {width}x{height}, {} particles", self.particles.len());
    }

    fn derive(&mut self) {
        self.particles = mapper::map_particles(&mut self.buffer, &self.settings);
        self.stats.derivations += 1;
    }

    // ========== Accessors ==========

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Settings in effect. Defaults until [`init`](Self::init).
    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[inline]
    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    /// The display surface, once initialized.
    #[inline]
    pub fn display(&self) -> Option<&D> {
        self.display.as_ref()
    }

    /// The offscreen particle mask from the last frame.
    #[inline]
    pub fn working_buffer(&self) -> &Surface {
        &self.buffer
    }

    #[inline]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// When [`init`](Self::init) succeeded.
    #[inline]
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Whether a resize is waiting out its debounce window.
    #[inline]
    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    /// The error that stopped the engine, if any.
    #[inline]
    pub fn last_error(&self) -> Option<&FrameError> {
        self.last_error.as_ref()
    }

    /// Token that cancels the render loop when triggered.
    pub fn cancellation(&self) -> CancellationToken {
        self.session.cancellation()
    }

    /// Give the display surface back.
    pub fn into_display(self) -> Option<D> {
        self.display
    }
}

impl<D: DisplaySurface> Default for Engine<D> {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn config(message: &str, width: f64, height: f64) -> Config {
        Config { message: message.into(), width, height, ..Default::default() }
    }

    fn running(message: &str) -> (Engine, Instant) {
        let now = Instant::now();
        let mut engine: Engine = Engine::new();
        engine.init(Init::new(Surface::new(1, 1), config(message, 120.0, 60.0)), now).unwrap();
        (engine, now)
    }

    #[test]
    fn test_idle_before_init() {
        let mut engine: Engine = Engine::new();
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert_eq!(engine.tick(Instant::now()), Tick::Idle);
        assert!(engine.display().is_none());
    }

    #[test]
    fn test_init_sizes_surfaces_and_maps() {
        let (engine, now) = running("HI");
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.display().unwrap().dimensions(), (120, 60));
        assert_eq!(engine.working_buffer().dimensions(), (120, 60));
        assert!(!engine.particles().is_empty());
        assert_eq!(engine.stats().derivations, 1);
        assert_eq!(engine.started_at(), Some(now));
        assert_eq!(engine.session().repel_target(), engine.settings().center());
    }

    #[test]
    fn test_second_init_rejected() {
        let (mut engine, now) = running("HI");
        let err = engine.init(Init::new(Surface::new(5, 5), config("OTHER", 10.0, 10.0)), now);
        assert!(matches!(err, Err(EngineError::AlreadyInitialized)));
        assert_eq!(engine.settings().message, "HI");
    }

    #[test]
    fn test_ticks_render_consecutive_frames() {
        let (mut engine, now) = running("HI");
        assert_eq!(engine.tick(now), Tick::Rendered(FrameHandle::default()));
        assert_eq!(engine.tick(now), Tick::Rendered(FrameHandle::default().next()));
        assert_eq!(engine.stats().frames_rendered, 2);
    }

    #[test]
    fn test_resize_before_init_ignored() {
        let mut engine: Engine = Engine::new();
        let now = Instant::now();
        engine.handle(Message::Resize { width: 50.0, height: 50.0 }, now);
        assert!(!engine.resize_pending());
    }

    #[test]
    fn test_external_cancellation_halts() {
        let (mut engine, now) = running("HI");
        engine.cancellation().cancel();
        assert_eq!(engine.tick(now), Tick::Halted);
        assert_eq!(engine.state(), EngineState::Stopped);
        assert!(engine.last_error().is_none());
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42u8), "unknown panic payload");
    }
}
