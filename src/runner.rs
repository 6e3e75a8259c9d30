//! Render loop driver.
//!
//! Couples an [`Engine`] to a [`FrameScheduler`] and an input channel. Each
//! frame drains every queued message in arrival order, then ticks the engine,
//! so a frame always sees the latest input.

use crate::engine::{Engine, Tick};
use crate::protocol::Message;
use crate::scheduler::FrameScheduler;
use crate::surface::DisplaySurface;
use crate::time::FrameTimer;
use log::debug;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The scheduler stopped yielding frames.
    Exhausted,
    /// The engine stopped.
    Halted,
}

/// Summary of one [`run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Frames the engine actually rendered.
    pub frames: u64,
    /// Messages applied.
    pub messages: u64,
    /// Last measured frame rate.
    pub fps: f32,
}

/// Drive `engine` until the scheduler is exhausted or the engine halts.
///
/// A disconnected inbox does not end the loop.
pub fn run<D, S>(engine: &mut Engine<D>, scheduler: &mut S, inbox: &Receiver<Message>) -> RunReport
where
    D: DisplaySurface,
    S: FrameScheduler + ?Sized,
{
    let mut timer: Option<FrameTimer> = None;
    let mut frames = 0;
    let mut messages = 0;
    let mut inbox_open = true;

    let outcome = loop {
        let Some(now) = scheduler.next_frame() else {
            break RunOutcome::Exhausted;
        };

        if inbox_open {
            messages += drain(engine, inbox, now, &mut inbox_open);
        }

        match engine.tick(now) {
            Tick::Rendered(_) => frames += 1,
            Tick::Idle => {}
            Tick::Halted => break RunOutcome::Halted,
        }

        let timer = timer.get_or_insert_with(|| FrameTimer::new(now));
        if timer.update(now) {
            debug!("{:.1} fps ({} frames)", timer.fps(), timer.frame());
        }
    };

    RunReport {
        outcome,
        frames,
        messages,
        fps: timer.map_or(0.0, |t| t.fps()),
    }
}

fn drain<D: DisplaySurface>(engine: &mut Engine<D>, inbox: &Receiver<Message>, now: Instant, open: &mut bool) -> u64 {
    let mut applied = 0;
    loop {
        match inbox.try_recv() {
            Ok(message) => {
                engine.handle(message, now);
                applied += 1;
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                debug!("input channel closed");
                *open = false;
                break;
            }
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::protocol::Init;
    use crate::scheduler::ManualScheduler;
    use crate::surface::Surface;
    use std::sync::mpsc;
    use std::time::Duration;

    fn engine(start: Instant) -> Engine {
        let mut engine: Engine = Engine::new();
        let config = Config { message: "RUN".into(), width: 120.0, height: 60.0, ..Default::default() };
        engine.init(Init::new(Surface::new(120, 60), config), start).unwrap();
        engine
    }

    #[test]
    fn test_runs_until_scheduler_exhausted() {
        let start = Instant::now();
        let mut engine = engine(start);
        let mut scheduler = ManualScheduler::new(start, Duration::from_millis(16)).with_frame_limit(10);
        let (tx, rx) = mpsc::channel();
        drop(tx);

        let report = run(&mut engine, &mut scheduler, &rx);
        assert_eq!(report.outcome, RunOutcome::Exhausted);
        assert_eq!(report.frames, 10);
        assert_eq!(engine.stats().frames_rendered, 10);
    }

    #[test]
    fn test_messages_applied_before_frame() {
        let start = Instant::now();
        let mut engine = engine(start);
        let mut scheduler = ManualScheduler::new(start, Duration::from_millis(16)).with_frame_limit(1);
        let (tx, rx) = mpsc::channel();
        tx.send(Message::MouseEnter).unwrap();
        tx.send(Message::MouseMove { x: 10.0, y: 10.0 }).unwrap();

        let center = engine.settings().center();
        let report = run(&mut engine, &mut scheduler, &rx);
        assert_eq!(report.messages, 2);
        assert!(engine.session().pointer().is_hovering());

        // The single frame already eased the target toward the pointer.
        let target = engine.session().repel_target();
        assert!(target.distance(glam::Vec2::new(10.0, 10.0)) < center.distance(glam::Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn test_stops_when_engine_halts() {
        let start = Instant::now();
        let mut engine = engine(start);
        engine.cancellation().cancel();
        let mut scheduler = ManualScheduler::new(start, Duration::from_millis(16)).with_frame_limit(10);
        let (_tx, rx) = mpsc::channel();

        let report = run(&mut engine, &mut scheduler, &rx);
        assert_eq!(report.outcome, RunOutcome::Halted);
        assert_eq!(report.frames, 0);
    }
}
