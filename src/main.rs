//! Command-line demo: render a message as particles, play a scripted pointer
//! sweep across it, and save the last frame as a PNG.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use log::info;
use particle_text::prelude::*;
use particle_text::{RunOutcome, RunReport};
use std::path::PathBuf;
use std::sync::mpsc::{self, SyncSender};
use std::thread;

#[derive(Parser, Debug)]
#[command(name = "particle-text", version, about = "Render text as interactive particles")]
struct Cli {
    /// JSON configuration file (camelCase keys, all optional)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Message to render
    #[arg(short, long)]
    message: Option<String>,

    /// Surface width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Surface height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Particle density, 1 (sparse) to 4 (every lit pixel)
    #[arg(short, long)]
    density: Option<u8>,

    /// Disable the glow pass
    #[arg(long)]
    no_glow: bool,

    /// Sample filled glyphs instead of outlines
    #[arg(long)]
    fill: bool,

    /// Number of frames to render
    #[arg(short, long, default_value_t = 120)]
    frames: u64,

    /// Pace frames at 60 Hz instead of rendering as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Where to save the final frame
    #[arg(short, long, default_value = "particle-text.png")]
    output: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Config::from_json(&json).with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => Config::default(),
        };

        if let Some(message) = &self.message {
            config.message = message.clone();
        }
        if let Some(width) = self.width {
            config.width = width as f64;
        }
        if let Some(height) = self.height {
            config.height = height as f64;
        }
        if let Some(density) = self.density {
            config.density = density as f64;
        }
        if self.no_glow {
            config.glow = false;
        }
        if self.fill {
            config.draw_type = "fill".into();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = cli.load_config()?;
    let start = Instant::now();

    let mut engine: Engine = Engine::new();
    engine.init(Init::new(Surface::new(1, 1), config), start)?;
    let (width, height) = (engine.settings().width, engine.settings().height);
    info!("{} particles on a {width}x{height} surface", engine.particles().len());

    // Rendezvous channel: the script advances as fast as frames consume it.
    let (tx, rx) = mpsc::sync_channel(0);
    let sweep_steps = (cli.frames * 3 / 5).max(1);
    let pace = cli.realtime.then_some(FRAME_INTERVAL);
    let producer = thread::spawn(move || pointer_script(tx, width as f64, height as f64, sweep_steps, pace));

    let report = if cli.realtime {
        let mut scheduler = IntervalScheduler::default().with_frame_limit(cli.frames);
        run(&mut engine, &mut scheduler, &rx)
    } else {
        let mut scheduler = ManualScheduler::new(start, FRAME_INTERVAL).with_frame_limit(cli.frames);
        run(&mut engine, &mut scheduler, &rx)
    };

    // Unblocks the producer if the script outlived the run.
    drop(rx);
    if producer.join().is_err() {
        log::warn!("pointer script thread panicked");
    }

    summarize(&report);
    if report.outcome == RunOutcome::Halted {
        if let Some(err) = engine.last_error() {
            bail!("render loop stopped: {err}");
        }
    }

    let display = engine.into_display().context("engine has no display surface")?;
    display
        .into_image()
        .save(&cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    println!("Saved {}", cli.output.display());
    Ok(())
}

/// Enter, sweep left to right through the middle of the surface, leave.
fn pointer_script(tx: SyncSender<Message>, width: f64, height: f64, steps: u64, pace: Option<Duration>) {
    let y = height / 2.0;
    let moves = (0..=steps).map(|i| Message::MouseMove {
        x: width * i as f64 / steps as f64,
        y,
    });
    let script = std::iter::once(Message::MouseEnter)
        .chain(moves)
        .chain(std::iter::once(Message::MouseLeave));

    for message in script {
        if tx.send(message).is_err() {
            return;
        }
        if let Some(pace) = pace {
            thread::sleep(pace);
        }
    }
}

fn summarize(report: &RunReport) {
    println!(
        "Rendered {} frames ({} input messages, {:.1} fps)",
        report.frames, report.messages, report.fps
    );
}
