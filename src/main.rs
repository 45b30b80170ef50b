//! Headless replay harness.
//!
//! Feeds a JSON script of native events and host prop updates through one
//! [`SyncController`] and prints every surface call and host callback as
//! one JSON object per line.

use anyhow::Context;
use clap::Parser;
use richsync::recording::{RecordingHost, RecordingSurface};
use richsync::{EngineConfig, EventOutcome, Format, HostProps, NativeEvent, Platform, SyncController};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "richsync-replay", about = "Replay a richsync event script", version)]
struct Cli {
    /// Script file (JSON)
    script: PathBuf,

    /// Renderer platform; overrides RICHSYNC_PLATFORM and the script config
    #[arg(short, long)]
    platform: Option<Platform>,

    /// Pretty-print each output object
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    config: Option<EngineConfig>,
    #[serde(default)]
    props: HostProps,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    Native(NativeEvent),
    Props(HostProps),
    InsertText(String),
    Paste {
        #[serde(default)]
        plain_text: String,
        #[serde(default)]
        html: Option<String>,
    },
    Key {
        key_code: u32,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        event_counter: Option<u64>,
    },
    ApplyFormat(Format),
    RemoveFormat(String),
    TickMs(u64),
}

#[derive(Serialize)]
struct Line<'a, T: Serialize> {
    step: usize,
    #[serde(flatten)]
    entry: &'a T,
}

#[derive(Serialize)]
struct OutcomeEntry {
    outcome: EventOutcome,
}

type Controller = SyncController<RecordingSurface, RecordingHost>;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("richsync=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn load_script(path: &PathBuf) -> anyhow::Result<Script> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid script {}", path.display()))
}

struct Printer<W: Write> {
    out: W,
    pretty: bool,
}

impl<W: Write> Printer<W> {
    fn emit<T: Serialize>(&mut self, step: usize, entry: &T) -> anyhow::Result<()> {
        let line = Line { step, entry };
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, &line)?;
        } else {
            serde_json::to_writer(&mut self.out, &line)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn drain(
        &mut self,
        step: usize,
        surface: &RecordingSurface,
        host: &RecordingHost,
    ) -> anyhow::Result<()> {
        for call in surface.take_calls() {
            self.emit(step, &call)?;
        }
        for call in host.take_calls() {
            self.emit(step, &call)?;
        }
        Ok(())
    }
}

/// Simulated time advanced only by `tick_ms` steps.
type SimClock = Rc<Cell<Instant>>;

/// Mounts a controller whose commit timestamps read the simulated clock.
fn mount_controller(
    surface: RecordingSurface,
    host: RecordingHost,
    config: EngineConfig,
    props: HostProps,
) -> (Controller, SimClock) {
    let clock = Rc::new(Cell::new(Instant::now()));
    let mut controller = SyncController::mount(surface, host, config, props);
    let reader = Rc::clone(&clock);
    controller.set_clock(move || reader.get());
    (controller, clock)
}

fn run_step(controller: &mut Controller, step: Step, clock: &SimClock) -> Option<EventOutcome> {
    match step {
        Step::Native(event) => Some(controller.handle_native_event(event)),
        Step::Props(props) => {
            controller.set_props(props);
            None
        }
        Step::InsertText(text) => Some(controller.insert_text(&text)),
        Step::Paste { plain_text, html } => Some(controller.on_paste(&plain_text, html, Vec::new())),
        Step::Key {
            key_code,
            shift,
            event_counter,
        } => Some(controller.on_key_down(key_code, shift, event_counter)),
        Step::ApplyFormat(format) => Some(controller.apply_format(format)),
        Step::RemoveFormat(format_type) => Some(controller.remove_format(&format_type)),
        Step::TickMs(ms) => {
            clock.set(clock.get() + Duration::from_millis(ms));
            controller.tick(clock.get());
            None
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let script = load_script(&cli.script)?;
    let mut config = script.config.unwrap_or_else(EngineConfig::from_env);
    if let Some(platform) = cli.platform {
        config.platform = platform;
    }
    tracing::debug!(platform = %config.platform, steps = script.steps.len(), "replaying script");

    let surface = RecordingSurface::new();
    let host = RecordingHost::new();
    let stdout = io::stdout();
    let mut printer = Printer {
        out: stdout.lock(),
        pretty: cli.pretty,
    };

    let (mut controller, clock) =
        mount_controller(surface.clone(), host.clone(), config, script.props);
    printer.drain(0, &surface, &host)?;

    let unmount_step = script.steps.len() + 1;
    for (index, step) in script.steps.into_iter().enumerate() {
        let step_no = index + 1;
        if let Some(outcome) = run_step(&mut controller, step, &clock) {
            printer.emit(step_no, &OutcomeEntry { outcome })?;
        }
        printer.drain(step_no, &surface, &host)?;
    }

    controller.unmount();
    printer.drain(unmount_step, &surface, &host)?;
    printer.out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests;
