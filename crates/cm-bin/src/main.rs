//! cm entrypoint: startup, logging, the input loop, and shutdown.
//!
//! Startup order matters: config first (colors feed everything),
//! logging to a file (the terminal belongs to the editor), project
//! discovery, then the terminal guard and the bridge worker. The loop
//! polls input with a short timeout; on idle it services at most one
//! bridge request before the next read, which keeps user and agent
//! edits in one total order.

use anyhow::Result;
use clap::Parser;
use cm_bridge::BridgeConfig;
use cm_config::ProgramDefaults;
use cm_editor::{LoopStatus, Project, ScreenEditor};
use cm_terminal::{CrosstermBackend, TerminalBackend};
use cm_view::Writer;
use crossterm::event;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// How long the input read waits before the loop services the bridge.
const INPUT_POLL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "cm", version, about = "cm terminal editor")]
struct Args {
    /// File to open at startup; a *.project file loads as a project.
    pub path: Option<PathBuf>,
    /// Configuration file path (default: ~/.cmrc).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Agent bridge TCP port.
    #[arg(long = "bridge-port", default_value_t = cm_bridge::BRIDGE_PORT)]
    pub bridge_port: u16,
}

fn configure_logging() -> Option<WorkerGuard> {
    let dir = std::env::var_os("HOME").map(PathBuf::from)?;
    let appender = tracing_appender::rolling::never(dir, "cm.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env("CM_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    info!(target: "runtime", "startup");

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(ProgramDefaults::default_path);
    let defaults = ProgramDefaults::load_or_bootstrap(&config_path).unwrap_or_else(|err| {
        warn!(target: "runtime", %err, "config failed, using defaults");
        ProgramDefaults::default()
    });

    // A *.project argument loads the project; anything else is a file
    // to edit. Without an argument the project is discovered upward
    // from the working directory.
    let mut open_path: Option<String> = None;
    let mut project: Option<Project> = None;
    match &args.path {
        Some(path) if path.extension().and_then(|e| e.to_str()) == Some("project") => {
            project = Project::load(path)
                .map_err(|err| warn!(target: "runtime", %err, "project load failed"))
                .ok();
        }
        Some(path) => {
            open_path = Some(path.to_string_lossy().to_string());
        }
        None => {}
    }
    if project.is_none() {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        project = Project::discover(&cwd);
    }

    let mut backend = CrosstermBackend::new();
    backend.set_title("cm")?;
    let (cols, rows) = backend.size()?;
    let _guard = backend.enter_guard()?;

    let (bridge, bridge_join) = cm_bridge::spawn(BridgeConfig {
        port: args.bridge_port,
        ..BridgeConfig::default()
    });

    let mut editor = ScreenEditor::new(defaults, rows as usize, cols as usize);
    editor.set_project(project);
    editor.register_project_buffers();

    let mut out = Writer::new();
    if let Some(path) = &open_path {
        editor.load_file_startup(path, &mut out);
    }
    editor.redraw_all(&mut out);
    out.flush()?;

    run_loop(&mut editor, &bridge)?;

    bridge.shutdown();
    let _ = bridge_join.join();
    info!(target: "runtime", "shutdown");
    Ok(())
}

fn run_loop(editor: &mut ScreenEditor, bridge: &cm_bridge::BridgeHandle) -> Result<()> {
    loop {
        if event::poll(INPUT_POLL)? {
            let ev = event::read()?;
            let Some(key) = cm_input::translate(&ev) else {
                continue;
            };
            let mut out = Writer::new();
            let status = editor.handle_key(key, &mut out);
            out.flush()?;
            if status == LoopStatus::Quit {
                return Ok(());
            }
            // After each fully handled keystroke, give the agent one
            // turn before the next read.
            let mut out = Writer::new();
            if editor.service_bridge(bridge, &mut out) {
                out.flush()?;
            }
        } else {
            let mut out = Writer::new();
            if editor.service_bridge(bridge, &mut out) {
                out.flush()?;
            }
        }
    }
}
