//! Watch mode: local preview with drafts included
//!
//! Two modes. When the generator ships its own preview server (the default
//! configuration does), watch spawns it as a child process and waits until
//! it exits or the user interrupts. When `[preview] command` is empty,
//! watch falls back to a debounced rebuild loop over the content and theme
//! directories, re-running a drafts build on every change.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::Config;
use crate::error::{InkpressError, InkpressResult};
use crate::generate::{build_site, BuildOptions};

/// Debounce duration between a change and the rebuild it triggers
const DEBOUNCE_MS: u64 = 300;

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Blog root (absolute)
    pub root: PathBuf,
    pub config: Config,
    /// Include draft posts
    pub drafts: bool,
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone)]
pub enum WatchEvent {
    ServerStarted { command: String },
    Watching { dirs: Vec<String> },
    FileChanged { path: String },
    BuildStarted,
    BuildComplete { files: usize },
    Error { message: String },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        match self {
            WatchEvent::ServerStarted { command } => {
                format!(
                    r#"{{"event":"server_started","command":"{}"}}"#,
                    command.replace('"', "\\\"")
                )
            }
            WatchEvent::Watching { dirs } => {
                let quoted: Vec<String> = dirs.iter().map(|d| format!("\"{}\"", d)).collect();
                format!(r#"{{"event":"watching","dirs":[{}]}}"#, quoted.join(","))
            }
            WatchEvent::FileChanged { path } => {
                format!(r#"{{"event":"file_changed","path":"{}"}}"#, path)
            }
            WatchEvent::BuildStarted => r#"{"event":"build_started"}"#.to_string(),
            WatchEvent::BuildComplete { files } => {
                format!(r#"{{"event":"build_complete","files":{}}}"#, files)
            }
            WatchEvent::Error { message } => {
                format!(
                    r#"{{"event":"error","message":"{}"}}"#,
                    message.replace('"', "\\\"")
                )
            }
            WatchEvent::Shutdown => r#"{"event":"shutdown"}"#.to_string(),
        }
    }
}

/// Watcher state for debouncing
struct WatcherState {
    pending_changes: HashSet<PathBuf>,
    last_change: Option<Instant>,
}

impl WatcherState {
    fn new() -> Self {
        Self {
            pending_changes: HashSet::new(),
            last_change: None,
        }
    }

    fn add_change(&mut self, path: PathBuf) {
        self.pending_changes.insert(path);
        self.last_change = Some(Instant::now());
    }

    fn should_rebuild(&self) -> bool {
        match self.last_change {
            Some(last) => {
                !self.pending_changes.is_empty()
                    && last.elapsed() >= Duration::from_millis(DEBOUNCE_MS)
            }
            None => false,
        }
    }

    fn take_changes(&mut self) -> Vec<PathBuf> {
        let changes: Vec<_> = self.pending_changes.drain().collect();
        self.last_change = None;
        changes
    }
}

/// Serve the site locally until interrupted.
pub fn watch(
    options: WatchOptions,
    running: Arc<AtomicBool>,
    event_callback: impl Fn(WatchEvent),
) -> InkpressResult<()> {
    if options.config.preview.command.is_empty() {
        watch_rebuild(&options, &running, &event_callback)
    } else {
        serve(&options, &running, &event_callback)
    }
}

/// Run the generator's own preview server as a child process.
fn serve(
    options: &WatchOptions,
    running: &AtomicBool,
    event_callback: &impl Fn(WatchEvent),
) -> InkpressResult<()> {
    let mut argv = options.config.preview.command.clone();
    if options.drafts {
        argv.push(options.config.preview.drafts_flag.clone());
    }
    let (program, args) = argv.split_first().ok_or_else(|| InkpressError::Spawn {
        program: String::new(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "empty preview command"),
    })?;

    event_callback(WatchEvent::ServerStarted {
        command: argv.join(" "),
    });

    let mut child = Command::new(program)
        .args(args)
        .current_dir(&options.root)
        .spawn()
        .map_err(|source| InkpressError::Spawn {
            program: program.clone(),
            source,
        })?;

    loop {
        if let Some(status) = child.try_wait()? {
            // A server dying on its own is an error; exiting after an
            // interrupt is the normal shutdown path
            if running.load(Ordering::SeqCst) && !status.success() {
                return Err(InkpressError::Preview {
                    code: status.code().unwrap_or(1),
                });
            }
            break;
        }
        if !running.load(Ordering::SeqCst) {
            child.kill().ok();
            child.wait()?;
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    event_callback(WatchEvent::Shutdown);
    Ok(())
}

/// Fallback for generators without a server: rebuild on change.
fn watch_rebuild(
    options: &WatchOptions,
    running: &AtomicBool,
    event_callback: &impl Fn(WatchEvent),
) -> InkpressResult<()> {
    let content_dir = options.config.content_dir(&options.root);
    let theme_dir = options.config.theme_dir(&options.root);

    let mut watched = vec![content_dir.clone()];
    if theme_dir.is_dir() {
        watched.push(theme_dir);
    }
    event_callback(WatchEvent::Watching {
        dirs: watched.iter().map(|d| d.display().to_string()).collect(),
    });

    // Initial build
    do_build(options, event_callback)?;

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(map_notify_error)?;

    for dir in &watched {
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .map_err(map_notify_error)?;
    }

    let mut state = WatcherState::new();

    while running.load(Ordering::SeqCst) {
        if let Ok(path) = rx.recv_timeout(Duration::from_millis(50)) {
            event_callback(WatchEvent::FileChanged {
                path: path.display().to_string(),
            });
            state.add_change(path);
        }

        if state.should_rebuild() {
            let _changes = state.take_changes();
            do_build(options, event_callback)?;
        }
    }

    event_callback(WatchEvent::Shutdown);
    Ok(())
}

fn do_build(options: &WatchOptions, callback: &impl Fn(WatchEvent)) -> InkpressResult<()> {
    callback(WatchEvent::BuildStarted);

    let build_options = BuildOptions {
        drafts: options.drafts,
    };
    let summary = match build_site(&options.root, &options.config, &build_options) {
        Ok(summary) => summary,
        Err(e) => {
            callback(WatchEvent::Error {
                message: e.to_string(),
            });
            return Err(e);
        }
    };

    callback(WatchEvent::BuildComplete {
        files: summary.files,
    });
    Ok(())
}

fn map_notify_error(e: notify::Error) -> InkpressError {
    InkpressError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        e.to_string(),
    ))
}
