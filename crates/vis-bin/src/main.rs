//! vis entrypoint: a single-threaded, blocking event loop over the
//! buffer/diff/compositor crates. No tokio, no background input task:
//! `core_input::poll_event` blocks with a timeout and the loop below
//! does one cycle of dispatch + redraw + flush per event.

use anyhow::{bail, Result};
use clap::Parser;
use core_actions::{ColonCommand, Dispatcher, Outcome};
use core_diff::DiffEngine;
use core_events::Event;
use core_model::{diff_view::redraw_diff_pair, tile::Tile, View};
use core_render::Compositor;
use core_state::{DirEntry, FileBuf};
use core_terminal::{CrosstermBackend, TerminalBackend};
use core_text::Line;
use std::io::Read as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

/// vis: a modal, terminal-based text editor.
#[derive(Parser, Debug)]
#[command(name = "vis", version, about = "vis editor")]
struct Args {
    /// Enter diff mode immediately. Requires exactly two FILES.
    #[arg(short = 'd')]
    diff: bool,
    /// Reserved; accepted and ignored.
    #[arg(short = 'f')]
    force: bool,
    /// Files to open. A directory opens as a listing; `-` reads stdin.
    files: Vec<PathBuf>,
}

const POLL_TIMEOUT: Duration = Duration::from_millis(100);

fn configure_logging() -> Result<Option<WorkerGuard>> {
    let log_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".vis");
    fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::never(&log_dir, "vis.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let result = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init();
    Ok(result.ok().map(|_| guard))
}

fn install_panic_hook() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = core_terminal::CrosstermBackend::new().leave();
        error!(target: "runtime.panic", ?info, "panic");
        default_panic(info);
    }));
}

fn bytes_to_filebuf(path: PathBuf, bytes: &[u8]) -> FileBuf {
    let trailing_newline = bytes.last() == Some(&b'\n');
    let mut lines: Vec<Line> = bytes
        .split(|b| *b == b'\n')
        .map(Line::from_slice)
        .collect();
    if trailing_newline {
        lines.pop();
    }
    if lines.is_empty() {
        lines.push(Line::new());
    }
    FileBuf::from_lines(path, lines, trailing_newline)
}

fn load_dir(path: &Path) -> Result<FileBuf> {
    let entries = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| {
            let size = e.metadata().map(|m| m.len()).unwrap_or(0);
            DirEntry { name: e.file_name().to_string_lossy().into_owned(), size }
        })
        .collect();
    Ok(FileBuf::from_dir_listing(path.to_path_buf(), entries))
}

fn load_stdin() -> Result<FileBuf> {
    let mut bytes = Vec::new();
    std::io::stdin().read_to_end(&mut bytes)?;
    Ok(bytes_to_filebuf(PathBuf::from("-"), &bytes))
}

/// Loads a FILES argument: `-` reads stdin, a directory becomes a listing
/// buffer, anything else is read as a regular file.
fn load_path(path: &Path) -> Result<FileBuf> {
    if path.as_os_str() == "-" {
        return load_stdin();
    }
    if path.is_dir() {
        return load_dir(path);
    }
    let bytes = fs::read(path)?;
    Ok(bytes_to_filebuf(path.to_path_buf(), &bytes))
}

fn write_file(path: &Path, fb: &FileBuf) -> Result<()> {
    let mut out = Vec::new();
    for l in 0..fb.num_lines() {
        out.extend_from_slice(fb.line(l).as_bytes());
        if l + 1 < fb.num_lines() || fb.has_lf_at_eof() {
            out.push(b'\n');
        }
    }
    fs::write(path, out)?;
    Ok(())
}

fn main() -> Result<()> {
    let _guard = configure_logging()?;
    install_panic_hook();
    let args = Args::parse();

    if args.diff && args.files.len() != 2 {
        bail!("-d requires exactly two FILES");
    }

    let mut backend = CrosstermBackend::new();
    backend.set_title("vis")?;
    let _terminal_guard = backend.enter_guard()?;

    info!(target: "runtime", "startup");

    if args.diff {
        run_diff(&args.files[0], &args.files[1])
    } else {
        run_edit(args.files.first().cloned())
    }
}

fn run_edit(path: Option<PathBuf>) -> Result<()> {
    let mut fb = match &path {
        Some(p) => load_path(p)?,
        None => FileBuf::new(),
    };

    let (cols, rows) = crossterm::terminal::size()?;
    let mut comp = Compositor::new(rows, cols);
    let mut view = View::new(Tile::Full);
    let mut dispatcher = Dispatcher::new();

    view.redraw(&fb, &mut comp);
    comp.update();
    comp.flush()?;
    view.print_cursor(&comp)?;

    loop {
        match core_input::poll_event(POLL_TIMEOUT)? {
            Event::Idle => continue,
            Event::Resize(w, h) => {
                comp = Compositor::new(h, w);
                comp.invalidate();
                view.redraw(&fb, &mut comp);
            }
            Event::Key(key) => {
                let (rows, cols) = (comp.rows(), comp.cols());
                let outcome = dispatcher.handle_key(key, &mut fb, &mut view, rows, cols);
                fb.update();
                match outcome {
                    Outcome::Colon(ColonCommand::Write) => {
                        if let Some(p) = &path {
                            write_file(p, &fb)?;
                            fb.clear_changed();
                        }
                    }
                    Outcome::Colon(ColonCommand::WriteQuit) => {
                        if let Some(p) = &path {
                            write_file(p, &fb)?;
                        }
                        break;
                    }
                    Outcome::Colon(ColonCommand::Quit) if !fb.is_changed() => break,
                    Outcome::Colon(ColonCommand::ForceQuit) => break,
                    Outcome::Colon(ColonCommand::Quit) => {}
                    Outcome::Colon(ColonCommand::Unknown(_)) | Outcome::None | Outcome::Redraw => {}
                }
                view.redraw(&fb, &mut comp);
            }
        }
        comp.update();
        comp.flush()?;
        view.print_cursor(&comp)?;
    }
    Ok(())
}

fn run_diff(a_path: &Path, b_path: &Path) -> Result<()> {
    let mut a = load_path(a_path)?;
    let b = load_path(b_path)?;
    let mut engine = DiffEngine::new();
    engine.run(&a, &b);

    let (cols, rows) = crossterm::terminal::size()?;
    let mut comp = Compositor::new(rows, cols);
    let mut view_a = View::new(Tile::Half(core_model::HalfPos::Left));
    let mut view_b = View::new(Tile::Half(core_model::HalfPos::Right));
    let mut dispatcher = Dispatcher::new();

    redraw_diff_pair(&engine, &a, &b, &view_a, &view_b, &mut comp);
    comp.update();
    comp.flush()?;

    loop {
        match core_input::poll_event(POLL_TIMEOUT)? {
            Event::Idle => continue,
            Event::Resize(w, h) => {
                comp = Compositor::new(h, w);
                comp.invalidate();
            }
            Event::Key(key) => {
                let (screen_rows, screen_cols) = (comp.rows(), comp.cols());
                match key.token {
                    core_events::KeyToken::Char(b'n') => {
                        dispatcher.diff_next(&mut engine, &a, &b, &mut view_a, &mut view_b, screen_rows, screen_cols);
                    }
                    core_events::KeyToken::Char(b'N') => {
                        dispatcher.diff_prev(&mut engine, &a, &b, &mut view_a, &mut view_b, screen_rows, screen_cols);
                    }
                    core_events::KeyToken::Char(b'q') => break,
                    _ => {
                        dispatcher.handle_key(key, &mut a, &mut view_a, screen_rows, screen_cols);
                        a.update();
                        engine.rediff(&a, &b);
                    }
                }
            }
        }
        redraw_diff_pair(&engine, &a, &b, &view_a, &view_b, &mut comp);
        comp.update();
        comp.flush()?;
    }
    Ok(())
}
