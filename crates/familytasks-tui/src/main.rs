use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use familytasks_service::BlockingHttpService;
use familytasks_tui::app::App;
use ratatui::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 3720;
const DEFAULT_URL: &str = "http://127.0.0.1:3720";

#[derive(Parser, Debug)]
#[command(name = "familytasks", about = "Terminal client for Family Tasks")]
struct Args {
    /// Connect to a running server instead of starting a local one
    #[arg(long)]
    server: Option<String>,

    #[arg(long, env = "FAMILYTASKS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Write logs to this file; nothing is logged otherwise
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.log_file {
        init_logging(path)?;
    }

    let (server_url, mut child) = match args.server {
        Some(url) => (url, None),
        None => (DEFAULT_URL.to_string(), Some(spawn_server()?)),
    };
    let api_key = args.api_key.filter(|k| !k.is_empty());

    let probe = BlockingHttpService::new(&server_url)?;
    let ready = wait_for_server(&probe);

    let result = ready.and_then(|()| run_tui(&server_url, api_key));

    if let Some(ref mut child) = child {
        let _ = child.kill();
        let _ = child.wait();
    }

    result
}

/// The terminal owns stdout, so logs only go to a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn spawn_server() -> Result<Child> {
    // Prefer a familytasks-server next to our own binary, then PATH.
    let self_exe = std::env::current_exe().unwrap_or_default();
    let server_bin = self_exe
        .parent()
        .map(|d| d.join("familytasks-server"))
        .filter(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from("familytasks-server"));

    let child = Command::new(&server_bin)
        .env("FAMILYTASKS_BIND", "127.0.0.1")
        .env("FAMILYTASKS_PORT", DEFAULT_PORT.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start {}", server_bin.display()))?;

    tracing::info!(pid = child.id(), "started familytasks-server");
    Ok(child)
}

fn wait_for_server(service: &BlockingHttpService) -> Result<()> {
    let start = Instant::now();
    let timeout = Duration::from_secs(10);

    loop {
        if service.health_check().is_ok() {
            return Ok(());
        }
        if start.elapsed() > timeout {
            bail!(
                "familytasks-server did not become ready within {}s",
                timeout.as_secs()
            );
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn run_tui(server_url: &str, api_key: Option<String>) -> Result<()> {
    let app = App::new(server_url, api_key)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            // q quits unless we're typing
            if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}
