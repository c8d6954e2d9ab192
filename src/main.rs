use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ftimer::app::App;
use ftimer::config::{self, CONFIG_FILE, Config, LOG_FILE, parse_duration};
use ftimer::engine::TimerStatus;
use ftimer::export;
use ftimer::lifecycle::LifecycleSubscription;
use ftimer::stats::{Summary, aggregate};
use ftimer::store::{FileStore, KeyValueStore, MemoryStore, SessionStore};
use ftimer::ui;

type Store = Box<dyn KeyValueStore>;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "⏱  ftimer - a terminal focus timer with distraction tracking")]
#[command(after_help = r#"EXAMPLES:
    ftimer                       # 25-minute focus session, default category
    ftimer -f 50m -c Coding      # 50 minutes of Coding
    ftimer report                # Print today's and all-time stats
    ftimer export report.csv     # Export stats and sessions as CSV
    ftimer clear --yes           # Delete every recorded session

Leaving the terminal window while the timer runs pauses it and counts a
distraction. Coming back offers to resume or abandon the session."#)]
struct Args {
    /// Focus length, e.g. 25, 25m, 1h30m
    #[arg(short, long, value_parser = parse_duration)]
    focus: Option<u32>,

    /// Category for the first session
    #[arg(short, long)]
    category: Option<String>,

    /// Disable the completion sound
    #[arg(long)]
    no_sound: bool,

    /// Disable desktop notifications
    #[arg(long)]
    no_notify: bool,

    /// Where sessions, config and logs are kept
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Keep sessions in memory only
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print focus statistics
    #[command(alias = "stats")]
    Report,

    /// Write statistics and sessions as CSV
    Export {
        /// Output file (default: <data dir>/ftimer_export.csv)
        path: Option<PathBuf>,
    },

    /// Delete every recorded session
    Clear {
        /// Skip the safety check
        #[arg(long)]
        yes: bool,
    },
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    let data_dir = args.data_dir.clone().unwrap_or_else(config::default_data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    init_logging(&data_dir)?;

    let mut config = Config::load_or_init(&data_dir.join(CONFIG_FILE));
    if let Some(minutes) = args.focus {
        config.focus_minutes = minutes;
    }
    if args.no_sound {
        config.sound_enabled = false;
    }
    if args.no_notify {
        config.notifications_enabled = false;
    }

    let kv: Store = if args.ephemeral {
        Box::new(MemoryStore::new())
    } else {
        Box::new(FileStore::new(&data_dir).with_context(|| {
            format!("Failed to open session store in {}", data_dir.display())
        })?)
    };

    match args.command {
        Some(Commands::Report) => cmd_report(SessionStore::new(kv)),
        Some(Commands::Export { path }) => {
            let path = path.unwrap_or_else(|| data_dir.join("ftimer_export.csv"));
            cmd_export(SessionStore::new(kv), &path)
        }
        Some(Commands::Clear { yes }) => cmd_clear(SessionStore::new(kv), yes),
        None => {
            let category = args.category.unwrap_or_else(|| config.default_category.clone());
            info!(
                focus_minutes = config.focus_minutes,
                category = %category,
                data_dir = %data_dir.display(),
                "Starting timer"
            );
            let mut app = App::new(&config, category, kv, data_dir.join("ftimer_export.csv"));
            run_tui(&mut app)
        }
    }
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(data_dir: &Path) -> Result<()> {
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

const CYAN: &str = "\x1b[0;36m";
const GREEN: &str = "\x1b[0;32m";
const BOLD: &str = "\x1b[1m";
const NC: &str = "\x1b[0m";

fn color(code: &str, text: &str) -> String {
    if io::IsTerminal::is_terminal(&io::stdout()) {
        format!("{code}{text}{NC}")
    } else {
        text.to_string()
    }
}

fn cmd_report(store: SessionStore<Store>) -> Result<()> {
    let sessions = store.list_all();
    let summary = aggregate(&sessions, Local::now().date_naive());
    print_summary(&summary, sessions.len());
    Ok(())
}

fn print_summary(summary: &Summary, sessions: usize) {
    let (hours, mins) = summary.total_time();

    println!("{}", color(BOLD, "Focus Report"));
    println!();
    println!("  {}         {} min", color(CYAN, "Today:"), summary.today_focus);
    println!("  {}         {} min ({hours}h {mins}m, {sessions} sessions)", color(CYAN, "Total:"), summary.total_focus);
    println!("  {}  {}", color(CYAN, "Distractions:"), summary.total_distractions);
    println!();

    println!("{}", color(BOLD, "Last 7 days"));
    let max = summary.week.values.iter().copied().max().unwrap_or(0).max(1);
    for (label, &value) in summary.week.labels.iter().zip(&summary.week.values) {
        let width = (value * 30 / max) as usize;
        println!("  {label} {} {value}", "█".repeat(width));
    }
    println!();

    println!("{}", color(BOLD, "Categories"));
    if !summary.has_category_data() {
        println!("  No data yet.");
    }
    for slice in &summary.categories {
        println!("  {:<12} {} min", slice.name, slice.minutes);
    }
}

fn cmd_export(store: SessionStore<Store>, path: &Path) -> Result<()> {
    let sessions = store.list_all();
    let summary = aggregate(&sessions, Local::now().date_naive());
    export::write_csv(path, &summary, &sessions)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), sessions = sessions.len(), "Report exported");
    println!("{} Exported {} sessions to {}", color(GREEN, "[ok]"), sessions.len(), path.display());
    Ok(())
}

fn cmd_clear(mut store: SessionStore<Store>, yes: bool) -> Result<()> {
    let count = store.list_all().len();
    if !yes {
        println!("This deletes {count} recorded sessions. Run again with --yes to confirm.");
        return Ok(());
    }
    store.clear_all();
    println!("{} Cleared {count} sessions", color(GREEN, "[ok]"));
    Ok(())
}

// ============================================================================
// Terminal UI
// ============================================================================

fn run_tui(app: &mut App<Store>) -> Result<()> {
    // Focus reporting is switched off again when this drops
    let focus_events = LifecycleSubscription::new(io::stdout())?;
    enable_raw_mode()?;
    let mut terminal = match enter_screen() {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
            return Err(e);
        }
    };

    let res = run(&mut terminal, app);

    drop(focus_events);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if matches!(app.engine.status(), TimerStatus::Running | TimerStatus::Paused) {
        info!(time_left = app.engine.time_left(), "Quit mid-session, nothing recorded");
    }

    res
}

fn enter_screen() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App<Store>) -> Result<()> {
    loop {
        if app.take_redraw() {
            terminal.draw(|f| ui::render(f, app))?;
        }

        if event::poll(app.poll_timeout(Instant::now()))? {
            let event = event::read()?;
            if app.handle_event(&event, Instant::now()) {
                return Ok(());
            }
        }

        app.on_tick(Instant::now());
    }
}
