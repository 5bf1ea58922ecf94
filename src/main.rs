use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use ruleta::{
    app::{App, Cue, Flow, Settings},
    app_dirs::AppDirs,
    assets::{AssetStore, FsAssetStore},
    config::{Config, ConfigStore, FileConfigStore},
    rng::{RandSource, UniformSource},
    runtime::{ChannelEventSource, MonotonicClock, Runner, WheelEvent},
    wheel::Category,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin, Write},
    path::PathBuf,
    sync::Mutex,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// spin a numbered wheel and reveal a level's envelope image
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A ten-segment number wheel for the terminal. Pick a level, spin, and the envelope panel reveals a random image from that level's folder."
)]
pub struct Cli {
    /// spin duration in seconds (at least 0.5; unreadable input means 4)
    #[clap(short = 'd', long, allow_hyphen_values = true)]
    duration: Option<String>,

    /// level to start with
    #[clap(short = 'l', long, value_enum, ignore_case = true)]
    level: Option<Category>,

    /// folder holding <LEVEL>/<n>.<ext> images
    #[clap(short = 'a', long)]
    assets: Option<PathBuf>,

    /// image file extension
    #[clap(long)]
    ext: Option<String>,

    /// seed both random sources for reproducible spins
    #[clap(long)]
    seed: Option<u64>,

    /// ring the terminal bell when a spin starts and when it lands
    #[clap(long)]
    sound: bool,

    /// read settings from this file instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,
}

/// Everything needed to start a session. CLI beats config file beats defaults.
#[derive(Debug, Clone, PartialEq)]
struct Launch {
    settings: Settings,
    assets_dir: PathBuf,
    seed: Option<u64>,
    sound: bool,
}

impl Launch {
    fn from_sources(cli: &Cli, config: Config) -> Self {
        Self {
            settings: Settings {
                duration_input: cli.duration.clone().unwrap_or(config.duration),
                level: cli.level.or(config.level),
                image_extension: cli.ext.clone().unwrap_or(config.image_extension),
            },
            assets_dir: cli.assets.clone().unwrap_or(config.assets_dir),
            seed: cli.seed,
            sound: cli.sound || config.sound,
        }
    }

    fn sources(&self) -> (RandSource<rand::rngs::StdRng>, RandSource<rand::rngs::StdRng>) {
        match self.seed {
            Some(seed) => (
                RandSource::seeded(seed),
                RandSource::seeded(seed.wrapping_add(1)),
            ),
            None => (RandSource::from_entropy(), RandSource::from_entropy()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_tracing();

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let launch = Launch::from_sources(&cli, config_store.load());
    info!(
        assets = %launch.assets_dir.display(),
        level = ?launch.settings.level,
        duration = %launch.settings.duration_input,
        seeded = launch.seed.is_some(),
        "starting"
    );

    let (engine_rng, presenter_rng) = launch.sources();
    let store = FsAssetStore::new(&launch.assets_dir);
    let mut app = App::new(engine_rng, presenter_rng, store, launch.settings.clone());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app, launch.sound);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend, R: UniformSource, S: AssetStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<R, S>,
    sound: bool,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(ChannelEventSource::crossterm(), MonotonicClock::new());

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let (event, now) = runner.step();
        match event {
            WheelEvent::Frame => {
                app.on_frame(now);
            }
            WheelEvent::Resize => {}
            WheelEvent::Key(key) => {
                if app.on_key(key, now) == Flow::Quit {
                    break;
                }
            }
        }
        play_cues(app.drain_cues(), sound);
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    info!(last_result = ?app.last_result, "quitting");
    Ok(())
}

fn play_cues(cues: Vec<Cue>, sound: bool) {
    if !sound {
        return;
    }
    if cues.iter().any(|c| matches!(c, Cue::Spin | Cue::Win)) {
        // the bell is best effort
        let mut out = io::stdout();
        let _ = out.write_all(b"\x07").and_then(|_| out.flush());
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Some((path, file)) = open_log_file() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();
        info!(path = %path.display(), "logging initialized");
        return;
    }

    // no log file: stay silent rather than write over the TUI
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> Option<(PathBuf, fs::File)> {
    let path = AppDirs::log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;
    Some((path, file))
}
