use breathr::{
    app::App,
    app_dirs::AppDirs,
    audio::TerminalBell,
    config::{
        BreathConfig, ConfigError, FilePreferencesStore, Preferences, PreferencesStore, PresetId,
        SessionDuration,
    },
    history::HistoryDb,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    ui,
};
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
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    sync::Mutex,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// calm guided-breathing metronome tui with presets, pace calibration, and timed sessions
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A calm guided-breathing metronome for the terminal: pick a preset or your own inhale/exhale/hold timings, calibrate a comfortable pace, and follow a timed or open-ended session."
)]
pub struct Cli {
    /// start from a built-in preset
    #[clap(short = 'p', long, value_enum)]
    preset: Option<PresetId>,

    /// inhale length in seconds
    #[clap(short = 'i', long)]
    inhale: Option<f64>,

    /// exhale length in seconds
    #[clap(short = 'e', long)]
    exhale: Option<f64>,

    /// hold length in seconds after the exhale
    #[clap(long)]
    hold: Option<f64>,

    /// session length in minutes, or "free" for no time limit
    #[clap(short = 'd', long)]
    duration: Option<SessionDuration>,

    /// how far the breathing circle swings, between 0 and 1
    #[clap(short = 'a', long)]
    amplitude: Option<f64>,

    /// open straight into a one-minute pace calibration
    #[clap(short = 'c', long)]
    calibrate: bool,

    /// mute the tick sound
    #[clap(long)]
    mute: bool,

    /// silent mode: no sound at all
    #[clap(long)]
    silent: bool,

    /// tick volume between 0 and 1
    #[clap(long)]
    volume: Option<f64>,

    /// replace the animated circle and wave with a still track
    #[clap(long)]
    reduce_motion: bool,

    /// use the light theme
    #[clap(long)]
    light: bool,
}

impl Cli {
    /// Build the starting configuration from defaults, the preset and explicit overrides.
    fn to_config(&self) -> Result<BreathConfig, ConfigError> {
        let mut config = BreathConfig::default();
        if let Some(preset) = self.preset {
            config = config.with_preset(preset.preset());
        }
        if let Some(inhale) = self.inhale {
            config.inhale_secs = inhale;
        }
        if let Some(exhale) = self.exhale {
            config.exhale_secs = exhale;
        }
        if let Some(hold) = self.hold {
            config.hold_secs = hold;
        }
        if let Some(duration) = self.duration {
            config.duration = duration;
        }
        if let Some(amplitude) = self.amplitude {
            config.amplitude = amplitude;
        }
        config.validate()?;
        Ok(config)
    }

    /// Fold flags into the stored preferences. Returns true if anything changed.
    fn apply_prefs(&self, prefs: &mut Preferences) -> bool {
        let before = prefs.clone();
        if self.mute {
            prefs.is_muted = true;
        }
        if self.silent {
            prefs.silent_mode = true;
        }
        if let Some(volume) = self.volume {
            prefs.audio_volume = volume.clamp(0.0, 1.0);
        }
        if self.reduce_motion {
            prefs.reduce_motion = true;
        }
        if self.light {
            prefs.dark_mode = false;
        }
        *prefs != before
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err).exit();
        }
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_tracing();

    let store = FilePreferencesStore::new();
    let mut prefs = store.load();
    if cli.apply_prefs(&mut prefs) {
        if let Err(err) = store.save(&prefs) {
            warn!(%err, path = %store.path().display(), "could not save preferences");
        }
    }

    let mut app = App::new(config, prefs)
        .with_store(Box::new(store))
        .with_audio(Box::new(TerminalBell::stdout()));
    match HistoryDb::new() {
        Ok(history) => app = app.with_history(history),
        Err(err) => warn!(%err, "session history unavailable"),
    }
    if cli.calibrate {
        app.start(true);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit {
        match runner.step() {
            AppEvent::Frame => {
                // idle screens need no redraw
                if app.on_frame().is_none() {
                    continue;
                }
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                app.on_key(key);
            }
        }
        if !app.should_quit {
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    Ok(())
}

/// Log to a file under the state directory; the terminal belongs to the TUI.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("breathr=info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(env_filter)
        .try_init();
    if installed.is_ok() {
        info!(path = %path.display(), "logging initialized");
    }
}
