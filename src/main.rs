use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::Show,
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin, Stdout},
    path::PathBuf,
    time::Duration,
};
use tapt::{
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, Difficulty, FileConfigStore, Mode},
    keymap::{command_for, Command},
    logging,
    passages::PassagePool,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner, ThreadScheduler},
    session::{Collaborators, SessionConfig, TypingSession},
    store::FileResultStore,
    ui::TerminalRenderer,
};

const POLL_INTERVAL_MS: u64 = 250;

/// terminal typing-speed test with timed and passage modes
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing-speed test for the terminal. Type the passage shown, watch live WPM and accuracy, and chase your personal best."
)]
pub struct Cli {
    /// passage difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// timed: passages cycle until the countdown ends; passage: one passage, then results
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// countdown length in seconds for timed mode
    #[clap(short = 's', long = "seconds")]
    timed_duration_secs: Option<u32>,

    /// json file shaped like {"easy": [{"text": "..."}], "medium": [...], "hard": [...]};
    /// newlines and tabs in a text become single spaces
    #[clap(long = "passages")]
    passages_file: Option<PathBuf>,

    /// write the effective settings to the config file before starting
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Flags win over values from the config file
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(difficulty) = self.difficulty {
            cfg.difficulty = difficulty;
        }
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(secs) = self.timed_duration_secs {
            cfg.timed_duration_secs = secs.max(1);
        }
        if let Some(ref path) = self.passages_file {
            cfg.passages_file = Some(path.clone());
        }
        cfg
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        if let Err(err) = logging::init_file_logging(&log_path) {
            eprintln!("logging disabled: {err}");
        }
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save_config {
        config_store.save(&config)?;
        tracing::info!(path = %config_store.path().display(), "saved config");
    }

    let passages = match config.passages_file {
        Some(ref path) => PassagePool::from_path(path)?,
        None => PassagePool::builtin()?,
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;

    run(terminal, passages, &config);

    disable_raw_mode()?;
    execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen, Show)?;

    Ok(())
}

fn run(terminal: Terminal<CrosstermBackend<Stdout>>, passages: PassagePool, config: &Config) {
    let events = CrosstermEventSource::new();
    let scheduler = ThreadScheduler::new(events.sender());
    let runner = Runner::new(
        events,
        FixedTicker::new(Duration::from_millis(POLL_INTERVAL_MS)),
    );

    let mut session = TypingSession::new(
        SessionConfig::from(config),
        Collaborators {
            provider: Box::new(passages),
            store: Box::new(FileResultStore::new()),
            scheduler: Box::new(scheduler),
            clock: Box::new(SystemClock),
            renderer: Box::new(TerminalRenderer::new(terminal)),
        },
    );

    loop {
        let Some(event) = runner.step() else {
            continue;
        };

        match event {
            AppEvent::Tick(id) => session.tick(id),
            AppEvent::Resize => session.refresh(),
            AppEvent::FocusGained => session.focus_changed(true),
            AppEvent::FocusLost => session.focus_changed(false),
            AppEvent::Key(key) => match command_for(key) {
                Some(Command::Quit) => break,
                Some(Command::SetDifficulty(difficulty)) => session.set_difficulty(difficulty),
                Some(Command::ToggleMode) => {
                    let mode = session.config().mode.toggled();
                    session.set_mode(mode);
                }
                Some(Command::Type(keystroke)) => session.apply_keystroke(keystroke),
                None => {}
            },
        }
    }
}
