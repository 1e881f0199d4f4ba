mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::ThreadRng, Rng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};
use unitdrill::{
    app_dirs::AppDirs,
    catalog::UnitCatalog,
    celebration::Celebration,
    config::{Config, ConfigStore, FileConfigStore, MAX_MINUTES, MAX_QUESTIONS},
    drill::{Clock, Drill, SystemClock},
    logging,
    problem::Difficulty,
    runtime::{CrosstermEventSource, DrillEvent, EventSource, FixedTicker, Runner, Ticker},
    DrillError, SessionState,
};

const TICK_RATE_MS: u64 = 100;

/// Longest answer the input line accepts
const MAX_INPUT_CHARS: usize = 32;

/// metric unit conversion drill for the terminal
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Practice converting between metric units of length, mass and volume. Every answer is checked exactly; type a comma or a period as decimal separator."
)]
pub struct Cli {
    /// category to practice: length, mass or volume
    #[clap(short = 'c', long)]
    category: Option<String>,

    /// comma-separated units to draw from, e.g. m,km (all units when fewer than two match)
    #[clap(short = 'u', long, value_delimiter = ',')]
    units: Option<Vec<String>>,

    /// kind of numbers to convert
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// finish after this many correct answers
    #[clap(short = 'q', long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_QUESTIONS)), conflicts_with = "minutes")]
    questions: Option<u32>,

    /// finish after this many minutes instead of a number of questions
    #[clap(short = 'm', long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_MINUTES)))]
    minutes: Option<u32>,
}

impl Cli {
    /// Layer the command line over the saved preferences.
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(category) = &self.category {
            cfg.category = category.to_lowercase();
        }
        if let Some(units) = &self.units {
            cfg.units.insert(cfg.category.clone(), units.clone());
        }
        if let Some(difficulty) = self.difficulty {
            cfg.difficulty = difficulty;
        }
        if let Some(questions) = self.questions {
            cfg.timed = false;
            cfg.question_count = questions;
        }
        if let Some(minutes) = self.minutes {
            cfg.timed = true;
            cfg.minutes = minutes;
        }
        cfg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Drilling,
    Results,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App<C: Clock = SystemClock, R: Rng = ThreadRng> {
    pub drill: Drill<C, R>,
    pub session: SessionState,
    pub settings: Config,
    pub state: AppState,
    pub input: String,
    /// Problem the input line was typed for; a new problem clears it.
    input_problem: u64,
    pub celebration: Celebration,
    pub notice: Option<String>,
    pub size: (u16, u16),
}

impl<C: Clock, R: Rng> App<C, R> {
    pub fn new(mut drill: Drill<C, R>, settings: Config) -> Result<Self, DrillError> {
        let session = drill.start_session(settings.session_config())?;
        Ok(Self {
            input_problem: session.problem_number(),
            drill,
            session,
            settings,
            state: AppState::Drilling,
            input: String::new(),
            celebration: Celebration::new(),
            notice: None,
            size: (80, 24),
        })
    }

    /// Throw the current session away and start a fresh one from the settings.
    pub fn restart(&mut self) -> Result<(), DrillError> {
        self.session = self.drill.start_session(self.settings.session_config())?;
        self.input.clear();
        self.input_problem = self.session.problem_number();
        self.state = AppState::Drilling;
        self.celebration.stop();
        self.notice = None;
        Ok(())
    }

    fn sync_input(&mut self) {
        if self.session.problem_number() != self.input_problem {
            self.input.clear();
            self.input_problem = self.session.problem_number();
        }
    }

    fn check_finished(&mut self) {
        if self.state == AppState::Drilling && !self.session.is_active() {
            self.state = AppState::Results;
            if self.session.summary().perfect {
                let (w, h) = self.size;
                self.celebration.start(w, h, &mut rand::thread_rng());
            }
        }
    }

    pub fn submit(&mut self) {
        if let Err(err) = self.drill.submit_answer(&mut self.session, &self.input) {
            tracing::warn!(%err, "answer not evaluated");
        }
        self.sync_input();
        self.check_finished();
    }

    pub fn skip(&mut self) {
        if let Err(err) = self.drill.request_new_problem(&mut self.session) {
            tracing::warn!(%err, "could not skip problem");
        }
        self.sync_input();
        self.check_finished();
    }

    pub fn finish_now(&mut self) {
        self.session.finish();
        self.check_finished();
    }

    /// Expiry check; run before every draw.
    pub fn poll(&mut self) {
        self.drill.poll_expiry(&mut self.session);
        self.check_finished();
    }

    pub fn tick(&mut self) {
        self.poll();
        self.celebration
            .update(Duration::from_millis(TICK_RATE_MS).as_secs_f64());
    }

    pub fn open_settings(&mut self) {
        self.notice = None;
        self.state = AppState::Settings;
    }

    /// Leave settings without applying them.
    pub fn close_settings(&mut self) {
        self.state = if self.session.is_active() {
            AppState::Drilling
        } else {
            AppState::Results
        };
    }

    pub fn cycle_category(&mut self) {
        let categories = self.drill.catalog().categories();
        let current = categories
            .iter()
            .position(|c| c.name == self.settings.category);
        let next = current.map_or(0, |i| (i + 1) % categories.len());
        if let Some(category) = categories.get(next) {
            self.settings.category = category.name.clone();
        }
    }

    /// Toggle the `index`-th unit (0-based) of the selected category.
    pub fn toggle_unit(&mut self, index: usize) {
        if let Ok(units) = self.drill.catalog().units_of(&self.settings.category) {
            if let Some(unit) = units.get(index) {
                self.settings.toggle_unit(unit, &units);
            }
        }
    }

    pub fn apply_settings(&mut self, store: &dyn ConfigStore) {
        if let Err(err) = store.save(&self.settings) {
            tracing::warn!(%err, "could not save settings");
        }
        if let Err(err) = self.restart() {
            tracing::error!(%err, "could not start session from settings");
            self.notice = Some(err.to_string());
        }
    }
}

fn handle_key<C: Clock, R: Rng>(
    app: &mut App<C, R>,
    key: KeyEvent,
    store: &dyn ConfigStore,
) -> Flow {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Flow::Quit;
    }

    match app.state {
        AppState::Drilling => match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Enter => app.submit(),
            KeyCode::Tab => app.skip(),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Char('r') if ctrl => {
                if let Err(err) = app.restart() {
                    tracing::error!(%err, "restart failed");
                }
            }
            KeyCode::Char('f') if ctrl => app.finish_now(),
            KeyCode::Char('o') if ctrl => app.open_settings(),
            KeyCode::Char(c) if !ctrl => {
                if app.input.chars().count() < MAX_INPUT_CHARS {
                    app.input.push(c);
                }
            }
            _ => {}
        },
        AppState::Results => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Char('r') => {
                if let Err(err) = app.restart() {
                    tracing::error!(%err, "restart failed");
                }
            }
            KeyCode::Char('s') => app.open_settings(),
            _ => {}
        },
        AppState::Settings => match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Esc => app.close_settings(),
            KeyCode::Enter => app.apply_settings(store),
            KeyCode::Char('c') => app.cycle_category(),
            KeyCode::Char('d') => app.settings.difficulty = app.settings.difficulty.next(),
            KeyCode::Char('m') => app.settings.timed = !app.settings.timed,
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
                app.settings.adjust_length(1)
            }
            KeyCode::Char('-') | KeyCode::Left => app.settings.adjust_length(-1),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                app.toggle_unit(index);
            }
            _ => {}
        },
    }
    Flow::Continue
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        // logging is optional; the drill works without it
        let _ = logging::init(&path);
    }

    let catalog = match UnitCatalog::embedded() {
        Ok(catalog) => catalog,
        Err(err) => Cli::command().error(ErrorKind::Io, err).exit(),
    };

    let store = FileConfigStore::new();
    let settings = cli.apply(store.load());
    if let Err(err) = settings.session_config().validate(&catalog) {
        Cli::command().error(ErrorKind::InvalidValue, err).exit();
    }

    let mut app = App::new(Drill::with_system_clock(catalog), settings)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.size = (size.width, size.height);

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = run(&mut terminal, &mut app, &runner, &store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    store: &dyn ConfigStore,
) -> Result<(), Box<dyn Error>> {
    loop {
        app.poll();
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            DrillEvent::Tick => app.tick(),
            DrillEvent::Resize => {
                let size = terminal.size()?;
                app.size = (size.width, size.height);
            }
            DrillEvent::Key(key) => {
                if handle_key(app, key, store) == Flow::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}
