//! Main application state and control flow for the player.
//!
//! Everything runs on one thread: each pass of the event loop drains clip
//! notifications, runs whichever timers are due, redraws, and then waits for
//! a key press no longer than the time until the next timer deadline. Every
//! handler runs to completion before the next one starts.

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::{
    error::Error,
    io,
    path::{Path, PathBuf},
    sync::mpsc,
    time::{Duration, Instant},
};

use super::audio::RodioBackend;
use super::picker::{FilePicker, PickerOutcome};
use super::ui;
use crate::clip::{AudioBackend, PlayerEvent};
use crate::config::Config;
use crate::constants::INPUT_POLL_MS;
use crate::error::{PlayerError, Result};
use crate::transport::{Autoplay, PlaybackController};

const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

pub struct App<B: AudioBackend> {
    pub should_quit: bool,
    pub controller: PlaybackController<B>,
    events_rx: mpsc::Receiver<PlayerEvent>,
    /// Path of the loaded file, shown read-only
    pub file_path: Option<PathBuf>,
    pub picker: Option<FilePicker>,
    pub status_message: Option<String>,
    status_timer: Option<Instant>,
    start_dir: PathBuf,
}

impl<B: AudioBackend> App<B> {
    pub fn new(
        controller: PlaybackController<B>,
        events_rx: mpsc::Receiver<PlayerEvent>,
        start_dir: PathBuf,
    ) -> Self {
        Self {
            should_quit: false,
            controller,
            events_rx,
            file_path: None,
            picker: None,
            status_message: None,
            status_timer: None,
            start_dir,
        }
    }

    /// Load `path` as the current track. Returns whether it loaded; a track
    /// that loaded but could not be restarted still counts.
    pub fn open_file(&mut self, path: &Path, now: Instant) -> bool {
        match self.controller.load(path, now) {
            Ok(autoplay) => {
                self.file_path = Some(path.to_path_buf());
                if let Autoplay::Failed(e) = autoplay {
                    self.report(Err(e), now);
                }
                true
            }
            Err(e) => {
                self.report(Err(e), now);
                false
            }
        }
    }

    pub fn open_picker(&mut self) {
        let dir = self
            .file_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.start_dir.clone());
        self.picker = Some(FilePicker::new(&dir));
    }

    pub fn finish_picker(&mut self, outcome: PickerOutcome, now: Instant) {
        self.picker = None;
        match outcome {
            PickerOutcome::Selected(path) => {
                info!("Selected {}", path.display());
                self.open_file(&path, now);
            }
            PickerOutcome::Cancelled => info!("File selection cancelled"),
        }
    }

    pub fn play(&mut self, now: Instant) {
        let result = self.controller.play(now);
        self.report(result, now);
    }

    pub fn pause(&mut self, now: Instant) {
        let result = self.controller.pause(now);
        self.report(result, now);
    }

    pub fn toggle_loop(&mut self) {
        self.controller.toggle_loop();
    }

    /// Surface a failed action without ending the session.
    pub fn report(&mut self, result: Result<()>, now: Instant) {
        if let Err(e) = result {
            log::error!("{e}");
            self.status_message = Some(e.to_string());
            self.status_timer = Some(now);
        }
    }

    /// Apply notifications posted by clips since the last pass.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.controller.handle_event(event);
        }
    }

    pub fn update(&mut self, now: Instant) {
        self.drain_events();
        self.controller.poll(now);

        if let Some(timer) = self.status_timer
            && now.duration_since(timer) > STATUS_MESSAGE_TTL
        {
            self.status_message = None;
            self.status_timer.take();
        }
    }

    /// How long the loop may block waiting for input.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        let cap = Duration::from_millis(INPUT_POLL_MS);
        self.controller
            .time_until_next_tick(now)
            .map_or(cap, |until| until.min(cap))
    }
}

pub fn run_with_file(file_path: Option<&Path>) -> std::result::Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    init_logging(&config)?;
    info!("Starting Bounce Player");

    let (events_tx, events_rx) = mpsc::channel();
    let backend = RodioBackend::new(events_tx);
    let has_output = backend.has_output();
    let controller = PlaybackController::new(backend, &config);
    let mut app = App::new(controller, events_rx, config.start_dir.clone());
    if !has_output {
        app.report(
            Err(PlayerError::PlaybackEngine("no audio output device".into())),
            Instant::now(),
        );
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Size the panel before the first play so the frame step is right
    let size = terminal.size()?;
    app.controller
        .set_panel(ui::visualization_panel(Rect::new(0, 0, size.width, size.height)));

    if let Some(path) = file_path {
        let now = Instant::now();
        if app.open_file(path, now) {
            app.play(now);
        }
    }

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        log::error!("Player stopped with error: {e}");
        eprintln!("Error: {e}");
    }
    res
}

fn run_app<B: ratatui::backend::Backend, A: AudioBackend>(
    terminal: &mut Terminal<B>,
    app: &mut App<A>,
) -> std::result::Result<(), Box<dyn Error>> {
    loop {
        let size = terminal.size()?;
        app.controller
            .set_panel(ui::visualization_panel(Rect::new(0, 0, size.width, size.height)));

        app.update(Instant::now());

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(app.poll_timeout(Instant::now()))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(app, key, Instant::now());
        }

        if app.should_quit {
            info!("Quitting");
            return Ok(());
        }
    }
}

fn handle_key_event<B: AudioBackend>(app: &mut App<B>, key: event::KeyEvent, now: Instant) {
    if app.picker.is_some() {
        handle_picker_keys(app, key, now);
    } else {
        handle_player_keys(app, key, now);
    }
}

fn handle_picker_keys<B: AudioBackend>(app: &mut App<B>, key: event::KeyEvent, now: Instant) {
    let Some(picker) = app.picker.as_mut() else {
        return;
    };

    let outcome = match key.code {
        KeyCode::Esc => Some(PickerOutcome::Cancelled),
        KeyCode::Up | KeyCode::Char('k') => {
            picker.navigate_up();
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            picker.navigate_down();
            None
        }
        KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
            picker.go_to_parent();
            None
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => picker.activate(),
        _ => None,
    };

    if let Some(outcome) = outcome {
        app.finish_picker(outcome, now);
    }
}

fn handle_player_keys<B: AudioBackend>(app: &mut App<B>, key: event::KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('o') | KeyCode::Char('c') => app.open_picker(),
        KeyCode::Char('p') | KeyCode::Enter => app.play(now),
        KeyCode::Char(' ') => app.pause(now),
        KeyCode::Char('l') => app.toggle_loop(),
        _ => {}
    }
}

fn init_logging(config: &Config) -> std::result::Result<(), Box<dyn Error>> {
    use simplelog::{CombinedLogger, WriteLogger};
    use std::fs::File;

    CombinedLogger::init(vec![WriteLogger::new(
        config.log_level_filter()?,
        simplelog::Config::default(),
        File::create(&config.log_file)?,
    )])?;

    Ok(())
}
