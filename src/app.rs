//! Terminal application state and input handling
//!
//! `App` sits between the terminal event loop and the `TimerEngine`: it turns
//! key presses and focus changes into engine commands, keeps the report
//! summary current and tracks which view or modal is on screen.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{error, info};

use crate::config::Config;
use crate::engine::{CompletionNotice, EngineEvent, PromptAnswer, TimerEngine};
use crate::export;
use crate::lifecycle;
use crate::notify::notify;
use crate::stats::{Summary, aggregate};
use crate::store::{KeyValueStore, SessionStore};

/// Longest the event loop blocks when no tick is scheduled
pub const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Timer,
    Report,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Completed(CompletionNotice),
    ResumePrompt,
    ConfirmClear,
}

pub struct App<S> {
    pub engine: TimerEngine<S>,
    pub categories: Vec<String>,
    pub view: View,
    pub modal: Option<Modal>,
    pub summary: Summary,
    pub session_count: usize,
    /// One-line feedback shown in the footer (export result and the like)
    pub flash: Option<String>,
    sound_enabled: bool,
    notifications_enabled: bool,
    export_path: PathBuf,
    redraw: Rc<Cell<bool>>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(config: &Config, category: String, kv: S, export_path: PathBuf) -> Self {
        let mut categories = config.categories.clone();
        if !categories.contains(&category) {
            categories.push(category.clone());
        }

        let mut engine = TimerEngine::new(SessionStore::new(kv), config.focus_minutes, category);
        let redraw = Rc::new(Cell::new(true));
        let flag = Rc::clone(&redraw);
        engine.subscribe(move |_| flag.set(true));

        let mut app = Self {
            engine,
            categories,
            view: View::Timer,
            modal: None,
            summary: Summary::default(),
            session_count: 0,
            flash: None,
            sound_enabled: config.sound_enabled,
            notifications_enabled: config.notifications_enabled,
            export_path,
            redraw,
        };
        app.refresh_report();
        app
    }

    /// True once per batch of changes since the last draw
    pub fn take_redraw(&self) -> bool {
        self.redraw.replace(false)
    }

    fn mark_dirty(&self) {
        self.redraw.set(true);
    }

    pub fn selected_category(&self) -> Option<usize> {
        self.categories.iter().position(|c| c == self.engine.category())
    }

    /// How long the event loop may wait before the next tick is due
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.engine
            .ticker()
            .until_next(now)
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL))
    }

    pub fn refresh_report(&mut self) {
        let sessions = self.engine.store().list_all();
        self.summary = aggregate(&sessions, Local::now().date_naive());
        self.session_count = sessions.len();
        self.mark_dirty();
    }

    // ------------------------------------------------------------------------
    // Engine events
    // ------------------------------------------------------------------------

    /// Drive the countdown; call on every loop iteration
    pub fn on_tick(&mut self, now: Instant) {
        for event in self.engine.advance(now) {
            self.handle_engine_event(event);
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Completed(notice) => {
                if self.notifications_enabled {
                    notify(&notice.title, &notice.message, self.sound_enabled);
                }
                self.refresh_report();
                self.modal = Some(Modal::Completed(notice));
            }
            EngineEvent::ResumePrompt => {
                // The session outranks a pending clear confirmation
                if !matches!(self.modal, Some(Modal::Completed(_))) {
                    self.modal = Some(Modal::ResumePrompt);
                }
            }
        }
        self.mark_dirty();
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Returns true when the app should exit
    pub fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        if let Some(state) = lifecycle::from_event(event) {
            if let Some(ev) = self.engine.on_lifecycle(state) {
                self.handle_engine_event(ev);
            }
            return false;
        }

        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key, now),
            Event::Resize(..) => {
                self.mark_dirty();
                false
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        self.mark_dirty();

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        if let Some(modal) = self.modal.clone() {
            self.handle_modal(modal, key, now);
            return false;
        }

        match self.view {
            View::Timer => self.handle_timer_view(key, now),
            View::Report => self.handle_report_view(key),
            View::Help => {
                if matches!(key.code, KeyCode::Char('q')) {
                    return true;
                }
                self.view = View::Timer;
                false
            }
        }
    }

    fn handle_modal(&mut self, modal: Modal, key: KeyEvent, now: Instant) {
        match modal {
            Modal::Completed(_) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    self.modal = None;
                    self.engine.reset();
                }
            }
            Modal::ResumePrompt => {
                let answer = match key.code {
                    KeyCode::Char('y') | KeyCode::Char('r') | KeyCode::Enter => PromptAnswer::Resume,
                    KeyCode::Char('n') | KeyCode::Char('a') | KeyCode::Esc => PromptAnswer::Abandon,
                    _ => return,
                };
                self.modal = None;
                self.engine.answer_prompt(answer, now);
            }
            Modal::ConfirmClear => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.modal = None;
                    self.engine.store_mut().clear_all();
                    self.refresh_report();
                    self.flash = Some("All sessions cleared".into());
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.modal = None;
                }
                _ => {}
            },
        }
    }

    fn handle_timer_view(&mut self, key: KeyEvent, now: Instant) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.engine.is_active() {
                    self.engine.pause();
                } else {
                    self.engine.start(now);
                }
            }
            KeyCode::Char('r') => self.engine.reset(),
            KeyCode::Left | KeyCode::Char('h') => self.cycle_category(false),
            KeyCode::Right | KeyCode::Char('l') => self.cycle_category(true),
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if let Some(category) = self.categories.get(idx).cloned() {
                    self.engine.set_category(category);
                }
            }
            KeyCode::Tab | KeyCode::Char('s') => self.open_report(),
            KeyCode::Char('?') => self.view = View::Help,
            _ => {}
        }
        false
    }

    fn handle_report_view(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('s') | KeyCode::Char('t') => {
                self.view = View::Timer;
                self.flash = None;
            }
            KeyCode::Char('x') => self.modal = Some(Modal::ConfirmClear),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('?') => self.view = View::Help,
            _ => {}
        }
        false
    }

    fn open_report(&mut self) {
        self.refresh_report();
        self.view = View::Report;
    }

    fn cycle_category(&mut self, forward: bool) {
        if self.engine.is_active() || self.categories.is_empty() {
            return;
        }
        let len = self.categories.len();
        let next = match (self.selected_category(), forward) {
            (Some(idx), true) => (idx + 1) % len,
            (Some(idx), false) => (idx + len - 1) % len,
            (None, _) => 0,
        };
        let category = self.categories[next].clone();
        self.engine.set_category(category);
    }

    fn export(&mut self) {
        let sessions = self.engine.store().list_all();
        match export::write_csv(&self.export_path, &self.summary, &sessions) {
            Ok(()) => {
                info!(path = %self.export_path.display(), "Report exported");
                self.flash = Some(format!("Exported to {}", self.export_path.display()));
            }
            Err(e) => {
                error!("Export failed: {e}");
                self.flash = Some(format!("Export failed: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn app(minutes: u32) -> App<MemoryStore> {
        let config = Config {
            focus_minutes: minutes,
            notifications_enabled: false,
            ..Config::default()
        };
        App::new(&config, "Study".into(), MemoryStore::new(), PathBuf::from("unused.csv"))
    }

    fn press(app: &mut App<MemoryStore>, code: KeyCode, now: Instant) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), now)
    }

    #[test]
    fn test_space_toggles_timer() {
        let now = Instant::now();
        let mut app = app(25);
        press(&mut app, KeyCode::Char(' '), now);
        assert!(app.engine.is_active());
        press(&mut app, KeyCode::Char(' '), now);
        assert!(!app.engine.is_active());
    }

    #[test]
    fn test_category_keys() {
        let now = Instant::now();
        let mut app = app(25);
        press(&mut app, KeyCode::Right, now);
        assert_eq!(app.engine.category(), "Coding");
        press(&mut app, KeyCode::Left, now);
        press(&mut app, KeyCode::Left, now);
        assert_eq!(app.engine.category(), "Project");
        press(&mut app, KeyCode::Char('3'), now);
        assert_eq!(app.engine.category(), "Reading");

        press(&mut app, KeyCode::Char(' '), now);
        press(&mut app, KeyCode::Right, now);
        assert_eq!(app.engine.category(), "Reading");
    }

    #[test]
    fn test_free_form_category_is_listed() {
        let config = Config {
            notifications_enabled: false,
            ..Config::default()
        };
        let app = App::new(&config, "Gardening".into(), MemoryStore::new(), PathBuf::new());
        assert_eq!(app.categories.last().map(String::as_str), Some("Gardening"));
        assert_eq!(app.selected_category(), Some(4));
    }

    #[test]
    fn test_focus_loss_then_abandon() {
        let now = Instant::now();
        let mut app = app(25);
        press(&mut app, KeyCode::Char(' '), now);
        app.on_tick(now + Duration::from_secs(5));
        assert_eq!(app.engine.time_left(), 1495);

        app.handle_event(&Event::FocusLost, now);
        assert_eq!(app.engine.distraction_count(), 1);
        assert!(!app.engine.is_active());

        app.handle_event(&Event::FocusGained, now);
        assert_eq!(app.modal, Some(Modal::ResumePrompt));

        // Unrelated keys keep the prompt open
        press(&mut app, KeyCode::Char(' '), now);
        assert_eq!(app.modal, Some(Modal::ResumePrompt));
        assert!(!app.engine.is_active());

        press(&mut app, KeyCode::Char('n'), now);
        assert_eq!(app.modal, None);
        assert_eq!(app.engine.time_left(), 1500);
        assert_eq!(app.engine.distraction_count(), 0);
    }

    #[test]
    fn test_focus_loss_then_resume() {
        let now = Instant::now();
        let mut app = app(25);
        press(&mut app, KeyCode::Char(' '), now);
        app.on_tick(now + Duration::from_secs(2));
        app.handle_event(&Event::FocusLost, now);
        app.handle_event(&Event::FocusGained, now);

        press(&mut app, KeyCode::Char('y'), now);
        assert!(app.engine.is_active());
        assert_eq!(app.engine.distraction_count(), 1);
    }

    #[test]
    fn test_focus_return_during_clear_confirmation() {
        let now = Instant::now();
        let mut app = app(25);
        press(&mut app, KeyCode::Char(' '), now);
        app.on_tick(now + Duration::from_secs(5));
        press(&mut app, KeyCode::Tab, now);
        press(&mut app, KeyCode::Char('x'), now);
        assert_eq!(app.modal, Some(Modal::ConfirmClear));

        app.handle_event(&Event::FocusLost, now);
        app.handle_event(&Event::FocusGained, now);
        assert_eq!(app.modal, Some(Modal::ResumePrompt));
        assert!(app.engine.prompt_pending());

        press(&mut app, KeyCode::Char('n'), now);
        assert_eq!(app.modal, None);
        assert!(!app.engine.prompt_pending());
        assert_eq!(app.engine.time_left(), 1500);
        assert_eq!(app.view, View::Report);
    }

    #[test]
    fn test_completion_updates_report() {
        let now = Instant::now();
        let mut app = app(1);
        press(&mut app, KeyCode::Char(' '), now);
        app.on_tick(now + Duration::from_secs(60));

        assert!(matches!(app.modal, Some(Modal::Completed(_))));
        assert_eq!(app.session_count, 1);
        assert_eq!(app.summary.today_focus, 1);
        assert_eq!(app.summary.total_focus, 1);

        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.modal, None);
        assert_eq!(app.engine.time_left(), 60);
    }

    #[test]
    fn test_clear_needs_confirmation() {
        let now = Instant::now();
        let mut app = app(1);
        press(&mut app, KeyCode::Char(' '), now);
        app.on_tick(now + Duration::from_secs(60));
        press(&mut app, KeyCode::Enter, now);

        press(&mut app, KeyCode::Tab, now);
        assert_eq!(app.view, View::Report);

        press(&mut app, KeyCode::Char('x'), now);
        press(&mut app, KeyCode::Char('n'), now);
        assert_eq!(app.session_count, 1);

        press(&mut app, KeyCode::Char('x'), now);
        press(&mut app, KeyCode::Char('y'), now);
        assert_eq!(app.session_count, 0);
        assert_eq!(app.summary, aggregate(&[], Local::now().date_naive()));
    }

    #[test]
    fn test_quit_keys() {
        let now = Instant::now();
        let mut app = app(25);
        assert!(!press(&mut app, KeyCode::Char('?'), now));
        assert_eq!(app.view, View::Help);
        assert!(!press(&mut app, KeyCode::Esc, now));
        assert_eq!(app.view, View::Timer);
        assert!(press(&mut app, KeyCode::Char('q'), now));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), now));
    }

    #[test]
    fn test_redraw_flag() {
        let now = Instant::now();
        let mut app = app(25);
        assert!(app.take_redraw());
        assert!(!app.take_redraw());
        app.engine.start(now);
        assert!(app.take_redraw());
    }

    #[test]
    fn test_poll_timeout_follows_ticker() {
        let now = Instant::now();
        let mut app = app(25);
        assert_eq!(app.poll_timeout(now), IDLE_POLL);
        app.engine.start(now);
        assert_eq!(app.poll_timeout(now + Duration::from_millis(900)), Duration::from_millis(100));
    }
}
