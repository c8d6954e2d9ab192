//! Focus countdown state machine
//!
//! The engine owns the countdown, the category selection and the distraction
//! counter. It is driven by three inputs:
//! - user commands (`start`, `pause`, `reset`, `set_category`)
//! - one-second ticks from its `Ticker`
//! - lifecycle changes (focus lost / regained)
//!
//! A session record is written only when the countdown reaches zero.

use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, info};

use crate::lifecycle::LifecycleState;
use crate::session::SessionRecord;
use crate::store::{KeyValueStore, SessionStore};
use crate::ticker::Ticker;

pub const FOCUS_TIME_MINUTES: u32 = 25;
/// Longest session whose length in seconds still fits a `u32`
pub const MAX_FOCUS_MINUTES: u32 = u32::MAX / 60;
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Read-only view handed to observers and the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub time_left: u32,
    pub initial_time: u32,
    pub is_active: bool,
    pub category: String,
    pub distraction_count: u32,
    pub status: TimerStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNotice {
    pub record: SessionRecord,
    pub title: String,
    pub message: String,
}

impl CompletionNotice {
    fn for_record(record: SessionRecord) -> Self {
        let distractions = match record.distraction_count {
            0 => "no distractions".to_string(),
            1 => "1 distraction".to_string(),
            n => format!("{n} distractions"),
        };
        let message = format!(
            "Focus session complete: {} minutes of {} with {}.",
            record.duration, record.category, distractions
        );
        Self {
            record,
            title: "Well done!".to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Completed(CompletionNotice),
    /// Focus came back while a session was partly done: resume or abandon?
    ResumePrompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Resume,
    Abandon,
}

pub type Observer = Box<dyn FnMut(&TimerSnapshot)>;

pub struct TimerEngine<S> {
    focus_minutes: u32,
    initial_time: u32,
    time_left: u32,
    is_active: bool,
    category: String,
    distraction_count: u32,
    lifecycle: LifecycleState,
    prompt_pending: bool,
    ticker: Ticker,
    store: SessionStore<S>,
    observers: Vec<Observer>,
}

impl<S: KeyValueStore> TimerEngine<S> {
    pub fn new(store: SessionStore<S>, focus_minutes: u32, category: impl Into<String>) -> Self {
        let focus_minutes = focus_minutes.clamp(1, MAX_FOCUS_MINUTES);
        let initial_time = focus_minutes.saturating_mul(60);
        Self {
            focus_minutes,
            initial_time,
            time_left: initial_time,
            is_active: false,
            category: category.into(),
            distraction_count: 0,
            lifecycle: LifecycleState::Active,
            prompt_pending: false,
            ticker: Ticker::new(TICK_PERIOD),
            store,
            observers: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn initial_time(&self) -> u32 {
        self.initial_time
    }

    pub fn focus_minutes(&self) -> u32 {
        self.focus_minutes
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn distraction_count(&self) -> u32 {
        self.distraction_count
    }

    pub fn prompt_pending(&self) -> bool {
        self.prompt_pending
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.store
    }

    pub fn status(&self) -> TimerStatus {
        if self.is_active {
            TimerStatus::Running
        } else if self.time_left == 0 {
            TimerStatus::Finished
        } else if self.time_left == self.initial_time {
            TimerStatus::Idle
        } else {
            TimerStatus::Paused
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            time_left: self.time_left,
            initial_time: self.initial_time,
            is_active: self.is_active,
            category: self.category.clone(),
            distraction_count: self.distraction_count,
            status: self.status(),
        }
    }

    /// Fraction of the session already elapsed, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        1.0 - f64::from(self.time_left) / f64::from(self.initial_time)
    }

    /// Register a callback run after every state change
    pub fn subscribe(&mut self, observer: impl FnMut(&TimerSnapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn changed(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer(&snapshot);
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Begin or resume the countdown. No-op when already running or finished.
    pub fn start(&mut self, now: Instant) {
        if self.is_active || self.time_left == 0 {
            return;
        }
        if self.time_left == self.initial_time {
            self.distraction_count = 0;
        }
        self.is_active = true;
        self.prompt_pending = false;
        self.ticker.arm(now);
        debug!(time_left = self.time_left, category = %self.category, "Timer started");
        self.changed();
    }

    pub fn pause(&mut self) {
        if !self.is_active {
            return;
        }
        self.stop_running();
        debug!(time_left = self.time_left, "Timer paused");
        self.changed();
    }

    /// Back to a fresh session. Never records anything.
    pub fn reset(&mut self) {
        self.stop_running();
        self.time_left = self.initial_time;
        self.distraction_count = 0;
        self.prompt_pending = false;
        debug!("Timer reset");
        self.changed();
    }

    /// Change the category; ignored while the countdown runs
    pub fn set_category(&mut self, category: impl Into<String>) -> bool {
        if self.is_active {
            return false;
        }
        self.category = category.into();
        self.changed();
        true
    }

    fn stop_running(&mut self) {
        self.is_active = false;
        self.ticker.cancel();
    }

    // ------------------------------------------------------------------------
    // Ticks
    // ------------------------------------------------------------------------

    /// One second of countdown
    pub fn tick(&mut self) -> Option<EngineEvent> {
        if !self.is_active {
            return None;
        }
        self.time_left = self.time_left.saturating_sub(1);
        let event = if self.time_left == 0 {
            Some(EngineEvent::Completed(self.complete()))
        } else {
            None
        };
        self.changed();
        event
    }

    /// Run every tick the ticker says is due at `now`
    pub fn advance(&mut self, now: Instant) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for _ in 0..self.ticker.due(now) {
            if !self.is_active {
                break;
            }
            events.extend(self.tick());
        }
        events
    }

    fn complete(&mut self) -> CompletionNotice {
        self.stop_running();
        let record = SessionRecord::completed(
            self.category.clone(),
            self.focus_minutes,
            self.distraction_count,
            Local::now(),
        );
        self.store.append(&record);
        info!(
            category = %record.category,
            distractions = record.distraction_count,
            "Focus session completed"
        );
        CompletionNotice::for_record(record)
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    pub fn on_lifecycle(&mut self, state: LifecycleState) -> Option<EngineEvent> {
        let previous = std::mem::replace(&mut self.lifecycle, state);

        if previous.is_active() && !state.is_active() {
            if self.is_active {
                self.stop_running();
                self.distraction_count += 1;
                info!(
                    distractions = self.distraction_count,
                    time_left = self.time_left,
                    "Distraction detected, timer paused"
                );
                self.changed();
            }
            return None;
        }

        if !previous.is_active()
            && state.is_active()
            && self.time_left > 0
            && self.time_left < self.initial_time
        {
            self.prompt_pending = true;
            debug!(time_left = self.time_left, "Asking whether to resume");
            return Some(EngineEvent::ResumePrompt);
        }

        None
    }

    pub fn answer_prompt(&mut self, answer: PromptAnswer, now: Instant) {
        if !self.prompt_pending {
            return;
        }
        self.prompt_pending = false;
        match answer {
            PromptAnswer::Resume => self.start(now),
            PromptAnswer::Abandon => {
                info!(time_left = self.time_left, "Session abandoned");
                self.reset();
            }
        }
    }
}

/// Render seconds as `MM:SS`; minutes widen past 99 instead of wrapping
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
