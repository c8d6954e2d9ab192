//! Application lifecycle signal
//!
//! In a terminal the closest thing to "app went to background" is the
//! terminal window losing focus. Focus reporting is only enabled while a
//! `LifecycleSubscription` is alive.

use std::io::{self, Write};

use crossterm::event::{DisableFocusChange, EnableFocusChange, Event};
use crossterm::execute;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Active,
    Inactive,
    Background,
}

impl LifecycleState {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// Map a terminal event to a lifecycle change, if it is one
pub fn from_event(event: &Event) -> Option<LifecycleState> {
    match event {
        Event::FocusGained => Some(LifecycleState::Active),
        Event::FocusLost => Some(LifecycleState::Background),
        _ => None,
    }
}

/// Focus-change reporting on `W` for as long as this value lives
pub struct LifecycleSubscription<W: Write> {
    out: W,
}

impl<W: Write> LifecycleSubscription<W> {
    pub fn new(mut out: W) -> io::Result<Self> {
        execute!(out, EnableFocusChange)?;
        debug!("Focus change reporting enabled");
        Ok(Self { out })
    }
}

impl<W: Write> Drop for LifecycleSubscription<W> {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.out, DisableFocusChange) {
            warn!("Failed to disable focus change reporting: {e}");
        } else {
            debug!("Focus change reporting disabled");
        }
    }
}
