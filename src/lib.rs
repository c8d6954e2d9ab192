//! ftimer - a terminal focus timer
//!
//! Runs a countdown tagged with a category, counts a distraction every time
//! the terminal loses focus mid-session, and keeps completed sessions in a
//! local JSON store for the report view:
//! - today's and all-time focus minutes
//! - total distractions
//! - minutes per category
//! - a 7-day per-day chart

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod lifecycle;
pub mod notify;
pub mod session;
pub mod stats;
pub mod store;
pub mod ticker;
pub mod ui;

pub use config::Config;
pub use engine::{EngineEvent, TimerEngine, format_time};
pub use error::{Error, Result};
pub use session::SessionRecord;
pub use stats::{Summary, aggregate};
pub use store::{FileStore, KeyValueStore, MemoryStore, SessionStore};
