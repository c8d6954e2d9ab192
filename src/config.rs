//! User configuration and data locations
//!
//! Settings live in `<data_dir>/config.json`; command-line flags override them
//! for a single run.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::{FOCUS_TIME_MINUTES, MAX_FOCUS_MINUTES};
use crate::error::{Error, Result};
use crate::session::DEFAULT_CATEGORIES;

pub const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "ftimer.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub focus_minutes: u32,
    pub categories: Vec<String>,
    pub default_category: String,
    pub sound_enabled: bool,
    pub notifications_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            focus_minutes: FOCUS_TIME_MINUTES,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            default_category: DEFAULT_CATEGORIES[0].to_string(),
            sound_enabled: true,
            notifications_enabled: true,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when missing or unreadable
    pub fn load(path: &Path) -> Self {
        let config = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring invalid config {}: {e}", path.display());
                Config::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Config::default(),
            Err(e) => {
                warn!("Cannot read config {}: {e}", path.display());
                Config::default()
            }
        };
        config.normalized()
    }

    /// Like `load`, but writes the defaults out on first run so there is a
    /// file to edit
    pub fn load_or_init(path: &Path) -> Self {
        let config = Config::load(path);
        if !path.exists() {
            if let Err(e) = config.save(path) {
                warn!("Cannot write default config {}: {e}", path.display());
            }
        }
        config
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Repair values a hand-edited file may get wrong
    pub fn normalized(mut self) -> Self {
        self.focus_minutes = self.focus_minutes.clamp(1, MAX_FOCUS_MINUTES);
        self.categories.retain(|c| !c.trim().is_empty());
        if self.categories.is_empty() {
            self.categories = Config::default().categories;
        }
        if self.default_category.trim().is_empty() {
            self.default_category = self.categories[0].clone();
        }
        self
    }
}

/// Default data directory (`~/.local/share/ftimer` on Linux)
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ftimer")
}

/// Parse `25`, `25m`, `1h30m`, `90s` into whole minutes (at least one)
pub fn parse_duration(s: &str) -> Result<u32> {
    let input = s.trim().to_lowercase();
    let invalid = |reason| Error::InvalidDuration {
        input: s.to_string(),
        reason,
    };

    let mut total = 0.0;
    let mut num = String::new();

    for c in input.chars() {
        let scale = match c {
            '0'..='9' | '.' => {
                num.push(c);
                continue;
            }
            'h' => 60.0,
            'm' => 1.0,
            's' => 1.0 / 60.0,
            _ => return Err(invalid("unknown unit")),
        };
        let value: f64 = num.parse().map_err(|_| invalid("missing number"))?;
        total += value * scale;
        num.clear();
    }

    if !num.is_empty() {
        total += num.parse::<f64>().map_err(|_| invalid("bad number"))?;
    }

    let minutes = total.round();
    if minutes < 1.0 {
        return Err(invalid("must be at least one minute"));
    }
    if minutes > f64::from(MAX_FOCUS_MINUTES) {
        return Err(invalid("too long"));
    }
    Ok(minutes as u32)
}
