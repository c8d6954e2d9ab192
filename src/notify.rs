//! Desktop notifications and completion sound

use std::path::Path;
use std::process::{Command, Stdio};

use notify_rust::{Notification, Urgency};
use tracing::debug;

const SOUNDS: [(&str, &str); 3] = [
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Best effort: failures are logged at debug level only
pub fn notify(title: &str, body: &str, sound: bool) {
    if let Err(e) = Notification::new()
        .summary(title)
        .body(body)
        .appname("ftimer")
        .icon("alarm-clock")
        .urgency(Urgency::Critical)
        .show()
    {
        debug!("Desktop notification failed: {e}");
    }

    if sound {
        std::thread::spawn(play_sound);
    }
}

/// First player whose sound file is installed
fn find_sound<'a>(candidates: &[(&'a str, &'a str)]) -> Option<(&'a str, &'a str)> {
    candidates.iter().copied().find(|(_, file)| Path::new(file).exists())
}

fn play_sound() {
    let Some((player, file)) = find_sound(&SOUNDS) else {
        debug!("No completion sound found");
        return;
    };
    if let Err(e) = Command::new(player)
        .arg(file)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        debug!("Cannot play sound with {player}: {e}");
    }
}
