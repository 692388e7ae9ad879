use std::collections::HashSet;
use std::sync::mpsc::Sender;
use std::thread;

use log::warn;
use rdev::{Event, EventType, Key};

use crate::state::ControlEvent;

/// Keys that participate in a combo, with left/right modifiers collapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComboKey {
    Ctrl,
    Alt,
    KeyP,
    KeyQ,
}

const PAUSE_COMBO: [ComboKey; 3] = [ComboKey::Ctrl, ComboKey::Alt, ComboKey::KeyP];
const QUIT_COMBO: [ComboKey; 3] = [ComboKey::Ctrl, ComboKey::Alt, ComboKey::KeyQ];

pub fn normalize(key: Key) -> Option<ComboKey> {
    match key {
        Key::ControlLeft | Key::ControlRight => Some(ComboKey::Ctrl),
        Key::Alt | Key::AltGr => Some(ComboKey::Alt),
        Key::KeyP => Some(ComboKey::KeyP),
        Key::KeyQ => Some(ComboKey::KeyQ),
        _ => None,
    }
}

/// Tracks pressed keys and fires each combo once per fresh completion.
/// A combo is latched on the press that completes it and re-arms only when
/// one of its keys is released, so key auto-repeat cannot re-trigger it.
/// After the quit combo fires the tracker goes inert.
pub struct ComboTracker {
    pressed: HashSet<ComboKey>,
    pause_latched: bool,
    quit_fired: bool,
}

impl ComboTracker {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            pause_latched: false,
            quit_fired: false,
        }
    }

    fn complete(&self, combo: &[ComboKey]) -> bool {
        combo.iter().all(|k| self.pressed.contains(k))
    }

    pub fn on_press(&mut self, key: ComboKey) -> Option<ControlEvent> {
        if self.quit_fired {
            return None;
        }
        let newly_pressed = self.pressed.insert(key);
        if self.complete(&QUIT_COMBO) && newly_pressed {
            self.quit_fired = true;
            return Some(ControlEvent::Quit);
        }
        if self.complete(&PAUSE_COMBO) && !self.pause_latched {
            self.pause_latched = true;
            return Some(ControlEvent::TogglePause);
        }
        None
    }

    pub fn on_release(&mut self, key: ComboKey) {
        if self.quit_fired {
            return;
        }
        self.pressed.remove(&key);
        if !self.complete(&PAUSE_COMBO) {
            self.pause_latched = false;
        }
    }
}

/// Global key listener on a detached thread. `rdev::listen` cannot be
/// cancelled, so the thread lives until the process exits; once the quit
/// combo has fired the tracker ignores everything else.
pub fn spawn_listener(events: Sender<ControlEvent>) {
    thread::spawn(move || {
        let mut tracker = ComboTracker::new();
        let result = rdev::listen(move |event: Event| match event.event_type {
            EventType::KeyPress(key) => {
                if let Some(key) = normalize(key) {
                    if let Some(control) = tracker.on_press(key) {
                        let _ = events.send(control);
                    }
                }
            }
            EventType::KeyRelease(key) => {
                if let Some(key) = normalize(key) {
                    tracker.on_release(key);
                }
            }
            _ => {}
        });
        if let Err(err) = result {
            warn!("Global key listener failed: {err:?}");
        }
    });
}
