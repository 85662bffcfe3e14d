use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use log::{error, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Space,
    Escape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    /// Auto-repeat while a key is held down.
    KeyRepeat(Key),
    KeyUp(Key),
    Resize(u16, u16),
    /// The player closed the game (Ctrl+C or `q`).
    Close,
}

pub fn translate(event: &Event) -> Option<InputEvent> {
    match event {
        Event::Key(key_event) => translate_key(key_event),
        Event::Resize(width, height) => Some(InputEvent::Resize(*width, *height)),
        _ => None,
    }
}

fn translate_key(key_event: &KeyEvent) -> Option<InputEvent> {
    let released = key_event.kind == KeyEventKind::Release;
    match key_event.code {
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            return (!released).then_some(InputEvent::Close);
        }
        KeyCode::Char('q') => return (!released).then_some(InputEvent::Close),
        _ => {}
    }
    let key = match key_event.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Esc => Key::Escape,
        _ => return None,
    };
    Some(match key_event.kind {
        KeyEventKind::Press => InputEvent::KeyDown(key),
        KeyEventKind::Repeat => InputEvent::KeyRepeat(key),
        KeyEventKind::Release => InputEvent::KeyUp(key),
    })
}

/// Drains every pending terminal event without blocking.
pub fn poll_events() -> io::Result<Vec<InputEvent>> {
    let mut events = Vec::new();
    while event::poll(Duration::ZERO).map_err(|e| {
        error!("Failed to poll event: {}", e);
        e
    })? {
        let raw = event::read().map_err(|e| {
            error!("Failed to read event: {}", e);
            e
        })?;
        if let Some(input) = translate(&raw) {
            events.push(input);
        }
    }
    Ok(events)
}

/// Which keys are currently down.
///
/// Terminals with keyboard enhancement report releases, so a key stays held
/// until its `KeyUp`. Elsewhere the only signal is the stream of presses, and
/// auto-repeats arrive as more presses. A fresh press then counts as held for
/// `first_repeat_delay_ms`, long enough to bridge the terminal's initial
/// repeat delay, and once repeats flow each one extends the hold by `grace_ms`.
pub struct KeyboardState {
    keys: HashMap<Key, HeldKey>,
    reports_release: bool,
    grace_ms: u64,
    first_repeat_delay_ms: u64,
}

#[derive(Clone, Copy, Debug)]
struct HeldKey {
    last_seen_ms: u64,
    repeating: bool,
}

impl KeyboardState {
    pub fn new(reports_release: bool, grace_ms: u64, first_repeat_delay_ms: u64) -> Self {
        KeyboardState {
            keys: HashMap::new(),
            reports_release,
            grace_ms,
            first_repeat_delay_ms,
        }
    }

    /// Records the event and returns it the way the game should see it.
    ///
    /// Without release reporting a `KeyDown` for a key that is still held is
    /// an auto-repeat, so it comes back as `KeyRepeat`.
    pub fn apply(&mut self, event: InputEvent, now_ms: u64) -> InputEvent {
        match event {
            InputEvent::KeyDown(key) => {
                if !self.reports_release && self.is_held(key, now_ms) {
                    self.mark(key, now_ms, true);
                    return InputEvent::KeyRepeat(key);
                }
                self.mark(key, now_ms, false);
            }
            InputEvent::KeyRepeat(key) => self.mark(key, now_ms, true),
            InputEvent::KeyUp(key) => {
                self.keys.remove(&key);
            }
            InputEvent::Resize(..) | InputEvent::Close => {}
        }
        event
    }

    fn mark(&mut self, key: Key, now_ms: u64, repeating: bool) {
        self.keys.insert(
            key,
            HeldKey {
                last_seen_ms: now_ms,
                repeating,
            },
        );
    }

    pub fn is_held(&self, key: Key, now_ms: u64) -> bool {
        match self.keys.get(&key) {
            None => false,
            Some(_) if self.reports_release => true,
            Some(held) => {
                let window = if held.repeating {
                    self.grace_ms
                } else {
                    self.first_repeat_delay_ms
                };
                now_ms.saturating_sub(held.last_seen_ms) <= window
            }
        }
    }

    pub fn release_all(&mut self) {
        self.keys.clear();
    }
}

/// Raw mode on the alternate screen for as long as the guard lives.
pub struct TerminalGuard {
    enhanced_keyboard: bool,
}

impl TerminalGuard {
    pub fn enter(title: &str) -> io::Result<Self> {
        info!("Attempting to enable raw mode.");
        enable_raw_mode().map_err(|e| {
            error!("Failed to enable raw mode: {}", e);
            e
        })?;
        // From here on Drop restores the terminal, even if setup fails midway.
        let mut guard = TerminalGuard {
            enhanced_keyboard: false,
        };
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide, SetTitle(title))?;
        if matches!(supports_keyboard_enhancement(), Ok(true)) {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            guard.enhanced_keyboard = true;
        }
        info!(
            "Terminal ready (key release events: {}).",
            guard.enhanced_keyboard
        );
        Ok(guard)
    }

    pub fn reports_key_release(&self) -> bool {
        self.enhanced_keyboard
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.enhanced_keyboard {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        if let Err(e) = execute!(stdout, Show, LeaveAlternateScreen) {
            error!("Failed to leave alternate screen: {}", e);
        }
        let _ = stdout.flush();
        if let Err(e) = disable_raw_mode() {
            error!("Failed to disable raw mode on exit: {}", e);
        }
        info!("Terminal restored.");
    }
}
