// Key bindings for the full-screen list.
//
// Every direction and the confirm key has a primary binding plus an
// alternate, because some terminals never deliver the primary one. The
// vi keys replace the curses keypad codes (KEY_A2, KEY_C2, KEY_B1, KEY_B3)
// that some consoles send instead of arrow keys; crossterm has no
// portable equivalent for those.
//
// | action  | primary  | alternate                                    |
// |---------|----------|----------------------------------------------|
// | up      | `Up`     | `k` (consoles that do not report arrow keys) |
// | down    | `Down`   | `j`                                          |
// | left    | `Left`   | `h`                                          |
// | right   | `Right`  | `l`                                          |
// | confirm | `Enter`  | `Ctrl-J` / `Ctrl-M` (bare LF or CR in raw mode) |
// | quit    | `q`      | `Esc`, `Ctrl-C`                              |

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub modifiers: KeyModifiers,
    pub code: KeyCode,
}

impl KeyBinding {
    pub const fn new(modifiers: KeyModifiers, code: KeyCode) -> Self {
        Self { modifiers, code }
    }

    pub const fn key(code: KeyCode) -> Self {
        Self::new(KeyModifiers::NONE, code)
    }

    pub const fn ctrl(code: KeyCode) -> Self {
        Self::new(KeyModifiers::CONTROL, code)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        // Shift is irrelevant for the keys bound here.
        key.modifiers.difference(KeyModifiers::SHIFT) == self.modifiers && key.code == self.code
    }
}

pub struct DefaultKeymap;

impl DefaultKeymap {
    pub const UP: [KeyBinding; 2] = [KeyBinding::key(KeyCode::Up), KeyBinding::key(KeyCode::Char('k'))];
    pub const DOWN: [KeyBinding; 2] = [KeyBinding::key(KeyCode::Down), KeyBinding::key(KeyCode::Char('j'))];
    pub const LEFT: [KeyBinding; 2] = [KeyBinding::key(KeyCode::Left), KeyBinding::key(KeyCode::Char('h'))];
    pub const RIGHT: [KeyBinding; 2] = [KeyBinding::key(KeyCode::Right), KeyBinding::key(KeyCode::Char('l'))];
    pub const ENTER: [KeyBinding; 3] = [
        KeyBinding::key(KeyCode::Enter),
        KeyBinding::ctrl(KeyCode::Char('j')),
        KeyBinding::ctrl(KeyCode::Char('m')),
    ];
    pub const QUIT: [KeyBinding; 3] = [
        KeyBinding::key(KeyCode::Char('q')),
        KeyBinding::key(KeyCode::Esc),
        KeyBinding::ctrl(KeyCode::Char('c')),
    ];
    pub const CANCEL: [KeyBinding; 2] = [KeyBinding::key(KeyCode::Esc), KeyBinding::ctrl(KeyCode::Char('c'))];
    pub const BACKSPACE: [KeyBinding; 2] = [KeyBinding::key(KeyCode::Backspace), KeyBinding::ctrl(KeyCode::Char('h'))];
}

/// Input while browsing the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Quit,
    /// Anything unbound, described for the log.
    Unknown(String),
}

/// Input while typing a new name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Backspace,
    Submit,
    Cancel,
}

fn any(bindings: &[KeyBinding], key: &KeyEvent) -> bool {
    bindings.iter().any(|b| b.matches(key))
}

/// Key releases (reported on some platforms) are not input.
pub fn is_press(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
}

pub fn nav_key(key: &KeyEvent) -> NavKey {
    if any(&DefaultKeymap::UP, key) {
        NavKey::Up
    } else if any(&DefaultKeymap::DOWN, key) {
        NavKey::Down
    } else if any(&DefaultKeymap::LEFT, key) {
        NavKey::Left
    } else if any(&DefaultKeymap::RIGHT, key) {
        NavKey::Right
    } else if any(&DefaultKeymap::ENTER, key) {
        NavKey::Enter
    } else if any(&DefaultKeymap::QUIT, key) {
        NavKey::Quit
    } else {
        NavKey::Unknown(format!("{:?} {:?}", key.code, key.modifiers))
    }
}

/// `None` for keys the line editor ignores.
pub fn edit_key(key: &KeyEvent) -> Option<EditKey> {
    if any(&DefaultKeymap::ENTER, key) {
        Some(EditKey::Submit)
    } else if any(&DefaultKeymap::CANCEL, key) {
        Some(EditKey::Cancel)
    } else if any(&DefaultKeymap::BACKSPACE, key) {
        Some(EditKey::Backspace)
    } else {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                Some(EditKey::Char(c))
            }
            _ => None,
        }
    }
}
