use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Scroll(Direction),
    None,
}

impl Action {
    /// Only key presses act; repeats and releases map to `None`.
    pub fn from_key(key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        // Ctrl+C arrives as a key in raw mode.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
            KeyCode::Up => Action::Scroll(Direction::Up),
            KeyCode::Down => Action::Scroll(Direction::Down),
            _ => Action::None,
        }
    }
}
