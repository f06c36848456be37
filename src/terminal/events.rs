use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::terminal::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Generate,
    Quit,
}

pub fn handle_key(key: KeyEvent, state: &mut AppState) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,

        // one run at a time
        KeyCode::Char('g') | KeyCode::Enter if !state.is_working() => Action::Generate,

        KeyCode::Down | KeyCode::Char('j') => {
            state.scroll_by(1);
            Action::None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.scroll_by(-1);
            Action::None
        }
        KeyCode::PageDown => {
            state.scroll_by(10);
            Action::None
        }
        KeyCode::PageUp => {
            state.scroll_by(-10);
            Action::None
        }
        KeyCode::Home => {
            state.scroll = 0;
            Action::None
        }
        _ => Action::None,
    }
}
