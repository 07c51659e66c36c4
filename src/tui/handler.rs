use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    NextPage,
    PrevPage,
    CycleCategory,
    ToggleFeatured,
    Refresh,
    OpenInBrowser,
    ShowHelp,
    HideHelp,
    // Search input actions
    SearchStart,
    SearchChar(char),
    SearchBackspace,
    SearchConfirm,
    SearchCancel,
}

pub fn handle_key_event(key: KeyEvent, search_input_active: bool, show_help: bool) -> Option<AppAction> {
    // If help is showing, any key closes it
    if show_help {
        return Some(AppAction::HideHelp);
    }

    if search_input_active {
        return match key.code {
            KeyCode::Enter => Some(AppAction::SearchConfirm),
            KeyCode::Esc => Some(AppAction::SearchCancel),
            KeyCode::Backspace => Some(AppAction::SearchBackspace),
            KeyCode::Char(c) => Some(AppAction::SearchChar(c)),
            _ => None,
        };
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => Some(AppAction::Quit),
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppAction::Quit),

        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(AppAction::MoveDown),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(AppAction::MoveUp),
        (KeyCode::Char('<'), _) | (KeyCode::Home, _) => Some(AppAction::MoveToTop),
        (KeyCode::Char('>'), _) | (KeyCode::End, _) => Some(AppAction::MoveToBottom),

        (KeyCode::Char('n'), _) | (KeyCode::Right, _) | (KeyCode::PageDown, _) => {
            Some(AppAction::NextPage)
        }
        (KeyCode::Char('p'), _) | (KeyCode::Left, _) | (KeyCode::PageUp, _) => {
            Some(AppAction::PrevPage)
        }

        (KeyCode::Char('c'), _) => Some(AppAction::CycleCategory),
        (KeyCode::Char('f'), _) => Some(AppAction::ToggleFeatured),
        (KeyCode::Char('r'), _) => Some(AppAction::Refresh),
        (KeyCode::Char('o'), _) | (KeyCode::Enter, _) => Some(AppAction::OpenInBrowser),
        (KeyCode::Char('/'), _) => Some(AppAction::SearchStart),

        (KeyCode::Char('?'), _) => Some(AppAction::ShowHelp),

        _ => None,
    }
}
