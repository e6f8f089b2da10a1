use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Cancel,
    ToggleMode,
    NextField,
    Submit,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Input(char),
    None,
}

/// Plain characters are always passed through as input; screens that are not
/// capturing text interpret them as shortcuts (`q` quits there).
pub fn map_key(key: KeyEvent) -> AppAction {
    if key.kind == KeyEventKind::Release {
        return AppAction::None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => AppAction::Quit,
            KeyCode::Char('r') => AppAction::ToggleMode,
            _ => AppAction::None,
        };
    }

    match key.code {
        KeyCode::Esc => AppAction::Cancel,
        KeyCode::Tab => AppAction::NextField,
        KeyCode::Enter => AppAction::Submit,
        KeyCode::Backspace => AppAction::Backspace,
        KeyCode::Up => AppAction::Up,
        KeyCode::Down => AppAction::Down,
        KeyCode::Left => AppAction::Left,
        KeyCode::Right => AppAction::Right,
        KeyCode::Char(ch) => AppAction::Input(ch),
        _ => AppAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn ctrl_c_quits_and_plain_q_is_input() {
        assert_eq!(
            map_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppAction::Quit
        );
        assert_eq!(
            map_key(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            AppAction::Input('q')
        );
    }

    #[test]
    fn ctrl_r_toggles_login_mode() {
        assert_eq!(
            map_key(key(KeyCode::Char('r'), KeyModifiers::CONTROL)),
            AppAction::ToggleMode
        );
    }

    #[test]
    fn arrows_and_editing_keys() {
        assert_eq!(map_key(key(KeyCode::Left, KeyModifiers::NONE)), AppAction::Left);
        assert_eq!(map_key(key(KeyCode::Right, KeyModifiers::NONE)), AppAction::Right);
        assert_eq!(map_key(key(KeyCode::Tab, KeyModifiers::NONE)), AppAction::NextField);
        assert_eq!(map_key(key(KeyCode::Esc, KeyModifiers::NONE)), AppAction::Cancel);
        assert_eq!(map_key(key(KeyCode::F(5), KeyModifiers::NONE)), AppAction::None);
    }
}
