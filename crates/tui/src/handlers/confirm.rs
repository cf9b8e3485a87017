use crossterm::event::{KeyCode, KeyModifiers};

pub(crate) const CONFIRM_INDEX: usize = 0;
pub(crate) const CANCEL_INDEX: usize = 1;
const OPTION_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DialogResponse {
    Confirm,
    Cancel,
    /// Closed without choosing a button (Esc).
    Dismiss,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct DialogKeyUpdate {
    pub selected: usize,
    pub consume: bool,
    pub response: Option<DialogResponse>,
}

pub(crate) fn handle_dialog_key(
    key: KeyCode,
    modifiers: KeyModifiers,
    selected: usize,
) -> DialogKeyUpdate {
    let mut update = DialogKeyUpdate {
        selected: selected.min(OPTION_COUNT - 1),
        consume: true,
        response: None,
    };

    if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        update.consume = false;
        return update;
    }

    match key {
        KeyCode::Up | KeyCode::Left => {
            update.selected = update.selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Right => {
            update.selected = usize::min(update.selected + 1, OPTION_COUNT - 1);
        }
        KeyCode::Tab | KeyCode::BackTab => {
            update.selected = if update.selected == CONFIRM_INDEX {
                CANCEL_INDEX
            } else {
                CONFIRM_INDEX
            };
        }
        KeyCode::Char('1') => update.selected = CONFIRM_INDEX,
        KeyCode::Char('2') => update.selected = CANCEL_INDEX,
        KeyCode::Enter => {
            update.response = Some(if update.selected == CONFIRM_INDEX {
                DialogResponse::Confirm
            } else {
                DialogResponse::Cancel
            });
        }
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            update.response = Some(DialogResponse::Confirm);
        }
        KeyCode::Char('n') | KeyCode::Char('N') => {
            update.response = Some(DialogResponse::Cancel);
        }
        KeyCode::Esc => {
            update.response = Some(DialogResponse::Dismiss);
        }
        _ => {
            update.consume = false;
        }
    }

    update
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: KeyCode, selected: usize) -> DialogKeyUpdate {
        handle_dialog_key(key, KeyModifiers::NONE, selected)
    }

    #[test]
    fn enter_activates_the_selected_button() {
        assert_eq!(
            press(KeyCode::Enter, CONFIRM_INDEX).response,
            Some(DialogResponse::Confirm)
        );
        assert_eq!(
            press(KeyCode::Enter, CANCEL_INDEX).response,
            Some(DialogResponse::Cancel)
        );
    }

    #[test]
    fn navigation_is_clamped() {
        assert_eq!(press(KeyCode::Right, CANCEL_INDEX).selected, CANCEL_INDEX);
        assert_eq!(press(KeyCode::Left, CONFIRM_INDEX).selected, CONFIRM_INDEX);
        assert_eq!(press(KeyCode::Tab, CONFIRM_INDEX).selected, CANCEL_INDEX);
        assert_eq!(press(KeyCode::Tab, CANCEL_INDEX).selected, CONFIRM_INDEX);
        assert_eq!(press(KeyCode::Char('2'), CONFIRM_INDEX).selected, CANCEL_INDEX);
    }

    #[test]
    fn shortcut_letters_and_escape() {
        assert_eq!(
            press(KeyCode::Char('Y'), CANCEL_INDEX).response,
            Some(DialogResponse::Confirm)
        );
        assert_eq!(
            press(KeyCode::Char('n'), CONFIRM_INDEX).response,
            Some(DialogResponse::Cancel)
        );
        assert_eq!(
            press(KeyCode::Esc, CONFIRM_INDEX).response,
            Some(DialogResponse::Dismiss)
        );
    }

    #[test]
    fn modified_and_unknown_keys_pass_through() {
        let update = handle_dialog_key(KeyCode::Char('y'), KeyModifiers::CONTROL, CONFIRM_INDEX);
        assert!(!update.consume);
        assert_eq!(update.response, None);
        assert!(!press(KeyCode::Char('x'), CONFIRM_INDEX).consume);
    }
}
