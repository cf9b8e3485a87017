//! Renderer contract between a provider and the dialog visuals.
//!
//! A provider hands each dialog a [`DialogProps`] and lets the injected
//! [`DialogRenderer`] draw it and interpret keys. The renderer reports the
//! user's choice through `on_confirm`, `on_cancel` or `on_open_change`; the
//! provider applies it once the renderer returns.

mod dialog;
mod text;

pub use dialog::DefaultDialogRenderer;

use crate::request::ConfirmOptions;
use crossterm::event::KeyEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Confirm,
    Cancel,
    OpenChange(bool),
}

/// Collects the first callback a renderer fires for one event.
#[derive(Debug, Default)]
pub struct DialogActions {
    recorded: Cell<Option<DialogAction>>,
}

impl DialogActions {
    fn record(&self, action: DialogAction) {
        if self.recorded.get().is_none() {
            self.recorded.set(Some(action));
        }
    }

    pub fn take(&self) -> Option<DialogAction> {
        self.recorded.take()
    }
}

/// Button focus inside one dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialogCursor {
    pub selected: usize,
}

pub struct DialogProps<'a> {
    pub open: bool,
    /// Finalized and waiting for eviction. Never set together with `open`.
    pub closing: bool,
    pub warning: bool,
    pub title: &'a str,
    pub description: &'a str,
    pub cancel_text: &'a str,
    pub confirm_text: &'a str,
    /// Position among the provider's dialogs, 0 being the oldest.
    pub stack_index: usize,
    actions: &'a DialogActions,
}

impl<'a> DialogProps<'a> {
    pub fn new(
        options: &'a ConfirmOptions,
        open: bool,
        stack_index: usize,
        actions: &'a DialogActions,
    ) -> Self {
        Self {
            open,
            closing: false,
            warning: options.is_warning(),
            title: options.resolved_title(),
            description: options.resolved_description(),
            cancel_text: options.resolved_cancel_text(),
            confirm_text: options.resolved_confirm_text(),
            stack_index,
            actions,
        }
    }

    pub fn with_closing(mut self, closing: bool) -> Self {
        self.closing = closing && !self.open;
        self
    }

    pub fn on_confirm(&self) {
        self.actions.record(DialogAction::Confirm);
    }

    pub fn on_cancel(&self) {
        self.actions.record(DialogAction::Cancel);
    }

    /// Closing through `on_open_change(false)` counts as a cancel.
    pub fn on_open_change(&self, open: bool) {
        self.actions.record(DialogAction::OpenChange(open));
    }
}

/// Draws dialogs and turns key presses into dialog callbacks.
///
/// Implementations must fire at most one of `on_confirm` / `on_cancel` per
/// shown dialog. While `props.open` is false they should draw nothing, or
/// an inert frame when `props.closing` is set.
pub trait DialogRenderer: Send + Sync {
    fn render(&self, props: &DialogProps<'_>, cursor: &DialogCursor, area: Rect, buf: &mut Buffer);

    /// Returns whether the key was consumed.
    fn handle_key(&self, props: &DialogProps<'_>, cursor: &mut DialogCursor, key: KeyEvent)
        -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_callback_counts() {
        let options = ConfirmOptions::new();
        let actions = DialogActions::default();
        let props = DialogProps::new(&options, true, 0, &actions);
        props.on_cancel();
        props.on_confirm();
        assert_eq!(actions.take(), Some(DialogAction::Cancel));
        assert_eq!(actions.take(), None);
    }

    #[test]
    fn props_resolve_option_defaults() {
        let options = ConfirmOptions::new().title("Delete?").warning();
        let actions = DialogActions::default();
        let props = DialogProps::new(&options, false, 2, &actions);
        assert_eq!(props.title, "Delete?");
        assert_eq!(props.confirm_text, "Yes");
        assert!(props.warning);
        assert!(!props.open);
        assert!(!props.closing);
        assert_eq!(props.stack_index, 2);
    }

    #[test]
    fn open_dialog_is_never_closing() {
        let options = ConfirmOptions::new();
        let actions = DialogActions::default();
        assert!(!DialogProps::new(&options, true, 0, &actions)
            .with_closing(true)
            .closing);
        assert!(DialogProps::new(&options, false, 0, &actions)
            .with_closing(true)
            .closing);
    }
}
