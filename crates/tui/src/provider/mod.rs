//! Mounted renderer for one confirmation scope.
//!
//! A provider mirrors the registry's live list for its scope as a stack of
//! [`DialogView`]s. The host UI calls [`ConfirmationProvider::tick`] from its
//! event loop, forwards key presses with
//! [`ConfirmationProvider::handle_key`] and draws the provider as a widget.

mod dialog;

pub use dialog::{DialogPhase, DialogView};

use crate::config::UnmountPolicy;
use crate::error::ConfirmResult;
use crate::registry::{ConfirmationRegistry, Snapshot, Subscription};
use crate::request::RequestId;
use crate::view::{
    DefaultDialogRenderer, DialogAction, DialogActions, DialogProps, DialogRenderer,
};
use crossterm::event::KeyEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

pub struct ConfirmationProvider {
    registry: ConfirmationRegistry,
    scope: String,
    renderer: Arc<dyn DialogRenderer>,
    views: Vec<DialogView>,
    dirty: Arc<AtomicBool>,
    seen: Option<Snapshot>,
    _subscription: Subscription,
}

impl ConfirmationProvider {
    /// Mounts a provider for the registry's default scope with the default renderer.
    pub fn mount(registry: &ConfirmationRegistry) -> ConfirmResult<Self> {
        Self::mount_scoped(registry, registry.default_scope(), None)
    }

    pub fn mount_scoped(
        registry: &ConfirmationRegistry,
        scope: impl Into<String>,
        renderer: Option<Arc<dyn DialogRenderer>>,
    ) -> ConfirmResult<Self> {
        let scope = scope.into();
        registry.enter_provider(&scope)?;
        let dirty = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&dirty);
        let subscription = registry.subscribe(move || flag.store(true, Ordering::Release));
        let mut provider = Self {
            registry: registry.clone(),
            scope,
            renderer: renderer.unwrap_or_else(|| Arc::new(DefaultDialogRenderer)),
            views: Vec::new(),
            dirty,
            seen: None,
            _subscription: subscription,
        };
        provider.sync();
        debug!(scope = %provider.scope, "confirmation provider mounted");
        Ok(provider)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn registry(&self) -> &ConfirmationRegistry {
        &self.registry
    }

    pub fn views(&self) -> &[DialogView] {
        &self.views
    }

    pub fn dialog_ids(&self) -> Vec<RequestId> {
        self.views.iter().map(|view| view.id.clone()).collect()
    }

    pub fn has_open_dialog(&self) -> bool {
        self.views.iter().any(DialogView::is_open)
    }

    /// True when the registry changed since the last sync.
    pub fn needs_sync(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Reconciles the views with the registry. Returns whether this scope's
    /// set of dialogs changed.
    pub fn sync(&mut self) -> bool {
        self.dirty.store(false, Ordering::Release);
        let snapshot = self.registry.snapshot();
        if self
            .seen
            .as_ref()
            .is_some_and(|seen| seen.same_as(&snapshot))
        {
            return false;
        }

        let before: Vec<RequestId> = self.dialog_ids();
        let mut previous: HashMap<RequestId, DialogView> = self
            .views
            .drain(..)
            .map(|view| (view.id.clone(), view))
            .collect();
        let mut views = Vec::with_capacity(before.len());
        for id in snapshot.ids_in(&self.scope) {
            if let Some(view) = previous.remove(id) {
                views.push(view);
                continue;
            }
            // The request may have been evicted between the snapshot and this lookup.
            if let Some(options) = self.registry.options(id, &self.scope) {
                views.push(DialogView::new(id.clone(), options));
            }
        }
        self.views = views;
        self.seen = Some(snapshot);
        before != self.dialog_ids()
    }

    /// Evicts requests past their grace delay, syncs with the registry and
    /// moves every new dialog one phase towards `Open`.
    pub fn tick(&mut self) -> bool {
        self.registry.evict_expired();
        let mut changed = self.sync();
        for view in &mut self.views {
            changed |= view.advance();
        }
        changed
    }

    /// Routes a key to the newest open dialog. Returns whether it was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(index) = self.views.iter().rposition(DialogView::is_open) else {
            return false;
        };
        let actions = DialogActions::default();
        let consumed = {
            let view = &mut self.views[index];
            let open = view.is_open();
            let props = DialogProps::new(&view.options, open, index, &actions);
            self.renderer.handle_key(&props, &mut view.cursor, key)
        };
        match actions.take() {
            Some(action) => self.apply(index, action) || consumed,
            None => consumed,
        }
    }

    /// Finalizes a dialog as if its confirm (`true`) or cancel (`false`) button was used.
    pub fn resolve(&mut self, id: &RequestId, outcome: bool) -> bool {
        match self.views.iter().position(|view| &view.id == id) {
            Some(index) => self.finish(index, outcome),
            None => false,
        }
    }

    /// Closes a dialog without a button press; resolves to `false`.
    pub fn dismiss(&mut self, id: &RequestId) -> bool {
        self.resolve(id, false)
    }

    fn apply(&mut self, index: usize, action: DialogAction) -> bool {
        match action {
            DialogAction::Confirm => self.finish(index, true),
            DialogAction::Cancel | DialogAction::OpenChange(false) => self.finish(index, false),
            DialogAction::OpenChange(true) => false,
        }
    }

    fn finish(&mut self, index: usize, outcome: bool) -> bool {
        let Some(view) = self.views.get_mut(index) else {
            return false;
        };
        if !view.begin_closing() {
            return false;
        }
        let id = view.id.clone();
        let side_effect = view.options.side_effect(outcome);
        // Another provider for the same scope may already have delivered an outcome.
        if self.registry.finalize(&id, &self.scope, outcome) {
            if let Some(callback) = side_effect {
                callback();
            }
        }
        self.registry.schedule_removal(&id, &self.scope);
        true
    }

    fn draw(&self, area: Rect, buf: &mut Buffer) {
        for (index, view) in self.views.iter().enumerate() {
            let actions = DialogActions::default();
            let props = DialogProps::new(&view.options, view.is_open(), index, &actions)
                .with_closing(view.is_closing());
            self.renderer.render(&props, &view.cursor, area, buf);
        }
    }
}

impl Widget for &ConfirmationProvider {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.draw(area, buf);
    }
}

impl Drop for ConfirmationProvider {
    fn drop(&mut self) {
        let remaining = self.registry.exit_provider(&self.scope);
        debug!(scope = %self.scope, remaining, "confirmation provider unmounted");
        if remaining > 0 || self.registry.config().unmount_policy != UnmountPolicy::Cancel {
            return;
        }
        for id in self.registry.pending_ids(&self.scope) {
            self.registry.finalize(&id, &self.scope, false);
            self.registry.remove(&id, &self.scope);
        }
    }
}
