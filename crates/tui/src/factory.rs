use crate::error::ConfirmResult;
use crate::provider::ConfirmationProvider;
use crate::registry::ConfirmationRegistry;
use crate::request::{ConfirmOptions, Confirmation};
use crate::view::DialogRenderer;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A confirmation pipeline bound to a generated scope.
///
/// Useful when a library wants its own dialogs without colliding with the
/// application's default provider.
#[derive(Clone)]
pub struct ScopedConfirmation {
    registry: ConfirmationRegistry,
    scope: String,
    defaults: ConfirmOptions,
    renderer: Option<Arc<dyn DialogRenderer>>,
}

impl ScopedConfirmation {
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn defaults(&self) -> &ConfirmOptions {
        &self.defaults
    }

    /// Prompts with `overrides` layered over the pipeline defaults.
    pub fn prompt(&self, overrides: ConfirmOptions) -> ConfirmResult<Confirmation> {
        self.registry
            .prompt_in(&self.scope, overrides.merged_over(&self.defaults))
    }

    pub fn mount_provider(&self) -> ConfirmResult<ConfirmationProvider> {
        ConfirmationProvider::mount_scoped(&self.registry, self.scope.clone(), self.renderer.clone())
    }
}

impl fmt::Debug for ScopedConfirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedConfirmation")
            .field("scope", &self.scope)
            .field("defaults", &self.defaults)
            .field("custom_renderer", &self.renderer.is_some())
            .finish()
    }
}

pub fn create_confirmation(
    registry: &ConfirmationRegistry,
    defaults: ConfirmOptions,
    renderer: Option<Arc<dyn DialogRenderer>>,
) -> ScopedConfirmation {
    ScopedConfirmation {
        registry: registry.clone(),
        scope: format!("scoped-{}", Uuid::new_v4().simple()),
        defaults,
        renderer,
    }
}

impl ConfirmationRegistry {
    pub fn create_confirmation(
        &self,
        defaults: ConfirmOptions,
        renderer: Option<Arc<dyn DialogRenderer>>,
    ) -> ScopedConfirmation {
        create_confirmation(self, defaults, renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfirmError;
    use crate::view::{DialogCursor, DialogProps};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn pipelines_get_distinct_scopes() {
        let registry = ConfirmationRegistry::default();
        let first = registry.create_confirmation(ConfirmOptions::new(), None);
        let second = registry.create_confirmation(ConfirmOptions::new(), None);
        assert_ne!(first.scope(), second.scope());
        assert_ne!(first.scope(), registry.default_scope());
    }

    #[test]
    fn prompt_requires_the_pipeline_provider() {
        let registry = ConfirmationRegistry::default();
        let _default = ConfirmationProvider::mount(&registry).unwrap();
        let scoped = registry.create_confirmation(ConfirmOptions::new(), None);
        assert!(matches!(
            scoped.prompt(ConfirmOptions::new()),
            Err(ConfirmError::MissingProvider { .. })
        ));
        let _provider = scoped.mount_provider().unwrap();
        assert!(scoped.prompt(ConfirmOptions::new()).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn identical_pipelines_do_not_interfere() {
        let registry = ConfirmationRegistry::default();
        let defaults = ConfirmOptions::new().title("Same");
        let left = create_confirmation(&registry, defaults.clone(), None);
        let right = create_confirmation(&registry, defaults, None);
        let mut left_provider = left.mount_provider().unwrap();
        let mut right_provider = right.mount_provider().unwrap();

        let left_confirmation = left.prompt(ConfirmOptions::new()).unwrap();
        let right_confirmation = right.prompt(ConfirmOptions::new()).unwrap();
        left_provider.tick();
        right_provider.tick();
        assert_eq!(left_provider.dialog_ids(), vec![left_confirmation.id().clone()]);
        assert_eq!(right_provider.dialog_ids(), vec![right_confirmation.id().clone()]);

        right_provider.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE));
        left_provider.handle_key(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE));
        assert!(left_confirmation.await);
        assert!(!right_confirmation.await);
    }

    #[test]
    fn overrides_are_merged_over_defaults() {
        let registry = ConfirmationRegistry::default();
        let scoped = registry.create_confirmation(
            ConfirmOptions::new().title("Library").confirm_text("Proceed"),
            None,
        );
        let _provider = scoped.mount_provider().unwrap();
        let confirmation = scoped
            .prompt(ConfirmOptions::new().title("Remove plugin?"))
            .unwrap();
        let options = registry
            .options(confirmation.id(), scoped.scope())
            .unwrap();
        assert_eq!(options.resolved_title(), "Remove plugin?");
        assert_eq!(options.resolved_confirm_text(), "Proceed");
    }

    struct CountingRenderer {
        renders: AtomicUsize,
    }

    impl DialogRenderer for CountingRenderer {
        fn render(&self, props: &DialogProps<'_>, _: &DialogCursor, _: Rect, _: &mut Buffer) {
            if props.open {
                self.renders.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn handle_key(&self, props: &DialogProps<'_>, _: &mut DialogCursor, key: KeyEvent) -> bool {
            if key.code == KeyCode::Char(' ') {
                props.on_confirm();
                return true;
            }
            false
        }
    }

    #[tokio::test(start_paused = true)]
    async fn custom_renderer_drives_the_pipeline() {
        let registry = ConfirmationRegistry::default();
        let renderer = Arc::new(CountingRenderer {
            renders: AtomicUsize::new(0),
        });
        let scoped = registry.create_confirmation(
            ConfirmOptions::new(),
            Some(renderer.clone() as Arc<dyn DialogRenderer>),
        );
        let mut provider = scoped.mount_provider().unwrap();
        let confirmation = scoped.prompt(ConfirmOptions::new()).unwrap();
        provider.tick();

        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        ratatui::widgets::Widget::render(&provider, area, &mut buf);
        assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);

        assert!(!provider.handle_key(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE)));
        assert!(provider.handle_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)));
        assert!(confirmation.await);
    }
}
