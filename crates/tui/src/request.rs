use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "Confirmation";
pub const DEFAULT_DESCRIPTION: &str = "Are you sure you want to do this?";
pub const DEFAULT_CONFIRM_TEXT: &str = "Yes";
pub const DEFAULT_CANCEL_TEXT: &str = "Cancel";

/// Opaque identifier of one outstanding confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(String);

impl RequestId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    #[default]
    Normal,
    Warning,
}

/// Side effect run after the outcome has been delivered.
pub type SideEffect = Arc<dyn Fn() + Send + Sync>;

/// Caller-supplied dialog configuration.
///
/// Every field is optional so that a scoped pipeline can layer per-call
/// overrides over its defaults; the getters fall back to the standard texts.
#[derive(Clone, Default)]
pub struct ConfirmOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub confirm_text: Option<String>,
    pub cancel_text: Option<String>,
    pub variant: Option<Variant>,
    pub on_confirm: Option<SideEffect>,
    pub on_cancel: Option<SideEffect>,
}

impl ConfirmOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = Some(text.into());
        self
    }

    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = Some(text.into());
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn warning(self) -> Self {
        self.variant(Variant::Warning)
    }

    pub fn on_confirm(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_confirm = Some(Arc::new(callback));
        self
    }

    pub fn on_cancel(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Arc::new(callback));
        self
    }

    /// Fields set on `self` win; unset fields fall back to `defaults`.
    pub fn merged_over(&self, defaults: &ConfirmOptions) -> ConfirmOptions {
        ConfirmOptions {
            title: self.title.clone().or_else(|| defaults.title.clone()),
            description: self
                .description
                .clone()
                .or_else(|| defaults.description.clone()),
            confirm_text: self
                .confirm_text
                .clone()
                .or_else(|| defaults.confirm_text.clone()),
            cancel_text: self
                .cancel_text
                .clone()
                .or_else(|| defaults.cancel_text.clone()),
            variant: self.variant.or(defaults.variant),
            on_confirm: self.on_confirm.clone().or_else(|| defaults.on_confirm.clone()),
            on_cancel: self.on_cancel.clone().or_else(|| defaults.on_cancel.clone()),
        }
    }

    pub fn resolved_title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn resolved_description(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
    }

    pub fn resolved_confirm_text(&self) -> &str {
        self.confirm_text.as_deref().unwrap_or(DEFAULT_CONFIRM_TEXT)
    }

    pub fn resolved_cancel_text(&self) -> &str {
        self.cancel_text.as_deref().unwrap_or(DEFAULT_CANCEL_TEXT)
    }

    pub fn is_warning(&self) -> bool {
        self.variant == Some(Variant::Warning)
    }

    pub(crate) fn side_effect(&self, outcome: bool) -> Option<SideEffect> {
        if outcome {
            self.on_confirm.clone()
        } else {
            self.on_cancel.clone()
        }
    }
}

impl fmt::Debug for ConfirmOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmOptions")
            .field("title", &self.title)
            .field("description", &self.description)
            .field("confirm_text", &self.confirm_text)
            .field("cancel_text", &self.cancel_text)
            .field("variant", &self.variant)
            .field("on_confirm", &self.on_confirm.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .finish()
    }
}

/// Pending outcome of a prompt.
///
/// Resolves to `true` when confirmed and `false` when cancelled or dismissed.
/// If the registry is dropped while the request is still unresolved the
/// future resolves to `false` instead of hanging.
#[must_use = "a confirmation does nothing unless awaited"]
#[derive(Debug)]
pub struct Confirmation {
    id: RequestId,
    scope: String,
    rx: oneshot::Receiver<bool>,
}

impl Confirmation {
    pub(crate) fn new(id: RequestId, scope: String, rx: oneshot::Receiver<bool>) -> Self {
        Self { id, scope, rx }
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl Future for Confirmation {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(false),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn getters_fall_back_to_standard_texts() {
        let options = ConfirmOptions::new();
        assert_eq!(options.resolved_title(), "Confirmation");
        assert_eq!(
            options.resolved_description(),
            "Are you sure you want to do this?"
        );
        assert_eq!(options.resolved_confirm_text(), "Yes");
        assert_eq!(options.resolved_cancel_text(), "Cancel");
        assert!(!options.is_warning());
    }

    #[test]
    fn overrides_win_over_defaults() {
        let defaults = ConfirmOptions::new()
            .title("Library")
            .confirm_text("Proceed")
            .warning();
        let merged = ConfirmOptions::new().title("Delete?").merged_over(&defaults);
        assert_eq!(merged.resolved_title(), "Delete?");
        assert_eq!(merged.resolved_confirm_text(), "Proceed");
        assert!(merged.is_warning());
    }

    #[test]
    fn side_effect_picks_matching_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let options = ConfirmOptions::new().on_confirm(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(options.side_effect(false).is_none());
        if let Some(callback) = options.side_effect(true) {
            callback();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn generated_ids_are_distinct() {
        let first = RequestId::generate();
        let second = RequestId::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 32);
    }

    #[tokio::test]
    async fn dropped_resolver_resolves_false() {
        let (tx, rx) = oneshot::channel();
        let confirmation = Confirmation::new(RequestId::generate(), "default".to_string(), rx);
        drop(tx);
        assert!(!confirmation.await);
    }
}
