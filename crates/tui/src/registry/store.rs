use crate::request::{ConfirmOptions, RequestId};
use std::collections::HashMap;
use tokio::sync::oneshot;

pub(crate) struct PendingRequest {
    pub options: ConfirmOptions,
    resolver: Option<oneshot::Sender<bool>>,
    finalized: bool,
}

impl PendingRequest {
    fn new(options: ConfirmOptions) -> Self {
        Self {
            options,
            resolver: None,
            finalized: false,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

/// Per-scope table of outstanding requests.
#[derive(Default)]
pub(crate) struct PendingStore {
    scopes: HashMap<String, HashMap<RequestId, PendingRequest>>,
}

impl PendingStore {
    /// Returns `false` when the id was already registered in this scope; the
    /// options are replaced but the resolver is kept.
    pub fn register(&mut self, id: &RequestId, options: ConfirmOptions, scope: &str) -> bool {
        let requests = self.scopes.entry(scope.to_string()).or_default();
        match requests.get_mut(id) {
            Some(existing) => {
                existing.options = options;
                false
            }
            None => {
                requests.insert(id.clone(), PendingRequest::new(options));
                true
            }
        }
    }

    pub fn bind_resolver(
        &mut self,
        id: &RequestId,
        scope: &str,
        resolver: oneshot::Sender<bool>,
    ) -> bool {
        let Some(request) = self.get_mut(id, scope) else {
            return false;
        };
        if request.finalized {
            return false;
        }
        request.resolver = Some(resolver);
        true
    }

    pub fn remove(&mut self, id: &RequestId, scope: &str) -> Option<PendingRequest> {
        let requests = self.scopes.get_mut(scope)?;
        let removed = requests.remove(id);
        if requests.is_empty() {
            self.scopes.remove(scope);
        }
        removed
    }

    /// Delivers `outcome` once. Later calls, and calls for unknown ids, return `false`.
    pub fn finalize(&mut self, id: &RequestId, scope: &str, outcome: bool) -> bool {
        let Some(request) = self.get_mut(id, scope) else {
            return false;
        };
        if request.finalized {
            return false;
        }
        request.finalized = true;
        if let Some(resolver) = request.resolver.take() {
            // The caller may have dropped its Confirmation; the outcome still counts.
            let _ = resolver.send(outcome);
        }
        true
    }

    pub fn get(&self, id: &RequestId, scope: &str) -> Option<&PendingRequest> {
        self.scopes.get(scope)?.get(id)
    }

    fn get_mut(&mut self, id: &RequestId, scope: &str) -> Option<&mut PendingRequest> {
        self.scopes.get_mut(scope)?.get_mut(id)
    }

    #[cfg(test)]
    pub fn contains_scope(&self, scope: &str) -> bool {
        self.scopes.contains_key(scope)
    }

    #[cfg(test)]
    pub fn len(&self, scope: &str) -> usize {
        self.scopes.get(scope).map(HashMap::len).unwrap_or(0)
    }
}
