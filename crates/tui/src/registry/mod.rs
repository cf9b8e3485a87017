//! Process-wide table of pending confirmations.
//!
//! A [`ConfirmationRegistry`] owns the pending-request store, the ordered
//! live list that providers observe, the provider instance counts and the
//! grace-delay eviction deadlines. It is cheap to clone; every clone refers to
//! the same state, so it can be handed to any code that needs to prompt.

mod bus;
mod eviction;
mod guard;
mod store;

pub use bus::{LiveEntry, Snapshot};

use crate::config::{ConfirmConfig, DuplicateProviderPolicy};
use crate::error::{ConfirmError, ConfirmResult};
use crate::request::{ConfirmOptions, Confirmation, RequestId};
use bus::{Listeners, ScopeList};
use eviction::Evictions;
use guard::InstanceGuard;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use store::PendingStore;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Default)]
struct RegistryState {
    store: PendingStore,
    live: ScopeList,
    listeners: Listeners,
    guard: InstanceGuard,
    evictions: Evictions,
}

struct Shared {
    config: ConfirmConfig,
    state: Mutex<RegistryState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Clone)]
pub struct ConfirmationRegistry {
    shared: Arc<Shared>,
}

impl Default for ConfirmationRegistry {
    fn default() -> Self {
        Self::new(ConfirmConfig::default())
    }
}

impl fmt::Debug for ConfirmationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("ConfirmationRegistry")
            .field("config", &self.shared.config)
            .field("live", &state.live.snapshot().entries().len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl ConfirmationRegistry {
    pub fn new(config: ConfirmConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(RegistryState::default()),
            }),
        }
    }

    pub fn config(&self) -> &ConfirmConfig {
        &self.shared.config
    }

    pub fn default_scope(&self) -> &str {
        &self.shared.config.default_scope
    }

    /// Prompts in the default scope.
    pub fn prompt(&self, options: ConfirmOptions) -> ConfirmResult<Confirmation> {
        self.prompt_in(self.default_scope(), options)
    }

    /// Registers a request for `scope` and returns its pending outcome.
    ///
    /// Fails with [`ConfirmError::MissingProvider`] when no provider is
    /// mounted for `scope`. The resolver is bound before this returns, so a
    /// provider can never finalize a request the caller cannot observe.
    pub fn prompt_in(&self, scope: &str, options: ConfirmOptions) -> ConfirmResult<Confirmation> {
        let id = RequestId::generate();
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.shared.lock();
            if state.guard.count(scope) == 0 {
                return Err(ConfirmError::MissingProvider {
                    scope: scope.to_string(),
                });
            }
            state.store.register(&id, options, scope);
            state.store.bind_resolver(&id, scope, tx);
            state.live.insert(&id, scope);
        }
        debug!(scope, id = %id, "confirmation requested");
        self.notify();
        Ok(Confirmation::new(id, scope.to_string(), rx))
    }

    /// Registers `listener` to run after every change to the live list.
    ///
    /// Listeners run synchronously on the thread that made the change, after
    /// the registry lock has been released.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let key = self.shared.lock().listeners.add(Arc::new(listener));
        Subscription {
            key,
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.evict_expired();
        self.shared.lock().live.snapshot()
    }

    pub fn pending_ids(&self, scope: &str) -> Vec<RequestId> {
        self.snapshot().ids_in(scope).cloned().collect()
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.evict_expired();
        self.shared.lock().live.contains(id)
    }

    pub fn options(&self, id: &RequestId, scope: &str) -> Option<ConfirmOptions> {
        self.evict_expired();
        self.shared
            .lock()
            .store
            .get(id, scope)
            .map(|request| request.options.clone())
    }

    pub fn is_finalized(&self, id: &RequestId, scope: &str) -> bool {
        self.evict_expired();
        self.shared
            .lock()
            .store
            .get(id, scope)
            .is_some_and(|request| request.is_finalized())
    }

    /// Delivers `outcome` to the request's future. Returns `false` when the
    /// request is unknown or was already finalized.
    pub fn finalize(&self, id: &RequestId, scope: &str, outcome: bool) -> bool {
        let (known, delivered) = {
            let mut state = self.shared.lock();
            let known = state.store.get(id, scope).is_some();
            (known, state.store.finalize(id, scope, outcome))
        };
        if delivered {
            debug!(scope, id = %id, outcome, "confirmation finalized");
        } else if !known {
            warn!(scope, id = %id, "finalize for an unknown confirmation ignored");
        }
        delivered
    }

    /// Marks the request for removal once the configured grace delay has
    /// elapsed.
    ///
    /// The request stays live until then. Due requests are evicted by
    /// [`ConfirmationProvider::tick`](crate::ConfirmationProvider::tick),
    /// by [`evict_expired`](Self::evict_expired) and lazily by reads of the
    /// live list, so no async runtime is needed.
    pub fn schedule_removal(&self, id: &RequestId, scope: &str) {
        let at = Instant::now() + self.shared.config.grace_delay();
        self.shared
            .lock()
            .evictions
            .schedule(id.clone(), scope, at);
        debug!(scope, id = %id, "eviction scheduled");
    }

    /// Evicts every request whose grace delay has elapsed. Returns how many
    /// were removed.
    pub fn evict_expired(&self) -> usize {
        self.evict_due(Instant::now())
    }

    /// Earliest pending eviction deadline, for hosts that size their poll
    /// timeout.
    pub fn next_eviction(&self) -> Option<Instant> {
        self.shared.lock().evictions.next_deadline()
    }

    /// Removes the request now, cancelling any scheduled eviction.
    pub fn remove(&self, id: &RequestId, scope: &str) -> bool {
        self.evict(id, scope)
    }

    pub fn is_eviction_scheduled(&self, id: &RequestId) -> bool {
        self.shared.lock().evictions.is_scheduled(id)
    }

    fn evict(&self, id: &RequestId, scope: &str) -> bool {
        let changed = {
            let mut state = self.shared.lock();
            state.evictions.cancel(id);
            state.store.remove(id, scope);
            state.live.remove(id)
        };
        if changed {
            debug!(scope, id = %id, "confirmation evicted");
            self.notify();
        }
        changed
    }

    fn evict_due(&self, now: Instant) -> usize {
        let evicted = {
            let mut state = self.shared.lock();
            let mut evicted = 0;
            for (id, scope) in state.evictions.take_due(now) {
                state.store.remove(&id, &scope);
                if state.live.remove(&id) {
                    debug!(scope = %scope, id = %id, "confirmation evicted after grace delay");
                    evicted += 1;
                }
            }
            evicted
        };
        if evicted > 0 {
            self.notify();
        }
        evicted
    }

    pub fn provider_count(&self, scope: &str) -> usize {
        self.shared.lock().guard.count(scope)
    }

    pub(crate) fn enter_provider(&self, scope: &str) -> ConfirmResult<usize> {
        let count = {
            let mut state = self.shared.lock();
            if self.shared.config.duplicate_provider == DuplicateProviderPolicy::Reject
                && state.guard.count(scope) > 0
            {
                return Err(ConfirmError::DuplicateProvider {
                    scope: scope.to_string(),
                });
            }
            state.guard.enter(scope)
        };
        if count > 1 {
            warn!(
                scope,
                count,
                "more than one ConfirmationProvider is mounted for this scope; every dialog will be rendered once per provider"
            );
        }
        Ok(count)
    }

    pub(crate) fn exit_provider(&self, scope: &str) -> usize {
        self.shared.lock().guard.exit(scope)
    }

    fn notify(&self) {
        let listeners = self.shared.lock().listeners.collect();
        for listener in listeners {
            listener();
        }
    }
}

/// Keeps a listener registered; dropping it unsubscribes.
pub struct Subscription {
    key: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("key", &self.key).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.lock().listeners.remove(self.key);
        }
    }
}
