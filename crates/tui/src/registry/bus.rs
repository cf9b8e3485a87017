use crate::request::RequestId;
use std::sync::Arc;

/// One live request as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEntry {
    pub id: RequestId,
    pub scope: String,
}

/// Immutable view of the live list at some version.
///
/// Two snapshots taken without an intervening change share one allocation,
/// so observers can detect "nothing changed" with [`Snapshot::same_as`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    entries: Arc<Vec<LiveEntry>>,
}

impl Snapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn entries(&self) -> &[LiveEntry] {
        &self.entries
    }

    pub fn same_as(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Ids of `scope` in insertion order.
    pub fn ids_in<'a>(&'a self, scope: &'a str) -> impl Iterator<Item = &'a RequestId> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.scope == scope)
            .map(|entry| &entry.id)
    }
}

#[derive(Default)]
pub(crate) struct ScopeList {
    version: u64,
    entries: Arc<Vec<LiveEntry>>,
}

impl ScopeList {
    /// Appends unless the id is already live anywhere.
    pub fn insert(&mut self, id: &RequestId, scope: &str) -> bool {
        if self.entries.iter().any(|entry| &entry.id == id) {
            return false;
        }
        Arc::make_mut(&mut self.entries).push(LiveEntry {
            id: id.clone(),
            scope: scope.to_string(),
        });
        self.bump();
        true
    }

    pub fn remove(&mut self, id: &RequestId) -> bool {
        let Some(index) = self.entries.iter().position(|entry| &entry.id == id) else {
            return false;
        };
        Arc::make_mut(&mut self.entries).remove(index);
        self.bump();
        true
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.entries.iter().any(|entry| &entry.id == id)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            entries: Arc::clone(&self.entries),
        }
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

pub(crate) type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_key: u64,
    entries: Vec<(u64, Listener)>,
}

impl Listeners {
    pub fn add(&mut self, listener: Listener) -> u64 {
        self.next_key = self.next_key.wrapping_add(1);
        self.entries.push((self.next_key, listener));
        self.next_key
    }

    pub fn remove(&mut self, key: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != key);
        self.entries.len() != before
    }

    /// Copies the current listeners so they can be called without holding the registry lock.
    pub fn collect(&self) -> Vec<Listener> {
        self.entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
