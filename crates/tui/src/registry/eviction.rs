use crate::request::RequestId;
use std::collections::HashMap;
use tokio::time::Instant;

struct Deadline {
    scope: String,
    at: Instant,
}

/// Grace-delay deadlines of finalized requests that are still live.
///
/// Nothing fires on its own: the registry drains due entries whenever a
/// provider ticks or the live list is read.
#[derive(Default)]
pub(crate) struct Evictions {
    pending: HashMap<RequestId, Deadline>,
}

impl Evictions {
    /// Sets the deadline of `id`, replacing an earlier one.
    pub fn schedule(&mut self, id: RequestId, scope: &str, at: Instant) {
        self.pending.insert(
            id,
            Deadline {
                scope: scope.to_string(),
                at,
            },
        );
    }

    pub fn cancel(&mut self, id: &RequestId) -> bool {
        self.pending.remove(id).is_some()
    }

    pub fn is_scheduled(&self, id: &RequestId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|deadline| deadline.at).min()
    }

    /// Removes every entry due at `now`, earliest deadline first.
    pub fn take_due(&mut self, now: Instant) -> Vec<(RequestId, String)> {
        let mut due = Vec::new();
        self.pending.retain(|id, deadline| {
            if deadline.at > now {
                return true;
            }
            due.push((deadline.at, id.clone(), deadline.scope.clone()));
            false
        });
        due.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        due.into_iter().map(|(_, id, scope)| (id, scope)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn only_due_entries_are_taken_in_deadline_order() {
        let mut evictions = Evictions::default();
        let start = Instant::now();
        let late = RequestId::generate();
        let early = RequestId::generate();
        let pending = RequestId::generate();
        evictions.schedule(late.clone(), "default", start + Duration::from_millis(20));
        evictions.schedule(early.clone(), "secondary", start + Duration::from_millis(10));
        evictions.schedule(pending.clone(), "default", start + Duration::from_millis(90));

        assert!(evictions.take_due(start).is_empty());
        assert_eq!(
            evictions.take_due(start + Duration::from_millis(50)),
            vec![(early, "secondary".to_string()), (late, "default".to_string())]
        );
        assert!(evictions.is_scheduled(&pending));
        assert_eq!(
            evictions.next_deadline(),
            Some(start + Duration::from_millis(90))
        );
    }

    #[test]
    fn rescheduling_replaces_the_deadline() {
        let mut evictions = Evictions::default();
        let start = Instant::now();
        let id = RequestId::generate();
        evictions.schedule(id.clone(), "default", start);
        evictions.schedule(id.clone(), "default", start + Duration::from_secs(1));

        assert!(evictions.take_due(start).is_empty());
        assert!(evictions.cancel(&id));
        assert!(!evictions.cancel(&id));
        assert_eq!(evictions.next_deadline(), None);
    }
}
