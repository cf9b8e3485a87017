use std::collections::HashMap;

/// Counts mounted providers per scope.
#[derive(Default)]
pub(crate) struct InstanceGuard {
    counts: HashMap<String, usize>,
}

impl InstanceGuard {
    pub fn enter(&mut self, scope: &str) -> usize {
        let count = self.counts.entry(scope.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn exit(&mut self, scope: &str) -> usize {
        let Some(count) = self.counts.get_mut(scope) else {
            return 0;
        };
        *count = count.saturating_sub(1);
        let remaining = *count;
        if remaining == 0 {
            self.counts.remove(scope);
        }
        remaining
    }

    pub fn count(&self, scope: &str) -> usize {
        self.counts.get(scope).copied().unwrap_or(0)
    }
}
