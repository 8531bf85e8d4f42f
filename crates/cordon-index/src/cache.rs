use dashmap::DashMap;

use cordon_core::ComponentIdentity;

/// Best-effort memoization of runtime location → component identity.
///
/// Filtering passes insert into this from many threads; inserts are
/// last-writer-wins and a duplicate or stale write is harmless because the
/// value is deterministically re-derivable from host-provided inputs.
/// The cache never influences a visibility decision for a given snapshot;
/// it exists so identity lookups keyed by location survive restarts when
/// the configuration collaborator persists it.
#[derive(Debug, Default)]
pub struct LocationCache {
    entries: DashMap<String, ComponentIdentity>,
}

impl LocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, location: impl Into<String>, identity: ComponentIdentity) {
        self.entries.insert(location.into(), identity);
    }

    pub fn lookup(&self, location: &str) -> Option<ComponentIdentity> {
        self.entries.get(location).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies the current contents out, sorted by location for
    /// deterministic persistence.
    pub fn entries(&self) -> Vec<(String, ComponentIdentity)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

impl FromIterator<(String, ComponentIdentity)> for LocationCache {
    fn from_iter<I: IntoIterator<Item = (String, ComponentIdentity)>>(iter: I) -> Self {
        let cache = Self::new();
        for (location, identity) in iter {
            cache.record(location, identity);
        }
        cache
    }
}
