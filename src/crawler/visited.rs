use crate::vk::Identity;
use dashmap::DashSet;

/// Identities already expanded during one crawl.
///
/// Membership only grows. [`mark`](Self::mark) is an atomic insert-if-absent,
/// so two concurrent expansions can never both claim the same identity.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: DashSet<Identity>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for expansion. Returns `false` if it was already claimed.
    pub fn mark(&self, id: Identity) -> bool {
        self.inner.insert(id)
    }

    pub fn contains(&self, id: Identity) -> bool {
        self.inner.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
