//! Index data model for region-compartmentalized visibility.
//!
//! An [`IndexSnapshot`] is a frozen view of the feature model for one
//! configuration generation: which artifacts a component identity is known
//! under, which features own those artifacts, which regions each feature
//! declares (in inheritance order), and which packages each region exports.
//! Reconfiguration builds a new snapshot and swaps it through a
//! [`SnapshotHandle`]; snapshots are never mutated in place, so any number
//! of concurrent filtering passes can read one without synchronization.

mod cache;
mod snapshot;

pub use cache::LocationCache;
pub use snapshot::{IndexSnapshot, Membership, SnapshotBuilder};

use std::sync::Arc;

use parking_lot::RwLock;

/// Shared handle to the current [`IndexSnapshot`].
///
/// `current` hands out an `Arc` clone, so an in-flight filtering pass keeps
/// observing the snapshot it started with even if [`SnapshotHandle::replace`]
/// installs a new generation mid-pass. Readers never see a partially
/// updated index.
#[derive(Debug)]
pub struct SnapshotHandle {
    inner: RwLock<Arc<IndexSnapshot>>,
}

impl SnapshotHandle {
    pub fn new(snapshot: IndexSnapshot) -> Self {
        Self {
            inner: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn current(&self) -> Arc<IndexSnapshot> {
        self.inner.read().clone()
    }

    /// Installs a new snapshot generation, returning the superseded one.
    pub fn replace(&self, snapshot: IndexSnapshot) -> Arc<IndexSnapshot> {
        let mut guard = self.inner.write();
        std::mem::replace(&mut *guard, Arc::new(snapshot))
    }
}
