//! Reference-counted cache of reference snapshots.
//!
//! One process-wide cache serves every engine instance: multiple editors of
//! one document, and multiple documents sharing a reference resource, all
//! share a single snapshot per canonical resource id. A snapshot stays
//! resident while at least one [`SnapshotLease`] is alive and is freed when
//! the last lease drops.
//!
//! The entry map is guarded by a mutex that is never held across an await:
//! content resolution happens unlocked, and a lost insertion race simply
//! adopts the snapshot the winner inserted. Release is a plain map
//! operation, so a callback acquiring during another lease's release cannot
//! corrupt the counts.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use quickdiff_core::{EncodingLabel, QuickDiffSource, ReferenceSnapshot, ResourceId};

use crate::error::ReferenceError;
use crate::provider::ReferenceContentResolver;

struct CacheEntry {
    snapshot: Arc<ReferenceSnapshot>,
    leases: usize,
}

/// Process-wide reference snapshot cache.
pub struct ReferenceModelCache {
    resolver: Arc<dyn ReferenceContentResolver>,
    entries: Mutex<HashMap<ResourceId, CacheEntry>>,
}

impl ReferenceModelCache {
    /// Create a cache resolving content through `resolver`.
    pub fn new(resolver: Arc<dyn ReferenceContentResolver>) -> Self {
        Self {
            resolver,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire a lease on the snapshot for `source`'s reference resource,
    /// loading it on first acquisition.
    ///
    /// When the live document carries an encoding override and the snapshot
    /// is not dirty, the override is applied before the lease is returned,
    /// keeping encoding-sensitive comparisons consistent between live and
    /// reference content.
    ///
    /// Failures are per-source facts ("no diff available from this source
    /// this pass"), not engine failures.
    pub async fn acquire(
        self: &Arc<Self>,
        source: &QuickDiffSource,
        encoding_override: Option<&EncodingLabel>,
    ) -> Result<SnapshotLease, ReferenceError> {
        let resource = source.original_resource.clone();

        let existing = {
            let mut entries = self.entries.lock();
            entries.get_mut(&resource).map(|entry| {
                entry.leases += 1;
                Arc::clone(&entry.snapshot)
            })
        };

        let snapshot = match existing {
            Some(snapshot) => snapshot,
            None => {
                // Resolve unlocked; re-check for a racing insertion after.
                let content = self.resolver.resolve(&resource).await?;
                let loaded = Arc::new(ReferenceSnapshot::from_content(resource.clone(), &content));

                let mut entries = self.entries.lock();
                match entries.get_mut(&resource) {
                    Some(entry) => {
                        entry.leases += 1;
                        Arc::clone(&entry.snapshot)
                    }
                    None => {
                        debug!(%resource, "caching reference snapshot");
                        entries.insert(
                            resource.clone(),
                            CacheEntry {
                                snapshot: Arc::clone(&loaded),
                                leases: 1,
                            },
                        );
                        loaded
                    }
                }
            }
        };

        if let Some(label) = encoding_override {
            snapshot.apply_encoding(label);
        }

        Ok(SnapshotLease {
            cache: Arc::clone(self),
            resource,
            snapshot,
        })
    }

    /// Number of live leases on `resource`. Primarily for tests.
    pub fn lease_count(&self, resource: &ResourceId) -> usize {
        self.entries
            .lock()
            .get(resource)
            .map_or(0, |entry| entry.leases)
    }

    /// Number of resident snapshots. Primarily for tests.
    pub fn resident_count(&self) -> usize {
        self.entries.lock().len()
    }

    fn release(&self, resource: &ResourceId) {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(resource) else {
            debug_assert!(false, "released a lease on an unknown resource");
            return;
        };
        entry.leases -= 1;
        if entry.leases == 0 {
            entries.remove(resource);
            debug!(%resource, "evicting reference snapshot");
        }
    }
}

/// A reference-counted handle on a cached snapshot.
///
/// Dropping the lease releases it; the snapshot is freed when its last
/// lease is gone.
pub struct SnapshotLease {
    cache: Arc<ReferenceModelCache>,
    resource: ResourceId,
    snapshot: Arc<ReferenceSnapshot>,
}

impl SnapshotLease {
    /// The leased snapshot.
    pub fn snapshot(&self) -> &Arc<ReferenceSnapshot> {
        &self.snapshot
    }

    /// The canonical resource this lease is on.
    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }
}

impl Drop for SnapshotLease {
    fn drop(&mut self) {
        self.cache.release(&self.resource);
    }
}

impl std::fmt::Debug for SnapshotLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotLease")
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}
