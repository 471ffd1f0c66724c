//! The quick-diff engine: per-document orchestration of recomputation
//! passes.
//!
//! One engine instance is created per open document and lives until the
//! document closes. Edit, configuration, and source-list events all funnel
//! into a single trigger slot; a scheduler task sleeps out a quiescence
//! window so edit bursts collapse into one pass, runs at most one pass at a
//! time, and re-runs once when triggered mid-pass. A pass walks
//! resolve → acquire → compute → merge and publishes a fresh [`ChangeSet`],
//! unless it turned stale (document changed or disposed underneath it) or
//! the engine was disposed, in which case the result is silently dropped
//! and every lease taken during the pass is released.
//!
//! Publication order equals pass completion order; passes never complete
//! out of order because the scheduler is strictly sequential.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use quickdiff_core::{
    ChangeDelta, ChangeSet, MergedChange, QuickDiffSource, RawChange, ReferenceSnapshot,
    ResourceId, SourceDiff, merge_source_diffs, navigation,
};

use crate::cache::{ReferenceModelCache, SnapshotLease};
use crate::compute::{ComputeOptions, DiffComputeClient};
use crate::config::QuickDiffConfig;
use crate::document::TextDocument;
use crate::events::{EventEmitter, Subscription};
use crate::provider::{ExclusiveEditQuery, SourceProviderRegistry};
use crate::resolver::SourceResolver;

/// Payload of a publication event.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// The new display list.
    pub changes: Vec<MergedChange>,
    /// Edit script from the previously published display list, for
    /// incremental decoration updates.
    pub delta: ChangeDelta,
}

/// The original/modified pair backing a side-by-side diff editor for one
/// source.
#[derive(Debug, Clone)]
pub struct DiffEditorModel {
    /// The source the pair belongs to.
    pub source: QuickDiffSource,
    /// The reference snapshot on the original side.
    pub original: Arc<ReferenceSnapshot>,
    /// The live document resource on the modified side.
    pub modified: ResourceId,
}

struct EngineState {
    change_set: ChangeSet,
    quick_diffs: Vec<QuickDiffSource>,
    leases: Vec<(String, SnapshotLease)>,
}

struct EngineInner {
    document: Arc<dyn TextDocument>,
    registry: Arc<SourceProviderRegistry>,
    cache: Arc<ReferenceModelCache>,
    resolver: SourceResolver,
    config: Mutex<QuickDiffConfig>,
    state: Mutex<EngineState>,
    dirty: AtomicBool,
    wakeup: Notify,
    cancel: CancellationToken,
    changed: EventEmitter<ChangeEvent>,
    registry_subscription: Mutex<Option<Subscription>>,
}

impl EngineInner {
    fn schedule(&self) {
        self.dirty.store(true, Ordering::SeqCst);
        self.wakeup.notify_one();
    }
}

/// Per-document quick-diff orchestrator.
///
/// Must be created inside a tokio runtime; the scheduler task it spawns
/// exits when the engine is disposed (or dropped).
pub struct QuickDiffEngine {
    inner: Arc<EngineInner>,
}

impl QuickDiffEngine {
    /// Create an engine for `document` and schedule the initial pass.
    pub fn new(
        document: Arc<dyn TextDocument>,
        registry: Arc<SourceProviderRegistry>,
        cache: Arc<ReferenceModelCache>,
        exclusive_edits: Arc<dyn ExclusiveEditQuery>,
        config: QuickDiffConfig,
    ) -> Self {
        let resolver = SourceResolver::new(Arc::clone(&registry), exclusive_edits);
        let inner = Arc::new(EngineInner {
            document,
            registry,
            cache,
            resolver,
            config: Mutex::new(config),
            state: Mutex::new(EngineState {
                change_set: ChangeSet::empty(),
                quick_diffs: Vec::new(),
                leases: Vec::new(),
            }),
            dirty: AtomicBool::new(false),
            wakeup: Notify::new(),
            cancel: CancellationToken::new(),
            changed: EventEmitter::new(),
            registry_subscription: Mutex::new(None),
        });

        // A provider registered or removed invalidates the source list.
        let weak = Arc::downgrade(&inner);
        let subscription = inner.registry.on_providers_changed(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.schedule();
            }
        });
        *inner.registry_subscription.lock() = Some(subscription);

        tokio::spawn(scheduler(Arc::clone(&inner)));
        inner.schedule();

        Self { inner }
    }

    /// Notify the engine that the document content changed.
    pub fn notify_document_changed(&self) {
        self.inner.schedule();
    }

    /// Notify the engine that the applicable source list may have changed.
    pub fn notify_sources_changed(&self) {
        self.inner.schedule();
    }

    /// Replace the configuration and schedule a recomputation.
    pub fn update_configuration(&self, config: QuickDiffConfig) {
        *self.inner.config.lock() = config;
        self.inner.schedule();
    }

    /// The current configuration.
    pub fn configuration(&self) -> QuickDiffConfig {
        self.inner.config.lock().clone()
    }

    /// Subscribe to publication events.
    pub fn on_did_change<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&ChangeEvent) + Send + 'static,
    {
        self.inner.changed.subscribe(callback)
    }

    /// The last published display list.
    pub fn changes(&self) -> Vec<MergedChange> {
        self.inner.state.lock().change_set.changes().to_vec()
    }

    /// The last published complete list (duplicates included).
    pub fn all_changes(&self) -> Vec<MergedChange> {
        self.inner.state.lock().change_set.all_changes().to_vec()
    }

    /// The last published change set.
    pub fn change_set(&self) -> ChangeSet {
        self.inner.state.lock().change_set.clone()
    }

    /// Per-source positions within [`QuickDiffEngine::changes`].
    pub fn source_index(&self) -> HashMap<String, Vec<usize>> {
        self.inner.state.lock().change_set.source_index().clone()
    }

    /// The sources of the last published pass, with visibility resolved
    /// against the registry's current toggles.
    pub fn quick_diffs(&self) -> Vec<QuickDiffSource> {
        let state = self.inner.state.lock();
        self.effective_sources(&state)
    }

    /// Index of the next closest change relative to `line`. See
    /// [`navigation::find_next_closest_change`].
    pub fn find_next_closest_change(
        &self,
        line: usize,
        inclusive: bool,
        source_filter: Option<&str>,
    ) -> usize {
        let state = self.inner.state.lock();
        let sources = self.effective_sources(&state);
        navigation::find_next_closest_change(
            state.change_set.changes(),
            &sources,
            line,
            inclusive,
            source_filter,
        )
    }

    /// Index of the previous closest change relative to `line`. See
    /// [`navigation::find_previous_closest_change`].
    pub fn find_previous_closest_change(
        &self,
        line: usize,
        inclusive: bool,
        source_filter: Option<&str>,
    ) -> usize {
        let state = self.inner.state.lock();
        let sources = self.effective_sources(&state);
        navigation::find_previous_closest_change(
            state.change_set.changes(),
            &sources,
            line,
            inclusive,
            source_filter,
        )
    }

    /// The original/modified pair for a side-by-side diff editor on
    /// `source_id`, if that source was part of the last published pass.
    pub fn diff_editor_model(&self, source_id: &str) -> Option<DiffEditorModel> {
        let state = self.inner.state.lock();
        let source = state
            .quick_diffs
            .iter()
            .find(|source| source.id == source_id)?
            .clone();
        let snapshot = state
            .leases
            .iter()
            .find(|(id, _)| id == source_id)
            .map(|(_, lease)| Arc::clone(lease.snapshot()))?;
        Some(DiffEditorModel {
            source,
            original: snapshot,
            modified: self.inner.document.id(),
        })
    }

    /// `true` once the engine was disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Dispose the engine: cancel any in-flight pass, release all leases,
    /// and clear published state. Idempotent.
    pub fn dispose(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.cancel.cancel();

        if let Some(subscription) = self.inner.registry_subscription.lock().take() {
            subscription.unsubscribe();
        }

        let leases = {
            let mut state = self.inner.state.lock();
            state.change_set = ChangeSet::empty();
            state.quick_diffs.clear();
            std::mem::take(&mut state.leases)
        };
        // Release outside the state lock.
        drop(leases);
        debug!(document = %self.inner.document.id(), "quick-diff engine disposed");
    }

    fn effective_sources(&self, state: &EngineState) -> Vec<QuickDiffSource> {
        state
            .quick_diffs
            .iter()
            .map(|source| {
                let mut source = source.clone();
                source.visible =
                    source.visible && self.inner.registry.is_provider_visible(&source.id);
                source
            })
            .collect()
    }
}

impl Drop for QuickDiffEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// The per-engine scheduler: waits for a trigger, sleeps out the quiescence
/// window, then runs one pass; loops while triggers keep arriving.
async fn scheduler(inner: Arc<EngineInner>) {
    loop {
        if inner.cancel.is_cancelled() {
            break;
        }
        if !inner.dirty.load(Ordering::SeqCst) {
            tokio::select! {
                _ = inner.cancel.cancelled() => break,
                _ = inner.wakeup.notified() => continue,
            }
        }

        let quiescence = inner.config.lock().quiescence();
        tokio::select! {
            _ = inner.cancel.cancelled() => break,
            _ = tokio::time::sleep(quiescence) => {}
        }

        // The pass reads the document as of now; triggers that arrive from
        // here on schedule a follow-up.
        inner.dirty.store(false, Ordering::SeqCst);
        run_pass(&inner).await;
    }
}

/// One resolve → acquire → compute → merge → publish cycle.
async fn run_pass(inner: &Arc<EngineInner>) {
    let document = &inner.document;
    if inner.cancel.is_cancelled() || document.is_disposed() {
        return;
    }
    let started_version = document.version();
    let config = inner.config.lock().clone();

    let sources = inner.resolver.resolve(document.as_ref()).await;
    if pass_interrupted(inner, started_version) {
        return;
    }

    let encoding = document.encoding();
    let mut acquired: Vec<(QuickDiffSource, SnapshotLease)> = Vec::with_capacity(sources.len());
    for source in sources {
        match inner.cache.acquire(&source, encoding.as_ref()).await {
            Ok(lease) => acquired.push((source, lease)),
            Err(error) => {
                warn!(source = %source.id, %error, "reference unavailable; skipping source");
            }
        }
        if inner.cancel.is_cancelled() {
            // Dropping `acquired` releases every lease taken so far.
            return;
        }
    }
    if pass_interrupted(inner, started_version) {
        return;
    }

    let modified_text = document.text();
    let client = DiffComputeClient::new(config.diff_algorithm);
    let options = ComputeOptions::from_config(&config);

    let computations = acquired.iter().map(|(source, lease)| {
        let client = &client;
        let options = &options;
        let modified_text = modified_text.as_str();
        async move {
            if !client.can_compute(lease.snapshot(), modified_text) {
                return None;
            }
            client
                .compute_one(source, lease.snapshot(), modified_text, options)
                .await
        }
    });
    let results: Vec<Option<Vec<RawChange>>> = join_all(computations).await;
    if pass_interrupted(inner, started_version) {
        return;
    }

    let mut diffs = Vec::with_capacity(acquired.len());
    for ((source, lease), result) in acquired.iter().zip(results) {
        match result {
            Some(changes) => diffs.push(SourceDiff {
                source: source.clone(),
                snapshot: Arc::clone(lease.snapshot()),
                changes,
            }),
            None => debug!(source = %source.id, "diff unavailable for this pass"),
        }
    }

    let merged = std::panic::catch_unwind(AssertUnwindSafe(|| {
        merge_source_diffs(&document.id(), &diffs)
    }));
    let change_set = match merged {
        Ok(change_set) => change_set,
        Err(_) => {
            error!(document = %document.id(), "overlap merge panicked; keeping previous change set");
            return;
        }
    };

    if pass_interrupted(inner, started_version) {
        debug!(document = %document.id(), "discarding stale pass");
        return;
    }

    let (event, old_leases) = {
        let mut state = inner.state.lock();
        let delta = ChangeDelta::between(state.change_set.changes(), change_set.changes());
        let quick_diffs: Vec<QuickDiffSource> =
            acquired.iter().map(|(source, _)| source.clone()).collect();
        let new_leases: Vec<(String, SnapshotLease)> = acquired
            .into_iter()
            .map(|(source, lease)| (source.id, lease))
            .collect();
        let old_leases = std::mem::replace(&mut state.leases, new_leases);
        state.quick_diffs = quick_diffs;
        state.change_set = change_set;
        let event = ChangeEvent {
            changes: state.change_set.changes().to_vec(),
            delta,
        };
        (event, old_leases)
    };
    // Leases from the superseded pass are released outside the state lock.
    drop(old_leases);

    debug!(
        document = %document.id(),
        changes = event.changes.len(),
        "published change set"
    );
    inner.changed.emit(&event);
}

fn pass_interrupted(inner: &EngineInner, started_version: u64) -> bool {
    inner.cancel.is_cancelled()
        || inner.document.is_disposed()
        || inner.document.version() != started_version
}
