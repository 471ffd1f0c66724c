//! Host-environment boundaries: source providers, reference content, and
//! the provider registry.
//!
//! Providers are contributed by the host (an SCM integration, a third-party
//! extension); the registry tracks the current provider set and per-source
//! visibility toggles. Visibility is a pure view concern: toggling it fires
//! a notification but never triggers a recomputation, and it never changes
//! the published change lists.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use quickdiff_core::{QuickDiffSource, ResourceId};

use crate::document::TextDocument;
use crate::error::{ProviderError, ReferenceError};
use crate::events::{EventEmitter, Subscription};

pub use quickdiff_core::ReferenceContent;

/// A contributor of quick-diff sources for documents.
#[async_trait]
pub trait QuickDiffSourceProvider: Send + Sync {
    /// The sources this provider contributes for `document`, or an error if
    /// the provider cannot answer. Errors are contained by the resolver:
    /// they make this provider's sources absent, nothing more.
    async fn quick_diffs(
        &self,
        document: &dyn TextDocument,
    ) -> Result<Vec<QuickDiffSource>, ProviderError>;
}

/// Resolves a reference resource id to readable text content.
#[async_trait]
pub trait ReferenceContentResolver: Send + Sync {
    /// Load the content behind `resource`.
    async fn resolve(&self, resource: &ResourceId) -> Result<ReferenceContent, ReferenceError>;
}

/// Answers whether a document is currently owned by a mutually exclusive
/// editing session (e.g. an in-flight automated edit). Quick diff is
/// suppressed for such documents.
pub trait ExclusiveEditQuery: Send + Sync {
    /// `true` while `document` is under an exclusive editing session.
    fn is_under_exclusive_edit(&self, document: &ResourceId) -> bool;
}

/// An [`ExclusiveEditQuery`] for hosts without exclusive editing sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExclusiveEdits;

impl ExclusiveEditQuery for NoExclusiveEdits {
    fn is_under_exclusive_edit(&self, _document: &ResourceId) -> bool {
        false
    }
}

struct RegistryInner {
    providers: Vec<Arc<dyn QuickDiffSourceProvider>>,
    hidden: HashSet<String>,
}

/// The process-wide set of quick-diff source providers plus per-source
/// visibility state.
pub struct SourceProviderRegistry {
    inner: Mutex<RegistryInner>,
    providers_changed: EventEmitter<()>,
    visibility_changed: EventEmitter<String>,
}

impl Default for SourceProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                providers: Vec::new(),
                hidden: HashSet::new(),
            }),
            providers_changed: EventEmitter::new(),
            visibility_changed: EventEmitter::new(),
        }
    }

    /// Register a provider and notify provider-list subscribers.
    pub fn register_provider(&self, provider: Arc<dyn QuickDiffSourceProvider>) {
        self.inner.lock().providers.push(provider);
        self.providers_changed.emit(&());
    }

    /// The current providers, in registration order.
    pub fn providers(&self) -> Vec<Arc<dyn QuickDiffSourceProvider>> {
        self.inner.lock().providers.clone()
    }

    /// `true` unless the source has been toggled invisible.
    pub fn is_provider_visible(&self, source_id: &str) -> bool {
        !self.inner.lock().hidden.contains(source_id)
    }

    /// Flip a source's visibility and notify visibility subscribers.
    ///
    /// This is a view-layer toggle: it does not schedule a recomputation
    /// and does not alter published change lists.
    pub fn toggle_provider_visibility(&self, source_id: &str) {
        {
            let mut inner = self.inner.lock();
            if !inner.hidden.remove(source_id) {
                inner.hidden.insert(source_id.to_string());
            }
        }
        self.visibility_changed.emit(&source_id.to_string());
    }

    /// Subscribe to provider-list changes.
    pub fn on_providers_changed<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&()) + Send + 'static,
    {
        self.providers_changed.subscribe(callback)
    }

    /// Subscribe to visibility toggles; the payload is the source id.
    pub fn on_visibility_changed<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&String) + Send + 'static,
    {
        self.visibility_changed.subscribe(callback)
    }
}
