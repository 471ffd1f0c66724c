//! Shared fixtures for the engine integration tests.
#![allow(dead_code)]


use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use quickdiff_core::{EncodingLabel, QuickDiffSource, ResourceId, SourceKind};
use quickdiff_engine::{
    ChangeEvent, ProviderError, QuickDiffEngine, QuickDiffSourceProvider, ReferenceContent,
    ReferenceContentResolver, ReferenceError, TextDocument,
};

/// An in-memory live document with a bumping version counter.
pub struct MemoryDocument {
    id: ResourceId,
    text: Mutex<String>,
    version: AtomicU64,
    disposed: AtomicBool,
    encoding: Mutex<Option<EncodingLabel>>,
}

impl MemoryDocument {
    pub fn new(id: &str, text: &str) -> Arc<Self> {
        Arc::new(Self {
            id: ResourceId::new(id),
            text: Mutex::new(text.to_string()),
            version: AtomicU64::new(1),
            disposed: AtomicBool::new(false),
            encoding: Mutex::new(None),
        })
    }

    pub fn set_text(&self, text: &str) {
        *self.text.lock().unwrap() = text.to_string();
        self.version.fetch_add(1, Ordering::SeqCst);
    }

    pub fn set_encoding(&self, label: EncodingLabel) {
        *self.encoding.lock().unwrap() = Some(label);
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }
}

impl TextDocument for MemoryDocument {
    fn id(&self) -> ResourceId {
        self.id.clone()
    }
    fn language_id(&self) -> String {
        "plaintext".to_string()
    }
    fn is_synchronized(&self) -> bool {
        true
    }
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
    fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
    fn text(&self) -> String {
        self.text.lock().unwrap().clone()
    }
    fn encoding(&self) -> Option<EncodingLabel> {
        self.encoding.lock().unwrap().clone()
    }
}

/// A provider serving a fixed source list, counting calls (one per pass).
pub struct StaticProvider {
    sources: Mutex<Vec<QuickDiffSource>>,
    pub calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(sources: Vec<QuickDiffSource>) -> Arc<Self> {
        Arc::new(Self {
            sources: Mutex::new(sources),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuickDiffSourceProvider for StaticProvider {
    async fn quick_diffs(
        &self,
        _document: &dyn TextDocument,
    ) -> Result<Vec<QuickDiffSource>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.sources.lock().unwrap().clone())
    }
}

/// A provider that always fails.
pub struct FailingProvider;

#[async_trait]
impl QuickDiffSourceProvider for FailingProvider {
    async fn quick_diffs(
        &self,
        _document: &dyn TextDocument,
    ) -> Result<Vec<QuickDiffSource>, ProviderError> {
        Err(ProviderError::Failed("backend offline".to_string()))
    }
}

/// A content resolver over a fixed map, with an optional per-resolution
/// delay for mid-pass interleaving tests.
pub struct MapResolver {
    contents: Mutex<HashMap<ResourceId, ReferenceContent>>,
    delay: Option<Duration>,
    pub resolutions: AtomicUsize,
}

impl MapResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            contents: Mutex::new(HashMap::new()),
            delay: None,
            resolutions: AtomicUsize::new(0),
        })
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            contents: Mutex::new(HashMap::new()),
            delay: Some(delay),
            resolutions: AtomicUsize::new(0),
        })
    }

    pub fn insert(&self, resource: &str, content: ReferenceContent) {
        self.contents
            .lock()
            .unwrap()
            .insert(ResourceId::new(resource), content);
    }
}

#[async_trait]
impl ReferenceContentResolver for MapResolver {
    async fn resolve(&self, resource: &ResourceId) -> Result<ReferenceContent, ReferenceError> {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.contents
            .lock()
            .unwrap()
            .get(resource)
            .cloned()
            .ok_or_else(|| ReferenceError::NotFound(resource.clone()))
    }
}

pub fn head_source(resource: &str) -> QuickDiffSource {
    QuickDiffSource::new("head", ResourceId::new(resource), SourceKind::Primary, "Git HEAD")
}

pub fn index_source(resource: &str) -> QuickDiffSource {
    QuickDiffSource::new(
        "index",
        ResourceId::new(resource),
        SourceKind::Secondary,
        "Staged changes",
    )
}

/// Record published events for assertions.
pub fn record_events(engine: &QuickDiffEngine) -> Arc<Mutex<Vec<ChangeEvent>>> {
    let events: Arc<Mutex<Vec<ChangeEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    // The subscription stays attached for the engine's lifetime.
    drop(engine.on_did_change(move |event| {
        sink.lock().unwrap().push(event.clone());
    }));
    events
}

/// Drive virtual time past the quiescence window (and any fixture delays)
/// so in-flight scheduler work completes.
pub async fn settle() {
    for _ in 0..8 {
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
