mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use quickdiff_engine::{
    NoExclusiveEdits, QuickDiffConfig, QuickDiffEngine, ReferenceContent, ReferenceModelCache,
    SourceProviderRegistry,
};

use common::{MapResolver, MemoryDocument, StaticProvider, head_source, index_source, settle};

fn numbered_lines(count: usize) -> String {
    let mut out = String::new();
    for i in 0..count {
        out.push_str(&format!("line {i}\n"));
    }
    out
}

struct Fixture {
    engine: QuickDiffEngine,
    provider: Arc<StaticProvider>,
    registry: Arc<SourceProviderRegistry>,
}

/// Two sources with hunks in different places: head at line 5, index at
/// line 12.
async fn two_source_fixture() -> Fixture {
    let head = numbered_lines(20).replace("line 5\n", "head five\n");
    let index = numbered_lines(20).replace("line 12\n", "index twelve\n");
    let modified = numbered_lines(20);

    let resolver = MapResolver::new();
    resolver.insert("git:/repo/v~head", ReferenceContent::clean(&head));
    resolver.insert("git:/repo/v~index", ReferenceContent::clean(&index));

    let provider = StaticProvider::new(vec![
        head_source("git:/repo/v~head"),
        index_source("git:/repo/v~index"),
    ]);
    let registry = Arc::new(SourceProviderRegistry::new());
    registry.register_provider(provider.clone());

    let document = MemoryDocument::new("file:///v.txt", &modified);
    let cache = Arc::new(ReferenceModelCache::new(resolver));
    let engine = QuickDiffEngine::new(
        document,
        Arc::clone(&registry),
        cache,
        Arc::new(NoExclusiveEdits),
        QuickDiffConfig::default(),
    );
    settle().await;

    Fixture {
        engine,
        provider,
        registry,
    }
}

/// Toggling a source invisible filters navigation without recomputing and
/// without touching the published lists.
#[tokio::test(start_paused = true)]
async fn test_visibility_toggle_filters_navigation_without_recompute() {
    let fixture = two_source_fixture().await;
    let engine = &fixture.engine;

    // changes[0] = head @5, changes[1] = index @12.
    assert_eq!(engine.changes().len(), 2);
    let passes_before = fixture.provider.call_count();

    // Forward from line 6 normally lands on the index change.
    assert_eq!(engine.find_next_closest_change(6, false, None), 1);

    fixture.registry.toggle_provider_visibility("index");
    settle().await;

    // No recomputation and unchanged lists.
    assert_eq!(fixture.provider.call_count(), passes_before);
    assert_eq!(engine.changes().len(), 2);
    assert_eq!(engine.all_changes().len(), 2);

    // Navigation treats the hidden source as transparent, inclusive and
    // exclusive alike, wrapping to the head change.
    assert_eq!(engine.find_next_closest_change(6, false, None), 0);
    assert_eq!(engine.find_next_closest_change(12, true, None), 0);
    assert_eq!(engine.find_previous_closest_change(20, false, None), 0);

    // The published source list reflects the toggle.
    let sources = engine.quick_diffs();
    let index = sources.iter().find(|source| source.id == "index").unwrap();
    assert!(!index.visible);

    // Toggling back restores navigation with no recomputation.
    fixture.registry.toggle_provider_visibility("index");
    assert_eq!(engine.find_next_closest_change(6, false, None), 1);
    assert_eq!(fixture.provider.call_count(), passes_before);

    engine.dispose();
}

/// Source-filtered navigation stays within the requested source.
#[tokio::test(start_paused = true)]
async fn test_source_filtered_navigation() {
    let fixture = two_source_fixture().await;
    let engine = &fixture.engine;

    assert_eq!(engine.find_next_closest_change(0, false, Some("index")), 1);
    // Wraparound within the filtered source.
    assert_eq!(engine.find_next_closest_change(15, false, Some("index")), 1);
    assert_eq!(engine.find_previous_closest_change(3, false, Some("head")), 0);

    engine.dispose();
}

/// Exclusive and inclusive wraparound across the whole list.
#[tokio::test(start_paused = true)]
async fn test_navigation_wraparound_over_published_changes() {
    let fixture = two_source_fixture().await;
    let engine = &fixture.engine;

    // Past the last change: wrap to the first.
    assert_eq!(engine.find_next_closest_change(19, false, None), 0);
    // Before the first change: wrap to the last.
    assert_eq!(engine.find_previous_closest_change(0, false, None), 1);

    engine.dispose();
}
