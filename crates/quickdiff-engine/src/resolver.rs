//! Source resolution for one document.
//!
//! Resolution asks every registered provider which reference sources apply
//! to the document right now. Two hard preconditions short-circuit to an
//! empty source list: a disposed document, and a document owned by a
//! mutually exclusive editing session (diffing against a buffer that a
//! session is still constructing would only produce churn).

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use quickdiff_core::QuickDiffSource;

use crate::document::TextDocument;
use crate::provider::{ExclusiveEditQuery, SourceProviderRegistry};

/// Resolves the applicable quick-diff sources for a document.
pub struct SourceResolver {
    registry: Arc<SourceProviderRegistry>,
    exclusive_edits: Arc<dyn ExclusiveEditQuery>,
}

impl SourceResolver {
    /// Create a resolver over the given registry and exclusive-edit query.
    pub fn new(
        registry: Arc<SourceProviderRegistry>,
        exclusive_edits: Arc<dyn ExclusiveEditQuery>,
    ) -> Self {
        Self {
            registry,
            exclusive_edits,
        }
    }

    /// Resolve the current source list for `document`.
    ///
    /// Never fails: a provider error makes that provider's sources absent
    /// (logged at `warn`), and duplicate source ids keep their first
    /// occurrence. Returns `[]` for disposed documents and documents under
    /// an exclusive editing session.
    pub async fn resolve(&self, document: &dyn TextDocument) -> Vec<QuickDiffSource> {
        if document.is_disposed() {
            return Vec::new();
        }
        if self
            .exclusive_edits
            .is_under_exclusive_edit(&document.id())
        {
            return Vec::new();
        }

        let mut sources = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for provider in self.registry.providers() {
            match provider.quick_diffs(document).await {
                Ok(provided) => {
                    for source in provided {
                        if seen.insert(source.id.clone()) {
                            sources.push(source);
                        }
                    }
                }
                Err(error) => {
                    warn!(document = %document.id(), %error, "quick-diff provider failed; skipping");
                }
            }
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quickdiff_core::{EncodingLabel, ResourceId, SourceKind};

    use crate::error::ProviderError;
    use crate::provider::{NoExclusiveEdits, QuickDiffSourceProvider};

    struct FixedDocument {
        disposed: bool,
    }

    impl TextDocument for FixedDocument {
        fn id(&self) -> ResourceId {
            ResourceId::new("file:///doc.txt")
        }
        fn language_id(&self) -> String {
            "plaintext".to_string()
        }
        fn is_synchronized(&self) -> bool {
            true
        }
        fn is_disposed(&self) -> bool {
            self.disposed
        }
        fn version(&self) -> u64 {
            1
        }
        fn text(&self) -> String {
            String::new()
        }
        fn encoding(&self) -> Option<EncodingLabel> {
            None
        }
    }

    struct FixedProvider(Vec<QuickDiffSource>);

    #[async_trait]
    impl QuickDiffSourceProvider for FixedProvider {
        async fn quick_diffs(
            &self,
            _document: &dyn TextDocument,
        ) -> Result<Vec<QuickDiffSource>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl QuickDiffSourceProvider for FailingProvider {
        async fn quick_diffs(
            &self,
            _document: &dyn TextDocument,
        ) -> Result<Vec<QuickDiffSource>, ProviderError> {
            Err(ProviderError::Failed("backend offline".to_string()))
        }
    }

    struct ExclusiveAlways;

    impl ExclusiveEditQuery for ExclusiveAlways {
        fn is_under_exclusive_edit(&self, _document: &ResourceId) -> bool {
            true
        }
    }

    fn head_source() -> QuickDiffSource {
        QuickDiffSource::new(
            "head",
            ResourceId::new("git:/repo/doc.txt"),
            SourceKind::Primary,
            "Git HEAD",
        )
    }

    #[tokio::test]
    async fn test_failing_provider_does_not_fail_resolution() {
        let registry = Arc::new(SourceProviderRegistry::new());
        registry.register_provider(Arc::new(FailingProvider));
        registry.register_provider(Arc::new(FixedProvider(vec![head_source()])));

        let resolver = SourceResolver::new(registry, Arc::new(NoExclusiveEdits));
        let sources = resolver.resolve(&FixedDocument { disposed: false }).await;
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id, "head");
    }

    #[tokio::test]
    async fn test_disposed_document_resolves_to_empty() {
        let registry = Arc::new(SourceProviderRegistry::new());
        registry.register_provider(Arc::new(FixedProvider(vec![head_source()])));

        let resolver = SourceResolver::new(registry, Arc::new(NoExclusiveEdits));
        assert!(resolver.resolve(&FixedDocument { disposed: true }).await.is_empty());
    }

    #[tokio::test]
    async fn test_exclusive_edit_session_suppresses_resolution() {
        let registry = Arc::new(SourceProviderRegistry::new());
        registry.register_provider(Arc::new(FixedProvider(vec![head_source()])));

        let resolver = SourceResolver::new(registry, Arc::new(ExclusiveAlways));
        assert!(resolver.resolve(&FixedDocument { disposed: false }).await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_source_ids_keep_first_occurrence() {
        let registry = Arc::new(SourceProviderRegistry::new());
        registry.register_provider(Arc::new(FixedProvider(vec![head_source()])));
        registry.register_provider(Arc::new(FixedProvider(vec![QuickDiffSource::new(
            "head",
            ResourceId::new("git:/other"),
            SourceKind::Secondary,
            "shadow",
        )])));

        let resolver = SourceResolver::new(registry, Arc::new(NoExclusiveEdits));
        let sources = resolver.resolve(&FixedDocument { disposed: false }).await;
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].kind, SourceKind::Primary);
    }
}
