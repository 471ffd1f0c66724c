//! Engine-boundary error types.
//!
//! Every failure in this crate is contained at the boundary it occurs on: a
//! failing provider or an unreadable reference makes that *source* absent
//! from the current pass, never the pass itself fail. A recomputation pass
//! has exactly three outcomes (published, stale, or cancelled), so none of
//! these errors ever crosses the engine's public surface as a rejection.

use quickdiff_core::ResourceId;

/// An error returned by a quick-diff source provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider cannot serve this document right now.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// The provider failed while resolving sources.
    #[error("provider failed: {0}")]
    Failed(String),
}

/// An error resolving reference content for a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// The reference resource does not exist.
    #[error("reference resource not found: {0}")]
    NotFound(ResourceId),
    /// The reference resource exists but could not be read.
    #[error("reference read failed for {resource}: {reason}")]
    Unreadable {
        /// The resource that failed to read.
        resource: ResourceId,
        /// Human-readable failure description.
        reason: String,
    },
}
