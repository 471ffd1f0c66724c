//! The live-document boundary.
//!
//! The engine never owns the text buffer it diffs; the host editor does.
//! [`TextDocument`] is the narrow, read-only view the engine needs: cheap
//! synchronous access to identity, a monotonically increasing version
//! counter for stale-result detection, and the current full text.

use quickdiff_core::{EncodingLabel, ResourceId};

/// Read-only view of a live, mutable text buffer.
///
/// Implementations must be cheap to query: the engine reads `version` and
/// `is_disposed` after every suspension point of a pass, and `text` once
/// per pass.
pub trait TextDocument: Send + Sync {
    /// Canonical identity of the document resource.
    fn id(&self) -> ResourceId;

    /// The document's language id (e.g. `"rust"`), for source providers
    /// that scope themselves by language.
    fn language_id(&self) -> String;

    /// `true` once the buffer content is in sync with its backing store.
    /// Providers may decline to serve unsynchronized documents.
    fn is_synchronized(&self) -> bool;

    /// `true` once the document has been closed. A disposed document
    /// resolves no sources and publishes no further change sets.
    fn is_disposed(&self) -> bool;

    /// Monotonically increasing content version. A pass publishes only if
    /// the version it started from is still current.
    fn version(&self) -> u64;

    /// The current full text of the buffer.
    fn text(&self) -> String;

    /// The encoding override the document was opened with, if any. Applied
    /// to non-dirty reference snapshots on acquisition.
    fn encoding(&self) -> Option<EncodingLabel>;
}
