//! Quick-diff sources and resource identity.
//!
//! A *source* is one independent reference version of a document's content to
//! diff against (a VCS HEAD version, a staged/index version, or a baseline
//! contributed by a third-party integration). A document can have zero or
//! more sources at a time; the set is re-resolved on every recomputation and
//! may change while the document is open.

use std::fmt;

/// Canonicalized identity of a document or reference resource.
///
/// Resource ids key the reference snapshot cache, so two spellings of the
/// same resource must canonicalize to the same value. Canonicalization
/// policy:
///
/// - the scheme (everything before the first `':'`) is lowercased
/// - a single trailing `'/'` is stripped
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a canonicalized resource id from a raw identifier.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(canonicalize(raw.as_ref()))
    }

    /// The canonical textual form of this id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonicalize(raw: &str) -> String {
    let mut out = match raw.split_once(':') {
        Some((scheme, rest)) if !scheme.is_empty() && scheme.chars().all(is_scheme_char) => {
            let mut s = scheme.to_ascii_lowercase();
            s.push(':');
            s.push_str(rest);
            s
        }
        _ => raw.to_string(),
    };
    if out.len() > 1 && out.ends_with('/') && !out.ends_with("//") {
        out.pop();
    }
    out
}

fn is_scheme_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.')
}

/// The kind of a quick-diff source.
///
/// The kind controls overlap resolution: primary hunks can suppress
/// textually identical secondary hunks from the display list, while
/// contributed sources never participate in suppression on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    /// The main reference version (e.g. VCS HEAD).
    Primary,
    /// A subordinate reference version (e.g. the staged/index version).
    Secondary,
    /// A baseline contributed by a third-party integration.
    Contributed,
}

impl SourceKind {
    /// Returns `true` for [`SourceKind::Primary`].
    pub fn is_primary(self) -> bool {
        matches!(self, Self::Primary)
    }
}

/// One reference version of a document to diff against.
///
/// Identity is `id`. `original_resource` may point at different reference
/// content across recomputations (for example after a commit moves HEAD),
/// so it must never be used as the identity of the source itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuickDiffSource {
    /// Stable identity of the source.
    pub id: String,
    /// The resource currently holding this source's reference content.
    pub original_resource: ResourceId,
    /// Overlap-resolution kind.
    pub kind: SourceKind,
    /// Human-readable label (e.g. "Git HEAD", "Staged changes").
    pub label: String,
    /// Whether the source is currently shown. Hidden sources still diff and
    /// still appear in the change lists; navigation treats them as
    /// transparent.
    pub visible: bool,
}

impl QuickDiffSource {
    /// Create a visible source.
    pub fn new(
        id: impl Into<String>,
        original_resource: ResourceId,
        kind: SourceKind,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            original_resource,
            kind,
            label: label.into(),
            visible: true,
        }
    }
}
