//! Read-only reference snapshots.
//!
//! A [`ReferenceSnapshot`] holds one resolved reference version of a
//! document (the "original" side of a quick diff) as a rope, giving the
//! merge layer O(log n) line access when it materializes original text for
//! duplicate-suppression checks.
//!
//! Content is LF-normalized on load; the original [`LineEnding`] is
//! recorded. Snapshots are shared behind `Arc` by the reference cache and
//! are never mutated after construction, with one exception: the encoding
//! label of the live document may be applied to a non-dirty snapshot on
//! acquisition (see [`ReferenceSnapshot::apply_encoding`]).

use std::sync::RwLock;

use ropey::Rope;

use crate::change::LineRange;
use crate::encoding::{EncodingLabel, LineEnding};
use crate::source::ResourceId;

/// Resolved reference content, as produced by a reference content resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceContent {
    /// The full reference text.
    pub text: String,
    /// `true` if the reference is backed by a document with unsaved local
    /// edits. Dirty references never receive the live document's encoding
    /// override.
    pub dirty: bool,
}

impl ReferenceContent {
    /// Create clean (non-dirty) reference content.
    pub fn clean(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dirty: false,
        }
    }

    /// Create dirty reference content.
    pub fn dirty(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dirty: true,
        }
    }
}

/// A read-only, rope-backed snapshot of reference content.
#[derive(Debug)]
pub struct ReferenceSnapshot {
    resource: ResourceId,
    text: Rope,
    line_ending: LineEnding,
    dirty: bool,
    encoding: RwLock<Option<EncodingLabel>>,
}

impl ReferenceSnapshot {
    /// Build a snapshot from resolved reference content.
    ///
    /// The text is normalized to LF newlines; the detected line ending is
    /// kept for consumers that need to reconstruct the on-disk form.
    pub fn from_content(resource: ResourceId, content: &ReferenceContent) -> Self {
        let line_ending = LineEnding::detect_in_text(&content.text);
        let normalized = LineEnding::normalize_to_lf(&content.text);
        Self {
            resource,
            text: Rope::from_str(&normalized),
            line_ending,
            dirty: content.dirty,
            encoding: RwLock::new(None),
        }
    }

    /// The resource this snapshot was loaded from.
    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    /// The line ending the content originally used.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// `true` if the reference had unsaved local edits when resolved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The encoding label applied to this snapshot, if any.
    pub fn encoding(&self) -> Option<EncodingLabel> {
        self.encoding.read().expect("encoding lock poisoned").clone()
    }

    /// Apply a live document's encoding override to this snapshot.
    ///
    /// No-op for dirty snapshots: a reference with unsaved local edits keeps
    /// whatever encoding it was authored with.
    pub fn apply_encoding(&self, label: &EncodingLabel) {
        if self.dirty {
            return;
        }
        let mut slot = self.encoding.write().expect("encoding lock poisoned");
        *slot = Some(label.clone());
    }

    /// Number of lines in the snapshot, counting ropey's trailing empty
    /// line after a final newline.
    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    /// The full snapshot text (LF newlines).
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// Materialize the text covered by a line range.
    ///
    /// The range is clamped to the snapshot; an empty range yields an empty
    /// string. The returned text includes interior newlines and, when the
    /// range extends past the last line, no trailing padding is invented.
    pub fn line_range_text(&self, range: LineRange) -> String {
        let last = self.text.len_lines();
        let start = range.start.min(last);
        let end = range.end.min(last);
        if start >= end {
            return String::new();
        }
        let start_char = self.text.line_to_char(start);
        let end_char = if end >= last {
            self.text.len_chars()
        } else {
            self.text.line_to_char(end)
        };
        self.text.slice(start_char..end_char).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(text: &str) -> ReferenceSnapshot {
        ReferenceSnapshot::from_content(
            ResourceId::new("git:/repo/file.txt"),
            &ReferenceContent::clean(text),
        )
    }

    #[test]
    fn test_crlf_content_is_normalized() {
        let snap = snapshot("a\r\nb\r\n");
        assert_eq!(snap.line_ending(), LineEnding::Crlf);
        assert_eq!(snap.text(), "a\nb\n");
    }

    #[test]
    fn test_line_range_text() {
        let snap = snapshot("zero\none\ntwo\nthree\n");
        assert_eq!(snap.line_range_text(LineRange::new(1, 3)), "one\ntwo\n");
        assert_eq!(snap.line_range_text(LineRange::anchor(2)), "");
        assert_eq!(snap.line_range_text(LineRange::new(3, 99)), "three\n");
    }

    #[test]
    fn test_encoding_applies_to_clean_snapshots_only() {
        let clean = snapshot("text\n");
        clean.apply_encoding(&EncodingLabel::new("cp1252"));
        assert_eq!(clean.encoding(), Some(EncodingLabel::new("cp1252")));

        let dirty = ReferenceSnapshot::from_content(
            ResourceId::new("git:/repo/file.txt"),
            &ReferenceContent::dirty("text\n"),
        );
        dirty.apply_encoding(&EncodingLabel::new("cp1252"));
        assert_eq!(dirty.encoding(), None);
    }
}
