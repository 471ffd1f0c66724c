//! Change hunks, ordering, and published change sets.
//!
//! All line coordinates in this module are **0-based** and ranges are
//! half-open (`[start, end)`). A range with `start == end` is an *anchor*:
//! it marks the position of a pure insertion (on the original side) or a
//! pure deletion (on the modified side) without covering any line.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::source::ResourceId;

/// A half-open, 0-based line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineRange {
    /// Inclusive start line.
    pub start: usize,
    /// Exclusive end line.
    pub end: usize,
}

impl LineRange {
    /// Create a new line range. `start` must not exceed `end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted line range {start}..{end}");
        Self { start, end }
    }

    /// Create an empty anchor range at `line`.
    pub fn anchor(line: usize) -> Self {
        Self { start: line, end: line }
    }

    /// Number of lines covered by this range.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if this range covers no lines.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns `true` if `line` falls inside this range.
    ///
    /// An empty anchor range contains exactly its anchor line, so deletion
    /// hunks remain addressable by the line they are displayed on.
    pub fn contains(&self, line: usize) -> bool {
        if self.is_empty() {
            line == self.start
        } else {
            self.start <= line && line < self.end
        }
    }

    /// Returns `true` if the two ranges share at least one line, or if an
    /// empty anchor of one falls inside (or on) the other.
    pub fn intersects(&self, other: &LineRange) -> bool {
        if self.is_empty() {
            return other.contains(self.start);
        }
        if other.is_empty() {
            return self.contains(other.start);
        }
        self.start < other.end && other.start < self.end
    }
}

/// A character-precise position inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPosition {
    /// 0-based line.
    pub line: usize,
    /// 0-based column, in Unicode scalar values (`char`).
    pub column: usize,
}

impl TextPosition {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A half-open character-precise range (`[start, end)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharRange {
    /// Inclusive start position.
    pub start: TextPosition,
    /// Exclusive end position.
    pub end: TextPosition,
}

impl CharRange {
    /// Create a new character range.
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        Self { start, end }
    }
}

/// A character-precise edit inside a hunk, pairing the replaced original
/// span with the replacing modified span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InnerEdit {
    /// The replaced span on the original side.
    pub original: CharRange,
    /// The replacing span on the modified side.
    pub modified: CharRange,
}

/// A coarse classification of a hunk, derived from range emptiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    /// Lines exist only on the modified side.
    Added,
    /// Lines exist only on the original side.
    Removed,
    /// Lines were replaced.
    Modified,
}

/// One contiguous diff hunk produced for a single source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawChange {
    /// Id of the source this hunk was computed against.
    pub source_id: String,
    /// Affected lines on the original (reference) side.
    pub original_range: LineRange,
    /// Affected lines on the modified (live) side.
    pub modified_range: LineRange,
    /// Optional character-precise edits inside the hunk.
    pub inner_edits: Vec<InnerEdit>,
}

impl RawChange {
    /// Create a hunk without inner edits.
    pub fn new(
        source_id: impl Into<String>,
        original_range: LineRange,
        modified_range: LineRange,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            original_range,
            modified_range,
            inner_edits: Vec::new(),
        }
    }

    /// Classify this hunk from its range shapes.
    pub fn kind(&self) -> ChangeKind {
        if self.original_range.is_empty() {
            ChangeKind::Added
        } else if self.modified_range.is_empty() {
            ChangeKind::Removed
        } else {
            ChangeKind::Modified
        }
    }
}

/// A hunk labeled with the resources it relates, as published in a
/// [`ChangeSet`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MergedChange {
    /// Id of the source this hunk belongs to.
    pub source_id: String,
    /// The reference resource the hunk was computed against.
    pub original_resource: ResourceId,
    /// The live document resource.
    pub modified_resource: ResourceId,
    /// The hunk itself.
    pub change: RawChange,
}

/// Strict total order over merged changes.
///
/// Ascending by modified start, then modified end, then original start, then
/// original end. Every published `changes` list is sorted with this
/// comparison; the whole navigation and decoration layer depends on it.
pub fn compare_changes(a: &MergedChange, b: &MergedChange) -> Ordering {
    a.change
        .modified_range
        .start
        .cmp(&b.change.modified_range.start)
        .then_with(|| a.change.modified_range.end.cmp(&b.change.modified_range.end))
        .then_with(|| a.change.original_range.start.cmp(&b.change.original_range.start))
        .then_with(|| a.change.original_range.end.cmp(&b.change.original_range.end))
}

/// The immutable result of one recomputation pass.
///
/// `all_changes` retains every hunk from every source; `changes` is the
/// deduplicated display list that navigation and decoration consume.
/// `source_index` maps each source id to the ascending positions of its
/// hunks within `changes`. A change set is never mutated after publication;
/// a new one fully replaces the old.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    all_changes: Vec<MergedChange>,
    changes: Vec<MergedChange>,
    source_index: HashMap<String, Vec<usize>>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a change set from unsorted hunk lists.
    ///
    /// Both lists are sorted with [`compare_changes`] and the source index
    /// is rebuilt, so the ordering invariant holds by construction.
    pub fn from_unsorted(
        mut all_changes: Vec<MergedChange>,
        mut changes: Vec<MergedChange>,
    ) -> Self {
        all_changes.sort_by(compare_changes);
        changes.sort_by(compare_changes);

        let mut source_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, change) in changes.iter().enumerate() {
            source_index
                .entry(change.source_id.clone())
                .or_default()
                .push(position);
        }

        Self {
            all_changes,
            changes,
            source_index,
        }
    }

    /// The deduplicated display list, sorted by [`compare_changes`].
    pub fn changes(&self) -> &[MergedChange] {
        &self.changes
    }

    /// The complete list retaining hunks from all sources, sorted by
    /// [`compare_changes`].
    pub fn all_changes(&self) -> &[MergedChange] {
        &self.all_changes
    }

    /// Positions of each source's hunks within [`ChangeSet::changes`].
    ///
    /// Sources whose every hunk was suppressed have no entry.
    pub fn source_index(&self) -> &HashMap<String, Vec<usize>> {
        &self.source_index
    }

    /// Positions of one source's hunks within [`ChangeSet::changes`].
    pub fn positions_for_source(&self, source_id: &str) -> &[usize] {
        self.source_index
            .get(source_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns `true` if the display list is empty.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
