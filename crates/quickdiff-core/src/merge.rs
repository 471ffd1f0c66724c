//! Overlap merging of per-source diffs into one change set.
//!
//! When two reference sources happen to agree (the staged version and HEAD
//! both differ from the working tree identically), showing the same logical
//! edit twice is noise. The merger suppresses such duplicates from the
//! display list while retaining every hunk in the complete list, so API
//! consumers still see the full picture.
//!
//! Suppression is evaluated pairwise, secondary-vs-primary only. Two
//! non-primary sources never suppress each other, and contributed sources
//! are exempt on both sides.

use std::sync::Arc;

use crate::change::{ChangeSet, MergedChange, RawChange};
use crate::snapshot::ReferenceSnapshot;
use crate::source::{QuickDiffSource, ResourceId, SourceKind};

/// The raw diff one source produced during a pass, paired with the snapshot
/// the original-side ranges refer into.
#[derive(Debug, Clone)]
pub struct SourceDiff {
    /// The source the hunks were computed for.
    pub source: QuickDiffSource,
    /// The reference snapshot used for the computation.
    pub snapshot: Arc<ReferenceSnapshot>,
    /// The hunks, in the order the diff computation produced them.
    pub changes: Vec<RawChange>,
}

/// Merge per-source raw diffs into a published [`ChangeSet`].
///
/// Implements the overlap-resolution algorithm:
///
/// 1. every hunk from every source goes into the complete list;
/// 2. a hunk from a [`SourceKind::Secondary`] source is a *duplicate* of a
///    primary hunk when their modified ranges are exactly equal, their
///    original ranges have equal lengths, and the original text under each
///    range is character-identical; duplicates are excluded from the
///    display list;
/// 3. every other hunk goes into the display list;
/// 4. both lists are sorted with [`crate::change::compare_changes`];
/// 5. the source index is built over the sorted display list.
pub fn merge_source_diffs(modified_resource: &ResourceId, diffs: &[SourceDiff]) -> ChangeSet {
    let primary_hunks: Vec<(&Arc<ReferenceSnapshot>, &RawChange)> = diffs
        .iter()
        .filter(|diff| diff.source.kind.is_primary())
        .flat_map(|diff| diff.changes.iter().map(move |change| (&diff.snapshot, change)))
        .collect();

    let mut all_changes = Vec::new();
    let mut display = Vec::new();

    for diff in diffs {
        for change in &diff.changes {
            let merged = MergedChange {
                source_id: diff.source.id.clone(),
                original_resource: diff.source.original_resource.clone(),
                modified_resource: modified_resource.clone(),
                change: change.clone(),
            };
            all_changes.push(merged.clone());

            let suppressed = diff.source.kind == SourceKind::Secondary
                && is_duplicate_of_primary(&primary_hunks, &diff.snapshot, change);
            if !suppressed {
                display.push(merged);
            }
        }
    }

    ChangeSet::from_unsorted(all_changes, display)
}

/// Duplicate test for one secondary hunk against the collected primary
/// hunks. Original text is materialized from both snapshots only after the
/// cheap range checks pass.
fn is_duplicate_of_primary(
    primary_hunks: &[(&Arc<ReferenceSnapshot>, &RawChange)],
    snapshot: &ReferenceSnapshot,
    change: &RawChange,
) -> bool {
    primary_hunks.iter().any(|(primary_snapshot, primary)| {
        primary.modified_range == change.modified_range
            && primary.original_range.len() == change.original_range.len()
            && primary_snapshot.line_range_text(primary.original_range)
                == snapshot.line_range_text(change.original_range)
    })
}
