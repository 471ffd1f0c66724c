//! Navigation queries over a published change list.
//!
//! These are stateless functions over the sorted `changes` slice of a
//! [`crate::change::ChangeSet`]; they return indices into that slice.
//!
//! Visibility is evaluated at query time against the caller-supplied source
//! list, never precomputed: a source toggled invisible between passes makes
//! its changes *transparent*: they stay in the list but are skipped during
//! navigation and do not count toward wraparound. Changes whose source is
//! unknown to the caller are treated as visible.

use crate::change::{LineRange, MergedChange};
use crate::source::QuickDiffSource;

/// Find the next closest change relative to `line`.
///
/// With `inclusive`, a change containing `line` wins, preferring one on a
/// primary source; otherwise the nearest change after `line` is chosen,
/// wrapping around to the first navigable change. Without `inclusive`, only
/// changes strictly after `line` qualify before wrapping.
///
/// `source_filter` restricts navigation to one source id. Returns `0` when
/// nothing is navigable.
pub fn find_next_closest_change(
    changes: &[MergedChange],
    sources: &[QuickDiffSource],
    line: usize,
    inclusive: bool,
    source_filter: Option<&str>,
) -> usize {
    let candidate = |change: &MergedChange| is_candidate(change, sources, source_filter);

    if inclusive {
        let containing_primary = changes.iter().position(|change| {
            candidate(change)
                && is_primary(change, sources)
                && change.change.modified_range.contains(line)
        });
        if let Some(index) = containing_primary {
            return index;
        }
        let containing = changes
            .iter()
            .position(|change| candidate(change) && change.change.modified_range.contains(line));
        if let Some(index) = containing {
            return index;
        }
    }

    let after = changes
        .iter()
        .position(|change| candidate(change) && change.change.modified_range.start > line);
    if let Some(index) = after {
        return index;
    }

    // Wrap around to the first navigable change.
    changes
        .iter()
        .position(|change| candidate(change))
        .unwrap_or(0)
}

/// Find the previous closest change relative to `line`.
///
/// Mirror of [`find_next_closest_change`]: with `inclusive`, a containing
/// change wins (primary preferred); otherwise the nearest change entirely
/// before `line`, wrapping around to the last navigable change. Returns `0`
/// when nothing is navigable.
pub fn find_previous_closest_change(
    changes: &[MergedChange],
    sources: &[QuickDiffSource],
    line: usize,
    inclusive: bool,
    source_filter: Option<&str>,
) -> usize {
    let candidate = |change: &MergedChange| is_candidate(change, sources, source_filter);

    if inclusive {
        let containing_primary = changes.iter().rposition(|change| {
            candidate(change)
                && is_primary(change, sources)
                && change.change.modified_range.contains(line)
        });
        if let Some(index) = containing_primary {
            return index;
        }
        let containing = changes
            .iter()
            .rposition(|change| candidate(change) && change.change.modified_range.contains(line));
        if let Some(index) = containing {
            return index;
        }
    }

    let before = changes
        .iter()
        .rposition(|change| candidate(change) && lies_before(change.change.modified_range, line));
    if let Some(index) = before {
        return index;
    }

    // Wrap around to the last navigable change.
    changes
        .iter()
        .rposition(|change| candidate(change))
        .unwrap_or(0)
}

/// A range lies before `line` when it ends on an earlier line; an empty
/// anchor lies before only if anchored on an earlier line.
fn lies_before(range: LineRange, line: usize) -> bool {
    if range.is_empty() {
        range.start < line
    } else {
        range.end <= line
    }
}

fn is_candidate(
    change: &MergedChange,
    sources: &[QuickDiffSource],
    source_filter: Option<&str>,
) -> bool {
    if let Some(filter) = source_filter
        && change.source_id != filter
    {
        return false;
    }
    sources
        .iter()
        .find(|source| source.id == change.source_id)
        .is_none_or(|source| source.visible)
}

fn is_primary(change: &MergedChange, sources: &[QuickDiffSource]) -> bool {
    sources
        .iter()
        .find(|source| source.id == change.source_id)
        .is_some_and(|source| source.kind.is_primary())
}
