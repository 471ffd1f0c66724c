#![warn(missing_docs)]
//! Quick Diff Core - Headless Change-Set Kernel
//!
//! # Overview
//!
//! `quickdiff-core` is the synchronous kernel of a quick-diff engine: the
//! data model, ordering rules, overlap merging, and navigation queries for
//! diffing a live text buffer against one or more reference sources (a VCS
//! HEAD version, a staged/index version, or a contributed baseline). It
//! performs no I/O and owns no scheduling; the asynchronous orchestration
//! lives in `quickdiff-engine`.
//!
//! # Core Features
//!
//! - **Change-Set Model**: per-source hunks merged into an immutable,
//!   totally ordered change set with a per-source position index
//! - **Overlap Merging**: duplicate suppression between primary and
//!   secondary sources that agree textually
//! - **Navigation Queries**: nearest-next/previous change lookup with
//!   wraparound, per-source filtering, and visibility transparency
//! - **Incremental Deltas**: minimal edit scripts between successive
//!   change lists for incremental decoration updates
//! - **Reference Snapshots**: rope-backed read-only reference content with
//!   O(log n) line access
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Navigation & Deltas (queries over sets)    │  ← Consumer API
//! ├─────────────────────────────────────────────┤
//! │  Overlap Merger (per-source → ChangeSet)    │  ← Merge Pass
//! ├─────────────────────────────────────────────┤
//! │  Change Model (hunks, ordering, indexes)    │  ← Data Model
//! ├─────────────────────────────────────────────┤
//! │  Reference Snapshots (Rope-based)           │  ← Reference Content
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use quickdiff_core::{
//!     LineRange, QuickDiffSource, RawChange, ReferenceContent, ReferenceSnapshot,
//!     ResourceId, SourceDiff, SourceKind, find_next_closest_change, merge_source_diffs,
//! };
//!
//! let reference = ResourceId::new("git:/repo/main.rs");
//! let snapshot = Arc::new(ReferenceSnapshot::from_content(
//!     reference.clone(),
//!     &ReferenceContent::clean("fn main() {}\n"),
//! ));
//! let source = QuickDiffSource::new("head", reference, SourceKind::Primary, "Git HEAD");
//!
//! // One hunk: line 0 of the reference was replaced by lines 0..2.
//! let diff = SourceDiff {
//!     source: source.clone(),
//!     snapshot,
//!     changes: vec![RawChange::new("head", LineRange::new(0, 1), LineRange::new(0, 2))],
//! };
//!
//! let set = merge_source_diffs(&ResourceId::new("file:///main.rs"), &[diff]);
//! assert_eq!(set.changes().len(), 1);
//! assert_eq!(set.positions_for_source("head"), &[0]);
//! assert_eq!(find_next_closest_change(set.changes(), &[source], 0, true, None), 0);
//! ```
//!
//! # Module Description
//!
//! - [`source`] - Quick-diff sources and canonical resource identity
//! - [`change`] - Hunks, ordering, and published change sets
//! - [`snapshot`] - Rope-backed reference snapshots
//! - [`encoding`] - Line-ending normalization and encoding labels
//! - [`merge`] - Overlap merging of per-source diffs
//! - [`navigation`] - Nearest-change queries over a change set
//! - [`delta`] - Edit scripts between successive change lists
//!
//! # Coordinate Conventions
//!
//! - Lines are 0-based; line ranges are half-open (`[start, end)`)
//! - An empty range (`start == end`) anchors a pure insertion or deletion
//! - Character columns count Unicode scalar values (`char`)

pub mod change;
pub mod delta;
pub mod encoding;
pub mod merge;
pub mod navigation;
pub mod snapshot;
pub mod source;

pub use change::{
    ChangeKind, ChangeSet, CharRange, InnerEdit, LineRange, MergedChange, RawChange, TextPosition,
    compare_changes,
};
pub use delta::{ChangeDelta, ChangeDeltaEdit};
pub use encoding::{EncodingLabel, LineEnding};
pub use merge::{SourceDiff, merge_source_diffs};
pub use navigation::{find_next_closest_change, find_previous_closest_change};
pub use snapshot::{ReferenceContent, ReferenceSnapshot};
pub use source::{QuickDiffSource, ResourceId, SourceKind};
