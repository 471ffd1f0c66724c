//! Structured deltas between successive change lists.
//!
//! Publishing a full change list on every pass would force downstream
//! decoration layers to redraw everything. This module computes a minimal
//! edit script (insert/remove/replace runs) between the previous and new
//! `changes` arrays via an ordered sequence diff, so consumers can update
//! incrementally.

use similar::{Algorithm, DiffOp, capture_diff_slices};

use crate::change::MergedChange;

/// One run of a change-list edit script.
///
/// Removal positions index into the *previous* list; insertion positions
/// index into the *new* list. A replacement carries both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDeltaEdit {
    /// `count` entries were inserted at position `at` of the new list.
    Inserted {
        /// Position in the new list.
        at: usize,
        /// Number of inserted entries.
        count: usize,
    },
    /// `count` entries were removed at position `at` of the previous list.
    Removed {
        /// Position in the previous list.
        at: usize,
        /// Number of removed entries.
        count: usize,
    },
    /// `removed` entries at `at` of the previous list were replaced by
    /// `inserted` entries at `at_new` of the new list.
    Replaced {
        /// Position in the previous list.
        at: usize,
        /// Number of replaced entries.
        removed: usize,
        /// Position in the new list.
        at_new: usize,
        /// Number of replacing entries.
        inserted: usize,
    },
}

/// A minimal edit script transforming one published `changes` list into the
/// next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDelta {
    /// Length of the previous list.
    pub before_len: usize,
    /// Length of the new list.
    pub after_len: usize,
    /// Ordered edit runs; empty when the lists are structurally equal.
    pub edits: Vec<ChangeDeltaEdit>,
}

impl ChangeDelta {
    /// Compute the edit script between two change lists.
    pub fn between(old: &[MergedChange], new: &[MergedChange]) -> Self {
        let edits = capture_diff_slices(Algorithm::Myers, old, new)
            .into_iter()
            .filter_map(|op| match op {
                DiffOp::Equal { .. } => None,
                DiffOp::Insert {
                    new_index, new_len, ..
                } => Some(ChangeDeltaEdit::Inserted {
                    at: new_index,
                    count: new_len,
                }),
                DiffOp::Delete {
                    old_index, old_len, ..
                } => Some(ChangeDeltaEdit::Removed {
                    at: old_index,
                    count: old_len,
                }),
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => Some(ChangeDeltaEdit::Replaced {
                    at: old_index,
                    removed: old_len,
                    at_new: new_index,
                    inserted: new_len,
                }),
            })
            .collect();

        Self {
            before_len: old.len(),
            after_len: new.len(),
            edits,
        }
    }

    /// Returns `true` if the lists were structurally equal.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}
