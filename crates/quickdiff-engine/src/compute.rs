//! The diff computation client.
//!
//! Thin wrapper around the `similar` diff engine. The rest of the crate
//! treats this as an opaque service with one operation: given a reference
//! snapshot and the live text, produce line hunks, or report the diff as
//! *unavailable* (`None`) when the target is too large or the computation
//! time budget was exhausted. Unavailable is deliberately distinct from
//! `Some(vec![])` ("no changes") and must never be conflated with it.
//!
//! Line splitting follows the editor convention: N newlines produce N+1
//! lines, and a CR before a newline is stripped, so hunk coordinates line
//! up with rope-based line indexes on both sides.

use std::time::{Duration, Instant};

use similar::{Algorithm, DiffOp, capture_diff_slices, capture_diff_slices_deadline};

use quickdiff_core::{
    CharRange, InnerEdit, LineRange, QuickDiffSource, RawChange, ReferenceSnapshot, TextPosition,
};

use crate::config::{DiffAlgorithm, QuickDiffConfig};

/// Targets with more lines than this are skipped entirely for a pass.
pub const MAX_DIFF_LINES: usize = 100_000;

/// Options for one diff computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeOptions {
    /// Compare lines with leading/trailing whitespace stripped.
    pub ignore_trim_whitespace: bool,
    /// Wall-clock budget for the computation; exceeding it makes the
    /// result unavailable.
    pub time_budget: Option<Duration>,
}

impl ComputeOptions {
    /// Derive compute options from the engine configuration.
    pub fn from_config(config: &QuickDiffConfig) -> Self {
        Self {
            ignore_trim_whitespace: config.ignore_trim_whitespace.ignores_trim_whitespace(),
            time_budget: config.computation_time_budget(),
        }
    }
}

/// Client for the line-diff computation service.
pub struct DiffComputeClient {
    algorithm: Algorithm,
    compute_inner_edits: bool,
}

impl DiffComputeClient {
    /// Create a client running the given algorithm.
    ///
    /// The advanced algorithm additionally produces character-precise
    /// inner edits for replacement hunks; the legacy one is line-level
    /// only.
    pub fn new(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Advanced => Self {
                algorithm: Algorithm::Patience,
                compute_inner_edits: true,
            },
            DiffAlgorithm::Legacy => Self {
                algorithm: Algorithm::Myers,
                compute_inner_edits: false,
            },
        }
    }

    /// Pre-filter: `false` when either side is too large to diff.
    pub fn can_compute(&self, snapshot: &ReferenceSnapshot, modified_text: &str) -> bool {
        snapshot.line_count() <= MAX_DIFF_LINES
            && line_count(modified_text) <= MAX_DIFF_LINES
    }

    /// Compute the line diff of `snapshot` (original) against
    /// `modified_text` (live buffer) for `source`.
    ///
    /// Returns `None` when the diff is unavailable: target too large, or
    /// the time budget was exhausted.
    pub async fn compute_one(
        &self,
        source: &QuickDiffSource,
        snapshot: &ReferenceSnapshot,
        modified_text: &str,
        options: &ComputeOptions,
    ) -> Option<Vec<RawChange>> {
        if !self.can_compute(snapshot, modified_text) {
            return None;
        }

        let original_text = snapshot.text();
        let original_lines = split_lines(&original_text);
        let modified_lines = split_lines(modified_text);

        let started = Instant::now();
        let deadline = options.time_budget.map(|budget| started + budget);

        let ops = if options.ignore_trim_whitespace {
            let original_keys: Vec<&str> = original_lines.iter().map(|line| line.trim()).collect();
            let modified_keys: Vec<&str> = modified_lines.iter().map(|line| line.trim()).collect();
            capture_diff_slices_deadline(self.algorithm, &original_keys, &modified_keys, deadline)
        } else {
            capture_diff_slices_deadline(self.algorithm, &original_lines, &modified_lines, deadline)
        };

        if let Some(budget) = options.time_budget
            && started.elapsed() >= budget
        {
            return None;
        }

        let mut changes = Vec::new();
        for op in ops {
            match op {
                DiffOp::Equal { .. } => {}
                DiffOp::Delete {
                    old_index,
                    old_len,
                    new_index,
                } => changes.push(RawChange::new(
                    source.id.clone(),
                    LineRange::new(old_index, old_index + old_len),
                    LineRange::anchor(new_index),
                )),
                DiffOp::Insert {
                    old_index,
                    new_index,
                    new_len,
                } => changes.push(RawChange::new(
                    source.id.clone(),
                    LineRange::anchor(old_index),
                    LineRange::new(new_index, new_index + new_len),
                )),
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => {
                    let mut change = RawChange::new(
                        source.id.clone(),
                        LineRange::new(old_index, old_index + old_len),
                        LineRange::new(new_index, new_index + new_len),
                    );
                    if self.compute_inner_edits {
                        change.inner_edits = self.inner_edits(
                            &original_lines[old_index..old_index + old_len],
                            old_index,
                            &modified_lines[new_index..new_index + new_len],
                            new_index,
                        );
                    }
                    changes.push(change);
                }
            }
        }

        Some(changes)
    }

    /// Character-precise edits inside one replacement hunk.
    fn inner_edits(
        &self,
        original_lines: &[&str],
        original_base_line: usize,
        modified_lines: &[&str],
        modified_base_line: usize,
    ) -> Vec<InnerEdit> {
        let original_chars: Vec<char> = join_chars(original_lines);
        let modified_chars: Vec<char> = join_chars(modified_lines);
        let ops = capture_diff_slices(self.algorithm, &original_chars, &modified_chars);

        let mut edits = Vec::new();
        for op in ops {
            let (original, modified) = match op {
                DiffOp::Equal { .. } => continue,
                DiffOp::Delete {
                    old_index,
                    old_len,
                    new_index,
                } => ((old_index, old_len), (new_index, 0)),
                DiffOp::Insert {
                    old_index,
                    new_index,
                    new_len,
                } => ((old_index, 0), (new_index, new_len)),
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => ((old_index, old_len), (new_index, new_len)),
            };
            edits.push(InnerEdit {
                original: char_span(&original_chars, original, original_base_line),
                modified: char_span(&modified_chars, modified, modified_base_line),
            });
        }
        edits
    }
}

/// Split into editor-convention lines: N newlines yield N+1 lines, CR
/// before a newline is stripped.
fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

fn line_count(text: &str) -> usize {
    text.bytes().filter(|byte| *byte == b'\n').count() + 1
}

fn join_chars(lines: &[&str]) -> Vec<char> {
    let mut chars = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            chars.push('\n');
        }
        chars.extend(line.chars());
    }
    chars
}

/// Resolve a `(offset, len)` char span inside a hunk to document positions.
fn char_span(chars: &[char], span: (usize, usize), base_line: usize) -> CharRange {
    let (offset, len) = span;
    CharRange::new(
        position_at(chars, offset, base_line),
        position_at(chars, offset + len, base_line),
    )
}

fn position_at(chars: &[char], offset: usize, base_line: usize) -> TextPosition {
    let mut line = base_line;
    let mut column = 0;
    for ch in chars.iter().take(offset) {
        if *ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    TextPosition::new(line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickdiff_core::{ChangeKind, ReferenceContent, ResourceId, SourceKind};

    fn snapshot(text: &str) -> ReferenceSnapshot {
        ReferenceSnapshot::from_content(
            ResourceId::new("git:/repo/file.txt"),
            &ReferenceContent::clean(text),
        )
    }

    fn source() -> QuickDiffSource {
        QuickDiffSource::new(
            "head",
            ResourceId::new("git:/repo/file.txt"),
            SourceKind::Primary,
            "Git HEAD",
        )
    }

    fn options() -> ComputeOptions {
        ComputeOptions {
            ignore_trim_whitespace: false,
            time_budget: None,
        }
    }

    #[tokio::test]
    async fn test_insertion_hunk() {
        let client = DiffComputeClient::new(DiffAlgorithm::Advanced);
        let snap = snapshot("a\nb\n");
        let changes = client
            .compute_one(&source(), &snap, "a\nx\nb\n", &options())
            .await
            .unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::Added);
        assert_eq!(changes[0].original_range, LineRange::anchor(1));
        assert_eq!(changes[0].modified_range, LineRange::new(1, 2));
    }

    #[tokio::test]
    async fn test_deletion_hunk() {
        let client = DiffComputeClient::new(DiffAlgorithm::Advanced);
        let snap = snapshot("a\nx\nb\n");
        let changes = client
            .compute_one(&source(), &snap, "a\nb\n", &options())
            .await
            .unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::Removed);
        assert_eq!(changes[0].original_range, LineRange::new(1, 2));
        assert_eq!(changes[0].modified_range, LineRange::anchor(1));
    }

    #[tokio::test]
    async fn test_identical_content_is_some_empty_not_none() {
        let client = DiffComputeClient::new(DiffAlgorithm::Advanced);
        let snap = snapshot("a\nb\n");
        let changes = client
            .compute_one(&source(), &snap, "a\nb\n", &options())
            .await;
        assert_eq!(changes, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_trim_whitespace_policy() {
        let snap = snapshot("  a\nb\n");
        let trimming = ComputeOptions {
            ignore_trim_whitespace: true,
            ..options()
        };

        let client = DiffComputeClient::new(DiffAlgorithm::Advanced);
        let changes = client
            .compute_one(&source(), &snap, "a  \nb\n", &trimming)
            .await
            .unwrap();
        assert!(changes.is_empty());

        let changes = client
            .compute_one(&source(), &snap, "a  \nb\n", &options())
            .await
            .unwrap();
        assert_eq!(changes.len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_budget_is_unavailable() {
        let client = DiffComputeClient::new(DiffAlgorithm::Advanced);
        let snap = snapshot("a\nb\n");
        let exhausted = ComputeOptions {
            time_budget: Some(Duration::ZERO),
            ..options()
        };
        let changes = client
            .compute_one(&source(), &snap, "a\nchanged\n", &exhausted)
            .await;
        assert_eq!(changes, None);
    }

    #[tokio::test]
    async fn test_oversized_target_is_unavailable() {
        let client = DiffComputeClient::new(DiffAlgorithm::Advanced);
        let snap = snapshot("a\n");
        let huge = "\n".repeat(MAX_DIFF_LINES + 1);
        assert!(!client.can_compute(&snap, &huge));
        let changes = client.compute_one(&source(), &snap, &huge, &options()).await;
        assert_eq!(changes, None);
    }

    #[tokio::test]
    async fn test_advanced_algorithm_produces_inner_edits() {
        let client = DiffComputeClient::new(DiffAlgorithm::Advanced);
        let snap = snapshot("hello world\n");
        let changes = client
            .compute_one(&source(), &snap, "hello there\n", &options())
            .await
            .unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::Modified);
        assert!(!changes[0].inner_edits.is_empty());
        for edit in &changes[0].inner_edits {
            assert_eq!(edit.original.start.line, 0);
            assert_eq!(edit.modified.start.line, 0);
        }
    }

    #[tokio::test]
    async fn test_legacy_algorithm_is_line_level_only() {
        let client = DiffComputeClient::new(DiffAlgorithm::Legacy);
        let snap = snapshot("hello world\n");
        let changes = client
            .compute_one(&source(), &snap, "hello there\n", &options())
            .await
            .unwrap();

        assert_eq!(changes.len(), 1);
        assert!(changes[0].inner_edits.is_empty());
    }

    #[tokio::test]
    async fn test_crlf_modified_text_aligns_with_normalized_reference() {
        let client = DiffComputeClient::new(DiffAlgorithm::Advanced);
        let snap = snapshot("a\r\nb\r\n");
        let changes = client
            .compute_one(&source(), &snap, "a\r\nb\r\n", &options())
            .await;
        assert_eq!(changes, Some(Vec::new()));
    }
}
