//! Engine configuration.
//!
//! Configuration is plain data: the host deserializes it from wherever its
//! settings live and hands it to the engine, which re-reads it at the start
//! of every recomputation pass. Updating the configuration triggers a
//! recomputation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Whitespace handling for the line diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitespacePolicy {
    /// Follow the surrounding editor's diff setting. Without one, behaves
    /// like [`WhitespacePolicy::Always`].
    #[default]
    Inherit,
    /// Ignore leading/trailing whitespace when comparing lines.
    Always,
    /// Compare lines verbatim.
    Never,
}

impl WhitespacePolicy {
    /// Resolve the policy to a concrete "ignore trim whitespace" flag.
    pub fn ignores_trim_whitespace(self) -> bool {
        match self {
            Self::Inherit | Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Which diff algorithm the compute client runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffAlgorithm {
    /// The newer algorithm; produces character-precise inner edits.
    #[default]
    Advanced,
    /// The historical algorithm; line-level hunks only.
    Legacy,
}

/// Quick-diff engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickDiffConfig {
    /// Whitespace handling for line comparisons.
    pub ignore_trim_whitespace: WhitespacePolicy,
    /// Diff algorithm selection.
    pub diff_algorithm: DiffAlgorithm,
    /// Per-source computation time budget in milliseconds. `None` means
    /// effectively unbounded. Exceeding the budget makes the diff
    /// *unavailable* for that source and pass, not empty.
    pub computation_time_budget_ms: Option<u64>,
    /// Quiescence window in milliseconds: edit bursts within this window
    /// collapse into one recomputation pass.
    pub quiescence_ms: u64,
}

impl Default for QuickDiffConfig {
    fn default() -> Self {
        Self {
            ignore_trim_whitespace: WhitespacePolicy::default(),
            diff_algorithm: DiffAlgorithm::default(),
            computation_time_budget_ms: None,
            quiescence_ms: 200,
        }
    }
}

impl QuickDiffConfig {
    /// The computation budget as a [`Duration`], if bounded.
    pub fn computation_time_budget(&self) -> Option<Duration> {
        self.computation_time_budget_ms.map(Duration::from_millis)
    }

    /// The quiescence window as a [`Duration`].
    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QuickDiffConfig::default();
        assert_eq!(config.ignore_trim_whitespace, WhitespacePolicy::Inherit);
        assert_eq!(config.diff_algorithm, DiffAlgorithm::Advanced);
        assert_eq!(config.computation_time_budget(), None);
        assert_eq!(config.quiescence(), Duration::from_millis(200));
    }

    #[test]
    fn test_whitespace_policy_resolution() {
        assert!(WhitespacePolicy::Inherit.ignores_trim_whitespace());
        assert!(WhitespacePolicy::Always.ignores_trim_whitespace());
        assert!(!WhitespacePolicy::Never.ignores_trim_whitespace());
    }

    #[test]
    fn test_deserializes_from_settings_json() {
        let config: QuickDiffConfig = serde_json::from_str(
            r#"{
                "ignore_trim_whitespace": "never",
                "diff_algorithm": "legacy",
                "computation_time_budget_ms": 5000
            }"#,
        )
        .unwrap();
        assert_eq!(config.ignore_trim_whitespace, WhitespacePolicy::Never);
        assert_eq!(config.diff_algorithm, DiffAlgorithm::Legacy);
        assert_eq!(config.computation_time_budget_ms, Some(5000));
        assert_eq!(config.quiescence_ms, 200);
    }
}
