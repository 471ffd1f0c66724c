#![warn(missing_docs)]
//! `quickdiff-engine` - Asynchronous orchestration for `quickdiff-core`.
//!
//! This crate owns everything about quick diff that touches time or the
//! host environment: resolving which reference sources apply to a document,
//! caching reference snapshots behind reference-counted leases, running the
//! per-source diff computations, and driving the recomputation state
//! machine (trigger → quiescence → resolve → compute → merge → publish)
//! with coalescing, cancellation, and stale-result detection.
//!
//! The host supplies its environment through a handful of boundaries:
//!
//! - [`TextDocument`] - read-only view of the live buffer
//! - [`QuickDiffSourceProvider`] - contributes sources for documents
//! - [`ReferenceContentResolver`] - loads reference content by resource id
//! - [`ExclusiveEditQuery`] - suppresses quick diff during exclusive
//!   automated editing sessions
//!
//! and consumes results through [`QuickDiffEngine`]: the published change
//! lists, per-source index, navigation queries, and `on_did_change`
//! subscriptions carrying incremental deltas.
//!
//! Failure containment is strict: provider errors, unreadable references,
//! and exhausted computation budgets remove a *source* from a pass, never
//! fail the pass. A pass either publishes, is discarded as stale, or is
//! cancelled by disposal.

pub mod cache;
pub mod compute;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod events;
pub mod provider;
pub mod resolver;

pub use cache::{ReferenceModelCache, SnapshotLease};
pub use compute::{ComputeOptions, DiffComputeClient, MAX_DIFF_LINES};
pub use config::{DiffAlgorithm, QuickDiffConfig, WhitespacePolicy};
pub use document::TextDocument;
pub use engine::{ChangeEvent, DiffEditorModel, QuickDiffEngine};
pub use error::{ProviderError, ReferenceError};
pub use events::{EventEmitter, Subscription};
pub use provider::{
    ExclusiveEditQuery, NoExclusiveEdits, QuickDiffSourceProvider, ReferenceContent,
    ReferenceContentResolver, SourceProviderRegistry,
};
pub use resolver::SourceResolver;
