//! Structured node model for keyword-driven test suites.
//!
//! A [`Snapshot`] is the immutable, fully parsed representation of one
//! version of one or more projects. Nodes carry a [`NodeId`] that is
//! unique within its snapshot but deliberately *not* stable across
//! versions; cross-version correspondence is always approximate and is
//! computed by the matcher, never by key lookup.

mod containment;
mod metrics;
mod node;
mod snapshot;
mod values;

pub use containment::Containment;
pub use metrics::{call_level, sequence_size, test_size};
pub use node::{
    Argument, Documentation, KeywordBinding, NodeId, NodeKind, NodeRef, Step, Tag, TestCase,
    UserKeyword, VariableAssignment,
};
pub use snapshot::{MatchEntity, Project, Scoped, Snapshot};
pub use values::{SnapshotValues, ValueFetcher};
