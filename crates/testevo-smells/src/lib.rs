//! Smell detection and cross-version smell accounting.
//!
//! Detectors are pure functions over one test case; the accumulator
//! links their results across versions using the edit set of the
//! current transition, deciding per smell whether it was introduced,
//! persists, or was fixed. The [`History`] ledger keeps the
//! introduction/fix timeline over the whole version sequence.

mod accumulator;
mod config;
mod detectors;
mod fix;
mod history;

pub use accumulator::{AccumulatorInput, SmellRecordAccumulator};
pub use config::{CloneIndex, SmellConfiguration};
pub use detectors::{SmellDetector, SmellKind, SmellResult, SmellResults};
pub use fix::{fix_edit_kinds, is_fix};
pub use history::{History, LineageSpan, lineage_key};
