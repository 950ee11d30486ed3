//! Evolution analysis driver: ties version sources, matching, diffing,
//! smell accounting and export together into one run.

pub mod cli;
pub mod runner;
