//! Cross-version matching and structural differencing.
//!
//! The matcher pairs same-kind entities of two consecutive versions
//! without a stable identity key; the difference engine turns a matched
//! pair into a set of typed edits; the value extractor reports library
//! call arguments whose resolved value set was swapped wholesale.
//! All three are total: ambiguity is resolved by defined fallbacks,
//! never by failing.

mod difference;
mod matcher;
mod values;

pub use difference::{Edit, EditKind, diff_test_cases, diff_user_keywords, diff_variables};
pub use matcher::{MatchPair, match_entities};
pub use values::{ValueChange, extract_value_changes};
