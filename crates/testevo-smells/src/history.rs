use std::collections::BTreeMap;

use testevo_diff::MatchPair;
use testevo_model::{MatchEntity, Scoped, TestCase};

use crate::detectors::SmellKind;

/// Stable identity of a test case across versions: enclosing project
/// plus name. Node ids are version-local and cannot serve here.
pub fn lineage_key(project: &str, name: &str) -> String {
    format!("{project}::{name}")
}

/// One stretch of versions during which a smell was present on a test
/// case, from the version that introduced it to the version that fixed
/// it (open while the smell persists).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageSpan {
    pub introduced_in: String,
    pub fixed_in: Option<String>,
}

/// Append-only ledger of smell lifetimes across the analyzed version
/// sequence, keyed by smell kind and test-case lineage. Renames are
/// absorbed by re-keying through the test-case match pairs before each
/// version is recorded, so a renamed test keeps its open spans.
#[derive(Debug, Clone, Default)]
pub struct History {
    spans: BTreeMap<(SmellKind, String), Vec<LineageSpan>>,
}

impl History {
    /// Moves ledger entries of renamed test cases onto their new
    /// lineage key. Must run before recording the current version.
    pub fn rekey(&mut self, pairs: &[MatchPair<Scoped<'_, TestCase>, Scoped<'_, TestCase>>]) {
        let renames: Vec<(String, String)> = pairs
            .iter()
            .filter_map(|pair| {
                let previous = pair.previous.as_ref()?;
                let current = pair.current.as_ref()?;
                let from = lineage_key(previous.project, previous.node.entity_name());
                let to = lineage_key(current.project, current.node.entity_name());
                (from != to).then_some((from, to))
            })
            .collect();

        for (from, to) in renames {
            for kind in SmellKind::ALL {
                if let Some(moved) = self.spans.remove(&(kind, from.clone())) {
                    self.spans.entry((kind, to.clone())).or_default().extend(moved);
                }
            }
        }
    }

    /// Opens a new span unless one is already open for this lineage.
    pub fn record_introduced(&mut self, kind: SmellKind, key: &str, version: &str) {
        let spans = self.spans.entry((kind, key.to_owned())).or_default();
        if spans.last().is_some_and(|span| span.fixed_in.is_none()) {
            return;
        }
        spans.push(LineageSpan {
            introduced_in: version.to_owned(),
            fixed_in: None,
        });
    }

    /// Closes the open span for this lineage, if any.
    pub fn record_fixed(&mut self, kind: SmellKind, key: &str, version: &str) {
        if let Some(span) = self
            .spans
            .get_mut(&(kind, key.to_owned()))
            .and_then(|spans| spans.last_mut())
            .filter(|span| span.fixed_in.is_none())
        {
            span.fixed_in = Some(version.to_owned());
        }
    }

    pub fn spans(&self, kind: SmellKind, key: &str) -> &[LineageSpan] {
        self.spans
            .get(&(kind, key.to_owned()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of closed spans, i.e. how many times this smell was fixed
    /// on this lineage so far.
    pub fn fix_count(&self, kind: SmellKind, key: &str) -> usize {
        self.spans(kind, key)
            .iter()
            .filter(|span| span.fixed_in.is_some())
            .count()
    }
}
