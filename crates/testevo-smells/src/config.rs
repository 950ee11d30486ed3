use std::collections::BTreeMap;

use testevo_model::{MatchEntity, Snapshot};

/// Grouping of user keyword definitions considered mutual clones.
///
/// Clone detection proper is an external collaborator; what the smell
/// configuration needs is only membership. The bundled [`CloneIndex::detect`]
/// groups keywords with byte-identical bodies, which is the degenerate
/// but always-available grouping.
#[derive(Debug, Clone, Default)]
pub struct CloneIndex {
    group_of: BTreeMap<String, usize>,
    group_sizes: Vec<usize>,
}

impl CloneIndex {
    pub fn detect(snapshot: &Snapshot) -> Self {
        let mut by_signature: BTreeMap<Vec<String>, Vec<String>> = BTreeMap::new();
        for keyword in snapshot.user_keywords() {
            by_signature
                .entry(keyword.node.signature())
                .or_default()
                .push(keyword.node.name.clone());
        }

        let mut index = Self::default();
        for (_, names) in by_signature {
            let group = index.group_sizes.len();
            index.group_sizes.push(names.len());
            for name in names {
                index.group_of.insert(name, group);
            }
        }
        index
    }

    /// Whether this keyword shares its body with at least one other
    /// keyword definition.
    pub fn is_clone(&self, keyword_name: &str) -> bool {
        self.group_of
            .get(keyword_name)
            .map(|&group| self.group_sizes[group] > 1)
            .unwrap_or(false)
    }
}

/// Tunables and injected collaborators for the smell detectors.
#[derive(Debug, Clone)]
pub struct SmellConfiguration {
    /// Step count above which a test case counts as a long test.
    pub long_test_threshold: usize,
    pub clones: CloneIndex,
}

impl Default for SmellConfiguration {
    fn default() -> Self {
        Self {
            long_test_threshold: 20,
            clones: CloneIndex::default(),
        }
    }
}

impl SmellConfiguration {
    pub fn with_clones(mut self, clones: CloneIndex) -> Self {
        self.clones = clones;
        self
    }
}
