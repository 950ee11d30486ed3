use std::collections::{BTreeMap, BTreeSet};

use crate::node::Argument;
use crate::snapshot::Snapshot;

/// Resolves an argument to the set of concrete values it can take.
///
/// The resolution of variable indirection lives outside the evolution
/// core; this trait is its boundary. Implementations must be pure.
pub trait ValueFetcher {
    fn values(&self, argument: &Argument) -> BTreeSet<String>;
}

/// Default fetcher backed by the variable assignments of one snapshot.
///
/// A literal resolves to itself, `${name}` resolves to every value the
/// assignment declares (following nested `${...}` indirection), and an
/// unknown variable resolves to the empty set.
#[derive(Debug, Clone)]
pub struct SnapshotValues<'a> {
    variables: BTreeMap<&'a str, &'a [String]>,
}

impl<'a> SnapshotValues<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        let mut variables = BTreeMap::new();
        for scoped in snapshot.variables() {
            variables.insert(scoped.node.name.as_str(), scoped.node.values.as_slice());
        }
        Self { variables }
    }

    fn resolve(&self, value: &str, seen: &mut BTreeSet<String>, out: &mut BTreeSet<String>) {
        if !is_variable_reference(value) {
            out.insert(value.to_owned());
            return;
        }
        if !seen.insert(value.to_owned()) {
            // variable cycle; nothing resolvable on this path
            return;
        }
        let Some(values) = self.variables.get(value) else {
            return;
        };
        for nested in values.iter() {
            self.resolve(nested, seen, out);
        }
    }
}

impl ValueFetcher for SnapshotValues<'_> {
    fn values(&self, argument: &Argument) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut seen = BTreeSet::new();
        self.resolve(argument.value.as_str(), &mut seen, &mut out);
        out
    }
}

fn is_variable_reference(value: &str) -> bool {
    value.starts_with("${") && value.ends_with('}') && value.len() > 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::VariableAssignment;
    use crate::snapshot::Project;

    fn snapshot_with(variables: Vec<VariableAssignment>) -> Snapshot {
        let mut project = Project::new("p");
        project.variables = variables;
        let mut snapshot = Snapshot::new("v1", None);
        snapshot.projects.push(project);
        snapshot.finalize();
        snapshot
    }

    #[test]
    fn literal_resolves_to_singleton() {
        let snapshot = snapshot_with(Vec::new());
        let fetcher = SnapshotValues::new(&snapshot);

        let values = fetcher.values(&Argument::positional("button1"));
        assert_eq!(values, BTreeSet::from(["button1".to_owned()]));
    }

    #[test]
    fn variable_resolves_through_assignment() {
        let snapshot = snapshot_with(vec![VariableAssignment::new(
            "${target}",
            vec!["a".into(), "${other}".into()],
        ), VariableAssignment::new("${other}", vec!["b".into()])]);
        let fetcher = SnapshotValues::new(&snapshot);

        let values = fetcher.values(&Argument::positional("${target}"));
        assert_eq!(values, BTreeSet::from(["a".to_owned(), "b".to_owned()]));
    }

    #[test]
    fn unknown_variable_resolves_to_empty_set() {
        let snapshot = snapshot_with(Vec::new());
        let fetcher = SnapshotValues::new(&snapshot);

        assert!(fetcher.values(&Argument::positional("${missing}")).is_empty());
    }

    #[test]
    fn variable_cycles_terminate() {
        let snapshot = snapshot_with(vec![
            VariableAssignment::new("${a}", vec!["${b}".into()]),
            VariableAssignment::new("${b}", vec!["${a}".into(), "stop".into()]),
        ]);
        let fetcher = SnapshotValues::new(&snapshot);

        let values = fetcher.values(&Argument::positional("${a}"));
        assert_eq!(values, BTreeSet::from(["stop".to_owned()]));
    }
}
