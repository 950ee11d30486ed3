use std::collections::BTreeSet;

use testevo_align::align;
use testevo_model::{NodeKind, NodeRef, Scoped, UserKeyword, ValueFetcher};

use crate::matcher::MatchPair;

/// An argument of a library call whose set of resolvable values was
/// swapped wholesale between two versions of a keyword definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChange {
    pub keyword_name: String,
    pub before: NodeRef,
    pub before_values: BTreeSet<String>,
    pub after: NodeRef,
    pub after_values: BTreeSet<String>,
}

/// Detects complete value swaps in arguments of matched keyword
/// definitions.
///
/// Step sequences are aligned by called keyword; only pairs where both
/// sides resolve to a library call are inspected, since calls into other
/// user keywords carry no leaf values of their own. A change is reported
/// only when both resolved sets are non-empty and share no value: a set
/// that merely grew or shrank still overlaps and is not a behavioral
/// swap.
pub fn extract_value_changes(
    pairs: &[MatchPair<Scoped<'_, UserKeyword>, Scoped<'_, UserKeyword>>],
    previous_values: &dyn ValueFetcher,
    current_values: &dyn ValueFetcher,
) -> Vec<ValueChange> {
    let mut changes = Vec::new();

    for pair in pairs {
        let (Some(previous), Some(current)) = (&pair.previous, &pair.current) else {
            continue;
        };

        let alignment = align(&previous.node.steps, &current.node.steps, |a, b| {
            a.keyword == b.keyword
        });
        for (left, right) in alignment {
            let (Some(left), Some(right)) = (left, right) else {
                continue;
            };
            let before_step = &previous.node.steps[left];
            let after_step = &current.node.steps[right];
            if !before_step.is_library_call() || !after_step.is_library_call() {
                continue;
            }

            let argument_alignment = align(
                &before_step.arguments,
                &after_step.arguments,
                |a, b| match (&a.name, &b.name) {
                    (Some(left_name), Some(right_name)) => left_name == right_name,
                    (None, None) => true,
                    _ => false,
                },
            );
            for (before_index, after_index) in argument_alignment {
                let (Some(before_index), Some(after_index)) = (before_index, after_index) else {
                    continue;
                };
                let before_argument = &before_step.arguments[before_index];
                let after_argument = &after_step.arguments[after_index];

                let before_set = previous_values.values(before_argument);
                let after_set = current_values.values(after_argument);
                if before_set.is_empty() || after_set.is_empty() {
                    continue;
                }
                if before_set.intersection(&after_set).next().is_some() {
                    continue;
                }

                changes.push(ValueChange {
                    keyword_name: current.node.name.clone(),
                    before: NodeRef {
                        id: before_argument.id,
                        kind: NodeKind::Argument,
                        name: before_argument.label().to_owned(),
                        project: previous.project.to_owned(),
                    },
                    before_values: before_set,
                    after: NodeRef {
                        id: after_argument.id,
                        kind: NodeKind::Argument,
                        name: after_argument.label().to_owned(),
                        project: current.project.to_owned(),
                    },
                    after_values: after_set,
                });
            }
        }
    }

    changes
}
