use std::collections::BTreeSet;

use crate::node::{KeywordBinding, Step, TestCase};
use crate::snapshot::Snapshot;

/// Number of calls in the expanded call tree of a test case, user
/// keyword bodies included. Recursive keyword definitions are counted
/// once per lineage.
pub fn test_size(test_case: &TestCase, snapshot: &Snapshot) -> u32 {
    let mut visiting = BTreeSet::new();
    size_of_steps(&test_case.steps, snapshot, &mut visiting)
}

/// Number of leaf library calls the test case executes transitively.
pub fn sequence_size(test_case: &TestCase, snapshot: &Snapshot) -> u32 {
    let mut visiting = BTreeSet::new();
    sequence_of_steps(&test_case.steps, snapshot, &mut visiting)
}

/// Maximum user-keyword nesting depth below the test case.
pub fn call_level(test_case: &TestCase, snapshot: &Snapshot) -> u32 {
    let mut visiting = BTreeSet::new();
    level_of_steps(&test_case.steps, snapshot, &mut visiting)
}

fn size_of_steps(steps: &[Step], snapshot: &Snapshot, visiting: &mut BTreeSet<String>) -> u32 {
    let mut size = 0;
    for step in steps {
        size += 1;
        if step.binding == KeywordBinding::User
            && visiting.insert(step.keyword.clone())
        {
            if let Some(keyword) = snapshot.find_user_keyword(&step.keyword) {
                size += size_of_steps(&keyword.steps, snapshot, visiting);
            }
            visiting.remove(&step.keyword);
        }
    }
    size
}

fn sequence_of_steps(steps: &[Step], snapshot: &Snapshot, visiting: &mut BTreeSet<String>) -> u32 {
    let mut count = 0;
    for step in steps {
        match step.binding {
            KeywordBinding::Library | KeywordBinding::Unresolved => count += 1,
            KeywordBinding::User => {
                if visiting.insert(step.keyword.clone()) {
                    if let Some(keyword) = snapshot.find_user_keyword(&step.keyword) {
                        count += sequence_of_steps(&keyword.steps, snapshot, visiting);
                    }
                    visiting.remove(&step.keyword);
                }
            }
        }
    }
    count
}

fn level_of_steps(steps: &[Step], snapshot: &Snapshot, visiting: &mut BTreeSet<String>) -> u32 {
    let mut level = 0;
    for step in steps {
        if step.binding == KeywordBinding::User
            && visiting.insert(step.keyword.clone())
        {
            if let Some(keyword) = snapshot.find_user_keyword(&step.keyword) {
                level = level.max(1 + level_of_steps(&keyword.steps, snapshot, visiting));
            }
            visiting.remove(&step.keyword);
        }
    }
    level
}
