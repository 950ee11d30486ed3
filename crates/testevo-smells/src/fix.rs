use std::collections::BTreeSet;

use testevo_diff::{Edit, EditKind};
use testevo_model::{Containment, NodeId};

use crate::detectors::SmellKind;

/// Edit kinds that can plausibly remove the cause of each smell. An
/// edit of any other kind never counts as a fix even when it touches a
/// responsible node.
pub fn fix_edit_kinds(kind: SmellKind) -> &'static [EditKind] {
    match kind {
        SmellKind::MissingDocumentation => {
            &[EditKind::AddDocumentation, EditKind::ChangeDocumentation]
        }
        SmellKind::HardcodedValues => &[
            EditKind::ChangeArgumentValue,
            EditKind::RemoveArgument,
            EditKind::RemoveStep,
        ],
        SmellKind::LongTestSteps => &[EditKind::RemoveStep],
        SmellKind::ArmyOfClones => &[EditKind::RemoveStep, EditKind::ChangeStepKeyword],
    }
}

/// Whether this edit is a causal fix candidate for a smell previously
/// flagged on `responsible` nodes: the edit kind must be allowed for
/// the smell and the edit's previous-side node must lie within one of
/// the responsible nodes of the previous version.
pub fn is_fix(
    kind: SmellKind,
    responsible: &BTreeSet<NodeId>,
    edit: &Edit,
    previous_containment: &Containment,
) -> bool {
    if !fix_edit_kinds(kind).contains(&edit.kind) {
        return false;
    }
    let Some(previous) = &edit.previous else {
        return false;
    };
    responsible
        .iter()
        .any(|&node| previous_containment.contains(node, previous.id))
}
