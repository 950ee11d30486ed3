use serde::Serialize;
use testevo_align::align;
use testevo_model::{
    Argument, Documentation, NodeKind, NodeRef, Scoped, Step, Tag, TestCase, UserKeyword,
    VariableAssignment,
};

use crate::matcher::MatchPair;

/// Closed set of structural change kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    AddNode,
    RemoveNode,
    ChangeName,
    AddDocumentation,
    RemoveDocumentation,
    ChangeDocumentation,
    AddTag,
    RemoveTag,
    AddStep,
    RemoveStep,
    MoveStep,
    ChangeStepKeyword,
    AddArgument,
    RemoveArgument,
    ChangeArgumentValue,
    ChangeVariableValue,
}

impl EditKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddNode => "add_node",
            Self::RemoveNode => "remove_node",
            Self::ChangeName => "change_name",
            Self::AddDocumentation => "add_documentation",
            Self::RemoveDocumentation => "remove_documentation",
            Self::ChangeDocumentation => "change_documentation",
            Self::AddTag => "add_tag",
            Self::RemoveTag => "remove_tag",
            Self::AddStep => "add_step",
            Self::RemoveStep => "remove_step",
            Self::MoveStep => "move_step",
            Self::ChangeStepKeyword => "change_step_keyword",
            Self::AddArgument => "add_argument",
            Self::RemoveArgument => "remove_argument",
            Self::ChangeArgumentValue => "change_argument_value",
            Self::ChangeVariableValue => "change_variable_value",
        }
    }
}

/// One typed change between the two sides of a matched pair.
///
/// `previous` is the nearest affected node on the previous side. For an
/// addition this is the node the child was added under, so containment
/// checks against previous-version node sets stay well defined.
/// `current` mirrors that on the current side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub kind: EditKind,
    pub previous: Option<NodeRef>,
    pub current: Option<NodeRef>,
}

impl Edit {
    fn new(kind: EditKind, previous: Option<NodeRef>, current: Option<NodeRef>) -> Self {
        Self {
            kind,
            previous,
            current,
        }
    }
}

/// Edit set for a matched pair of test cases. Total: never fails, and a
/// node diffed against itself yields no edits.
pub fn diff_test_cases(
    pair: &MatchPair<Scoped<'_, TestCase>, Scoped<'_, TestCase>>,
) -> Vec<Edit> {
    match (&pair.previous, &pair.current) {
        (Some(previous), Some(current)) => {
            let previous_view = KeywordView::of_test_case(previous);
            let current_view = KeywordView::of_test_case(current);
            diff_keyword_like(&previous_view, &current_view)
        }
        (Some(previous), None) => vec![Edit::new(
            EditKind::RemoveNode,
            Some(previous.node_ref()),
            None,
        )],
        (None, Some(current)) => vec![Edit::new(EditKind::AddNode, None, Some(current.node_ref()))],
        (None, None) => Vec::new(),
    }
}

/// Edit set for a matched pair of user keyword definitions.
pub fn diff_user_keywords(
    pair: &MatchPair<Scoped<'_, UserKeyword>, Scoped<'_, UserKeyword>>,
) -> Vec<Edit> {
    match (&pair.previous, &pair.current) {
        (Some(previous), Some(current)) => {
            let previous_view = KeywordView::of_user_keyword(previous);
            let current_view = KeywordView::of_user_keyword(current);
            diff_keyword_like(&previous_view, &current_view)
        }
        (Some(previous), None) => vec![Edit::new(
            EditKind::RemoveNode,
            Some(previous.node_ref()),
            None,
        )],
        (None, Some(current)) => vec![Edit::new(EditKind::AddNode, None, Some(current.node_ref()))],
        (None, None) => Vec::new(),
    }
}

/// Edit set for a matched pair of variable assignments.
pub fn diff_variables(
    pair: &MatchPair<Scoped<'_, VariableAssignment>, Scoped<'_, VariableAssignment>>,
) -> Vec<Edit> {
    match (&pair.previous, &pair.current) {
        (Some(previous), Some(current)) => {
            let mut edits = Vec::new();
            if previous.node.name != current.node.name {
                edits.push(Edit::new(
                    EditKind::ChangeName,
                    Some(previous.node_ref()),
                    Some(current.node_ref()),
                ));
            }
            if previous.node.values != current.node.values {
                edits.push(Edit::new(
                    EditKind::ChangeVariableValue,
                    Some(previous.node_ref()),
                    Some(current.node_ref()),
                ));
            }
            edits
        }
        (Some(previous), None) => vec![Edit::new(
            EditKind::RemoveNode,
            Some(previous.node_ref()),
            None,
        )],
        (None, Some(current)) => vec![Edit::new(EditKind::AddNode, None, Some(current.node_ref()))],
        (None, None) => Vec::new(),
    }
}

/// Common shape of test cases and user keyword definitions.
struct KeywordView<'a> {
    project: &'a str,
    owner: NodeRef,
    name: &'a str,
    documentation: Option<&'a Documentation>,
    tags: &'a [Tag],
    steps: &'a [Step],
}

impl<'a> KeywordView<'a> {
    fn of_test_case(scoped: &Scoped<'a, TestCase>) -> Self {
        Self {
            project: scoped.project,
            owner: scoped.node_ref(),
            name: &scoped.node.name,
            documentation: scoped.node.documentation.as_ref(),
            tags: &scoped.node.tags,
            steps: &scoped.node.steps,
        }
    }

    fn of_user_keyword(scoped: &Scoped<'a, UserKeyword>) -> Self {
        Self {
            project: scoped.project,
            owner: scoped.node_ref(),
            name: &scoped.node.name,
            documentation: scoped.node.documentation.as_ref(),
            tags: &scoped.node.tags,
            steps: &scoped.node.steps,
        }
    }

    fn documentation_ref(&self, documentation: &Documentation) -> NodeRef {
        NodeRef {
            id: documentation.id,
            kind: NodeKind::Documentation,
            name: documentation.text.clone(),
            project: self.project.to_owned(),
        }
    }

    fn tag_ref(&self, tag: &Tag) -> NodeRef {
        NodeRef {
            id: tag.id,
            kind: NodeKind::Tag,
            name: tag.value.clone(),
            project: self.project.to_owned(),
        }
    }

    fn step_ref(&self, step: &Step) -> NodeRef {
        NodeRef {
            id: step.id,
            kind: NodeKind::Step,
            name: step.keyword.clone(),
            project: self.project.to_owned(),
        }
    }

    fn argument_ref(&self, argument: &Argument) -> NodeRef {
        NodeRef {
            id: argument.id,
            kind: NodeKind::Argument,
            name: argument.label().to_owned(),
            project: self.project.to_owned(),
        }
    }
}

fn diff_keyword_like(previous: &KeywordView<'_>, current: &KeywordView<'_>) -> Vec<Edit> {
    let mut edits = Vec::new();

    if previous.name != current.name {
        edits.push(Edit::new(
            EditKind::ChangeName,
            Some(previous.owner.clone()),
            Some(current.owner.clone()),
        ));
    }

    diff_documentation(previous, current, &mut edits);
    diff_tags(previous, current, &mut edits);
    diff_steps(previous, current, &mut edits);

    edits
}

fn diff_documentation(previous: &KeywordView<'_>, current: &KeywordView<'_>, edits: &mut Vec<Edit>) {
    match (previous.documentation, current.documentation) {
        (None, Some(added)) if !added.text.trim().is_empty() => {
            edits.push(Edit::new(
                EditKind::AddDocumentation,
                Some(previous.owner.clone()),
                Some(current.documentation_ref(added)),
            ));
        }
        (Some(removed), None) if !removed.text.trim().is_empty() => {
            edits.push(Edit::new(
                EditKind::RemoveDocumentation,
                Some(previous.documentation_ref(removed)),
                Some(current.owner.clone()),
            ));
        }
        (Some(before), Some(after)) if before.text != after.text => {
            let kind = if before.text.trim().is_empty() {
                // empty to non-empty counts as an addition
                EditKind::AddDocumentation
            } else if after.text.trim().is_empty() {
                EditKind::RemoveDocumentation
            } else {
                EditKind::ChangeDocumentation
            };
            edits.push(Edit::new(
                kind,
                Some(previous.documentation_ref(before)),
                Some(current.documentation_ref(after)),
            ));
        }
        _ => {}
    }
}

fn diff_tags(previous: &KeywordView<'_>, current: &KeywordView<'_>, edits: &mut Vec<Edit>) {
    for tag in previous.tags {
        if !current.tags.iter().any(|other| other.value == tag.value) {
            edits.push(Edit::new(
                EditKind::RemoveTag,
                Some(previous.tag_ref(tag)),
                Some(current.owner.clone()),
            ));
        }
    }
    for tag in current.tags {
        if !previous.tags.iter().any(|other| other.value == tag.value) {
            edits.push(Edit::new(
                EditKind::AddTag,
                Some(previous.owner.clone()),
                Some(current.tag_ref(tag)),
            ));
        }
    }
}

fn diff_steps(previous: &KeywordView<'_>, current: &KeywordView<'_>, edits: &mut Vec<Edit>) {
    let alignment = align(previous.steps, current.steps, |a, b| a.keyword == b.keyword);

    let mut removed: Vec<&Step> = Vec::new();
    let mut added: Vec<&Step> = Vec::new();

    for (left, right) in alignment {
        match (left, right) {
            (Some(left), Some(right)) => {
                let before = &previous.steps[left];
                let after = &current.steps[right];
                if before.keyword == after.keyword {
                    diff_arguments(previous, before, current, after, edits);
                } else if arguments_identical(before, after) {
                    edits.push(Edit::new(
                        EditKind::ChangeStepKeyword,
                        Some(previous.step_ref(before)),
                        Some(current.step_ref(after)),
                    ));
                } else {
                    // structurally incomparable slot: resolved as a
                    // removal plus an addition, never a failure
                    removed.push(before);
                    added.push(after);
                }
            }
            (Some(left), None) => removed.push(&previous.steps[left]),
            (None, Some(right)) => added.push(&current.steps[right]),
            (None, None) => {}
        }
    }

    // a step removed here and added there with identical content is a move
    for step in removed {
        let relocated = added
            .iter()
            .position(|candidate| steps_equivalent(step, candidate));
        match relocated {
            Some(position) => {
                let target = added.remove(position);
                edits.push(Edit::new(
                    EditKind::MoveStep,
                    Some(previous.step_ref(step)),
                    Some(current.step_ref(target)),
                ));
            }
            None => edits.push(Edit::new(
                EditKind::RemoveStep,
                Some(previous.step_ref(step)),
                Some(current.owner.clone()),
            )),
        }
    }
    for step in added {
        edits.push(Edit::new(
            EditKind::AddStep,
            Some(previous.owner.clone()),
            Some(current.step_ref(step)),
        ));
    }
}

fn steps_equivalent(left: &Step, right: &Step) -> bool {
    left.keyword == right.keyword && left.binding == right.binding && arguments_identical(left, right)
}

fn arguments_identical(left: &Step, right: &Step) -> bool {
    left.arguments.len() == right.arguments.len()
        && left
            .arguments
            .iter()
            .zip(right.arguments.iter())
            .all(|(a, b)| a.name == b.name && a.value == b.value)
}

fn diff_arguments(
    previous: &KeywordView<'_>,
    before: &Step,
    current: &KeywordView<'_>,
    after: &Step,
    edits: &mut Vec<Edit>,
) {
    let alignment = align(&before.arguments, &after.arguments, arguments_comparable);
    for (left, right) in alignment {
        match (left, right) {
            (Some(left), Some(right)) => {
                let before_argument = &before.arguments[left];
                let after_argument = &after.arguments[right];
                if before_argument.value != after_argument.value {
                    edits.push(Edit::new(
                        EditKind::ChangeArgumentValue,
                        Some(previous.argument_ref(before_argument)),
                        Some(current.argument_ref(after_argument)),
                    ));
                }
            }
            (Some(left), None) => edits.push(Edit::new(
                EditKind::RemoveArgument,
                Some(previous.argument_ref(&before.arguments[left])),
                Some(current.step_ref(after)),
            )),
            (None, Some(right)) => edits.push(Edit::new(
                EditKind::AddArgument,
                Some(previous.step_ref(before)),
                Some(current.argument_ref(&after.arguments[right])),
            )),
            (None, None) => {}
        }
    }
}

/// Arguments occupy the same slot when their declared names agree; two
/// positional arguments are always comparable so a changed literal is a
/// value modification, not a remove plus an add.
fn arguments_comparable(left: &Argument, right: &Argument) -> bool {
    match (&left.name, &right.name) {
        (Some(left_name), Some(right_name)) => left_name == right_name,
        (None, None) => true,
        _ => false,
    }
}
