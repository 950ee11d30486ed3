use std::collections::BTreeMap;

use crate::node::{NodeId, NodeKind, NodeRef};
use crate::snapshot::Snapshot;

/// Parent index over one snapshot, answering "does this edit lie inside
/// that node" for fix attribution without walking the owned tree.
#[derive(Debug, Clone, Default)]
pub struct Containment {
    parents: BTreeMap<NodeId, NodeId>,
    refs: BTreeMap<NodeId, NodeRef>,
}

impl Containment {
    pub fn of(snapshot: &Snapshot) -> Self {
        let mut index = Self::default();

        for project in &snapshot.projects {
            let project_name = project.name.as_str();
            for test_case in &project.test_cases {
                index.insert(test_case.id, None, NodeKind::TestCase, &test_case.name, project_name);
                if let Some(documentation) = &test_case.documentation {
                    index.insert(
                        documentation.id,
                        Some(test_case.id),
                        NodeKind::Documentation,
                        &documentation.text,
                        project_name,
                    );
                }
                for tag in &test_case.tags {
                    index.insert(tag.id, Some(test_case.id), NodeKind::Tag, &tag.value, project_name);
                }
                for step in &test_case.steps {
                    index.insert(step.id, Some(test_case.id), NodeKind::Step, &step.keyword, project_name);
                    for argument in &step.arguments {
                        index.insert(
                            argument.id,
                            Some(step.id),
                            NodeKind::Argument,
                            argument.label(),
                            project_name,
                        );
                    }
                }
            }
            for keyword in &project.user_keywords {
                index.insert(keyword.id, None, NodeKind::UserKeyword, &keyword.name, project_name);
                if let Some(documentation) = &keyword.documentation {
                    index.insert(
                        documentation.id,
                        Some(keyword.id),
                        NodeKind::Documentation,
                        &documentation.text,
                        project_name,
                    );
                }
                for tag in &keyword.tags {
                    index.insert(tag.id, Some(keyword.id), NodeKind::Tag, &tag.value, project_name);
                }
                for step in &keyword.steps {
                    index.insert(step.id, Some(keyword.id), NodeKind::Step, &step.keyword, project_name);
                    for argument in &step.arguments {
                        index.insert(
                            argument.id,
                            Some(step.id),
                            NodeKind::Argument,
                            argument.label(),
                            project_name,
                        );
                    }
                }
            }
            for variable in &project.variables {
                index.insert(
                    variable.id,
                    None,
                    NodeKind::VariableAssignment,
                    &variable.name,
                    project_name,
                );
            }
        }

        index
    }

    fn insert(&mut self, id: NodeId, parent: Option<NodeId>, kind: NodeKind, name: &str, project: &str) {
        if let Some(parent) = parent {
            self.parents.insert(id, parent);
        }
        self.refs.insert(
            id,
            NodeRef {
                id,
                kind,
                name: name.to_owned(),
                project: project.to_owned(),
            },
        );
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    pub fn reference(&self, id: NodeId) -> Option<&NodeRef> {
        self.refs.get(&id)
    }

    /// Transitive containment; a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}
