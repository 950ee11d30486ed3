use serde::{Deserialize, Serialize};

use crate::node::{
    NodeId, NodeKind, NodeRef, Step, TestCase, UserKeyword, VariableAssignment,
};

/// One project of a version: the test cases, user keyword definitions and
/// variable assignments declared under a common root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub user_keywords: Vec<UserKeyword>,
    #[serde(default)]
    pub variables: Vec<VariableAssignment>,
    #[serde(default)]
    pub lines: u64,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test_cases: Vec::new(),
            user_keywords: Vec::new(),
            variables: Vec::new(),
            lines: 0,
        }
    }
}

/// All projects of one analyzed version. Immutable once finalized; the
/// driver owns it for exactly one loop iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version_id: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// A node together with the name of its enclosing project. Matching and
/// diffing always need both since node identity is (project, name, kind).
#[derive(Debug)]
pub struct Scoped<'a, T> {
    pub project: &'a str,
    pub node: &'a T,
}

impl<T> Clone for Scoped<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Scoped<'_, T> {}

impl<'a, T: MatchEntity> Scoped<'a, T> {
    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            id: self.node.node_id(),
            kind: T::KIND,
            name: self.node.entity_name().to_owned(),
            project: self.project.to_owned(),
        }
    }
}

/// Entity kinds the cross-version matcher operates on.
///
/// The signature is a flat list of comparable tokens; two entities with
/// equal signatures have structurally identical bodies for matching
/// purposes.
pub trait MatchEntity {
    const KIND: NodeKind;

    fn node_id(&self) -> NodeId;
    fn entity_name(&self) -> &str;
    fn signature(&self) -> Vec<String>;
}

fn step_signature(steps: &[Step], out: &mut Vec<String>) {
    for step in steps {
        out.push(step.keyword.clone());
        for argument in &step.arguments {
            out.push(argument.value.clone());
        }
    }
}

impl MatchEntity for TestCase {
    const KIND: NodeKind = NodeKind::TestCase;

    fn node_id(&self) -> NodeId {
        self.id
    }

    fn entity_name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        step_signature(&self.steps, &mut tokens);
        tokens
    }
}

impl MatchEntity for UserKeyword {
    const KIND: NodeKind = NodeKind::UserKeyword;

    fn node_id(&self) -> NodeId {
        self.id
    }

    fn entity_name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> Vec<String> {
        let mut tokens = self.parameters.clone();
        step_signature(&self.steps, &mut tokens);
        tokens
    }
}

impl MatchEntity for VariableAssignment {
    const KIND: NodeKind = NodeKind::VariableAssignment;

    fn node_id(&self) -> NodeId {
        self.id
    }

    fn entity_name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> Vec<String> {
        self.values.clone()
    }
}

impl Snapshot {
    pub fn new(version_id: impl Into<String>, timestamp: Option<i64>) -> Self {
        Self {
            version_id: version_id.into(),
            timestamp,
            projects: Vec::new(),
        }
    }

    /// A version with no projects at all; matching against it yields no
    /// pairs so a first analyzed version is never reported as one big
    /// addition.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn lines(&self) -> u64 {
        self.projects.iter().map(|project| project.lines).sum()
    }

    /// Assigns every node a preorder [`NodeId`], starting at 1.
    ///
    /// Must be called exactly once after construction or deserialization;
    /// ids are `#[serde(skip)]` so a deserialized tree starts with all
    /// ids at zero.
    pub fn finalize(&mut self) {
        let mut next = 1u64;
        let mut assign = |id: &mut NodeId| {
            *id = NodeId(next);
            next += 1;
        };

        for project in &mut self.projects {
            for test_case in &mut project.test_cases {
                assign(&mut test_case.id);
                if let Some(documentation) = &mut test_case.documentation {
                    assign(&mut documentation.id);
                }
                for tag in &mut test_case.tags {
                    assign(&mut tag.id);
                }
                for step in &mut test_case.steps {
                    assign(&mut step.id);
                    for argument in &mut step.arguments {
                        assign(&mut argument.id);
                    }
                }
            }
            for keyword in &mut project.user_keywords {
                assign(&mut keyword.id);
                if let Some(documentation) = &mut keyword.documentation {
                    assign(&mut documentation.id);
                }
                for tag in &mut keyword.tags {
                    assign(&mut tag.id);
                }
                for step in &mut keyword.steps {
                    assign(&mut step.id);
                    for argument in &mut step.arguments {
                        assign(&mut argument.id);
                    }
                }
            }
            for variable in &mut project.variables {
                assign(&mut variable.id);
            }
        }
    }

    pub fn test_cases(&self) -> Vec<Scoped<'_, TestCase>> {
        self.projects
            .iter()
            .flat_map(|project| {
                project.test_cases.iter().map(|node| Scoped {
                    project: project.name.as_str(),
                    node,
                })
            })
            .collect()
    }

    pub fn user_keywords(&self) -> Vec<Scoped<'_, UserKeyword>> {
        self.projects
            .iter()
            .flat_map(|project| {
                project.user_keywords.iter().map(|node| Scoped {
                    project: project.name.as_str(),
                    node,
                })
            })
            .collect()
    }

    pub fn variables(&self) -> Vec<Scoped<'_, VariableAssignment>> {
        self.projects
            .iter()
            .flat_map(|project| {
                project.variables.iter().map(|node| Scoped {
                    project: project.name.as_str(),
                    node,
                })
            })
            .collect()
    }

    pub fn find_user_keyword(&self, name: &str) -> Option<&UserKeyword> {
        self.projects
            .iter()
            .flat_map(|project| project.user_keywords.iter())
            .find(|keyword| keyword.name == name)
    }
}
