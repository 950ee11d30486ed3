use serde::{Deserialize, Serialize};

/// Identifier of a node within one snapshot.
///
/// Assigned by [`crate::Snapshot::finalize`] in preorder; never reused
/// across snapshots and never a cross-version identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    TestCase,
    UserKeyword,
    LibraryKeyword,
    Step,
    Argument,
    VariableAssignment,
    Documentation,
    Tag,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TestCase => "test_case",
            Self::UserKeyword => "user_keyword",
            Self::LibraryKeyword => "library_keyword",
            Self::Step => "step",
            Self::Argument => "argument",
            Self::VariableAssignment => "variable_assignment",
            Self::Documentation => "documentation",
            Self::Tag => "tag",
        }
    }
}

/// Positional reference to a node, carried by edits and smell results so
/// later stages can locate the node without holding the tree itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeRef {
    #[serde(skip)]
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    pub project: String,
}

/// Who provides the keyword a step calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeywordBinding {
    User,
    Library,
    #[default]
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    #[serde(skip)]
    pub id: NodeId,
    pub text: String,
}

impl Documentation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: NodeId::default(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(skip)]
    pub id: NodeId,
    pub value: String,
}

impl Tag {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: NodeId::default(),
            value: value.into(),
        }
    }
}

/// One argument of a keyword call. `name` is set for `name=value` style
/// arguments, positional arguments leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(skip)]
    pub id: NodeId,
    #[serde(default)]
    pub name: Option<String>,
    pub value: String,
}

impl Argument {
    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            id: NodeId::default(),
            name: None,
            value: value.into(),
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: NodeId::default(),
            name: Some(name.into()),
            value: value.into(),
        }
    }

    /// Label used when aligning argument lists: the declared name when
    /// present, the literal value otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.value.as_str())
    }
}

/// One call inside a test case or user keyword body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(skip)]
    pub id: NodeId,
    pub keyword: String,
    #[serde(default)]
    pub binding: KeywordBinding,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl Step {
    pub fn library(keyword: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            id: NodeId::default(),
            keyword: keyword.into(),
            binding: KeywordBinding::Library,
            arguments,
        }
    }

    pub fn user(keyword: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            id: NodeId::default(),
            keyword: keyword.into(),
            binding: KeywordBinding::User,
            arguments,
        }
    }

    pub fn is_library_call(&self) -> bool {
        self.binding == KeywordBinding::Library
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(skip)]
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub documentation: Option<Documentation>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::default(),
            name: name.into(),
            documentation: None,
            tags: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_documentation(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(Documentation::new(text));
        self
    }

    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }
}

/// A reusable keyword defined inside the analyzed suite, as opposed to a
/// keyword provided by an external library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserKeyword {
    #[serde(skip)]
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub documentation: Option<Documentation>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl UserKeyword {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::default(),
            name: name.into(),
            documentation: None,
            tags: Vec::new(),
            parameters: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_documentation(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(Documentation::new(text));
        self
    }

    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableAssignment {
    #[serde(skip)]
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl VariableAssignment {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            id: NodeId::default(),
            name: name.into(),
            values,
        }
    }
}
