use serde::Serialize;
use testevo_model::{Scoped, Snapshot, TestCase, call_level, sequence_size, test_size};

/// Per-version summary statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub version: String,
    pub date: Option<i64>,
    pub number_projects: u64,
    pub number_test_cases: u64,
    pub number_keywords: u64,
    pub number_variables: u64,
    pub number_lines: u64,
}

impl VersionRecord {
    pub fn of(snapshot: &Snapshot) -> Self {
        Self {
            version: snapshot.version_id.clone(),
            date: snapshot.timestamp,
            number_projects: snapshot.projects.len() as u64,
            number_test_cases: snapshot.test_cases().len() as u64,
            number_keywords: snapshot.user_keywords().len() as u64,
            number_variables: snapshot.variables().len() as u64,
            number_lines: snapshot.lines(),
        }
    }
}

/// Per-test-case structural metrics for one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRecord {
    pub version: String,
    pub test_case_name: String,
    pub size: u32,
    pub sequence: u32,
    pub level: u32,
}

impl TestRecord {
    pub fn of(snapshot: &Snapshot, test_case: Scoped<'_, TestCase>) -> Self {
        Self {
            version: snapshot.version_id.clone(),
            test_case_name: test_case.node.name.clone(),
            size: test_size(test_case.node, snapshot),
            sequence: sequence_size(test_case.node, snapshot),
            level: call_level(test_case.node, snapshot),
        }
    }
}

/// Lifecycle of one smell instance relative to the previous version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SmellStatus {
    Introduced,
    Persisting,
    Fixed,
}

impl SmellStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Introduced => "introduced",
            Self::Persisting => "persisting",
            Self::Fixed => "fixed",
        }
    }
}

/// One (test case, smell kind) observation in one version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmellRecord {
    pub version: String,
    pub test_case_name: String,
    pub test_case_size: u32,
    pub test_case_sequence: u32,
    pub test_case_level: u32,
    pub smell_name: String,
    pub smell_metric: f64,
    pub fixes_count: u64,
    pub status: SmellStatus,
}

/// A complete swap of an argument's resolved value set between two
/// versions of a keyword definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueChangeRecord {
    pub version: String,
    pub keyword_name: String,
    pub before_argument: String,
    pub before_values: Vec<String>,
    pub after_argument: String,
    pub after_values: Vec<String>,
}

/// Envelope written by record writers; the `record` tag keeps mixed
/// streams self-describing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum EvolutionRecord {
    Version(VersionRecord),
    Test(TestRecord),
    Smell(SmellRecord),
    ValueChange(ValueChangeRecord),
}
