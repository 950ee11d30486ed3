use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use testevo_model::{NodeId, Snapshot, TestCase};

use crate::config::SmellConfiguration;

/// The fixed battery of quality smells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SmellKind {
    MissingDocumentation,
    HardcodedValues,
    LongTestSteps,
    ArmyOfClones,
}

impl SmellKind {
    pub const ALL: [SmellKind; 4] = [
        SmellKind::MissingDocumentation,
        SmellKind::HardcodedValues,
        SmellKind::LongTestSteps,
        SmellKind::ArmyOfClones,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingDocumentation => "missing_documentation",
            Self::HardcodedValues => "hardcoded_values",
            Self::LongTestSteps => "long_test_steps",
            Self::ArmyOfClones => "army_of_clones",
        }
    }
}

/// Outcome of one detector on one test case: a severity (0.0 means
/// clean) and the nodes responsible for the smell. The responsible set
/// is what fix attribution tests edits against in the next version.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SmellResult {
    pub severity: f64,
    pub nodes: BTreeSet<NodeId>,
}

/// All smell results of one test case in one version. Detectors always
/// produce an entry per kind so absence comparisons never miss a key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SmellResults {
    by_kind: BTreeMap<SmellKind, SmellResult>,
}

impl SmellResults {
    pub fn get(&self, kind: SmellKind) -> &SmellResult {
        static CLEAN: SmellResult = SmellResult {
            severity: 0.0,
            nodes: BTreeSet::new(),
        };
        self.by_kind.get(&kind).unwrap_or(&CLEAN)
    }

    pub fn severity(&self, kind: SmellKind) -> f64 {
        self.get(kind).severity
    }

    pub fn insert(&mut self, kind: SmellKind, result: SmellResult) {
        self.by_kind.insert(kind, result);
    }

    pub fn iter(&self) -> impl Iterator<Item = (SmellKind, &SmellResult)> {
        self.by_kind.iter().map(|(kind, result)| (*kind, result))
    }
}

trait SmellRule {
    fn kind(&self) -> SmellKind;
    fn detect(
        &self,
        test_case: &TestCase,
        snapshot: &Snapshot,
        configuration: &SmellConfiguration,
    ) -> SmellResult;
}

/// Registry of all smell rules; rules are independent pure functions.
pub struct SmellDetector {
    rules: Vec<Box<dyn SmellRule>>,
}

impl SmellDetector {
    pub fn all() -> Self {
        Self {
            rules: vec![
                Box::new(MissingDocumentationRule),
                Box::new(HardcodedValuesRule),
                Box::new(LongTestStepsRule),
                Box::new(ArmyOfClonesRule),
            ],
        }
    }

    pub fn compute_metrics(
        &self,
        test_case: &TestCase,
        snapshot: &Snapshot,
        configuration: &SmellConfiguration,
    ) -> SmellResults {
        let mut results = SmellResults::default();
        for rule in &self.rules {
            results.insert(rule.kind(), rule.detect(test_case, snapshot, configuration));
        }
        results
    }
}

struct MissingDocumentationRule;

impl SmellRule for MissingDocumentationRule {
    fn kind(&self) -> SmellKind {
        SmellKind::MissingDocumentation
    }

    fn detect(
        &self,
        test_case: &TestCase,
        _snapshot: &Snapshot,
        _configuration: &SmellConfiguration,
    ) -> SmellResult {
        let documented = test_case
            .documentation
            .as_ref()
            .is_some_and(|documentation| !documentation.text.trim().is_empty());
        if documented {
            SmellResult::default()
        } else {
            SmellResult {
                severity: 1.0,
                nodes: BTreeSet::from([test_case.id]),
            }
        }
    }
}

struct HardcodedValuesRule;

impl SmellRule for HardcodedValuesRule {
    fn kind(&self) -> SmellKind {
        SmellKind::HardcodedValues
    }

    fn detect(
        &self,
        test_case: &TestCase,
        _snapshot: &Snapshot,
        _configuration: &SmellConfiguration,
    ) -> SmellResult {
        let mut nodes = BTreeSet::new();
        for step in &test_case.steps {
            if !step.is_library_call() {
                continue;
            }
            for argument in &step.arguments {
                let value = argument.value.trim();
                if !value.is_empty() && !value.starts_with("${") {
                    nodes.insert(argument.id);
                }
            }
        }
        SmellResult {
            severity: nodes.len() as f64,
            nodes,
        }
    }
}

struct LongTestStepsRule;

impl SmellRule for LongTestStepsRule {
    fn kind(&self) -> SmellKind {
        SmellKind::LongTestSteps
    }

    fn detect(
        &self,
        test_case: &TestCase,
        _snapshot: &Snapshot,
        configuration: &SmellConfiguration,
    ) -> SmellResult {
        if test_case.steps.len() <= configuration.long_test_threshold {
            return SmellResult::default();
        }
        SmellResult {
            severity: test_case.steps.len() as f64,
            nodes: test_case.steps.iter().map(|step| step.id).collect(),
        }
    }
}

struct ArmyOfClonesRule;

impl SmellRule for ArmyOfClonesRule {
    fn kind(&self) -> SmellKind {
        SmellKind::ArmyOfClones
    }

    fn detect(
        &self,
        test_case: &TestCase,
        _snapshot: &Snapshot,
        configuration: &SmellConfiguration,
    ) -> SmellResult {
        let mut nodes = BTreeSet::new();
        for step in &test_case.steps {
            if step.binding == testevo_model::KeywordBinding::User
                && configuration.clones.is_clone(&step.keyword)
            {
                nodes.insert(step.id);
            }
        }
        SmellResult {
            severity: nodes.len() as f64,
            nodes,
        }
    }
}
