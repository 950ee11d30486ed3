use std::collections::BTreeMap;

use testevo_diff::{Edit, MatchPair};
use testevo_export::{SmellRecord, SmellStatus};
use testevo_model::{
    Containment, MatchEntity, Scoped, Snapshot, TestCase, call_level, sequence_size, test_size,
};
use tracing::debug;

use crate::config::SmellConfiguration;
use crate::detectors::{SmellDetector, SmellKind, SmellResults};
use crate::fix::is_fix;
use crate::history::{History, lineage_key};

/// Per-version context shared by every `add_test_case` call of one
/// transition. Previous-version data is keyed by lineage so no node
/// reference outlives its snapshot.
pub struct AccumulatorInput<'a> {
    pub version_id: &'a str,
    pub snapshot: &'a Snapshot,
    pub previous_results: &'a BTreeMap<String, SmellResults>,
    pub previous_containment: &'a Containment,
    pub configuration: &'a SmellConfiguration,
}

/// Accumulates smell records for one version and classifies each
/// (smell, test case) against the previous version.
///
/// A smell counts as fixed only when its severity strictly decreased
/// AND at least one edit of an allowed kind touched a previously
/// responsible node. A severity drop with no such edit is circumstance,
/// not a fix, and leaves the history span open. A removed test case
/// fixes nothing.
pub struct SmellRecordAccumulator {
    detector: SmellDetector,
    records: Vec<SmellRecord>,
    results: BTreeMap<String, SmellResults>,
}

impl Default for SmellRecordAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl SmellRecordAccumulator {
    pub fn new() -> Self {
        Self {
            detector: SmellDetector::all(),
            records: Vec::new(),
            results: BTreeMap::new(),
        }
    }

    pub fn add_test_case(
        &mut self,
        input: &AccumulatorInput<'_>,
        pair: &MatchPair<Scoped<'_, TestCase>, Scoped<'_, TestCase>>,
        edits: &[Edit],
        history: &mut History,
    ) {
        let Some(test_case) = pair.current else {
            return;
        };

        let results =
            self.detector
                .compute_metrics(test_case.node, input.snapshot, input.configuration);
        let key = lineage_key(test_case.project, test_case.node.entity_name());

        let previous_results = pair.previous.and_then(|previous| {
            input
                .previous_results
                .get(&lineage_key(previous.project, previous.node.entity_name()))
        });

        for kind in SmellKind::ALL {
            let severity = results.severity(kind);
            let previous = previous_results.map(|results| results.get(kind));
            let previous_severity = previous.map_or(0.0, |result| result.severity);

            let fixes_count = previous
                .filter(|result| result.severity > 0.0)
                .map_or(0, |result| {
                    edits
                        .iter()
                        .filter(|edit| {
                            is_fix(kind, &result.nodes, edit, input.previous_containment)
                        })
                        .count()
                });

            let fixed = previous_severity > 0.0 && severity < previous_severity && fixes_count > 0;

            if severity > 0.0 {
                history.record_introduced(kind, &key, input.version_id);
            } else if fixed {
                history.record_fixed(kind, &key, input.version_id);
            }

            let status = if fixed {
                SmellStatus::Fixed
            } else if previous_severity > 0.0 {
                SmellStatus::Persisting
            } else {
                SmellStatus::Introduced
            };

            if severity > 0.0 || fixed {
                debug!(
                    smell = kind.as_str(),
                    test_case = %key,
                    severity,
                    fixes_count,
                    status = status.as_str(),
                    "smell recorded"
                );
                self.records.push(SmellRecord {
                    version: input.version_id.to_owned(),
                    test_case_name: key.clone(),
                    test_case_size: test_size(test_case.node, input.snapshot),
                    test_case_sequence: sequence_size(test_case.node, input.snapshot),
                    test_case_level: call_level(test_case.node, input.snapshot),
                    smell_name: kind.as_str().to_owned(),
                    smell_metric: severity,
                    fixes_count: fixes_count as u64,
                    status,
                });
            }
        }

        self.results.insert(key, results);
    }

    pub fn records(&self) -> &[SmellRecord] {
        &self.records
    }

    /// Hands the per-lineage results over for seeding the next
    /// transition.
    pub fn into_results(self) -> BTreeMap<String, SmellResults> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloneIndex;
    use testevo_diff::{diff_test_cases, match_entities};
    use testevo_model::{Argument, Project, Step, UserKeyword};

    fn snapshot(version: &str, test_cases: Vec<TestCase>, keywords: Vec<UserKeyword>) -> Snapshot {
        let mut project = Project::new("shop");
        project.test_cases = test_cases;
        project.user_keywords = keywords;
        let mut snapshot = Snapshot::new(version, None);
        snapshot.projects.push(project);
        snapshot.finalize();
        snapshot
    }

    struct VersionOutcome {
        records: Vec<SmellRecord>,
        results: BTreeMap<String, SmellResults>,
    }

    fn run_transition(
        previous: Option<(&Snapshot, &BTreeMap<String, SmellResults>)>,
        current: &Snapshot,
        history: &mut History,
    ) -> VersionOutcome {
        let empty_snapshot = Snapshot::new("none", None);
        let empty_results = BTreeMap::new();
        let (previous_snapshot, previous_results) = match previous {
            Some((snapshot, results)) => (snapshot, results),
            None => (&empty_snapshot, &empty_results),
        };

        let previous_cases = previous_snapshot.test_cases();
        let current_cases = current.test_cases();
        let pairs = match_entities(&previous_cases, &current_cases, false);
        let pairs = if pairs.is_empty() {
            current_cases.iter().copied().map(MatchPair::added).collect()
        } else {
            pairs
        };
        history.rekey(&pairs);

        let previous_containment = Containment::of(previous_snapshot);
        let configuration =
            SmellConfiguration::default().with_clones(CloneIndex::detect(current));
        let input = AccumulatorInput {
            version_id: &current.version_id,
            snapshot: current,
            previous_results,
            previous_containment: &previous_containment,
            configuration: &configuration,
        };

        let mut accumulator = SmellRecordAccumulator::new();
        for pair in &pairs {
            let edits = diff_test_cases(pair);
            accumulator.add_test_case(&input, pair, &edits, history);
        }

        let records = accumulator.records().to_vec();
        VersionOutcome {
            records,
            results: accumulator.into_results(),
        }
    }

    fn record<'a>(records: &'a [SmellRecord], smell: &str) -> &'a SmellRecord {
        records
            .iter()
            .find(|record| record.smell_name == smell)
            .expect("record for smell")
    }

    #[test]
    fn documentation_fix_closes_the_lineage_span() {
        let v1 = snapshot("v1", vec![TestCase::new("Login")], Vec::new());
        let v2 = snapshot(
            "v2",
            vec![TestCase::new("Login").with_documentation("logs the user in")],
            Vec::new(),
        );
        let mut history = History::default();

        let first = run_transition(None, &v1, &mut history);
        let introduced = record(&first.records, "missing_documentation");
        assert_eq!(introduced.status, SmellStatus::Introduced);
        assert_eq!(introduced.fixes_count, 0);

        let second = run_transition(Some((&v1, &first.results)), &v2, &mut history);
        let fixed = record(&second.records, "missing_documentation");
        assert_eq!(fixed.status, SmellStatus::Fixed);
        assert_eq!(fixed.smell_metric, 0.0);
        assert_eq!(fixed.fixes_count, 1);

        let key = lineage_key("shop", "Login");
        let spans = history.spans(SmellKind::MissingDocumentation, &key);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].introduced_in, "v1");
        assert_eq!(spans[0].fixed_in.as_deref(), Some("v2"));
    }

    #[test]
    fn severity_drop_without_causal_edit_is_not_a_fix() {
        // The test case itself never changes; the smell vanishes because
        // the clone group dissolves when the sibling keyword is deleted.
        let login = || {
            TestCase::new("Login")
                .with_documentation("ok")
                .with_steps(vec![Step::user("Copy A", Vec::new())])
        };
        let clone_body = || vec![Step::library("Click", Vec::new())];
        let v1 = snapshot(
            "v1",
            vec![login()],
            vec![
                UserKeyword::new("Copy A").with_steps(clone_body()),
                UserKeyword::new("Copy B").with_steps(clone_body()),
            ],
        );
        let v2 = snapshot(
            "v2",
            vec![login()],
            vec![UserKeyword::new("Copy A").with_steps(clone_body())],
        );
        let mut history = History::default();

        let first = run_transition(None, &v1, &mut history);
        assert_eq!(
            record(&first.records, "army_of_clones").status,
            SmellStatus::Introduced
        );

        let second = run_transition(Some((&v1, &first.results)), &v2, &mut history);
        assert!(
            second
                .records
                .iter()
                .all(|record| record.smell_name != "army_of_clones"),
            "a severity drop with no causal edit must not be reported as a fix"
        );

        let key = lineage_key("shop", "Login");
        assert_eq!(history.fix_count(SmellKind::ArmyOfClones, &key), 0);
        assert!(
            history.spans(SmellKind::ArmyOfClones, &key)[0]
                .fixed_in
                .is_none()
        );
    }

    #[test]
    fn partial_hardcoded_value_fix_keeps_the_span_open() {
        let v1 = snapshot(
            "v1",
            vec![TestCase::new("Order").with_documentation("ok").with_steps(vec![
                Step::library("Input Text", vec![Argument::positional("admin")]),
                Step::library("Input Text", vec![Argument::positional("secret")]),
            ])],
            Vec::new(),
        );
        let v2 = snapshot(
            "v2",
            vec![TestCase::new("Order").with_documentation("ok").with_steps(vec![
                Step::library("Input Text", vec![Argument::positional("${user}")]),
                Step::library("Input Text", vec![Argument::positional("secret")]),
            ])],
            Vec::new(),
        );
        let mut history = History::default();

        let first = run_transition(None, &v1, &mut history);
        assert_eq!(record(&first.records, "hardcoded_values").smell_metric, 2.0);

        let second = run_transition(Some((&v1, &first.results)), &v2, &mut history);
        let partial = record(&second.records, "hardcoded_values");
        assert_eq!(partial.smell_metric, 1.0);
        assert_eq!(partial.status, SmellStatus::Fixed);
        assert_eq!(partial.fixes_count, 1);

        // still smelly, so the lineage span stays open
        let key = lineage_key("shop", "Order");
        assert!(
            history.spans(SmellKind::HardcodedValues, &key)[0]
                .fixed_in
                .is_none()
        );
    }

    #[test]
    fn removed_test_case_fixes_nothing() {
        let v1 = snapshot("v1", vec![TestCase::new("Login")], Vec::new());
        let v2 = snapshot("v2", Vec::new(), Vec::new());
        let mut history = History::default();

        let first = run_transition(None, &v1, &mut history);
        let second = run_transition(Some((&v1, &first.results)), &v2, &mut history);

        assert!(second.records.is_empty());
        let key = lineage_key("shop", "Login");
        assert_eq!(history.fix_count(SmellKind::MissingDocumentation, &key), 0);
    }
}
