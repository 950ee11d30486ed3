use std::collections::BTreeMap;

use anyhow::{Context, Result};
use testevo_diff::{
    Edit, MatchPair, diff_test_cases, diff_user_keywords, diff_variables, extract_value_changes,
    match_entities,
};
use testevo_export::{
    EvolutionExport, EvolutionRecord, Statistics, TestRecord, ValueChangeRecord, VersionRecord,
};
use testevo_model::{Containment, Scoped, Snapshot, SnapshotValues, TestCase};
use testevo_smells::{
    AccumulatorInput, CloneIndex, History, SmellConfiguration, SmellRecordAccumulator,
    SmellResults,
};
use testevo_versions::VersionProvider;
use tracing::{debug, info};

/// Drives the analysis over a version sequence.
///
/// Each loop iteration owns exactly one snapshot; everything computed
/// for a transition is dropped with it. Only the smell [`History`] and
/// the previous version's smell results survive, keyed by lineage
/// rather than by node, so no snapshot outlives its iteration.
pub struct EvolutionRunner {
    export: EvolutionExport,
    long_test_threshold: usize,
}

impl EvolutionRunner {
    pub fn new(export: EvolutionExport, long_test_threshold: usize) -> Self {
        Self {
            export,
            long_test_threshold,
        }
    }

    /// Runs the whole analysis. The provider is cleaned on every exit
    /// path, including failures.
    pub fn run(&mut self, provider: &mut dyn VersionProvider) -> Result<()> {
        let outcome = self.process(provider);
        let cleanup = provider.clean();
        outcome?;
        cleanup.context("failed to clean version source")?;
        self.export.close().context("failed to flush outputs")?;
        Ok(())
    }

    fn process(&mut self, provider: &mut dyn VersionProvider) -> Result<()> {
        let ignore_project = provider.ignore_project_identity();
        let mut history = History::default();
        let mut previous: Option<Snapshot> = None;
        let mut previous_results: BTreeMap<String, SmellResults> = BTreeMap::new();

        while let Some(snapshot) = provider
            .next_snapshot()
            .context("failed to load next version")?
        {
            info!(
                version = %snapshot.version_id,
                projects = snapshot.projects.len(),
                "analyzing version"
            );

            if self.export.contains(Statistics::Project) {
                self.export
                    .export(
                        Statistics::Project,
                        &EvolutionRecord::Version(VersionRecord::of(&snapshot)),
                    )
                    .context("failed to export version record")?;
            }

            if self.export.contains(Statistics::Test) {
                for test_case in snapshot.test_cases() {
                    self.export
                        .export(
                            Statistics::Test,
                            &EvolutionRecord::Test(TestRecord::of(&snapshot, test_case)),
                        )
                        .context("failed to export test record")?;
                }
            }

            if self.export.contains(Statistics::Smell) {
                previous_results = self.process_smells(
                    &snapshot,
                    previous.as_ref(),
                    &previous_results,
                    ignore_project,
                    &mut history,
                )?;
            }

            if self.export.contains(Statistics::VariableChanges) {
                if let Some(previous_snapshot) = previous.as_ref() {
                    self.process_value_changes(&snapshot, previous_snapshot, ignore_project)?;
                }
            }

            previous = Some(snapshot);
        }

        Ok(())
    }

    fn process_smells(
        &mut self,
        snapshot: &Snapshot,
        previous: Option<&Snapshot>,
        previous_results: &BTreeMap<String, SmellResults>,
        ignore_project: bool,
        history: &mut History,
    ) -> Result<BTreeMap<String, SmellResults>> {
        let previous_cases = previous.map(Snapshot::test_cases).unwrap_or_default();
        let current_cases = snapshot.test_cases();
        let pairs = test_case_pairs(&previous_cases, &current_cases, ignore_project);
        debug!(pairs = pairs.len(), "test cases paired");
        history.rekey(&pairs);

        // The transition edit set spans every entity kind; containment
        // against the responsible nodes keeps attribution per test case.
        let mut edits: Vec<Edit> = pairs.iter().flat_map(diff_test_cases).collect();
        if let Some(previous) = previous {
            edits.extend(definition_edits(previous, snapshot, ignore_project));
        }
        debug!(edits = edits.len(), "transition edit set computed");

        let previous_containment = previous.map(Containment::of).unwrap_or_default();
        let configuration = SmellConfiguration {
            long_test_threshold: self.long_test_threshold,
            clones: CloneIndex::detect(snapshot),
        };
        let input = AccumulatorInput {
            version_id: &snapshot.version_id,
            snapshot,
            previous_results,
            previous_containment: &previous_containment,
            configuration: &configuration,
        };

        let mut accumulator = SmellRecordAccumulator::new();
        for pair in &pairs {
            accumulator.add_test_case(&input, pair, &edits, history);
        }

        let records: Vec<EvolutionRecord> = accumulator
            .records()
            .iter()
            .cloned()
            .map(EvolutionRecord::Smell)
            .collect();
        self.export
            .export_all(Statistics::Smell, &records)
            .context("failed to export smell records")?;
        Ok(accumulator.into_results())
    }

    fn process_value_changes(
        &mut self,
        snapshot: &Snapshot,
        previous: &Snapshot,
        ignore_project: bool,
    ) -> Result<()> {
        let previous_keywords = previous.user_keywords();
        let current_keywords = snapshot.user_keywords();
        let pairs = match_entities(&previous_keywords, &current_keywords, ignore_project);
        let previous_values = SnapshotValues::new(previous);
        let current_values = SnapshotValues::new(snapshot);

        for change in extract_value_changes(&pairs, &previous_values, &current_values) {
            let record = ValueChangeRecord {
                version: snapshot.version_id.clone(),
                keyword_name: change.keyword_name,
                before_argument: change.before.name,
                before_values: change.before_values.into_iter().collect(),
                after_argument: change.after.name,
                after_values: change.after_values.into_iter().collect(),
            };
            self.export
                .export(
                    Statistics::VariableChanges,
                    &EvolutionRecord::ValueChange(record),
                )
                .context("failed to export value change record")?;
        }
        Ok(())
    }
}

/// Edits to user keyword definitions and variable assignments of one
/// transition. These join the test-case edits in the transition edit
/// set; an empty version on either side yields none, like any other
/// pairing.
fn definition_edits(previous: &Snapshot, current: &Snapshot, ignore_project: bool) -> Vec<Edit> {
    if previous.is_empty() || current.is_empty() {
        return Vec::new();
    }

    let mut edits = Vec::new();

    let previous_keywords = previous.user_keywords();
    let current_keywords = current.user_keywords();
    for pair in match_entities(&previous_keywords, &current_keywords, ignore_project) {
        edits.extend(diff_user_keywords(&pair));
    }

    let previous_variables = previous.variables();
    let current_variables = current.variables();
    for pair in match_entities(&previous_variables, &current_variables, ignore_project) {
        edits.extend(diff_variables(&pair));
    }

    edits
}

/// A first analyzed version has no pairing at all; every test case of
/// it still needs a one-sided pair so smells get detected from the
/// start.
fn test_case_pairs<'p, 'c>(
    previous: &[Scoped<'p, TestCase>],
    current: &[Scoped<'c, TestCase>],
    ignore_project: bool,
) -> Vec<MatchPair<Scoped<'p, TestCase>, Scoped<'c, TestCase>>> {
    let pairs = match_entities(previous, current, ignore_project);
    if pairs.is_empty() {
        current.iter().copied().map(MatchPair::added).collect()
    } else {
        pairs
    }
}
