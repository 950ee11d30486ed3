use testevo_export::{EvolutionExport, EvolutionRecord, MemoryWriter, Statistics};
use testevo_model::{
    Argument, Project, Snapshot, Step, TestCase, UserKeyword, VariableAssignment,
};
use testevo_versions::MemoryProvider;
use testevod::runner::EvolutionRunner;

fn snapshot(version: &str, project: Project) -> Snapshot {
    let mut snapshot = Snapshot::new(version, None);
    snapshot.projects.push(project);
    snapshot
}

#[test]
fn variable_value_swap_is_reported_once() {
    let press_target = || {
        UserKeyword::new("Press Target").with_steps(vec![Step::library(
            "Click Element",
            vec![Argument::positional("${target}")],
        )])
    };
    let mut v1_project = Project::new("shop");
    v1_project.user_keywords.push(press_target());
    v1_project
        .variables
        .push(VariableAssignment::new("${target}", vec!["button1".to_owned()]));

    let mut v2_project = Project::new("shop");
    v2_project.user_keywords.push(press_target());
    v2_project
        .variables
        .push(VariableAssignment::new("${target}", vec!["button2".to_owned()]));

    let mut provider = MemoryProvider::new(vec![
        snapshot("v1", v1_project),
        snapshot("v2", v2_project),
    ]);

    let mut export = EvolutionExport::new();
    let (writer, records) = MemoryWriter::shared();
    export.register(Statistics::VariableChanges, Box::new(writer));

    let mut runner = EvolutionRunner::new(export, 20);
    runner.run(&mut provider).expect("run succeeds");
    assert!(provider.is_cleaned());

    let records = records.lock().expect("records lock");
    assert_eq!(records.len(), 1);
    match &records[0] {
        EvolutionRecord::ValueChange(change) => {
            assert_eq!(change.version, "v2");
            assert_eq!(change.keyword_name, "Press Target");
            assert_eq!(change.before_argument, "${target}");
            assert_eq!(change.before_values, vec!["button1".to_owned()]);
            assert_eq!(change.after_values, vec!["button2".to_owned()]);
        }
        other => panic!("expected a value change record, got {other:?}"),
    }
}

#[test]
fn overlapping_value_sets_are_not_reported() {
    let press_target = || {
        UserKeyword::new("Press Target").with_steps(vec![Step::library(
            "Click Element",
            vec![Argument::positional("${target}")],
        )])
    };
    let mut v1_project = Project::new("shop");
    v1_project.user_keywords.push(press_target());
    v1_project.variables.push(VariableAssignment::new(
        "${target}",
        vec!["button1".to_owned(), "button2".to_owned()],
    ));

    let mut v2_project = Project::new("shop");
    v2_project.user_keywords.push(press_target());
    v2_project.variables.push(VariableAssignment::new(
        "${target}",
        vec!["button2".to_owned(), "button3".to_owned()],
    ));

    let mut provider = MemoryProvider::new(vec![
        snapshot("v1", v1_project),
        snapshot("v2", v2_project),
    ]);

    let mut export = EvolutionExport::new();
    let (writer, records) = MemoryWriter::shared();
    export.register(Statistics::VariableChanges, Box::new(writer));

    let mut runner = EvolutionRunner::new(export, 20);
    runner.run(&mut provider).expect("run succeeds");

    assert!(records.lock().expect("records lock").is_empty());
}

#[test]
fn missing_documentation_lineage_runs_introduced_to_fixed() {
    let mut v1_project = Project::new("shop");
    v1_project.test_cases.push(
        TestCase::new("Login").with_steps(vec![Step::library("Open Browser", Vec::new())]),
    );

    let mut v2_project = Project::new("shop");
    v2_project.test_cases.push(
        TestCase::new("Login")
            .with_documentation("logs the default user in")
            .with_steps(vec![Step::library("Open Browser", Vec::new())]),
    );

    let mut provider = MemoryProvider::new(vec![
        snapshot("v1", v1_project),
        snapshot("v2", v2_project),
    ]);

    let mut export = EvolutionExport::new();
    let (writer, records) = MemoryWriter::shared();
    export.register(Statistics::Smell, Box::new(writer));

    let mut runner = EvolutionRunner::new(export, 20);
    runner.run(&mut provider).expect("run succeeds");

    let records = records.lock().expect("records lock");
    let documentation: Vec<_> = records
        .iter()
        .filter_map(|record| match record {
            EvolutionRecord::Smell(smell) if smell.smell_name == "missing_documentation" => {
                Some(smell)
            }
            _ => None,
        })
        .collect();

    assert_eq!(documentation.len(), 2);

    assert_eq!(documentation[0].version, "v1");
    assert_eq!(documentation[0].status.as_str(), "introduced");
    assert_eq!(documentation[0].smell_metric, 1.0);
    assert_eq!(documentation[0].fixes_count, 0);

    assert_eq!(documentation[1].version, "v2");
    assert_eq!(documentation[1].status.as_str(), "fixed");
    assert_eq!(documentation[1].smell_metric, 0.0);
    assert_eq!(documentation[1].fixes_count, 1);
    assert_eq!(documentation[1].test_case_name, "shop::Login");
}

#[test]
fn keyword_documentation_edit_does_not_fix_a_test_smell() {
    let login = || {
        TestCase::new("Login").with_steps(vec![Step::user("Open Session", Vec::new())])
    };
    let mut v1_project = Project::new("shop");
    v1_project.test_cases.push(login());
    v1_project.user_keywords.push(
        UserKeyword::new("Open Session")
            .with_steps(vec![Step::library("Open Browser", Vec::new())]),
    );

    let mut v2_project = Project::new("shop");
    v2_project.test_cases.push(login());
    v2_project.user_keywords.push(
        UserKeyword::new("Open Session")
            .with_documentation("opens the default browser session")
            .with_steps(vec![Step::library("Open Browser", Vec::new())]),
    );

    let mut provider = MemoryProvider::new(vec![
        snapshot("v1", v1_project),
        snapshot("v2", v2_project),
    ]);

    let mut export = EvolutionExport::new();
    let (writer, records) = MemoryWriter::shared();
    export.register(Statistics::Smell, Box::new(writer));

    let mut runner = EvolutionRunner::new(export, 20);
    runner.run(&mut provider).expect("run succeeds");

    // The documentation edit lands on the keyword definition; the test
    // case's own missing documentation is untouched and must persist.
    let records = records.lock().expect("records lock");
    let documentation: Vec<_> = records
        .iter()
        .filter_map(|record| match record {
            EvolutionRecord::Smell(smell) if smell.smell_name == "missing_documentation" => {
                Some(smell)
            }
            _ => None,
        })
        .collect();

    assert_eq!(documentation.len(), 2);
    assert_eq!(documentation[1].version, "v2");
    assert_eq!(documentation[1].status.as_str(), "persisting");
    assert_eq!(documentation[1].smell_metric, 1.0);
    assert_eq!(documentation[1].fixes_count, 0);
}

#[test]
fn project_and_test_statistics_are_exported_per_version() {
    let mut project = Project::new("shop");
    project.lines = 42;
    project.test_cases.push(
        TestCase::new("Login").with_steps(vec![Step::library("Open Browser", Vec::new())]),
    );

    let mut provider = MemoryProvider::new(vec![snapshot("v1", project)]);

    let mut export = EvolutionExport::new();
    let (writer, records) = MemoryWriter::shared();
    export.register(Statistics::Project, Box::new(writer));
    let (writer, test_records) = MemoryWriter::shared();
    export.register(Statistics::Test, Box::new(writer));

    let mut runner = EvolutionRunner::new(export, 20);
    runner.run(&mut provider).expect("run succeeds");

    let records = records.lock().expect("records lock");
    match &records[..] {
        [EvolutionRecord::Version(version)] => {
            assert_eq!(version.version, "v1");
            assert_eq!(version.number_projects, 1);
            assert_eq!(version.number_test_cases, 1);
            assert_eq!(version.number_lines, 42);
        }
        other => panic!("expected one version record, got {other:?}"),
    }

    let test_records = test_records.lock().expect("records lock");
    match &test_records[..] {
        [EvolutionRecord::Test(test)] => {
            assert_eq!(test.test_case_name, "Login");
            assert_eq!(test.size, 1);
        }
        other => panic!("expected one test record, got {other:?}"),
    }
}
