use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use testevo_config::{EvolutionConfig, GitConfig};
use testevo_export::{EvolutionExport, JsonLinesWriter, Statistics};
use testevo_versions::{FolderProvider, GitProvider, VersionProvider};
use testevod::cli::{Cli, LogFormat};
use testevod::runner::EvolutionRunner;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let config_path = resolve(&cli.workspace, &cli.config);
    let config = testevo_config::load_config(&config_path)
        .with_context(|| format!("failed to load configuration {}", config_path.display()))?;

    let export = build_export(&cli.workspace, &config)?;
    let mut provider = build_provider(&cli.workspace, &config)?;

    let mut runner = EvolutionRunner::new(export, config.smells.long_test_threshold);
    runner.run(provider.as_mut())
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Human => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn build_export(workspace: &Path, config: &EvolutionConfig) -> Result<EvolutionExport> {
    let mut export = EvolutionExport::new();
    let outputs = [
        (Statistics::Project, &config.output.projects),
        (Statistics::Test, &config.output.tests),
        (Statistics::Smell, &config.output.smells),
        (Statistics::VariableChanges, &config.output.variable_changes),
    ];
    for (statistics, path) in outputs {
        if let Some(path) = path {
            let path = resolve(workspace, path);
            let writer = JsonLinesWriter::create(&path).with_context(|| {
                format!(
                    "failed to create {} output {}",
                    statistics.as_str(),
                    path.display()
                )
            })?;
            export.register(statistics, Box::new(writer));
        }
    }
    Ok(export)
}

fn build_provider(
    workspace: &Path,
    config: &EvolutionConfig,
) -> Result<Box<dyn VersionProvider>> {
    if let Some(folder) = &config.folder {
        let root = resolve(workspace, &folder.root);
        let provider = FolderProvider::new(&root)
            .with_context(|| format!("failed to open version folder {}", root.display()))?;
        return Ok(Box::new(provider));
    }

    let git = config
        .git
        .as_ref()
        .context("configuration passed validation without a version source")?;
    let git = GitConfig {
        repository: resolve(workspace, &git.repository),
        ..git.clone()
    };
    let provider = GitProvider::new(&git).with_context(|| {
        format!(
            "failed to open git repository {}",
            git.repository.display()
        )
    })?;
    Ok(Box::new(provider))
}

fn resolve(workspace: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_owned()
    } else {
        workspace.join(path)
    }
}
