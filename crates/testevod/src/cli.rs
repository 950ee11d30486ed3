use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "invalid log format '{other}', expected one of: human, json"
            )),
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Test-suite evolution analyzer")]
pub struct Cli {
    #[arg(long, help = "Run configuration TOML file")]
    pub config: PathBuf,

    #[arg(
        long,
        default_value = ".",
        help = "Base directory for relative paths in the configuration"
    )]
    pub workspace: PathBuf,

    #[arg(long, default_value = "human", help = "Log output format")]
    pub log_format: LogFormat,
}
