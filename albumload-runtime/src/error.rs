use albumload::report::ReportError;
use albumload_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Arguments missing! {0}.")]
    MissingArguments(&'static str),

    #[error("Invalid argument: {0}")]
    Parse(#[from] clap::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Report(#[from] ReportError),
}
