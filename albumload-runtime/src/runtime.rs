//! Default albumload runtime
//!
//! Connects to the target, runs both phases, prints the report and writes the record file.
use crate::cli::Cli;
use crate::error::RuntimeError;
use albumload::report::{write_record_file, ConsoleReport, DEFAULT_RECORD_FILE};
use albumload::{LoadTest, RunSummary};
use albumload_core::RunConfig;
use std::path::PathBuf;
#[allow(unused)]
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "albumload=info,albumload_runtime=info";

/// # Example
///
/// ```no_run
/// use albumload_runtime::AlbumLoadRuntime;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     AlbumLoadRuntime::with_args(std::env::args())?.run().await?;
///     Ok(())
/// }
/// ```
pub struct AlbumLoadRuntime {
    config: RunConfig,
    output: PathBuf,
}

impl AlbumLoadRuntime {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            output: PathBuf::from(DEFAULT_RECORD_FILE),
        }
    }

    /// Builds the runtime from command line arguments, program name first.
    ///
    /// `-threadGroupSize`, `-numThreadGroups`, `-delay` and `-IPAddr` must all be given;
    /// `-output` optionally overrides the record file path.
    pub fn with_args<I, T>(args: I) -> Result<Self, RuntimeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let cli = Cli::parse_args(args)?;
        let output = cli.output.clone();
        Ok(Self::new(cli.into_config()?).output(output))
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    #[instrument(name = "albumload", skip_all, fields(target = %self.config.target))]
    pub async fn run(self) -> Result<RunSummary, RuntimeError> {
        let test = LoadTest::connect(self.config).await?;
        let summary = test.run().await;

        println!("{}", ConsoleReport(&summary.statistics));
        write_record_file(&self.output, &summary.outcomes)?;

        Ok(summary)
    }
}

/// Installs the global fmt subscriber, honouring `RUST_LOG`.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    FmtSubscriber::builder().with_env_filter(filter).init();
}
