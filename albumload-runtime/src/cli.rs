//! Command line parsing
//!
//! The harness takes single-dash long flags (`-threadGroupSize 10`). They are normalised into
//! `--flag=value` tokens before being handed to clap; unrecognised tokens are skipped.
use crate::error::CliError;
use albumload::report::DEFAULT_RECORD_FILE;
use albumload_core::{
    parse_target, ConfigError, RunConfig, DEFAULT_PORT, DEFAULT_TARGET, DEFAULT_WAVES,
    DEFAULT_WORKERS_PER_WAVE,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
#[allow(unused)]
use tracing::{debug, error, info, warn};

/// Flags which must all be given.
const REQUIRED_FLAGS: [&str; 4] = ["threadGroupSize", "numThreadGroups", "delay", "IPAddr"];

const OPTIONAL_FLAGS: [&str; 1] = ["output"];

const USAGE: &str =
    "accepts 4 arguments -threadGroupSize 10 -numThreadGroups 100 -delay 10 -IPAddr <server URI>";

#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "albumload", version = "0.1")]
pub struct Cli {
    /// Workers launched per wave.
    #[arg(long = "threadGroupSize", default_value_t = DEFAULT_WORKERS_PER_WAVE)]
    pub thread_group_size: usize,

    /// Number of waves.
    #[arg(long = "numThreadGroups", default_value_t = DEFAULT_WAVES)]
    pub num_thread_groups: usize,

    /// Seconds to wait between launching waves.
    #[arg(long = "delay", default_value_t = 0)]
    pub delay: u64,

    /// Target base address, either a full URL or a host.
    #[arg(long = "IPAddr", default_value = DEFAULT_TARGET)]
    pub ip_addr: String,

    /// Record file written at the end of the run.
    #[arg(long = "output", default_value = DEFAULT_RECORD_FILE)]
    pub output: PathBuf,
}

impl Cli {
    pub fn parse_args<I, T>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let args = normalize_args(args)?;
        Ok(Cli::try_parse_from(args)?)
    }

    pub fn into_config(self) -> Result<RunConfig, CliError> {
        let config = RunConfig::new(resolve_target(&self.ip_addr)?)
            .workers_per_wave(self.thread_group_size)
            .waves(self.num_thread_groups)
            .wave_delay(Duration::from_secs(self.delay));
        config.validate()?;
        Ok(config)
    }
}

/// Turns `-flag value` pairs into `--flag=value` tokens, keeping the program name. Fails if
/// fewer than 4 pairs of required flags were found.
fn normalize_args<I, T>(args: I) -> Result<Vec<String>, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized = vec![args.next().unwrap_or_else(|| "albumload".to_string())];
    let mut required = 0;

    while let Some(arg) = args.next() {
        let name = arg.trim_start_matches('-');
        let known = REQUIRED_FLAGS.contains(&name) || OPTIONAL_FLAGS.contains(&name);

        if !arg.starts_with('-') || !known {
            warn!("Ignoring unrecognized argument {arg:?}");
            continue;
        }

        let Some(value) = args.next() else {
            warn!("Ignoring flag {arg:?} without a value");
            break;
        };

        if REQUIRED_FLAGS.contains(&name) {
            required += 1;
        }
        normalized.push(format!("--{name}={value}"));
    }

    if required < REQUIRED_FLAGS.len() {
        return Err(CliError::MissingArguments(USAGE));
    }

    Ok(normalized)
}

/// Full URLs are used as given. A bare host (optionally with a port and path) is served
/// over http, on the default port unless one is given.
pub fn resolve_target(addr: &str) -> Result<Url, ConfigError> {
    let addr = addr.trim();
    if addr.contains("://") {
        return parse_target(addr);
    }

    let (host, path) = match addr.find('/') {
        Some(idx) => addr.split_at(idx),
        None => (addr, ""),
    };

    if host.contains(':') {
        parse_target(&format!("http://{host}{path}"))
    } else {
        parse_target(&format!("http://{host}:{DEFAULT_PORT}{path}"))
    }
}
