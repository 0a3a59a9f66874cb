pub mod cli;
pub mod runtime;

mod error;

pub use crate::error::{CliError, RuntimeError};
pub use crate::runtime::{init_tracing, AlbumLoadRuntime, DEFAULT_LOG_FILTER};
