use std::num::NonZeroUsize;
use std::time::Duration;

/// Attempts allowed per network call before the call is given up on.
pub const DEFAULT_MAX_ATTEMPTS: NonZeroUsize = unsafe { NonZeroUsize::new_unchecked(5) };

/// Iterations of the workflow each worker runs, in both phases.
pub const DEFAULT_ITERATIONS: usize = 100;

/// Size of the warm-up batch.
pub const DEFAULT_WARMUP_WORKERS: usize = 10;

/// Workers launched per wave (`-threadGroupSize`).
pub const DEFAULT_WORKERS_PER_WAVE: usize = 10;

/// Number of waves (`-numThreadGroups`).
pub const DEFAULT_WAVES: usize = 100;

pub const DEFAULT_WAVE_DELAY: Duration = Duration::from_secs(0);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_TARGET: &str = "http://localhost:8080";

/// Status recorded for attempts that never produced an HTTP response. Not a valid HTTP status.
pub const TRANSPORT_FAILURE: u16 = 0;

/// First status code counted as a failed attempt.
pub const FAILURE_STATUS: u16 = 400;
