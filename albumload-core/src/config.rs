use crate::{
    ConfigError, DEFAULT_ITERATIONS, DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_WARMUP_WORKERS, DEFAULT_WAVES, DEFAULT_WAVE_DELAY, DEFAULT_WORKERS_PER_WAVE,
};
use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;
use url::Url;

/// Placeholder image uploaded with every created album.
const DEFAULT_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\nFileContentHere";

/// Immutable description of a load test run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub target: Url,
    pub warmup: Option<WarmupConfig>,
    pub waves: usize,
    pub workers_per_wave: usize,
    pub wave_delay: Duration,
    pub iterations_per_worker: usize,
    pub max_attempts: NonZeroUsize,
    pub request_timeout: Duration,
    pub album: AlbumProfile,
}

/// Concurrent batch run before measurement to prime the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarmupConfig {
    pub workers: usize,
    pub iterations: usize,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WARMUP_WORKERS,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Fields of the multipart body sent to the album endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumProfile {
    pub artist: String,
    pub title: String,
    pub year: String,
    pub image: Vec<u8>,
    pub image_name: String,
    pub image_mime: String,
}

impl Default for AlbumProfile {
    fn default() -> Self {
        Self {
            artist: "ambika".to_string(),
            title: "first album".to_string(),
            year: "1993".to_string(),
            image: DEFAULT_IMAGE.to_vec(),
            image_name: "nmtb.png".to_string(),
            image_mime: "image/png".to_string(),
        }
    }
}

impl RunConfig {
    pub fn new(target: Url) -> Self {
        Self {
            target,
            warmup: Some(WarmupConfig::default()),
            waves: DEFAULT_WAVES,
            workers_per_wave: DEFAULT_WORKERS_PER_WAVE,
            wave_delay: DEFAULT_WAVE_DELAY,
            iterations_per_worker: DEFAULT_ITERATIONS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            album: AlbumProfile::default(),
        }
    }

    /// Parses and validates `target` before building a config around it.
    pub fn from_target(target: &str) -> Result<Self, ConfigError> {
        let config = Self::new(parse_target(target)?);
        config.validate()?;
        Ok(config)
    }

    pub fn warmup(mut self, warmup: Option<WarmupConfig>) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn waves(mut self, waves: usize) -> Self {
        self.waves = waves;
        self
    }

    pub fn workers_per_wave(mut self, workers: usize) -> Self {
        self.workers_per_wave = workers;
        self
    }

    pub fn wave_delay(mut self, delay: Duration) -> Self {
        self.wave_delay = delay;
        self
    }

    pub fn iterations_per_worker(mut self, iterations: usize) -> Self {
        self.iterations_per_worker = iterations;
        self
    }

    pub fn max_attempts(mut self, max_attempts: NonZeroUsize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn album(mut self, album: AlbumProfile) -> Self {
        self.album = album;
        self
    }

    /// Checks that the target can serve as a base for the album endpoints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.target.scheme() {
            "http" | "https" => {}
            scheme => return Err(ConfigError::UnsupportedScheme(scheme.to_string())),
        }

        if self.target.cannot_be_a_base() || self.target.host_str().is_none() {
            return Err(ConfigError::NotABase(self.target.to_string()));
        }

        Ok(())
    }

    /// Joins `path` onto the target, keeping any path prefix of the base address.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.target.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Upper bound on measured workflow iterations.
    pub fn total_iterations(&self) -> usize {
        self.waves
            .saturating_mul(self.workers_per_wave)
            .saturating_mul(self.iterations_per_worker)
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "target={}, waves={}, workers_per_wave={}, delay={}, iterations={}, max_attempts={}, timeout={}",
            self.target,
            self.waves,
            self.workers_per_wave,
            humantime::format_duration(self.wave_delay),
            self.iterations_per_worker,
            self.max_attempts,
            humantime::format_duration(self.request_timeout),
        )?;

        if let Some(warmup) = self.warmup {
            write!(f, ", warmup={}x{}", warmup.workers, warmup.iterations)
        } else {
            write!(f, ", warmup=off")
        }
    }
}

pub fn parse_target(target: &str) -> Result<Url, ConfigError> {
    let target = target.trim();
    Url::parse(target).map_err(|source| ConfigError::InvalidTarget {
        target: target.to_string(),
        source,
    })
}
