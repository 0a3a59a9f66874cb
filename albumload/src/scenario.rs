//! Worker orchestration
//!
//! A run has two phases. The warm-up phase launches one concurrent batch of create-only
//! workers and joins it; its outcomes are kept apart from the measurement. The measurement
//! phase launches `waves` waves of `workers_per_wave` full-workflow workers, sleeping
//! `wave_delay` between launches without waiting for earlier waves, and then joins every
//! worker it launched.
use crate::client::{AlbumApi, HttpAlbumClient};
use crate::collector::ResultLog;
use crate::retry::RetryPolicy;
use crate::workflow::{WorkerTally, Workflow};
use albumload_core::{ConfigError, RequestOutcome, RunConfig, RunStatistics, WarmupConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
#[allow(unused_imports)]
use tracing::{debug, error, info, info_span, instrument, trace, warn, Instrument};

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub statistics: RunStatistics,
    /// Every measured attempt, in no particular order.
    pub outcomes: Vec<RequestOutcome>,
    pub tally: WorkerTally,
    pub warmup: Option<WarmupSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupSummary {
    pub attempts: usize,
    pub failures: usize,
    pub elapsed: Duration,
}

/// A configured load test against a single target.
pub struct LoadTest<A> {
    config: RunConfig,
    api: Arc<A>,
}

impl LoadTest<HttpAlbumClient> {
    /// Validates the configuration and checks the target is reachable. Nothing is launched
    /// if this fails.
    pub async fn connect(config: RunConfig) -> Result<Self, ConfigError> {
        let api = HttpAlbumClient::connect(&config).await?;
        Ok(Self::new(config, Arc::new(api)))
    }
}

impl<A> LoadTest<A>
where
    A: AlbumApi + Send + Sync + 'static,
{
    pub fn new(config: RunConfig, api: Arc<A>) -> Self {
        Self { config, api }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs both phases to completion. Individual request failures only show up in the
    /// returned statistics.
    pub async fn run(&self) -> RunSummary {
        info!("Running load test with config {}", &self.config);

        let warmup = match self.config.warmup {
            Some(warmup) => Some(self.warm_up(warmup).await),
            None => None,
        };

        let mut summary = self.measure().await;
        summary.warmup = warmup;
        summary
    }

    fn retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.config.max_attempts)
    }

    #[instrument(name = "warmup", skip_all, fields(workers = warmup.workers))]
    async fn warm_up(&self, warmup: WarmupConfig) -> WarmupSummary {
        info!("Warming up");
        let start = Instant::now();

        let log = Arc::new(ResultLog::new());
        let workflow = Workflow::create_only(self.api.clone(), self.retry());

        let handles: Vec<_> = (0..warmup.workers)
            .map(|id| {
                spawn_worker(
                    workflow.clone(),
                    warmup.iterations,
                    log.clone(),
                    info_span!("worker", id),
                )
            })
            .collect();
        join_workers(handles).await;

        let summary = WarmupSummary {
            attempts: log.len(),
            failures: log.failures(),
            elapsed: start.elapsed(),
        };
        info!(
            "Warm-up complete: {} attempts, {} failed, in {:?}",
            summary.attempts, summary.failures, summary.elapsed
        );
        summary
    }

    #[instrument(name = "measure", skip_all, fields(waves = self.config.waves))]
    async fn measure(&self) -> RunSummary {
        let log = Arc::new(ResultLog::new());
        let workflow = Workflow::new(self.api.clone(), self.retry());
        let mut handles = vec![];

        let start = Instant::now();
        for wave in 0..self.config.waves {
            debug!("Launching wave {wave} ({} workers)", self.config.workers_per_wave);
            for id in 0..self.config.workers_per_wave {
                handles.push(spawn_worker(
                    workflow.clone(),
                    self.config.iterations_per_worker,
                    log.clone(),
                    info_span!("worker", wave, id),
                ));
            }

            // NOTE: Earlier waves keep running while we wait; waves overlap.
            if wave + 1 < self.config.waves && !self.config.wave_delay.is_zero() {
                tokio::time::sleep(self.config.wave_delay).await;
            }
        }

        info!("All {} workers launched, waiting for completion", handles.len());
        let tally = join_workers(handles).await;
        let wall_time = start.elapsed();

        let outcomes = log.snapshot();
        let statistics = RunStatistics::compute(&outcomes, wall_time);
        info!(
            "Measurement complete: {} iterations ({} abandoned), {} requests in {:?}",
            tally.iterations(),
            tally.abandoned,
            statistics.total,
            wall_time
        );

        RunSummary {
            statistics,
            outcomes,
            tally,
            warmup: None,
        }
    }
}

fn spawn_worker<A>(
    workflow: Workflow<A>,
    iterations: usize,
    log: Arc<ResultLog>,
    span: tracing::Span,
) -> JoinHandle<WorkerTally>
where
    A: AlbumApi + Send + Sync + 'static,
{
    tokio::spawn(async move { workflow.run(iterations, &log).await }.instrument(span))
}

async fn join_workers(handles: Vec<JoinHandle<WorkerTally>>) -> WorkerTally {
    let mut tally = WorkerTally::default();
    for handle in handles {
        match handle.await {
            Ok(worker) => tally.merge(worker),
            Err(err) => error!("Worker did not complete: {err}"),
        }
    }
    tally
}
