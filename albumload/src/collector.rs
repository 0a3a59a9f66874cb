use albumload_core::RequestOutcome;
use metrics_util::AtomicBucket;
use std::fmt;

/// Append-only log of every attempt made during a run.
///
/// Shared by all workers of a phase. Appends are lock-free; reads are only meaningful once
/// every writer has joined.
pub struct ResultLog {
    outcomes: AtomicBucket<RequestOutcome>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self {
            outcomes: AtomicBucket::new(),
        }
    }

    pub fn append(&self, outcome: RequestOutcome) {
        #[cfg(feature = "metrics")]
        record_metrics(&outcome);

        self.outcomes.push(outcome);
    }

    /// Copy of every recorded outcome. Each worker's outcomes keep their append order; outcomes
    /// of different workers are interleaved.
    pub fn snapshot(&self) -> Vec<RequestOutcome> {
        // Blocks are visited newest first.
        let mut blocks = vec![];
        self.outcomes.data_with(|block| blocks.push(block.to_vec()));
        blocks.into_iter().rev().flatten().collect()
    }

    pub fn len(&self) -> usize {
        let mut len = 0;
        self.outcomes.data_with(|block| len += block.len());
        len
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failures(&self) -> usize {
        let mut failures = 0;
        self.outcomes
            .data_with(|block| failures += block.iter().filter(|o| !o.is_success()).count());
        failures
    }
}

impl Default for ResultLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResultLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultLog").field("len", &self.len()).finish()
    }
}

#[cfg(feature = "metrics")]
fn record_metrics(outcome: &RequestOutcome) {
    let labels = outcome.kind().labels();

    // TODO: Describe the histograms once at startup instead of on every append.
    metrics::describe_histogram!(labels.latency, metrics::Unit::Nanoseconds, "");
    metrics::histogram!(labels.latency).record(outcome.latency().as_nanos() as f64);

    if outcome.is_success() {
        metrics::counter!(labels.success).increment(1);
    } else {
        metrics::counter!(labels.error).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use albumload_core::RequestKind;
    use std::sync::Arc;
    use std::time::Duration;

    fn outcome(status: u16) -> RequestOutcome {
        RequestOutcome::http(RequestKind::CreateAlbum, 0, Duration::from_millis(1), status)
    }

    #[test]
    fn append_and_snapshot() {
        let log = ResultLog::new();
        assert!(log.is_empty());

        log.append(outcome(200));
        log.append(outcome(500));

        assert_eq!(log.len(), 2);
        assert_eq!(log.failures(), 1);
        assert_eq!(log.snapshot().len(), 2);
    }

    #[test]
    fn snapshot_keeps_append_order() {
        let log = ResultLog::new();
        for start_ms in 0..200 {
            log.append(RequestOutcome::http(
                RequestKind::LikeAlbum,
                start_ms,
                Duration::from_millis(1),
                200,
            ));
        }

        let starts: Vec<_> = log.snapshot().iter().map(RequestOutcome::start_ms).collect();
        assert_eq!(starts, (0..200).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn each_worker_stays_in_order() {
        let log = Arc::new(ResultLog::new());

        let tasks: Vec<_> = (0..4u64)
            .map(|worker| {
                let log = log.clone();
                tokio::spawn(async move {
                    for i in 0..500 {
                        log.append(RequestOutcome::http(
                            RequestKind::CreateAlbum,
                            worker * 10_000 + i,
                            Duration::from_millis(1),
                            201,
                        ));
                        if i % 50 == 0 {
                            tokio::task::yield_now().await;
                        }
                    }
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 2_000);
        for worker in 0..4u64 {
            let starts: Vec<_> = snapshot
                .iter()
                .map(RequestOutcome::start_ms)
                .filter(|start| start / 10_000 == worker)
                .collect();
            let expected: Vec<_> = (0..500).map(|i| worker * 10_000 + i).collect();
            assert_eq!(starts, expected, "worker {worker}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends() {
        let log = Arc::new(ResultLog::new());

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let log = log.clone();
                tokio::spawn(async move {
                    for i in 0..1_000 {
                        log.append(outcome(if i % 10 == 0 { 503 } else { 201 }));
                    }
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(log.len(), 16_000);
        assert_eq!(log.failures(), 1_600);
        assert_eq!(log.snapshot().len(), 16_000);
    }
}
