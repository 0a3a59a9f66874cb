use crate::{RequestKind, RequestOutcome};
use std::collections::BTreeMap;
use std::time::Duration;

/// Latency statistics over one subset of outcomes.
///
/// Percentiles use the nearest rank on the ascending latencies, `L[⌊n·p⌋]`, with no
/// interpolation. Every field is zero for an empty subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub count: usize,
    pub mean: Duration,
    pub median: Duration,
    pub p99: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl LatencySummary {
    pub fn from_latencies(mut latencies: Vec<Duration>) -> Self {
        latencies.sort_unstable();
        Self::from_sorted(&latencies)
    }

    fn from_sorted(latencies: &[Duration]) -> Self {
        let (Some(min), Some(max)) = (latencies.first(), latencies.last()) else {
            return Self::default();
        };

        let n = latencies.len();
        let sum: u128 = latencies.iter().map(Duration::as_nanos).sum();
        let mean = Duration::from_nanos((sum / n as u128) as u64);

        Self {
            count: n,
            mean,
            median: percentile(latencies, 50),
            p99: percentile(latencies, 99),
            min: *min,
            max: *max,
        }
    }
}

/// Nearest-rank percentile of an ascending slice. Zero when empty.
pub fn percentile(sorted: &[Duration], pct: usize) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = (sorted.len() * pct / 100).min(sorted.len() - 1);
    sorted[idx]
}

/// Statistics for a completed run, computed once from the measured outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub wall_time: Duration,
    pub throughput: f64,
    pub overall: LatencySummary,
    pub per_kind: BTreeMap<RequestKind, LatencySummary>,
}

impl RunStatistics {
    pub fn compute(outcomes: &[RequestOutcome], wall_time: Duration) -> Self {
        let total = outcomes.len() as u64;
        let successful = outcomes.iter().filter(|o| o.is_success()).count() as u64;

        let mut by_kind: BTreeMap<RequestKind, Vec<Duration>> = RequestKind::ALL
            .into_iter()
            .map(|kind| (kind, vec![]))
            .collect();
        for outcome in outcomes {
            by_kind
                .entry(outcome.kind())
                .or_default()
                .push(outcome.latency());
        }

        let overall =
            LatencySummary::from_latencies(outcomes.iter().map(RequestOutcome::latency).collect());
        let per_kind = by_kind
            .into_iter()
            .map(|(kind, latencies)| (kind, LatencySummary::from_latencies(latencies)))
            .collect();

        let secs = wall_time.as_secs_f64();
        let throughput = if secs > 0. { total as f64 / secs } else { 0. };

        Self {
            total,
            successful,
            failed: total - successful,
            wall_time,
            throughput,
            overall,
            per_kind,
        }
    }

    pub fn kind(&self, kind: RequestKind) -> LatencySummary {
        self.per_kind.get(&kind).copied().unwrap_or_default()
    }

    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            0.
        } else {
            self.failed as f64 / self.total as f64
        }
    }
}
