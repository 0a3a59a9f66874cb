use albumload::prelude::*;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

#[allow(unused)]
pub fn init() -> &'static PrometheusHandle {
    PROMETHEUS.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
            std::process::exit(1);
        }));

        FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_env_filter("albumload=debug,mock_service=info,axum::rejection=trace")
            .init();

        PrometheusBuilder::new().install_recorder().unwrap()
    })
}

/// Measurement-only config against a mock: no warm-up, back-to-back waves.
#[allow(unused)]
pub fn config(url: &str, waves: usize, workers: usize) -> RunConfig {
    RunConfig::from_target(url)
        .unwrap()
        .warmup(None)
        .waves(waves)
        .workers_per_wave(workers)
        .wave_delay(Duration::ZERO)
}

#[allow(unused)]
pub fn args(line: &str) -> Vec<String> {
    std::iter::once("albumload")
        .chain(line.split_whitespace())
        .map(String::from)
        .collect()
}
