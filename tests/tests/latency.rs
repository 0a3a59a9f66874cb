mod utils;
#[allow(unused)]
use utils::*;

mod tests {
    use super::*;
    use albumload::prelude::*;
    use mock_service::prelude::*;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(60_000)]
    async fn latency_reflects_service_delay() {
        init();
        let mock = spawn(MockConfig::default().latency(Duration::from_millis(20)))
            .await
            .unwrap();

        let summary = LoadTest::connect(config(&mock.url(), 1, 2).iterations_per_worker(5))
            .await
            .unwrap()
            .run()
            .await;

        let stats = &summary.statistics;
        assert_eq!(stats.total, 40);
        assert!(dbg!(stats.overall.min) >= Duration::from_millis(20));
        assert!(stats.overall.median <= stats.overall.p99);
        assert!(stats.overall.p99 <= stats.overall.max);
        assert!(summary
            .outcomes
            .iter()
            .all(|o| o.latency_ms() >= 20 && o.start_ms() > 0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(60_000)]
    async fn request_timeout_is_a_transport_failure() {
        init();
        let mock = spawn(MockConfig::default().latency(Duration::from_millis(500)))
            .await
            .unwrap();

        let config = config(&mock.url(), 1, 1)
            .iterations_per_worker(1)
            .request_timeout(Duration::from_millis(100));
        let summary = LoadTest::connect(config).await.unwrap().run().await;

        // Every create attempt times out and the iteration is abandoned.
        assert_eq!(summary.statistics.total, 5);
        assert_eq!(summary.tally.abandoned, 1);
        assert!(summary.outcomes.iter().all(|o| o.is_transport_failure()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(60_000)]
    async fn metrics_are_recorded() {
        let handle = init();
        let mock = spawn(MockConfig::default()).await.unwrap();

        LoadTest::connect(config(&mock.url(), 1, 1).iterations_per_worker(1))
            .await
            .unwrap()
            .run()
            .await;

        let rendered = handle.render();
        assert!(rendered.contains("albumload_create_album_success"));
        assert!(rendered.contains("albumload_dislike_album_latency"));
    }
}
