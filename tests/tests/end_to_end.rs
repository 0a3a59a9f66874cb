mod utils;
#[allow(unused)]
use utils::*;

mod tests {
    use super::*;
    use albumload::prelude::*;
    use albumload_runtime::AlbumLoadRuntime;
    use anyhow::Context;
    use mock_service::prelude::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(60_000)]
    async fn healthy_service() -> anyhow::Result<()> {
        init();
        let mock = spawn(MockConfig::default().album_id("abc123").image_size(42)).await?;

        let summary = LoadTest::connect(config(&mock.url(), 1, 1)).await?.run().await;

        let stats = &summary.statistics;
        assert_eq!(stats.total, 400);
        assert_eq!(stats.successful, 400);
        assert_eq!(stats.failed, 0);
        assert_eq!(summary.outcomes.len(), 400);
        for kind in RequestKind::ALL {
            let expected = if kind == RequestKind::LikeAlbum { 200 } else { 100 };
            assert_eq!(stats.kind(kind).count, expected, "{kind}");
        }
        assert_eq!(mock.creates(), 100);
        assert_eq!(mock.likes(), 200);
        assert_eq!(mock.dislikes(), 100);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(60_000)]
    async fn failing_service() -> anyhow::Result<()> {
        init();
        let mock = spawn(MockConfig::failing(StatusCode::INTERNAL_SERVER_ERROR)).await?;

        let summary = LoadTest::connect(config(&mock.url(), 1, 1)).await?.run().await;

        assert_eq!(summary.statistics.total, 500);
        assert_eq!(summary.statistics.failed, 500);
        assert_eq!(summary.tally.abandoned, 100);
        assert!(summary.outcomes.iter().all(|o| {
            o.kind() == RequestKind::CreateAlbum && !o.is_success() && o.status() == 500
        }));
        assert_eq!(mock.likes() + mock.dislikes(), 0);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(60_000)]
    async fn malformed_create_response() -> anyhow::Result<()> {
        init();
        let mock = spawn(MockConfig::default().create_body("not json")).await?;

        let summary = LoadTest::connect(config(&mock.url(), 1, 1).iterations_per_worker(10))
            .await?
            .run()
            .await;

        assert_eq!(summary.statistics.total, 50);
        assert_eq!(summary.statistics.successful, 0);
        assert!(summary
            .outcomes
            .iter()
            .all(|o| o.kind() == RequestKind::CreateAlbum && o.status() == 200));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(60_000)]
    async fn failed_reviews_do_not_stop_workers() -> anyhow::Result<()> {
        init();
        let mock =
            spawn(MockConfig::default().review_status(StatusCode::SERVICE_UNAVAILABLE)).await?;

        let summary = LoadTest::connect(config(&mock.url(), 2, 2).iterations_per_worker(5))
            .await?
            .run()
            .await;

        // 20 iterations, each with one create and three reviews retried five times.
        assert_eq!(summary.tally.completed, 20);
        assert_eq!(summary.statistics.kind(RequestKind::CreateAlbum).count, 20);
        assert_eq!(summary.statistics.total, 20 + 20 * 3 * 5);
        assert_eq!(summary.statistics.failed, 20 * 3 * 5);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(60_000)]
    async fn warmup_is_excluded() -> anyhow::Result<()> {
        init();
        let mock = spawn(MockConfig::default()).await?;
        let config = config(&mock.url(), 1, 1)
            .warmup(Some(WarmupConfig {
                workers: 2,
                iterations: 10,
            }))
            .iterations_per_worker(10);

        let summary = LoadTest::connect(config).await?.run().await;

        assert_eq!(summary.warmup.context("warm-up ran")?.attempts, 20);
        assert_eq!(summary.statistics.total, 40);
        assert_eq!(mock.creates(), 20 + 10);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(60_000)]
    async fn runtime_writes_record_file() -> anyhow::Result<()> {
        init();
        let mock = spawn(MockConfig::default()).await?;
        let output = std::env::temp_dir().join(format!("albumload-e2e-{}.csv", mock.addr().port()));

        let summary = AlbumLoadRuntime::with_args(args(&format!(
            "-threadGroupSize 1 -numThreadGroups 2 -delay 0 -IPAddr {} -output {}",
            mock.url(),
            output.display()
        )))?
        .run()
        .await?;

        // Default warm-up of 10 workers x 100 creates runs first.
        assert_eq!(mock.creates(), 1_000 + 200);
        assert_eq!(summary.statistics.total, 800);

        let records = std::fs::read_to_string(&output)?;
        let mut lines = records.lines();
        assert_eq!(lines.next(), Some("Start Time,Request Type,Latency,Status Code"));
        let rows: Vec<_> = lines.collect();
        assert_eq!(rows.len(), 800);
        assert!(rows.iter().all(|row| row.split(',').count() == 4));
        assert_eq!(rows.iter().filter(|row| row.contains(",CreateAlbum,")).count(), 200);

        let _ = std::fs::remove_file(&output);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_service_launches_nothing() -> anyhow::Result<()> {
        init();
        let res = LoadTest::connect(config("http://127.0.0.1:9", 1, 1)).await;
        assert!(matches!(res, Err(ConfigError::Unreachable { .. })));
        Ok(())
    }

    #[cfg(feature = "integration")]
    #[tokio::test(flavor = "multi_thread")]
    async fn overlapping_waves() -> anyhow::Result<()> {
        use std::sync::Arc;
        use std::time::Duration;

        init();
        let mock = spawn(MockConfig::default().latency(Duration::from_millis(5))).await?;
        let config = config(&mock.url(), 10, 10)
            .wave_delay(Duration::from_secs(1))
            .iterations_per_worker(50);

        let summary = LoadTest::new(
            config.clone(),
            Arc::new(HttpAlbumClient::connect(&config).await?),
        )
        .run()
        .await;

        assert_eq!(summary.statistics.total, 100 * 50 * 4);
        // Waves are launched without waiting on earlier ones.
        assert!(dbg!(summary.statistics.wall_time) < Duration::from_secs(20));
        Ok(())
    }
}
