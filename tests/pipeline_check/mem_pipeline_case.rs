use std::sync::Arc;
use std::time::Duration;

use pipeline_watch::sample_reviews;
use pipeline_watch::ChannelObserver;
use pipeline_watch::MemStore;
use pipeline_watch::PipelineCheck;
use pipeline_watch::Sentiment;
use pipeline_watch::WatchOutcome;
use tokio_util::sync::CancellationToken;

use crate::common::check_config;
use crate::common::start_processor;
use crate::common::BATCH;
use crate::enable_logger;

// Default pacing (2s) and polling (2s) with a live processing stage.
#[tokio::test(start_paused = true)]
async fn test_sample_batch_completes_end_to_end() {
    enable_logger();
    let config = check_config(2000, 2000, 120_000);
    let store = Arc::new(MemStore::new());
    let (stop, processor) = start_processor(store.clone(), &config);

    let report = PipelineCheck::new(store.clone(), config)
        .run("it-1", sample_reviews(BATCH, "it-1"), &CancellationToken::new())
        .await;

    assert!(report.is_success(), "{report}");
    assert_eq!(report.results.len(), BATCH);
    let positives = report
        .results
        .iter()
        .filter(|r| r.body.label == Sentiment::Positive)
        .count();
    assert_eq!(positives, 5);
    let rendered = report.to_string();
    assert!(rendered.contains("All 10 results received"));
    assert!(rendered.contains("Result records:   0 -> 10 (+10)"));
    assert!(!rendered.contains("missing"));

    stop.cancel();
    processor.await.unwrap();
}

// The processing stage falls behind: results trickle in slower than the deadline allows.
#[tokio::test(start_paused = true)]
async fn test_stalled_processing_reports_missing_results() {
    enable_logger();
    let mut config = check_config(0, 1000, 20_000);
    config.processor.poll_interval_ms = 6000;
    config.processor.batch_size = 1;
    let store = Arc::new(MemStore::new());
    let (stop, processor) = start_processor(store.clone(), &config);

    let report = PipelineCheck::new(store.clone(), config)
        .run("it-2", sample_reviews(BATCH, "it-2"), &CancellationToken::new())
        .await;

    // one result per tick: t = 6, 12, 18 and possibly t = 0
    let new_count = match report.outcome {
        Ok(WatchOutcome::TimedOut { new_count, expected }) => {
            assert_eq!(expected, BATCH as u64);
            new_count
        }
        ref other => panic!("unexpected outcome: {other:?}"),
    };
    assert!((3..=4).contains(&new_count), "{new_count}");
    assert!(report.results.is_empty());
    let missing = format!("{} of 10 results missing", BATCH as u64 - new_count);
    assert!(report.to_string().contains(&missing));
    assert_eq!(report.elapsed, Duration::from_secs(20));

    stop.cancel();
    processor.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_push_observer_sees_the_same_completion() {
    enable_logger();
    let config = check_config(500, 2000, 60_000);
    let store = Arc::new(MemStore::new());
    let (stop, processor) = start_processor(store.clone(), &config);
    let observer = Arc::new(ChannelObserver::new(store.subscribe_results()));

    let report = PipelineCheck::new(store.clone(), config)
        .with_observer(observer)
        .run("it-3", sample_reviews(BATCH, "it-3"), &CancellationToken::new())
        .await;

    assert!(matches!(report.outcome, Ok(WatchOutcome::Completed { new_count: 10 })));

    stop.cancel();
    processor.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_store_is_a_connectivity_failure() {
    enable_logger();
    let config = check_config(0, 1000, 10_000);
    let store = Arc::new(MemStore::new());
    store.set_offline(true);

    let report = PipelineCheck::new(store.clone(), config)
        .run("it-4", sample_reviews(BATCH, "it-4"), &CancellationToken::new())
        .await;

    assert!(!report.is_success());
    assert!(matches!(&report.outcome, Err(e) if e.is_store_unavailable()));
    assert!(report.to_string().contains("Cannot reach the result store"));
}
