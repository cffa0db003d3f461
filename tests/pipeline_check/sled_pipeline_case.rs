use std::sync::Arc;

use pipeline_watch::sample_reviews;
use pipeline_watch::InputStore;
use pipeline_watch::PipelineCheck;
use pipeline_watch::ResultStore;
use pipeline_watch::SledStore;
use pipeline_watch::StoreBackend;
use tokio_util::sync::CancellationToken;

use crate::common::check_config;
use crate::common::start_processor;
use crate::common::BATCH;
use crate::enable_logger;

fn open(
    config: &pipeline_watch::PipelineConfig,
) -> Arc<SledStore> {
    Arc::new(SledStore::from_config(&config.store).unwrap())
}

#[tokio::test]
async fn test_sled_store_pipeline_completes_and_persists() {
    enable_logger();
    let dir = tempfile::tempdir().unwrap();
    let mut config = check_config(0, 50, 10_000);
    config.store.backend = StoreBackend::Sled;
    config.store.db_path = dir.path().join("db");
    config.processor.poll_interval_ms = 20;

    {
        let store = open(&config);
        let (stop, processor) = start_processor(store.clone(), &config);

        let report = PipelineCheck::new(store.clone(), config.clone())
            .run("it-sled", sample_reviews(BATCH, "it-sled"), &CancellationToken::new())
            .await;

        assert!(report.is_success(), "{report}");
        assert_eq!(report.results.len(), BATCH);

        stop.cancel();
        processor.await.unwrap();
    }

    let reopened = open(&config);
    assert_eq!(InputStore::count(&*reopened).await.unwrap(), BATCH as u64);
    assert_eq!(reopened.current_count().await.unwrap(), BATCH as u64);
}
