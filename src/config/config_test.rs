use serial_test::serial;
use temp_env::with_vars;

use super::*;

fn cleanup_all_pipeline_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("PIPELINE__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = PipelineConfig::default();

    assert_eq!(config.watch.poll_interval_ms, 2000);
    assert_eq!(config.watch.deadline_ms, 120_000);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.producer.pace_ms, 2000);
    assert_eq!(config.store.backend, StoreBackend::Sled);
    assert_eq!(config.store.incoming_tree, "incoming_reviews");
    assert_eq!(config.store.results_tree, "sentiment_analysis");
    assert!(config.processor.enabled);
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_pipeline_env_vars();
    with_vars(
        vec![
            ("PIPELINE__WATCH__POLL_INTERVAL_MS", Some("500")),
            ("PIPELINE__STORE__BACKEND", Some("memory")),
        ],
        || {
            let config = PipelineConfig::new().unwrap();

            assert_eq!(config.watch.poll_interval_ms, 500);
            assert_eq!(config.store.backend, StoreBackend::Memory);
            assert_eq!(config.watch.deadline_ms, 120_000);
        },
    );
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_pipeline_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("dynamic_config.toml");

    std::fs::write(
        &config_path,
        r#"
        [watch]
        deadline_ms = 30000

        [retry]
        max_attempts = 5
        backoff_ms = 100

        [store]
        db_path = "/tmp/xx/pipeline"
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = PipelineConfig::new().expect("success");
        let config = base_config
            .with_override_config(config_path.to_str().unwrap())
            .expect("override should merge");

        assert_eq!(config.watch.deadline_ms, 30_000);
        assert_eq!(config.watch.poll_interval_ms, 2000);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff_ms, 100);
        assert_eq!(config.store.db_path.to_str(), Some("/tmp/xx/pipeline"));
    });
}

#[test]
#[serial]
fn environment_variables_should_have_highest_priority() {
    cleanup_all_pipeline_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("test_config.toml");
    std::fs::write(
        &config_path,
        r#"
        [producer]
        pace_ms = 100
        batch_size = 4
        "#,
    )
    .unwrap();

    with_vars(
        vec![
            ("CONFIG_PATH", Some(config_path.to_str().unwrap())),
            ("PIPELINE__PRODUCER__PACE_MS", Some("0")),
        ],
        || {
            let config = PipelineConfig::new().unwrap();

            assert_eq!(config.producer.pace_ms, 0);
            assert_eq!(config.producer.batch_size, 4);
        },
    );
}

#[test]
fn validation_should_accept_defaults() {
    assert!(PipelineConfig::default().validate().is_ok());
}

#[test]
fn validation_should_reject_zero_poll_interval() {
    let mut config = PipelineConfig::default();
    config.watch.poll_interval_ms = 0;

    assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
}

#[test]
fn validation_should_reject_deadline_shorter_than_poll_interval() {
    let mut config = PipelineConfig::default();
    config.watch.poll_interval_ms = 5000;
    config.watch.deadline_ms = 1000;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_zero_retry_attempts() {
    let mut config = PipelineConfig::default();
    config.retry.max_attempts = 0;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_identical_tree_names() {
    let mut config = PipelineConfig::default();
    config.store.results_tree = config.store.incoming_tree.clone();

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_skip_disabled_processor() {
    let mut config = PipelineConfig::default();
    config.processor.enabled = false;
    config.processor.batch_size = 0;

    assert!(config.validate().is_ok());
}
