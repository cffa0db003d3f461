use std::process::ExitCode;
use std::sync::Arc;

use pipeline_watch::sample_reviews;
use pipeline_watch::Error;
use pipeline_watch::IngestQueue;
use pipeline_watch::LexiconClassifier;
use pipeline_watch::LocalProcessor;
use pipeline_watch::MemStore;
use pipeline_watch::PipelineCheck;
use pipeline_watch::PipelineConfig;
use pipeline_watch::PipelineReport;
use pipeline_watch::PipelineStore;
use pipeline_watch::RecordId;
use pipeline_watch::Result;
use pipeline_watch::SledStore;
use pipeline_watch::StoreBackend;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    init_observability();

    match run().await {
        Ok(report) => {
            println!("{report}");
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("pipeline check could not run: {}", e);
            eprintln!("pipeline check could not run: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<PipelineReport> {
    let config = PipelineConfig::new()?.validate()?;
    info!(?config, "configuration loaded");

    let shutdown = CancellationToken::new();
    let signals = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = graceful_shutdown(signals).await {
            error!("Failed to listen for shutdown signals: {:?}", e);
        }
    });

    let report = match config.store.backend {
        StoreBackend::Sled => {
            let store = Arc::new(SledStore::from_config(&config.store)?);
            check(store, config, shutdown.clone()).await
        }
        StoreBackend::Memory => check(Arc::new(MemStore::new()), config, shutdown.clone()).await,
    };
    shutdown.cancel();
    Ok(report)
}

async fn check<S>(
    store: Arc<S>,
    config: PipelineConfig,
    shutdown: CancellationToken,
) -> PipelineReport
where
    S: PipelineStore + IngestQueue,
{
    let processor_stop = shutdown.child_token();
    let processor = if config.processor.enabled {
        // only results for inputs submitted from now on
        let mut local = LocalProcessor::new(store.clone(), LexiconClassifier::new(), &config.processor);
        match store.last_seq().await {
            Ok(Some(last)) => local = local.with_cursor(last),
            Ok(None) => {}
            Err(e) => error!("cannot read ingest queue, processing from the start: {}", e),
        }
        Some(tokio::spawn(local.run(processor_stop.clone())))
    } else {
        info!("local processor disabled, waiting for an external processing stage");
        None
    };

    let correlation_id = format!("check-{}", RecordId::generate());
    let records = sample_reviews(config.producer.batch_size, &correlation_id);
    let report = PipelineCheck::new(store, config).run(&correlation_id, records, &shutdown).await;

    processor_stop.cancel();
    if let Some(handle) = processor {
        if let Err(e) = handle.await {
            error!("local processor task failed: {:?}", e);
        }
    }
    report
}

async fn graceful_shutdown(shutdown: CancellationToken) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt()).map_err(|e| Error::Fatal(format!("SIGINT handler: {e}")))?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(|e| Error::Fatal(format!("SIGTERM handler: {e}")))?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = shutdown.cancelled() => {
            return Ok(());
        },
    }

    shutdown.cancel();
    info!("Shutdown requested, stopping pipeline check");
    Ok(())
}

fn init_observability() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
