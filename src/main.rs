mod adapters;
mod application;
mod config;
mod domain;
mod interface;
mod ports;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adapters::{
    DockerAdapter, FanoutSink, GraphiteLineSink, MemorySink, ProcfsConfig, ProcfsProcessSource,
    StatvfsSystemSource,
};
use application::{DiskCollector, PollRunner, RunnerConfig, SocketCounter, StatsCollector, StatusBoard};
use config::Config;
use domain::NameResolver;
use interface::http::{create_router, AppState};
use ports::{ContainerSource, MetricSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ctrstat={},tower_http=info", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting ctrstat v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    // Initialize adapters
    let docker: Arc<dyn ContainerSource> = match DockerAdapter::with_url(&config.client_url) {
        Ok(adapter) => {
            info!(client_url = %config.client_url, "Docker client configured");
            Arc::new(adapter)
        }
        Err(e) => {
            error!(client_url = %config.client_url, error = %e, "Failed to configure Docker client");
            return Err(e);
        }
    };
    let processes = Arc::new(ProcfsProcessSource::new(ProcfsConfig::new(config.proc_path.clone())));

    let latest = Arc::new(MemorySink::new());
    let sink: Arc<dyn MetricSink> = Arc::new(
        FanoutSink::new()
            .with_sink(Arc::new(GraphiteLineSink::stdout()))
            .with_sink(latest.clone()),
    );

    // Collectors
    let collector = StatsCollector::new(
        docker.clone(),
        SocketCounter::new(processes),
        sink.clone(),
        NameResolver::new(config.naming()),
    );
    let disk = DiskCollector::new(
        Arc::new(StatvfsSystemSource::new()),
        docker,
        sink,
        config.root_path.clone(),
        config.disk_prefix.clone(),
    );

    let status = Arc::new(StatusBoard::new());
    let runner_config = RunnerConfig {
        interval: config.poll_interval(),
        timeout: config.poll_timeout(),
    };
    let runner = PollRunner::new(collector, runner_config, status.clone()).with_disk(disk);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    // Status API
    if config.port != 0 {
        let app = create_router(AppState { status, latest });
        let addr = format!("0.0.0.0:{}", config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Status API listening on {}", addr);

        let mut server_shutdown = shutdown_tx.subscribe();
        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = server_shutdown.recv().await;
            });
            if let Err(e) = server.await {
                warn!(error = %e, "Status API stopped");
            }
        });
    }

    let poller = tokio::spawn(runner.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    let _ = shutdown_tx.send(());
    poller.await?;

    Ok(())
}
