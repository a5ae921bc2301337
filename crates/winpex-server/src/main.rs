use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use winpex_perfdata::SnapshotDirSource;
use winpex_server::{Cli, CollectorSet, ExporterConfig, ExporterState, exporter_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::from_default_env().add_directive("winpex=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = ExporterConfig::from_cli(Cli::parse())?;
    info!(
        engine = %config.engine,
        collectors = %config.collectors.join(","),
        perfdata_dir = %config.perfdata_dir.display(),
        "starting exporter"
    );

    let source = Arc::new(SnapshotDirSource::new(config.perfdata_dir.clone()));
    let collectors = Arc::new(CollectorSet::build(&config.collectors, config.engine, source)?);

    let state = Arc::new(ExporterState::new(
        Arc::clone(&collectors),
        config.timeout_margin,
    ));
    let app = exporter_router(state, &config.telemetry_path);

    let listener = tokio::net::TcpListener::bind(&config.listen_address).await?;
    info!(
        "winpex listening on {}{}",
        config.listen_address, config.telemetry_path
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("shutting down");
    collectors.close()?;
    Ok(())
}
