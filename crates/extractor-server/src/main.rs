//! Extractor Server - Main entry point

use anyhow::Result;
use extractor_common::logging::{init_logging, LogConfig};
use std::{future::IntoFuture, net::SocketAddr, time::Duration};
use tokio::{signal, sync::oneshot};
use tracing::{info, warn};

use extractor_server::{
    api::{self, AppState},
    config::Config,
    extract,
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("extractor-server")
        .filter_directives(
            "extractor_server=debug,tower_http=debug,lapin=info,aws_smithy_runtime=warn,aws_config=warn",
        )
        .build()
        .merge_env()?;

    init_logging(&log_config)?;

    info!("Starting extractor server");

    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        bucket = %config.storage.bucket,
        queue = %config.queue.queue_name,
        chunk_size = config.extract.chunk_size,
        "Configuration loaded"
    );

    let extractor = extract::build_extractor(&config)?;
    let app = api::create_router(AppState::new(extractor));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });
    let mut server = tokio::spawn(server.into_future());

    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    tokio::select! {
        result = &mut server => result??,
        _ = signalled_rx => {
            info!("Waiting up to {} seconds for in-flight runs", grace.as_secs());
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result??,
                Err(_) => warn!("Shutdown timeout elapsed with requests still in flight"),
            }
        },
    }

    info!("Server shut down");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
