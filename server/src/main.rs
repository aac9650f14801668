use std::{future::Future, io, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use todo_core::{Database, DocumentTodoRepository, TodoService};
use todo_server::config::{self, AppConfig, Cli};
use tokio::{net::TcpListener, sync::Notify};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if let Some(path) = &cli.config {
        config::load_env_file(path)?;
    }
    let config = AppConfig::from_env().context("failed to load configuration")?;

    let database = Database::open(&config.db_location, &config.db_name)
        .with_context(|| format!("failed to open database {}", config.db_name))?;
    let repository = DocumentTodoRepository::bootstrap(&database)
        .await
        .context("failed to initialize todo repository")?;
    let service = Arc::new(
        TodoService::new(Arc::new(repository)).with_weekend_marker(config.weekend_marker.clone()),
    );

    let app = todo_server::app(service, &config.http_settings());
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(
        bind_addr = %config.bind_addr,
        database = %config.db_name,
        url_prefix = %config.url_prefix,
        "todo server started"
    );

    let stopping = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let stopping = stopping.clone();
        async move {
            shutdown_signal().await;
            info!("shutdown requested, draining in-flight requests");
            stopping.notify_one();
        }
    });

    tokio::select! {
        result = server => result.context("server error")?,
        _ = drain_deadline(&stopping, config.shutdown_timeout) => {
            warn!(timeout = ?config.shutdown_timeout, "graceful shutdown timed out");
        }
    }

    info!("todo server stopped");
    Ok(())
}

async fn drain_deadline(stopping: &Notify, timeout: Duration) {
    stopping.notified().await;
    tokio::time::sleep(timeout).await;
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("todo_server=debug,todo_core=debug,tower_http=info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = wait_for_ctrl_c(tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install sigterm handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Resolves when `signal` fires. A handler that failed to install never
/// resolves, so the server keeps running.
async fn wait_for_ctrl_c(signal: impl Future<Output = io::Result<()>>) {
    if let Err(err) = signal.await {
        error!(error = %err, "unable to install ctrl+c handler");
        std::future::pending::<()>().await;
    }
}
