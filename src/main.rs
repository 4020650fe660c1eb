// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use ingress_hosts::{
    cache::IngressCache,
    config::{build_client, Cli, Settings},
    constants::{TOKIO_THREAD_NAME, TOKIO_WORKER_THREADS},
    reconciler::Reconciler,
    server::{self, ServerState},
};
use k8s_openapi::api::networking::v1::Ingress;
use kube::{runtime::watcher, Api};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name(TOKIO_THREAD_NAME)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    init_tracing();

    let settings = Settings::from_cli(Cli::parse())
        .inspect_err(|e| error!("Invalid configuration: {e}"))?;

    info!(
        hosts_file = %settings.hosts_file.display(),
        interval_secs = settings.interval.as_secs(),
        annotation = %settings.annotation,
        "Starting ingress hosts controller"
    );

    debug!("Initializing Kubernetes client");
    let client = build_client(settings.kubeconfig.as_deref())
        .await
        .inspect_err(|e| error!("Failed to create Kubernetes client: {e:#}"))?;
    debug!("Kubernetes client initialized successfully");

    let metrics_listener = match settings.metrics_addr {
        Some(addr) => Some(
            server::bind(addr)
                .await
                .inspect_err(|e| error!("CRITICAL: {e:#}"))?,
        ),
        None => None,
    };

    let cancel = CancellationToken::new();

    let mut cache = IngressCache::new();
    let sync_task = cache.start(
        Api::<Ingress>::all(client),
        watcher::Config::default(),
        cancel.child_token(),
    )?;

    let server_task = metrics_listener.map(|listener| {
        let serving = server::serve(
            listener,
            ServerState::new(cache.subscribe()),
            cancel.child_token(),
        );
        tokio::spawn(async move {
            if let Err(e) = serving.await {
                error!("Metrics server stopped: {e:#}");
            }
        })
    });

    info!("Waiting for ingress cache to sync");
    tokio::select! {
        result = cache.wait_for_sync(settings.sync_timeout) => {
            if let Err(e) = result {
                error!("CRITICAL: {e}");
                cancel.cancel();
                return Err(e.into());
            }
        }
        () = shutdown_signal() => {
            info!("Shutdown requested before cache sync");
            cancel.cancel();
            sync_task.await?;
            return Ok(());
        }
    }

    let reconciler = Reconciler::new(cache.lister(), settings.reconciler_config())?;
    let reconcile_task = tokio::spawn({
        let cancel = cancel.clone();
        async move { reconciler.run(cancel).await }
    });

    shutdown_signal().await;
    info!("Shutdown signal received, finishing in-flight work");
    cancel.cancel();

    reconcile_task.await?;
    sync_task.await?;
    if let Some(server_task) = server_task {
        server_task.await?;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Initialize logging.
///
/// Respects `RUST_LOG` for filtering (default `info`) and `RUST_LOG_FORMAT`
/// (`json` or `text`) for the output format.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

/// Resolve on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
