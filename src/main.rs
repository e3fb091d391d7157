//! Rotascribe - Entry Point
//!
//! Wires the proxy pool, transcript fetcher and API server together and runs
//! until Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rotascribe::api::{ApiServer, AppState};
use rotascribe::config::{Config, LogConfig};
use rotascribe::proxy::rotation::ThreadRandom;
use rotascribe::proxy::{
    create_selector, ProxyDirectory, ProxyProvider, ProxyStatsRegistry, RotationStrategy,
    StaticProvider, WebshareProvider,
};
use rotascribe::transcript::{FetcherConfig, TranscriptFetcher, YouTubeTranscriptClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&LogConfig::from_env());

    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Starting Rotascribe");

    let stats = Arc::new(ProxyStatsRegistry::new());
    let provider = build_provider(&config)?;
    info!("Using proxy provider: {}", provider.provider_name());

    let directory = Arc::new(ProxyDirectory::new(provider, stats.clone()));

    let strategy = RotationStrategy::from_str(&config.rotation.strategy);
    let selector = create_selector(
        strategy,
        config.rotation.exploit_probability,
        Arc::new(ThreadRandom),
    );
    info!("Using rotation strategy: {}", strategy.as_str());

    let service = Arc::new(
        YouTubeTranscriptClient::new(&config.transcript)
            .context("Failed to build transcript client")?,
    );

    let fetcher = Arc::new(TranscriptFetcher::new(
        directory,
        selector,
        stats.clone(),
        service,
        FetcherConfig::from_config(&config.rotation, &config.transcript),
    ));

    let api_server = ApiServer::new(config.server.clone(), AppState::new(fetcher, stats));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let api_task = tokio::spawn(async move {
        if let Err(e) = api_server.run(shutdown_rx).await {
            error!("API server error: {}", e);
        }
    });

    info!("Server started on {}", config.server_addr());

    shutdown_signal().await;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = api_task.await;

    info!("Rotascribe stopped");
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("rotascribe={},tower_http=info", log.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if log.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Webshare when a token is configured, then a complete static proxy, else
/// an unauthenticated Webshare provider that always yields an empty pool.
fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn ProxyProvider>> {
    let settings = &config.provider;
    let provider: Arc<dyn ProxyProvider> = match (&settings.api_token, &settings.static_proxy) {
        (Some(_), _) => Arc::new(
            WebshareProvider::new(settings).context("Failed to build Webshare client")?,
        ),
        (None, Some(static_proxy)) => Arc::new(
            StaticProvider::from_config(static_proxy).context("Invalid static proxy settings")?,
        ),
        (None, None) => {
            warn!("No proxy credentials configured, requests will go direct");
            Arc::new(WebshareProvider::new(settings).context("Failed to build Webshare client")?)
        }
    };
    Ok(provider)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
